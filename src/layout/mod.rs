//! Per-user home-dashboard layout persistence. One JSON file per user;
//! last write wins, and anything unreadable falls back to the default
//! arrangement instead of failing the page.

use std::path::PathBuf;

use anyhow::Result;
use log::warn;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::metrics::WidgetSize;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetRef {
    pub id: String,
    pub size: WidgetSize,
}

impl WidgetRef {
    pub fn new(id: &str, size: WidgetSize) -> Self {
        Self {
            id: id.to_string(),
            size,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomeLayout {
    pub widgets: Vec<WidgetRef>,
}

impl Default for HomeLayout {
    fn default() -> Self {
        Self {
            widgets: vec![
                WidgetRef::new("active-work", WidgetSize::Medium),
                WidgetRef::new("deployments", WidgetSize::Medium),
                WidgetRef::new("metrics-overview", WidgetSize::Large),
                WidgetRef::new("my-teams", WidgetSize::Small),
                WidgetRef::new("recent-docs", WidgetSize::Small),
                WidgetRef::new("releases", WidgetSize::Full),
            ],
        }
    }
}

/// Drag-and-drop reorder: remove the dragged widget, reinsert it at the
/// drop target's index. Unknown ids are a no-op.
pub fn move_widget(layout: &mut HomeLayout, widget_id: &str, target_index: usize) {
    let Some(from) = layout.widgets.iter().position(|w| w.id == widget_id) else {
        return;
    };
    let widget = layout.widgets.remove(from);
    let target = target_index.min(layout.widgets.len());
    layout.widgets.insert(target, widget);
}

pub struct LayoutStore {
    dir: PathBuf,
}

impl LayoutStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, user_id: Uuid) -> PathBuf {
        self.dir.join(format!("{user_id}.json"))
    }

    /// Returns the user's saved layout, or the default arrangement when
    /// nothing is stored or the stored bytes fail to parse.
    pub async fn load(&self, user_id: Uuid) -> HomeLayout {
        match tokio::fs::read(self.path_for(user_id)).await {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(layout) => layout,
                Err(err) => {
                    warn!("discarding unreadable layout for user {user_id}: {err}");
                    HomeLayout::default()
                }
            },
            Err(_) => HomeLayout::default(),
        }
    }

    /// Overwrites the user's stored layout.
    pub async fn save(&self, user_id: Uuid, layout: &HomeLayout) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let bytes = serde_json::to_vec_pretty(layout)?;
        tokio::fs::write(self.path_for(user_id), bytes).await?;
        Ok(())
    }

    /// Deletes the stored layout so the next load falls back to the default.
    pub async fn reset(&self, user_id: Uuid) -> Result<()> {
        match tokio::fs::remove_file(self.path_for(user_id)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::test_util;

    fn store() -> (tempfile::TempDir, LayoutStore) {
        test_util::setup();
        let dir = tempfile::tempdir().unwrap();
        let store = LayoutStore::new(dir.path().join("layouts"));
        (dir, store)
    }

    #[tokio::test]
    async fn test_load_without_save_returns_default() {
        let (_dir, store) = store();
        let layout = store.load(Uuid::new_v4()).await;
        assert_eq!(layout, HomeLayout::default());
    }

    #[tokio::test]
    async fn test_save_then_load_round_trips() {
        let (_dir, store) = store();
        let user_id = Uuid::new_v4();
        let layout = HomeLayout {
            widgets: vec![
                WidgetRef::new("releases", WidgetSize::Full),
                WidgetRef::new("my-teams", WidgetSize::Small),
            ],
        };

        store.save(user_id, &layout).await.unwrap();
        assert_eq!(store.load(user_id).await, layout);
    }

    #[tokio::test]
    async fn test_save_overwrites_previous_layout() {
        let (_dir, store) = store();
        let user_id = Uuid::new_v4();
        let first = HomeLayout {
            widgets: vec![WidgetRef::new("a", WidgetSize::Small)],
        };
        let second = HomeLayout {
            widgets: vec![WidgetRef::new("b", WidgetSize::Large)],
        };

        store.save(user_id, &first).await.unwrap();
        store.save(user_id, &second).await.unwrap();
        assert_eq!(store.load(user_id).await, second);
    }

    #[tokio::test]
    async fn test_corrupt_file_treated_as_absent() {
        let (_dir, store) = store();
        let user_id = Uuid::new_v4();
        store
            .save(user_id, &HomeLayout::default())
            .await
            .unwrap();
        tokio::fs::write(store.path_for(user_id), b"{not json")
            .await
            .unwrap();

        assert_eq!(store.load(user_id).await, HomeLayout::default());
    }

    #[tokio::test]
    async fn test_layouts_are_per_user() {
        let (_dir, store) = store();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let custom = HomeLayout {
            widgets: vec![WidgetRef::new("releases", WidgetSize::Full)],
        };

        store.save(alice, &custom).await.unwrap();
        assert_eq!(store.load(alice).await, custom);
        assert_eq!(store.load(bob).await, HomeLayout::default());
    }

    #[tokio::test]
    async fn test_reset_restores_default() {
        let (_dir, store) = store();
        let user_id = Uuid::new_v4();
        let custom = HomeLayout {
            widgets: vec![WidgetRef::new("releases", WidgetSize::Full)],
        };
        store.save(user_id, &custom).await.unwrap();

        store.reset(user_id).await.unwrap();
        assert_eq!(store.load(user_id).await, HomeLayout::default());
        // resetting twice is fine
        store.reset(user_id).await.unwrap();
    }

    #[test]
    fn test_move_widget_is_a_pure_splice() {
        let mut layout = HomeLayout {
            widgets: vec![
                WidgetRef::new("a", WidgetSize::Small),
                WidgetRef::new("b", WidgetSize::Small),
                WidgetRef::new("c", WidgetSize::Small),
                WidgetRef::new("d", WidgetSize::Small),
            ],
        };

        move_widget(&mut layout, "d", 0);
        let order: Vec<_> = layout.widgets.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(order, vec!["d", "a", "b", "c"]);

        move_widget(&mut layout, "d", 2);
        let order: Vec<_> = layout.widgets.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "d", "c"]);
    }

    #[test]
    fn test_move_widget_clamps_target_and_ignores_unknown_ids() {
        let mut layout = HomeLayout {
            widgets: vec![
                WidgetRef::new("a", WidgetSize::Small),
                WidgetRef::new("b", WidgetSize::Small),
            ],
        };

        move_widget(&mut layout, "a", 99);
        let order: Vec<_> = layout.widgets.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(order, vec!["b", "a"]);

        move_widget(&mut layout, "ghost", 0);
        let order: Vec<_> = layout.widgets.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(order, vec!["b", "a"]);
    }
}
