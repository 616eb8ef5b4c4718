use uuid::Uuid;

/// A row type held by the in-memory store.
pub trait Record: Clone {
    fn id(&self) -> Uuid;
}

/// Insertion-ordered rows for one entity type. List operations return rows
/// in the order they were created; there is no secondary ordering.
#[derive(Debug, Clone)]
pub struct Table<T: Record> {
    rows: Vec<T>,
}

impl<T: Record> Default for Table<T> {
    fn default() -> Self {
        Self { rows: Vec::new() }
    }
}

impl<T: Record> Table<T> {
    pub fn insert(&mut self, row: T) {
        self.rows.push(row);
    }

    pub fn get(&self, id: Uuid) -> Option<&T> {
        self.rows.iter().find(|row| row.id() == id)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.get(id).is_some()
    }

    /// Swaps the stored row with the same id for `row`. Returns the old row,
    /// or `None` when the id is unknown (nothing is inserted in that case).
    pub fn replace(&mut self, row: T) -> Option<T> {
        let slot = self.rows.iter_mut().find(|r| r.id() == row.id())?;
        Some(std::mem::replace(slot, row))
    }

    pub fn remove(&mut self, id: Uuid) -> Option<T> {
        let index = self.rows.iter().position(|row| row.id() == id)?;
        Some(self.rows.remove(index))
    }

    /// Removes every row matching `pred` and returns them, preserving order.
    pub fn drain_where<F>(&mut self, mut pred: F) -> Vec<T>
    where
        F: FnMut(&T) -> bool,
    {
        let mut removed = Vec::new();
        self.rows.retain(|row| {
            if pred(row) {
                removed.push(row.clone());
                false
            } else {
                true
            }
        });
        removed
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.rows.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.rows.iter_mut()
    }

    pub fn any<F>(&self, pred: F) -> bool
    where
        F: FnMut(&T) -> bool,
    {
        self.rows.iter().any(pred)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// The substring filter behind every list operation: case-insensitive match
/// over the entity's text fields. An absent or blank query matches all rows.
pub fn matches_filter(query: Option<&str>, fields: &[Option<&str>]) -> bool {
    let Some(query) = query else {
        return true;
    };
    let query = query.trim();
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    fields
        .iter()
        .copied()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: Uuid,
        name: String,
    }

    impl Record for Row {
        fn id(&self) -> Uuid {
            self.id
        }
    }

    fn row(name: &str) -> Row {
        Row {
            id: Uuid::new_v4(),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut table = Table::default();
        for name in ["a", "b", "c", "d"] {
            table.insert(row(name));
        }
        let id = table.iter().nth(1).unwrap().id();
        table.remove(id);

        let names: Vec<_> = table.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c", "d"]);
    }

    #[test]
    fn test_drain_where_returns_removed_rows() {
        let mut table = Table::default();
        for name in ["keep", "drop", "keep", "drop"] {
            table.insert(row(name));
        }

        let removed = table.drain_where(|r| r.name == "drop");
        assert_eq!(removed.len(), 2);
        assert_eq!(table.len(), 2);
        assert!(table.iter().all(|r| r.name == "keep"));
    }

    #[test]
    fn test_replace_unknown_id_is_noop() {
        let mut table = Table::default();
        table.insert(row("a"));
        assert!(table.replace(row("ghost")).is_none());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let fields = [Some("Widget Service"), None];
        assert!(matches_filter(Some("WIDGET"), &fields));
        assert!(matches_filter(Some("widget"), &fields));
        assert!(matches_filter(Some("get ser"), &fields));
        assert!(!matches_filter(Some("gadget"), &fields));
    }

    #[test]
    fn test_blank_filter_matches_everything() {
        assert!(matches_filter(None, &[Some("anything")]));
        assert!(matches_filter(Some(""), &[Some("anything")]));
        assert!(matches_filter(Some("   "), &[None]));
    }
}
