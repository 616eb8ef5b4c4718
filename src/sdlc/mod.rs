//! SDLC assistants: two parallel conversation subsystems, one generating
//! user stories and one generating rapid prototypes. Both follow the same
//! conversation -> messages/outputs shape but stay in separate tables.

pub mod types;

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::shared::error::{DataError, DataResult};
use crate::store::{matches_filter, require_row, MemoryStore, Tables};

pub use types::{
    MessageRole, NewConversation, NewMessage, NewProtoOutput, NewStoryOutput, ProtoConversation,
    ProtoMessage, ProtoOutput, StoryConversation, StoryMessage, StoryOutput,
};

pub(crate) fn purge_workspace_sdlc(tables: &mut Tables, workspace_id: Uuid) {
    let stories = tables
        .story_conversations
        .drain_where(|c| c.workspace_id == workspace_id);
    for conversation in &stories {
        tables
            .story_messages
            .drain_where(|m| m.conversation_id == conversation.id);
        tables
            .story_outputs
            .drain_where(|o| o.conversation_id == conversation.id);
    }

    let protos = tables
        .proto_conversations
        .drain_where(|c| c.workspace_id == workspace_id);
    for conversation in &protos {
        tables
            .proto_messages
            .drain_where(|m| m.conversation_id == conversation.id);
        tables
            .proto_outputs
            .drain_where(|o| o.conversation_id == conversation.id);
    }
}

#[derive(Clone)]
pub struct SdlcService {
    store: Arc<MemoryStore>,
}

impl SdlcService {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    // ----- story generation -----

    pub async fn create_story_conversation(
        &self,
        req: NewConversation,
    ) -> DataResult<StoryConversation> {
        let mut tables = self.store.write().await;
        require_row(
            &tables.workspaces,
            "story_conversations",
            "workspace_id",
            "workspaces",
            req.workspace_id,
        )?;
        if let Some(user_id) = req.created_by {
            require_row(
                &tables.users,
                "story_conversations",
                "created_by",
                "users",
                user_id,
            )?;
        }

        let now = Utc::now();
        let conversation = StoryConversation {
            id: Uuid::new_v4(),
            workspace_id: req.workspace_id,
            title: req.title,
            created_by: req.created_by,
            created_at: now,
            updated_at: now,
        };
        tables.story_conversations.insert(conversation.clone());
        Ok(conversation)
    }

    pub async fn get_story_conversation(&self, id: Uuid) -> DataResult<StoryConversation> {
        self.store
            .read()
            .await
            .story_conversations
            .get(id)
            .cloned()
            .ok_or_else(|| DataError::not_found("story_conversations", id))
    }

    pub async fn list_story_conversations(
        &self,
        workspace_id: Uuid,
        query: Option<&str>,
    ) -> Vec<StoryConversation> {
        self.store
            .read()
            .await
            .story_conversations
            .iter()
            .filter(|c| c.workspace_id == workspace_id)
            .filter(|c| matches_filter(query, &[Some(c.title.as_str())]))
            .cloned()
            .collect()
    }

    pub async fn update_story_conversation(
        &self,
        mut conversation: StoryConversation,
    ) -> DataResult<StoryConversation> {
        let mut tables = self.store.write().await;
        let created_at = tables
            .story_conversations
            .get(conversation.id)
            .map(|c| c.created_at)
            .ok_or_else(|| DataError::not_found("story_conversations", conversation.id))?;
        require_row(
            &tables.workspaces,
            "story_conversations",
            "workspace_id",
            "workspaces",
            conversation.workspace_id,
        )?;

        conversation.created_at = created_at;
        conversation.updated_at = Utc::now();
        tables.story_conversations.replace(conversation.clone());
        Ok(conversation)
    }

    pub async fn delete_story_conversation(&self, id: Uuid) -> DataResult<()> {
        let mut tables = self.store.write().await;
        tables
            .story_conversations
            .remove(id)
            .ok_or_else(|| DataError::not_found("story_conversations", id))?;
        tables
            .story_messages
            .drain_where(|m| m.conversation_id == id);
        tables
            .story_outputs
            .drain_where(|o| o.conversation_id == id);
        Ok(())
    }

    /// Appends a message; the parent conversation's `updated_at` is bumped
    /// so listings can sort by recent activity.
    pub async fn append_story_message(&self, req: NewMessage) -> DataResult<StoryMessage> {
        if req.content.trim().is_empty() {
            return Err(DataError::validation("message content must not be empty"));
        }

        let mut tables = self.store.write().await;
        require_row(
            &tables.story_conversations,
            "story_messages",
            "conversation_id",
            "story_conversations",
            req.conversation_id,
        )?;

        let now = Utc::now();
        let message = StoryMessage {
            id: Uuid::new_v4(),
            conversation_id: req.conversation_id,
            role: req.role,
            content: req.content,
            created_at: now,
            updated_at: now,
        };
        tables.story_messages.insert(message.clone());
        if let Some(conversation) = tables
            .story_conversations
            .iter_mut()
            .find(|c| c.id == req.conversation_id)
        {
            conversation.updated_at = now;
        }
        Ok(message)
    }

    pub async fn list_story_messages(&self, conversation_id: Uuid) -> Vec<StoryMessage> {
        self.store
            .read()
            .await
            .story_messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect()
    }

    pub async fn delete_story_message(&self, id: Uuid) -> DataResult<()> {
        self.store
            .write()
            .await
            .story_messages
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| DataError::not_found("story_messages", id))
    }

    pub async fn add_story_output(&self, req: NewStoryOutput) -> DataResult<StoryOutput> {
        let mut tables = self.store.write().await;
        require_row(
            &tables.story_conversations,
            "story_outputs",
            "conversation_id",
            "story_conversations",
            req.conversation_id,
        )?;

        let now = Utc::now();
        let output = StoryOutput {
            id: Uuid::new_v4(),
            conversation_id: req.conversation_id,
            title: req.title,
            body: req.body,
            acceptance_criteria: req.acceptance_criteria,
            created_at: now,
            updated_at: now,
        };
        tables.story_outputs.insert(output.clone());
        Ok(output)
    }

    pub async fn list_story_outputs(
        &self,
        conversation_id: Uuid,
        query: Option<&str>,
    ) -> Vec<StoryOutput> {
        self.store
            .read()
            .await
            .story_outputs
            .iter()
            .filter(|o| o.conversation_id == conversation_id)
            .filter(|o| matches_filter(query, &[Some(o.title.as_str())]))
            .cloned()
            .collect()
    }

    pub async fn delete_story_output(&self, id: Uuid) -> DataResult<()> {
        self.store
            .write()
            .await
            .story_outputs
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| DataError::not_found("story_outputs", id))
    }

    // ----- rapid prototyping -----

    pub async fn create_proto_conversation(
        &self,
        req: NewConversation,
    ) -> DataResult<ProtoConversation> {
        let mut tables = self.store.write().await;
        require_row(
            &tables.workspaces,
            "proto_conversations",
            "workspace_id",
            "workspaces",
            req.workspace_id,
        )?;
        if let Some(user_id) = req.created_by {
            require_row(
                &tables.users,
                "proto_conversations",
                "created_by",
                "users",
                user_id,
            )?;
        }

        let now = Utc::now();
        let conversation = ProtoConversation {
            id: Uuid::new_v4(),
            workspace_id: req.workspace_id,
            title: req.title,
            created_by: req.created_by,
            created_at: now,
            updated_at: now,
        };
        tables.proto_conversations.insert(conversation.clone());
        Ok(conversation)
    }

    pub async fn get_proto_conversation(&self, id: Uuid) -> DataResult<ProtoConversation> {
        self.store
            .read()
            .await
            .proto_conversations
            .get(id)
            .cloned()
            .ok_or_else(|| DataError::not_found("proto_conversations", id))
    }

    pub async fn list_proto_conversations(
        &self,
        workspace_id: Uuid,
        query: Option<&str>,
    ) -> Vec<ProtoConversation> {
        self.store
            .read()
            .await
            .proto_conversations
            .iter()
            .filter(|c| c.workspace_id == workspace_id)
            .filter(|c| matches_filter(query, &[Some(c.title.as_str())]))
            .cloned()
            .collect()
    }

    pub async fn update_proto_conversation(
        &self,
        mut conversation: ProtoConversation,
    ) -> DataResult<ProtoConversation> {
        let mut tables = self.store.write().await;
        let created_at = tables
            .proto_conversations
            .get(conversation.id)
            .map(|c| c.created_at)
            .ok_or_else(|| DataError::not_found("proto_conversations", conversation.id))?;
        require_row(
            &tables.workspaces,
            "proto_conversations",
            "workspace_id",
            "workspaces",
            conversation.workspace_id,
        )?;

        conversation.created_at = created_at;
        conversation.updated_at = Utc::now();
        tables.proto_conversations.replace(conversation.clone());
        Ok(conversation)
    }

    pub async fn delete_proto_conversation(&self, id: Uuid) -> DataResult<()> {
        let mut tables = self.store.write().await;
        tables
            .proto_conversations
            .remove(id)
            .ok_or_else(|| DataError::not_found("proto_conversations", id))?;
        tables
            .proto_messages
            .drain_where(|m| m.conversation_id == id);
        tables
            .proto_outputs
            .drain_where(|o| o.conversation_id == id);
        Ok(())
    }

    pub async fn append_proto_message(&self, req: NewMessage) -> DataResult<ProtoMessage> {
        if req.content.trim().is_empty() {
            return Err(DataError::validation("message content must not be empty"));
        }

        let mut tables = self.store.write().await;
        require_row(
            &tables.proto_conversations,
            "proto_messages",
            "conversation_id",
            "proto_conversations",
            req.conversation_id,
        )?;

        let now = Utc::now();
        let message = ProtoMessage {
            id: Uuid::new_v4(),
            conversation_id: req.conversation_id,
            role: req.role,
            content: req.content,
            created_at: now,
            updated_at: now,
        };
        tables.proto_messages.insert(message.clone());
        if let Some(conversation) = tables
            .proto_conversations
            .iter_mut()
            .find(|c| c.id == req.conversation_id)
        {
            conversation.updated_at = now;
        }
        Ok(message)
    }

    pub async fn list_proto_messages(&self, conversation_id: Uuid) -> Vec<ProtoMessage> {
        self.store
            .read()
            .await
            .proto_messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect()
    }

    pub async fn delete_proto_message(&self, id: Uuid) -> DataResult<()> {
        self.store
            .write()
            .await
            .proto_messages
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| DataError::not_found("proto_messages", id))
    }

    pub async fn add_proto_output(&self, req: NewProtoOutput) -> DataResult<ProtoOutput> {
        let mut tables = self.store.write().await;
        require_row(
            &tables.proto_conversations,
            "proto_outputs",
            "conversation_id",
            "proto_conversations",
            req.conversation_id,
        )?;

        let now = Utc::now();
        let output = ProtoOutput {
            id: Uuid::new_v4(),
            conversation_id: req.conversation_id,
            name: req.name,
            files: req.files,
            created_at: now,
            updated_at: now,
        };
        tables.proto_outputs.insert(output.clone());
        Ok(output)
    }

    pub async fn list_proto_outputs(
        &self,
        conversation_id: Uuid,
        query: Option<&str>,
    ) -> Vec<ProtoOutput> {
        self.store
            .read()
            .await
            .proto_outputs
            .iter()
            .filter(|o| o.conversation_id == conversation_id)
            .filter(|o| matches_filter(query, &[Some(o.name.as_str())]))
            .cloned()
            .collect()
    }

    pub async fn delete_proto_output(&self, id: Uuid) -> DataResult<()> {
        self.store
            .write()
            .await
            .proto_outputs
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| DataError::not_found("proto_outputs", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::NewTenant;
    use crate::shared::state::AppState;
    use crate::tests::test_util;
    use crate::workspaces::NewWorkspace;
    use crate::{assert_err, assert_ok};
    use serde_json::json;

    async fn fixture() -> (AppState, Uuid) {
        test_util::setup();
        let state = AppState::new(crate::AppConfig::default());
        let tenant = state
            .directory
            .create_tenant(NewTenant {
                name: "Acme".into(),
                slug: "acme".into(),
                description: None,
            })
            .await
            .unwrap();
        let workspace = state
            .workspaces
            .create_workspace(NewWorkspace {
                tenant_id: tenant.id,
                name: "Core".into(),
                description: None,
            })
            .await
            .unwrap();
        (state, workspace.id)
    }

    #[tokio::test]
    async fn test_story_conversation_delete_cascades() {
        let (state, workspace_id) = fixture().await;
        let conversation = assert_ok!(
            state
                .sdlc
                .create_story_conversation(NewConversation {
                    workspace_id,
                    title: "Checkout revamp".into(),
                    created_by: None,
                })
                .await
        );
        assert_ok!(
            state
                .sdlc
                .append_story_message(NewMessage {
                    conversation_id: conversation.id,
                    role: MessageRole::User,
                    content: "Draft a story for guest checkout".into(),
                })
                .await
        );
        assert_ok!(
            state
                .sdlc
                .add_story_output(NewStoryOutput {
                    conversation_id: conversation.id,
                    title: "Guest checkout".into(),
                    body: "As a shopper...".into(),
                    acceptance_criteria: json!(["no login required"]),
                })
                .await
        );

        assert_ok!(state.sdlc.delete_story_conversation(conversation.id).await);
        assert!(state
            .sdlc
            .list_story_messages(conversation.id)
            .await
            .is_empty());
        assert!(state
            .sdlc
            .list_story_outputs(conversation.id, None)
            .await
            .is_empty());
    }

    #[tokio::test]
    async fn test_subsystems_are_independent() {
        let (state, workspace_id) = fixture().await;
        let story = assert_ok!(
            state
                .sdlc
                .create_story_conversation(NewConversation {
                    workspace_id,
                    title: "Stories".into(),
                    created_by: None,
                })
                .await
        );
        let proto = assert_ok!(
            state
                .sdlc
                .create_proto_conversation(NewConversation {
                    workspace_id,
                    title: "Prototype".into(),
                    created_by: None,
                })
                .await
        );

        // a proto message cannot land in a story conversation
        let err = assert_err!(
            state
                .sdlc
                .append_proto_message(NewMessage {
                    conversation_id: story.id,
                    role: MessageRole::User,
                    content: "hello".into(),
                })
                .await
        );
        assert!(matches!(err, DataError::ForeignKeyViolation { .. }));

        assert_ok!(
            state
                .sdlc
                .append_proto_message(NewMessage {
                    conversation_id: proto.id,
                    role: MessageRole::User,
                    content: "Scaffold a settings page".into(),
                })
                .await
        );
        assert_ok!(state.sdlc.delete_story_conversation(story.id).await);
        assert_eq!(state.sdlc.list_proto_messages(proto.id).await.len(), 1);
    }

    #[tokio::test]
    async fn test_message_bumps_conversation_updated_at() {
        let (state, workspace_id) = fixture().await;
        let conversation = assert_ok!(
            state
                .sdlc
                .create_story_conversation(NewConversation {
                    workspace_id,
                    title: "Stories".into(),
                    created_by: None,
                })
                .await
        );
        assert_ok!(
            state
                .sdlc
                .append_story_message(NewMessage {
                    conversation_id: conversation.id,
                    role: MessageRole::User,
                    content: "hi".into(),
                })
                .await
        );

        let reloaded = assert_ok!(state.sdlc.get_story_conversation(conversation.id).await);
        assert!(reloaded.updated_at >= conversation.updated_at);
    }

    #[tokio::test]
    async fn test_empty_message_rejected() {
        let (state, workspace_id) = fixture().await;
        let conversation = assert_ok!(
            state
                .sdlc
                .create_proto_conversation(NewConversation {
                    workspace_id,
                    title: "Prototype".into(),
                    created_by: None,
                })
                .await
        );
        let err = assert_err!(
            state
                .sdlc
                .append_proto_message(NewMessage {
                    conversation_id: conversation.id,
                    role: MessageRole::User,
                    content: "   ".into(),
                })
                .await
        );
        assert!(matches!(err, DataError::Validation(_)));
    }
}
