use chrono::{DateTime, Utc};
use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgValue};
use diesel::prelude::*;
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use serde::{Deserialize, Serialize};
use std::io::Write;
use uuid::Uuid;

use crate::impl_record;
use crate::shared::error::DataError;
use crate::shared::schema::studio::{
    ai_agents, ai_models, document_chunks, kb_documents, knowledge_bases, mcp_servers,
    rag_pipelines, vector_stores,
};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsExpression, FromSqlRow,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Chat,
    Embedding,
    Rerank,
}

impl ModelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Embedding => "embedding",
            Self::Rerank => "rerank",
        }
    }
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ModelKind {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chat" => Ok(Self::Chat),
            "embedding" => Ok(Self::Embedding),
            "rerank" => Ok(Self::Rerank),
            other => Err(DataError::validation(format!(
                "unknown model kind: {other:?}"
            ))),
        }
    }
}

impl ToSql<Text, Pg> for ModelKind {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for ModelKind {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        std::str::from_utf8(bytes.as_bytes())?
            .parse()
            .map_err(Into::into)
    }
}

/// Platform-level model catalog entry. Models are global: no workspace
/// scoping, and deletion is refused while anything still references them.
#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable, Identifiable)]
#[diesel(table_name = ai_models)]
pub struct AiModel {
    pub id: Uuid,
    pub name: String,
    pub provider: String,
    pub kind: ModelKind,
    pub context_window: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable, Identifiable)]
#[diesel(table_name = ai_agents)]
pub struct AiAgent {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub model_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub system_prompt: String,
    pub temperature: f64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable, Identifiable)]
#[diesel(table_name = vector_stores)]
pub struct VectorStore {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub embedding_model_id: Uuid,
    pub name: String,
    pub dimension: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable, Identifiable)]
#[diesel(table_name = rag_pipelines)]
pub struct RagPipeline {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub vector_store_id: Uuid,
    pub model_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub top_k: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Externally-addressed MCP endpoint record. Data only; nothing here
/// connects to the server.
#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable, Identifiable)]
#[diesel(table_name = mcp_servers)]
pub struct McpServer {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub name: String,
    pub endpoint: String,
    pub transport: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable, Identifiable)]
#[diesel(table_name = knowledge_bases)]
pub struct KnowledgeBase {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub vector_store_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable, Identifiable)]
#[diesel(table_name = kb_documents)]
pub struct KbDocument {
    pub id: Uuid,
    pub knowledge_base_id: Uuid,
    pub title: String,
    pub source_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable, Identifiable)]
#[diesel(table_name = document_chunks)]
pub struct DocumentChunk {
    pub id: Uuid,
    pub document_id: Uuid,
    pub chunk_index: i32,
    pub content: String,
    pub token_count: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_record!(
    AiModel,
    AiAgent,
    VectorStore,
    RagPipeline,
    McpServer,
    KnowledgeBase,
    KbDocument,
    DocumentChunk,
);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAiModel {
    pub name: String,
    pub provider: String,
    pub kind: ModelKind,
    pub context_window: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAiAgent {
    pub workspace_id: Uuid,
    pub model_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub system_prompt: String,
    pub temperature: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewVectorStore {
    pub workspace_id: Uuid,
    pub embedding_model_id: Uuid,
    pub name: String,
    pub dimension: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRagPipeline {
    pub workspace_id: Uuid,
    pub vector_store_id: Uuid,
    pub model_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub top_k: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMcpServer {
    pub workspace_id: Uuid,
    pub name: String,
    pub endpoint: String,
    pub transport: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewKnowledgeBase {
    pub workspace_id: Uuid,
    pub vector_store_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewKbDocument {
    pub knowledge_base_id: Uuid,
    pub title: String,
    pub source_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDocumentChunk {
    pub document_id: Uuid,
    pub chunk_index: i32,
    pub content: String,
    pub token_count: Option<i32>,
}
