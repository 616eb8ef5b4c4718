//! In-memory reference implementation of the platform schema. Enforces the
//! same unique, foreign-key and cascade rules as the SQL in migrations/,
//! with one write lock over the whole table set so a cascading delete is a
//! single atomic critical section.

mod table;

pub use table::{matches_filter, Record, Table};

use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use crate::catalog::types::{
    CatalogApi, CatalogComponent, CatalogDomain, CatalogResource, CatalogSystem, Release,
};
use crate::directory::types::{Role, Subscription, Tenant, User, UserTenantRole};
use crate::metrics::types::{Dashboard, DashboardWidget, MetricDefinition, MetricPoint};
use crate::sdlc::types::{
    ProtoConversation, ProtoMessage, ProtoOutput, StoryConversation, StoryMessage, StoryOutput,
};
use crate::shared::error::{DataError, DataResult};
use crate::studio::types::{
    AiAgent, AiModel, DocumentChunk, KbDocument, KnowledgeBase, McpServer, RagPipeline,
    VectorStore,
};
use crate::workspaces::types::{
    Team, TeamMember, UserWorkspaceRole, Workspace, WorkspaceMember,
};

/// Implements [`Record`] for entity structs whose primary key field is `id`.
#[macro_export]
macro_rules! impl_record {
    ($($entity:ty),+ $(,)?) => {
        $(
            impl $crate::store::Record for $entity {
                fn id(&self) -> uuid::Uuid {
                    self.id
                }
            }
        )+
    };
}

#[derive(Default)]
pub struct Tables {
    pub tenants: Table<Tenant>,
    pub subscriptions: Table<Subscription>,
    pub users: Table<User>,
    pub roles: Table<Role>,
    pub user_tenant_roles: Table<UserTenantRole>,

    pub workspaces: Table<Workspace>,
    pub teams: Table<Team>,
    pub workspace_members: Table<WorkspaceMember>,
    pub team_members: Table<TeamMember>,
    pub user_workspace_roles: Table<UserWorkspaceRole>,

    pub catalog_domains: Table<CatalogDomain>,
    pub catalog_systems: Table<CatalogSystem>,
    pub catalog_components: Table<CatalogComponent>,
    pub catalog_apis: Table<CatalogApi>,
    pub catalog_resources: Table<CatalogResource>,
    pub releases: Table<Release>,

    pub ai_models: Table<AiModel>,
    pub ai_agents: Table<AiAgent>,
    pub vector_stores: Table<VectorStore>,
    pub rag_pipelines: Table<RagPipeline>,
    pub mcp_servers: Table<McpServer>,
    pub knowledge_bases: Table<KnowledgeBase>,
    pub kb_documents: Table<KbDocument>,
    pub document_chunks: Table<DocumentChunk>,

    pub metric_definitions: Table<MetricDefinition>,
    pub metric_points: Table<MetricPoint>,
    pub dashboards: Table<Dashboard>,
    pub dashboard_widgets: Table<DashboardWidget>,

    pub story_conversations: Table<StoryConversation>,
    pub story_messages: Table<StoryMessage>,
    pub story_outputs: Table<StoryOutput>,
    pub proto_conversations: Table<ProtoConversation>,
    pub proto_messages: Table<ProtoMessage>,
    pub proto_outputs: Table<ProtoOutput>,
}

pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
        }
    }

    pub(crate) async fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().await
    }

    pub(crate) async fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().await
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Foreign-key check used by every create/update path: `id` must resolve in
/// `target_table`, otherwise the referencing row is rejected.
pub(crate) fn require_row<T: Record>(
    target_table: &Table<T>,
    entity: &'static str,
    field: &'static str,
    target: &'static str,
    id: Uuid,
) -> DataResult<()> {
    if target_table.contains(id) {
        Ok(())
    } else {
        Err(DataError::foreign_key(entity, field, target, id))
    }
}
