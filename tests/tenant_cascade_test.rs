//! End-to-end cascade coverage: deleting a tenant must leave no orphan row
//! in any table scoped beneath it, while unrelated tenants stay intact.

use bigdecimal::BigDecimal;
use serde_json::json;

use deskhub::catalog::{
    CatalogStatus, NewCatalogApi, NewCatalogComponent, NewCatalogDomain, NewCatalogResource,
    NewCatalogSystem, NewRelease,
};
use deskhub::directory::{NewSubscription, NewTenant, NewUser};
use deskhub::metrics::{NewDashboard, NewDashboardWidget, NewMetricDefinition, NewMetricPoint, WidgetSize};
use deskhub::sdlc::{MessageRole, NewConversation, NewMessage, NewStoryOutput};
use deskhub::studio::{
    ModelKind, NewAiAgent, NewAiModel, NewDocumentChunk, NewKbDocument, NewKnowledgeBase,
    NewRagPipeline, NewVectorStore,
};
use deskhub::workspaces::{NewTeam, NewTeamMember, NewUserWorkspaceRole, NewWorkspace, NewWorkspaceMember, WorkspaceRole};
use deskhub::{AppConfig, AppState, DataError};

#[tokio::test]
async fn test_tenant_delete_leaves_no_orphans() {
    let state = AppState::new(AppConfig::default());

    let tenant = state
        .directory
        .create_tenant(NewTenant {
            name: "Acme".into(),
            slug: "acme".into(),
            description: None,
        })
        .await
        .unwrap();
    let bystander = state
        .directory
        .create_tenant(NewTenant {
            name: "Globex".into(),
            slug: "globex".into(),
            description: None,
        })
        .await
        .unwrap();

    state
        .directory
        .create_subscription(NewSubscription {
            tenant_id: tenant.id,
            plan_name: "enterprise".into(),
            price_monthly: BigDecimal::from(499),
            seats: 50,
        })
        .await
        .unwrap();

    let user = state
        .directory
        .create_user(NewUser {
            email: "dev@acme.io".into(),
            display_name: "Dev".into(),
            avatar_url: None,
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
    let bystander_workspace = state
        .workspaces
        .create_workspace(NewWorkspace {
            tenant_id: bystander.id,
            name: "Core".into(),
            description: None,
        })
        .await
        .unwrap();

    let team = state
        .workspaces
        .create_team(NewTeam {
            workspace_id: workspace.id,
            name: "Platform".into(),
            description: None,
        })
        .await
        .unwrap();
    state
        .workspaces
        .add_workspace_member(NewWorkspaceMember {
            workspace_id: workspace.id,
            user_id: user.id,
        })
        .await
        .unwrap();
    state
        .workspaces
        .add_team_member(NewTeamMember {
            team_id: team.id,
            user_id: user.id,
        })
        .await
        .unwrap();
    state
        .workspaces
        .assign_workspace_role(NewUserWorkspaceRole {
            user_id: user.id,
            workspace_id: workspace.id,
            role: WorkspaceRole::Owner,
        })
        .await
        .unwrap();

    // full catalog chain
    let domain = state
        .catalog
        .create_domain(NewCatalogDomain {
            workspace_id: workspace.id,
            name: "Payments".into(),
            description: None,
        })
        .await
        .unwrap();
    let system = state
        .catalog
        .create_system(NewCatalogSystem {
            domain_id: domain.id,
            name: "checkout".into(),
            description: None,
            owner_team_id: Some(team.id),
            status: CatalogStatus::Production,
        })
        .await
        .unwrap();
    let component = state
        .catalog
        .create_component(NewCatalogComponent {
            system_id: system.id,
            name: "cart-service".into(),
            description: None,
            owner_team_id: None,
            status: CatalogStatus::Production,
            repository_url: None,
        })
        .await
        .unwrap();
    let api = state
        .catalog
        .create_api(NewCatalogApi {
            component_id: component.id,
            name: "cart-api".into(),
            description: None,
            owner_team_id: None,
            status: CatalogStatus::Active,
            spec_url: None,
        })
        .await
        .unwrap();
    let resource = state
        .catalog
        .create_resource(NewCatalogResource {
            component_id: component.id,
            name: "cart-db".into(),
            description: None,
            owner_team_id: None,
            status: CatalogStatus::Active,
            resource_kind: "database".into(),
        })
        .await
        .unwrap();
    let release = state
        .catalog
        .create_release(NewRelease {
            workspace_id: workspace.id,
            component_id: Some(component.id),
            version: "2.0.0".into(),
            status: CatalogStatus::Pending,
            notes: None,
            released_at: None,
        })
        .await
        .unwrap();

    // AI studio chain (models are global and must survive)
    let embedding_model = state
        .studio
        .create_model(NewAiModel {
            name: "embed-small".into(),
            provider: "openai".into(),
            kind: ModelKind::Embedding,
            context_window: Some(8192),
        })
        .await
        .unwrap();
    let chat_model = state
        .studio
        .create_model(NewAiModel {
            name: "chat-large".into(),
            provider: "anthropic".into(),
            kind: ModelKind::Chat,
            context_window: None,
        })
        .await
        .unwrap();
    let agent = state
        .studio
        .create_agent(NewAiAgent {
            workspace_id: workspace.id,
            model_id: chat_model.id,
            name: "helper".into(),
            description: None,
            system_prompt: "You are helpful.".into(),
            temperature: 0.3,
        })
        .await
        .unwrap();
    let vector_store = state
        .studio
        .create_vector_store(NewVectorStore {
            workspace_id: workspace.id,
            embedding_model_id: embedding_model.id,
            name: "docs".into(),
            dimension: 1536,
        })
        .await
        .unwrap();
    let pipeline = state
        .studio
        .create_rag_pipeline(NewRagPipeline {
            workspace_id: workspace.id,
            vector_store_id: vector_store.id,
            model_id: chat_model.id,
            name: "qa".into(),
            description: None,
            top_k: 5,
        })
        .await
        .unwrap();
    let kb = state
        .studio
        .create_knowledge_base(NewKnowledgeBase {
            workspace_id: workspace.id,
            vector_store_id: Some(vector_store.id),
            name: "handbook".into(),
            description: None,
        })
        .await
        .unwrap();
    let document = state
        .studio
        .create_document(NewKbDocument {
            knowledge_base_id: kb.id,
            title: "onboarding".into(),
            source_url: None,
        })
        .await
        .unwrap();
    let chunk = state
        .studio
        .create_chunk(NewDocumentChunk {
            document_id: document.id,
            chunk_index: 0,
            content: "Welcome aboard.".into(),
            token_count: Some(3),
        })
        .await
        .unwrap();

    // metrics and conversations
    let metric = state
        .metrics
        .create_metric(NewMetricDefinition {
            name: "deploy_frequency".into(),
            description: None,
            unit: "count/day".into(),
        })
        .await
        .unwrap();
    state
        .metrics
        .record_point(NewMetricPoint {
            metric_id: metric.id,
            workspace_id: workspace.id,
            value: BigDecimal::from(3),
            recorded_at: chrono::Utc::now(),
        })
        .await
        .unwrap();
    let dashboard = state
        .metrics
        .create_dashboard(NewDashboard {
            workspace_id: workspace.id,
            name: "Engineering".into(),
            description: None,
            created_by: Some(user.id),
        })
        .await
        .unwrap();
    let widget = state
        .metrics
        .add_widget(NewDashboardWidget {
            dashboard_id: dashboard.id,
            title: "Deploys".into(),
            metric_id: Some(metric.id),
            size: WidgetSize::Medium,
            position: 0,
        })
        .await
        .unwrap();
    let conversation = state
        .sdlc
        .create_story_conversation(NewConversation {
            workspace_id: workspace.id,
            title: "Checkout revamp".into(),
            created_by: Some(user.id),
        })
        .await
        .unwrap();
    state
        .sdlc
        .append_story_message(NewMessage {
            conversation_id: conversation.id,
            role: MessageRole::User,
            content: "Draft the story".into(),
        })
        .await
        .unwrap();
    state
        .sdlc
        .add_story_output(NewStoryOutput {
            conversation_id: conversation.id,
            title: "Guest checkout".into(),
            body: "As a shopper...".into(),
            acceptance_criteria: json!(["no login required"]),
        })
        .await
        .unwrap();

    // the whole subtree disappears with the tenant
    state.directory.delete_tenant(tenant.id).await.unwrap();

    assert!(matches!(
        state.directory.get_tenant(tenant.id).await.unwrap_err(),
        DataError::NotFound { .. }
    ));
    assert!(state
        .directory
        .list_subscriptions(tenant.id, None)
        .await
        .is_empty());
    assert!(state
        .workspaces
        .list_workspaces(tenant.id, None)
        .await
        .is_empty());
    assert!(state.workspaces.get_team(team.id).await.is_err());
    assert!(state
        .workspaces
        .list_workspace_members(workspace.id)
        .await
        .is_empty());
    assert!(state
        .workspaces
        .list_workspace_roles(workspace.id)
        .await
        .is_empty());
    assert!(state.workspaces.list_team_members(team.id).await.is_empty());

    assert!(state.catalog.get_domain(domain.id).await.is_err());
    assert!(state.catalog.get_system(system.id).await.is_err());
    assert!(state.catalog.get_component(component.id).await.is_err());
    assert!(state.catalog.get_api(api.id).await.is_err());
    assert!(state.catalog.get_resource(resource.id).await.is_err());
    assert!(state.catalog.get_release(release.id).await.is_err());

    assert!(state.studio.get_agent(agent.id).await.is_err());
    assert!(state.studio.get_vector_store(vector_store.id).await.is_err());
    assert!(state.studio.get_rag_pipeline(pipeline.id).await.is_err());
    assert!(state.studio.get_knowledge_base(kb.id).await.is_err());
    assert!(state.studio.get_document(document.id).await.is_err());
    assert!(state.studio.get_chunk(chunk.id).await.is_err());

    assert!(state.metrics.get_dashboard(dashboard.id).await.is_err());
    assert!(state.metrics.get_widget(widget.id).await.is_err());
    assert!(state
        .metrics
        .list_points(metric.id, Some(workspace.id))
        .await
        .is_empty());
    assert!(state
        .sdlc
        .get_story_conversation(conversation.id)
        .await
        .is_err());
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

    // global rows and unrelated tenants are untouched
    assert!(state.studio.get_model(chat_model.id).await.is_ok());
    assert!(state.studio.get_model(embedding_model.id).await.is_ok());
    assert!(state.metrics.get_metric(metric.id).await.is_ok());
    assert!(state.directory.get_user(user.id).await.is_ok());
    assert!(state.directory.get_tenant(bystander.id).await.is_ok());
    assert_eq!(
        state
            .workspaces
            .list_workspaces(bystander.id, None)
            .await
            .len(),
        1
    );
    assert!(state
        .workspaces
        .get_workspace(bystander_workspace.id)
        .await
        .is_ok());
}
