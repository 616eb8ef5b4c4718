//! AI studio: model catalog, agents, vector stores, RAG pipelines, MCP
//! server records and the knowledge-base ingestion chain.

pub mod types;

use std::sync::Arc;

use chrono::Utc;
use log::info;
use uuid::Uuid;

use crate::shared::error::{DataError, DataResult};
use crate::store::{matches_filter, require_row, MemoryStore, Tables};

pub use types::{
    AiAgent, AiModel, DocumentChunk, KbDocument, KnowledgeBase, McpServer, ModelKind,
    NewAiAgent, NewAiModel, NewDocumentChunk, NewKbDocument, NewKnowledgeBase, NewMcpServer,
    NewRagPipeline, NewVectorStore, RagPipeline, VectorStore,
};

pub(crate) fn purge_workspace_studio(tables: &mut Tables, workspace_id: Uuid) {
    tables.ai_agents.drain_where(|a| a.workspace_id == workspace_id);
    tables
        .rag_pipelines
        .drain_where(|p| p.workspace_id == workspace_id);
    tables
        .vector_stores
        .drain_where(|v| v.workspace_id == workspace_id);
    tables
        .mcp_servers
        .drain_where(|m| m.workspace_id == workspace_id);

    let knowledge_bases = tables
        .knowledge_bases
        .drain_where(|k| k.workspace_id == workspace_id);
    for kb in &knowledge_bases {
        purge_knowledge_base(tables, kb.id);
    }
}

pub(crate) fn purge_knowledge_base(tables: &mut Tables, knowledge_base_id: Uuid) {
    let documents = tables
        .kb_documents
        .drain_where(|d| d.knowledge_base_id == knowledge_base_id);
    for document in &documents {
        tables
            .document_chunks
            .drain_where(|c| c.document_id == document.id);
    }
}

#[derive(Clone)]
pub struct StudioService {
    store: Arc<MemoryStore>,
}

impl StudioService {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    // ----- models -----

    pub async fn create_model(&self, req: NewAiModel) -> DataResult<AiModel> {
        if req.name.trim().is_empty() {
            return Err(DataError::validation("model name must not be empty"));
        }
        if req.context_window.is_some_and(|w| w <= 0) {
            return Err(DataError::validation("context_window must be positive"));
        }

        let mut tables = self.store.write().await;
        let now = Utc::now();
        let model = AiModel {
            id: Uuid::new_v4(),
            name: req.name,
            provider: req.provider,
            kind: req.kind,
            context_window: req.context_window,
            created_at: now,
            updated_at: now,
        };
        tables.ai_models.insert(model.clone());
        Ok(model)
    }

    pub async fn get_model(&self, id: Uuid) -> DataResult<AiModel> {
        self.store
            .read()
            .await
            .ai_models
            .get(id)
            .cloned()
            .ok_or_else(|| DataError::not_found("ai_models", id))
    }

    pub async fn list_models(&self, query: Option<&str>) -> Vec<AiModel> {
        self.store
            .read()
            .await
            .ai_models
            .iter()
            .filter(|m| {
                matches_filter(query, &[Some(m.name.as_str()), Some(m.provider.as_str())])
            })
            .cloned()
            .collect()
    }

    pub async fn update_model(&self, mut model: AiModel) -> DataResult<AiModel> {
        let mut tables = self.store.write().await;
        let created_at = tables
            .ai_models
            .get(model.id)
            .map(|m| m.created_at)
            .ok_or_else(|| DataError::not_found("ai_models", model.id))?;

        model.created_at = created_at;
        model.updated_at = Utc::now();
        tables.ai_models.replace(model.clone());
        Ok(model)
    }

    /// Models are referenced with mandatory foreign keys, so deletion is
    /// refused while any agent, vector store or pipeline still points here.
    pub async fn delete_model(&self, id: Uuid) -> DataResult<()> {
        let mut tables = self.store.write().await;
        if !tables.ai_models.contains(id) {
            return Err(DataError::not_found("ai_models", id));
        }
        if tables.ai_agents.any(|a| a.model_id == id) {
            return Err(DataError::foreign_key(
                "ai_agents", "model_id", "ai_models", id,
            ));
        }
        if tables.vector_stores.any(|v| v.embedding_model_id == id) {
            return Err(DataError::foreign_key(
                "vector_stores",
                "embedding_model_id",
                "ai_models",
                id,
            ));
        }
        if tables.rag_pipelines.any(|p| p.model_id == id) {
            return Err(DataError::foreign_key(
                "rag_pipelines",
                "model_id",
                "ai_models",
                id,
            ));
        }

        tables.ai_models.remove(id);
        Ok(())
    }

    // ----- agents -----

    pub async fn create_agent(&self, req: NewAiAgent) -> DataResult<AiAgent> {
        if !(0.0..=2.0).contains(&req.temperature) {
            return Err(DataError::validation(
                "temperature must be between 0.0 and 2.0",
            ));
        }

        let mut tables = self.store.write().await;
        require_row(
            &tables.workspaces,
            "ai_agents",
            "workspace_id",
            "workspaces",
            req.workspace_id,
        )?;
        require_row(
            &tables.ai_models,
            "ai_agents",
            "model_id",
            "ai_models",
            req.model_id,
        )?;

        let now = Utc::now();
        let agent = AiAgent {
            id: Uuid::new_v4(),
            workspace_id: req.workspace_id,
            model_id: req.model_id,
            name: req.name,
            description: req.description,
            system_prompt: req.system_prompt,
            temperature: req.temperature,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        tables.ai_agents.insert(agent.clone());
        info!("created agent {} ({})", agent.name, agent.id);
        Ok(agent)
    }

    pub async fn get_agent(&self, id: Uuid) -> DataResult<AiAgent> {
        self.store
            .read()
            .await
            .ai_agents
            .get(id)
            .cloned()
            .ok_or_else(|| DataError::not_found("ai_agents", id))
    }

    pub async fn list_agents(&self, workspace_id: Uuid, query: Option<&str>) -> Vec<AiAgent> {
        self.store
            .read()
            .await
            .ai_agents
            .iter()
            .filter(|a| a.workspace_id == workspace_id)
            .filter(|a| {
                matches_filter(query, &[Some(a.name.as_str()), a.description.as_deref()])
            })
            .cloned()
            .collect()
    }

    pub async fn update_agent(&self, mut agent: AiAgent) -> DataResult<AiAgent> {
        if !(0.0..=2.0).contains(&agent.temperature) {
            return Err(DataError::validation(
                "temperature must be between 0.0 and 2.0",
            ));
        }

        let mut tables = self.store.write().await;
        let created_at = tables
            .ai_agents
            .get(agent.id)
            .map(|a| a.created_at)
            .ok_or_else(|| DataError::not_found("ai_agents", agent.id))?;
        require_row(
            &tables.workspaces,
            "ai_agents",
            "workspace_id",
            "workspaces",
            agent.workspace_id,
        )?;
        require_row(
            &tables.ai_models,
            "ai_agents",
            "model_id",
            "ai_models",
            agent.model_id,
        )?;

        agent.created_at = created_at;
        agent.updated_at = Utc::now();
        tables.ai_agents.replace(agent.clone());
        Ok(agent)
    }

    pub async fn delete_agent(&self, id: Uuid) -> DataResult<()> {
        self.store
            .write()
            .await
            .ai_agents
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| DataError::not_found("ai_agents", id))
    }

    // ----- vector stores -----

    pub async fn create_vector_store(&self, req: NewVectorStore) -> DataResult<VectorStore> {
        if req.dimension <= 0 {
            return Err(DataError::validation("dimension must be positive"));
        }

        let mut tables = self.store.write().await;
        require_row(
            &tables.workspaces,
            "vector_stores",
            "workspace_id",
            "workspaces",
            req.workspace_id,
        )?;
        require_row(
            &tables.ai_models,
            "vector_stores",
            "embedding_model_id",
            "ai_models",
            req.embedding_model_id,
        )?;
        let kind = tables
            .ai_models
            .get(req.embedding_model_id)
            .map(|m| m.kind);
        if kind != Some(ModelKind::Embedding) {
            return Err(DataError::validation(format!(
                "model {} is not an embedding model",
                req.embedding_model_id
            )));
        }

        let now = Utc::now();
        let store = VectorStore {
            id: Uuid::new_v4(),
            workspace_id: req.workspace_id,
            embedding_model_id: req.embedding_model_id,
            name: req.name,
            dimension: req.dimension,
            created_at: now,
            updated_at: now,
        };
        tables.vector_stores.insert(store.clone());
        Ok(store)
    }

    pub async fn get_vector_store(&self, id: Uuid) -> DataResult<VectorStore> {
        self.store
            .read()
            .await
            .vector_stores
            .get(id)
            .cloned()
            .ok_or_else(|| DataError::not_found("vector_stores", id))
    }

    pub async fn list_vector_stores(
        &self,
        workspace_id: Uuid,
        query: Option<&str>,
    ) -> Vec<VectorStore> {
        self.store
            .read()
            .await
            .vector_stores
            .iter()
            .filter(|v| v.workspace_id == workspace_id)
            .filter(|v| matches_filter(query, &[Some(v.name.as_str())]))
            .cloned()
            .collect()
    }

    pub async fn update_vector_store(&self, mut store: VectorStore) -> DataResult<VectorStore> {
        if store.dimension <= 0 {
            return Err(DataError::validation("dimension must be positive"));
        }

        let mut tables = self.store.write().await;
        let created_at = tables
            .vector_stores
            .get(store.id)
            .map(|v| v.created_at)
            .ok_or_else(|| DataError::not_found("vector_stores", store.id))?;
        require_row(
            &tables.ai_models,
            "vector_stores",
            "embedding_model_id",
            "ai_models",
            store.embedding_model_id,
        )?;
        let kind = tables.ai_models.get(store.embedding_model_id).map(|m| m.kind);
        if kind != Some(ModelKind::Embedding) {
            return Err(DataError::validation(format!(
                "model {} is not an embedding model",
                store.embedding_model_id
            )));
        }

        store.created_at = created_at;
        store.updated_at = Utc::now();
        tables.vector_stores.replace(store.clone());
        Ok(store)
    }

    /// Deleting a vector store removes the pipelines built on it and
    /// detaches any knowledge base that pointed at it.
    pub async fn delete_vector_store(&self, id: Uuid) -> DataResult<()> {
        let mut tables = self.store.write().await;
        tables
            .vector_stores
            .remove(id)
            .ok_or_else(|| DataError::not_found("vector_stores", id))?;

        let dropped = tables.rag_pipelines.drain_where(|p| p.vector_store_id == id);
        let now = Utc::now();
        for kb in tables
            .knowledge_bases
            .iter_mut()
            .filter(|k| k.vector_store_id == Some(id))
        {
            kb.vector_store_id = None;
            kb.updated_at = now;
        }

        info!(
            "deleted vector store {id}, dropped {} pipelines",
            dropped.len()
        );
        Ok(())
    }

    // ----- RAG pipelines -----

    pub async fn create_rag_pipeline(&self, req: NewRagPipeline) -> DataResult<RagPipeline> {
        if req.top_k <= 0 {
            return Err(DataError::validation("top_k must be positive"));
        }

        let mut tables = self.store.write().await;
        require_row(
            &tables.workspaces,
            "rag_pipelines",
            "workspace_id",
            "workspaces",
            req.workspace_id,
        )?;
        require_row(
            &tables.vector_stores,
            "rag_pipelines",
            "vector_store_id",
            "vector_stores",
            req.vector_store_id,
        )?;
        require_row(
            &tables.ai_models,
            "rag_pipelines",
            "model_id",
            "ai_models",
            req.model_id,
        )?;
        let store_workspace = tables
            .vector_stores
            .get(req.vector_store_id)
            .map(|v| v.workspace_id);
        if store_workspace != Some(req.workspace_id) {
            return Err(DataError::validation(format!(
                "vector store {} belongs to a different workspace",
                req.vector_store_id
            )));
        }

        let now = Utc::now();
        let pipeline = RagPipeline {
            id: Uuid::new_v4(),
            workspace_id: req.workspace_id,
            vector_store_id: req.vector_store_id,
            model_id: req.model_id,
            name: req.name,
            description: req.description,
            top_k: req.top_k,
            created_at: now,
            updated_at: now,
        };
        tables.rag_pipelines.insert(pipeline.clone());
        Ok(pipeline)
    }

    pub async fn get_rag_pipeline(&self, id: Uuid) -> DataResult<RagPipeline> {
        self.store
            .read()
            .await
            .rag_pipelines
            .get(id)
            .cloned()
            .ok_or_else(|| DataError::not_found("rag_pipelines", id))
    }

    pub async fn list_rag_pipelines(
        &self,
        workspace_id: Uuid,
        query: Option<&str>,
    ) -> Vec<RagPipeline> {
        self.store
            .read()
            .await
            .rag_pipelines
            .iter()
            .filter(|p| p.workspace_id == workspace_id)
            .filter(|p| {
                matches_filter(query, &[Some(p.name.as_str()), p.description.as_deref()])
            })
            .cloned()
            .collect()
    }

    pub async fn update_rag_pipeline(&self, mut pipeline: RagPipeline) -> DataResult<RagPipeline> {
        if pipeline.top_k <= 0 {
            return Err(DataError::validation("top_k must be positive"));
        }

        let mut tables = self.store.write().await;
        let created_at = tables
            .rag_pipelines
            .get(pipeline.id)
            .map(|p| p.created_at)
            .ok_or_else(|| DataError::not_found("rag_pipelines", pipeline.id))?;
        require_row(
            &tables.vector_stores,
            "rag_pipelines",
            "vector_store_id",
            "vector_stores",
            pipeline.vector_store_id,
        )?;
        require_row(
            &tables.ai_models,
            "rag_pipelines",
            "model_id",
            "ai_models",
            pipeline.model_id,
        )?;

        pipeline.created_at = created_at;
        pipeline.updated_at = Utc::now();
        tables.rag_pipelines.replace(pipeline.clone());
        Ok(pipeline)
    }

    pub async fn delete_rag_pipeline(&self, id: Uuid) -> DataResult<()> {
        self.store
            .write()
            .await
            .rag_pipelines
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| DataError::not_found("rag_pipelines", id))
    }

    // ----- MCP servers -----

    pub async fn create_mcp_server(&self, req: NewMcpServer) -> DataResult<McpServer> {
        if req.endpoint.trim().is_empty() {
            return Err(DataError::validation("endpoint must not be empty"));
        }

        let mut tables = self.store.write().await;
        require_row(
            &tables.workspaces,
            "mcp_servers",
            "workspace_id",
            "workspaces",
            req.workspace_id,
        )?;

        let now = Utc::now();
        let server = McpServer {
            id: Uuid::new_v4(),
            workspace_id: req.workspace_id,
            name: req.name,
            endpoint: req.endpoint,
            transport: req.transport,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        tables.mcp_servers.insert(server.clone());
        Ok(server)
    }

    pub async fn get_mcp_server(&self, id: Uuid) -> DataResult<McpServer> {
        self.store
            .read()
            .await
            .mcp_servers
            .get(id)
            .cloned()
            .ok_or_else(|| DataError::not_found("mcp_servers", id))
    }

    pub async fn list_mcp_servers(
        &self,
        workspace_id: Uuid,
        query: Option<&str>,
    ) -> Vec<McpServer> {
        self.store
            .read()
            .await
            .mcp_servers
            .iter()
            .filter(|m| m.workspace_id == workspace_id)
            .filter(|m| {
                matches_filter(query, &[Some(m.name.as_str()), Some(m.endpoint.as_str())])
            })
            .cloned()
            .collect()
    }

    pub async fn update_mcp_server(&self, mut server: McpServer) -> DataResult<McpServer> {
        let mut tables = self.store.write().await;
        let created_at = tables
            .mcp_servers
            .get(server.id)
            .map(|m| m.created_at)
            .ok_or_else(|| DataError::not_found("mcp_servers", server.id))?;
        require_row(
            &tables.workspaces,
            "mcp_servers",
            "workspace_id",
            "workspaces",
            server.workspace_id,
        )?;

        server.created_at = created_at;
        server.updated_at = Utc::now();
        tables.mcp_servers.replace(server.clone());
        Ok(server)
    }

    pub async fn delete_mcp_server(&self, id: Uuid) -> DataResult<()> {
        self.store
            .write()
            .await
            .mcp_servers
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| DataError::not_found("mcp_servers", id))
    }

    // ----- knowledge bases -----

    pub async fn create_knowledge_base(
        &self,
        req: NewKnowledgeBase,
    ) -> DataResult<KnowledgeBase> {
        let mut tables = self.store.write().await;
        require_row(
            &tables.workspaces,
            "knowledge_bases",
            "workspace_id",
            "workspaces",
            req.workspace_id,
        )?;
        if let Some(vector_store_id) = req.vector_store_id {
            require_row(
                &tables.vector_stores,
                "knowledge_bases",
                "vector_store_id",
                "vector_stores",
                vector_store_id,
            )?;
            let store_workspace = tables
                .vector_stores
                .get(vector_store_id)
                .map(|v| v.workspace_id);
            if store_workspace != Some(req.workspace_id) {
                return Err(DataError::validation(format!(
                    "vector store {vector_store_id} belongs to a different workspace"
                )));
            }
        }

        let now = Utc::now();
        let kb = KnowledgeBase {
            id: Uuid::new_v4(),
            workspace_id: req.workspace_id,
            vector_store_id: req.vector_store_id,
            name: req.name,
            description: req.description,
            created_at: now,
            updated_at: now,
        };
        tables.knowledge_bases.insert(kb.clone());
        Ok(kb)
    }

    pub async fn get_knowledge_base(&self, id: Uuid) -> DataResult<KnowledgeBase> {
        self.store
            .read()
            .await
            .knowledge_bases
            .get(id)
            .cloned()
            .ok_or_else(|| DataError::not_found("knowledge_bases", id))
    }

    pub async fn list_knowledge_bases(
        &self,
        workspace_id: Uuid,
        query: Option<&str>,
    ) -> Vec<KnowledgeBase> {
        self.store
            .read()
            .await
            .knowledge_bases
            .iter()
            .filter(|k| k.workspace_id == workspace_id)
            .filter(|k| {
                matches_filter(query, &[Some(k.name.as_str()), k.description.as_deref()])
            })
            .cloned()
            .collect()
    }

    pub async fn update_knowledge_base(
        &self,
        mut kb: KnowledgeBase,
    ) -> DataResult<KnowledgeBase> {
        let mut tables = self.store.write().await;
        let created_at = tables
            .knowledge_bases
            .get(kb.id)
            .map(|k| k.created_at)
            .ok_or_else(|| DataError::not_found("knowledge_bases", kb.id))?;
        if let Some(vector_store_id) = kb.vector_store_id {
            require_row(
                &tables.vector_stores,
                "knowledge_bases",
                "vector_store_id",
                "vector_stores",
                vector_store_id,
            )?;
        }

        kb.created_at = created_at;
        kb.updated_at = Utc::now();
        tables.knowledge_bases.replace(kb.clone());
        Ok(kb)
    }

    /// Deletes the knowledge base, its documents and every chunk of those
    /// documents in one pass.
    pub async fn delete_knowledge_base(&self, id: Uuid) -> DataResult<()> {
        let mut tables = self.store.write().await;
        let kb = tables
            .knowledge_bases
            .remove(id)
            .ok_or_else(|| DataError::not_found("knowledge_bases", id))?;
        purge_knowledge_base(&mut tables, id);
        info!("deleted knowledge base {} ({id})", kb.name);
        Ok(())
    }

    // ----- documents -----

    pub async fn create_document(&self, req: NewKbDocument) -> DataResult<KbDocument> {
        if req.title.trim().is_empty() {
            return Err(DataError::validation("document title must not be empty"));
        }

        let mut tables = self.store.write().await;
        require_row(
            &tables.knowledge_bases,
            "kb_documents",
            "knowledge_base_id",
            "knowledge_bases",
            req.knowledge_base_id,
        )?;

        let now = Utc::now();
        let document = KbDocument {
            id: Uuid::new_v4(),
            knowledge_base_id: req.knowledge_base_id,
            title: req.title,
            source_url: req.source_url,
            created_at: now,
            updated_at: now,
        };
        tables.kb_documents.insert(document.clone());
        Ok(document)
    }

    pub async fn get_document(&self, id: Uuid) -> DataResult<KbDocument> {
        self.store
            .read()
            .await
            .kb_documents
            .get(id)
            .cloned()
            .ok_or_else(|| DataError::not_found("kb_documents", id))
    }

    pub async fn list_documents(
        &self,
        knowledge_base_id: Uuid,
        query: Option<&str>,
    ) -> Vec<KbDocument> {
        self.store
            .read()
            .await
            .kb_documents
            .iter()
            .filter(|d| d.knowledge_base_id == knowledge_base_id)
            .filter(|d| matches_filter(query, &[Some(d.title.as_str())]))
            .cloned()
            .collect()
    }

    pub async fn update_document(&self, mut document: KbDocument) -> DataResult<KbDocument> {
        let mut tables = self.store.write().await;
        let created_at = tables
            .kb_documents
            .get(document.id)
            .map(|d| d.created_at)
            .ok_or_else(|| DataError::not_found("kb_documents", document.id))?;
        require_row(
            &tables.knowledge_bases,
            "kb_documents",
            "knowledge_base_id",
            "knowledge_bases",
            document.knowledge_base_id,
        )?;

        document.created_at = created_at;
        document.updated_at = Utc::now();
        tables.kb_documents.replace(document.clone());
        Ok(document)
    }

    pub async fn delete_document(&self, id: Uuid) -> DataResult<()> {
        let mut tables = self.store.write().await;
        tables
            .kb_documents
            .remove(id)
            .ok_or_else(|| DataError::not_found("kb_documents", id))?;
        tables.document_chunks.drain_where(|c| c.document_id == id);
        Ok(())
    }

    // ----- chunks -----

    pub async fn create_chunk(&self, req: NewDocumentChunk) -> DataResult<DocumentChunk> {
        if req.chunk_index < 0 {
            return Err(DataError::validation("chunk_index must not be negative"));
        }

        let mut tables = self.store.write().await;
        require_row(
            &tables.kb_documents,
            "document_chunks",
            "document_id",
            "kb_documents",
            req.document_id,
        )?;

        let now = Utc::now();
        let chunk = DocumentChunk {
            id: Uuid::new_v4(),
            document_id: req.document_id,
            chunk_index: req.chunk_index,
            content: req.content,
            token_count: req.token_count,
            created_at: now,
            updated_at: now,
        };
        tables.document_chunks.insert(chunk.clone());
        Ok(chunk)
    }

    pub async fn get_chunk(&self, id: Uuid) -> DataResult<DocumentChunk> {
        self.store
            .read()
            .await
            .document_chunks
            .get(id)
            .cloned()
            .ok_or_else(|| DataError::not_found("document_chunks", id))
    }

    pub async fn list_chunks(&self, document_id: Uuid) -> Vec<DocumentChunk> {
        self.store
            .read()
            .await
            .document_chunks
            .iter()
            .filter(|c| c.document_id == document_id)
            .cloned()
            .collect()
    }

    pub async fn delete_chunk(&self, id: Uuid) -> DataResult<()> {
        self.store
            .write()
            .await
            .document_chunks
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| DataError::not_found("document_chunks", id))
    }
}
