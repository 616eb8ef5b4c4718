diesel::table! {
    ai_models (id) {
        id -> Uuid,
        name -> Text,
        provider -> Text,
        kind -> Text,
        context_window -> Nullable<Int4>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    ai_agents (id) {
        id -> Uuid,
        workspace_id -> Uuid,
        model_id -> Uuid,
        name -> Text,
        description -> Nullable<Text>,
        system_prompt -> Text,
        temperature -> Float8,
        is_active -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    vector_stores (id) {
        id -> Uuid,
        workspace_id -> Uuid,
        embedding_model_id -> Uuid,
        name -> Text,
        dimension -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    rag_pipelines (id) {
        id -> Uuid,
        workspace_id -> Uuid,
        vector_store_id -> Uuid,
        model_id -> Uuid,
        name -> Text,
        description -> Nullable<Text>,
        top_k -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    mcp_servers (id) {
        id -> Uuid,
        workspace_id -> Uuid,
        name -> Text,
        endpoint -> Text,
        transport -> Text,
        is_active -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    knowledge_bases (id) {
        id -> Uuid,
        workspace_id -> Uuid,
        vector_store_id -> Nullable<Uuid>,
        name -> Text,
        description -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    kb_documents (id) {
        id -> Uuid,
        knowledge_base_id -> Uuid,
        title -> Text,
        source_url -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    document_chunks (id) {
        id -> Uuid,
        document_id -> Uuid,
        chunk_index -> Int4,
        content -> Text,
        token_count -> Nullable<Int4>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}
