// Two parallel conversation subsystems: story generation and rapid
// prototyping. Same shape, separate tables; they must not be conflated.

diesel::table! {
    story_conversations (id) {
        id -> Uuid,
        workspace_id -> Uuid,
        title -> Text,
        created_by -> Nullable<Uuid>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    story_messages (id) {
        id -> Uuid,
        conversation_id -> Uuid,
        role -> Text,
        content -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    story_outputs (id) {
        id -> Uuid,
        conversation_id -> Uuid,
        title -> Text,
        body -> Text,
        acceptance_criteria -> Jsonb,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    proto_conversations (id) {
        id -> Uuid,
        workspace_id -> Uuid,
        title -> Text,
        created_by -> Nullable<Uuid>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    proto_messages (id) {
        id -> Uuid,
        conversation_id -> Uuid,
        role -> Text,
        content -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    proto_outputs (id) {
        id -> Uuid,
        conversation_id -> Uuid,
        name -> Text,
        files -> Jsonb,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}
