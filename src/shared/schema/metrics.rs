diesel::table! {
    metric_definitions (id) {
        id -> Uuid,
        name -> Text,
        description -> Nullable<Text>,
        unit -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    metric_points (id) {
        id -> Uuid,
        metric_id -> Uuid,
        workspace_id -> Uuid,
        value -> Numeric,
        recorded_at -> Timestamptz,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    dashboards (id) {
        id -> Uuid,
        workspace_id -> Uuid,
        name -> Text,
        description -> Nullable<Text>,
        created_by -> Nullable<Uuid>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    dashboard_widgets (id) {
        id -> Uuid,
        dashboard_id -> Uuid,
        title -> Text,
        metric_id -> Nullable<Uuid>,
        size -> Text,
        position -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}
