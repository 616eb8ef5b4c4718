diesel::table! {
    catalog_domains (id) {
        id -> Uuid,
        workspace_id -> Uuid,
        name -> Text,
        description -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    catalog_systems (id) {
        id -> Uuid,
        domain_id -> Uuid,
        name -> Text,
        description -> Nullable<Text>,
        owner_team_id -> Nullable<Uuid>,
        status -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    catalog_components (id) {
        id -> Uuid,
        system_id -> Uuid,
        name -> Text,
        description -> Nullable<Text>,
        owner_team_id -> Nullable<Uuid>,
        status -> Text,
        repository_url -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    catalog_apis (id) {
        id -> Uuid,
        component_id -> Uuid,
        name -> Text,
        description -> Nullable<Text>,
        owner_team_id -> Nullable<Uuid>,
        status -> Text,
        spec_url -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    catalog_resources (id) {
        id -> Uuid,
        component_id -> Uuid,
        name -> Text,
        description -> Nullable<Text>,
        owner_team_id -> Nullable<Uuid>,
        status -> Text,
        resource_kind -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    releases (id) {
        id -> Uuid,
        workspace_id -> Uuid,
        component_id -> Nullable<Uuid>,
        version -> Text,
        status -> Text,
        notes -> Nullable<Text>,
        released_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}
