//! Identity and tenancy: tenants, their subscriptions, platform users,
//! reusable permission roles and per-tenant role assignments.

pub mod types;

use std::sync::Arc;

use bigdecimal::BigDecimal;
use chrono::Utc;
use log::info;
use uuid::Uuid;

use crate::shared::error::{DataError, DataResult};
use crate::store::{matches_filter, require_row, MemoryStore};
use crate::workspaces::purge_workspace;

pub use types::{
    NewRole, NewSubscription, NewTenant, NewUser, NewUserTenantRole, Role, Subscription, Tenant,
    User, UserTenantRole,
};

#[derive(Clone)]
pub struct DirectoryService {
    store: Arc<MemoryStore>,
}

impl DirectoryService {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    // ----- tenants -----

    pub async fn create_tenant(&self, req: NewTenant) -> DataResult<Tenant> {
        let slug = req.slug.trim().to_string();
        if req.name.trim().is_empty() {
            return Err(DataError::validation("tenant name must not be empty"));
        }
        if slug.is_empty()
            || !slug
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(DataError::validation(format!(
                "tenant slug must be lowercase alphanumeric with hyphens, got {slug:?}"
            )));
        }

        let mut tables = self.store.write().await;
        if tables.tenants.any(|t| t.slug == slug) {
            return Err(DataError::unique("tenants.slug", slug));
        }

        let now = Utc::now();
        let tenant = Tenant {
            id: Uuid::new_v4(),
            name: req.name,
            slug,
            description: req.description,
            created_at: now,
            updated_at: now,
        };
        tables.tenants.insert(tenant.clone());
        info!("created tenant {} ({})", tenant.slug, tenant.id);
        Ok(tenant)
    }

    pub async fn get_tenant(&self, id: Uuid) -> DataResult<Tenant> {
        self.store
            .read()
            .await
            .tenants
            .get(id)
            .cloned()
            .ok_or_else(|| DataError::not_found("tenants", id))
    }

    pub async fn list_tenants(&self, query: Option<&str>) -> Vec<Tenant> {
        self.store
            .read()
            .await
            .tenants
            .iter()
            .filter(|t| {
                matches_filter(
                    query,
                    &[
                        Some(t.name.as_str()),
                        Some(t.slug.as_str()),
                        t.description.as_deref(),
                    ],
                )
            })
            .cloned()
            .collect()
    }

    /// Full-row replacement keyed by `tenant.id`. `created_at` is preserved
    /// and `updated_at` is stamped here, whatever the caller passed.
    pub async fn update_tenant(&self, mut tenant: Tenant) -> DataResult<Tenant> {
        let mut tables = self.store.write().await;
        let created_at = tables
            .tenants
            .get(tenant.id)
            .map(|t| t.created_at)
            .ok_or_else(|| DataError::not_found("tenants", tenant.id))?;
        if tables
            .tenants
            .any(|t| t.id != tenant.id && t.slug == tenant.slug)
        {
            return Err(DataError::unique("tenants.slug", tenant.slug));
        }

        tenant.created_at = created_at;
        tenant.updated_at = Utc::now();
        tables.tenants.replace(tenant.clone());
        Ok(tenant)
    }

    /// Deletes the tenant and everything scoped beneath it: subscriptions,
    /// role assignments, and every workspace with its full subtree.
    pub async fn delete_tenant(&self, id: Uuid) -> DataResult<()> {
        let mut tables = self.store.write().await;
        let tenant = tables
            .tenants
            .remove(id)
            .ok_or_else(|| DataError::not_found("tenants", id))?;

        tables.subscriptions.drain_where(|s| s.tenant_id == id);
        tables.user_tenant_roles.drain_where(|r| r.tenant_id == id);
        let workspaces = tables.workspaces.drain_where(|w| w.tenant_id == id);
        for workspace in &workspaces {
            purge_workspace(&mut tables, workspace.id);
        }

        info!(
            "deleted tenant {} with {} workspaces",
            tenant.slug,
            workspaces.len()
        );
        Ok(())
    }

    // ----- subscriptions -----

    pub async fn create_subscription(&self, req: NewSubscription) -> DataResult<Subscription> {
        if req.price_monthly < BigDecimal::from(0) {
            return Err(DataError::validation("price_monthly must not be negative"));
        }
        if req.seats < 1 {
            return Err(DataError::validation("seats must be at least 1"));
        }

        let mut tables = self.store.write().await;
        require_row(
            &tables.tenants,
            "subscriptions",
            "tenant_id",
            "tenants",
            req.tenant_id,
        )?;

        let now = Utc::now();
        let subscription = Subscription {
            id: Uuid::new_v4(),
            tenant_id: req.tenant_id,
            plan_name: req.plan_name,
            price_monthly: req.price_monthly,
            seats: req.seats,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        tables.subscriptions.insert(subscription.clone());
        Ok(subscription)
    }

    pub async fn get_subscription(&self, id: Uuid) -> DataResult<Subscription> {
        self.store
            .read()
            .await
            .subscriptions
            .get(id)
            .cloned()
            .ok_or_else(|| DataError::not_found("subscriptions", id))
    }

    pub async fn list_subscriptions(
        &self,
        tenant_id: Uuid,
        query: Option<&str>,
    ) -> Vec<Subscription> {
        self.store
            .read()
            .await
            .subscriptions
            .iter()
            .filter(|s| s.tenant_id == tenant_id)
            .filter(|s| matches_filter(query, &[Some(s.plan_name.as_str())]))
            .cloned()
            .collect()
    }

    pub async fn update_subscription(
        &self,
        mut subscription: Subscription,
    ) -> DataResult<Subscription> {
        if subscription.price_monthly < BigDecimal::from(0) {
            return Err(DataError::validation("price_monthly must not be negative"));
        }

        let mut tables = self.store.write().await;
        let created_at = tables
            .subscriptions
            .get(subscription.id)
            .map(|s| s.created_at)
            .ok_or_else(|| DataError::not_found("subscriptions", subscription.id))?;
        require_row(
            &tables.tenants,
            "subscriptions",
            "tenant_id",
            "tenants",
            subscription.tenant_id,
        )?;

        subscription.created_at = created_at;
        subscription.updated_at = Utc::now();
        tables.subscriptions.replace(subscription.clone());
        Ok(subscription)
    }

    pub async fn delete_subscription(&self, id: Uuid) -> DataResult<()> {
        self.store
            .write()
            .await
            .subscriptions
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| DataError::not_found("subscriptions", id))
    }

    // ----- users -----

    pub async fn create_user(&self, req: NewUser) -> DataResult<User> {
        let email = req.email.trim().to_lowercase();
        if !email.contains('@') {
            return Err(DataError::validation(format!("invalid email: {email:?}")));
        }

        let mut tables = self.store.write().await;
        if tables.users.any(|u| u.email == email) {
            return Err(DataError::unique("users.email", email));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email,
            display_name: req.display_name,
            avatar_url: req.avatar_url,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(user.clone());
        Ok(user)
    }

    pub async fn get_user(&self, id: Uuid) -> DataResult<User> {
        self.store
            .read()
            .await
            .users
            .get(id)
            .cloned()
            .ok_or_else(|| DataError::not_found("users", id))
    }

    pub async fn list_users(&self, query: Option<&str>) -> Vec<User> {
        self.store
            .read()
            .await
            .users
            .iter()
            .filter(|u| {
                matches_filter(
                    query,
                    &[Some(u.display_name.as_str()), Some(u.email.as_str())],
                )
            })
            .cloned()
            .collect()
    }

    pub async fn update_user(&self, mut user: User) -> DataResult<User> {
        user.email = user.email.trim().to_lowercase();
        if !user.email.contains('@') {
            return Err(DataError::validation(format!(
                "invalid email: {:?}",
                user.email
            )));
        }

        let mut tables = self.store.write().await;
        let created_at = tables
            .users
            .get(user.id)
            .map(|u| u.created_at)
            .ok_or_else(|| DataError::not_found("users", user.id))?;
        if tables.users.any(|u| u.id != user.id && u.email == user.email) {
            return Err(DataError::unique("users.email", user.email));
        }

        user.created_at = created_at;
        user.updated_at = Utc::now();
        tables.users.replace(user.clone());
        Ok(user)
    }

    /// Removes the user, every membership and role assignment they hold, and
    /// nulls the `created_by` reference on rows they authored.
    pub async fn delete_user(&self, id: Uuid) -> DataResult<()> {
        let mut tables = self.store.write().await;
        tables
            .users
            .remove(id)
            .ok_or_else(|| DataError::not_found("users", id))?;

        tables.user_tenant_roles.drain_where(|r| r.user_id == id);
        tables.user_workspace_roles.drain_where(|r| r.user_id == id);
        tables.workspace_members.drain_where(|m| m.user_id == id);
        tables.team_members.drain_where(|m| m.user_id == id);

        let now = Utc::now();
        for dashboard in tables
            .dashboards
            .iter_mut()
            .filter(|d| d.created_by == Some(id))
        {
            dashboard.created_by = None;
            dashboard.updated_at = now;
        }
        for conversation in tables
            .story_conversations
            .iter_mut()
            .filter(|c| c.created_by == Some(id))
        {
            conversation.created_by = None;
            conversation.updated_at = now;
        }
        for conversation in tables
            .proto_conversations
            .iter_mut()
            .filter(|c| c.created_by == Some(id))
        {
            conversation.created_by = None;
            conversation.updated_at = now;
        }

        info!("deleted user {id}");
        Ok(())
    }

    // ----- roles -----

    pub async fn create_role(&self, req: NewRole) -> DataResult<Role> {
        validate_permissions(&req.permissions)?;
        if req.name.trim().is_empty() {
            return Err(DataError::validation("role name must not be empty"));
        }

        let mut tables = self.store.write().await;
        if tables.roles.any(|r| r.name == req.name) {
            return Err(DataError::unique("roles.name", req.name));
        }

        let now = Utc::now();
        let role = Role {
            id: Uuid::new_v4(),
            name: req.name,
            description: req.description,
            permissions: req.permissions,
            created_at: now,
            updated_at: now,
        };
        tables.roles.insert(role.clone());
        Ok(role)
    }

    pub async fn get_role(&self, id: Uuid) -> DataResult<Role> {
        self.store
            .read()
            .await
            .roles
            .get(id)
            .cloned()
            .ok_or_else(|| DataError::not_found("roles", id))
    }

    pub async fn list_roles(&self, query: Option<&str>) -> Vec<Role> {
        self.store
            .read()
            .await
            .roles
            .iter()
            .filter(|r| matches_filter(query, &[Some(r.name.as_str()), r.description.as_deref()]))
            .cloned()
            .collect()
    }

    pub async fn update_role(&self, mut role: Role) -> DataResult<Role> {
        validate_permissions(&role.permissions)?;

        let mut tables = self.store.write().await;
        let created_at = tables
            .roles
            .get(role.id)
            .map(|r| r.created_at)
            .ok_or_else(|| DataError::not_found("roles", role.id))?;
        if tables.roles.any(|r| r.id != role.id && r.name == role.name) {
            return Err(DataError::unique("roles.name", role.name));
        }

        role.created_at = created_at;
        role.updated_at = Utc::now();
        tables.roles.replace(role.clone());
        Ok(role)
    }

    /// Deleting a role cascades its tenant-level assignments.
    pub async fn delete_role(&self, id: Uuid) -> DataResult<()> {
        let mut tables = self.store.write().await;
        tables
            .roles
            .remove(id)
            .ok_or_else(|| DataError::not_found("roles", id))?;
        tables.user_tenant_roles.drain_where(|r| r.role_id == id);
        Ok(())
    }

    // ----- tenant role assignments -----

    pub async fn assign_tenant_role(&self, req: NewUserTenantRole) -> DataResult<UserTenantRole> {
        let mut tables = self.store.write().await;
        require_row(
            &tables.users,
            "user_tenant_roles",
            "user_id",
            "users",
            req.user_id,
        )?;
        require_row(
            &tables.tenants,
            "user_tenant_roles",
            "tenant_id",
            "tenants",
            req.tenant_id,
        )?;
        require_row(
            &tables.roles,
            "user_tenant_roles",
            "role_id",
            "roles",
            req.role_id,
        )?;
        if tables
            .user_tenant_roles
            .any(|r| r.user_id == req.user_id && r.tenant_id == req.tenant_id)
        {
            return Err(DataError::unique(
                "user_tenant_roles(user_id, tenant_id)",
                format!("{}/{}", req.user_id, req.tenant_id),
            ));
        }

        let now = Utc::now();
        let assignment = UserTenantRole {
            id: Uuid::new_v4(),
            user_id: req.user_id,
            tenant_id: req.tenant_id,
            role_id: req.role_id,
            created_at: now,
            updated_at: now,
        };
        tables.user_tenant_roles.insert(assignment.clone());
        Ok(assignment)
    }

    pub async fn list_tenant_roles(&self, tenant_id: Uuid) -> Vec<UserTenantRole> {
        self.store
            .read()
            .await
            .user_tenant_roles
            .iter()
            .filter(|r| r.tenant_id == tenant_id)
            .cloned()
            .collect()
    }

    pub async fn unassign_tenant_role(&self, id: Uuid) -> DataResult<()> {
        self.store
            .write()
            .await
            .user_tenant_roles
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| DataError::not_found("user_tenant_roles", id))
    }
}

fn validate_permissions(permissions: &serde_json::Value) -> DataResult<()> {
    match permissions.as_array() {
        Some(entries) if entries.iter().all(serde_json::Value::is_string) => Ok(()),
        _ => Err(DataError::validation(
            "role permissions must be a JSON array of strings",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::state::AppState;
    use crate::tests::test_util;
    use crate::{assert_err, assert_ok};
    use serde_json::json;

    fn state() -> AppState {
        test_util::setup();
        AppState::new(crate::AppConfig::default())
    }

    fn new_tenant(slug: &str) -> NewTenant {
        NewTenant {
            name: format!("{slug} inc"),
            slug: slug.to_string(),
            description: None,
        }
    }

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            display_name: "Dev".into(),
            avatar_url: None,
        }
    }

    fn new_role(name: &str) -> NewRole {
        NewRole {
            name: name.to_string(),
            description: None,
            permissions: json!([]),
        }
    }

    #[tokio::test]
    async fn test_duplicate_tenant_slug_rejected() {
        let state = state();
        assert_ok!(state.directory.create_tenant(new_tenant("acme")).await);

        let err = assert_err!(state.directory.create_tenant(new_tenant("acme")).await);
        assert!(matches!(
            err,
            DataError::UniqueConstraintViolation {
                constraint: "tenants.slug",
                ..
            }
        ));

        // the first insert is unaffected
        assert_eq!(state.directory.list_tenants(None).await.len(), 1);
    }

    #[tokio::test]
    async fn test_tenant_slug_validation() {
        let state = state();
        let err = assert_err!(state.directory.create_tenant(new_tenant("Not A Slug")).await);
        assert!(matches!(err, DataError::Validation(_)));
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected_case_insensitively() {
        let state = state();
        assert_ok!(state.directory.create_user(new_user("dev@acme.io")).await);
        let err = assert_err!(state.directory.create_user(new_user("DEV@acme.io")).await);
        assert!(matches!(err, DataError::UniqueConstraintViolation { .. }));
    }

    #[tokio::test]
    async fn test_subscription_requires_existing_tenant() {
        let state = state();
        let err = assert_err!(
            state
                .directory
                .create_subscription(NewSubscription {
                    tenant_id: Uuid::new_v4(),
                    plan_name: "team".into(),
                    price_monthly: BigDecimal::from(49),
                    seats: 5,
                })
                .await
        );
        assert!(matches!(err, DataError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_role_permissions_must_be_string_array() {
        let state = state();
        let err = assert_err!(
            state
                .directory
                .create_role(NewRole {
                    name: "admin".into(),
                    description: None,
                    permissions: json!({"read": true}),
                })
                .await
        );
        assert!(matches!(err, DataError::Validation(_)));

        assert_ok!(
            state
                .directory
                .create_role(NewRole {
                    name: "admin".into(),
                    description: None,
                    permissions: json!(["catalog:read", "catalog:write"]),
                })
                .await
        );
    }

    #[tokio::test]
    async fn test_tenant_role_assignment_unique_per_user_and_tenant() {
        let state = state();
        let tenant = assert_ok!(state.directory.create_tenant(new_tenant("acme")).await);
        let user = assert_ok!(state.directory.create_user(new_user("dev@acme.io")).await);
        let admin = assert_ok!(state.directory.create_role(new_role("admin")).await);
        let viewer = assert_ok!(state.directory.create_role(new_role("viewer")).await);

        assert_ok!(
            state
                .directory
                .assign_tenant_role(NewUserTenantRole {
                    user_id: user.id,
                    tenant_id: tenant.id,
                    role_id: admin.id,
                })
                .await
        );
        // a second role in the same tenant violates the pair constraint even
        // though the role differs
        let err = assert_err!(
            state
                .directory
                .assign_tenant_role(NewUserTenantRole {
                    user_id: user.id,
                    tenant_id: tenant.id,
                    role_id: viewer.id,
                })
                .await
        );
        assert!(matches!(err, DataError::UniqueConstraintViolation { .. }));
    }

    #[tokio::test]
    async fn test_role_delete_cascades_assignments() {
        let state = state();
        let tenant = assert_ok!(state.directory.create_tenant(new_tenant("acme")).await);
        let user = assert_ok!(state.directory.create_user(new_user("dev@acme.io")).await);
        let role = assert_ok!(state.directory.create_role(new_role("admin")).await);
        assert_ok!(
            state
                .directory
                .assign_tenant_role(NewUserTenantRole {
                    user_id: user.id,
                    tenant_id: tenant.id,
                    role_id: role.id,
                })
                .await
        );

        assert_ok!(state.directory.delete_role(role.id).await);
        assert!(state.directory.list_tenant_roles(tenant.id).await.is_empty());
    }

    #[tokio::test]
    async fn test_update_preserves_created_at_and_bumps_updated_at() {
        let state = state();
        let tenant = assert_ok!(state.directory.create_tenant(new_tenant("acme")).await);

        let mut changed = tenant.clone();
        changed.name = "Acme Corporation".into();
        // callers cannot smuggle their own timestamps through an update
        changed.created_at = Utc::now() + chrono::Duration::days(30);
        let updated = assert_ok!(state.directory.update_tenant(changed).await);

        assert_eq!(updated.created_at, tenant.created_at);
        assert!(updated.updated_at >= tenant.updated_at);
        assert_eq!(updated.name, "Acme Corporation");
    }

    #[tokio::test]
    async fn test_tenant_filter_matches_name_and_slug() {
        let state = state();
        assert_ok!(state.directory.create_tenant(new_tenant("acme")).await);
        assert_ok!(state.directory.create_tenant(new_tenant("globex")).await);

        assert_eq!(state.directory.list_tenants(Some("ACME")).await.len(), 1);
        assert_eq!(state.directory.list_tenants(Some("")).await.len(), 2);
        assert_eq!(state.directory.list_tenants(None).await.len(), 2);
    }
}
