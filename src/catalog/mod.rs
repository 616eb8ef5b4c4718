//! Service catalog: a four-level ownership hierarchy (domain, system,
//! component, api/resource) plus release tracking. Systems and everything
//! below may name an owning team; that reference never blocks or cascades.

pub mod types;

use std::sync::Arc;

use chrono::Utc;
use log::info;
use uuid::Uuid;

use crate::shared::error::{DataError, DataResult};
use crate::store::{matches_filter, require_row, MemoryStore, Tables};

pub use types::{
    CatalogApi, CatalogComponent, CatalogDomain, CatalogResource, CatalogStatus, CatalogSystem,
    NewCatalogApi, NewCatalogComponent, NewCatalogDomain, NewCatalogResource, NewCatalogSystem,
    NewRelease, Release,
};

pub(crate) fn purge_workspace_catalog(tables: &mut Tables, workspace_id: Uuid) {
    let domains = tables
        .catalog_domains
        .drain_where(|d| d.workspace_id == workspace_id);
    for domain in &domains {
        purge_domain(tables, domain.id);
    }
    tables.releases.drain_where(|r| r.workspace_id == workspace_id);
}

pub(crate) fn purge_domain(tables: &mut Tables, domain_id: Uuid) {
    let systems = tables
        .catalog_systems
        .drain_where(|s| s.domain_id == domain_id);
    for system in &systems {
        purge_system(tables, system.id);
    }
}

pub(crate) fn purge_system(tables: &mut Tables, system_id: Uuid) {
    let components = tables
        .catalog_components
        .drain_where(|c| c.system_id == system_id);
    for component in &components {
        purge_component(tables, component.id);
    }
}

pub(crate) fn purge_component(tables: &mut Tables, component_id: Uuid) {
    tables
        .catalog_apis
        .drain_where(|a| a.component_id == component_id);
    tables
        .catalog_resources
        .drain_where(|r| r.component_id == component_id);

    let now = Utc::now();
    for release in tables
        .releases
        .iter_mut()
        .filter(|r| r.component_id == Some(component_id))
    {
        release.component_id = None;
        release.updated_at = now;
    }
}

/// Nulls `owner_team_id` wherever the deleted team was named as owner.
pub(crate) fn release_team_ownership(tables: &mut Tables, team_id: Uuid) {
    let now = Utc::now();
    for system in tables
        .catalog_systems
        .iter_mut()
        .filter(|s| s.owner_team_id == Some(team_id))
    {
        system.owner_team_id = None;
        system.updated_at = now;
    }
    for component in tables
        .catalog_components
        .iter_mut()
        .filter(|c| c.owner_team_id == Some(team_id))
    {
        component.owner_team_id = None;
        component.updated_at = now;
    }
    for api in tables
        .catalog_apis
        .iter_mut()
        .filter(|a| a.owner_team_id == Some(team_id))
    {
        api.owner_team_id = None;
        api.updated_at = now;
    }
    for resource in tables
        .catalog_resources
        .iter_mut()
        .filter(|r| r.owner_team_id == Some(team_id))
    {
        resource.owner_team_id = None;
        resource.updated_at = now;
    }
}

fn workspace_of_domain(tables: &Tables, domain_id: Uuid) -> Option<Uuid> {
    tables
        .catalog_domains
        .get(domain_id)
        .map(|d| d.workspace_id)
}

fn workspace_of_system(tables: &Tables, system_id: Uuid) -> Option<Uuid> {
    let domain_id = tables.catalog_systems.get(system_id)?.domain_id;
    workspace_of_domain(tables, domain_id)
}

fn workspace_of_component(tables: &Tables, component_id: Uuid) -> Option<Uuid> {
    let system_id = tables.catalog_components.get(component_id)?.system_id;
    workspace_of_system(tables, system_id)
}

/// An owning team is optional, but when present it must exist and belong to
/// the same workspace as the row naming it.
fn validate_owner_team(
    tables: &Tables,
    entity: &'static str,
    owner_team_id: Option<Uuid>,
    workspace_id: Option<Uuid>,
) -> DataResult<()> {
    let Some(team_id) = owner_team_id else {
        return Ok(());
    };
    require_row(&tables.teams, entity, "owner_team_id", "teams", team_id)?;
    let team_workspace = tables.teams.get(team_id).map(|t| t.workspace_id);
    if workspace_id.is_some() && team_workspace != workspace_id {
        return Err(DataError::validation(format!(
            "owner team {team_id} belongs to a different workspace"
        )));
    }
    Ok(())
}

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<MemoryStore>,
}

impl CatalogService {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    // ----- domains -----

    pub async fn create_domain(&self, req: NewCatalogDomain) -> DataResult<CatalogDomain> {
        if req.name.trim().is_empty() {
            return Err(DataError::validation("domain name must not be empty"));
        }

        let mut tables = self.store.write().await;
        require_row(
            &tables.workspaces,
            "catalog_domains",
            "workspace_id",
            "workspaces",
            req.workspace_id,
        )?;

        let now = Utc::now();
        let domain = CatalogDomain {
            id: Uuid::new_v4(),
            workspace_id: req.workspace_id,
            name: req.name,
            description: req.description,
            created_at: now,
            updated_at: now,
        };
        tables.catalog_domains.insert(domain.clone());
        Ok(domain)
    }

    pub async fn get_domain(&self, id: Uuid) -> DataResult<CatalogDomain> {
        self.store
            .read()
            .await
            .catalog_domains
            .get(id)
            .cloned()
            .ok_or_else(|| DataError::not_found("catalog_domains", id))
    }

    pub async fn list_domains(
        &self,
        workspace_id: Uuid,
        query: Option<&str>,
    ) -> Vec<CatalogDomain> {
        self.store
            .read()
            .await
            .catalog_domains
            .iter()
            .filter(|d| d.workspace_id == workspace_id)
            .filter(|d| {
                matches_filter(query, &[Some(d.name.as_str()), d.description.as_deref()])
            })
            .cloned()
            .collect()
    }

    pub async fn update_domain(&self, mut domain: CatalogDomain) -> DataResult<CatalogDomain> {
        let mut tables = self.store.write().await;
        let created_at = tables
            .catalog_domains
            .get(domain.id)
            .map(|d| d.created_at)
            .ok_or_else(|| DataError::not_found("catalog_domains", domain.id))?;
        require_row(
            &tables.workspaces,
            "catalog_domains",
            "workspace_id",
            "workspaces",
            domain.workspace_id,
        )?;

        domain.created_at = created_at;
        domain.updated_at = Utc::now();
        tables.catalog_domains.replace(domain.clone());
        Ok(domain)
    }

    pub async fn delete_domain(&self, id: Uuid) -> DataResult<()> {
        let mut tables = self.store.write().await;
        let domain = tables
            .catalog_domains
            .remove(id)
            .ok_or_else(|| DataError::not_found("catalog_domains", id))?;
        purge_domain(&mut tables, id);
        info!("deleted catalog domain {} ({id})", domain.name);
        Ok(())
    }

    // ----- systems -----

    pub async fn create_system(&self, req: NewCatalogSystem) -> DataResult<CatalogSystem> {
        let mut tables = self.store.write().await;
        require_row(
            &tables.catalog_domains,
            "catalog_systems",
            "domain_id",
            "catalog_domains",
            req.domain_id,
        )?;
        let workspace = workspace_of_domain(&tables, req.domain_id);
        validate_owner_team(&tables, "catalog_systems", req.owner_team_id, workspace)?;

        let now = Utc::now();
        let system = CatalogSystem {
            id: Uuid::new_v4(),
            domain_id: req.domain_id,
            name: req.name,
            description: req.description,
            owner_team_id: req.owner_team_id,
            status: req.status,
            created_at: now,
            updated_at: now,
        };
        tables.catalog_systems.insert(system.clone());
        Ok(system)
    }

    pub async fn get_system(&self, id: Uuid) -> DataResult<CatalogSystem> {
        self.store
            .read()
            .await
            .catalog_systems
            .get(id)
            .cloned()
            .ok_or_else(|| DataError::not_found("catalog_systems", id))
    }

    pub async fn list_systems(&self, domain_id: Uuid, query: Option<&str>) -> Vec<CatalogSystem> {
        self.store
            .read()
            .await
            .catalog_systems
            .iter()
            .filter(|s| s.domain_id == domain_id)
            .filter(|s| {
                matches_filter(query, &[Some(s.name.as_str()), s.description.as_deref()])
            })
            .cloned()
            .collect()
    }

    pub async fn update_system(&self, mut system: CatalogSystem) -> DataResult<CatalogSystem> {
        let mut tables = self.store.write().await;
        let created_at = tables
            .catalog_systems
            .get(system.id)
            .map(|s| s.created_at)
            .ok_or_else(|| DataError::not_found("catalog_systems", system.id))?;
        require_row(
            &tables.catalog_domains,
            "catalog_systems",
            "domain_id",
            "catalog_domains",
            system.domain_id,
        )?;
        let workspace = workspace_of_domain(&tables, system.domain_id);
        validate_owner_team(&tables, "catalog_systems", system.owner_team_id, workspace)?;

        system.created_at = created_at;
        system.updated_at = Utc::now();
        tables.catalog_systems.replace(system.clone());
        Ok(system)
    }

    pub async fn delete_system(&self, id: Uuid) -> DataResult<()> {
        let mut tables = self.store.write().await;
        tables
            .catalog_systems
            .remove(id)
            .ok_or_else(|| DataError::not_found("catalog_systems", id))?;
        purge_system(&mut tables, id);
        Ok(())
    }

    // ----- components -----

    pub async fn create_component(
        &self,
        req: NewCatalogComponent,
    ) -> DataResult<CatalogComponent> {
        let mut tables = self.store.write().await;
        require_row(
            &tables.catalog_systems,
            "catalog_components",
            "system_id",
            "catalog_systems",
            req.system_id,
        )?;
        let workspace = workspace_of_system(&tables, req.system_id);
        validate_owner_team(&tables, "catalog_components", req.owner_team_id, workspace)?;

        let now = Utc::now();
        let component = CatalogComponent {
            id: Uuid::new_v4(),
            system_id: req.system_id,
            name: req.name,
            description: req.description,
            owner_team_id: req.owner_team_id,
            status: req.status,
            repository_url: req.repository_url,
            created_at: now,
            updated_at: now,
        };
        tables.catalog_components.insert(component.clone());
        Ok(component)
    }

    pub async fn get_component(&self, id: Uuid) -> DataResult<CatalogComponent> {
        self.store
            .read()
            .await
            .catalog_components
            .get(id)
            .cloned()
            .ok_or_else(|| DataError::not_found("catalog_components", id))
    }

    pub async fn list_components(
        &self,
        system_id: Uuid,
        query: Option<&str>,
    ) -> Vec<CatalogComponent> {
        self.store
            .read()
            .await
            .catalog_components
            .iter()
            .filter(|c| c.system_id == system_id)
            .filter(|c| {
                matches_filter(query, &[Some(c.name.as_str()), c.description.as_deref()])
            })
            .cloned()
            .collect()
    }

    pub async fn update_component(
        &self,
        mut component: CatalogComponent,
    ) -> DataResult<CatalogComponent> {
        let mut tables = self.store.write().await;
        let created_at = tables
            .catalog_components
            .get(component.id)
            .map(|c| c.created_at)
            .ok_or_else(|| DataError::not_found("catalog_components", component.id))?;
        require_row(
            &tables.catalog_systems,
            "catalog_components",
            "system_id",
            "catalog_systems",
            component.system_id,
        )?;
        let workspace = workspace_of_system(&tables, component.system_id);
        validate_owner_team(
            &tables,
            "catalog_components",
            component.owner_team_id,
            workspace,
        )?;

        component.created_at = created_at;
        component.updated_at = Utc::now();
        tables.catalog_components.replace(component.clone());
        Ok(component)
    }

    pub async fn delete_component(&self, id: Uuid) -> DataResult<()> {
        let mut tables = self.store.write().await;
        tables
            .catalog_components
            .remove(id)
            .ok_or_else(|| DataError::not_found("catalog_components", id))?;
        purge_component(&mut tables, id);
        Ok(())
    }

    // ----- apis -----

    pub async fn create_api(&self, req: NewCatalogApi) -> DataResult<CatalogApi> {
        let mut tables = self.store.write().await;
        require_row(
            &tables.catalog_components,
            "catalog_apis",
            "component_id",
            "catalog_components",
            req.component_id,
        )?;
        let workspace = workspace_of_component(&tables, req.component_id);
        validate_owner_team(&tables, "catalog_apis", req.owner_team_id, workspace)?;

        let now = Utc::now();
        let api = CatalogApi {
            id: Uuid::new_v4(),
            component_id: req.component_id,
            name: req.name,
            description: req.description,
            owner_team_id: req.owner_team_id,
            status: req.status,
            spec_url: req.spec_url,
            created_at: now,
            updated_at: now,
        };
        tables.catalog_apis.insert(api.clone());
        Ok(api)
    }

    pub async fn get_api(&self, id: Uuid) -> DataResult<CatalogApi> {
        self.store
            .read()
            .await
            .catalog_apis
            .get(id)
            .cloned()
            .ok_or_else(|| DataError::not_found("catalog_apis", id))
    }

    pub async fn list_apis(&self, component_id: Uuid, query: Option<&str>) -> Vec<CatalogApi> {
        self.store
            .read()
            .await
            .catalog_apis
            .iter()
            .filter(|a| a.component_id == component_id)
            .filter(|a| {
                matches_filter(query, &[Some(a.name.as_str()), a.description.as_deref()])
            })
            .cloned()
            .collect()
    }

    pub async fn update_api(&self, mut api: CatalogApi) -> DataResult<CatalogApi> {
        let mut tables = self.store.write().await;
        let created_at = tables
            .catalog_apis
            .get(api.id)
            .map(|a| a.created_at)
            .ok_or_else(|| DataError::not_found("catalog_apis", api.id))?;
        require_row(
            &tables.catalog_components,
            "catalog_apis",
            "component_id",
            "catalog_components",
            api.component_id,
        )?;
        let workspace = workspace_of_component(&tables, api.component_id);
        validate_owner_team(&tables, "catalog_apis", api.owner_team_id, workspace)?;

        api.created_at = created_at;
        api.updated_at = Utc::now();
        tables.catalog_apis.replace(api.clone());
        Ok(api)
    }

    pub async fn delete_api(&self, id: Uuid) -> DataResult<()> {
        self.store
            .write()
            .await
            .catalog_apis
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| DataError::not_found("catalog_apis", id))
    }

    // ----- resources -----

    pub async fn create_resource(&self, req: NewCatalogResource) -> DataResult<CatalogResource> {
        let mut tables = self.store.write().await;
        require_row(
            &tables.catalog_components,
            "catalog_resources",
            "component_id",
            "catalog_components",
            req.component_id,
        )?;
        let workspace = workspace_of_component(&tables, req.component_id);
        validate_owner_team(&tables, "catalog_resources", req.owner_team_id, workspace)?;

        let now = Utc::now();
        let resource = CatalogResource {
            id: Uuid::new_v4(),
            component_id: req.component_id,
            name: req.name,
            description: req.description,
            owner_team_id: req.owner_team_id,
            status: req.status,
            resource_kind: req.resource_kind,
            created_at: now,
            updated_at: now,
        };
        tables.catalog_resources.insert(resource.clone());
        Ok(resource)
    }

    pub async fn get_resource(&self, id: Uuid) -> DataResult<CatalogResource> {
        self.store
            .read()
            .await
            .catalog_resources
            .get(id)
            .cloned()
            .ok_or_else(|| DataError::not_found("catalog_resources", id))
    }

    pub async fn list_resources(
        &self,
        component_id: Uuid,
        query: Option<&str>,
    ) -> Vec<CatalogResource> {
        self.store
            .read()
            .await
            .catalog_resources
            .iter()
            .filter(|r| r.component_id == component_id)
            .filter(|r| {
                matches_filter(query, &[Some(r.name.as_str()), r.description.as_deref()])
            })
            .cloned()
            .collect()
    }

    pub async fn update_resource(
        &self,
        mut resource: CatalogResource,
    ) -> DataResult<CatalogResource> {
        let mut tables = self.store.write().await;
        let created_at = tables
            .catalog_resources
            .get(resource.id)
            .map(|r| r.created_at)
            .ok_or_else(|| DataError::not_found("catalog_resources", resource.id))?;
        require_row(
            &tables.catalog_components,
            "catalog_resources",
            "component_id",
            "catalog_components",
            resource.component_id,
        )?;
        let workspace = workspace_of_component(&tables, resource.component_id);
        validate_owner_team(&tables, "catalog_resources", resource.owner_team_id, workspace)?;

        resource.created_at = created_at;
        resource.updated_at = Utc::now();
        tables.catalog_resources.replace(resource.clone());
        Ok(resource)
    }

    pub async fn delete_resource(&self, id: Uuid) -> DataResult<()> {
        self.store
            .write()
            .await
            .catalog_resources
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| DataError::not_found("catalog_resources", id))
    }

    // ----- releases -----

    pub async fn create_release(&self, req: NewRelease) -> DataResult<Release> {
        if req.version.trim().is_empty() {
            return Err(DataError::validation("release version must not be empty"));
        }

        let mut tables = self.store.write().await;
        require_row(
            &tables.workspaces,
            "releases",
            "workspace_id",
            "workspaces",
            req.workspace_id,
        )?;
        if let Some(component_id) = req.component_id {
            require_row(
                &tables.catalog_components,
                "releases",
                "component_id",
                "catalog_components",
                component_id,
            )?;
            if workspace_of_component(&tables, component_id) != Some(req.workspace_id) {
                return Err(DataError::validation(format!(
                    "component {component_id} belongs to a different workspace"
                )));
            }
        }

        let now = Utc::now();
        let release = Release {
            id: Uuid::new_v4(),
            workspace_id: req.workspace_id,
            component_id: req.component_id,
            version: req.version,
            status: req.status,
            notes: req.notes,
            released_at: req.released_at,
            created_at: now,
            updated_at: now,
        };
        tables.releases.insert(release.clone());
        Ok(release)
    }

    pub async fn get_release(&self, id: Uuid) -> DataResult<Release> {
        self.store
            .read()
            .await
            .releases
            .get(id)
            .cloned()
            .ok_or_else(|| DataError::not_found("releases", id))
    }

    pub async fn list_releases(&self, workspace_id: Uuid, query: Option<&str>) -> Vec<Release> {
        self.store
            .read()
            .await
            .releases
            .iter()
            .filter(|r| r.workspace_id == workspace_id)
            .filter(|r| matches_filter(query, &[Some(r.version.as_str()), r.notes.as_deref()]))
            .cloned()
            .collect()
    }

    pub async fn update_release(&self, mut release: Release) -> DataResult<Release> {
        let mut tables = self.store.write().await;
        let created_at = tables
            .releases
            .get(release.id)
            .map(|r| r.created_at)
            .ok_or_else(|| DataError::not_found("releases", release.id))?;
        require_row(
            &tables.workspaces,
            "releases",
            "workspace_id",
            "workspaces",
            release.workspace_id,
        )?;
        if let Some(component_id) = release.component_id {
            require_row(
                &tables.catalog_components,
                "releases",
                "component_id",
                "catalog_components",
                component_id,
            )?;
        }

        release.created_at = created_at;
        release.updated_at = Utc::now();
        tables.releases.replace(release.clone());
        Ok(release)
    }

    pub async fn delete_release(&self, id: Uuid) -> DataResult<()> {
        self.store
            .write()
            .await
            .releases
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| DataError::not_found("releases", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::NewTenant;
    use crate::shared::state::AppState;
    use crate::tests::test_util;
    use crate::workspaces::{NewTeam, NewWorkspace};
    use crate::{assert_err, assert_ok};

    struct Fixture {
        state: AppState,
        workspace_id: Uuid,
        domain: CatalogDomain,
    }

    async fn fixture() -> Fixture {
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
        let domain = state
            .catalog
            .create_domain(NewCatalogDomain {
                workspace_id: workspace.id,
                name: "Payments".into(),
                description: None,
            })
            .await
            .unwrap();
        Fixture {
            state,
            workspace_id: workspace.id,
            domain,
        }
    }

    fn new_system(domain_id: Uuid, name: &str) -> NewCatalogSystem {
        NewCatalogSystem {
            domain_id,
            name: name.into(),
            description: None,
            owner_team_id: None,
            status: CatalogStatus::Active,
        }
    }

    #[tokio::test]
    async fn test_domain_delete_cascades_to_system() {
        let fx = fixture().await;
        let system = assert_ok!(
            fx.state
                .catalog
                .create_system(new_system(fx.domain.id, "checkout"))
                .await
        );

        assert_ok!(fx.state.catalog.delete_domain(fx.domain.id).await);
        let err = assert_err!(fx.state.catalog.get_system(system.id).await);
        assert!(matches!(err, DataError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_component_delete_cascades_apis_and_nulls_releases() {
        let fx = fixture().await;
        let system = assert_ok!(
            fx.state
                .catalog
                .create_system(new_system(fx.domain.id, "checkout"))
                .await
        );
        let component = assert_ok!(
            fx.state
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
        );
        let api = assert_ok!(
            fx.state
                .catalog
                .create_api(NewCatalogApi {
                    component_id: component.id,
                    name: "cart-api".into(),
                    description: None,
                    owner_team_id: None,
                    status: CatalogStatus::Production,
                    spec_url: None,
                })
                .await
        );
        let release = assert_ok!(
            fx.state
                .catalog
                .create_release(NewRelease {
                    workspace_id: fx.workspace_id,
                    component_id: Some(component.id),
                    version: "1.4.0".into(),
                    status: CatalogStatus::Production,
                    notes: None,
                    released_at: None,
                })
                .await
        );

        assert_ok!(fx.state.catalog.delete_component(component.id).await);
        assert!(matches!(
            assert_err!(fx.state.catalog.get_api(api.id).await),
            DataError::NotFound { .. }
        ));
        let release = assert_ok!(fx.state.catalog.get_release(release.id).await);
        assert_eq!(release.component_id, None);
    }

    #[tokio::test]
    async fn test_team_delete_nulls_owner_not_system() {
        let fx = fixture().await;
        let team = assert_ok!(
            fx.state
                .workspaces
                .create_team(NewTeam {
                    workspace_id: fx.workspace_id,
                    name: "Payments Crew".into(),
                    description: None,
                })
                .await
        );
        let mut req = new_system(fx.domain.id, "checkout");
        req.owner_team_id = Some(team.id);
        let system = assert_ok!(fx.state.catalog.create_system(req).await);

        assert_ok!(fx.state.workspaces.delete_team(team.id).await);
        let system = assert_ok!(fx.state.catalog.get_system(system.id).await);
        assert_eq!(system.owner_team_id, None);
    }

    #[tokio::test]
    async fn test_owner_team_must_share_workspace() {
        let fx = fixture().await;
        let other_tenant = assert_ok!(
            fx.state
                .directory
                .create_tenant(NewTenant {
                    name: "Globex".into(),
                    slug: "globex".into(),
                    description: None,
                })
                .await
        );
        let other_workspace = assert_ok!(
            fx.state
                .workspaces
                .create_workspace(NewWorkspace {
                    tenant_id: other_tenant.id,
                    name: "Core".into(),
                    description: None,
                })
                .await
        );
        let foreign_team = assert_ok!(
            fx.state
                .workspaces
                .create_team(NewTeam {
                    workspace_id: other_workspace.id,
                    name: "Intruders".into(),
                    description: None,
                })
                .await
        );

        let mut req = new_system(fx.domain.id, "checkout");
        req.owner_team_id = Some(foreign_team.id);
        let err = assert_err!(fx.state.catalog.create_system(req).await);
        assert!(matches!(err, DataError::Validation(_)));
    }

    #[tokio::test]
    async fn test_system_requires_existing_domain() {
        let fx = fixture().await;
        let err = assert_err!(
            fx.state
                .catalog
                .create_system(new_system(Uuid::new_v4(), "orphan"))
                .await
        );
        assert!(matches!(err, DataError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_list_filter_is_case_insensitive_and_idempotent() {
        let fx = fixture().await;
        assert_ok!(
            fx.state
                .catalog
                .create_system(new_system(fx.domain.id, "Widget Service"))
                .await
        );
        assert_ok!(
            fx.state
                .catalog
                .create_system(new_system(fx.domain.id, "Billing Engine"))
                .await
        );

        let all = fx.state.catalog.list_systems(fx.domain.id, None).await;
        let blank = fx.state.catalog.list_systems(fx.domain.id, Some("")).await;
        assert_eq!(all.len(), 2);
        assert_eq!(
            all.iter().map(|s| s.id).collect::<Vec<_>>(),
            blank.iter().map(|s| s.id).collect::<Vec<_>>()
        );

        let upper = fx.state.catalog.list_systems(fx.domain.id, Some("WIDGET")).await;
        let lower = fx.state.catalog.list_systems(fx.domain.id, Some("widget")).await;
        assert_eq!(upper.len(), 1);
        assert_eq!(
            upper.iter().map(|s| s.id).collect::<Vec<_>>(),
            lower.iter().map(|s| s.id).collect::<Vec<_>>()
        );
        // any filtered result is a subset of the unfiltered listing
        assert!(upper.iter().all(|s| all.iter().any(|a| a.id == s.id)));
    }

    #[tokio::test]
    async fn test_status_parsing_is_closed() {
        assert_eq!(
            "maintenance".parse::<CatalogStatus>().unwrap(),
            CatalogStatus::Maintenance
        );
        let err = "retired".parse::<CatalogStatus>().unwrap_err();
        assert!(matches!(err, DataError::Validation(_)));
    }
}
