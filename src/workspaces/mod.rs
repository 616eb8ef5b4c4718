//! Workspaces and teams: the containers every catalog, AI and metrics
//! entity hangs off, plus the membership and role-assignment join tables.

pub mod types;

use std::sync::Arc;

use chrono::Utc;
use log::info;
use uuid::Uuid;

use crate::shared::error::{DataError, DataResult};
use crate::store::{matches_filter, require_row, MemoryStore, Tables};

pub use types::{
    NewTeam, NewTeamMember, NewUserWorkspaceRole, NewWorkspace, NewWorkspaceMember, Team,
    TeamMember, UserWorkspaceRole, Workspace, WorkspaceMember, WorkspaceRole,
};

/// Removes every row scoped beneath one workspace. Runs inside the caller's
/// write guard so a tenant delete drains all of its workspaces atomically.
pub(crate) fn purge_workspace(tables: &mut Tables, workspace_id: Uuid) {
    tables
        .workspace_members
        .drain_where(|m| m.workspace_id == workspace_id);
    tables
        .user_workspace_roles
        .drain_where(|r| r.workspace_id == workspace_id);

    crate::catalog::purge_workspace_catalog(tables, workspace_id);
    crate::studio::purge_workspace_studio(tables, workspace_id);
    crate::metrics::purge_workspace_metrics(tables, workspace_id);
    crate::sdlc::purge_workspace_sdlc(tables, workspace_id);

    let teams = tables.teams.drain_where(|t| t.workspace_id == workspace_id);
    for team in &teams {
        tables.team_members.drain_where(|m| m.team_id == team.id);
    }
}

#[derive(Clone)]
pub struct WorkspaceService {
    store: Arc<MemoryStore>,
}

impl WorkspaceService {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    // ----- workspaces -----

    pub async fn create_workspace(&self, req: NewWorkspace) -> DataResult<Workspace> {
        if req.name.trim().is_empty() {
            return Err(DataError::validation("workspace name must not be empty"));
        }

        let mut tables = self.store.write().await;
        require_row(
            &tables.tenants,
            "workspaces",
            "tenant_id",
            "tenants",
            req.tenant_id,
        )?;
        if tables
            .workspaces
            .any(|w| w.tenant_id == req.tenant_id && w.name == req.name)
        {
            return Err(DataError::unique("workspaces(tenant_id, name)", req.name));
        }

        let now = Utc::now();
        let workspace = Workspace {
            id: Uuid::new_v4(),
            tenant_id: req.tenant_id,
            name: req.name,
            description: req.description,
            created_at: now,
            updated_at: now,
        };
        tables.workspaces.insert(workspace.clone());
        info!("created workspace {} ({})", workspace.name, workspace.id);
        Ok(workspace)
    }

    pub async fn get_workspace(&self, id: Uuid) -> DataResult<Workspace> {
        self.store
            .read()
            .await
            .workspaces
            .get(id)
            .cloned()
            .ok_or_else(|| DataError::not_found("workspaces", id))
    }

    pub async fn list_workspaces(&self, tenant_id: Uuid, query: Option<&str>) -> Vec<Workspace> {
        self.store
            .read()
            .await
            .workspaces
            .iter()
            .filter(|w| w.tenant_id == tenant_id)
            .filter(|w| {
                matches_filter(query, &[Some(w.name.as_str()), w.description.as_deref()])
            })
            .cloned()
            .collect()
    }

    pub async fn update_workspace(&self, mut workspace: Workspace) -> DataResult<Workspace> {
        let mut tables = self.store.write().await;
        let created_at = tables
            .workspaces
            .get(workspace.id)
            .map(|w| w.created_at)
            .ok_or_else(|| DataError::not_found("workspaces", workspace.id))?;
        require_row(
            &tables.tenants,
            "workspaces",
            "tenant_id",
            "tenants",
            workspace.tenant_id,
        )?;
        if tables.workspaces.any(|w| {
            w.id != workspace.id && w.tenant_id == workspace.tenant_id && w.name == workspace.name
        }) {
            return Err(DataError::unique(
                "workspaces(tenant_id, name)",
                workspace.name,
            ));
        }

        workspace.created_at = created_at;
        workspace.updated_at = Utc::now();
        tables.workspaces.replace(workspace.clone());
        Ok(workspace)
    }

    pub async fn delete_workspace(&self, id: Uuid) -> DataResult<()> {
        let mut tables = self.store.write().await;
        let workspace = tables
            .workspaces
            .remove(id)
            .ok_or_else(|| DataError::not_found("workspaces", id))?;
        purge_workspace(&mut tables, id);
        info!("deleted workspace {} ({id})", workspace.name);
        Ok(())
    }

    // ----- teams -----

    pub async fn create_team(&self, req: NewTeam) -> DataResult<Team> {
        if req.name.trim().is_empty() {
            return Err(DataError::validation("team name must not be empty"));
        }

        let mut tables = self.store.write().await;
        require_row(
            &tables.workspaces,
            "teams",
            "workspace_id",
            "workspaces",
            req.workspace_id,
        )?;
        if tables
            .teams
            .any(|t| t.workspace_id == req.workspace_id && t.name == req.name)
        {
            return Err(DataError::unique("teams(workspace_id, name)", req.name));
        }

        let now = Utc::now();
        let team = Team {
            id: Uuid::new_v4(),
            workspace_id: req.workspace_id,
            name: req.name,
            description: req.description,
            created_at: now,
            updated_at: now,
        };
        tables.teams.insert(team.clone());
        Ok(team)
    }

    pub async fn get_team(&self, id: Uuid) -> DataResult<Team> {
        self.store
            .read()
            .await
            .teams
            .get(id)
            .cloned()
            .ok_or_else(|| DataError::not_found("teams", id))
    }

    pub async fn list_teams(&self, workspace_id: Uuid, query: Option<&str>) -> Vec<Team> {
        self.store
            .read()
            .await
            .teams
            .iter()
            .filter(|t| t.workspace_id == workspace_id)
            .filter(|t| {
                matches_filter(query, &[Some(t.name.as_str()), t.description.as_deref()])
            })
            .cloned()
            .collect()
    }

    pub async fn update_team(&self, mut team: Team) -> DataResult<Team> {
        let mut tables = self.store.write().await;
        let created_at = tables
            .teams
            .get(team.id)
            .map(|t| t.created_at)
            .ok_or_else(|| DataError::not_found("teams", team.id))?;
        require_row(
            &tables.workspaces,
            "teams",
            "workspace_id",
            "workspaces",
            team.workspace_id,
        )?;
        if tables
            .teams
            .any(|t| t.id != team.id && t.workspace_id == team.workspace_id && t.name == team.name)
        {
            return Err(DataError::unique("teams(workspace_id, name)", team.name));
        }

        team.created_at = created_at;
        team.updated_at = Utc::now();
        tables.teams.replace(team.clone());
        Ok(team)
    }

    /// Deleting a team never cascades into the catalog: rows owned by the
    /// team keep existing with `owner_team_id` set to null.
    pub async fn delete_team(&self, id: Uuid) -> DataResult<()> {
        let mut tables = self.store.write().await;
        tables
            .teams
            .remove(id)
            .ok_or_else(|| DataError::not_found("teams", id))?;
        tables.team_members.drain_where(|m| m.team_id == id);
        crate::catalog::release_team_ownership(&mut tables, id);
        Ok(())
    }

    // ----- workspace membership -----

    pub async fn add_workspace_member(
        &self,
        req: NewWorkspaceMember,
    ) -> DataResult<WorkspaceMember> {
        let mut tables = self.store.write().await;
        require_row(
            &tables.workspaces,
            "workspace_members",
            "workspace_id",
            "workspaces",
            req.workspace_id,
        )?;
        require_row(
            &tables.users,
            "workspace_members",
            "user_id",
            "users",
            req.user_id,
        )?;
        if tables
            .workspace_members
            .any(|m| m.workspace_id == req.workspace_id && m.user_id == req.user_id)
        {
            return Err(DataError::unique(
                "workspace_members(workspace_id, user_id)",
                format!("{}/{}", req.workspace_id, req.user_id),
            ));
        }

        let now = Utc::now();
        let member = WorkspaceMember {
            id: Uuid::new_v4(),
            workspace_id: req.workspace_id,
            user_id: req.user_id,
            created_at: now,
            updated_at: now,
        };
        tables.workspace_members.insert(member.clone());
        Ok(member)
    }

    pub async fn list_workspace_members(&self, workspace_id: Uuid) -> Vec<WorkspaceMember> {
        self.store
            .read()
            .await
            .workspace_members
            .iter()
            .filter(|m| m.workspace_id == workspace_id)
            .cloned()
            .collect()
    }

    pub async fn remove_workspace_member(&self, id: Uuid) -> DataResult<()> {
        self.store
            .write()
            .await
            .workspace_members
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| DataError::not_found("workspace_members", id))
    }

    // ----- team membership -----

    pub async fn add_team_member(&self, req: NewTeamMember) -> DataResult<TeamMember> {
        let mut tables = self.store.write().await;
        require_row(
            &tables.teams,
            "team_members",
            "team_id",
            "teams",
            req.team_id,
        )?;
        require_row(
            &tables.users,
            "team_members",
            "user_id",
            "users",
            req.user_id,
        )?;
        if tables
            .team_members
            .any(|m| m.team_id == req.team_id && m.user_id == req.user_id)
        {
            return Err(DataError::unique(
                "team_members(team_id, user_id)",
                format!("{}/{}", req.team_id, req.user_id),
            ));
        }

        let now = Utc::now();
        let member = TeamMember {
            id: Uuid::new_v4(),
            team_id: req.team_id,
            user_id: req.user_id,
            created_at: now,
            updated_at: now,
        };
        tables.team_members.insert(member.clone());
        Ok(member)
    }

    pub async fn list_team_members(&self, team_id: Uuid) -> Vec<TeamMember> {
        self.store
            .read()
            .await
            .team_members
            .iter()
            .filter(|m| m.team_id == team_id)
            .cloned()
            .collect()
    }

    pub async fn remove_team_member(&self, id: Uuid) -> DataResult<()> {
        self.store
            .write()
            .await
            .team_members
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| DataError::not_found("team_members", id))
    }

    // ----- workspace roles -----

    pub async fn assign_workspace_role(
        &self,
        req: NewUserWorkspaceRole,
    ) -> DataResult<UserWorkspaceRole> {
        let mut tables = self.store.write().await;
        require_row(
            &tables.users,
            "user_workspace_roles",
            "user_id",
            "users",
            req.user_id,
        )?;
        require_row(
            &tables.workspaces,
            "user_workspace_roles",
            "workspace_id",
            "workspaces",
            req.workspace_id,
        )?;
        if tables
            .user_workspace_roles
            .any(|r| r.user_id == req.user_id && r.workspace_id == req.workspace_id)
        {
            return Err(DataError::unique(
                "user_workspace_roles(user_id, workspace_id)",
                format!("{}/{}", req.user_id, req.workspace_id),
            ));
        }

        let now = Utc::now();
        let assignment = UserWorkspaceRole {
            id: Uuid::new_v4(),
            user_id: req.user_id,
            workspace_id: req.workspace_id,
            role: req.role,
            created_at: now,
            updated_at: now,
        };
        tables.user_workspace_roles.insert(assignment.clone());
        Ok(assignment)
    }

    pub async fn list_workspace_roles(&self, workspace_id: Uuid) -> Vec<UserWorkspaceRole> {
        self.store
            .read()
            .await
            .user_workspace_roles
            .iter()
            .filter(|r| r.workspace_id == workspace_id)
            .cloned()
            .collect()
    }

    pub async fn change_workspace_role(
        &self,
        id: Uuid,
        role: WorkspaceRole,
    ) -> DataResult<UserWorkspaceRole> {
        let mut tables = self.store.write().await;
        let assignment = tables
            .user_workspace_roles
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| DataError::not_found("user_workspace_roles", id))?;
        assignment.role = role;
        assignment.updated_at = Utc::now();
        Ok(assignment.clone())
    }

    pub async fn unassign_workspace_role(&self, id: Uuid) -> DataResult<()> {
        self.store
            .write()
            .await
            .user_workspace_roles
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| DataError::not_found("user_workspace_roles", id))
    }
}
