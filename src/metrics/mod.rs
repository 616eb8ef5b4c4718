//! Engineering metrics and dashboards: globally-named metric definitions,
//! high-precision data points, and per-workspace dashboards with widgets.

pub mod types;

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::shared::error::{DataError, DataResult};
use crate::store::{matches_filter, require_row, MemoryStore, Tables};

pub use types::{
    Dashboard, DashboardWidget, MetricDefinition, MetricPoint, NewDashboard, NewDashboardWidget,
    NewMetricDefinition, NewMetricPoint, WidgetSize,
};

pub(crate) fn purge_workspace_metrics(tables: &mut Tables, workspace_id: Uuid) {
    tables
        .metric_points
        .drain_where(|p| p.workspace_id == workspace_id);
    let dashboards = tables
        .dashboards
        .drain_where(|d| d.workspace_id == workspace_id);
    for dashboard in &dashboards {
        tables
            .dashboard_widgets
            .drain_where(|w| w.dashboard_id == dashboard.id);
    }
}

#[derive(Clone)]
pub struct MetricsService {
    store: Arc<MemoryStore>,
}

impl MetricsService {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    // ----- metric definitions -----

    pub async fn create_metric(&self, req: NewMetricDefinition) -> DataResult<MetricDefinition> {
        if req.name.trim().is_empty() {
            return Err(DataError::validation("metric name must not be empty"));
        }

        let mut tables = self.store.write().await;
        if tables.metric_definitions.any(|m| m.name == req.name) {
            return Err(DataError::unique("metric_definitions.name", req.name));
        }

        let now = Utc::now();
        let metric = MetricDefinition {
            id: Uuid::new_v4(),
            name: req.name,
            description: req.description,
            unit: req.unit,
            created_at: now,
            updated_at: now,
        };
        tables.metric_definitions.insert(metric.clone());
        Ok(metric)
    }

    pub async fn get_metric(&self, id: Uuid) -> DataResult<MetricDefinition> {
        self.store
            .read()
            .await
            .metric_definitions
            .get(id)
            .cloned()
            .ok_or_else(|| DataError::not_found("metric_definitions", id))
    }

    pub async fn list_metrics(&self, query: Option<&str>) -> Vec<MetricDefinition> {
        self.store
            .read()
            .await
            .metric_definitions
            .iter()
            .filter(|m| {
                matches_filter(query, &[Some(m.name.as_str()), m.description.as_deref()])
            })
            .cloned()
            .collect()
    }

    pub async fn update_metric(
        &self,
        mut metric: MetricDefinition,
    ) -> DataResult<MetricDefinition> {
        let mut tables = self.store.write().await;
        let created_at = tables
            .metric_definitions
            .get(metric.id)
            .map(|m| m.created_at)
            .ok_or_else(|| DataError::not_found("metric_definitions", metric.id))?;
        if tables
            .metric_definitions
            .any(|m| m.id != metric.id && m.name == metric.name)
        {
            return Err(DataError::unique("metric_definitions.name", metric.name));
        }

        metric.created_at = created_at;
        metric.updated_at = Utc::now();
        tables.metric_definitions.replace(metric.clone());
        Ok(metric)
    }

    /// Deleting a definition removes its data points and detaches widgets
    /// that chart it.
    pub async fn delete_metric(&self, id: Uuid) -> DataResult<()> {
        let mut tables = self.store.write().await;
        tables
            .metric_definitions
            .remove(id)
            .ok_or_else(|| DataError::not_found("metric_definitions", id))?;

        tables.metric_points.drain_where(|p| p.metric_id == id);
        let now = Utc::now();
        for widget in tables
            .dashboard_widgets
            .iter_mut()
            .filter(|w| w.metric_id == Some(id))
        {
            widget.metric_id = None;
            widget.updated_at = now;
        }
        Ok(())
    }

    // ----- data points -----

    pub async fn record_point(&self, req: NewMetricPoint) -> DataResult<MetricPoint> {
        let mut tables = self.store.write().await;
        require_row(
            &tables.metric_definitions,
            "metric_points",
            "metric_id",
            "metric_definitions",
            req.metric_id,
        )?;
        require_row(
            &tables.workspaces,
            "metric_points",
            "workspace_id",
            "workspaces",
            req.workspace_id,
        )?;

        let now = Utc::now();
        let point = MetricPoint {
            id: Uuid::new_v4(),
            metric_id: req.metric_id,
            workspace_id: req.workspace_id,
            value: req.value,
            recorded_at: req.recorded_at,
            created_at: now,
            updated_at: now,
        };
        tables.metric_points.insert(point.clone());
        Ok(point)
    }

    pub async fn list_points(
        &self,
        metric_id: Uuid,
        workspace_id: Option<Uuid>,
    ) -> Vec<MetricPoint> {
        self.store
            .read()
            .await
            .metric_points
            .iter()
            .filter(|p| p.metric_id == metric_id)
            .filter(|p| workspace_id.is_none_or(|w| p.workspace_id == w))
            .cloned()
            .collect()
    }

    pub async fn delete_point(&self, id: Uuid) -> DataResult<()> {
        self.store
            .write()
            .await
            .metric_points
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| DataError::not_found("metric_points", id))
    }

    // ----- dashboards -----

    pub async fn create_dashboard(&self, req: NewDashboard) -> DataResult<Dashboard> {
        let mut tables = self.store.write().await;
        require_row(
            &tables.workspaces,
            "dashboards",
            "workspace_id",
            "workspaces",
            req.workspace_id,
        )?;
        if let Some(user_id) = req.created_by {
            require_row(&tables.users, "dashboards", "created_by", "users", user_id)?;
        }

        let now = Utc::now();
        let dashboard = Dashboard {
            id: Uuid::new_v4(),
            workspace_id: req.workspace_id,
            name: req.name,
            description: req.description,
            created_by: req.created_by,
            created_at: now,
            updated_at: now,
        };
        tables.dashboards.insert(dashboard.clone());
        Ok(dashboard)
    }

    pub async fn get_dashboard(&self, id: Uuid) -> DataResult<Dashboard> {
        self.store
            .read()
            .await
            .dashboards
            .get(id)
            .cloned()
            .ok_or_else(|| DataError::not_found("dashboards", id))
    }

    pub async fn list_dashboards(&self, workspace_id: Uuid, query: Option<&str>) -> Vec<Dashboard> {
        self.store
            .read()
            .await
            .dashboards
            .iter()
            .filter(|d| d.workspace_id == workspace_id)
            .filter(|d| {
                matches_filter(query, &[Some(d.name.as_str()), d.description.as_deref()])
            })
            .cloned()
            .collect()
    }

    pub async fn update_dashboard(&self, mut dashboard: Dashboard) -> DataResult<Dashboard> {
        let mut tables = self.store.write().await;
        let created_at = tables
            .dashboards
            .get(dashboard.id)
            .map(|d| d.created_at)
            .ok_or_else(|| DataError::not_found("dashboards", dashboard.id))?;
        require_row(
            &tables.workspaces,
            "dashboards",
            "workspace_id",
            "workspaces",
            dashboard.workspace_id,
        )?;

        dashboard.created_at = created_at;
        dashboard.updated_at = Utc::now();
        tables.dashboards.replace(dashboard.clone());
        Ok(dashboard)
    }

    pub async fn delete_dashboard(&self, id: Uuid) -> DataResult<()> {
        let mut tables = self.store.write().await;
        tables
            .dashboards
            .remove(id)
            .ok_or_else(|| DataError::not_found("dashboards", id))?;
        tables
            .dashboard_widgets
            .drain_where(|w| w.dashboard_id == id);
        Ok(())
    }

    // ----- widgets -----

    pub async fn add_widget(&self, req: NewDashboardWidget) -> DataResult<DashboardWidget> {
        if req.position < 0 {
            return Err(DataError::validation("position must not be negative"));
        }

        let mut tables = self.store.write().await;
        require_row(
            &tables.dashboards,
            "dashboard_widgets",
            "dashboard_id",
            "dashboards",
            req.dashboard_id,
        )?;
        if let Some(metric_id) = req.metric_id {
            require_row(
                &tables.metric_definitions,
                "dashboard_widgets",
                "metric_id",
                "metric_definitions",
                metric_id,
            )?;
        }

        let now = Utc::now();
        let widget = DashboardWidget {
            id: Uuid::new_v4(),
            dashboard_id: req.dashboard_id,
            title: req.title,
            metric_id: req.metric_id,
            size: req.size,
            position: req.position,
            created_at: now,
            updated_at: now,
        };
        tables.dashboard_widgets.insert(widget.clone());
        Ok(widget)
    }

    pub async fn get_widget(&self, id: Uuid) -> DataResult<DashboardWidget> {
        self.store
            .read()
            .await
            .dashboard_widgets
            .get(id)
            .cloned()
            .ok_or_else(|| DataError::not_found("dashboard_widgets", id))
    }

    pub async fn list_widgets(
        &self,
        dashboard_id: Uuid,
        query: Option<&str>,
    ) -> Vec<DashboardWidget> {
        self.store
            .read()
            .await
            .dashboard_widgets
            .iter()
            .filter(|w| w.dashboard_id == dashboard_id)
            .filter(|w| matches_filter(query, &[Some(w.title.as_str())]))
            .cloned()
            .collect()
    }

    pub async fn update_widget(&self, mut widget: DashboardWidget) -> DataResult<DashboardWidget> {
        if widget.position < 0 {
            return Err(DataError::validation("position must not be negative"));
        }

        let mut tables = self.store.write().await;
        let created_at = tables
            .dashboard_widgets
            .get(widget.id)
            .map(|w| w.created_at)
            .ok_or_else(|| DataError::not_found("dashboard_widgets", widget.id))?;
        require_row(
            &tables.dashboards,
            "dashboard_widgets",
            "dashboard_id",
            "dashboards",
            widget.dashboard_id,
        )?;
        if let Some(metric_id) = widget.metric_id {
            require_row(
                &tables.metric_definitions,
                "dashboard_widgets",
                "metric_id",
                "metric_definitions",
                metric_id,
            )?;
        }

        widget.created_at = created_at;
        widget.updated_at = Utc::now();
        tables.dashboard_widgets.replace(widget.clone());
        Ok(widget)
    }

    pub async fn delete_widget(&self, id: Uuid) -> DataResult<()> {
        self.store
            .write()
            .await
            .dashboard_widgets
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| DataError::not_found("dashboard_widgets", id))
    }
}
