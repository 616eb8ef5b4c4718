use std::sync::Arc;

use crate::catalog::CatalogService;
use crate::directory::DirectoryService;
use crate::layout::LayoutStore;
use crate::metrics::MetricsService;
use crate::sdlc::SdlcService;
use crate::shared::config::AppConfig;
use crate::store::MemoryStore;
use crate::studio::StudioService;
use crate::workspaces::WorkspaceService;

/// Shared application state: one store, one service handle per domain.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<MemoryStore>,
    pub directory: DirectoryService,
    pub workspaces: WorkspaceService,
    pub catalog: CatalogService,
    pub studio: StudioService,
    pub metrics: MetricsService,
    pub sdlc: SdlcService,
    pub layouts: Arc<LayoutStore>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let layouts = Arc::new(LayoutStore::new(config.storage.data_dir.join("layouts")));

        Self {
            directory: DirectoryService::new(Arc::clone(&store)),
            workspaces: WorkspaceService::new(Arc::clone(&store)),
            catalog: CatalogService::new(Arc::clone(&store)),
            studio: StudioService::new(Arc::clone(&store)),
            metrics: MetricsService::new(Arc::clone(&store)),
            sdlc: SdlcService::new(Arc::clone(&store)),
            config,
            store,
            layouts,
        }
    }
}
