pub mod catalog;
pub mod directory;
pub mod layout;
pub mod metrics;
pub mod sdlc;
pub mod shared;
pub mod store;
pub mod studio;
pub mod tests;
pub mod workspaces;

pub use shared::config::AppConfig;
pub use shared::error::{DataError, DataResult};
pub use shared::state::AppState;
