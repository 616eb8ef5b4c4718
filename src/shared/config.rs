use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Root directory for durable per-user state (widget layouts).
    pub data_dir: PathBuf,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let data_dir = env::var("DESKHUB_DATA_DIR").unwrap_or_else(|_| "./data".to_string());

        Ok(Self {
            storage: StorageConfig {
                data_dir: PathBuf::from(data_dir),
            },
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig {
                data_dir: PathBuf::from("./data"),
            },
        }
    }
}
