//! CLI command implementations

pub mod build;
pub mod config;
pub mod holes;
pub mod lookup;

pub use build::execute as build;
pub use config::execute as config;
pub use holes::execute as holes;
pub use lookup::execute as lookup;

use crate::cache::DirStore;
use crate::config::{Config, ConfigManager};
use std::path::PathBuf;

/// Store selected by `--store`, else by configuration
fn open_store(explicit: Option<PathBuf>, config: &Config) -> DirStore {
    DirStore::new(explicit.unwrap_or_else(|| ConfigManager::store_dir(config)))
}
