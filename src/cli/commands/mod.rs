//! Command implementations for the Podium CLI.

mod config;
mod content;
mod document;
mod doctor;
mod history;
mod init;
mod resolve;
mod serve;

pub use config::run_config;
pub use content::run_content;
pub use document::run_document;
pub use doctor::run_doctor;
pub use history::run_history;
pub use init::run_init;
pub use resolve::run_resolve;
pub use serve::run_serve;

use crate::config::Settings;
use crate::error::Result;
use crate::store::{ContentStore, MemoryStore, SqliteStore};
use std::sync::Arc;

/// Open the content store selected by configuration.
pub fn open_store(settings: &Settings) -> Result<Arc<dyn ContentStore>> {
    match settings.store.provider.as_str() {
        "memory" => Ok(Arc::new(MemoryStore::new())),
        _ => Ok(Arc::new(SqliteStore::new(&settings.sqlite_path())?)),
    }
}
