use std::path::Path;

use crate::config::AppConfig;
use crate::error::Result;
use crate::services::AppServices;
use folio_db::Db;

/// Application state shared with the HTTP layer. Constructed once in `main`
/// and cloned into handlers; the services own all shared mutable state.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub services: AppServices,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let services = AppServices::new(&config);
        Self { config, services }
    }

    pub fn initialize(&self) -> Result<()> {
        setup_db(&self.config.db_path)
    }
}

pub fn setup_db(path: &Path) -> Result<()> {
    let mut db = Db::open(path)?;
    db.migrate()?;
    Ok(())
}
