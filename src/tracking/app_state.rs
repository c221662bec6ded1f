use std::sync::Arc;

use crate::config::Config;
use crate::tracking::issuer::Issuer;
use crate::tracking::store::{SqliteStore, StoreError};

#[derive(Clone)]
pub struct AppState {
    pub issuer: Issuer,
}

impl TryFrom<Config> for AppState {
    type Error = StoreError;

    fn try_from(config: Config) -> Result<Self, Self::Error> {
        let store = SqliteStore::open(&config.storage.path)?;
        Ok(Self {
            issuer: Issuer::new(Arc::new(store), config.issuer.max_attempts),
        })
    }
}
