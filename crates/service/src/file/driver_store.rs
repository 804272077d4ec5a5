use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use tracing::debug;

use crate::errors::ServiceError;
use crate::ledger::domain::Driver;
use crate::ledger::repository::DriverRepository;
use crate::storage::json_file_store::JsonFileStore;

/// Driver list persisted as a JSON array.
#[derive(Clone)]
pub struct FileDriverStore {
    store: Arc<JsonFileStore<Vec<Driver>>>,
}

impl FileDriverStore {
    /// Initialize the store from the given file path. Creates `[]` if missing.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let store = JsonFileStore::<Vec<Driver>>::new(path).await?;
        Ok(Arc::new(Self { store }))
    }
}

#[async_trait]
impl DriverRepository for FileDriverStore {
    async fn list_drivers(&self) -> Result<Vec<Driver>, ServiceError> {
        self.store.read().await
    }

    async fn add_driver(&self, driver: Driver) -> Result<(), ServiceError> {
        let total = self
            .store
            .update(move |drivers| {
                drivers.push(driver);
                Ok(drivers.len())
            })
            .await?;
        debug!(path = %self.store.path().display(), total, "drivers written");
        Ok(())
    }
}
