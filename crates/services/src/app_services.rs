use std::path::Path;
use std::sync::Arc;

use storage::repository::Storage;
use storage::Catalog;

use crate::catalog_service::CatalogService;
use crate::error::AppServicesError;
use crate::sessions::QuizSessionService;
use crate::Clock;

/// Assembles app-facing services over a single content provider.
#[derive(Clone)]
pub struct AppServices {
    catalog: Arc<CatalogService>,
    sessions: Arc<QuizSessionService>,
}

impl AppServices {
    #[must_use]
    pub fn new(storage: &Storage, clock: Clock) -> Self {
        let catalog = Arc::new(CatalogService::new(Arc::clone(&storage.content)));
        let sessions = Arc::new(QuizSessionService::new(
            clock,
            Arc::clone(&storage.content),
        ));
        Self { catalog, sessions }
    }

    /// Build services over the catalog bundled with the storage crate.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Catalog` if the bundled catalog fails validation.
    pub fn in_memory(clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::in_memory()?;
        Ok(Self::new(&storage, clock))
    }

    /// Build services over a JSON catalog file.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Catalog` if the file cannot be loaded.
    pub fn from_catalog_file(path: &Path, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::from_catalog_file(path)?;
        Ok(Self::new(&storage, clock))
    }

    /// Build services backed by `SQLite` storage, importing `seed` first when
    /// given.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Sqlite` if storage initialization or the
    /// import fails.
    pub async fn sqlite(
        db_url: &str,
        clock: Clock,
        seed: Option<&Catalog>,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url, seed).await?;
        tracing::info!(url = db_url, seeded = seed.is_some(), "using sqlite content store");
        Ok(Self::new(&storage, clock))
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<CatalogService> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn sessions(&self) -> Arc<QuizSessionService> {
        Arc::clone(&self.sessions)
    }
}
