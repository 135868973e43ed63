use async_trait::async_trait;
use quiz_core::model::{CategoryId, CategorySummary, QuizDefinition, QuizId, QuizSummary};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use crate::catalog::{Catalog, CatalogError};

/// Errors surfaced by content providers.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("malformed quiz definition: {0}")]
    Malformed(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Read-only source of categories, quiz listings and quiz definitions.
///
/// Implementations are static for the lifetime of the process as far as the
/// session engine is concerned: every call is a pure read.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// All known categories, each with its quiz count.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only for backend failures.
    async fn list_categories(&self) -> Result<Vec<CategorySummary>, StorageError>;

    /// Fetch a single category by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the category is unknown.
    async fn get_category(&self, id: &CategoryId) -> Result<CategorySummary, StorageError>;

    /// Quizzes whose category matches `category` exactly.
    ///
    /// An unknown or empty category yields an empty list, not `NotFound`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only for backend failures.
    async fn list_quizzes(&self, category: &CategoryId) -> Result<Vec<QuizSummary>, StorageError>;

    /// Fetch a full quiz definition by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, `StorageError::Malformed` if the
    /// stored definition fails validation, or other backend errors.
    async fn get_quiz(&self, id: &QuizId) -> Result<Arc<QuizDefinition>, StorageError>;
}

/// Wraps a content provider behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub content: Arc<dyn ContentProvider>,
}

impl Storage {
    #[must_use]
    pub fn new(content: Arc<dyn ContentProvider>) -> Self {
        Self { content }
    }

    /// Storage backed by the catalog bundled with this crate.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the bundled catalog fails validation.
    pub fn in_memory() -> Result<Self, CatalogError> {
        let catalog = Catalog::builtin()?;
        Ok(Self::from_catalog(catalog))
    }

    #[must_use]
    pub fn from_catalog(catalog: Catalog) -> Self {
        let content: Arc<dyn ContentProvider> = Arc::new(catalog);
        Self { content }
    }

    /// Storage backed by a JSON catalog file on disk.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the file cannot be read, parsed or validated.
    pub fn from_catalog_file(path: &Path) -> Result<Self, CatalogError> {
        let catalog = crate::json::load_catalog_file(path)?;
        Ok(Self::from_catalog(catalog))
    }
}
