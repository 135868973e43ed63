use std::sync::Arc;

use quiz_core::model::{CategoryId, CategorySummary, QuizSummary};
use storage::repository::{ContentProvider, StorageError};

use crate::error::CatalogServiceError;

/// Read-side facade over the content provider for browsing screens.
#[derive(Clone)]
pub struct CatalogService {
    content: Arc<dyn ContentProvider>,
}

impl CatalogService {
    #[must_use]
    pub fn new(content: Arc<dyn ContentProvider>) -> Self {
        Self { content }
    }

    /// List every category with its quiz count.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError::Storage` if the provider fails.
    pub async fn list_categories(&self) -> Result<Vec<CategorySummary>, CatalogServiceError> {
        let categories = self.content.list_categories().await?;
        tracing::debug!(count = categories.len(), "listed categories");
        Ok(categories)
    }

    /// Fetch a category by ID.
    ///
    /// Returns `Ok(None)` when the category does not exist.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError::Storage` if the provider fails.
    pub async fn get_category(
        &self,
        id: &CategoryId,
    ) -> Result<Option<CategorySummary>, CatalogServiceError> {
        match self.content.get_category(id).await {
            Ok(category) => Ok(Some(category)),
            Err(StorageError::NotFound) => {
                tracing::debug!(category = %id, "category not found");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// List quizzes in a category. Unknown categories yield an empty list.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError::Storage` if the provider fails.
    pub async fn list_quizzes(
        &self,
        category: &CategoryId,
    ) -> Result<Vec<QuizSummary>, CatalogServiceError> {
        let quizzes = self.content.list_quizzes(category).await?;
        tracing::debug!(category = %category, count = quizzes.len(), "listed quizzes");
        Ok(quizzes)
    }
}
