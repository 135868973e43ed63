use async_trait::async_trait;
use quiz_core::model::{
    Category, CategoryError, CategoryId, CategorySummary, QuestionError, QuizDefinition,
    QuizError, QuizId, QuizSummary,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;

use crate::repository::{ContentProvider, StorageError};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Errors raised while assembling a catalog.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("quiz {quiz}: {source}")]
    Question {
        quiz: QuizId,
        #[source]
        source: QuestionError,
    },

    #[error("quiz {quiz}: {source}")]
    Quiz {
        quiz: QuizId,
        #[source]
        source: QuizError,
    },

    #[error(transparent)]
    Category(#[from] CategoryError),

    #[error("duplicate category id: {0}")]
    DuplicateCategory(CategoryId),

    #[error("duplicate quiz id: {0}")]
    DuplicateQuiz(QuizId),

    #[error("quiz {quiz} references unknown category {category}")]
    UnknownCategory { quiz: QuizId, category: CategoryId },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

//
// ─── CATALOG ───────────────────────────────────────────────────────────────────
//

/// Immutable in-memory content provider.
///
/// Category quiz counts are computed once at construction, so they can never
/// drift from the quizzes actually present.
#[derive(Debug, Clone)]
pub struct Catalog {
    categories: Vec<CategorySummary>,
    quizzes: Vec<Arc<QuizDefinition>>,
    index: HashMap<QuizId, usize>,
}

impl Catalog {
    /// Assemble a catalog, preserving the given ordering.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` for duplicate category/quiz ids or a quiz that
    /// names a category not in `categories`.
    pub fn new(
        categories: Vec<Category>,
        quizzes: Vec<QuizDefinition>,
    ) -> Result<Self, CatalogError> {
        let mut known = HashSet::with_capacity(categories.len());
        for category in &categories {
            if !known.insert(category.id().clone()) {
                return Err(CatalogError::DuplicateCategory(category.id().clone()));
            }
        }

        let mut index = HashMap::with_capacity(quizzes.len());
        let mut counts: HashMap<CategoryId, usize> = HashMap::new();
        for (position, quiz) in quizzes.iter().enumerate() {
            if !known.contains(quiz.category()) {
                return Err(CatalogError::UnknownCategory {
                    quiz: quiz.id().clone(),
                    category: quiz.category().clone(),
                });
            }
            if index.insert(quiz.id().clone(), position).is_some() {
                return Err(CatalogError::DuplicateQuiz(quiz.id().clone()));
            }
            *counts.entry(quiz.category().clone()).or_default() += 1;
        }

        let categories = categories
            .iter()
            .map(|c| c.summary(counts.get(c.id()).copied().unwrap_or(0)))
            .collect();

        Ok(Self {
            categories,
            quizzes: quizzes.into_iter().map(Arc::new).collect(),
            index,
        })
    }

    /// The catalog bundled with this crate.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the bundled document is invalid.
    pub fn builtin() -> Result<Self, CatalogError> {
        crate::json::parse_catalog(crate::json::BUILTIN_CATALOG)
    }

    #[must_use]
    pub fn categories(&self) -> &[CategorySummary] {
        &self.categories
    }

    pub fn quizzes(&self) -> impl Iterator<Item = &QuizDefinition> {
        self.quizzes.iter().map(|q| &**q)
    }

    #[must_use]
    pub fn quiz(&self, id: &QuizId) -> Option<&Arc<QuizDefinition>> {
        self.index.get(id).map(|&i| &self.quizzes[i])
    }

    #[must_use]
    pub fn quiz_count(&self) -> usize {
        self.quizzes.len()
    }
}

#[async_trait]
impl ContentProvider for Catalog {
    async fn list_categories(&self) -> Result<Vec<CategorySummary>, StorageError> {
        Ok(self.categories.clone())
    }

    async fn get_category(&self, id: &CategoryId) -> Result<CategorySummary, StorageError> {
        self.categories
            .iter()
            .find(|c| &c.id == id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn list_quizzes(&self, category: &CategoryId) -> Result<Vec<QuizSummary>, StorageError> {
        Ok(self
            .quizzes
            .iter()
            .filter(|q| q.category() == category)
            .map(|q| q.summary())
            .collect())
    }

    async fn get_quiz(&self, id: &QuizId) -> Result<Arc<QuizDefinition>, StorageError> {
        self.quiz(id).cloned().ok_or(StorageError::NotFound)
    }
}
