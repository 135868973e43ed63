//! JSON catalog documents.
//!
//! The document shape follows the public wire format: camelCase keys,
//! `question` for the prompt text and `correctAnswer` for the correct index.

use quiz_core::model::{
    Category, CategoryId, Difficulty, Question, QuestionId, QuizDefinition, QuizDraft, QuizId,
};
use serde::Deserialize;
use std::path::Path;

use crate::catalog::{Catalog, CatalogError};

/// Catalog shipped with the crate: 4 categories, 15 quizzes.
pub const BUILTIN_CATALOG: &str = include_str!("../data/catalog.json");

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogDocument {
    pub categories: Vec<CategoryRecord>,
    pub quizzes: Vec<QuizRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryRecord {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizRecord {
    pub id: QuizId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: CategoryId,
    pub difficulty: Difficulty,
    pub estimated_time: u32,
    pub questions: Vec<QuestionRecord>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRecord {
    pub id: QuestionId,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
    #[serde(default)]
    pub explanation: String,
}

impl QuizRecord {
    /// Convert the record into a validated definition.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Question` or `CatalogError::Quiz` naming the
    /// offending quiz.
    pub fn into_definition(self) -> Result<QuizDefinition, CatalogError> {
        let quiz_id = self.id;
        let questions = self
            .questions
            .into_iter()
            .map(|q| {
                Question::new(q.id, q.question, q.options, q.correct_answer, q.explanation)
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| CatalogError::Question {
                quiz: quiz_id.clone(),
                source,
            })?;

        QuizDraft {
            id: quiz_id.clone(),
            title: self.title,
            description: self.description,
            category: self.category,
            difficulty: self.difficulty,
            estimated_minutes: self.estimated_time,
            questions,
        }
        .validate()
        .map_err(|source| CatalogError::Quiz {
            quiz: quiz_id,
            source,
        })
    }
}

impl CatalogDocument {
    /// Validate the document into a catalog.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` for any invalid category, quiz or question.
    pub fn into_catalog(self) -> Result<Catalog, CatalogError> {
        let categories = self
            .categories
            .into_iter()
            .map(|c| Category::new(c.id, c.name, c.description, c.icon))
            .collect::<Result<Vec<_>, _>>()?;
        let quizzes = self
            .quizzes
            .into_iter()
            .map(QuizRecord::into_definition)
            .collect::<Result<Vec<_>, _>>()?;
        Catalog::new(categories, quizzes)
    }
}

/// Parse and validate a catalog document.
///
/// # Errors
///
/// Returns `CatalogError::Json` for malformed JSON, or a validation error.
pub fn parse_catalog(json: &str) -> Result<Catalog, CatalogError> {
    let doc: CatalogDocument = serde_json::from_str(json)?;
    doc.into_catalog()
}

/// Read, parse and validate a catalog document from disk.
///
/// # Errors
///
/// Returns `CatalogError::Io` if the file cannot be read, otherwise as `parse_catalog`.
pub fn load_catalog_file(path: &Path) -> Result<Catalog, CatalogError> {
    let raw = std::fs::read_to_string(path)?;
    let catalog = parse_catalog(&raw)?;
    tracing::info!(
        path = %path.display(),
        quizzes = catalog.quiz_count(),
        "loaded quiz catalog"
    );
    Ok(catalog)
}
