//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{QuizId, QuizResultError};
use storage::CatalogError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// A session operation was invoked in a state where it is not allowed.
///
/// Rejections never change session state.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvalidTransition {
    #[error("no option selected")]
    NoSelection,
    #[error("answer already submitted for this question")]
    AnswerLocked,
    #[error("answer has not been submitted yet")]
    NotRevealed,
    #[error("option {index} is out of range for {len} options")]
    OptionOutOfRange { index: usize, len: usize },
    #[error("session already completed")]
    Completed,
    #[error("session is still in progress")]
    NotCompleted,
}

/// Errors emitted by session services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("quiz {quiz_id} is unavailable")]
    Unavailable { quiz_id: QuizId },
    #[error("quiz definition is malformed: {0}")]
    Malformed(String),
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),
    #[error(transparent)]
    Summary(#[from] QuizResultError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `CatalogService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
