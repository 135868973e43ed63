use quiz_core::model::{CategoryId, CategorySummary, Difficulty, QuizId, QuizSummary};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

pub(crate) fn usize_from_i64(field: &'static str, v: i64) -> Result<usize, StorageError> {
    usize::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn i64_from_usize(field: &'static str, v: usize) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

pub(crate) fn parse_difficulty(s: &str) -> Result<Difficulty, StorageError> {
    s.parse::<Difficulty>().map_err(ser)
}

pub(crate) fn map_category_row(row: &SqliteRow) -> Result<CategorySummary, StorageError> {
    Ok(CategorySummary {
        id: CategoryId::new(row.try_get::<String, _>("id").map_err(ser)?),
        name: row.try_get("name").map_err(ser)?,
        description: row.try_get("description").map_err(ser)?,
        icon: row.try_get("icon").map_err(ser)?,
        quiz_count: usize_from_i64("quiz_count", row.try_get("quiz_count").map_err(ser)?)?,
    })
}

pub(crate) fn map_quiz_summary_row(row: &SqliteRow) -> Result<QuizSummary, StorageError> {
    let difficulty: String = row.try_get("difficulty").map_err(ser)?;
    Ok(QuizSummary {
        id: QuizId::new(row.try_get::<String, _>("id").map_err(ser)?),
        title: row.try_get("title").map_err(ser)?,
        description: row.try_get("description").map_err(ser)?,
        category: CategoryId::new(row.try_get::<String, _>("category_id").map_err(ser)?),
        difficulty: parse_difficulty(&difficulty)?,
        question_count: usize_from_i64(
            "question_count",
            row.try_get("question_count").map_err(ser)?,
        )?,
        estimated_time: u32_from_i64(
            "estimated_minutes",
            row.try_get("estimated_minutes").map_err(ser)?,
        )?,
    })
}
