use std::sync::Arc;

use quiz_core::model::{
    CategoryId, CategorySummary, Question, QuestionId, QuizDefinition, QuizDraft, QuizId,
    QuizSummary,
};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{
    conn, i64_from_usize, map_category_row, map_quiz_summary_row, parse_difficulty, ser,
    u32_from_i64, usize_from_i64,
};
use crate::catalog::Catalog;
use crate::repository::{ContentProvider, StorageError};

const CATEGORY_SELECT: &str = r"
    SELECT c.id, c.name, c.description, c.icon, COUNT(q.id) AS quiz_count
    FROM categories c
    LEFT JOIN quizzes q ON q.category_id = c.id
";

const QUIZ_SUMMARY_SELECT: &str = r"
    SELECT q.id, q.category_id, q.title, q.description, q.difficulty, q.estimated_minutes,
           COUNT(x.id) AS question_count
    FROM quizzes q
    LEFT JOIN questions x ON x.quiz_id = q.id
";

impl SqliteRepository {
    /// Write every category, quiz and question of `catalog`, replacing rows with
    /// the same ids. Questions of an imported quiz are replaced wholesale.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if any statement fails; the import is
    /// applied in a single transaction.
    pub async fn import_catalog(&self, catalog: &Catalog) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;

        for (position, category) in catalog.categories().iter().enumerate() {
            sqlx::query(
                r"
                INSERT INTO categories (id, name, description, icon, position)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    description = excluded.description,
                    icon = excluded.icon,
                    position = excluded.position
                ",
            )
            .bind(category.id.as_str())
            .bind(&category.name)
            .bind(&category.description)
            .bind(&category.icon)
            .bind(i64_from_usize("position", position)?)
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        }

        for (position, quiz) in catalog.quizzes().enumerate() {
            sqlx::query(
                r"
                INSERT INTO quizzes (id, category_id, title, description, difficulty, estimated_minutes, position)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                ON CONFLICT(id) DO UPDATE SET
                    category_id = excluded.category_id,
                    title = excluded.title,
                    description = excluded.description,
                    difficulty = excluded.difficulty,
                    estimated_minutes = excluded.estimated_minutes,
                    position = excluded.position
                ",
            )
            .bind(quiz.id().as_str())
            .bind(quiz.category().as_str())
            .bind(quiz.title())
            .bind(quiz.description())
            .bind(quiz.difficulty().as_str())
            .bind(i64::from(quiz.estimated_minutes()))
            .bind(i64_from_usize("position", position)?)
            .execute(&mut *tx)
            .await
            .map_err(conn)?;

            sqlx::query("DELETE FROM questions WHERE quiz_id = ?1")
                .bind(quiz.id().as_str())
                .execute(&mut *tx)
                .await
                .map_err(conn)?;

            for (q_pos, question) in quiz.questions().iter().enumerate() {
                let options = serde_json::to_string(question.options()).map_err(ser)?;
                sqlx::query(
                    r"
                    INSERT INTO questions (quiz_id, position, id, prompt, options, correct_index, explanation)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                    ",
                )
                .bind(quiz.id().as_str())
                .bind(i64_from_usize("position", q_pos)?)
                .bind(question.id().as_str())
                .bind(question.prompt())
                .bind(options)
                .bind(i64_from_usize("correct_index", question.correct_index())?)
                .bind(question.explanation())
                .execute(&mut *tx)
                .await
                .map_err(conn)?;
            }
        }

        tx.commit().await.map_err(conn)?;
        tracing::info!(
            categories = catalog.categories().len(),
            quizzes = catalog.quiz_count(),
            "imported catalog into sqlite"
        );
        Ok(())
    }
}

#[async_trait::async_trait]
impl ContentProvider for SqliteRepository {
    async fn list_categories(&self) -> Result<Vec<CategorySummary>, StorageError> {
        let sql = format!("{CATEGORY_SELECT} GROUP BY c.id ORDER BY c.position, c.id");
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;
        rows.iter().map(map_category_row).collect()
    }

    async fn get_category(&self, id: &CategoryId) -> Result<CategorySummary, StorageError> {
        let sql = format!("{CATEGORY_SELECT} WHERE c.id = ?1 GROUP BY c.id");
        let row = sqlx::query(&sql)
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?
            .ok_or(StorageError::NotFound)?;
        map_category_row(&row)
    }

    async fn list_quizzes(&self, category: &CategoryId) -> Result<Vec<QuizSummary>, StorageError> {
        let sql = format!(
            "{QUIZ_SUMMARY_SELECT} WHERE q.category_id = ?1 GROUP BY q.id ORDER BY q.position, q.id"
        );
        let rows = sqlx::query(&sql)
            .bind(category.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;
        rows.iter().map(map_quiz_summary_row).collect()
    }

    async fn get_quiz(&self, id: &QuizId) -> Result<Arc<QuizDefinition>, StorageError> {
        let quiz_row = sqlx::query(
            r"
            SELECT id, category_id, title, description, difficulty, estimated_minutes
            FROM quizzes
            WHERE id = ?1
            ",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?
        .ok_or(StorageError::NotFound)?;

        let question_rows = sqlx::query(
            r"
            SELECT id, prompt, options, correct_index, explanation
            FROM questions
            WHERE quiz_id = ?1
            ORDER BY position
            ",
        )
        .bind(id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut questions = Vec::with_capacity(question_rows.len());
        for row in &question_rows {
            let options_json: String = row.try_get("options").map_err(ser)?;
            let options: Vec<String> = serde_json::from_str(&options_json).map_err(ser)?;
            let question = Question::new(
                QuestionId::new(row.try_get::<String, _>("id").map_err(ser)?),
                row.try_get::<String, _>("prompt").map_err(ser)?,
                options,
                usize_from_i64("correct_index", row.try_get("correct_index").map_err(ser)?)?,
                row.try_get::<String, _>("explanation").map_err(ser)?,
            )
            .map_err(|e| StorageError::Malformed(format!("quiz {id}: {e}")))?;
            questions.push(question);
        }

        let difficulty: String = quiz_row.try_get("difficulty").map_err(ser)?;
        let definition = QuizDraft {
            id: QuizId::new(quiz_row.try_get::<String, _>("id").map_err(ser)?),
            title: quiz_row.try_get("title").map_err(ser)?,
            description: quiz_row.try_get("description").map_err(ser)?,
            category: CategoryId::new(quiz_row.try_get::<String, _>("category_id").map_err(ser)?),
            difficulty: parse_difficulty(&difficulty)?,
            estimated_minutes: u32_from_i64(
                "estimated_minutes",
                quiz_row.try_get("estimated_minutes").map_err(ser)?,
            )?,
            questions,
        }
        .validate()
        .map_err(|e| StorageError::Malformed(format!("quiz {id}: {e}")))?;

        Ok(Arc::new(definition))
    }
}
