mod category;
mod ids;
mod question;
mod quiz;
mod result;

pub use ids::{CategoryId, ParseIdError, QuestionId, QuizId};

pub use category::{Category, CategoryError, CategorySummary};
pub use question::{MIN_OPTIONS, Question, QuestionError};
pub use quiz::{Difficulty, QuizDefinition, QuizDraft, QuizError, QuizSummary};
pub use result::{AnswerReview, QuizResult, QuizResultError};
