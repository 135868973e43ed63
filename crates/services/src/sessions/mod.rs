mod progress;
mod service;
mod state;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::{InvalidTransition, SessionError};
pub use progress::SessionProgress;
pub use service::QuizSession;
pub use state::{SessionPhase, SessionState};
pub use view::{AdvanceOutcome, AnswerFeedback};
pub use workflow::QuizSessionService;
