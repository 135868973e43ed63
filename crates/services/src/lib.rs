#![forbid(unsafe_code)]

pub mod app_services;
pub mod catalog_service;
pub mod error;
pub mod sessions;

pub use quiz_core::Clock;
pub use sessions as session;

pub use app_services::AppServices;
pub use catalog_service::CatalogService;
pub use error::{AppServicesError, CatalogServiceError, InvalidTransition, SessionError};

pub use sessions::{
    AdvanceOutcome, AnswerFeedback, QuizSession, QuizSessionService, SessionPhase,
    SessionProgress, SessionState,
};
