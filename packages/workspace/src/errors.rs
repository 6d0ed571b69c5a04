use axum::http::StatusCode;
use folio_common::Locale;
use folio_editor::{EditorError, ShapeError, ValidationErrors};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("Too many save requests, try again shortly")]
    RateLimited,

    #[error("Content failed validation: {}", .0.summary())]
    Invalid(ValidationErrors),

    #[error(transparent)]
    Shape(#[from] ShapeError),

    #[error("Content for {0} changed since it was loaded")]
    Conflict(Locale),

    #[error("A save for {0} is already in progress")]
    Busy(Locale),

    #[error("Save timed out after {0:?}")]
    Timeout(Duration),

    #[error("No stored content for {0}")]
    NotFound(Locale),

    #[error("Stored content is unreadable: {0}")]
    Corrupt(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Store responded {status}: {body}")]
    Backend { status: u16, body: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type PersistResult<T> = Result<T, PersistError>;

impl PersistError {
    /// HTTP status the save and read endpoints answer with
    pub fn status_code(&self) -> StatusCode {
        match self {
            PersistError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            PersistError::Invalid(_) | PersistError::Shape(_) => StatusCode::BAD_REQUEST,
            PersistError::Conflict(_) | PersistError::Busy(_) => StatusCode::CONFLICT,
            PersistError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            PersistError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<PersistError> for EditorError {
    fn from(e: PersistError) -> Self {
        match e {
            PersistError::Conflict(_) => EditorError::Conflict,
            PersistError::RateLimited => EditorError::RateLimited,
            PersistError::Shape(shape) => EditorError::Shape(shape),
            other => EditorError::Persist(other.to_string()),
        }
    }
}
