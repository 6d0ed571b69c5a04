use thiserror::Error;

/// Errors raised by the shared folio types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommonError {
    #[error("Unsupported locale: {0}")]
    UnsupportedLocale(String),
}
