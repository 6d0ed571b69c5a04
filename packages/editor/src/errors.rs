//! Error types for the editor

use crate::array::ArrayError;
use crate::document::ShapeError;
use crate::path::PathError;
use folio_common::Locale;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    #[error("Path error: {0}")]
    Path(#[from] PathError),

    #[error("Array error: {0}")]
    Array(#[from] ArrayError),

    #[error(transparent)]
    Shape(#[from] ShapeError),

    #[error("No baseline loaded for locale {0}")]
    NoBaseline(Locale),

    #[error("Unknown section: {0}")]
    UnknownSection(String),

    #[error("Content changed since it was loaded")]
    Conflict,

    #[error("Too many save requests")]
    RateLimited,

    #[error("Persist error: {0}")]
    Persist(String),
}
