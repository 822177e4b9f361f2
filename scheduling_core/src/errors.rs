//! Definitions for error types used throughout the engine.

use crate::generator::GenerationError;
use crate::ports::StorageError;
use crate::utils::validation::{FieldError, ValidationErrors};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// storage error
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Generic validation error of one field of an entity
    #[error("field validation error: {0}")]
    Field(#[from] FieldError),

    /// Collected validation errors of a request or entity
    #[error("validation error: {0:?}")]
    Validation(#[from] ValidationErrors),

    /// Match generation failed structurally
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),

    /// Missing ID where one is required
    #[error("missing ID of: {0}")]
    MissingId(String),

    /// Parsing error for enums or labels
    #[error("parsing error: {0}")]
    Parsing(String),
}

pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, EngineError::Storage(StorageError::NotFound))
    }
    pub fn get_field_error(&self) -> Option<&FieldError> {
        if let EngineError::Field(field_error) = self {
            Some(field_error)
        } else {
            None
        }
    }
}
