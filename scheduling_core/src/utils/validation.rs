// tools for validation of input

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use thiserror::Error;
use uuid::Uuid;

/// A single field-level validation problem. Carries the field name, a short
/// machine code, an optional human message, and the id of the offending
/// object when one exists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldError {
    field: String,
    // e.g. "required", "invalid_format", "out_of_range"
    code: String,
    message: String,
    object_id: Option<Uuid>,
}

impl Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}: {}", self.field, self.code)?;
        } else {
            write!(f, "{}: {}", self.field, self.message)?;
        }
        if let Some(id) = self.object_id {
            write!(f, " (object {id})")?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldError {}

impl FieldError {
    pub fn get_field(&self) -> &str {
        &self.field
    }
    pub fn get_code(&self) -> &str {
        &self.code
    }
    pub fn get_message(&self) -> &str {
        &self.message
    }
    pub fn get_object_id(&self) -> Option<Uuid> {
        self.object_id
    }

    pub fn builder() -> FieldErrorBuilder<NoField> {
        FieldErrorBuilder {
            field: NoField {},
            code: "".into(),
            message: "".into(),
            object_id: None,
        }
    }
}

/// Collected validation problems. Empty collections are never returned as
/// errors; callers check via `is_empty` before converting.
#[derive(Debug, Clone, Error, Default, Serialize, Deserialize, PartialEq, Eq)]
#[error("validation failed with {} error(s)", errors.len())]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl From<FieldError> for ValidationErrors {
    fn from(value: FieldError) -> Self {
        Self {
            errors: vec![value],
        }
    }
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }
    pub fn add(&mut self, err: FieldError) {
        self.errors.push(err);
    }
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
    /// Merge another collection into this one.
    pub fn extend(&mut self, other: ValidationErrors) {
        self.errors.extend(other.errors);
    }
    /// Finish a validation block: `Ok(())` when nothing was collected.
    pub fn into_result(self) -> ValidationResult<()> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

pub type ValidationResult<T> = Result<T, ValidationErrors>;
pub type FieldResult<T> = Result<T, FieldError>;

pub struct NoField {}
pub struct Field(String);

/// Typestate builder: a `FieldError` cannot be built without a field name.
pub struct FieldErrorBuilder<F> {
    field: F,
    code: String,
    message: String,
    object_id: Option<Uuid>,
}

impl FieldErrorBuilder<NoField> {
    pub fn set_field(self, field: impl Into<String>) -> FieldErrorBuilder<Field> {
        FieldErrorBuilder {
            field: Field(field.into()),
            code: self.code,
            message: self.message,
            object_id: self.object_id,
        }
    }
}

impl FieldErrorBuilder<Field> {
    /// set code to required
    pub fn add_required(mut self) -> Self {
        self.code = "required".into();
        self
    }
    /// set code to invalid_format
    pub fn add_invalid_format(mut self) -> Self {
        self.code = "invalid_format".into();
        self
    }
    /// set code to out_of_range
    pub fn add_out_of_range(mut self) -> Self {
        self.code = "out_of_range".into();
        self
    }
    /// set a human readable message
    pub fn add_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
    /// attach the id of the offending object
    pub fn set_object_id(mut self, object_id: Uuid) -> Self {
        self.object_id = Some(object_id);
        self
    }
    /// build FieldError
    pub fn build(self) -> FieldError {
        FieldError {
            field: self.field.0,
            code: self.code,
            message: self.message,
            object_id: self.object_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_produces_display_with_object_id() {
        let id = Uuid::new_v4();
        let err = FieldError::builder()
            .set_field("home_score")
            .add_out_of_range()
            .add_message("score must be between 0 and 99")
            .set_object_id(id)
            .build();
        let text = err.to_string();
        assert!(text.contains("home_score"));
        assert!(text.contains(&id.to_string()));
    }

    #[test]
    fn into_result_is_ok_when_empty() {
        assert!(ValidationErrors::new().into_result().is_ok());

        let mut errs = ValidationErrors::new();
        errs.add(FieldError::builder().set_field("x").add_required().build());
        assert!(errs.into_result().is_err());
    }
}
