//! Request bodies accepted by the API and their conversion into domain values.

use thiserror::Error;
use validator::ValidationErrors;

use crate::domain::types::TypeConstraintError;

pub mod customer;
pub mod deal;
pub mod employee;
pub mod lead;
pub mod organization;
pub mod profile;
pub mod role;

#[derive(Debug, Error)]
/// Errors that can occur when processing form data.
pub enum FormError {
    #[error("validation errors: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("{0}")]
    Constraint(#[from] TypeConstraintError),

    #[error("invalid csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to read upload: {0}")]
    Io(#[from] std::io::Error),

    #[error("{field}: {message}")]
    Field { field: &'static str, message: String },

    #[error("row {row}: {message}")]
    InvalidRow { row: usize, message: String },
}

/// Trims the value and drops it when nothing is left.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
