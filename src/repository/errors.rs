use diesel::r2d2::{Error as R2D2Error, PoolError};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

/// Failures surfaced by the Diesel repositories.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,

    /// A uniqueness or referential rule of the schema rejected the write.
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    /// A stored or submitted value does not satisfy a domain type.
    #[error("invalid data: {0}")]
    ValidationError(String),

    #[error("database error: {0}")]
    DatabaseError(String),

    #[error("connection error: {0}")]
    ConnectionError(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

fn constraint_label(kind: &DatabaseErrorKind) -> Option<&'static str> {
    match kind {
        DatabaseErrorKind::UniqueViolation => Some("duplicate record"),
        DatabaseErrorKind::ForeignKeyViolation => Some("referenced record does not exist"),
        DatabaseErrorKind::NotNullViolation => Some("missing required value"),
        DatabaseErrorKind::CheckViolation => Some("value out of range"),
        _ => None,
    }
}

impl From<DieselError> for RepositoryError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => RepositoryError::NotFound,
            DieselError::DatabaseError(kind, info) => match constraint_label(&kind) {
                Some(label) => {
                    RepositoryError::ConstraintViolation(format!("{label}: {}", info.message()))
                }
                None => RepositoryError::DatabaseError(info.message().to_string()),
            },
            DieselError::DeserializationError(e) | DieselError::SerializationError(e) => {
                RepositoryError::ValidationError(e.to_string())
            }
            other => RepositoryError::DatabaseError(other.to_string()),
        }
    }
}

impl From<R2D2Error> for RepositoryError {
    fn from(err: R2D2Error) -> Self {
        RepositoryError::ConnectionError(err.to_string())
    }
}

impl From<PoolError> for RepositoryError {
    fn from(err: PoolError) -> Self {
        RepositoryError::ConnectionError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_rows_are_not_found() {
        assert!(matches!(
            RepositoryError::from(DieselError::NotFound),
            RepositoryError::NotFound
        ));
    }

    #[test]
    fn transaction_misuse_is_a_database_error() {
        assert!(matches!(
            RepositoryError::from(DieselError::RollbackTransaction),
            RepositoryError::DatabaseError(_)
        ));
    }
}
