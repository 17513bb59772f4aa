//! Shared error mapping for sqlx persistence layer

use application::ApplicationError;

/// Map a sqlx error to an application-layer error
pub fn map_sqlx_error(e: sqlx::Error) -> ApplicationError {
    match e {
        sqlx::Error::Database(db_err) => {
            ApplicationError::Internal(format!("Database error: {db_err}"))
        },
        sqlx::Error::PoolTimedOut => {
            ApplicationError::Internal("Database pool timed out".to_string())
        },
        other => ApplicationError::Internal(format!("Database error: {other}")),
    }
}

/// Map a row that cannot be turned back into a domain object
pub fn corrupt_row(what: &str, err: impl std::fmt::Display) -> ApplicationError {
    ApplicationError::Internal(format!("Corrupt {what} in database: {err}"))
}
