use sea_orm::DbErr;

/// Failures raised by the domain services.
///
/// Authorization failures are explicit variants so callers can tell a
/// wrong-role or non-owner call apart from a database fault.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DbErr(#[from] DbErr),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Conflict: {0}")]
    Conflict(String),
}
