//! Typed failure taxonomy for the engine.
//!
//! Every operation surfaces one of these kinds; translating them into
//! transport status codes (HTTP or otherwise) is the boundary layer's job.

use crate::utils::code_generator::CODE_LENGTH;

/// Errors produced by the allocation/resolution engine.
///
/// # Variants
///
/// - [`AppError::MalformedCode`] / [`AppError::CodeNotFound`] - resolver failures
/// - [`AppError::NotFoundOrNotOwned`] - owner-scoped CRUD failures
/// - [`AppError::CodeAllocationExhausted`] - allocator gave up after its retry budget
/// - [`AppError::Conflict`] - a store-reported unique-constraint violation,
///   kept distinguishable from other database errors because the allocator's
///   retry loop reacts to it
/// - [`AppError::Database`] - any other store failure, propagated unchanged
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The supplied code does not match the fixed shape
    /// (6 ASCII-alphanumeric characters). Rejected before any store access.
    #[error("short code must be exactly {CODE_LENGTH} alphanumeric characters")]
    MalformedCode,

    /// No active record exists for a well-formed code.
    #[error("short link not found")]
    CodeNotFound,

    /// No active record matches the given id and owner.
    ///
    /// "Does not exist" and "exists but owned by someone else" are
    /// deliberately the same variant with the same message, so callers
    /// cannot probe for foreign records.
    #[error("short link not found")]
    NotFoundOrNotOwned,

    /// The allocator hit a uniqueness conflict on every attempt in its
    /// budget. Transient; callers may retry the whole operation.
    #[error("could not allocate a unique short code, please try again")]
    CodeAllocationExhausted,

    /// The store rejected a write due to a unique constraint.
    #[error("unique constraint violation{}", .constraint.as_deref().map(|c| format!(" ({c})")).unwrap_or_default())]
    Conflict { constraint: Option<String> },

    /// Any other store failure.
    #[error("database error")]
    Database(#[source] sqlx::Error),
}

impl AppError {
    /// Returns true for a store-reported uniqueness violation.
    pub fn is_conflict(&self) -> bool {
        matches!(self, AppError::Conflict { .. })
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db) = e.as_database_error()
            && db.is_unique_violation()
        {
            return AppError::Conflict {
                constraint: db.constraint().map(str::to_owned),
            };
        }

        AppError::Database(e)
    }
}
