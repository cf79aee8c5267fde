//! Repository trait for short link data access.

use crate::domain::entities::{NewShortLink, ResolveTarget, ShortLink};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for short link storage.
///
/// Unless stated otherwise, every operation only sees *active* records
/// (`deleted_at IS NULL`); soft-deleted rows are logically absent.
///
/// All coordination between concurrent writers is delegated to the backing
/// store's constraint and transaction guarantees; the trait exposes the
/// store's uniqueness rejections as [`AppError::Conflict`] so the caller
/// can react instead of trying to prevent the race in-process.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgShortLinkRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShortLinkRepository: Send + Sync {
    /// Inserts a new link as a single atomic write.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the code is already taken, or if
    /// an active record for the same `(owner_id, original_url)` pair
    /// already exists. Returns [`AppError::Database`] on other store
    /// failures.
    async fn insert(&self, new_link: NewShortLink) -> Result<ShortLink, AppError>;

    /// Finds the active link for an `(owner_id, original_url)` pair.
    ///
    /// Backs the allocator's idempotency checks. Anonymous links are never
    /// matched by this lookup.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Database`] on store failures.
    async fn find_by_owner_and_url(
        &self,
        owner_id: &str,
        original_url: &str,
    ) -> Result<Option<ShortLink>, AppError>;

    /// Finds the resolve projection (id + target URL) of an active link
    /// by its code.
    ///
    /// Deliberately selects only the columns the resolver needs.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Database`] on store failures.
    async fn find_target_by_code(&self, code: &str) -> Result<Option<ResolveTarget>, AppError>;

    /// Finds an active link by id *and* owner in a single predicate.
    ///
    /// A missing record and a record owned by someone else are
    /// indistinguishable by construction.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Database`] on store failures.
    async fn find_by_id_and_owner(
        &self,
        id: i64,
        owner_id: &str,
    ) -> Result<Option<ShortLink>, AppError>;

    /// Lists all active links for an owner, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Database`] on store failures.
    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<ShortLink>, AppError>;

    /// Replaces the target URL of a link and refreshes `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFoundOrNotOwned`] if no active row with that
    /// id exists. Returns [`AppError::Database`] on store failures.
    async fn update_url(&self, id: i64, original_url: &str) -> Result<ShortLink, AppError>;

    /// Soft-deletes a link by setting `deleted_at = now()`.
    ///
    /// The code column is left untouched; codes are never reused.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFoundOrNotOwned`] if no active row with that
    /// id exists. Returns [`AppError::Database`] on store failures.
    async fn soft_delete(&self, id: i64) -> Result<(), AppError>;

    /// Atomically increments the click counter of a link by one.
    ///
    /// Must be a single store-side `clicks = clicks + 1` update so that
    /// concurrent resolutions never lose increments.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Database`] on store failures.
    async fn increment_clicks(&self, id: i64) -> Result<(), AppError>;
}
