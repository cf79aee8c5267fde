//! Short link allocation, resolution, and owner-scoped management.

use std::sync::Arc;

use crate::domain::entities::{NewShortLink, ShortLink};
use crate::domain::repositories::ShortLinkRepository;
use crate::error::AppError;
use crate::utils::code_generator::{generate_code, is_well_formed_code};

/// Upper bound on insert attempts per allocation.
///
/// With a 62^6 code space the chance of five consecutive collisions is
/// negligible at any realistic table size; the bound exists to rule out an
/// unbounded loop under pathological store behavior, and caps allocation
/// latency at five sequential store round trips.
const MAX_ALLOCATION_ATTEMPTS: usize = 5;

/// Service owning the short-code lifecycle: allocation with owner-scoped
/// deduplication, resolution with click counting, and owner CRUD.
///
/// The service holds no mutable state of its own and is safe to share
/// across any number of concurrent tasks; all coordination is pushed to
/// the backing store's constraint guarantees through
/// [`ShortLinkRepository`].
pub struct ShortLinkService<R: ShortLinkRepository> {
    repository: Arc<R>,
}

impl<R: ShortLinkRepository> ShortLinkService<R> {
    /// Creates a new service over a repository.
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Allocates a short code for `original_url`.
    ///
    /// The URL is assumed to be already validated upstream and the owner
    /// identifier, if any, already authenticated; both are treated as
    /// opaque.
    ///
    /// # Idempotency
    ///
    /// For an owned request, an existing active link for the same
    /// `(owner, url)` pair is returned as-is, both before the insert loop
    /// and again after any insert conflict. The post-conflict re-check is
    /// what makes the read-then-write sequence race-free across processes
    /// sharing one store.
    ///
    /// Anonymous requests are never deduplicated; each one yields a fresh
    /// code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::CodeAllocationExhausted`] after
    /// `MAX_ALLOCATION_ATTEMPTS` consecutive uniqueness conflicts without
    /// an idempotent rescue. Any non-conflict store error is propagated
    /// unchanged.
    pub async fn allocate(
        &self,
        original_url: &str,
        owner_id: Option<&str>,
    ) -> Result<ShortLink, AppError> {
        if let Some(owner) = owner_id
            && let Some(existing) = self
                .repository
                .find_by_owner_and_url(owner, original_url)
                .await?
        {
            tracing::debug!(code = %existing.code, "returning existing link for owner");
            return Ok(existing);
        }

        for attempt in 1..=MAX_ALLOCATION_ATTEMPTS {
            let code = generate_code();

            let new_link = NewShortLink {
                code,
                original_url: original_url.to_owned(),
                owner_id: owner_id.map(str::to_owned),
            };

            match self.repository.insert(new_link).await {
                Ok(link) => {
                    tracing::info!(code = %link.code, "short link created");
                    return Ok(link);
                }
                Err(err) if err.is_conflict() => {
                    tracing::debug!(attempt, "short code insert conflict");

                    // A concurrent request for the same (owner, url) pair
                    // may have inserted the row this call was about to
                    // create; in that case the conflict is a win, not a
                    // failure.
                    if let Some(owner) = owner_id
                        && let Some(existing) = self
                            .repository
                            .find_by_owner_and_url(owner, original_url)
                            .await?
                    {
                        tracing::debug!(
                            code = %existing.code,
                            "concurrent insert won the race, returning existing link"
                        );
                        return Ok(existing);
                    }

                    // Plain code collision: this attempt is spent, take
                    // the next one.
                }
                Err(err) => return Err(err),
            }
        }

        tracing::warn!(
            attempts = MAX_ALLOCATION_ATTEMPTS,
            "failed to allocate a unique short code"
        );
        Err(AppError::CodeAllocationExhausted)
    }

    /// Resolves a code to its target URL and counts the visit.
    ///
    /// The click increment is a single atomic store-side update; its value
    /// is not returned because the caller only needs the redirect target.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::MalformedCode`] without touching the store if
    /// `code` does not have the fixed shape, and [`AppError::CodeNotFound`]
    /// if no active link carries it.
    pub async fn resolve(&self, code: &str) -> Result<String, AppError> {
        if !is_well_formed_code(code) {
            return Err(AppError::MalformedCode);
        }

        let target = self
            .repository
            .find_target_by_code(code)
            .await?
            .ok_or(AppError::CodeNotFound)?;

        self.repository.increment_clicks(target.id).await?;

        Ok(target.original_url)
    }

    /// Lists all active links of an owner, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Database`] on store failures.
    pub async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<ShortLink>, AppError> {
        let links = self.repository.list_by_owner(owner_id).await?;

        tracing::debug!(count = links.len(), "listed links for owner");
        Ok(links)
    }

    /// Replaces the target URL of an owned link.
    ///
    /// When `new_url` is absent the link is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFoundOrNotOwned`] if no active link matches
    /// both `id` and `owner_id`; whether the record is missing or merely
    /// foreign is not revealed.
    pub async fn update(
        &self,
        id: i64,
        owner_id: &str,
        new_url: Option<&str>,
    ) -> Result<ShortLink, AppError> {
        let link = self
            .repository
            .find_by_id_and_owner(id, owner_id)
            .await?
            .ok_or(AppError::NotFoundOrNotOwned)?;

        let Some(new_url) = new_url else {
            return Ok(link);
        };

        let updated = self.repository.update_url(link.id, new_url).await?;

        tracing::info!(id, "short link updated");
        Ok(updated)
    }

    /// Soft-deletes an owned link.
    ///
    /// The code stays on the deleted row and is never reissued, so an old
    /// link can not be resurrected under a reused code. There is no
    /// undelete.
    ///
    /// # Errors
    ///
    /// Same not-found/not-owned semantics as [`Self::update`].
    pub async fn soft_delete(&self, id: i64, owner_id: &str) -> Result<(), AppError> {
        let link = self
            .repository
            .find_by_id_and_owner(id, owner_id)
            .await?
            .ok_or(AppError::NotFoundOrNotOwned)?;

        self.repository.soft_delete(link.id).await?;

        tracing::info!(id, "short link soft deleted");
        Ok(())
    }
}
