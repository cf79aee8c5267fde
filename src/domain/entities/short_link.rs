//! ShortLink entity representing a code-to-URL mapping.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A shortened URL record.
///
/// The `code` is immutable once assigned and globally unique among active
/// records; `owner_id` is an opaque identifier supplied by an external
/// identity layer, absent for anonymously created links.
#[derive(Debug, Clone, Serialize)]
pub struct ShortLink {
    pub id: i64,
    pub code: String,
    pub original_url: String,
    pub owner_id: Option<String>,
    /// Visit counter, mutated only by the resolver's atomic increment.
    pub clicks: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl ShortLink {
    /// Returns true if the link has been soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Returns true if the link was created without an authenticated owner.
    pub fn is_anonymous(&self) -> bool {
        self.owner_id.is_none()
    }
}

/// Input data for inserting a new link.
///
/// `clicks` always starts at zero and is therefore not part of the input.
#[derive(Debug, Clone)]
pub struct NewShortLink {
    pub code: String,
    pub original_url: String,
    pub owner_id: Option<String>,
}

/// Minimal projection used by the resolver.
///
/// A redirect only needs the row identifier (for the click increment) and
/// the target URL, so nothing else is shipped back from the store.
#[derive(Debug, Clone)]
pub struct ResolveTarget {
    pub id: i64,
    pub original_url: String,
}
