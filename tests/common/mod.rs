#![allow(dead_code)]

//! In-memory repository fake shared by the integration tests.
//!
//! Enforces the same constraints as the PostgreSQL schema: a full unique
//! index on `code` and a partial unique index on active
//! `(owner_id, original_url)` pairs. This lets the test suite exercise the
//! service's conflict handling and concurrency behavior without a live
//! database.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

use shortlink_engine::error::AppError;
use shortlink_engine::prelude::*;

/// Installs a fmt subscriber honoring `RUST_LOG`, once per test binary.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}

/// In-memory implementation of [`ShortLinkRepository`].
///
/// Every operation takes the row lock for its whole duration, so each call
/// is atomic the way a single SQL statement is.
#[derive(Default)]
pub struct InMemoryRepository {
    rows: Mutex<Vec<ShortLink>>,
    next_id: AtomicI64,
    /// Number of `insert` calls, successful or not.
    pub insert_calls: AtomicUsize,
    /// Number of `find_target_by_code` calls.
    pub lookup_calls: AtomicUsize,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
            insert_calls: AtomicUsize::new(0),
            lookup_calls: AtomicUsize::new(0),
        }
    }

    /// Total number of rows, active and soft-deleted.
    pub fn row_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    /// Number of active rows.
    pub fn active_count(&self) -> usize {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| !r.is_deleted())
            .count()
    }

    pub fn clicks_of(&self, code: &str) -> i64 {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.code == code)
            .map(|r| r.clicks)
            .unwrap()
    }

    pub fn get(&self, id: i64) -> Option<ShortLink> {
        self.rows.lock().unwrap().iter().find(|r| r.id == id).cloned()
    }
}

#[async_trait]
impl ShortLinkRepository for InMemoryRepository {
    async fn insert(&self, new_link: NewShortLink) -> Result<ShortLink, AppError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);

        let mut rows = self.rows.lock().unwrap();

        // short_links_code_key: full unique index, deleted rows included.
        if rows.iter().any(|r| r.code == new_link.code) {
            return Err(AppError::Conflict {
                constraint: Some("short_links_code_key".to_string()),
            });
        }

        // short_links_owner_original_url_key: active owned pairs only.
        if new_link.owner_id.is_some()
            && rows.iter().any(|r| {
                !r.is_deleted()
                    && r.owner_id == new_link.owner_id
                    && r.original_url == new_link.original_url
            })
        {
            return Err(AppError::Conflict {
                constraint: Some("short_links_owner_original_url_key".to_string()),
            });
        }

        let now = Utc::now();
        let link = ShortLink {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            code: new_link.code,
            original_url: new_link.original_url,
            owner_id: new_link.owner_id,
            clicks: 0,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        rows.push(link.clone());

        Ok(link)
    }

    async fn find_by_owner_and_url(
        &self,
        owner_id: &str,
        original_url: &str,
    ) -> Result<Option<ShortLink>, AppError> {
        let rows = self.rows.lock().unwrap();

        Ok(rows
            .iter()
            .find(|r| {
                !r.is_deleted()
                    && r.owner_id.as_deref() == Some(owner_id)
                    && r.original_url == original_url
            })
            .cloned())
    }

    async fn find_target_by_code(&self, code: &str) -> Result<Option<ResolveTarget>, AppError> {
        self.lookup_calls.fetch_add(1, Ordering::SeqCst);

        let rows = self.rows.lock().unwrap();

        Ok(rows
            .iter()
            .find(|r| !r.is_deleted() && r.code == code)
            .map(|r| ResolveTarget {
                id: r.id,
                original_url: r.original_url.clone(),
            }))
    }

    async fn find_by_id_and_owner(
        &self,
        id: i64,
        owner_id: &str,
    ) -> Result<Option<ShortLink>, AppError> {
        let rows = self.rows.lock().unwrap();

        Ok(rows
            .iter()
            .find(|r| !r.is_deleted() && r.id == id && r.owner_id.as_deref() == Some(owner_id))
            .cloned())
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<ShortLink>, AppError> {
        let rows = self.rows.lock().unwrap();

        let mut result: Vec<ShortLink> = rows
            .iter()
            .filter(|r| !r.is_deleted() && r.owner_id.as_deref() == Some(owner_id))
            .cloned()
            .collect();

        // created_at DESC, id as a tie-break for same-instant rows.
        result.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));

        Ok(result)
    }

    async fn update_url(&self, id: i64, original_url: &str) -> Result<ShortLink, AppError> {
        let mut rows = self.rows.lock().unwrap();

        let row = rows
            .iter_mut()
            .find(|r| !r.is_deleted() && r.id == id)
            .ok_or(AppError::NotFoundOrNotOwned)?;

        row.original_url = original_url.to_owned();
        row.updated_at = Utc::now();

        Ok(row.clone())
    }

    async fn soft_delete(&self, id: i64) -> Result<(), AppError> {
        let mut rows = self.rows.lock().unwrap();

        let row = rows
            .iter_mut()
            .find(|r| !r.is_deleted() && r.id == id)
            .ok_or(AppError::NotFoundOrNotOwned)?;

        let now = Utc::now();
        row.deleted_at = Some(now);
        row.updated_at = now;

        Ok(())
    }

    async fn increment_clicks(&self, id: i64) -> Result<(), AppError> {
        let mut rows = self.rows.lock().unwrap();

        if let Some(row) = rows.iter_mut().find(|r| r.id == id) {
            row.clicks += 1;
        }

        Ok(())
    }
}

/// Repository whose every insert fails with a code-uniqueness conflict,
/// for exercising the allocator's retry budget.
#[derive(Default)]
pub struct AlwaysConflictRepository {
    pub insert_calls: AtomicUsize,
    pub dedupe_lookups: AtomicUsize,
}

#[async_trait]
impl ShortLinkRepository for AlwaysConflictRepository {
    async fn insert(&self, _new_link: NewShortLink) -> Result<ShortLink, AppError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        Err(AppError::Conflict {
            constraint: Some("short_links_code_key".to_string()),
        })
    }

    async fn find_by_owner_and_url(
        &self,
        _owner_id: &str,
        _original_url: &str,
    ) -> Result<Option<ShortLink>, AppError> {
        self.dedupe_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(None)
    }

    async fn find_target_by_code(&self, _code: &str) -> Result<Option<ResolveTarget>, AppError> {
        Ok(None)
    }

    async fn find_by_id_and_owner(
        &self,
        _id: i64,
        _owner_id: &str,
    ) -> Result<Option<ShortLink>, AppError> {
        Ok(None)
    }

    async fn list_by_owner(&self, _owner_id: &str) -> Result<Vec<ShortLink>, AppError> {
        Ok(Vec::new())
    }

    async fn update_url(&self, _id: i64, _original_url: &str) -> Result<ShortLink, AppError> {
        Err(AppError::NotFoundOrNotOwned)
    }

    async fn soft_delete(&self, _id: i64) -> Result<(), AppError> {
        Err(AppError::NotFoundOrNotOwned)
    }

    async fn increment_clicks(&self, _id: i64) -> Result<(), AppError> {
        Ok(())
    }
}
