//! Shared pieces of the persistence gateway.
//!
//! Each component declares its own repository trait next to its domain types;
//! this module holds what they have in common.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::error::ErrorKind;

/// Error enumeration for repository failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

impl RepositoryError {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            RepositoryError::Conflict => ErrorKind::Conflict,
            RepositoryError::NotFound => ErrorKind::NotFound,
            RepositoryError::Unavailable(_) => ErrorKind::Internal,
        }
    }
}

/// Monotonic identifier source producing `prefix-000001` style ids.
///
/// Zero padding keeps lexical order aligned with creation order, which the
/// listing code relies on for stable tie-breaking.
pub struct IdSequence {
    prefix: &'static str,
    next: AtomicU64,
}

impl IdSequence {
    pub const fn new(prefix: &'static str) -> Self {
        Self {
            prefix,
            next: AtomicU64::new(1),
        }
    }

    pub fn next_id(&self) -> String {
        let id = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}-{id:08}", self.prefix)
    }
}

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const MAX_PAGE_SIZE: usize = 100;

/// One-based page request with the limit clamped to `1..=MAX_PAGE_SIZE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub limit: usize,
}

impl PageRequest {
    pub fn new(page: Option<usize>, limit: Option<usize>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// A slice of an ordered result set plus the totals needed to walk it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    /// Cut `request.page` out of an already filtered and sorted result set.
    pub fn slice(items: Vec<T>, request: PageRequest) -> Self {
        let total = items.len();
        let items = items
            .into_iter()
            .skip(request.offset())
            .take(request.limit)
            .collect();

        Self {
            items,
            total,
            page: request.page,
            limit: request.limit,
            total_pages: total.div_ceil(request.limit),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
        }
    }
}
