//! Pagination request and response envelope.

use serde::{Deserialize, Serialize};

pub const DEFAULT_LIMIT: u32 = 6;
pub const MAX_LIMIT: u32 = 100;

/// Pagination parameters shared across all list endpoints.
///
/// - `limit`: 1–100, default 6
/// - `page`: ≥ 1, default 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default = "default_page")]
    pub page: u32,
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

fn default_page() -> u32 {
    1
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            page: default_page(),
        }
    }
}

impl PageRequest {
    pub fn new(limit: Option<u32>, page: Option<u32>) -> Self {
        Self {
            limit: limit.unwrap_or(DEFAULT_LIMIT),
            page: page.unwrap_or(1),
        }
        .clamped()
    }

    /// Clamp `limit` to 1–100 and `page` to ≥ 1.
    pub fn clamped(self) -> Self {
        Self {
            limit: self.limit.clamp(1, MAX_LIMIT),
            page: self.page.max(1),
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

/// One page of results plus the total number of matching rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub count: u64,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(count: u64, results: Vec<T>) -> Self {
        Self { count, results }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            count: self.count,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}
