use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

/// PageRequest
///
/// A resolved page window. Missing or zero values fall back to page 1 / limit 10,
/// and the limit is capped so a single request cannot drain a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        Self {
            page: page.filter(|p| *p > 0).unwrap_or(DEFAULT_PAGE),
            limit: limit
                .filter(|l| *l > 0)
                .unwrap_or(DEFAULT_LIMIT)
                .min(MAX_LIMIT),
        }
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.limit)
    }

    /// Slices an already-filtered, already-ordered list. Used by the in-memory store.
    pub fn slice<T>(&self, rows: Vec<T>) -> Paginated<T> {
        let total = rows.len() as i64;
        let data = rows
            .into_iter()
            .skip(self.offset() as usize)
            .take(self.limit as usize)
            .collect();
        Paginated::new(data, *self, total)
    }
}

/// Pagination
///
/// Metadata block shared by every list response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    #[serde(rename = "totalPages")]
    pub total_pages: i64,
}

/// Paginated
///
/// List envelope: `{ "data": [...], "pagination": {...} }`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, request: PageRequest, total: i64) -> Self {
        let limit = i64::from(request.limit);
        Self {
            data,
            pagination: Pagination {
                page: request.page,
                limit: request.limit,
                total,
                total_pages: (total + limit - 1) / limit,
            },
        }
    }
}
