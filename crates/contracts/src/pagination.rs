use serde::{Deserialize, Serialize};

pub const MAX_PAGE_SIZE: i64 = 500;

/// Raw `limit` / `offset` query parameters as sent by clients.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PageQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Clamped page window ready to hand to a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub limit: i64,
    pub offset: i64,
}

impl PageParams {
    pub fn from_query(query: &PageQuery, default_limit: i64) -> Self {
        Self {
            limit: query.limit.unwrap_or(default_limit).clamp(1, MAX_PAGE_SIZE),
            offset: query.offset.unwrap_or(0).max(0),
        }
    }

    pub fn pagination(&self, total: i64, returned: usize) -> Pagination {
        Pagination {
            total,
            limit: self.limit,
            offset: self.offset,
            has_more: self.offset + (returned as i64) < total,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    #[serde(rename = "hasMore")]
    pub has_more: bool,
}
