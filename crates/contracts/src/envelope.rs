use serde::Serialize;

use crate::pagination::Pagination;

/// Shape shared by every admin listing.
#[derive(Debug, Serialize)]
pub struct ListResponse<T, S> {
    pub success: bool,
    pub data: Vec<T>,
    pub pagination: Pagination,
    pub statistics: S,
}

impl<T, S> ListResponse<T, S> {
    pub fn new(data: Vec<T>, pagination: Pagination, statistics: S) -> Self {
        Self {
            success: true,
            data,
            pagination,
            statistics,
        }
    }
}

/// `{success, data}` wrapper for single results.
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { success: true, data }
    }
}

/// Paginated listing without aggregate statistics.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub success: bool,
    pub data: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, pagination: Pagination) -> Self {
        Self {
            success: true,
            data,
            pagination,
        }
    }
}

/// Acknowledgement for a created resource.
#[derive(Debug, Serialize)]
pub struct Created<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T> Created<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }
}
