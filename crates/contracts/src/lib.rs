// JSON envelopes shared across endpoints
pub mod envelope;
pub mod pagination;

pub use envelope::{Created, DataResponse, ListResponse, Page};
pub use pagination::{PageParams, PageQuery, Pagination};
