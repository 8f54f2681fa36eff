// Database pool, migrations and error classification
pub mod errors;
pub mod pool;

pub use errors::{is_transient, is_unique_violation};
pub use pool::{create_pool, ping, run_migrations};
