// Shared configuration, errors and utilities
pub mod config;
pub mod errors;
pub mod retry;
pub mod time;

pub use config::AppConfig;
pub use errors::AppError;
