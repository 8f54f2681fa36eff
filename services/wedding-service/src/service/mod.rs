pub mod admin_auth_service;
pub mod admin_service;
pub mod export_service;
pub mod insights_service;
pub mod notification_service;
pub mod rsvp_service;
pub mod seating_service;
pub mod submission_service;

pub use admin_auth_service::AdminAuthService;
pub use admin_service::AdminService;
pub use export_service::ExportService;
pub use insights_service::InsightsService;
pub use notification_service::NotificationService;
pub use rsvp_service::RsvpService;
pub use seating_service::SeatingService;
pub use submission_service::SubmissionService;

use common::AppError;

/// Logs a store failure and hides it behind the generic database error.
pub(crate) fn store_error(action: &'static str, err: anyhow::Error) -> AppError {
    let detail = format!("{err:#}");
    tracing::error!(error = %detail, "{} failed", action);
    AppError::Database(detail)
}
