use actix_web::{error, web, HttpRequest};
use authz::AuthMiddleware;
use common::AppError;

use super::handlers::{admin, health, public};
use crate::middleware::RateLimiter;
use crate::repo::{NotificationStore, RsvpStore, SeatingStore};

fn json_error(err: error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    tracing::warn!(error = %err, "malformed json body");
    AppError::validation("Invalid JSON in request body").into()
}

fn query_error(err: error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    tracing::warn!(error = %err, "malformed query string");
    AppError::validation("Invalid query parameters").into()
}

/// Public routes are rate limited; everything under `/api/admin` except the
/// session endpoint requires an admin token.
pub fn configure<R, G, N>(cfg: &mut web::ServiceConfig, jwt_secret: &str, limiter: RateLimiter)
where
    R: RsvpStore + 'static,
    G: SeatingStore + 'static,
    N: NotificationStore + 'static,
{
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::QueryConfig::default().error_handler(query_error))
        .route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/api/admin")
                .service(
                    web::resource("/session")
                        .wrap(limiter.clone())
                        .route(web::post().to(public::create_session)),
                )
                .service(
                    web::scope("")
                        .wrap(AuthMiddleware::new(jwt_secret.to_string()))
                        .route("/rsvps", web::get().to(admin::list_rsvps))
                        .route("/guests", web::get().to(admin::list_guests))
                        .route("/songs", web::get().to(admin::list_songs))
                        .route("/photos", web::get().to(admin::list_photos))
                        .route("/wishes", web::get().to(admin::list_wishes))
                        .route("/notifications", web::get().to(admin::list_notifications))
                        .route("/notifications", web::post().to(admin::send_notifications::<N>))
                        .route("/tables", web::get().to(admin::seating_chart))
                        .route("/tables/optimize", web::post().to(admin::optimize_tables::<G>))
                        .route("/tables/assignments", web::put().to(admin::assign_tables))
                        .route("/entries/update", web::post().to(admin::update_entries))
                        .route("/entries/delete", web::post().to(admin::delete_entries::<R>))
                        .route("/automation", web::post().to(admin::run_automation::<G>))
                        .route("/export", web::get().to(admin::export_csv)),
                ),
        )
        .service(
            web::scope("/api")
                .wrap(limiter)
                .route("/rsvp", web::post().to(public::submit_rsvp::<R>))
                .route("/songs", web::post().to(public::submit_song))
                .route("/photos", web::post().to(public::submit_photo))
                .route("/photos", web::get().to(public::photo_gallery))
                .route("/wishes", web::post().to(public::submit_wish)),
        );
}
