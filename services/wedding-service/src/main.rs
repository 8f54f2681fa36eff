mod api;
mod clients;
mod domain;
mod middleware;
mod repo;
mod service;

use std::io;

use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, web, App, HttpServer};
use common::config::{AppConfig, MailConfig};
use common::errors::expose_error_details;
use tracing_subscriber::EnvFilter;

use api::handlers::health::ServiceName;
use clients::SendGridClient;
use middleware::RateLimiter;
use repo::{GuestRepository, NotificationRepository, RsvpRepository};
use service::{
    AdminAuthService, AdminService, ExportService, InsightsService, NotificationService, RsvpService,
    SeatingService, SubmissionService,
};

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn startup_error(context: &str, err: impl std::fmt::Display) -> io::Error {
    tracing::error!(error = %err, "{}", context);
    io::Error::other(format!("{context}: {err}"))
}

fn mail_client(mail: &MailConfig, config: &AppConfig) -> io::Result<Option<SendGridClient>> {
    let Some(api_key) = mail.sendgrid_api_key.clone() else {
        tracing::warn!("SENDGRID_API_KEY not set, notifications are disabled");
        return Ok(None);
    };

    SendGridClient::new(
        api_key,
        mail.api_url.clone(),
        mail.from_email.clone(),
        mail.from_name.clone(),
        config.request_timeout,
    )
    .map(Some)
    .map_err(|e| startup_error("Failed to build SendGrid client", e))
}

fn cors(allowed_origin: Option<&str>) -> Cors {
    let cors = Cors::default()
        .allowed_methods(["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(3600);

    match allowed_origin {
        Some(origin) => cors.allowed_origin(origin),
        None => cors.allow_any_origin(),
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing("info");
            return Err(startup_error("Invalid configuration", e));
        }
    };
    init_tracing(&config.log_level);
    expose_error_details(config.environment.is_development());

    let pool = db::create_pool(&config.database)
        .await
        .map_err(|e| startup_error("Failed to create database pool", e))?;
    db::run_migrations(&pool)
        .await
        .map_err(|e| startup_error("Failed to run migrations", e))?;

    let rsvp_service = web::Data::new(RsvpService::new(RsvpRepository::new(pool.clone())));
    let seating_service = web::Data::new(SeatingService::new(
        GuestRepository::new(pool.clone()),
        config.table_capacity,
    ));
    let admin_auth = web::Data::new(
        AdminAuthService::new(&config.admin).map_err(|e| startup_error("Failed to prepare admin login", e))?,
    );
    let admin_service = web::Data::new(AdminService::new(pool.clone(), config.table_capacity));
    let submission_service = web::Data::new(SubmissionService::new(pool.clone()));
    let notification_service = web::Data::new(NotificationService::new(
        NotificationRepository::new(pool.clone()),
        mail_client(&config.mail, &config)?,
        &config.mail,
    ));
    let insights_service = web::Data::new(InsightsService::new(pool.clone(), config.event_date));
    let export_service = web::Data::new(ExportService::new(pool.clone(), config.table_capacity));
    let pool = web::Data::new(pool);
    let service_name = web::Data::new(ServiceName(config.service_name.clone()));

    let rate_limiter = RateLimiter::new(&config.rate_limit);
    let jwt_secret = config.admin.jwt_secret.clone();
    let allowed_origin = config.cors_allowed_origin.clone();

    let server_address = config.server_address();
    tracing::info!(
        service = %config.service_name,
        environment = ?config.environment,
        table_capacity = config.table_capacity,
        "starting on http://{}",
        server_address
    );
    tracing::info!(
        burst = config.rate_limit.burst,
        per_second = config.rate_limit.per_second,
        trust_forwarded = config.rate_limit.trust_forwarded,
        "rate limiting public submissions per client IP"
    );

    HttpServer::new(move || {
        App::new()
            .app_data(pool.clone())
            .app_data(service_name.clone())
            .app_data(rsvp_service.clone())
            .app_data(seating_service.clone())
            .app_data(admin_auth.clone())
            .app_data(admin_service.clone())
            .app_data(submission_service.clone())
            .app_data(notification_service.clone())
            .app_data(insights_service.clone())
            .app_data(export_service.clone())
            .wrap(Logger::default())
            .wrap(cors(allowed_origin.as_deref()))
            .configure(|cfg| {
                api::routes::configure::<RsvpRepository, GuestRepository, NotificationRepository>(
                    cfg,
                    &jwt_secret,
                    rate_limiter.clone(),
                )
            })
    })
    .client_request_timeout(config.request_timeout)
    .bind(&server_address)?
    .run()
    .await
}
