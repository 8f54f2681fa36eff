use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;
use sqlx::PgPool;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    service: String,
    database: &'static str,
}

/// Name reported by the health endpoint.
#[derive(Clone)]
pub struct ServiceName(pub String);

pub async fn health_check(pool: web::Data<PgPool>, name: web::Data<ServiceName>) -> impl Responder {
    match db::ping(&pool).await {
        Ok(()) => HttpResponse::Ok().json(HealthResponse {
            status: "ok",
            service: name.0.clone(),
            database: "connected",
        }),
        Err(e) => {
            tracing::error!(error = %e, "health check could not reach the database");
            HttpResponse::ServiceUnavailable().json(HealthResponse {
                status: "degraded",
                service: name.0.clone(),
                database: "unavailable",
            })
        }
    }
}
