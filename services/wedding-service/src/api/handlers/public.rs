use actix_web::{http::StatusCode, web, HttpResponse};
use common::AppError;
use contracts::{PageParams, PageQuery};

use crate::domain::{PhotoFilter, PhotoSubmission, RsvpRequest, RsvpSubmitted, SongSubmission, WishSubmission};
use crate::repo::RsvpStore;
use crate::service::admin_auth_service::SessionRequest;
use crate::service::{AdminAuthService, RsvpService, SubmissionService};

const GALLERY_PAGE_SIZE: i64 = 50;

pub async fn submit_rsvp<R: RsvpStore + 'static>(
    rsvp_service: web::Data<RsvpService<R>>,
    request: web::Json<RsvpRequest>,
) -> Result<HttpResponse, AppError> {
    let outcome = rsvp_service.submit(&request).await?;
    let status = if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok(HttpResponse::build(status).json(RsvpSubmitted::from(outcome)))
}

pub async fn submit_song(
    submissions: web::Data<SubmissionService>,
    request: web::Json<SongSubmission>,
) -> Result<HttpResponse, AppError> {
    let created = submissions.submit_song(&request).await?;
    Ok(HttpResponse::Created().json(created))
}

pub async fn submit_photo(
    submissions: web::Data<SubmissionService>,
    request: web::Json<PhotoSubmission>,
) -> Result<HttpResponse, AppError> {
    let created = submissions.submit_photo(&request).await?;
    Ok(HttpResponse::Created().json(created))
}

pub async fn submit_wish(
    submissions: web::Data<SubmissionService>,
    request: web::Json<WishSubmission>,
) -> Result<HttpResponse, AppError> {
    let created = submissions.submit_wish(&request).await?;
    Ok(HttpResponse::Created().json(created))
}

pub async fn photo_gallery(
    submissions: web::Data<SubmissionService>,
    page: web::Query<PageQuery>,
    filter: web::Query<PhotoFilter>,
) -> Result<HttpResponse, AppError> {
    let page = PageParams::from_query(&page, GALLERY_PAGE_SIZE);
    let gallery = submissions.gallery(&filter, page).await?;
    Ok(HttpResponse::Ok().json(gallery))
}

pub async fn create_session(
    auth: web::Data<AdminAuthService>,
    request: web::Json<SessionRequest>,
) -> Result<HttpResponse, AppError> {
    let password = request
        .into_inner()
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::validation("Password is required"))?;

    // bcrypt verification blocks.
    let session = web::block(move || auth.login(&password))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "admin login task failed");
            AppError::Internal
        })??;
    Ok(HttpResponse::Ok().json(session))
}
