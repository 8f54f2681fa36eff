use actix_web::{http::header, web, HttpResponse};
use common::AppError;
use contracts::{DataResponse, PageParams, PageQuery};
use serde::{Deserialize, Serialize};

use crate::domain::entries::{EntriesDeleteRequest, EntriesDeleted, EntriesUpdateRequest, EntriesUpdated, EntryKind};
use crate::domain::export::ExportKind;
use crate::domain::insights::AutomationAction;
use crate::domain::{
    GuestFilter, ManualAssignmentRequest, NotificationRequest, PhotoFilter, RsvpFilter, SeatingPlan, WishFilter,
};
use crate::repo::{NotificationStore, RsvpStore, SeatingStore};
use crate::service::{AdminService, ExportService, InsightsService, NotificationService, RsvpService, SeatingService};

const DEFAULT_PAGE_SIZE: i64 = 50;
const GUEST_PAGE_SIZE: i64 = 100;

fn invalid(e: crate::domain::validation::ValidationError) -> AppError {
    tracing::warn!(reason = %e, "rejected admin request");
    AppError::Validation(e.0)
}

pub async fn list_rsvps(
    admin: web::Data<AdminService>,
    page: web::Query<PageQuery>,
    filter: web::Query<RsvpFilter>,
) -> Result<HttpResponse, AppError> {
    let page = PageParams::from_query(&page, DEFAULT_PAGE_SIZE);
    Ok(HttpResponse::Ok().json(admin.list_rsvps(&filter, page).await?))
}

pub async fn list_guests(
    admin: web::Data<AdminService>,
    page: web::Query<PageQuery>,
    filter: web::Query<GuestFilter>,
) -> Result<HttpResponse, AppError> {
    let page = PageParams::from_query(&page, GUEST_PAGE_SIZE);
    Ok(HttpResponse::Ok().json(admin.list_guests(&filter, page).await?))
}

pub async fn list_songs(
    admin: web::Data<AdminService>,
    page: web::Query<PageQuery>,
) -> Result<HttpResponse, AppError> {
    let page = PageParams::from_query(&page, DEFAULT_PAGE_SIZE);
    Ok(HttpResponse::Ok().json(admin.list_songs(page).await?))
}

pub async fn list_photos(
    admin: web::Data<AdminService>,
    page: web::Query<PageQuery>,
    filter: web::Query<PhotoFilter>,
) -> Result<HttpResponse, AppError> {
    let page = PageParams::from_query(&page, DEFAULT_PAGE_SIZE);
    Ok(HttpResponse::Ok().json(admin.list_photos(&filter, page).await?))
}

pub async fn list_wishes(
    admin: web::Data<AdminService>,
    page: web::Query<PageQuery>,
    filter: web::Query<WishFilter>,
) -> Result<HttpResponse, AppError> {
    let page = PageParams::from_query(&page, DEFAULT_PAGE_SIZE);
    Ok(HttpResponse::Ok().json(admin.list_wishes(&filter, page).await?))
}

pub async fn list_notifications(
    admin: web::Data<AdminService>,
    page: web::Query<PageQuery>,
) -> Result<HttpResponse, AppError> {
    let page = PageParams::from_query(&page, DEFAULT_PAGE_SIZE);
    Ok(HttpResponse::Ok().json(admin.list_notifications(page).await?))
}

pub async fn seating_chart(admin: web::Data<AdminService>) -> Result<HttpResponse, AppError> {
    let chart = admin.seating_chart().await?;
    Ok(HttpResponse::Ok().json(DataResponse::new(chart)))
}

#[derive(Serialize)]
struct OptimizeResponse {
    success: bool,
    message: String,
    data: SeatingPlan,
}

impl From<SeatingPlan> for OptimizeResponse {
    fn from(plan: SeatingPlan) -> Self {
        Self {
            success: true,
            message: format!(
                "Assigned {} guests across {} tables",
                plan.guests_assigned, plan.tables_used
            ),
            data: plan,
        }
    }
}

pub async fn optimize_tables<G: SeatingStore + 'static>(
    seating: web::Data<SeatingService<G>>,
) -> Result<HttpResponse, AppError> {
    let plan = seating.optimize().await?;
    Ok(HttpResponse::Ok().json(OptimizeResponse::from(plan)))
}

pub async fn assign_tables(
    admin: web::Data<AdminService>,
    request: web::Json<ManualAssignmentRequest>,
) -> Result<HttpResponse, AppError> {
    let Some(assignments) = request.assignments.as_deref() else {
        return Err(AppError::validation(
            "Missing or invalid assignments array. Expected format: [{ guest_id: number, table_number: number }]",
        ));
    };

    let result = admin.assign_guests(assignments).await?;
    Ok(HttpResponse::Ok().json(result))
}

pub async fn update_entries(
    admin: web::Data<AdminService>,
    request: web::Json<EntriesUpdateRequest>,
) -> Result<HttpResponse, AppError> {
    let update = request.into_inner().parse().map_err(invalid)?;
    let updated = admin.update_entries(&update).await?;
    Ok(HttpResponse::Ok().json(EntriesUpdated::new(updated)))
}

pub async fn delete_entries<R: RsvpStore + 'static>(
    rsvp_service: web::Data<RsvpService<R>>,
    admin: web::Data<AdminService>,
    request: web::Json<EntriesDeleteRequest>,
) -> Result<HttpResponse, AppError> {
    let kind = request.parse().map_err(invalid)?;

    let deleted = match kind {
        EntryKind::Rsvps => rsvp_service.delete(&request.ids).await?,
        other => admin.delete_entries(other, &request.ids).await?,
    };

    Ok(HttpResponse::Ok().json(EntriesDeleted::new(kind, deleted)))
}

pub async fn send_notifications<N: NotificationStore + 'static>(
    notifications: web::Data<NotificationService<N>>,
    request: web::Json<NotificationRequest>,
) -> Result<HttpResponse, AppError> {
    let report = notifications.send(&request).await?;
    Ok(HttpResponse::Ok().json(report))
}

#[derive(Debug, Deserialize)]
pub struct AutomationRequest {
    pub action: Option<String>,
}

pub async fn run_automation<G: SeatingStore + 'static>(
    seating: web::Data<SeatingService<G>>,
    insights: web::Data<InsightsService>,
    request: web::Json<AutomationRequest>,
) -> Result<HttpResponse, AppError> {
    let action = request
        .action
        .as_deref()
        .and_then(AutomationAction::parse)
        .ok_or_else(|| AppError::validation("Invalid action"))?;

    let response = match action {
        AutomationAction::AutoTableOptimization => {
            HttpResponse::Ok().json(DataResponse::new(seating.optimize().await?))
        }
        AutomationAction::SmartReminders => {
            HttpResponse::Ok().json(DataResponse::new(insights.smart_reminders().await?))
        }
        AutomationAction::DietaryInsights => {
            HttpResponse::Ok().json(DataResponse::new(insights.dietary_insights().await?))
        }
        AutomationAction::GuestAnalytics => {
            HttpResponse::Ok().json(DataResponse::new(insights.guest_analytics().await?))
        }
        AutomationAction::RsvpPrediction => {
            HttpResponse::Ok().json(DataResponse::new(insights.rsvp_prediction().await?))
        }
    };

    Ok(response)
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

pub async fn export_csv(
    exports: web::Data<ExportService>,
    query: web::Query<ExportQuery>,
) -> Result<HttpResponse, AppError> {
    let requested = query.kind.as_deref().unwrap_or("all");
    let kind = ExportKind::parse(requested).ok_or_else(|| {
        AppError::validation(format!(
            "Unknown export type '{requested}'. Supported types: guests, tables, rsvps, songs, photos, wishes, notifications, all"
        ))
    })?;

    let export = exports.export(kind).await?;
    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", export.filename),
        ))
        .body(export.body))
}
