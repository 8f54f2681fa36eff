use chrono::NaiveDate;
use common::{time, AppError};
use sqlx::PgPool;

use super::store_error;
use crate::domain::insights::{
    dietary_insights, guest_analytics, rsvp_prediction, smart_reminders, DietaryInsights,
    GuestAnalytics, RsvpPrediction, SmartReminders,
};
use crate::repo::{GuestRepository, RsvpRepository};

pub struct InsightsService {
    guests: GuestRepository,
    rsvps: RsvpRepository,
    event_date: Option<NaiveDate>,
}

impl InsightsService {
    pub fn new(pool: PgPool, event_date: Option<NaiveDate>) -> Self {
        Self {
            guests: GuestRepository::new(pool.clone()),
            rsvps: RsvpRepository::new(pool),
            event_date,
        }
    }

    pub async fn smart_reminders(&self) -> Result<SmartReminders, AppError> {
        let incomplete = self
            .guests
            .incomplete_dietary_parties()
            .await
            .map_err(|e| store_error("count incomplete dietary parties", e))?;
        let unassigned = self
            .guests
            .unassigned_parties()
            .await
            .map_err(|e| store_error("count unassigned parties", e))?;

        let days = self.event_date.map(|date| time::days_until(date, time::today()));
        Ok(smart_reminders(incomplete, unassigned, days))
    }

    pub async fn dietary_insights(&self) -> Result<DietaryInsights, AppError> {
        let rows = self
            .guests
            .dietary_rows()
            .await
            .map_err(|e| store_error("load dietary breakdown", e))?;
        let attending = self
            .guests
            .attending_guest_count()
            .await
            .map_err(|e| store_error("count attending guests", e))?;

        Ok(dietary_insights(rows, attending))
    }

    pub async fn guest_analytics(&self) -> Result<GuestAnalytics, AppError> {
        let trends = self
            .rsvps
            .daily_trends()
            .await
            .map_err(|e| store_error("load rsvp trends", e))?;
        let response_times = self
            .rsvps
            .response_times()
            .await
            .map_err(|e| store_error("load response times", e))?;
        let dietary = self
            .guests
            .dietary_summary()
            .await
            .map_err(|e| store_error("load dietary summary", e))?;
        let party_sizes = self
            .rsvps
            .party_sizes()
            .await
            .map_err(|e| store_error("load party sizes", e))?;

        Ok(guest_analytics(trends, response_times, dietary, party_sizes))
    }

    pub async fn rsvp_prediction(&self) -> Result<RsvpPrediction, AppError> {
        let stats = self.rsvps.stats().await.map_err(|e| store_error("rsvp stats", e))?;
        let trends = self
            .rsvps
            .daily_trends()
            .await
            .map_err(|e| store_error("load rsvp trends", e))?;

        Ok(rsvp_prediction(&stats, trends))
    }
}
