use anyhow::{Context, Result};
use sqlx::{FromRow, PgPool};

use super::RsvpStore;
use crate::domain::insights::{DailyRsvps, PartySize, ResponseTimes};
use crate::domain::{
    NewGuest, NewRsvp, Rsvp, RsvpFilter, RsvpStats, RsvpSummary, UpsertOutcome,
};
use contracts::PageParams;

const RSVP_COLUMNS: &str = "id, name, email, attendance, guest_count, guest_names, \
    dietary_requirements, phone, table_number, notification_sent, created_at, updated_at";

#[derive(FromRow)]
struct UpsertRow {
    id: i32,
    name: String,
    email: String,
    attendance: String,
    inserted: bool,
}

#[derive(Clone)]
pub struct RsvpRepository {
    pool: PgPool,
}

impl RsvpRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, filter: &RsvpFilter, page: PageParams) -> Result<(Vec<Rsvp>, i64)> {
        let attendance = filter.attendance.as_deref().filter(|a| !a.is_empty() && *a != "all");

        let rows = sqlx::query_as::<_, Rsvp>(&format!(
            r#"
            SELECT {RSVP_COLUMNS}
            FROM rsvps
            WHERE ($1::text IS NULL OR attendance = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(attendance)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;

        let total: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM rsvps WHERE ($1::text IS NULL OR attendance = $1)",
        )
        .bind(attendance)
        .fetch_one(&self.pool)
        .await?;

        Ok((rows, total.0))
    }

    pub async fn stats(&self) -> Result<RsvpStats> {
        let stats = sqlx::query_as::<_, RsvpStats>(
            r#"
            SELECT
                COUNT(*) AS total_responses,
                COUNT(*) FILTER (WHERE attendance = 'yes') AS attending,
                COUNT(*) FILTER (WHERE attendance = 'no') AS not_attending,
                COALESCE(SUM(guest_count) FILTER (WHERE attendance = 'yes'), 0)::bigint AS total_guests
            FROM rsvps
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(stats)
    }

    pub async fn all(&self) -> Result<Vec<Rsvp>> {
        let rows = sqlx::query_as::<_, Rsvp>(&format!(
            "SELECT {RSVP_COLUMNS} FROM rsvps ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Seats a whole party: the RSVP and every one of its guests.
    /// Returns false if the RSVP does not exist.
    pub async fn assign_party(&self, rsvp_id: i32, table_number: Option<i32>) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query("UPDATE rsvps SET table_number = $1, updated_at = NOW() WHERE id = $2")
            .bind(table_number)
            .bind(rsvp_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if updated == 0 {
            return Ok(false);
        }

        sqlx::query("UPDATE individual_guests SET table_number = $1 WHERE rsvp_id = $2")
            .bind(table_number)
            .bind(rsvp_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    pub async fn daily_trends(&self) -> Result<Vec<DailyRsvps>> {
        let rows = sqlx::query_as::<_, DailyRsvps>(
            r#"
            SELECT
                DATE(created_at) AS date,
                COUNT(*) AS rsvps,
                COUNT(*) FILTER (WHERE attendance = 'yes') AS attending,
                COUNT(*) FILTER (WHERE attendance = 'no') AS declined
            FROM rsvps
            GROUP BY DATE(created_at)
            ORDER BY date
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn response_times(&self) -> Result<ResponseTimes> {
        let times = sqlx::query_as::<_, ResponseTimes>(
            r#"
            SELECT
                AVG(EXTRACT(EPOCH FROM (updated_at - created_at)) / 86400)::float8 AS avg_response_days,
                MIN(EXTRACT(EPOCH FROM (updated_at - created_at)) / 86400)::float8 AS fastest_response,
                MAX(EXTRACT(EPOCH FROM (updated_at - created_at)) / 86400)::float8 AS slowest_response
            FROM rsvps
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(times)
    }

    /// Attending RSVPs grouped by `guest_count`.
    pub async fn party_sizes(&self) -> Result<Vec<PartySize>> {
        let rows = sqlx::query_as::<_, PartySize>(
            r#"
            SELECT guest_count, COUNT(*) AS rsvp_count, SUM(guest_count)::bigint AS total_guests
            FROM rsvps
            WHERE attendance = 'yes'
            GROUP BY guest_count
            ORDER BY guest_count
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

impl RsvpStore for RsvpRepository {
    async fn upsert_rsvp(&self, rsvp: &NewRsvp, guests: &[NewGuest]) -> Result<UpsertOutcome> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, UpsertRow>(
            r#"
            INSERT INTO rsvps (name, email, attendance, guest_count, guest_names, dietary_requirements, phone)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (email) DO UPDATE SET
                name = EXCLUDED.name,
                attendance = EXCLUDED.attendance,
                guest_count = EXCLUDED.guest_count,
                guest_names = EXCLUDED.guest_names,
                dietary_requirements = EXCLUDED.dietary_requirements,
                phone = EXCLUDED.phone,
                updated_at = NOW()
            RETURNING id, name, email, attendance, (xmax = 0) AS inserted
            "#,
        )
        .bind(&rsvp.name)
        .bind(&rsvp.email)
        .bind(rsvp.attendance.as_str())
        .bind(rsvp.guest_count)
        .bind(&rsvp.guest_names)
        .bind(&rsvp.dietary)
        .bind(&rsvp.phone)
        .fetch_one(&mut *tx)
        .await
        .context("upsert rsvp")?;

        sqlx::query("DELETE FROM individual_guests WHERE rsvp_id = $1")
            .bind(row.id)
            .execute(&mut *tx)
            .await
            .context("clear guests")?;

        for guest in guests {
            sqlx::query(
                r#"
                INSERT INTO individual_guests (rsvp_id, guest_name, dietary_needs, is_primary)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(row.id)
            .bind(&guest.guest_name)
            .bind(&guest.dietary_needs)
            .bind(guest.is_primary)
            .execute(&mut *tx)
            .await
            .context("insert guest")?;
        }

        tx.commit().await?;

        Ok(UpsertOutcome {
            rsvp: RsvpSummary {
                id: row.id,
                name: row.name,
                email: row.email,
                attendance: row.attendance,
            },
            created: row.inserted,
        })
    }

    async fn delete_rsvps(&self, ids: &[i32]) -> Result<u64> {
        // Guests and notifications go with the RSVP via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM rsvps WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
