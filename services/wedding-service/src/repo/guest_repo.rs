use anyhow::Result;
use sqlx::PgPool;

use super::SeatingStore;
use crate::domain::insights::{DietaryCount, DietaryRow};
use crate::domain::{
    ChartRow, GuestDetailsUpdate, GuestFilter, GuestFilterType, GuestListing, GuestStats,
    SeatingCandidate, TableAssignment,
};
use contracts::PageParams;

const LISTING_SELECT: &str = r#"
    SELECT ig.id, ig.rsvp_id, ig.guest_name, ig.dietary_needs, ig.table_number, ig.is_primary,
           ig.created_at, r.name AS primary_name, r.email, r.phone, r.attendance
    FROM individual_guests ig
    JOIN rsvps r ON r.id = ig.rsvp_id
"#;

fn filter_clause(filter: &GuestFilter) -> &'static str {
    match (filter.filter_type, filter.table_number) {
        (Some(GuestFilterType::Primary), _) => "WHERE ig.is_primary",
        (Some(GuestFilterType::Additional), _) => "WHERE NOT ig.is_primary",
        (Some(GuestFilterType::Dietary), _) => {
            "WHERE ig.dietary_needs IS NOT NULL AND ig.dietary_needs <> ''"
        }
        (None, Some(_)) => "WHERE ig.table_number = $3",
        (None, None) => "",
    }
}

#[derive(Clone)]
pub struct GuestRepository {
    pool: PgPool,
}

impl GuestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, filter: &GuestFilter, page: PageParams) -> Result<(Vec<GuestListing>, i64)> {
        let clause = filter_clause(filter);
        let table = filter.table_number.filter(|_| filter.filter_type.is_none());

        let sql = format!("{LISTING_SELECT} {clause} ORDER BY ig.guest_name, ig.id LIMIT $1 OFFSET $2");
        let mut query = sqlx::query_as::<_, GuestListing>(&sql)
            .bind(page.limit)
            .bind(page.offset);
        if let Some(table) = table {
            query = query.bind(table);
        }
        let rows = query.fetch_all(&self.pool).await?;

        // Count query numbers its only parameter $3 to share the clause text.
        let count_sql = format!(
            "SELECT COUNT(*) FROM individual_guests ig JOIN rsvps r ON r.id = ig.rsvp_id {}",
            clause.replace("$3", "$1")
        );
        let mut count = sqlx::query_as::<_, (i64,)>(&count_sql);
        if let Some(table) = table {
            count = count.bind(table);
        }
        let total = count.fetch_one(&self.pool).await?;

        Ok((rows, total.0))
    }

    pub async fn stats(&self) -> Result<GuestStats> {
        let stats = sqlx::query_as::<_, GuestStats>(
            r#"
            SELECT
                COUNT(*) AS total_individuals,
                COUNT(*) FILTER (WHERE is_primary) AS primary_guests,
                COUNT(*) FILTER (WHERE NOT is_primary) AS additional_guests,
                COUNT(*) FILTER (WHERE dietary_needs IS NOT NULL AND dietary_needs <> '') AS dietary_requirements,
                COUNT(*) FILTER (WHERE table_number IS NOT NULL) AS assigned_guests,
                COUNT(*) FILTER (WHERE table_number IS NULL) AS unassigned_guests
            FROM individual_guests
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(stats)
    }

    pub async fn all(&self) -> Result<Vec<GuestListing>> {
        let rows = sqlx::query_as::<_, GuestListing>(&format!(
            "{LISTING_SELECT} ORDER BY ig.table_number NULLS LAST, r.id, ig.is_primary DESC, ig.id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Seats (or unseats) one guest. A primary guest's table is mirrored onto
    /// the RSVP. Returns false when the guest does not exist.
    pub async fn assign_guest(&self, guest_id: i32, table_number: Option<i32>) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let guest: Option<(i32, bool)> = sqlx::query_as(
            "UPDATE individual_guests SET table_number = $1 WHERE id = $2 RETURNING rsvp_id, is_primary",
        )
        .bind(table_number)
        .bind(guest_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((rsvp_id, is_primary)) = guest else {
            return Ok(false);
        };

        if is_primary {
            sqlx::query("UPDATE rsvps SET table_number = $1, updated_at = NOW() WHERE id = $2")
                .bind(table_number)
                .bind(rsvp_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(true)
    }

    pub async fn update_details(&self, update: &GuestDetailsUpdate) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE individual_guests
            SET guest_name = $1,
                dietary_needs = COALESCE($2, dietary_needs),
                table_number = COALESCE($3, table_number)
            WHERE id = $4
            "#,
        )
        .bind(update.guest_name.trim())
        .bind(update.dietary_needs.as_deref())
        .bind(update.table_number)
        .bind(update.guest_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Attending guests with their effective table, falling back to the
    /// party's table when the guest has none of their own.
    pub async fn chart_rows(&self) -> Result<Vec<ChartRow>> {
        let rows = sqlx::query_as::<_, ChartRow>(
            r#"
            SELECT
                r.id AS rsvp_id,
                r.email,
                ig.id AS guest_id,
                COALESCE(ig.guest_name, r.name) AS guest_name,
                ig.dietary_needs,
                COALESCE(ig.is_primary, TRUE) AS is_primary,
                COALESCE(ig.table_number, r.table_number) AS assigned_table
            FROM rsvps r
            LEFT JOIN individual_guests ig ON ig.rsvp_id = r.id
            WHERE r.attendance = 'yes'
            ORDER BY assigned_table NULLS LAST, r.name, ig.is_primary DESC, ig.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Attending parties with no dietary text on the RSVP or any guest.
    pub async fn incomplete_dietary_parties(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM rsvps r
            WHERE r.attendance = 'yes'
              AND COALESCE(r.dietary_requirements, '') = ''
              AND NOT EXISTS (
                  SELECT 1 FROM individual_guests ig
                  WHERE ig.rsvp_id = r.id AND COALESCE(ig.dietary_needs, '') <> ''
              )
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }

    /// Attending parties with at least one unseated member.
    pub async fn unassigned_parties(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(DISTINCT r.id) FROM rsvps r
            JOIN individual_guests ig ON ig.rsvp_id = r.id
            WHERE r.attendance = 'yes'
              AND COALESCE(ig.table_number, r.table_number) IS NULL
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }

    pub async fn attending_guest_count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM individual_guests ig
            JOIN rsvps r ON r.id = ig.rsvp_id
            WHERE r.attendance = 'yes'
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }

    pub async fn dietary_rows(&self) -> Result<Vec<DietaryRow>> {
        let rows = sqlx::query_as::<_, DietaryRow>(
            r#"
            SELECT ig.dietary_needs AS dietary_needs,
                   COALESCE(ig.table_number, r.table_number) AS table_number,
                   COUNT(*) AS count
            FROM individual_guests ig
            JOIN rsvps r ON r.id = ig.rsvp_id
            WHERE r.attendance = 'yes'
              AND ig.dietary_needs IS NOT NULL AND ig.dietary_needs <> ''
            GROUP BY 1, 2
            ORDER BY count DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Every guest's dietary need, across all RSVPs.
    pub async fn dietary_summary(&self) -> Result<Vec<DietaryCount>> {
        let rows = sqlx::query_as::<_, DietaryCount>(
            r#"
            SELECT dietary_needs, COUNT(*) AS count
            FROM individual_guests
            WHERE dietary_needs IS NOT NULL AND dietary_needs <> ''
            GROUP BY dietary_needs
            ORDER BY count DESC, dietary_needs
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

impl SeatingStore for GuestRepository {
    async fn seating_candidates(&self) -> Result<Vec<SeatingCandidate>> {
        let rows = sqlx::query_as::<_, SeatingCandidate>(
            r#"
            SELECT ig.rsvp_id, ig.id AS guest_id, ig.table_number
            FROM individual_guests ig
            JOIN rsvps r ON r.id = ig.rsvp_id
            WHERE r.attendance = 'yes'
            ORDER BY ig.rsvp_id, ig.is_primary DESC, ig.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn highest_table_number(&self) -> Result<Option<i32>> {
        let max: (Option<i32>,) = sqlx::query_as("SELECT MAX(table_number) FROM individual_guests")
            .fetch_one(&self.pool)
            .await?;

        Ok(max.0)
    }

    async fn apply_assignments(&self, assignments: &[TableAssignment]) -> Result<Vec<TableAssignment>> {
        let mut tx = self.pool.begin().await?;
        let mut applied = Vec::with_capacity(assignments.len());

        for assignment in assignments {
            let result = sqlx::query(
                "UPDATE individual_guests SET table_number = $1 WHERE id = $2 AND table_number IS NULL",
            )
            .bind(assignment.table_number)
            .bind(assignment.guest_id)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 1 {
                applied.push(*assignment);
            }
        }

        tx.commit().await?;
        Ok(applied)
    }
}
