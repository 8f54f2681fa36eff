use anyhow::Result;
use sqlx::PgPool;

use super::NotificationStore;
use crate::domain::{DeliveryStatus, Notification, NotificationStats, NotificationTypeCount, Recipient};
use contracts::PageParams;

const NOTIFICATION_SELECT: &str = r#"
    SELECT n.id, n.rsvp_id, n.email, n.subject, n.message, n.notification_type, n.status,
           n.sent_at, n.created_at, r.name AS recipient_name
    FROM notifications n
    LEFT JOIN rsvps r ON r.id = n.rsvp_id
"#;

#[derive(Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, page: PageParams) -> Result<(Vec<Notification>, i64)> {
        let sql = format!("{NOTIFICATION_SELECT} ORDER BY n.created_at DESC LIMIT $1 OFFSET $2");
        let rows = sqlx::query_as::<_, Notification>(&sql)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await?;

        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM notifications")
            .fetch_one(&self.pool)
            .await?;

        Ok((rows, total.0))
    }

    pub async fn all(&self) -> Result<Vec<Notification>> {
        let sql = format!("{NOTIFICATION_SELECT} ORDER BY n.created_at DESC");
        let rows = sqlx::query_as::<_, Notification>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    pub async fn stats(&self) -> Result<NotificationStats> {
        let totals: (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COUNT(*) FILTER (WHERE status = 'sent'),
                COUNT(*) FILTER (WHERE status = 'failed')
            FROM notifications
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let type_breakdown = sqlx::query_as::<_, NotificationTypeCount>(
            r#"
            SELECT notification_type, COUNT(*) AS count
            FROM notifications
            GROUP BY notification_type
            ORDER BY count DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(NotificationStats {
            total_notifications: totals.0,
            total_sent: totals.1,
            total_failed: totals.2,
            type_breakdown,
        })
    }
}

impl NotificationStore for NotificationRepository {
    async fn attending_recipients(&self, ids: &[i32]) -> Result<Vec<Recipient>> {
        let recipients = sqlx::query_as::<_, Recipient>(
            "SELECT id, name, email FROM rsvps WHERE id = ANY($1) AND attendance = 'yes' ORDER BY id",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(recipients)
    }

    async fn create_notification(
        &self,
        recipient: &Recipient,
        subject: &str,
        message: &str,
        notification_type: &str,
    ) -> Result<i32> {
        let id: (i32,) = sqlx::query_as(
            r#"
            INSERT INTO notifications (rsvp_id, email, subject, message, notification_type, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(recipient.id)
        .bind(&recipient.email)
        .bind(subject)
        .bind(message)
        .bind(notification_type)
        .bind(DeliveryStatus::Sending.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(id.0)
    }

    async fn set_notification_status(&self, id: i32, status: DeliveryStatus) -> Result<()> {
        sqlx::query("UPDATE notifications SET status = $1, sent_at = NOW() WHERE id = $2")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn mark_notified(&self, rsvp_id: i32) -> Result<()> {
        sqlx::query("UPDATE rsvps SET notification_sent = TRUE WHERE id = $1")
            .bind(rsvp_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
