use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::rsvp::Recipient;

pub const DEFAULT_NOTIFICATION_TYPE: &str = "general";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStatus {
    Sending,
    Sent,
    Failed,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Sending => "sending",
            DeliveryStatus::Sent => "sent",
            DeliveryStatus::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: i32,
    pub rsvp_id: Option<i32>,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub notification_type: String,
    pub status: String,
    pub sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub recipient_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationRequest {
    #[serde(default)]
    pub recipient_ids: Vec<i32>,
    pub subject: Option<String>,
    pub message: Option<String>,
    pub notification_type: Option<String>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NotificationTypeCount {
    pub notification_type: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct NotificationStats {
    pub total_notifications: i64,
    pub total_sent: i64,
    pub total_failed: i64,
    pub type_breakdown: Vec<NotificationTypeCount>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NotificationReport {
    pub success: bool,
    pub message: String,
    pub sent_count: usize,
    pub total_recipients: usize,
    pub recipients: Vec<Recipient>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl NotificationReport {
    pub fn new(recipients: Vec<Recipient>, sent_count: usize, errors: Vec<String>) -> Self {
        let total = recipients.len();
        let message = if sent_count == total {
            format!("All {sent_count} emails sent successfully")
        } else {
            format!("{sent_count} of {total} emails sent successfully")
        };
        Self {
            success: sent_count > 0,
            message,
            sent_count,
            total_recipients: total,
            recipients,
            errors,
        }
    }
}
