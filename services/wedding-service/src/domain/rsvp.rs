use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attendance {
    Yes,
    No,
}

impl Attendance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Attendance::Yes => "yes",
            Attendance::No => "no",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "yes" => Some(Attendance::Yes),
            "no" => Some(Attendance::No),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Rsvp {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub attendance: String,
    pub guest_count: i32,
    pub guest_names: Option<String>,
    pub dietary_requirements: Option<String>,
    pub phone: Option<String>,
    pub table_number: Option<i32>,
    pub notification_sent: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// RSVP form as submitted. Everything is optional here so that missing
/// fields surface as a validation message rather than a JSON error.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct RsvpRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub attendance: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub guest_count: Option<i64>,
    pub guest_names: Option<String>,
    pub dietary: Option<String>,
    pub phone: Option<String>,
}

/// Validated RSVP ready for the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRsvp {
    pub name: String,
    pub email: String,
    pub attendance: Attendance,
    pub guest_count: i32,
    pub guest_names: String,
    pub dietary: String,
    pub phone: String,
}

#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
pub struct RsvpSummary {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub attendance: String,
}

#[derive(Debug, Clone)]
pub struct UpsertOutcome {
    pub rsvp: RsvpSummary,
    pub created: bool,
}

#[derive(Debug, Serialize)]
pub struct RsvpSubmitted {
    pub success: bool,
    pub message: &'static str,
    pub data: RsvpSummary,
    pub updated: bool,
}

impl From<UpsertOutcome> for RsvpSubmitted {
    fn from(outcome: UpsertOutcome) -> Self {
        let message = if outcome.created {
            "RSVP submitted successfully!"
        } else {
            "RSVP updated successfully!"
        };
        Self {
            success: true,
            message,
            data: outcome.rsvp,
            updated: !outcome.created,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RsvpFilter {
    pub attendance: Option<String>,
}

#[derive(Debug, Default, Clone, Serialize, FromRow)]
pub struct RsvpStats {
    pub total_responses: i64,
    pub attending: i64,
    pub not_attending: i64,
    pub total_guests: i64,
}

/// Attending RSVP selected to receive a notification.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Recipient {
    pub id: i32,
    pub name: String,
    pub email: String,
}

// Form posts send counts as numbers or numeric strings.
fn lenient_count<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Number(i64),
        Text(String),
    }

    match Option::<Count>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Count::Number(n)) => Ok(Some(n)),
        Some(Count::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Count::Text(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom("guest_count must be a number")),
    }
}
