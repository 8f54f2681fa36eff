use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::validation::{is_valid_email, normalize_email, optional_text, required, ValidationError, INVALID_EMAIL};

pub const DEFAULT_MESSAGE_TYPE: &str = "blessing";

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Wish {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub message: String,
    pub message_type: String,
    pub relationship: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct WishSubmission {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
    pub message_type: Option<String>,
    pub relationship: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewWish {
    pub name: String,
    pub email: String,
    pub message: String,
    pub message_type: String,
    pub relationship: String,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WishCreated {
    pub id: i32,
    pub name: String,
    pub message_type: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WishFilter {
    pub message_type: Option<String>,
}

impl WishFilter {
    pub fn message_type(&self) -> Option<&str> {
        self.message_type
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty() && *t != "all")
    }
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MessageTypeCount {
    pub message_type: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct WishStats {
    pub total_wishes: i64,
    pub type_breakdown: Vec<MessageTypeCount>,
}

impl WishSubmission {
    pub fn validate(&self) -> Result<NewWish, ValidationError> {
        let (Some(name), Some(email), Some(message)) = (
            required(&self.name),
            required(&self.email),
            required(&self.message),
        ) else {
            return Err(ValidationError::new(
                "Missing required fields: name, email, and message are required",
            ));
        };

        let email = normalize_email(email);
        if !is_valid_email(&email) {
            return Err(ValidationError::new(INVALID_EMAIL));
        }

        Ok(NewWish {
            name: name.to_string(),
            email,
            message: message.to_string(),
            message_type: required(&self.message_type)
                .unwrap_or(DEFAULT_MESSAGE_TYPE)
                .to_string(),
            relationship: optional_text(&self.relationship),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_is_required() {
        let submission = WishSubmission {
            name: Some("Ada".into()),
            email: Some("ada@example.com".into()),
            message: Some("   ".into()),
            ..WishSubmission::default()
        };
        assert!(submission.validate().is_err());
    }

    #[test]
    fn message_type_defaults_to_blessing() {
        let submission = WishSubmission {
            name: Some("Ada".into()),
            email: Some("ada@example.com".into()),
            message: Some("Congratulations!".into()),
            ..WishSubmission::default()
        };
        assert_eq!(submission.validate().unwrap().message_type, DEFAULT_MESSAGE_TYPE);
    }
}
