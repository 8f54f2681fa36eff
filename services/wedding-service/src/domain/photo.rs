use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::validation::{
    is_valid_email, is_valid_photo_url, normalize_email, optional_text, required, ValidationError,
    INVALID_EMAIL, INVALID_PHOTO_URL,
};

pub const DEFAULT_CATEGORY: &str = "other";

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PhotoShare {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub photo_url: String,
    pub description: Option<String>,
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Gallery entry shown publicly; the submitter's email is withheld.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GalleryPhoto {
    pub id: i32,
    pub name: String,
    pub photo_url: String,
    pub description: Option<String>,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct PhotoSubmission {
    pub name: Option<String>,
    pub email: Option<String>,
    pub photo_url: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPhoto {
    pub name: String,
    pub email: String,
    pub photo_url: String,
    pub description: String,
    pub category: String,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PhotoCreated {
    pub id: i32,
    pub name: String,
    pub photo_url: String,
    pub category: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PhotoFilter {
    pub category: Option<String>,
}

impl PhotoFilter {
    /// `all` and blank mean no filter.
    pub fn category(&self) -> Option<&str> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty() && *c != "all")
    }
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PhotoStats {
    pub total_photos: i64,
    pub category_breakdown: Vec<CategoryCount>,
}

impl PhotoSubmission {
    pub fn validate(&self) -> Result<NewPhoto, ValidationError> {
        let (Some(name), Some(email), Some(photo_url)) = (
            required(&self.name),
            required(&self.email),
            required(&self.photo_url),
        ) else {
            return Err(ValidationError::new(
                "Missing required fields: name, email, and photo_url are required",
            ));
        };

        let email = normalize_email(email);
        if !is_valid_email(&email) {
            return Err(ValidationError::new(INVALID_EMAIL));
        }
        if !is_valid_photo_url(photo_url) {
            return Err(ValidationError::new(INVALID_PHOTO_URL));
        }

        let category = required(&self.category).unwrap_or(DEFAULT_CATEGORY);

        Ok(NewPhoto {
            name: name.to_string(),
            email,
            photo_url: photo_url.to_string(),
            description: optional_text(&self.description),
            category: category.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(url: &str) -> PhotoSubmission {
        PhotoSubmission {
            name: Some("Grace".into()),
            email: Some("grace@example.com".into()),
            photo_url: Some(url.into()),
            ..PhotoSubmission::default()
        }
    }

    #[test]
    fn category_defaults_to_other() {
        let photo = submission("https://photos.example.com/1.jpg").validate().unwrap();
        assert_eq!(photo.category, DEFAULT_CATEGORY);
    }

    #[test]
    fn bad_url_is_rejected() {
        let err = submission("javascript:alert(1)").validate().unwrap_err();
        assert_eq!(err.0, INVALID_PHOTO_URL);
    }

    #[test]
    fn all_category_is_no_filter() {
        let filter = PhotoFilter {
            category: Some("all".into()),
        };
        assert_eq!(filter.category(), None);

        let filter = PhotoFilter {
            category: Some("ceremony".into()),
        };
        assert_eq!(filter.category(), Some("ceremony"));
    }
}
