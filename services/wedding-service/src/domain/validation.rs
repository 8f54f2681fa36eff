use std::sync::LazyLock;

use regex::Regex;

use super::guest::{fan_out, NewGuest};
use super::rsvp::{Attendance, NewRsvp, RsvpRequest};

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern")
});

static PHOTO_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://[^\s/$.?#][^\s/]*\.[^\s]+$").expect("valid url pattern")
});

pub const MISSING_RSVP_FIELDS: &str =
    "Missing required fields: name, email, and attendance are required";
pub const INVALID_EMAIL: &str = "Invalid email format";
pub const INVALID_PHOTO_URL: &str = "Please provide a valid URL starting with http:// or https://";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

pub fn is_valid_photo_url(url: &str) -> bool {
    PHOTO_URL.is_match(url)
}

/// Trimmed and lower-cased so one party maps to one row.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Returns the trimmed value when present and non-blank.
pub fn required(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

pub fn optional_text(value: &Option<String>) -> String {
    value.as_deref().map(str::trim).unwrap_or_default().to_string()
}

/// Validates an RSVP submission and expands it into its guests.
pub fn validate_rsvp(request: &RsvpRequest) -> Result<(NewRsvp, Vec<NewGuest>), ValidationError> {
    let (Some(name), Some(email), Some(attendance)) = (
        required(&request.name),
        required(&request.email),
        required(&request.attendance),
    ) else {
        return Err(ValidationError::new(MISSING_RSVP_FIELDS));
    };

    let email = normalize_email(email);
    if !is_valid_email(&email) {
        return Err(ValidationError::new(INVALID_EMAIL));
    }

    let attendance = Attendance::parse(attendance)
        .ok_or_else(|| ValidationError::new("Attendance must be 'yes' or 'no'"))?;

    let guest_count = match request.guest_count {
        None | Some(0) => 1,
        Some(n) if n < 0 => {
            return Err(ValidationError::new("Guest count cannot be negative"));
        }
        Some(n) => i32::try_from(n).map_err(|_| ValidationError::new("Guest count is too large"))?,
    };

    let rsvp = NewRsvp {
        name: name.to_string(),
        email,
        attendance,
        guest_count,
        guest_names: optional_text(&request.guest_names),
        dietary: optional_text(&request.dietary),
        phone: optional_text(&request.phone),
    };
    let guests = fan_out(&rsvp.name, &rsvp.guest_names, &rsvp.dietary);

    Ok((rsvp, guests))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, email: &str, attendance: &str) -> RsvpRequest {
        RsvpRequest {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            attendance: Some(attendance.to_string()),
            ..RsvpRequest::default()
        }
    }

    #[test]
    fn email_pattern() {
        assert!(is_valid_email("ada@example.com"));
        assert!(!is_valid_email("ada@example"));
        assert!(!is_valid_email("ada example@x.com"));
        assert!(!is_valid_email("@x.com"));
    }

    #[test]
    fn photo_urls_need_scheme_and_host() {
        assert!(is_valid_photo_url("https://photos.example.com/album/1"));
        assert!(is_valid_photo_url("http://cdn.example.org/a.jpg"));
        assert!(!is_valid_photo_url("ftp://example.com/a.jpg"));
        assert!(!is_valid_photo_url("https://localhost"));
        assert!(!is_valid_photo_url("example.com/a.jpg"));
    }

    #[test]
    fn missing_fields_are_reported_together() {
        let err = validate_rsvp(&request("", "ada@example.com", "yes")).unwrap_err();
        assert_eq!(err.0, MISSING_RSVP_FIELDS);

        let err = validate_rsvp(&RsvpRequest::default()).unwrap_err();
        assert_eq!(err.0, MISSING_RSVP_FIELDS);
    }

    #[test]
    fn invalid_email_is_rejected() {
        let err = validate_rsvp(&request("Ada", "not-an-email", "yes")).unwrap_err();
        assert_eq!(err.0, INVALID_EMAIL);
    }

    #[test]
    fn attendance_must_be_yes_or_no() {
        assert!(validate_rsvp(&request("Ada", "ada@example.com", "maybe")).is_err());
    }

    #[test]
    fn email_is_normalized() {
        let (rsvp, _) = validate_rsvp(&request("Ada", "  Ada@Example.COM ", "yes")).unwrap();
        assert_eq!(rsvp.email, "ada@example.com");
    }

    #[test]
    fn zero_or_absent_guest_count_means_one() {
        let (rsvp, _) = validate_rsvp(&request("Ada", "ada@example.com", "yes")).unwrap();
        assert_eq!(rsvp.guest_count, 1);

        let mut zero = request("Ada", "ada@example.com", "yes");
        zero.guest_count = Some(0);
        assert_eq!(validate_rsvp(&zero).unwrap().0.guest_count, 1);

        let mut negative = request("Ada", "ada@example.com", "yes");
        negative.guest_count = Some(-2);
        assert!(validate_rsvp(&negative).is_err());
    }

    #[test]
    fn fan_out_is_derived_from_request() {
        let mut req = request("Alan", "alan@example.com", "yes");
        req.guest_names = Some("Ada Lovelace, , Grace Hopper,  ".to_string());
        req.dietary = Some("vegan".to_string());

        let (_, guests) = validate_rsvp(&req).unwrap();
        let names: Vec<_> = guests.iter().map(|g| g.guest_name.as_str()).collect();
        assert_eq!(names, ["Alan", "Ada Lovelace", "Grace Hopper"]);
        assert_eq!(guests[0].dietary_needs, "vegan");
    }
}
