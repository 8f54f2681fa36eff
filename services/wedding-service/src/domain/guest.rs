use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Guest row joined with its party's contact details, as listed to admins.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GuestListing {
    pub id: i32,
    pub rsvp_id: i32,
    pub guest_name: String,
    pub dietary_needs: Option<String>,
    pub table_number: Option<i32>,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
    pub primary_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub attendance: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGuest {
    pub guest_name: String,
    pub dietary_needs: String,
    pub is_primary: bool,
}

/// Splits the free-text companion list on commas, dropping blank entries.
pub fn parse_guest_names(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Expands an RSVP into its individual guests: the primary first, then one
/// per listed companion in the order given.
pub fn fan_out(name: &str, guest_names: &str, dietary: &str) -> Vec<NewGuest> {
    let primary = NewGuest {
        guest_name: name.to_string(),
        dietary_needs: dietary.to_string(),
        is_primary: true,
    };

    std::iter::once(primary)
        .chain(parse_guest_names(guest_names).into_iter().map(|guest_name| NewGuest {
            guest_name,
            dietary_needs: String::new(),
            is_primary: false,
        }))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuestFilterType {
    Primary,
    Additional,
    Dietary,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GuestFilter {
    pub filter_type: Option<GuestFilterType>,
    pub table_number: Option<i32>,
}

#[derive(Debug, Default, Clone, Serialize, FromRow)]
pub struct GuestStats {
    pub total_individuals: i64,
    pub primary_guests: i64,
    pub additional_guests: i64,
    pub dietary_requirements: i64,
    pub assigned_guests: i64,
    pub unassigned_guests: i64,
}

/// Admin edit of a single guest's details.
#[derive(Debug, Clone, Deserialize)]
pub struct GuestDetailsUpdate {
    pub guest_id: i32,
    pub guest_name: String,
    pub dietary_needs: Option<String>,
    pub table_number: Option<i32>,
}
