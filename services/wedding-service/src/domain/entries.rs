//! Bulk admin edits and deletions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::validation::ValidationError;
use super::{GuestDetailsUpdate, PartyAssignment};

pub const MISSING_UPDATE_FIELDS: &str = "Missing required fields: type and updates array are required";
pub const MISSING_DELETE_FIELDS: &str = "Missing required fields: type and ids array are required";

#[derive(Debug, Deserialize)]
pub struct EntriesUpdateRequest {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub updates: Vec<Value>,
}

#[derive(Debug)]
pub enum EntriesUpdate {
    TableAssignment(Vec<PartyAssignment>),
    GuestDetails(Vec<GuestDetailsUpdate>),
}

impl EntriesUpdate {
    pub fn count(&self) -> usize {
        match self {
            EntriesUpdate::TableAssignment(updates) => updates.len(),
            EntriesUpdate::GuestDetails(updates) => updates.len(),
        }
    }
}

impl EntriesUpdateRequest {
    pub fn parse(self) -> Result<EntriesUpdate, ValidationError> {
        let kind = self.kind.as_deref().map(str::trim).unwrap_or_default();
        if kind.is_empty() || self.updates.is_empty() {
            return Err(ValidationError::new(MISSING_UPDATE_FIELDS));
        }

        let updates = Value::Array(self.updates);
        let parsed = match kind {
            "table_assignment" => serde_json::from_value(updates).map(EntriesUpdate::TableAssignment),
            "guest_details" => serde_json::from_value(updates).map(EntriesUpdate::GuestDetails),
            _ => return Err(ValidationError::new("Invalid update type")),
        };

        parsed.map_err(|e| ValidationError::new(format!("Invalid {kind} update: {e}")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Rsvps,
    Songs,
    Photos,
    Wishes,
}

impl EntryKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "rsvps" => Some(EntryKind::Rsvps),
            "songs" => Some(EntryKind::Songs),
            "photos" => Some(EntryKind::Photos),
            "wishes" => Some(EntryKind::Wishes),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Rsvps => "rsvps",
            EntryKind::Songs => "songs",
            EntryKind::Photos => "photos",
            EntryKind::Wishes => "wishes",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct EntriesDeleteRequest {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub ids: Vec<i32>,
}

impl EntriesDeleteRequest {
    pub fn parse(&self) -> Result<EntryKind, ValidationError> {
        let kind = self.kind.as_deref().unwrap_or_default();
        if kind.trim().is_empty() || self.ids.is_empty() {
            return Err(ValidationError::new(MISSING_DELETE_FIELDS));
        }
        EntryKind::parse(kind).ok_or_else(|| ValidationError::new("Invalid type specified"))
    }
}

#[derive(Debug, Serialize)]
pub struct EntriesUpdated {
    pub success: bool,
    pub message: String,
    pub updated_count: usize,
}

impl EntriesUpdated {
    pub fn new(updated_count: usize) -> Self {
        Self {
            success: true,
            message: format!("Successfully updated {updated_count} entries"),
            updated_count,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EntriesDeleted {
    pub success: bool,
    pub message: String,
    pub deleted_count: u64,
}

impl EntriesDeleted {
    pub fn new(kind: EntryKind, deleted_count: u64) -> Self {
        Self {
            success: true,
            message: format!("Successfully deleted {deleted_count} {} entries", kind.as_str()),
            deleted_count,
        }
    }
}
