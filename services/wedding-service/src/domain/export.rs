//! CSV export of the admin data sets.

use std::borrow::Cow;

use chrono::{DateTime, NaiveDate, Utc};

use super::guest::GuestListing;
use super::notification::Notification;
use super::photo::PhotoShare;
use super::rsvp::Rsvp;
use super::seating::SeatingChart;
use super::song::SongRequest;
use super::wish::Wish;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Guests,
    Tables,
    Rsvps,
    Songs,
    Photos,
    Wishes,
    Notifications,
    All,
}

impl ExportKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "guests" => Some(Self::Guests),
            "tables" => Some(Self::Tables),
            "rsvps" => Some(Self::Rsvps),
            "songs" => Some(Self::Songs),
            "photos" => Some(Self::Photos),
            "wishes" => Some(Self::Wishes),
            "notifications" => Some(Self::Notifications),
            "all" => Some(Self::All),
            _ => None,
        }
    }

    /// Concrete sections to emit, in file order.
    pub fn sections(self) -> Vec<ExportKind> {
        match self {
            Self::All => vec![Self::Rsvps, Self::Songs, Self::Photos, Self::Wishes],
            other => vec![other],
        }
    }
}

pub fn filename(date: NaiveDate) -> String {
    format!("wedding-data-{}.csv", date.format("%Y-%m-%d"))
}

/// Quotes a field when it contains a delimiter, quote or line break.
pub fn escape_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

pub trait CsvRecord {
    const TITLE: &'static str;
    const HEADERS: &'static [&'static str];

    fn fields(&self) -> Vec<String>;
}

#[derive(Debug, Clone)]
pub struct CsvSection {
    title: String,
    headers: Vec<&'static str>,
    rows: Vec<Vec<String>>,
}

impl CsvSection {
    pub fn from_records<T: CsvRecord>(records: &[T]) -> Self {
        Self {
            title: T::TITLE.to_string(),
            headers: T::HEADERS.to_vec(),
            rows: records.iter().map(CsvRecord::fields).collect(),
        }
    }

    pub fn seating(chart: &SeatingChart) -> Self {
        let seated = chart.tables.iter().flat_map(|table| {
            table
                .guests
                .iter()
                .map(move |g| (table.table_number.to_string(), g))
        });
        let unassigned = chart
            .unassigned_guests
            .iter()
            .map(|g| ("Unassigned".to_string(), g));

        let rows = seated
            .chain(unassigned)
            .map(|(table, guest)| {
                vec![
                    table,
                    guest.name.clone(),
                    yes_no(guest.is_primary),
                    guest.email.clone().unwrap_or_default(),
                    guest.dietary_needs.clone().unwrap_or_default(),
                ]
            })
            .collect();

        Self {
            title: "TABLE ASSIGNMENTS".to_string(),
            headers: vec!["Table", "Guest Name", "Primary Guest", "Email", "Dietary Needs"],
            rows,
        }
    }

    fn write_to(&self, out: &mut String) {
        out.push_str(&self.title);
        out.push('\n');
        out.push_str(&self.headers.join(","));
        out.push('\n');
        for row in &self.rows {
            let line: Vec<Cow<'_, str>> = row.iter().map(|f| escape_field(f)).collect();
            out.push_str(&line.join(","));
            out.push('\n');
        }
        out.push('\n');
    }
}

pub fn render(sections: &[CsvSection]) -> String {
    let mut out = String::new();
    for section in sections {
        section.write_to(&mut out);
    }
    out
}

fn yes_no(flag: bool) -> String {
    if flag { "Yes" } else { "No" }.to_string()
}

fn opt(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn stamp(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

impl CsvRecord for Rsvp {
    const TITLE: &'static str = "RSVPS";
    const HEADERS: &'static [&'static str] = &[
        "ID",
        "Name",
        "Email",
        "Attendance",
        "Guest Count",
        "Guest Names",
        "Dietary Requirements",
        "Phone",
        "Table Number",
        "Notification Sent",
        "Submitted",
    ];

    fn fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.email.clone(),
            self.attendance.clone(),
            self.guest_count.to_string(),
            opt(&self.guest_names),
            opt(&self.dietary_requirements),
            opt(&self.phone),
            self.table_number.map(|n| n.to_string()).unwrap_or_default(),
            yes_no(self.notification_sent),
            stamp(&self.created_at),
        ]
    }
}

impl CsvRecord for GuestListing {
    const TITLE: &'static str = "GUESTS";
    const HEADERS: &'static [&'static str] = &[
        "Guest ID",
        "Guest Name",
        "Primary Guest",
        "Party Contact",
        "Email",
        "Phone",
        "Attendance",
        "Dietary Needs",
        "Table Number",
    ];

    fn fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.guest_name.clone(),
            yes_no(self.is_primary),
            self.primary_name.clone(),
            self.email.clone(),
            opt(&self.phone),
            self.attendance.clone(),
            opt(&self.dietary_needs),
            self.table_number.map(|n| n.to_string()).unwrap_or_default(),
        ]
    }
}

impl CsvRecord for SongRequest {
    const TITLE: &'static str = "SONG REQUESTS";
    const HEADERS: &'static [&'static str] =
        &["ID", "Name", "Email", "Song Title", "Artist", "Genre", "Reason", "Submitted"];

    fn fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.email.clone(),
            self.song_title.clone(),
            self.artist_name.clone(),
            opt(&self.genre),
            opt(&self.reason),
            stamp(&self.created_at),
        ]
    }
}

impl CsvRecord for PhotoShare {
    const TITLE: &'static str = "PHOTO SHARES";
    const HEADERS: &'static [&'static str] =
        &["ID", "Name", "Email", "Photo URL", "Description", "Category", "Submitted"];

    fn fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.email.clone(),
            self.photo_url.clone(),
            opt(&self.description),
            self.category.clone(),
            stamp(&self.created_at),
        ]
    }
}

impl CsvRecord for Wish {
    const TITLE: &'static str = "WISHES";
    const HEADERS: &'static [&'static str] =
        &["ID", "Name", "Email", "Message", "Type", "Relationship", "Submitted"];

    fn fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.email.clone(),
            self.message.clone(),
            self.message_type.clone(),
            opt(&self.relationship),
            stamp(&self.created_at),
        ]
    }
}

impl CsvRecord for Notification {
    const TITLE: &'static str = "NOTIFICATIONS";
    const HEADERS: &'static [&'static str] =
        &["ID", "Recipient", "Email", "Subject", "Type", "Status", "Sent At"];

    fn fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            opt(&self.recipient_name),
            self.email.clone(),
            self.subject.clone(),
            self.notification_type.clone(),
            self.status.clone(),
            self.sent_at.as_ref().map(stamp).unwrap_or_default(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_with_specials_are_quoted() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("Smith, Jane"), "\"Smith, Jane\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_field("line\nbreak"), "\"line\nbreak\"");
    }

    #[test]
    fn all_expands_to_four_sections() {
        assert_eq!(
            ExportKind::All.sections(),
            vec![
                ExportKind::Rsvps,
                ExportKind::Songs,
                ExportKind::Photos,
                ExportKind::Wishes
            ]
        );
        assert_eq!(ExportKind::parse("everything"), None);
    }

    #[test]
    fn filename_carries_the_date() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 4).unwrap();
        assert_eq!(filename(date), "wedding-data-2026-10-04.csv");
    }

    #[test]
    fn section_layout() {
        let now = Utc::now();
        let wish = Wish {
            id: 7,
            name: "Ada".into(),
            email: "ada@example.com".into(),
            message: "Love, always".into(),
            message_type: "blessing".into(),
            relationship: None,
            created_at: now,
            updated_at: now,
        };
        let csv = render(&[CsvSection::from_records(&[wish])]);
        let lines: Vec<&str> = csv.split('\n').collect();

        assert_eq!(lines[0], "WISHES");
        assert_eq!(lines[1], "ID,Name,Email,Message,Type,Relationship,Submitted");
        assert!(lines[2].starts_with("7,Ada,ada@example.com,\"Love, always\",blessing,,"));
        assert_eq!(lines[3], "");
    }
}
