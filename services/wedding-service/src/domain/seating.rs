//! Table seating.
//!
//! The optimizer is a first-fit packing over parties: each party (all guests
//! of one RSVP) goes to the current table if it fits, otherwise to the next
//! table. Parties are never split, and only guests without a table are moved.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow)]
pub struct SeatingCandidate {
    pub rsvp_id: i32,
    pub guest_id: i32,
    pub table_number: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableAssignment {
    pub guest_id: i32,
    pub table_number: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeatingPlan {
    pub guests_assigned: usize,
    /// Number of distinct tables this run seated guests at, not the highest
    /// table number.
    pub tables_used: usize,
    pub assignments: Vec<TableAssignment>,
}

impl SeatingPlan {
    pub fn from_assignments(assignments: Vec<TableAssignment>) -> Self {
        let tables: BTreeSet<i32> = assignments.iter().map(|a| a.table_number).collect();
        Self {
            guests_assigned: assignments.len(),
            tables_used: tables.len(),
            assignments,
        }
    }
}

struct Fold {
    table: i32,
    seated: usize,
    assignments: Vec<TableAssignment>,
}

/// Groups candidates into parties by `rsvp_id`, in order of first appearance.
fn parties(candidates: &[SeatingCandidate]) -> Vec<Vec<SeatingCandidate>> {
    let mut index: HashMap<i32, usize> = HashMap::new();
    let mut parties: Vec<Vec<SeatingCandidate>> = Vec::new();

    for candidate in candidates {
        let slot = *index.entry(candidate.rsvp_id).or_insert_with(|| {
            parties.push(Vec::new());
            parties.len() - 1
        });
        parties[slot].push(*candidate);
    }

    parties
}

/// Plans seats for every unseated candidate starting at `first_table`.
///
/// A table is only abandoned when it already has guests and the next party
/// would overflow it, so a party larger than `capacity` still gets a table of
/// its own rather than being split.
pub fn plan_seating(candidates: &[SeatingCandidate], first_table: i32, capacity: usize) -> SeatingPlan {
    let start = Fold {
        table: first_table,
        seated: 0,
        assignments: Vec::new(),
    };

    let done = parties(candidates).into_iter().fold(start, |mut acc, party| {
        let unseated: Vec<i32> = party
            .iter()
            .filter(|c| c.table_number.is_none())
            .map(|c| c.guest_id)
            .collect();

        if unseated.is_empty() {
            return acc;
        }

        if acc.seated > 0 && acc.seated + unseated.len() > capacity {
            acc.table += 1;
            acc.seated = 0;
        }

        acc.seated += unseated.len();
        let table = acc.table;
        acc.assignments.extend(unseated.into_iter().map(|guest_id| TableAssignment {
            guest_id,
            table_number: table,
        }));
        acc
    });

    SeatingPlan::from_assignments(done.assignments)
}

/// First table number for a new optimizer run.
pub fn next_table(highest_assigned: Option<i32>) -> i32 {
    highest_assigned.map_or(1, |n| n + 1)
}

/// Manual seating change for one guest; `None` clears the seat.
#[derive(Debug, Clone, Deserialize)]
pub struct ManualAssignment {
    pub guest_id: i32,
    pub table_number: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManualAssignmentRequest {
    pub assignments: Option<Vec<ManualAssignment>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PartyAssignment {
    pub rsvp_id: i32,
    pub table_number: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ManualAssignmentResult {
    pub success: bool,
    pub message: String,
    pub updated_count: usize,
    pub total_requested: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl ManualAssignmentResult {
    pub fn new(updated_count: usize, total_requested: usize, errors: Vec<String>) -> Self {
        Self {
            success: true,
            message: format!("Successfully updated {updated_count} guest table assignments"),
            updated_count,
            total_requested,
            errors,
        }
    }
}

/// One attending guest with the table they effectively sit at.
#[derive(Debug, Clone, FromRow)]
pub struct ChartRow {
    pub rsvp_id: i32,
    pub email: String,
    pub guest_id: Option<i32>,
    pub guest_name: String,
    pub dietary_needs: Option<String>,
    pub is_primary: bool,
    pub assigned_table: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeatedGuest {
    pub guest_id: Option<i32>,
    pub rsvp_id: i32,
    pub name: String,
    pub email: Option<String>,
    pub dietary_needs: Option<String>,
    pub is_primary: bool,
}

impl From<ChartRow> for SeatedGuest {
    fn from(row: ChartRow) -> Self {
        Self {
            guest_id: row.guest_id,
            rsvp_id: row.rsvp_id,
            name: row.guest_name,
            email: row.is_primary.then_some(row.email),
            dietary_needs: row.dietary_needs,
            is_primary: row.is_primary,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TableGroup {
    pub table_number: i32,
    pub guests: Vec<SeatedGuest>,
    pub total_guests: usize,
    pub dietary_requirements: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableUtilization {
    pub table_number: i32,
    pub current_guests: usize,
    pub capacity: usize,
    pub utilization_percentage: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartStatistics {
    pub total_tables: usize,
    pub total_assigned: usize,
    pub total_unassigned: usize,
    pub table_utilization: Vec<TableUtilization>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeatingChart {
    pub tables: Vec<TableGroup>,
    pub unassigned_guests: Vec<SeatedGuest>,
    pub statistics: ChartStatistics,
}

pub fn build_chart(rows: Vec<ChartRow>, capacity: usize) -> SeatingChart {
    let mut tables: BTreeMap<i32, TableGroup> = BTreeMap::new();
    let mut unassigned = Vec::new();

    for row in rows {
        let Some(table_number) = row.assigned_table else {
            unassigned.push(SeatedGuest::from(row));
            continue;
        };

        let group = tables.entry(table_number).or_insert_with(|| TableGroup {
            table_number,
            guests: Vec::new(),
            total_guests: 0,
            dietary_requirements: Vec::new(),
        });
        if let Some(dietary) = row.dietary_needs.as_deref().filter(|d| !d.trim().is_empty()) {
            group.dietary_requirements.push(dietary.to_string());
        }
        group.total_guests += 1;
        group.guests.push(SeatedGuest::from(row));
    }

    let tables: Vec<TableGroup> = tables.into_values().collect();
    let table_utilization = tables
        .iter()
        .map(|t| TableUtilization {
            table_number: t.table_number,
            current_guests: t.total_guests,
            capacity,
            utilization_percentage: ((t.total_guests as f64 / capacity.max(1) as f64) * 100.0).round()
                as u32,
        })
        .collect();

    let statistics = ChartStatistics {
        total_tables: tables.len(),
        total_assigned: tables.iter().map(|t| t.total_guests).sum(),
        total_unassigned: unassigned.len(),
        table_utilization,
    };

    SeatingChart {
        tables,
        unassigned_guests: unassigned,
        statistics,
    }
}
