//! In-memory stores for service and handler tests.

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Result;
use sqlx::error::{DatabaseError, ErrorKind};

use super::{NotificationStore, RsvpStore, SeatingStore};
use crate::domain::{
    Attendance, DeliveryStatus, NewGuest, NewRsvp, Recipient, RsvpSummary, SeatingCandidate,
    TableAssignment, UpsertOutcome,
};

#[derive(Debug, Clone)]
pub struct StoredRsvp {
    pub id: i32,
    pub rsvp: NewRsvp,
    pub notified: bool,
}

#[derive(Debug, Clone)]
pub struct StoredNotification {
    pub id: i32,
    pub rsvp_id: i32,
    pub email: String,
    pub notification_type: String,
    pub status: DeliveryStatus,
}

/// Postgres `unique_violation` (23505), as raised by a racing insert.
#[derive(Debug)]
struct UniqueViolation;

impl fmt::Display for UniqueViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl StdError for UniqueViolation {}

impl DatabaseError for UniqueViolation {
    fn message(&self) -> &str {
        "duplicate key value violates unique constraint \"rsvps_email_key\""
    }

    fn code(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed("23505"))
    }

    fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self
    }

    fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
        self
    }

    fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
        self
    }

    fn kind(&self) -> ErrorKind {
        ErrorKind::UniqueViolation
    }
}

#[derive(Debug, Clone)]
pub struct StoredGuest {
    pub id: i32,
    pub rsvp_id: i32,
    pub guest: NewGuest,
    pub table_number: Option<i32>,
}

#[derive(Default)]
struct State {
    next_id: i32,
    rsvps: Vec<StoredRsvp>,
    guests: Vec<StoredGuest>,
    notifications: Vec<StoredNotification>,
    transient_failures: u32,
    unique_violation: bool,
    calls: u32,
}

impl State {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn take_failure(&mut self) -> Result<()> {
        self.calls += 1;
        if std::mem::take(&mut self.unique_violation) {
            return Err(sqlx::Error::Database(Box::new(UniqueViolation)).into());
        }
        if self.transient_failures > 0 {
            self.transient_failures -= 1;
            return Err(sqlx::Error::PoolTimedOut.into());
        }
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// Makes the next `n` store calls fail with a pool timeout.
    pub fn fail_transiently(&self, n: u32) {
        self.lock().transient_failures = n;
    }

    /// Makes the next store call fail as a duplicate insert.
    pub fn fail_with_unique_violation(&self) {
        self.lock().unique_violation = true;
    }

    pub fn calls(&self) -> u32 {
        self.lock().calls
    }

    pub fn rsvps(&self) -> Vec<StoredRsvp> {
        self.lock().rsvps.clone()
    }

    pub fn notifications(&self) -> Vec<StoredNotification> {
        self.lock().notifications.clone()
    }

    pub fn was_notified(&self, rsvp_id: i32) -> bool {
        self.lock().rsvps.iter().any(|r| r.id == rsvp_id && r.notified)
    }

    pub fn guests(&self) -> Vec<StoredGuest> {
        self.lock().guests.clone()
    }

    pub fn guests_of(&self, rsvp_id: i32) -> Vec<StoredGuest> {
        self.lock()
            .guests
            .iter()
            .filter(|g| g.rsvp_id == rsvp_id)
            .cloned()
            .collect()
    }

    /// Seats a guest directly, as an admin edit would.
    pub fn seat(&self, guest_id: i32, table_number: i32) {
        let mut state = self.lock();
        if let Some(guest) = state.guests.iter_mut().find(|g| g.id == guest_id) {
            guest.table_number = Some(table_number);
        }
    }
}

impl RsvpStore for MemoryStore {
    async fn upsert_rsvp(&self, rsvp: &NewRsvp, guests: &[NewGuest]) -> Result<UpsertOutcome> {
        let mut state = self.lock();
        state.take_failure()?;

        let existing = state.rsvps.iter().position(|r| r.rsvp.email == rsvp.email);
        let (id, created) = match existing {
            Some(index) => {
                state.rsvps[index].rsvp = rsvp.clone();
                (state.rsvps[index].id, false)
            }
            None => {
                let id = state.next_id();
                state.rsvps.push(StoredRsvp {
                    id,
                    rsvp: rsvp.clone(),
                    notified: false,
                });
                (id, true)
            }
        };

        state.guests.retain(|g| g.rsvp_id != id);
        for guest in guests {
            let guest_id = state.next_id();
            state.guests.push(StoredGuest {
                id: guest_id,
                rsvp_id: id,
                guest: guest.clone(),
                table_number: None,
            });
        }

        Ok(UpsertOutcome {
            rsvp: RsvpSummary {
                id,
                name: rsvp.name.clone(),
                email: rsvp.email.clone(),
                attendance: rsvp.attendance.as_str().to_string(),
            },
            created,
        })
    }

    async fn delete_rsvps(&self, ids: &[i32]) -> Result<u64> {
        let mut state = self.lock();
        state.take_failure()?;

        let before = state.rsvps.len();
        state.rsvps.retain(|r| !ids.contains(&r.id));
        state.guests.retain(|g| !ids.contains(&g.rsvp_id));
        state.notifications.retain(|n| !ids.contains(&n.rsvp_id));

        Ok((before - state.rsvps.len()) as u64)
    }
}

impl SeatingStore for MemoryStore {
    async fn seating_candidates(&self) -> Result<Vec<SeatingCandidate>> {
        let mut state = self.lock();
        state.take_failure()?;

        let attending: Vec<i32> = state
            .rsvps
            .iter()
            .filter(|r| r.rsvp.attendance == Attendance::Yes)
            .map(|r| r.id)
            .collect();

        let mut candidates: Vec<(bool, SeatingCandidate)> = state
            .guests
            .iter()
            .filter(|g| attending.contains(&g.rsvp_id))
            .map(|g| {
                (
                    g.guest.is_primary,
                    SeatingCandidate {
                        rsvp_id: g.rsvp_id,
                        guest_id: g.id,
                        table_number: g.table_number,
                    },
                )
            })
            .collect();
        candidates.sort_by_key(|(primary, c)| (c.rsvp_id, !primary, c.guest_id));

        Ok(candidates.into_iter().map(|(_, c)| c).collect())
    }

    async fn highest_table_number(&self) -> Result<Option<i32>> {
        let mut state = self.lock();
        state.take_failure()?;
        Ok(state.guests.iter().filter_map(|g| g.table_number).max())
    }

    async fn apply_assignments(&self, assignments: &[TableAssignment]) -> Result<Vec<TableAssignment>> {
        let mut state = self.lock();
        state.take_failure()?;

        let mut applied = Vec::new();
        for assignment in assignments {
            if let Some(guest) = state
                .guests
                .iter_mut()
                .find(|g| g.id == assignment.guest_id && g.table_number.is_none())
            {
                guest.table_number = Some(assignment.table_number);
                applied.push(*assignment);
            }
        }

        Ok(applied)
    }
}

impl NotificationStore for MemoryStore {
    async fn attending_recipients(&self, ids: &[i32]) -> Result<Vec<Recipient>> {
        let mut state = self.lock();
        state.take_failure()?;

        let mut recipients: Vec<Recipient> = state
            .rsvps
            .iter()
            .filter(|r| ids.contains(&r.id) && r.rsvp.attendance == Attendance::Yes)
            .map(|r| Recipient {
                id: r.id,
                name: r.rsvp.name.clone(),
                email: r.rsvp.email.clone(),
            })
            .collect();
        recipients.sort_by_key(|r| r.id);

        Ok(recipients)
    }

    async fn create_notification(
        &self,
        recipient: &Recipient,
        _subject: &str,
        _message: &str,
        notification_type: &str,
    ) -> Result<i32> {
        let mut state = self.lock();
        state.take_failure()?;

        let id = state.next_id();
        state.notifications.push(StoredNotification {
            id,
            rsvp_id: recipient.id,
            email: recipient.email.clone(),
            notification_type: notification_type.to_string(),
            status: DeliveryStatus::Sending,
        });

        Ok(id)
    }

    async fn set_notification_status(&self, id: i32, status: DeliveryStatus) -> Result<()> {
        let mut state = self.lock();
        state.take_failure()?;

        if let Some(notification) = state.notifications.iter_mut().find(|n| n.id == id) {
            notification.status = status;
        }
        Ok(())
    }

    async fn mark_notified(&self, rsvp_id: i32) -> Result<()> {
        let mut state = self.lock();
        state.take_failure()?;

        if let Some(rsvp) = state.rsvps.iter_mut().find(|r| r.id == rsvp_id) {
            rsvp.notified = true;
        }
        Ok(())
    }
}
