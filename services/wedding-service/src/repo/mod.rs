pub mod guest_repo;
pub mod notification_repo;
pub mod photo_repo;
pub mod rsvp_repo;
pub mod song_repo;
pub mod wish_repo;

#[cfg(test)]
pub mod memory;

pub use guest_repo::GuestRepository;
pub use notification_repo::NotificationRepository;
pub use photo_repo::PhotoRepository;
pub use rsvp_repo::RsvpRepository;
pub use song_repo::SongRepository;
pub use wish_repo::WishRepository;

use anyhow::Result;

use crate::domain::{
    DeliveryStatus, NewGuest, NewRsvp, Recipient, SeatingCandidate, TableAssignment, UpsertOutcome,
};

/// Storage behind RSVP submission and removal.
pub(crate) trait RsvpStore {
    /// Inserts or overwrites the RSVP for `rsvp.email` and replaces its
    /// guests with `guests`, atomically.
    async fn upsert_rsvp(&self, rsvp: &NewRsvp, guests: &[NewGuest]) -> Result<UpsertOutcome>;

    /// Deletes RSVPs together with their guests and notifications.
    async fn delete_rsvps(&self, ids: &[i32]) -> Result<u64>;
}

/// Storage behind the table optimizer.
pub(crate) trait SeatingStore {
    /// Guests of attending parties, ordered by party, primary guest first.
    async fn seating_candidates(&self) -> Result<Vec<SeatingCandidate>>;

    async fn highest_table_number(&self) -> Result<Option<i32>>;

    /// Writes each assignment only if the guest is still unseated and
    /// returns the ones that took effect.
    async fn apply_assignments(&self, assignments: &[TableAssignment]) -> Result<Vec<TableAssignment>>;
}

/// Storage behind announcement emails.
pub(crate) trait NotificationStore {
    /// Attending RSVPs among `ids`, ordered by id.
    async fn attending_recipients(&self, ids: &[i32]) -> Result<Vec<Recipient>>;

    /// Records an outgoing email in the `sending` state and returns its id.
    async fn create_notification(
        &self,
        recipient: &Recipient,
        subject: &str,
        message: &str,
        notification_type: &str,
    ) -> Result<i32>;

    async fn set_notification_status(&self, id: i32, status: DeliveryStatus) -> Result<()>;

    async fn mark_notified(&self, rsvp_id: i32) -> Result<()>;
}
