use common::retry::{retry, RetryPolicy};
use common::AppError;

use super::store_error;
use crate::domain::validation::validate_rsvp;
use crate::domain::{RsvpRequest, UpsertOutcome};
use crate::repo::RsvpStore;

pub const DUPLICATE_RSVP: &str = "An RSVP with this email already exists. Please use a different email or update your existing RSVP.";

pub struct RsvpService<S> {
    store: S,
    retry: RetryPolicy,
}

impl<S: RsvpStore> RsvpService<S> {
    pub fn new(store: S) -> Self {
        Self::with_retry(store, RetryPolicy::default())
    }

    pub fn with_retry(store: S, retry: RetryPolicy) -> Self {
        Self { store, retry }
    }

    /// Creates the RSVP for a new email or overwrites the existing one, and
    /// regenerates its guest list.
    pub async fn submit(&self, request: &RsvpRequest) -> Result<UpsertOutcome, AppError> {
        let (rsvp, guests) = validate_rsvp(request).map_err(|e| {
            tracing::warn!(reason = %e, "rejected rsvp submission");
            AppError::Validation(e.0)
        })?;

        let store = &self.store;
        let (rsvp_ref, guests_ref) = (&rsvp, guests.as_slice());
        let outcome = retry(&self.retry, db::is_transient, move || {
            store.upsert_rsvp(rsvp_ref, guests_ref)
        })
        .await
        .map_err(|e| {
            if db::is_unique_violation(&e) {
                tracing::warn!(email = %rsvp.email, "duplicate rsvp insert");
                AppError::Conflict(DUPLICATE_RSVP.to_string())
            } else {
                store_error("upsert rsvp", e)
            }
        })?;

        tracing::info!(
            rsvp_id = outcome.rsvp.id,
            created = outcome.created,
            guests = guests.len(),
            "rsvp stored"
        );

        Ok(outcome)
    }

    /// Removes RSVPs along with their guests and notifications.
    pub async fn delete(&self, ids: &[i32]) -> Result<u64, AppError> {
        let store = &self.store;
        let deleted = retry(&self.retry, db::is_transient, move || store.delete_rsvps(ids))
            .await
            .map_err(|e| store_error("delete rsvps", e))?;

        tracing::info!(requested = ids.len(), deleted, "rsvps deleted");
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::memory::MemoryStore;

    fn service(store: &MemoryStore) -> RsvpService<MemoryStore> {
        RsvpService::with_retry(store.clone(), RetryPolicy::immediate(2))
    }

    fn request(email: &str, guest_names: &str) -> RsvpRequest {
        RsvpRequest {
            name: Some("Alan Turing".into()),
            email: Some(email.into()),
            attendance: Some("yes".into()),
            guest_names: Some(guest_names.into()),
            ..RsvpRequest::default()
        }
    }

    #[tokio::test]
    async fn new_email_creates_rsvp_and_primary_guest() {
        let store = MemoryStore::new();
        let outcome = service(&store).submit(&request("alan@example.com", "")).await.unwrap();

        assert!(outcome.created);
        assert_eq!(store.rsvps().len(), 1);

        let guests = store.guests_of(outcome.rsvp.id);
        assert_eq!(guests.len(), 1);
        assert!(guests[0].guest.is_primary);
        assert_eq!(guests[0].guest.guest_name, "Alan Turing");
    }

    #[tokio::test]
    async fn resubmission_updates_and_replaces_guests() {
        let store = MemoryStore::new();
        let svc = service(&store);

        let first = svc.submit(&request("alan@example.com", "Ada Lovelace")).await.unwrap();
        let second = svc
            .submit(&request("ALAN@example.com ", "Grace Hopper, Katherine Johnson"))
            .await
            .unwrap();

        assert!(!second.created);
        assert_eq!(first.rsvp.id, second.rsvp.id);
        assert_eq!(store.rsvps().len(), 1);

        let names: Vec<String> = store
            .guests_of(second.rsvp.id)
            .into_iter()
            .map(|g| g.guest.guest_name)
            .collect();
        assert_eq!(names, ["Alan Turing", "Grace Hopper", "Katherine Johnson"]);
    }

    #[tokio::test]
    async fn blank_companion_names_are_skipped() {
        let store = MemoryStore::new();
        let outcome = service(&store)
            .submit(&request("alan@example.com", "Ada Lovelace, , Grace Hopper,  "))
            .await
            .unwrap();

        let additional: Vec<String> = store
            .guests_of(outcome.rsvp.id)
            .into_iter()
            .filter(|g| !g.guest.is_primary)
            .map(|g| g.guest.guest_name)
            .collect();
        assert_eq!(additional, ["Ada Lovelace", "Grace Hopper"]);
    }

    #[tokio::test]
    async fn validation_failure_never_reaches_store() {
        let store = MemoryStore::new();
        let err = service(&store).submit(&request("not-an-email", "")).await.unwrap_err();

        assert!(matches!(err, AppError::Validation(ref m) if m == "Invalid email format"));
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn transient_store_errors_are_retried() {
        let store = MemoryStore::new();
        store.fail_transiently(2);

        let outcome = service(&store).submit(&request("alan@example.com", "")).await.unwrap();
        assert!(outcome.created);
        assert_eq!(store.calls(), 3);
    }

    #[tokio::test]
    async fn persistent_store_errors_surface_as_database_error() {
        let store = MemoryStore::new();
        store.fail_transiently(5);

        let err = service(&store).submit(&request("alan@example.com", "")).await.unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
        assert!(store.rsvps().is_empty());
    }

    #[tokio::test]
    async fn unique_violation_is_a_conflict_and_not_retried() {
        let store = MemoryStore::new();
        store.fail_with_unique_violation();

        let err = service(&store).submit(&request("alan@example.com", "")).await.unwrap_err();

        assert!(matches!(err, AppError::Conflict(ref m) if m == DUPLICATE_RSVP));
        assert_eq!(store.calls(), 1);
        assert!(store.rsvps().is_empty());
    }

    #[tokio::test]
    async fn deleting_rsvp_removes_its_guests() {
        let store = MemoryStore::new();
        let svc = service(&store);
        let keep = svc.submit(&request("keep@example.com", "A")).await.unwrap();
        let gone = svc.submit(&request("gone@example.com", "B, C")).await.unwrap();

        let deleted = svc.delete(&[gone.rsvp.id]).await.unwrap();

        assert_eq!(deleted, 1);
        assert!(store.guests_of(gone.rsvp.id).is_empty());
        assert_eq!(store.guests_of(keep.rsvp.id).len(), 2);
    }
}
