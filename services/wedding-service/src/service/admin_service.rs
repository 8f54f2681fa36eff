use common::AppError;
use contracts::{ListResponse, PageParams};
use sqlx::PgPool;

use super::store_error;
use crate::domain::entries::{EntriesUpdate, EntryKind};
use crate::domain::seating::build_chart;
use crate::domain::{
    GuestFilter, GuestListing, GuestStats, ManualAssignment, ManualAssignmentResult, Notification,
    NotificationStats, PhotoFilter, PhotoShare, PhotoStats, Rsvp, RsvpFilter, RsvpStats,
    SeatingChart, SongRequest, SongStats, Wish, WishFilter, WishStats,
};
use crate::repo::{
    GuestRepository, NotificationRepository, PhotoRepository, RsvpRepository, SongRepository,
    WishRepository,
};

/// Dashboard listings and manual edits.
pub struct AdminService {
    rsvps: RsvpRepository,
    guests: GuestRepository,
    songs: SongRepository,
    photos: PhotoRepository,
    wishes: WishRepository,
    notifications: NotificationRepository,
    capacity: usize,
}

impl AdminService {
    pub fn new(pool: PgPool, capacity: usize) -> Self {
        Self {
            rsvps: RsvpRepository::new(pool.clone()),
            guests: GuestRepository::new(pool.clone()),
            songs: SongRepository::new(pool.clone()),
            photos: PhotoRepository::new(pool.clone()),
            wishes: WishRepository::new(pool.clone()),
            notifications: NotificationRepository::new(pool),
            capacity,
        }
    }

    pub async fn list_rsvps(
        &self,
        filter: &RsvpFilter,
        page: PageParams,
    ) -> Result<ListResponse<Rsvp, RsvpStats>, AppError> {
        let (data, total) = self
            .rsvps
            .list(filter, page)
            .await
            .map_err(|e| store_error("list rsvps", e))?;
        let stats = self.rsvps.stats().await.map_err(|e| store_error("rsvp stats", e))?;

        let pagination = page.pagination(total, data.len());
        Ok(ListResponse::new(data, pagination, stats))
    }

    pub async fn list_guests(
        &self,
        filter: &GuestFilter,
        page: PageParams,
    ) -> Result<ListResponse<GuestListing, GuestStats>, AppError> {
        let (data, total) = self
            .guests
            .list(filter, page)
            .await
            .map_err(|e| store_error("list guests", e))?;
        let stats = self.guests.stats().await.map_err(|e| store_error("guest stats", e))?;

        let pagination = page.pagination(total, data.len());
        Ok(ListResponse::new(data, pagination, stats))
    }

    pub async fn list_songs(&self, page: PageParams) -> Result<ListResponse<SongRequest, SongStats>, AppError> {
        let (data, total) = self
            .songs
            .list(page)
            .await
            .map_err(|e| store_error("list songs", e))?;
        let stats = self.songs.stats().await.map_err(|e| store_error("song stats", e))?;

        let pagination = page.pagination(total, data.len());
        Ok(ListResponse::new(data, pagination, stats))
    }

    pub async fn list_photos(
        &self,
        filter: &PhotoFilter,
        page: PageParams,
    ) -> Result<ListResponse<PhotoShare, PhotoStats>, AppError> {
        let (data, total) = self
            .photos
            .list(filter.category(), page)
            .await
            .map_err(|e| store_error("list photos", e))?;
        let stats = self.photos.stats().await.map_err(|e| store_error("photo stats", e))?;

        let pagination = page.pagination(total, data.len());
        Ok(ListResponse::new(data, pagination, stats))
    }

    pub async fn list_wishes(
        &self,
        filter: &WishFilter,
        page: PageParams,
    ) -> Result<ListResponse<Wish, WishStats>, AppError> {
        let (data, total) = self
            .wishes
            .list(filter.message_type(), page)
            .await
            .map_err(|e| store_error("list wishes", e))?;
        let stats = self.wishes.stats().await.map_err(|e| store_error("wish stats", e))?;

        let pagination = page.pagination(total, data.len());
        Ok(ListResponse::new(data, pagination, stats))
    }

    pub async fn list_notifications(
        &self,
        page: PageParams,
    ) -> Result<ListResponse<Notification, NotificationStats>, AppError> {
        let (data, total) = self
            .notifications
            .list(page)
            .await
            .map_err(|e| store_error("list notifications", e))?;
        let stats = self
            .notifications
            .stats()
            .await
            .map_err(|e| store_error("notification stats", e))?;

        let pagination = page.pagination(total, data.len());
        Ok(ListResponse::new(data, pagination, stats))
    }

    pub async fn seating_chart(&self) -> Result<SeatingChart, AppError> {
        let rows = self
            .guests
            .chart_rows()
            .await
            .map_err(|e| store_error("load seating chart", e))?;
        Ok(build_chart(rows, self.capacity))
    }

    /// Applies each guest's seat independently; unknown guests are reported
    /// back rather than failing the batch.
    pub async fn assign_guests(&self, assignments: &[ManualAssignment]) -> Result<ManualAssignmentResult, AppError> {
        let mut updated = 0;
        let mut errors = Vec::new();

        for assignment in assignments {
            match self.guests.assign_guest(assignment.guest_id, assignment.table_number).await {
                Ok(true) => updated += 1,
                Ok(false) => errors.push(format!("Guest {} not found", assignment.guest_id)),
                Err(e) => {
                    tracing::error!(guest_id = assignment.guest_id, error = %e, "guest table assignment failed");
                    errors.push(format!("Failed to update guest {}", assignment.guest_id));
                }
            }
        }

        tracing::info!(updated, requested = assignments.len(), "manual table assignments applied");
        Ok(ManualAssignmentResult::new(updated, assignments.len(), errors))
    }

    /// Returns how many of the requested rows existed and were changed.
    pub async fn update_entries(&self, update: &EntriesUpdate) -> Result<usize, AppError> {
        let mut updated = 0;

        match update {
            EntriesUpdate::TableAssignment(parties) => {
                for party in parties {
                    if self
                        .rsvps
                        .assign_party(party.rsvp_id, party.table_number)
                        .await
                        .map_err(|e| store_error("assign party table", e))?
                    {
                        updated += 1;
                    }
                }
            }
            EntriesUpdate::GuestDetails(guests) => {
                for guest in guests {
                    if self
                        .guests
                        .update_details(guest)
                        .await
                        .map_err(|e| store_error("update guest details", e))?
                    {
                        updated += 1;
                    }
                }
            }
        }

        tracing::info!(updated, requested = update.count(), "entries updated");
        Ok(updated)
    }

    /// Deletes songs, photos or wishes. RSVPs go through `RsvpService`.
    pub async fn delete_entries(&self, kind: EntryKind, ids: &[i32]) -> Result<u64, AppError> {
        let deleted = match kind {
            EntryKind::Songs => self.songs.delete(ids).await,
            EntryKind::Photos => self.photos.delete(ids).await,
            EntryKind::Wishes => self.wishes.delete(ids).await,
            EntryKind::Rsvps => {
                return Err(AppError::validation("RSVP deletion is handled separately"));
            }
        }
        .map_err(|e| store_error("delete entries", e))?;

        tracing::info!(kind = kind.as_str(), requested = ids.len(), deleted, "entries deleted");
        Ok(deleted)
    }
}
