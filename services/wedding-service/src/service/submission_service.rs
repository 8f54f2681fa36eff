use common::AppError;
use contracts::{Created, Page, PageParams};
use sqlx::PgPool;

use super::store_error;
use crate::domain::validation::ValidationError;
use crate::domain::{
    GalleryPhoto, PhotoCreated, PhotoFilter, PhotoSubmission, SongCreated, SongSubmission,
    WishCreated, WishSubmission,
};
use crate::repo::{PhotoRepository, SongRepository, WishRepository};

fn rejected(kind: &'static str) -> impl FnOnce(ValidationError) -> AppError {
    move |e| {
        tracing::warn!(kind, reason = %e, "rejected submission");
        AppError::Validation(e.0)
    }
}

/// Guest contributions other than the RSVP itself.
pub struct SubmissionService {
    songs: SongRepository,
    photos: PhotoRepository,
    wishes: WishRepository,
}

impl SubmissionService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            songs: SongRepository::new(pool.clone()),
            photos: PhotoRepository::new(pool.clone()),
            wishes: WishRepository::new(pool),
        }
    }

    pub async fn submit_song(&self, submission: &SongSubmission) -> Result<Created<SongCreated>, AppError> {
        let song = submission.validate().map_err(rejected("song"))?;
        let created = self
            .songs
            .create(&song)
            .await
            .map_err(|e| store_error("insert song request", e))?;

        tracing::info!(song_id = created.id, "song request stored");
        Ok(Created::new("Song request submitted successfully!", created))
    }

    pub async fn submit_photo(&self, submission: &PhotoSubmission) -> Result<Created<PhotoCreated>, AppError> {
        let photo = submission.validate().map_err(rejected("photo"))?;
        let created = self
            .photos
            .create(&photo)
            .await
            .map_err(|e| store_error("insert photo share", e))?;

        tracing::info!(photo_id = created.id, category = %created.category, "photo shared");
        Ok(Created::new("Photo shared successfully!", created))
    }

    pub async fn submit_wish(&self, submission: &WishSubmission) -> Result<Created<WishCreated>, AppError> {
        let wish = submission.validate().map_err(rejected("wish"))?;
        let created = self
            .wishes
            .create(&wish)
            .await
            .map_err(|e| store_error("insert wish", e))?;

        tracing::info!(wish_id = created.id, "wish stored");
        Ok(Created::new("Wishes sent successfully!", created))
    }

    pub async fn gallery(&self, filter: &PhotoFilter, page: PageParams) -> Result<Page<GalleryPhoto>, AppError> {
        let (data, total) = self
            .photos
            .gallery(filter.category(), page)
            .await
            .map_err(|e| store_error("load gallery", e))?;

        let pagination = page.pagination(total, data.len());
        Ok(Page::new(data, pagination))
    }
}
