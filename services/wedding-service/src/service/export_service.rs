use common::{time, AppError};
use sqlx::PgPool;

use super::store_error;
use crate::domain::export::{self, CsvSection, ExportKind};
use crate::domain::seating::build_chart;
use crate::repo::{
    GuestRepository, NotificationRepository, PhotoRepository, RsvpRepository, SongRepository,
    WishRepository,
};

#[derive(Debug)]
pub struct CsvExport {
    pub filename: String,
    pub body: String,
}

pub struct ExportService {
    rsvps: RsvpRepository,
    guests: GuestRepository,
    songs: SongRepository,
    photos: PhotoRepository,
    wishes: WishRepository,
    notifications: NotificationRepository,
    capacity: usize,
}

impl ExportService {
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

    pub async fn export(&self, kind: ExportKind) -> Result<CsvExport, AppError> {
        let mut sections = Vec::new();
        for section in kind.sections() {
            sections.push(self.section(section).await?);
        }

        tracing::info!(?kind, sections = sections.len(), "csv export generated");
        Ok(CsvExport {
            filename: export::filename(time::today()),
            body: export::render(&sections),
        })
    }

    async fn section(&self, kind: ExportKind) -> Result<CsvSection, AppError> {
        let section = match kind {
            ExportKind::Rsvps => self.rsvps.all().await.map(|r| CsvSection::from_records(&r)),
            ExportKind::Guests => self.guests.all().await.map(|g| CsvSection::from_records(&g)),
            ExportKind::Songs => self.songs.all().await.map(|s| CsvSection::from_records(&s)),
            ExportKind::Photos => self.photos.all().await.map(|p| CsvSection::from_records(&p)),
            ExportKind::Wishes => self.wishes.all().await.map(|w| CsvSection::from_records(&w)),
            ExportKind::Notifications => self
                .notifications
                .all()
                .await
                .map(|n| CsvSection::from_records(&n)),
            ExportKind::Tables => self
                .guests
                .chart_rows()
                .await
                .map(|rows| CsvSection::seating(&build_chart(rows, self.capacity))),
            ExportKind::All => Err(anyhow::anyhow!("`all` is not a single section")),
        };

        section.map_err(|e| store_error("export data", e))
    }
}
