use anyhow::Result;
use sqlx::PgPool;

use crate::domain::{GenreCount, NewSong, SongCreated, SongRequest, SongStats};
use contracts::PageParams;

#[derive(Clone)]
pub struct SongRepository {
    pool: PgPool,
}

impl SongRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, song: &NewSong) -> Result<SongCreated> {
        let created = sqlx::query_as::<_, SongCreated>(
            r#"
            INSERT INTO song_requests (name, email, song_title, artist_name, genre, reason)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, song_title, artist_name
            "#,
        )
        .bind(&song.name)
        .bind(&song.email)
        .bind(&song.song_title)
        .bind(&song.artist_name)
        .bind(&song.genre)
        .bind(&song.reason)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    pub async fn list(&self, page: PageParams) -> Result<(Vec<SongRequest>, i64)> {
        let rows = sqlx::query_as::<_, SongRequest>(
            r#"
            SELECT id, name, email, song_title, artist_name, genre, reason, created_at, updated_at
            FROM song_requests
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;

        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM song_requests")
            .fetch_one(&self.pool)
            .await?;

        Ok((rows, total.0))
    }

    pub async fn all(&self) -> Result<Vec<SongRequest>> {
        let rows = sqlx::query_as::<_, SongRequest>(
            r#"
            SELECT id, name, email, song_title, artist_name, genre, reason, created_at, updated_at
            FROM song_requests
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn stats(&self) -> Result<SongStats> {
        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM song_requests")
            .fetch_one(&self.pool)
            .await?;

        let genre_breakdown = sqlx::query_as::<_, GenreCount>(
            r#"
            SELECT genre, COUNT(*) AS count
            FROM song_requests
            WHERE genre IS NOT NULL AND genre <> ''
            GROUP BY genre
            ORDER BY count DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(SongStats {
            total_songs: total.0,
            genre_breakdown,
        })
    }

    pub async fn delete(&self, ids: &[i32]) -> Result<u64> {
        let result = sqlx::query("DELETE FROM song_requests WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
