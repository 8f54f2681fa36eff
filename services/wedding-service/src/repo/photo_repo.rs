use anyhow::Result;
use sqlx::PgPool;

use crate::domain::{CategoryCount, GalleryPhoto, NewPhoto, PhotoCreated, PhotoShare, PhotoStats};
use contracts::PageParams;

#[derive(Clone)]
pub struct PhotoRepository {
    pool: PgPool,
}

impl PhotoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, photo: &NewPhoto) -> Result<PhotoCreated> {
        let created = sqlx::query_as::<_, PhotoCreated>(
            r#"
            INSERT INTO photo_shares (name, email, photo_url, description, category)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, photo_url, category
            "#,
        )
        .bind(&photo.name)
        .bind(&photo.email)
        .bind(&photo.photo_url)
        .bind(&photo.description)
        .bind(&photo.category)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    pub async fn list(&self, category: Option<&str>, page: PageParams) -> Result<(Vec<PhotoShare>, i64)> {
        let rows = sqlx::query_as::<_, PhotoShare>(
            r#"
            SELECT id, name, email, photo_url, description, category, created_at, updated_at
            FROM photo_shares
            WHERE ($1::text IS NULL OR category = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(category)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;

        let total = self.count(category).await?;
        Ok((rows, total))
    }

    pub async fn gallery(&self, category: Option<&str>, page: PageParams) -> Result<(Vec<GalleryPhoto>, i64)> {
        let rows = sqlx::query_as::<_, GalleryPhoto>(
            r#"
            SELECT id, name, photo_url, description, category, created_at
            FROM photo_shares
            WHERE ($1::text IS NULL OR category = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(category)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;

        let total = self.count(category).await?;
        Ok((rows, total))
    }

    async fn count(&self, category: Option<&str>) -> Result<i64> {
        let total: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM photo_shares WHERE ($1::text IS NULL OR category = $1)",
        )
        .bind(category)
        .fetch_one(&self.pool)
        .await?;

        Ok(total.0)
    }

    pub async fn all(&self) -> Result<Vec<PhotoShare>> {
        let rows = sqlx::query_as::<_, PhotoShare>(
            r#"
            SELECT id, name, email, photo_url, description, category, created_at, updated_at
            FROM photo_shares
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn stats(&self) -> Result<PhotoStats> {
        let category_breakdown = sqlx::query_as::<_, CategoryCount>(
            "SELECT category, COUNT(*) AS count FROM photo_shares GROUP BY category ORDER BY count DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(PhotoStats {
            total_photos: category_breakdown.iter().map(|c| c.count).sum(),
            category_breakdown,
        })
    }

    pub async fn delete(&self, ids: &[i32]) -> Result<u64> {
        let result = sqlx::query("DELETE FROM photo_shares WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
