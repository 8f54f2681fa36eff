use anyhow::Result;
use sqlx::PgPool;

use crate::domain::{MessageTypeCount, NewWish, Wish, WishCreated, WishStats};
use contracts::PageParams;

#[derive(Clone)]
pub struct WishRepository {
    pool: PgPool,
}

impl WishRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, wish: &NewWish) -> Result<WishCreated> {
        let created = sqlx::query_as::<_, WishCreated>(
            r#"
            INSERT INTO wishes (name, email, message, message_type, relationship)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, message_type
            "#,
        )
        .bind(&wish.name)
        .bind(&wish.email)
        .bind(&wish.message)
        .bind(&wish.message_type)
        .bind(&wish.relationship)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    pub async fn list(&self, message_type: Option<&str>, page: PageParams) -> Result<(Vec<Wish>, i64)> {
        let rows = sqlx::query_as::<_, Wish>(
            r#"
            SELECT id, name, email, message, message_type, relationship, created_at, updated_at
            FROM wishes
            WHERE ($1::text IS NULL OR message_type = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(message_type)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;

        let total: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM wishes WHERE ($1::text IS NULL OR message_type = $1)",
        )
        .bind(message_type)
        .fetch_one(&self.pool)
        .await?;

        Ok((rows, total.0))
    }

    pub async fn all(&self) -> Result<Vec<Wish>> {
        let rows = sqlx::query_as::<_, Wish>(
            r#"
            SELECT id, name, email, message, message_type, relationship, created_at, updated_at
            FROM wishes
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn stats(&self) -> Result<WishStats> {
        let type_breakdown = sqlx::query_as::<_, MessageTypeCount>(
            "SELECT message_type, COUNT(*) AS count FROM wishes GROUP BY message_type ORDER BY count DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(WishStats {
            total_wishes: type_breakdown.iter().map(|t| t.count).sum(),
            type_breakdown,
        })
    }

    pub async fn delete(&self, ids: &[i32]) -> Result<u64> {
        let result = sqlx::query("DELETE FROM wishes WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
