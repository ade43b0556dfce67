use crate::error::Result;
use sqlx::PgPool;

/// Repository for the `likes` table. The (post_id, owner_id) primary key
/// makes both writes idempotent: liking twice is a no-op, unliking an absent
/// like deletes nothing.
#[derive(Clone)]
pub struct LikeRepository {
    pool: PgPool,
}

impl LikeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn upsert_like(&self, post_id: i64, owner_id: i64) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO likes (post_id, owner_id)
            VALUES ($1, $2)
            ON CONFLICT (post_id, owner_id) DO NOTHING
            "#,
        )
        .bind(post_id)
        .bind(owner_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn remove_like(&self, post_id: i64, owner_id: i64) -> Result<()> {
        sqlx::query("DELETE FROM likes WHERE post_id = $1 AND owner_id = $2")
            .bind(post_id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn count_likes(&self, post_id: i64) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM likes WHERE post_id = $1")
            .bind(post_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Did this caller like the post?
    pub async fn caller_liked(&self, post_id: i64, owner_id: i64) -> Result<bool> {
        let liked: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM likes WHERE post_id = $1 AND owner_id = $2)",
        )
        .bind(post_id)
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(liked)
    }
}
