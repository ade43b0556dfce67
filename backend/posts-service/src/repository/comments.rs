use crate::error::Result;
use crate::models::{CommentRow, SortDirection};
use sqlx::PgPool;

/// Repository for the append-only `comments` table
#[derive(Clone)]
pub struct CommentRepository {
    pool: PgPool,
}

impl CommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_comment(
        &self,
        id: i64,
        post_id: i64,
        owner_id: i64,
        message: &str,
        attachment_ids: &[i64],
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO comments (id, post_id, owner_id, message, attachment_ids)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(id)
        .bind(post_id)
        .bind(owner_id)
        .bind(message)
        .bind(attachment_ids)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Bounded listing for one post. Direction selects the traversal:
    /// descending reads `id < cursor` newest-first, ascending reads
    /// `id > cursor` oldest-first. Without a cursor the listing is unfiltered
    /// in the chosen order.
    pub async fn list_comments(
        &self,
        post_id: i64,
        cursor_id: Option<i64>,
        limit: i64,
        direction: SortDirection,
    ) -> Result<Vec<CommentRow>> {
        let rows = match (direction, cursor_id) {
            (SortDirection::Descending, Some(cursor)) => {
                sqlx::query_as::<_, CommentRow>(
                    r#"
                    SELECT id, post_id, owner_id, message, attachment_ids
                    FROM comments
                    WHERE post_id = $1 AND id < $2
                    ORDER BY id DESC
                    LIMIT $3
                    "#,
                )
                .bind(post_id)
                .bind(cursor)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            (SortDirection::Descending, None) => {
                sqlx::query_as::<_, CommentRow>(
                    r#"
                    SELECT id, post_id, owner_id, message, attachment_ids
                    FROM comments
                    WHERE post_id = $1
                    ORDER BY id DESC
                    LIMIT $2
                    "#,
                )
                .bind(post_id)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            (SortDirection::Ascending, Some(cursor)) => {
                sqlx::query_as::<_, CommentRow>(
                    r#"
                    SELECT id, post_id, owner_id, message, attachment_ids
                    FROM comments
                    WHERE post_id = $1 AND id > $2
                    ORDER BY id ASC
                    LIMIT $3
                    "#,
                )
                .bind(post_id)
                .bind(cursor)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            (SortDirection::Ascending, None) => {
                sqlx::query_as::<_, CommentRow>(
                    r#"
                    SELECT id, post_id, owner_id, message, attachment_ids
                    FROM comments
                    WHERE post_id = $1
                    ORDER BY id ASC
                    LIMIT $2
                    "#,
                )
                .bind(post_id)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows)
    }

    pub async fn count_comments(&self, post_id: i64) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE post_id = $1")
            .bind(post_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
