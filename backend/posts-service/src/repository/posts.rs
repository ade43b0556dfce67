use crate::error::Result;
use crate::models::PostRow;
use sqlx::PgPool;

/// Repository for the time-partitioned `posts` table
#[derive(Clone)]
pub struct PostRepository {
    pool: PgPool,
}

impl PostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a post into its bucket. Id uniqueness is guaranteed by the
    /// allocator, so there is no existence check.
    pub async fn create_post(
        &self,
        bucket: i64,
        id: i64,
        owner_id: i64,
        message: &str,
        attachment_ids: &[i64],
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO posts (bucket, id, owner_id, message, attachment_ids)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(bucket)
        .bind(id)
        .bind(owner_id)
        .bind(message)
        .bind(attachment_ids)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Point lookup within one bucket
    pub async fn find_post(&self, bucket: i64, id: i64) -> Result<Option<PostRow>> {
        let post = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, owner_id, message, attachment_ids
            FROM posts
            WHERE bucket = $1 AND id = $2
            "#,
        )
        .bind(bucket)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    pub async fn post_exists(&self, bucket: i64, id: i64) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM posts WHERE bucket = $1 AND id = $2)")
                .bind(bucket)
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    /// Bounded newest-first scan of one bucket, optionally below a cursor id.
    pub async fn scan_bucket(
        &self,
        bucket: i64,
        before_id: Option<i64>,
        limit: i64,
    ) -> Result<Vec<PostRow>> {
        let rows = match before_id {
            Some(cursor) => {
                sqlx::query_as::<_, PostRow>(
                    r#"
                    SELECT id, owner_id, message, attachment_ids
                    FROM posts
                    WHERE bucket = $1 AND id < $2
                    ORDER BY id DESC
                    LIMIT $3
                    "#,
                )
                .bind(bucket)
                .bind(cursor)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, PostRow>(
                    r#"
                    SELECT id, owner_id, message, attachment_ids
                    FROM posts
                    WHERE bucket = $1
                    ORDER BY id DESC
                    LIMIT $2
                    "#,
                )
                .bind(bucket)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows)
    }

    /// Per-user feed via the owner index: a single bounded query, no bucket
    /// walk.
    pub async fn list_by_owner(
        &self,
        owner_id: i64,
        before_id: Option<i64>,
        limit: i64,
    ) -> Result<Vec<PostRow>> {
        let rows = match before_id {
            Some(cursor) => {
                sqlx::query_as::<_, PostRow>(
                    r#"
                    SELECT id, owner_id, message, attachment_ids
                    FROM posts
                    WHERE owner_id = $1 AND id < $2
                    ORDER BY id DESC
                    LIMIT $3
                    "#,
                )
                .bind(owner_id)
                .bind(cursor)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, PostRow>(
                    r#"
                    SELECT id, owner_id, message, attachment_ids
                    FROM posts
                    WHERE owner_id = $1
                    ORDER BY id DESC
                    LIMIT $2
                    "#,
                )
                .bind(owner_id)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test]
    async fn find_post_returns_none_for_absent_rows(pool: PgPool) {
        let posts = PostRepository::new(pool);

        assert!(posts.find_post(0, 1).await.unwrap().is_none());
        assert!(!posts.post_exists(0, 1).await.unwrap());
    }

    #[sqlx::test]
    async fn a_created_post_is_found_only_in_its_bucket(pool: PgPool) {
        let posts = PostRepository::new(pool);
        posts.create_post(3, 42, 7, "hello", &[9, 11]).await.unwrap();

        let row = posts.find_post(3, 42).await.unwrap().unwrap();
        assert_eq!(row.owner_id, 7);
        assert_eq!(row.message, "hello");
        assert_eq!(row.attachment_ids, vec![9, 11]);

        assert!(posts.find_post(2, 42).await.unwrap().is_none());
    }

    #[sqlx::test]
    async fn bucket_scan_is_bounded_and_newest_first(pool: PgPool) {
        let posts = PostRepository::new(pool);
        for id in [10, 20, 30] {
            posts.create_post(1, id, 7, "", &[]).await.unwrap();
        }

        let rows = posts.scan_bucket(1, Some(30), 10).await.unwrap();
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![20, 10]);

        let rows = posts.scan_bucket(1, None, 2).await.unwrap();
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![30, 20]);
    }
}
