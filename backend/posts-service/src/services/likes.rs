/// Like operations. Both directions are idempotent at the storage level;
/// only AddLike checks that the post exists.
use crate::error::{Result, ServiceError};
use crate::services::posts::PostsService;

impl PostsService {
    pub async fn add_like(&self, caller_id: i64, post_id: i64) -> Result<()> {
        let bucket = self.bucket_for(post_id);
        if !self.posts.post_exists(bucket, post_id).await? {
            return Err(ServiceError::PostNotFound);
        }

        self.likes.upsert_like(post_id, caller_id).await
    }

    pub async fn delete_like(&self, caller_id: i64, post_id: i64) -> Result<()> {
        self.likes.remove_like(post_id, caller_id).await
    }
}
