/// Comment operations: writing and direction-aware listing.
use crate::error::{Result, ServiceError};
use crate::models::{CommentView, SortDirection};
use crate::services::enrichment::{resolve_attachments, resolve_owner_profiles, AttachmentPhase};
use crate::services::posts::PostsService;
use crate::services::validate_limit;

/// Sub-parameters for embedding a first page of comments into post views.
/// A zero limit disables the embed.
#[derive(Debug, Clone, Default)]
pub struct CommentsEmbed {
    pub limit: i64,
    pub extended: bool,
    pub sort: SortDirection,
    pub fields: Vec<String>,
}

/// Parameters for a standalone comment listing
#[derive(Debug, Clone, Default)]
pub struct CommentsListParams {
    pub post_id: i64,
    pub limit: i64,
    pub last_id: Option<i64>,
    pub sort: SortDirection,
    pub extended: bool,
    pub fields: Vec<String>,
}

impl PostsService {
    /// Append a comment to an existing post.
    pub async fn write_comment(
        &self,
        caller_id: i64,
        post_id: i64,
        message: String,
        attachment_ids: Vec<i64>,
    ) -> Result<CommentView> {
        let bucket = self.bucket_for(post_id);
        if !self.posts.post_exists(bucket, post_id).await? {
            return Err(ServiceError::PostNotFound);
        }

        let id = self.ids.next_id();

        let attachments =
            resolve_attachments(self.attachments.as_ref(), &attachment_ids, AttachmentPhase::Write)
                .await?;

        self.comments
            .create_comment(id, post_id, caller_id, &message, &attachment_ids)
            .await?;

        Ok(CommentView {
            id,
            post_id,
            owner_id: caller_id,
            message,
            time: snowflake_id::timestamp_of(id),
            attachments,
            owner: None,
        })
    }

    /// List comments of a post. Comments need no bucket walk: they are keyed
    /// by post, so one bounded query suffices in either direction.
    pub async fn get_comments_list(&self, params: CommentsListParams) -> Result<Vec<CommentView>> {
        validate_limit(params.limit)?;

        let rows = self
            .comments
            .list_comments(params.post_id, params.last_id, params.limit, params.sort)
            .await?;

        let mut views = Vec::with_capacity(rows.len());
        for row in rows {
            let attachments = resolve_attachments(
                self.attachments.as_ref(),
                &row.attachment_ids,
                AttachmentPhase::Read,
            )
            .await?;

            views.push(CommentView {
                id: row.id,
                post_id: row.post_id,
                owner_id: row.owner_id,
                message: row.message,
                time: snowflake_id::timestamp_of(row.id),
                attachments,
                owner: None,
            });
        }

        if params.extended && !views.is_empty() {
            let owner_ids: Vec<i64> = views.iter().map(|c| c.owner_id).collect();
            if let Some(profiles) =
                resolve_owner_profiles(self.users.as_ref(), &owner_ids, &params.fields).await?
            {
                for (view, profile) in views.iter_mut().zip(profiles) {
                    view.owner = Some(profile);
                }
            }
        }

        Ok(views)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::posts::tests::service_without_io;

    #[tokio::test]
    async fn comment_listing_validates_the_limit_before_any_io() {
        let service = service_without_io();

        for limit in [0, 101] {
            let err = service
                .get_comments_list(CommentsListParams {
                    post_id: 1,
                    limit,
                    ..Default::default()
                })
                .await
                .unwrap_err();
            assert!(matches!(err, ServiceError::LimitOutOfRange), "limit {limit}");
        }
    }
}
