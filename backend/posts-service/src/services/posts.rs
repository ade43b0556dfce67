/// Post operations: creation, detail and the two feed listings.
use crate::clients::{AttachmentResolver, CrosspostLinker, DependencyError, ProfileResolver};
use crate::error::{Result, ServiceError};
use crate::models::{CommentsInfo, LikesInfo, PostRow, PostView};
use crate::repository::{CommentRepository, LikeRepository, PostRepository};
use crate::services::comments::{CommentsEmbed, CommentsListParams};
use crate::services::enrichment::{resolve_attachments, resolve_owner_profiles, AttachmentPhase};
use crate::services::{feed, validate_limit};
use snowflake_id::SnowflakeGenerator;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

/// Parameters shared by the global and per-user feed listings
#[derive(Debug, Clone, Default)]
pub struct ListPostsParams {
    pub limit: i64,
    pub last_id: Option<i64>,
    pub extended: bool,
    pub fields: Vec<String>,
    pub comments: CommentsEmbed,
}

/// The posts/feed service core. Holds the long-lived, concurrency-safe
/// handles acquired once at startup: the pool, the id allocator and the
/// sibling-service ports. No other state is shared across requests.
pub struct PostsService {
    pub(crate) posts: PostRepository,
    pub(crate) comments: CommentRepository,
    pub(crate) likes: LikeRepository,
    pub(crate) ids: Arc<SnowflakeGenerator>,
    pub(crate) bucket_window: Duration,
    pub(crate) attachments: Arc<dyn AttachmentResolver>,
    pub(crate) users: Arc<dyn ProfileResolver>,
    pub(crate) linked: Arc<dyn CrosspostLinker>,
}

impl PostsService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        pool: PgPool,
        ids: Arc<SnowflakeGenerator>,
        bucket_window: Duration,
        attachments: Arc<dyn AttachmentResolver>,
        users: Arc<dyn ProfileResolver>,
        linked: Arc<dyn CrosspostLinker>,
    ) -> Self {
        Self {
            posts: PostRepository::new(pool.clone()),
            comments: CommentRepository::new(pool.clone()),
            likes: LikeRepository::new(pool),
            ids,
            bucket_window,
            attachments,
            users,
            linked,
        }
    }

    pub(crate) fn bucket_for(&self, id: i64) -> i64 {
        snowflake_id::bucket_of(id, self.bucket_window)
    }

    /// Create a post. Attachments are validated against the storage service
    /// before the insert; the linked-account fan-out runs after it.
    pub async fn new_post(
        &self,
        caller_id: i64,
        message: String,
        attachment_ids: Vec<i64>,
        linked_acc_ids: Vec<i64>,
    ) -> Result<PostView> {
        if message.is_empty() && attachment_ids.is_empty() {
            return Err(ServiceError::EmptyContent);
        }

        let id = self.ids.next_id();
        let bucket = self.bucket_for(id);

        let attachments =
            resolve_attachments(self.attachments.as_ref(), &attachment_ids, AttachmentPhase::Write)
                .await?;

        self.posts
            .create_post(bucket, id, caller_id, &message, &attachment_ids)
            .await?;

        if !linked_acc_ids.is_empty() {
            match self.linked.link_post(id, &linked_acc_ids).await {
                Ok(()) => {}
                Err(DependencyError::Unavailable(_)) => {
                    return Err(ServiceError::LinkedAccUnavailable)
                }
                Err(err) => return Err(ServiceError::Internal(err.to_string())),
            }
        }

        Ok(PostView {
            id,
            owner_id: caller_id,
            message,
            time: snowflake_id::timestamp_of(id),
            attachments,
            owner: None,
            likes: LikesInfo::default(),
            comments: CommentsInfo::default(),
        })
    }

    /// Fetch one post with aggregates, optionally embedding a first page of
    /// comments.
    pub async fn get_post_by_id(
        &self,
        caller_id: i64,
        id: i64,
        extended: bool,
        comments: CommentsEmbed,
    ) -> Result<PostView> {
        // Allocated ids are always positive; anything else cannot exist and
        // would map to a bucket below the epoch.
        if id <= 0 {
            return Err(ServiceError::PostNotFound);
        }

        let bucket = self.bucket_for(id);
        let row = self
            .posts
            .find_post(bucket, id)
            .await?
            .ok_or(ServiceError::PostNotFound)?;

        let mut view = self.build_post_view(caller_id, row).await?;

        if extended && comments.limit > 0 {
            let items = self
                .get_comments_list(CommentsListParams {
                    post_id: id,
                    limit: comments.limit,
                    last_id: None,
                    sort: comments.sort,
                    extended: comments.extended,
                    fields: comments.fields,
                })
                .await?;
            view.comments.items = Some(items);
        }

        Ok(view)
    }

    /// Global feed: bucket walk, newest-first.
    pub async fn get_posts_list(
        &self,
        caller_id: i64,
        params: ListPostsParams,
    ) -> Result<Vec<PostView>> {
        validate_limit(params.limit)?;

        let start = feed::start_bucket(params.last_id, self.bucket_window);
        let rows = feed::collect_page(&self.posts, start, params.limit, params.last_id).await?;

        self.build_post_page(caller_id, rows, &params).await
    }

    /// Per-user feed: one bounded query via the owner index.
    pub async fn get_posts_user(
        &self,
        caller_id: i64,
        user_id: Option<i64>,
        params: ListPostsParams,
    ) -> Result<Vec<PostView>> {
        validate_limit(params.limit)?;

        let owner_id = user_id.unwrap_or(caller_id);
        let rows = self
            .posts
            .list_by_owner(owner_id, params.last_id, params.limit)
            .await?;

        self.build_post_page(caller_id, rows, &params).await
    }

    /// Enrich a page of raw rows into complete views: per-row attachments and
    /// aggregates first, then one batch owner-profile call for the page.
    async fn build_post_page(
        &self,
        caller_id: i64,
        rows: Vec<PostRow>,
        params: &ListPostsParams,
    ) -> Result<Vec<PostView>> {
        let mut posts = Vec::with_capacity(rows.len());
        for row in rows {
            let id = row.id;
            let mut view = self.build_post_view(caller_id, row).await?;

            if params.extended && params.comments.limit > 0 {
                let items = self
                    .get_comments_list(CommentsListParams {
                        post_id: id,
                        limit: params.comments.limit,
                        last_id: None,
                        sort: params.comments.sort,
                        extended: params.comments.extended,
                        fields: params.comments.fields.clone(),
                    })
                    .await?;
                view.comments.items = Some(items);
            }

            posts.push(view);
        }

        if params.extended && !posts.is_empty() {
            let owner_ids: Vec<i64> = posts.iter().map(|p| p.owner_id).collect();
            if let Some(profiles) =
                resolve_owner_profiles(self.users.as_ref(), &owner_ids, &params.fields).await?
            {
                for (post, profile) in posts.iter_mut().zip(profiles) {
                    post.owner = Some(profile);
                }
            }
        }

        Ok(posts)
    }

    /// Complete one row: attachment metadata plus the local aggregates. The
    /// sub-calls populate disjoint fields, so they run concurrently; any
    /// failure aborts the whole request.
    pub(crate) async fn build_post_view(&self, caller_id: i64, row: PostRow) -> Result<PostView> {
        let (attachments, like_count, liked, comment_count) = tokio::try_join!(
            resolve_attachments(
                self.attachments.as_ref(),
                &row.attachment_ids,
                AttachmentPhase::Read
            ),
            self.likes.count_likes(row.id),
            self.likes.caller_liked(row.id, caller_id),
            self.comments.count_comments(row.id),
        )?;

        Ok(PostView {
            id: row.id,
            owner_id: row.owner_id,
            message: row.message,
            time: snowflake_id::timestamp_of(row.id),
            attachments,
            owner: None,
            likes: LikesInfo {
                count: like_count,
                liked,
            },
            comments: CommentsInfo {
                count: comment_count,
                items: None,
            },
        })
    }
}
