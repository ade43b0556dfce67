/// Data models for posts-service
///
/// Raw rows mirror the partitioned tables; view types are the enriched shapes
/// handlers serialize. A row becomes a view only after enrichment has fully
/// populated it; no partially filled view is ever surfaced.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Post row as stored in the `posts` table
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PostRow {
    pub id: i64,
    pub owner_id: i64,
    pub message: String,
    pub attachment_ids: Vec<i64>,
}

/// Comment row as stored in the `comments` table
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CommentRow {
    pub id: i64,
    pub post_id: i64,
    pub owner_id: i64,
    pub message: String,
    pub attachment_ids: Vec<i64>,
}

/// Attachment metadata resolved from the storage service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: i64,
    pub url: String,
    pub content_type: String,
}

/// Owner profile resolved from the users service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// Like aggregate for one post, from the caller's point of view
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LikesInfo {
    pub count: i64,
    pub liked: bool,
}

/// Comment aggregate, optionally carrying an embedded first page
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentsInfo {
    pub count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<CommentView>>,
}

/// Fully enriched post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostView {
    pub id: i64,
    pub owner_id: i64,
    pub message: String,
    pub time: DateTime<Utc>,
    pub attachments: Vec<Attachment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<UserProfile>,
    pub likes: LikesInfo,
    pub comments: CommentsInfo,
}

/// Fully enriched comment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentView {
    pub id: i64,
    pub post_id: i64,
    pub owner_id: i64,
    pub message: String,
    pub time: DateTime<Utc>,
    pub attachments: Vec<Attachment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<UserProfile>,
}

/// Traversal direction for comment listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}
