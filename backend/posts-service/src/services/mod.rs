/// Business logic layer
///
/// - `posts`: post creation, detail and listing operations
/// - `comments`: comment creation and listing
/// - `likes`: like/unlike operations
/// - `feed`: the bucket-walking pagination engine
/// - `enrichment`: fan-out to sibling services and failure classification
pub mod comments;
pub mod enrichment;
pub mod feed;
pub mod likes;
pub mod posts;

pub use comments::{CommentsEmbed, CommentsListParams};
pub use posts::{ListPostsParams, PostsService};

use crate::error::{Result, ServiceError};

/// Page-size validation shared by every listing handler, raised before any
/// I/O happens.
pub(crate) fn validate_limit(limit: i64) -> Result<()> {
    if (1..=100).contains(&limit) {
        Ok(())
    } else {
        Err(ServiceError::LimitOutOfRange)
    }
}
