/// Capability ports for the sibling services the core calls but does not own.
///
/// Handlers never talk to a sibling service directly; they go through these
/// traits, constructed once at startup and injected by reference. Tests
/// substitute mockall doubles without touching the core logic.
use crate::models::{Attachment, UserProfile};
use async_trait::async_trait;
use thiserror::Error;

pub mod http;

pub use http::{HttpAttachmentResolver, HttpCrosspostLinker, HttpProfileResolver};

/// A dependency's own classification of its failure.
///
/// The caller maps these onto the service taxonomy per dependency; it never
/// guesses the class from message text.
#[derive(Debug, Error)]
pub enum DependencyError {
    /// The dependency could not be reached or reported itself unavailable.
    #[error("dependency unavailable: {0}")]
    Unavailable(String),

    /// The dependency understood the request and rejected it.
    #[error("request rejected: {0}")]
    Rejected(String),

    /// The dependency failed for an unclassified reason.
    #[error("dependency failure: {0}")]
    Failed(String),
}

/// Storage service: batch-resolves attachment ids to metadata.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AttachmentResolver: Send + Sync {
    async fn resolve(&self, ids: &[i64]) -> Result<Vec<Attachment>, DependencyError>;
}

/// Users service: batch-resolves owner ids to profiles, restricted to the
/// requested fields.
///
/// Contract: exactly one profile per requested id, in request order.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileResolver: Send + Sync {
    async fn resolve(
        &self,
        ids: &[i64],
        fields: &[String],
    ) -> Result<Vec<UserProfile>, DependencyError>;
}

/// Linked-account service: mirrors a new post to external accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CrosspostLinker: Send + Sync {
    async fn link_post(&self, post_id: i64, linked_ids: &[i64]) -> Result<(), DependencyError>;
}
