/// Fan-out enrichment: raw rows are completed with attachment metadata and
/// owner profiles fetched from sibling services before they are surfaced.
///
/// Attachment enrichment is fail-closed: an unavailable storage service
/// aborts the whole request rather than returning rows with empty attachment
/// lists. Owner-profile enrichment is the single best-effort exception: a
/// count mismatch from the users service skips profiles for the whole page.
use crate::clients::{AttachmentResolver, DependencyError, ProfileResolver};
use crate::error::{Result, ServiceError};
use crate::models::{Attachment, UserProfile};

/// Whether attachments are being resolved while reading rows back or while
/// validating a write. The dependency's `Rejected` class means bad input only
/// at write time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentPhase {
    Read,
    Write,
}

/// Batch-resolve one row's attachment list, classifying failures.
pub async fn resolve_attachments(
    resolver: &dyn AttachmentResolver,
    ids: &[i64],
    phase: AttachmentPhase,
) -> Result<Vec<Attachment>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    match resolver.resolve(ids).await {
        Ok(attachments) => Ok(attachments),
        Err(DependencyError::Unavailable(_)) => Err(ServiceError::StorageUnavailable),
        Err(DependencyError::Rejected(cause)) => match phase {
            AttachmentPhase::Write => Err(ServiceError::InvalidAttachments),
            AttachmentPhase::Read => Err(ServiceError::Internal(cause)),
        },
        Err(DependencyError::Failed(cause)) => Err(ServiceError::Internal(cause)),
    }
}

/// Batch-resolve owner profiles for a page of rows.
///
/// The resolver must return exactly one profile per requested id, in request
/// order. On a count mismatch profiles are skipped for the whole page
/// (`Ok(None)`) instead of failing the request.
pub async fn resolve_owner_profiles(
    resolver: &dyn ProfileResolver,
    owner_ids: &[i64],
    fields: &[String],
) -> Result<Option<Vec<UserProfile>>> {
    if owner_ids.is_empty() {
        return Ok(Some(Vec::new()));
    }

    let profiles = match resolver.resolve(owner_ids, fields).await {
        Ok(profiles) => profiles,
        Err(DependencyError::Unavailable(_)) => return Err(ServiceError::UsersUnavailable),
        Err(err) => return Err(ServiceError::Internal(err.to_string())),
    };

    if profiles.len() != owner_ids.len() {
        tracing::warn!(
            requested = owner_ids.len(),
            returned = profiles.len(),
            "owner profile count mismatch, skipping profile enrichment for this page"
        );
        return Ok(None);
    }

    Ok(Some(profiles))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{MockAttachmentResolver, MockProfileResolver};

    fn attachment(id: i64) -> Attachment {
        Attachment {
            id,
            url: format!("https://cdn.pulse.dev/{id}"),
            content_type: "image/jpeg".into(),
        }
    }

    fn profile(id: i64) -> UserProfile {
        UserProfile {
            id,
            username: format!("user{id}"),
            display_name: None,
            avatar_url: None,
        }
    }

    #[tokio::test]
    async fn empty_attachment_list_skips_the_resolver() {
        let resolver = MockAttachmentResolver::new();

        let out = resolve_attachments(&resolver, &[], AttachmentPhase::Read)
            .await
            .unwrap();
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn unavailable_storage_fails_closed() {
        let mut resolver = MockAttachmentResolver::new();
        resolver
            .expect_resolve()
            .returning(|_| Err(DependencyError::Unavailable("connection refused".into())));

        let err = resolve_attachments(&resolver, &[1, 2], AttachmentPhase::Read)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::StorageUnavailable));
    }

    #[tokio::test]
    async fn rejected_attachments_are_invalid_only_at_write_time() {
        let mut resolver = MockAttachmentResolver::new();
        resolver
            .expect_resolve()
            .returning(|_| Err(DependencyError::Rejected("unknown ids".into())));

        let write_err = resolve_attachments(&resolver, &[1], AttachmentPhase::Write)
            .await
            .unwrap_err();
        assert!(matches!(write_err, ServiceError::InvalidAttachments));

        let read_err = resolve_attachments(&resolver, &[1], AttachmentPhase::Read)
            .await
            .unwrap_err();
        assert!(matches!(read_err, ServiceError::Internal(_)));
    }

    #[tokio::test]
    async fn resolved_attachments_pass_through() {
        let mut resolver = MockAttachmentResolver::new();
        resolver
            .expect_resolve()
            .returning(|ids| Ok(ids.iter().copied().map(attachment).collect()));

        let out = resolve_attachments(&resolver, &[7, 9], AttachmentPhase::Read)
            .await
            .unwrap();
        assert_eq!(out, vec![attachment(7), attachment(9)]);
    }

    #[tokio::test]
    async fn profile_count_mismatch_degrades_to_no_profiles() {
        let mut resolver = MockProfileResolver::new();
        resolver
            .expect_resolve()
            .returning(|_, _| Ok(vec![profile(1)]));

        let out = resolve_owner_profiles(&resolver, &[1, 2, 3], &[])
            .await
            .unwrap();
        assert!(out.is_none());
    }

    #[tokio::test]
    async fn matching_profile_count_enriches_in_request_order() {
        let mut resolver = MockProfileResolver::new();
        resolver
            .expect_resolve()
            .returning(|ids, _| Ok(ids.iter().copied().map(profile).collect()));

        let out = resolve_owner_profiles(&resolver, &[5, 3, 5], &[])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(out, vec![profile(5), profile(3), profile(5)]);
    }

    #[tokio::test]
    async fn unavailable_users_service_aborts_the_request() {
        let mut resolver = MockProfileResolver::new();
        resolver
            .expect_resolve()
            .returning(|_, _| Err(DependencyError::Unavailable("dial timeout".into())));

        let err = resolve_owner_profiles(&resolver, &[1], &[]).await.unwrap_err();
        assert!(matches!(err, ServiceError::UsersUnavailable));
    }
}
