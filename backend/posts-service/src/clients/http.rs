/// HTTP clients for the sibling services (storage, users, linkedacc).
///
/// Thin JSON clients over a shared `reqwest::Client`. Each response is
/// classified into a `DependencyError` from the transport outcome and status
/// code, so callers map failures onto the taxonomy without guessing.
use crate::clients::{AttachmentResolver, CrosspostLinker, DependencyError, ProfileResolver};
use crate::models::{Attachment, UserProfile};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;

#[derive(Serialize)]
struct BatchIdsRequest<'a> {
    ids: &'a [i64],
}

#[derive(Serialize)]
struct BatchProfilesRequest<'a> {
    ids: &'a [i64],
    fields: &'a [String],
}

#[derive(Serialize)]
struct LinkPostRequest<'a> {
    post_id: i64,
    linked_ids: &'a [i64],
}

fn classify_transport(err: reqwest::Error) -> DependencyError {
    if err.is_connect() || err.is_timeout() {
        DependencyError::Unavailable(err.to_string())
    } else {
        DependencyError::Failed(err.to_string())
    }
}

fn classify_status(status: StatusCode, body: String) -> DependencyError {
    match status {
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT => {
            DependencyError::Unavailable(body)
        }
        s if s.is_client_error() => DependencyError::Rejected(body),
        _ => DependencyError::Failed(body),
    }
}

async fn post_json<T: serde::de::DeserializeOwned>(
    client: &reqwest::Client,
    url: String,
    payload: &impl Serialize,
) -> Result<T, DependencyError> {
    let response = client
        .post(&url)
        .json(payload)
        .send()
        .await
        .map_err(classify_transport)?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(classify_status(status, body));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| DependencyError::Failed(e.to_string()))
}

/// Storage service client
#[derive(Clone)]
pub struct HttpAttachmentResolver {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAttachmentResolver {
    pub fn new(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }
}

#[async_trait]
impl AttachmentResolver for HttpAttachmentResolver {
    async fn resolve(&self, ids: &[i64]) -> Result<Vec<Attachment>, DependencyError> {
        post_json(
            &self.client,
            format!("{}/attachments/batch", self.base_url),
            &BatchIdsRequest { ids },
        )
        .await
    }
}

/// Users service client
#[derive(Clone)]
pub struct HttpProfileResolver {
    client: reqwest::Client,
    base_url: String,
}

impl HttpProfileResolver {
    pub fn new(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }
}

#[async_trait]
impl ProfileResolver for HttpProfileResolver {
    async fn resolve(
        &self,
        ids: &[i64],
        fields: &[String],
    ) -> Result<Vec<UserProfile>, DependencyError> {
        post_json(
            &self.client,
            format!("{}/users/batch", self.base_url),
            &BatchProfilesRequest { ids, fields },
        )
        .await
    }
}

/// Linked-account service client
#[derive(Clone)]
pub struct HttpCrosspostLinker {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCrosspostLinker {
    pub fn new(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }
}

#[async_trait]
impl CrosspostLinker for HttpCrosspostLinker {
    async fn link_post(&self, post_id: i64, linked_ids: &[i64]) -> Result<(), DependencyError> {
        let response = self
            .client
            .post(format!("{}/external-posts", self.base_url))
            .json(&LinkPostRequest { post_id, linked_ids })
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, body));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_statuses_classify_as_unavailable() {
        for status in [
            StatusCode::BAD_GATEWAY,
            StatusCode::SERVICE_UNAVAILABLE,
            StatusCode::GATEWAY_TIMEOUT,
        ] {
            assert!(matches!(
                classify_status(status, String::new()),
                DependencyError::Unavailable(_)
            ));
        }
    }

    #[test]
    fn client_errors_classify_as_rejected() {
        assert!(matches!(
            classify_status(StatusCode::UNPROCESSABLE_ENTITY, "bad ids".into()),
            DependencyError::Rejected(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::NOT_FOUND, String::new()),
            DependencyError::Rejected(_)
        ));
    }

    #[test]
    fn other_server_errors_classify_as_failed() {
        assert!(matches!(
            classify_status(StatusCode::INTERNAL_SERVER_ERROR, String::new()),
            DependencyError::Failed(_)
        ));
    }
}
