//! Reaction backend over the REST API

use async_trait::async_trait;
use manada_core::{DocId, ReactionTarget, ToggleIntent};
use manada_service::{ApiResponse, ReactionResponse};
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{ReactionBackend, ReactionState};
use crate::error::{ClientError, ClientResult};
use crate::toggle::Identity;

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: String,
    message: String,
}

/// `/api/reactions` client
#[derive(Debug, Clone)]
pub struct HttpReactionBackend {
    client: Client,
    base_url: String,
}

impl HttpReactionBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, target: &ReactionTarget, parent_id: &DocId, suffix: &str) -> String {
        format!(
            "{}/api/reactions/{}/{}{}",
            self.base_url, target.name, parent_id, suffix
        )
    }

    fn authorize(request: RequestBuilder, identity: Option<&Identity>) -> RequestBuilder {
        match identity.and_then(|i| i.token.as_deref()) {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn read(response: Response) -> ClientResult<ReactionState> {
        let status = response.status();
        if status.is_success() {
            let body: ApiResponse<ReactionResponse> = response.json().await?;
            return ReactionState::try_from(&body.data);
        }

        let code = status.as_u16();
        match response.json::<ErrorEnvelope>().await {
            Ok(envelope) => Err(ClientError::Api {
                status: code,
                code: envelope.error.code,
                message: envelope.error.message,
            }),
            Err(_) => Err(ClientError::InvalidResponse(format!(
                "unexpected status {code}"
            ))),
        }
    }
}

#[async_trait]
impl ReactionBackend for HttpReactionBackend {
    async fn snapshot(
        &self,
        target: &ReactionTarget,
        parent_id: &DocId,
        viewer: Option<&Identity>,
    ) -> ClientResult<ReactionState> {
        let request = self.client.get(self.url(target, parent_id, ""));
        let response = Self::authorize(request, viewer).send().await?;
        Self::read(response).await
    }

    async fn apply(
        &self,
        target: &ReactionTarget,
        parent_id: &DocId,
        identity: &Identity,
        intent: &ToggleIntent,
    ) -> ClientResult<ReactionState> {
        let request = match intent {
            ToggleIntent::Set(kind) => self
                .client
                .put(self.url(target, parent_id, "/@me"))
                .json(&json!({ "kind": kind.as_str() })),
            ToggleIntent::Toggle(kind) => self
                .client
                .post(self.url(target, parent_id, "/@me/toggle"))
                .json(&json!({ "kind": kind.as_str() })),
            ToggleIntent::Clear => self.client.delete(self.url(target, parent_id, "/@me")),
        };
        debug!(target = target.name, parent_id = %parent_id, "Sending reaction request");

        let response = Self::authorize(request, Some(identity)).send().await?;
        Self::read(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_building() {
        let backend = HttpReactionBackend::new("http://localhost:8080/");
        let parent = DocId::parse("P1").unwrap();
        assert_eq!(
            backend.url(&ReactionTarget::POST_LIKES, &parent, "/@me"),
            "http://localhost:8080/api/reactions/post_likes/P1/@me"
        );
    }

    #[test]
    fn test_error_envelope_parses() {
        let raw = r#"{"error":{"code":"INVALID_TOKEN","message":"Invalid token"}}"#;
        let envelope: ErrorEnvelope = serde_json::from_str(raw).unwrap();
        assert_eq!(envelope.error.code, "INVALID_TOKEN");
    }
}
