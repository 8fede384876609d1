//! Test helpers for integration tests
//!
//! Spawns the API on an ephemeral port and wraps the HTTP calls tests make.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use manada_api::{create_app_with_config, create_app_state, AppState};
use manada_common::AppConfig;
use manada_core::{DocId, Document};
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub const TEST_SECRET: &str = "integration-test-secret";

/// Admin user configured on every test server
pub const ADMIN_ID: &str = "admin";

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    pub state: AppState,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a server on the in-memory backend
    pub async fn start() -> Result<Self> {
        Self::start_with_config(test_config()).await
    }

    pub async fn start_with_config(config: AppConfig) -> Result<Self> {
        let state = create_app_state(config).await?;
        let app = create_app_with_config(state.clone());

        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            addr,
            client,
            state,
            handle,
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Bearer token for a user
    pub fn token(&self, user_id: &DocId) -> Result<String> {
        Ok(self.state.jwt_service().issue_access_token(user_id)?)
    }

    /// Write a document straight into the store
    pub async fn seed(&self, doc: &Document) -> Result<()> {
        self.state.service_context().document_repo().create(doc).await?;
        Ok(())
    }

    pub async fn get(&self, path: &str) -> Result<Response> {
        Ok(self.client.get(self.url(path)).send().await?)
    }

    pub async fn get_auth(&self, path: &str, token: &str) -> Result<Response> {
        Ok(self.client.get(self.url(path)).bearer_auth(token).send().await?)
    }

    pub async fn post_auth<T: Serialize>(&self, path: &str, token: &str, body: &T) -> Result<Response> {
        Ok(self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?)
    }

    /// POST without a body
    pub async fn post_empty_auth(&self, path: &str, token: &str) -> Result<Response> {
        Ok(self.client.post(self.url(path)).bearer_auth(token).send().await?)
    }

    pub async fn patch_auth<T: Serialize>(&self, path: &str, token: &str, body: &T) -> Result<Response> {
        Ok(self
            .client
            .patch(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Local config with a known secret and one admin
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::local(TEST_SECRET);
    config.admin.user_ids = vec![ADMIN_ID.to_string()];
    config
}

/// Assert the status, returning the response for further checks
pub async fn assert_status(response: Response, expected: StatusCode) -> Result<Response> {
    let status = response.status();
    if status != expected {
        let body = response.text().await.unwrap_or_default();
        anyhow::bail!("expected {expected}, got {status}: {body}");
    }
    Ok(response)
}

/// Assert the status and decode the JSON body
pub async fn assert_json<T: DeserializeOwned>(response: Response, expected: StatusCode) -> Result<T> {
    let response = assert_status(response, expected).await?;
    Ok(response.json().await?)
}
