//! HTTP client for the remote posts endpoint.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use thiserror::Error;

use super::RemoteSource;
use crate::config::AppConfig;
use crate::models::{NewPost, RemotePost, SubmitReceipt};

/// Remote call failures.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server response not OK (Status: {status})")]
    Status { status: u16, body: String },
}

impl RemoteError {
    /// HTTP status of a non-success response, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
        }
    }
}

/// Client for `GET /posts` and `POST /posts`.
#[derive(Debug, Clone)]
pub struct PostsClient {
    base_url: String,
    fetch_limit: usize,
    client: Client,
}

impl PostsClient {
    /// Create with explicit configuration.
    pub fn new(base_url: impl Into<String>, fetch_limit: usize, timeout: Duration) -> Self {
        let client = Client::builder()
            .user_agent(format!("quotebook/{}", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            fetch_limit,
            client,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.remote_url.clone(),
            config.fetch_limit,
            config.request_timeout(),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Handle response, converting non-success statuses to `RemoteError`.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, RemoteError> {
        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(RemoteError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }

    pub async fn get_posts(&self) -> Result<Vec<RemotePost>, RemoteError> {
        let url = format!("{}/posts", self.base_url);
        tracing::debug!("Fetching posts from {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[("_limit", self.fetch_limit)])
            .send()
            .await?;
        self.handle_response(response).await
    }

    pub async fn create_post(&self, post: &NewPost) -> Result<SubmitReceipt, RemoteError> {
        let url = format!("{}/posts", self.base_url);
        let response = self.client.post(&url).json(post).send().await?;
        let receipt: SubmitReceipt = self.handle_response(response).await?;
        tracing::info!("Post successful, server id {}", receipt.id);
        Ok(receipt)
    }
}

impl RemoteSource for PostsClient {
    async fn fetch_candidates(&self) -> Result<Vec<RemotePost>, RemoteError> {
        self.get_posts().await
    }

    async fn submit(&self, post: &NewPost) -> Result<SubmitReceipt, RemoteError> {
        self.create_post(post).await
    }
}
