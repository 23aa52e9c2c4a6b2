//! HTTP client
//!
//! Talks to a running portal server through its JSON API.

use std::sync::Arc;

use reqwest::{Client as ReqwestClient, Error as ReqwestError, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::Client;
use crate::context::{Action, Outcome, PortalResponse, Snapshot};

/// API client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
        }
    }
}

/// Generic API response structure
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    error: Option<String>,
}

/// Client errors
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] ReqwestError),

    #[error("Not signed in; run `agency-portal login <email>` first")]
    NotAuthenticated,

    #[error("API error: {0}")]
    Api(String),

    #[error("Missing data in response")]
    MissingData,
}

/// API client for the portal service
#[derive(Debug, Clone)]
pub struct HttpClientImpl {
    http_client: Arc<ReqwestClient>,
    config: ClientConfig,
}

impl Default for HttpClientImpl {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClientImpl {
    /// Create a new client with default configuration
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: ClientConfig) -> Self {
        Self {
            http_client: Arc::new(ReqwestClient::new()),
            config,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self.http_client.get(self.url(path)).send().await?;
        Self::unwrap_response(response).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let response = self
            .http_client
            .post(self.url(path))
            .json(body)
            .send()
            .await?;
        Self::unwrap_response(response).await
    }

    async fn unwrap_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(ClientError::NotAuthenticated);
        }

        let api_response: ApiResponse<T> = response.json().await?;
        if api_response.success {
            api_response.data.ok_or(ClientError::MissingData)
        } else {
            Err(ClientError::Api(
                api_response
                    .error
                    .unwrap_or_else(|| "Unknown API error".to_string()),
            ))
        }
    }
}

#[async_trait::async_trait]
impl Client for HttpClientImpl {
    async fn get_state(&self) -> Result<Snapshot, ClientError> {
        self.get("/api/state").await
    }

    async fn dispatch(&self, action: Action) -> Result<PortalResponse<Outcome>, ClientError> {
        self.post("/api/dispatch", &action).await
    }

    async fn dispatch_all(
        &self,
        actions: Vec<Action>,
    ) -> Result<PortalResponse<Outcome>, ClientError> {
        self.post("/api/dispatch/batch", &actions).await
    }
}
