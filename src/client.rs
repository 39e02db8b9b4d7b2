//! HTTP client for the remote memory store.
//!
//! [`Backend`] is the seam between the search orchestrator and the wire: the
//! orchestrator only sees raw JSON payloads, and tests substitute a scripted
//! implementation. [`ApiClient`] is the reqwest-backed production client.
//!
//! This layer classifies HTTP statuses and nothing more. No retries — retry
//! policy, if any, belongs to the caller.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use crate::config::ApiConfig;
use crate::error::{Error, Result};

/// HTTP statuses treated as success. Anything else raises [`Error::Backend`].
const SUCCESS_CODES: [u16; 4] = [200, 201, 202, 204];

/// Max characters of response body carried in a backend error.
const BODY_EXCERPT_CHARS: usize = 200;

/// Search mode for memory search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemorySearchMode {
    Deep,
    Fast,
}

impl MemorySearchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deep => "deep",
            Self::Fast => "fast",
        }
    }
}

impl std::fmt::Display for MemorySearchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Search mode for thread search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadSearchMode {
    Suggestions,
    Full,
}

impl ThreadSearchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Suggestions => "suggestions",
            Self::Full => "full",
        }
    }
}

impl std::fmt::Display for ThreadSearchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four backend operations the search core consumes.
///
/// Every operation returns the raw JSON payload; shape tolerance lives in
/// [`crate::search::parse`], not here.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Semantic memory search. `filter_labels` is an optional comma-separated
    /// label filter forwarded to the backend.
    async fn search_memories(
        &self,
        query: &str,
        limit: usize,
        mode: MemorySearchMode,
        filter_labels: Option<&str>,
    ) -> Result<Value>;

    /// Fetch a single memory by ID.
    async fn get_memory(&self, memory_id: &str) -> Result<Value>;

    /// Keyword search over threads with message matching.
    async fn search_threads(
        &self,
        query: &str,
        limit: usize,
        mode: ThreadSearchMode,
    ) -> Result<Value>;

    /// Fetch a single thread with all messages.
    async fn get_thread(&self, thread_id: &str) -> Result<Value>;
}

/// Bearer-authenticated HTTP client for the memory store API.
///
/// The underlying `reqwest::Client` owns the connection pool; it is cheap to
/// clone and safe for concurrent use, and releases its connections on drop.
#[derive(Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client from config. Fails with [`Error::Config`] when the auth
    /// token is missing or blank — checked before any request is made.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        if config.auth_token.trim().is_empty() {
            return Err(Error::Config(
                "MEM_AUTH_TOKEN is required. Set it via environment variable \
                 or the [api] section of ~/.deep-mem/config.toml."
                    .into(),
            ));
        }

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.auth_token))
            .map_err(|_| Error::Config("auth token contains invalid header characters".into()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Classify the HTTP status and decode the JSON body.
    async fn handle(&self, response: reqwest::Response) -> Result<Value> {
        let status = response.status().as_u16();
        if !SUCCESS_CODES.contains(&status) {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Backend {
                status,
                body: body_excerpt(&body),
            });
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            // 204 and friends carry no body
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| {
            Error::MalformedResponse(format!("backend body is not valid JSON: {e}"))
        })
    }
}

#[async_trait]
impl Backend for ApiClient {
    async fn search_memories(
        &self,
        query: &str,
        limit: usize,
        mode: MemorySearchMode,
        filter_labels: Option<&str>,
    ) -> Result<Value> {
        let mut payload = json!({
            "query": query,
            "limit": limit,
            "mode": mode.as_str(),
        });
        if let Some(labels) = filter_labels {
            payload["filter_labels"] = json!(labels);
        }

        debug!(%mode, limit, "searching memories");
        let response = self
            .http
            .post(format!("{}/memories/search", self.base_url))
            .json(&payload)
            .send()
            .await?;
        self.handle(response).await
    }

    async fn get_memory(&self, memory_id: &str) -> Result<Value> {
        let response = self
            .http
            .get(format!("{}/memories/{memory_id}", self.base_url))
            .send()
            .await?;
        self.handle(response).await
    }

    async fn search_threads(
        &self,
        query: &str,
        limit: usize,
        mode: ThreadSearchMode,
    ) -> Result<Value> {
        debug!(%mode, limit, "searching threads");
        let limit = limit.to_string();
        let response = self
            .http
            .get(format!("{}/threads/search", self.base_url))
            .query(&[
                ("query", query),
                ("limit", limit.as_str()),
                ("mode", mode.as_str()),
            ])
            .send()
            .await?;
        self.handle(response).await
    }

    async fn get_thread(&self, thread_id: &str) -> Result<Value> {
        let response = self
            .http
            .get(format!("{}/threads/{thread_id}", self.base_url))
            .send()
            .await?;
        self.handle(response).await
    }
}

/// Truncate a diagnostic body excerpt to at most [`BODY_EXCERPT_CHARS`] chars.
fn body_excerpt(body: &str) -> String {
    let body = body.trim();
    if body.chars().count() <= BODY_EXCERPT_CHARS {
        body.to_string()
    } else {
        let truncated: String = body.chars().take(BODY_EXCERPT_CHARS).collect();
        format!("{truncated}...")
    }
}
