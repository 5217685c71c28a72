//! HTTP retrieval over `reqwest`.
//!
//! One `GET` per call, no body, no per-request headers.  A 2xx response is
//! decoded as JSON into the caller's payload type; anything else becomes a
//! [`FetchError`].

use anyhow::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{FetchError, Retrieve};

/// Endpoint listing the most recent public gists.
pub fn public_gists_url(api_base: &str) -> String {
    format!("{}/gists/public", api_base.trim_end_matches('/'))
}

/// Endpoint listing one account's public gists.
pub fn user_gists_url(api_base: &str, user: &str) -> String {
    format!("{}/users/{user}/gists", api_base.trim_end_matches('/'))
}

/// A JSON-over-HTTP data source backed by a shared [`reqwest::Client`].
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
}

impl HttpSource {
    /// Build a source whose client identifies itself as `user_agent`.
    ///
    /// The GitHub API refuses requests that carry no `User-Agent`, so it is
    /// set once on the client rather than per request.
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder().user_agent(user_agent).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl<T> Retrieve<T> for HttpSource
where
    T: DeserializeOwned + Send + 'static,
{
    async fn retrieve(&self, url: &str) -> Result<T, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        debug!(url, status = status.as_u16(), "response received");
        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("Unknown");
            return Err(FetchError::Status(status.as_u16(), reason.to_string()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        serde_json::from_slice(&body).map_err(|e| FetchError::Decode(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
