// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! HTTP client for the plane inventory CRUD API.
//!
//! All configuration is passed in explicitly at construction; there is no
//! process-wide session or base-URL state. Requests carry fixed
//! connect/read timeouts and a bounded retry with exponential backoff on
//! transient server errors (502/503/504) and connect/timeout failures.

use std::time::Duration;

use log::{debug, warn};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::model::{DeleteReceipt, PlaneFields, PlaneRecord};

/// Default API base URL when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// HTTP statuses considered transient and worth retrying.
const RETRY_STATUSES: [u16; 3] = [502, 503, 504];

/// Retry behavior for transient failures.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the initial attempt (3 retries = up to 4 requests).
    pub max_retries: u32,
    /// First backoff delay; doubles on every further retry.
    pub backoff_base: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_base: Duration::from_millis(300),
        }
    }
}

impl RetryPolicy {
    /// Whether a response status is on the transient whitelist.
    #[must_use]
    pub fn should_retry_status(&self, status: u16) -> bool {
        RETRY_STATUSES.contains(&status)
    }

    /// Backoff delay before retry number `attempt` (0-based): 0.3s, 0.6s, 1.2s.
    #[must_use]
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        self.backoff_base * 2u32.saturating_pow(attempt)
    }
}

/// Configuration for [`PlanesClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL, e.g. `http://127.0.0.1:8000`.
    pub base_url: String,
    /// TCP connect timeout.
    pub connect_timeout: Duration,
    /// Full-request read timeout.
    pub read_timeout: Duration,
    /// Retry behavior for transient failures.
    pub retry: RetryPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(3),
            read_timeout: Duration::from_secs(7),
            retry: RetryPolicy::default(),
        }
    }
}

/// Async client for the plane CRUD endpoints.
///
/// Reuses one connection pool across calls. All operations are blocking from
/// the caller's perspective once awaited; run them off any UI-interaction
/// thread.
pub struct PlanesClient {
    http: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
}

impl std::fmt::Debug for PlanesClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlanesClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl PlanesClient {
    /// Build a client from explicit configuration.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.read_timeout)
            .build()
            .map_err(|e| ApiError::Transport {
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            retry: config.retry,
        })
    }

    /// The base URL this client talks to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn planes_url(&self) -> String {
        format!("{}/planes", self.base_url)
    }

    fn plane_url(&self, id: i64) -> String {
        format!("{}/planes/{id}", self.base_url)
    }

    /// Fetch the full plane collection.
    pub async fn list_all(&self) -> Result<Vec<PlaneRecord>, ApiError> {
        let url = self.planes_url();
        debug!("GET {url}");
        let response = self.send_with_retry(self.http.get(&url)).await?;
        let response = Self::check_status(response, None).await?;
        Self::decode(response).await
    }

    /// Fetch a single plane by id.
    pub async fn get_by_id(&self, id: i64) -> Result<PlaneRecord, ApiError> {
        let url = self.plane_url(id);
        debug!("GET {url}");
        let response = self.send_with_retry(self.http.get(&url)).await?;
        let response = Self::check_status(response, Some(id)).await?;
        Self::decode(response).await
    }

    /// Create a new plane; the server assigns the id.
    pub async fn create(&self, fields: &PlaneFields) -> Result<PlaneRecord, ApiError> {
        let url = self.planes_url();
        debug!("POST {url} ({})", fields.name);
        let response = self
            .send_with_retry(self.http.post(&url).json(fields))
            .await?;
        let response = Self::check_status(response, None).await?;
        Self::decode(response).await
    }

    /// Replace all fields of an existing plane (PUT, not a partial patch).
    pub async fn update(&self, id: i64, fields: &PlaneFields) -> Result<PlaneRecord, ApiError> {
        let url = self.plane_url(id);
        debug!("PUT {url}");
        let response = self
            .send_with_retry(self.http.put(&url).json(fields))
            .await?;
        let response = Self::check_status(response, Some(id)).await?;
        Self::decode(response).await
    }

    /// Delete a plane, returning the server's receipt with the prior
    /// field snapshot when available.
    pub async fn delete(&self, id: i64) -> Result<DeleteReceipt, ApiError> {
        let url = self.plane_url(id);
        debug!("DELETE {url}");
        let response = self.send_with_retry(self.http.delete(&url)).await?;
        let response = Self::check_status(response, Some(id)).await?;
        Self::decode(response).await
    }

    /// Probe the API liveness endpoint.
    pub async fn health(&self) -> Result<bool, ApiError> {
        let url = format!("{}/health", self.base_url);
        debug!("GET {url}");
        let response = self.send_with_retry(self.http.get(&url)).await?;
        let response = Self::check_status(response, None).await?;
        let body: serde_json::Value = Self::decode(response).await?;
        Ok(body.get("status").and_then(|v| v.as_str()) == Some("ok"))
    }

    /// Probe the database reachability endpoint.
    pub async fn db_ping(&self) -> Result<bool, ApiError> {
        let url = format!("{}/db/ping", self.base_url);
        debug!("GET {url}");
        let response = self.send_with_retry(self.http.get(&url)).await?;
        let response = Self::check_status(response, None).await?;
        let body: serde_json::Value = Self::decode(response).await?;
        Ok(body.get("db").and_then(|v| v.as_str()) == Some("ok"))
    }

    /// Send a request, retrying transient failures per the configured policy.
    ///
    /// Returns the first non-transient response, or `Transport` once the
    /// retry budget is exhausted.
    async fn send_with_retry(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ApiError> {
        let mut attempt = 0u32;
        loop {
            let Some(req) = request.try_clone() else {
                return Err(ApiError::Protocol {
                    message: "request body is not cloneable for retry".to_string(),
                });
            };

            match req.send().await {
                Ok(response) => {
                    let status = response.status().as_u16();
                    if !self.retry.should_retry_status(status) {
                        return Ok(response);
                    }
                    if attempt >= self.retry.max_retries {
                        return Err(ApiError::Transport {
                            message: format!(
                                "server unavailable (HTTP {status}) after {} attempts",
                                attempt + 1
                            ),
                        });
                    }
                    warn!("transient HTTP {status}, retrying (attempt {})", attempt + 1);
                }
                Err(e) if e.is_connect() || e.is_timeout() => {
                    if attempt >= self.retry.max_retries {
                        return Err(ApiError::Transport {
                            message: format!("connection failed after {} attempts: {e}", attempt + 1),
                        });
                    }
                    warn!("connection failure, retrying (attempt {}): {e}", attempt + 1);
                }
                Err(e) => {
                    return Err(ApiError::Transport {
                        message: e.to_string(),
                    });
                }
            }

            tokio::time::sleep(self.retry.backoff_delay(attempt)).await;
            attempt += 1;
        }
    }

    /// Map a non-success status to the matching [`ApiError`] variant.
    async fn check_status(
        response: reqwest::Response,
        id: Option<i64>,
    ) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::NOT_FOUND {
            if let Some(id) = id {
                return Err(ApiError::NotFound { id });
            }
        }

        let body = response.text().await.unwrap_or_default();
        let message = detail_message(&body, status);
        if status.is_client_error() && status != StatusCode::NOT_FOUND {
            Err(ApiError::Validation { message })
        } else {
            Err(ApiError::Protocol { message })
        }
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        response.json().await.map_err(|e| ApiError::Protocol {
            message: format!("malformed response body: {e}"),
        })
    }
}

/// Extract the FastAPI-style `detail` message from an error body, falling
/// back to the raw status line.
fn detail_message(body: &str, status: StatusCode) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("detail")?.as_str().map(String::from))
        .unwrap_or_else(|| format!("HTTP {status}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_schedule() {
        let retry = RetryPolicy::default();
        assert_eq!(retry.backoff_delay(0), Duration::from_millis(300));
        assert_eq!(retry.backoff_delay(1), Duration::from_millis(600));
        assert_eq!(retry.backoff_delay(2), Duration::from_millis(1200));
    }

    #[test]
    fn test_retry_status_whitelist() {
        let retry = RetryPolicy::default();
        assert!(retry.should_retry_status(502));
        assert!(retry.should_retry_status(503));
        assert!(retry.should_retry_status(504));
        assert!(!retry.should_retry_status(500));
        assert!(!retry.should_retry_status(404));
        assert!(!retry.should_retry_status(200));
    }

    #[test]
    fn test_detail_message_extraction() {
        let status = StatusCode::BAD_REQUEST;
        assert_eq!(
            detail_message(r#"{"detail": "Year out of range"}"#, status),
            "Year out of range"
        );
        // FastAPI 422 bodies carry a structured list; fall back to the status.
        assert_eq!(
            detail_message(r#"{"detail": [{"loc": ["Year"]}]}"#, status),
            "HTTP 400 Bad Request"
        );
        assert_eq!(detail_message("not json", status), "HTTP 400 Bad Request");
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = PlanesClient::new(ClientConfig {
            base_url: "http://localhost:8000/".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(client.planes_url(), "http://localhost:8000/planes");
        assert_eq!(client.plane_url(4), "http://localhost:8000/planes/4");
    }
}
