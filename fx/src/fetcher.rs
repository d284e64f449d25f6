//! Source fetcher trait and implementations.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use tracing::debug;

use crate::error::FetchError;

/// Parsed JSON body exactly as the upstream sent it.
pub type RawBody = serde_json::Value;

/// Trait for performing one bounded request against one source.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Make exactly one attempt. Every failure is returned, never raised.
    async fn fetch(&self, url: &str) -> Result<RawBody, FetchError>;
}

/// HTTP fetcher backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TIMEOUT)
    }
}

impl HttpFetcher {
    /// Per-attempt bound used when none is configured.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

    /// Create a fetcher with the given per-attempt timeout.
    pub fn new(timeout: Duration) -> Self {
        Self::with_client(Client::new(), timeout)
    }

    /// Create a fetcher with a custom HTTP client.
    pub fn with_client(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    async fn request(&self, url: &str) -> Result<RawBody, FetchError> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.request_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.request_error(url, e))?;

        serde_json::from_slice(&bytes).map_err(|e| FetchError::InvalidBody {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    fn request_error(&self, url: &str, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
                after: self.timeout,
            }
        } else {
            FetchError::Transport {
                url: url.to_string(),
                message: error.to_string(),
            }
        }
    }
}

#[async_trait]
impl SourceFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<RawBody, FetchError> {
        debug!(url, timeout_ms = self.timeout.as_millis() as u64, "Fetching rates");

        // Dropping the request future on expiry cancels the in-flight call.
        match tokio::time::timeout(self.timeout, self.request(url)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout {
                url: url.to_string(),
                after: self.timeout,
            }),
        }
    }
}

/// Scripted fetcher for testing.
#[cfg(any(test, feature = "test-utils"))]
pub struct MockFetcher {
    responses: dashmap::DashMap<String, Result<RawBody, FetchError>>,
    calls: parking_lot::Mutex<Vec<String>>,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockFetcher {
    /// Create a fetcher with no scripted responses.
    pub fn new() -> Self {
        Self {
            responses: dashmap::DashMap::new(),
            calls: parking_lot::Mutex::new(Vec::new()),
        }
    }

    /// Answer `url` with `body`.
    pub fn respond(&self, url: &str, body: RawBody) {
        self.responses.insert(url.to_string(), Ok(body));
    }

    /// Answer `url` with `error`.
    pub fn fail(&self, url: &str, error: FetchError) {
        self.responses.insert(url.to_string(), Err(error));
    }

    /// Answer `url` with an HTTP error status.
    pub fn fail_with_status(&self, url: &str, status: u16) {
        self.fail(
            url,
            FetchError::Status {
                url: url.to_string(),
                status,
            },
        );
    }

    /// URLs requested so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    /// Number of requests made so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl Default for MockFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl SourceFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<RawBody, FetchError> {
        self.calls.lock().push(url.to_string());
        self.responses
            .get(url)
            .map(|r| r.value().clone())
            .unwrap_or_else(|| {
                Err(FetchError::Transport {
                    url: url.to_string(),
                    message: "no scripted response".to_string(),
                })
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::get, Json, Router};
    use serde_json::json;
    use tokio_test::assert_ok;

    async fn spawn_upstream() -> String {
        let router = Router::new()
            .route(
                "/latest",
                get(|| async { Json(json!({ "base": "USD", "rates": { "EUR": 0.92 } })) }),
            )
            .route(
                "/down",
                get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance") }),
            )
            .route("/html", get(|| async { "<html>not json</html>" }))
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Json(json!({ "rates": {} }))
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_http_fetch_success() {
        let base = spawn_upstream().await;
        let fetcher = HttpFetcher::new(Duration::from_secs(5));

        let body = assert_ok!(fetcher.fetch(&format!("{base}/latest")).await);

        assert_eq!(body["rates"]["EUR"], json!(0.92));
    }

    #[tokio::test]
    async fn test_http_fetch_non_success_status() {
        let base = spawn_upstream().await;
        let fetcher = HttpFetcher::new(Duration::from_secs(5));

        let err = fetcher.fetch(&format!("{base}/down")).await.unwrap_err();

        assert!(matches!(err, FetchError::Status { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_http_fetch_invalid_json() {
        let base = spawn_upstream().await;
        let fetcher = HttpFetcher::new(Duration::from_secs(5));

        let err = fetcher.fetch(&format!("{base}/html")).await.unwrap_err();

        assert!(matches!(err, FetchError::InvalidBody { .. }));
    }

    #[tokio::test]
    async fn test_http_fetch_times_out() {
        let base = spawn_upstream().await;
        let fetcher = HttpFetcher::new(Duration::from_millis(200));

        let started = std::time::Instant::now();
        let err = fetcher.fetch(&format!("{base}/slow")).await.unwrap_err();

        assert!(matches!(err, FetchError::Timeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_http_fetch_connection_refused() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let fetcher = HttpFetcher::new(Duration::from_secs(5));
        let url = format!("http://{addr}/latest");
        let err = fetcher.fetch(&url).await.unwrap_err();

        assert!(matches!(err, FetchError::Transport { .. }));
        assert_eq!(err.url(), url);
    }

    #[tokio::test]
    async fn test_mock_fetcher_records_calls() {
        let fetcher = MockFetcher::new();
        fetcher.respond("https://a.example", json!({ "rates": { "EUR": 1.0 } }));
        fetcher.fail_with_status("https://b.example", 500);

        assert!(fetcher.fetch("https://a.example").await.is_ok());
        assert!(fetcher.fetch("https://b.example").await.is_err());
        assert!(fetcher.fetch("https://unscripted.example").await.is_err());

        assert_eq!(
            fetcher.calls(),
            vec!["https://a.example", "https://b.example", "https://unscripted.example"]
        );
    }
}
