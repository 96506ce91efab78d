//! HTTP transport for listing and detail pages
//!
//! This module owns the reqwest client and the fetch-with-retry logic. All
//! network failures are classified into [`FetchError`] here; nothing above
//! this layer touches reqwest errors directly.

use crate::config::UserAgentConfig;
use crate::FetchError;
use reqwest::{header, Client};
use std::time::Duration;

/// Retry policy for transient fetch failures
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Re-attempts after the first failure
    pub retries: u32,
    /// Pause between attempts
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(retries: u32, delay_ms: u64) -> Self {
        Self {
            retries,
            delay: Duration::from_millis(delay_ms),
        }
    }

    /// No retries: every failure is permanent on first occurrence.
    pub fn none() -> Self {
        Self::new(0, 0)
    }
}

/// Builds an HTTP client with proper configuration
///
/// The User-Agent is formatted as `CrawlerName/Version (+ContactURL; Email)`
/// so site operators can identify and reach us.
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    let user_agent = format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and returns the response body
///
/// Timeouts and 5xx responses are retried per the policy before the failure
/// is treated as permanent; 4xx responses and connection-level errors fail
/// immediately.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
/// * `policy` - Retry policy for transient failures
pub async fn fetch_document(
    client: &Client,
    url: &str,
    policy: &RetryPolicy,
) -> Result<String, FetchError> {
    let mut attempt = 0;

    loop {
        match try_fetch(client, url).await {
            Ok(body) => return Ok(body),
            Err(err) if err.is_transient() && attempt < policy.retries => {
                attempt += 1;
                tracing::debug!(
                    "Transient failure for {} (attempt {}/{}): {}",
                    url,
                    attempt,
                    policy.retries,
                    err
                );
                tokio::time::sleep(policy.delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}

/// One fetch attempt: GET, status check, body read
async fn try_fetch(client: &Client, url: &str) -> Result<String, FetchError> {
    let response = client
        .get(url)
        .header(header::ACCEPT, "text/html,application/xhtml+xml")
        .send()
        .await
        .map_err(|e| classify_error(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(|e| classify_error(url, e))
}

/// Maps a reqwest error onto the fetch taxonomy
fn classify_error(url: &str, err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if let Some(status) = err.status() {
        FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        }
    } else {
        FetchError::Http {
            url: url.to_string(),
            source: err,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> UserAgentConfig {
        UserAgentConfig {
            crawler_name: "jobtrawl".to_string(),
            crawler_version: "1.0".to_string(),
            contact_url: "https://example.com/about".to_string(),
            contact_email: "admin@example.com".to_string(),
        }
    }

    #[test]
    fn test_build_http_client() {
        let config = create_test_config();
        assert!(build_http_client(&config).is_ok());
    }

    #[test]
    fn test_transient_classification() {
        let timeout = FetchError::Timeout {
            url: "https://example.com".to_string(),
        };
        assert!(timeout.is_transient());

        let server_error = FetchError::Status {
            url: "https://example.com".to_string(),
            status: 503,
        };
        assert!(server_error.is_transient());

        let not_found = FetchError::Status {
            url: "https://example.com".to_string(),
            status: 404,
        };
        assert!(!not_found.is_transient());
    }

    #[tokio::test]
    async fn test_retry_then_success() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(200).set_body_string("recovered"))
            .mount(&server)
            .await;

        let client = build_http_client(&create_test_config()).unwrap();
        let url = format!("{}/flaky", server.uri());
        let body = fetch_document(&client, &url, &RetryPolicy::new(2, 10))
            .await
            .unwrap();
        assert_eq!(body, "recovered");
    }

    #[tokio::test]
    async fn test_client_error_is_permanent() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/gone"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1) // a 404 must not be retried
            .mount(&server)
            .await;

        let client = build_http_client(&create_test_config()).unwrap();
        let url = format!("{}/gone", server.uri());
        let err = fetch_document(&client, &url, &RetryPolicy::new(3, 10))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404, .. }));
    }
}
