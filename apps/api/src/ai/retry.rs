use std::time::Duration;

use reqwest::{RequestBuilder, Response, StatusCode};
use tracing::warn;

/// Capped exponential backoff for provider calls.
///
/// Retries on 429/503 and on transport errors. After `max_retries` the last
/// response (or error) is handed back unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// `base * 2^attempt`, attempt counted from 0.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt)
    }

    pub fn is_retryable(status: StatusCode) -> bool {
        status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::SERVICE_UNAVAILABLE
    }

    /// Sends the request built by `build`, rebuilding it for each attempt.
    pub async fn send<F>(&self, label: &str, build: F) -> Result<Response, reqwest::Error>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut attempt = 0;
        loop {
            let delay = self.delay_for(attempt);
            match build().send().await {
                Ok(response) if Self::is_retryable(response.status()) && attempt < self.max_retries => {
                    warn!(
                        "[{label}] {} error, retrying in {}ms (attempt {}/{})",
                        response.status().as_u16(),
                        delay.as_millis(),
                        attempt + 1,
                        self.max_retries
                    );
                }
                Ok(response) => return Ok(response),
                Err(e) if attempt < self.max_retries => {
                    let e = e.without_url();
                    warn!(
                        "[{label}] network error ({e}), retrying in {}ms (attempt {}/{})",
                        delay.as_millis(),
                        attempt + 1,
                        self.max_retries
                    );
                }
                Err(e) => return Err(e),
            }
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delays_double_from_one_second() {
        let policy = RetryPolicy::default();
        let delays: Vec<u128> = (0..3).map(|a| policy.delay_for(a).as_millis()).collect();
        assert_eq!(delays, vec![1000, 2000, 4000]);
    }

    #[test]
    fn test_only_rate_limit_and_unavailable_retry() {
        assert!(RetryPolicy::is_retryable(StatusCode::TOO_MANY_REQUESTS));
        assert!(RetryPolicy::is_retryable(StatusCode::SERVICE_UNAVAILABLE));
        assert!(!RetryPolicy::is_retryable(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(!RetryPolicy::is_retryable(StatusCode::BAD_REQUEST));
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/busy")
            .with_status(503)
            .expect(3)
            .create_async()
            .await;

        let policy = RetryPolicy {
            max_retries: 2,
            base_delay: Duration::from_millis(1),
        };
        let client = reqwest::Client::new();
        let url = format!("{}/busy", server.url());
        let response = policy.send("test", || client.post(&url)).await.unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_client_errors_are_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/bad")
            .with_status(400)
            .expect(1)
            .create_async()
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/bad", server.url());
        let response = RetryPolicy::default()
            .send("test", || client.post(&url))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_transport_errors_are_retried() {
        let policy = RetryPolicy {
            max_retries: 2,
            base_delay: Duration::from_millis(1),
        };
        let client = reqwest::Client::new();
        let attempts = std::sync::atomic::AtomicU32::new(0);

        let result = policy
            .send("test", || {
                attempts.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                client.post("http://127.0.0.1:9/closed")
            })
            .await;

        assert!(result.unwrap_err().is_connect());
        assert_eq!(attempts.load(std::sync::atomic::Ordering::SeqCst), 3);
    }
}
