// src/integrations/http/rate_limited_client.rs
//
// Rate-limited GET client for the card-data and exchange-rate services.
//
// CRITICAL RULES:
// - Requests are counted per client; share one client (Arc) to share the budget
// - Every N-th request is followed by the mandatory pause
// - 429 answers are retried with exponential backoff: pause * 2^attempt
// - Exhausted retries return the last response as-is; callers check the status
// - Every request is followed by the fixed smoothing delay
// - Network errors propagate untouched; callers choose the fallback

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use log::{info, warn};

use crate::config::RateLimitPolicy;
use crate::error::AppResult;
use crate::integrations::http::transport::{HttpResponse, HttpTransport};

pub struct RateLimitedClient {
    transport: Arc<dyn HttpTransport>,
    policy: RateLimitPolicy,
    request_count: AtomicU64,
}

impl RateLimitedClient {
    pub fn new(transport: Arc<dyn HttpTransport>, policy: RateLimitPolicy) -> Self {
        Self {
            transport,
            policy,
            request_count: AtomicU64::new(0),
        }
    }

    pub fn policy(&self) -> &RateLimitPolicy {
        &self.policy
    }

    /// Requests issued so far through this client (retries excluded).
    pub fn request_count(&self) -> u64 {
        self.request_count.load(Ordering::SeqCst)
    }

    pub async fn get(&self, url: &str, params: &[(String, String)]) -> AppResult<HttpResponse> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst) + 1;
        let attempts = self.policy.max_retries.max(1);

        let mut attempt = 0;
        let response = loop {
            let response = self.transport.get(url, params).await?;
            if !response.is_rate_limited() || attempt + 1 >= attempts {
                break response;
            }

            let backoff = self.policy.pause.saturating_mul(2u32.saturating_pow(attempt));
            warn!(
                "429 received for {}. Retrying in {:?} (attempt {} of {})",
                url,
                backoff,
                attempt + 1,
                attempts
            );
            tokio::time::sleep(backoff).await;
            attempt += 1;
        };

        if response.is_rate_limited() {
            warn!("Retries exhausted for {}; returning the 429 response", url);
        }

        if self.policy.request_limit > 0 && count % self.policy.request_limit == 0 {
            info!(
                "Request budget of {} reached; pausing for {:?}",
                self.policy.request_limit, self.policy.pause
            );
            tokio::time::sleep(self.policy.pause).await;
        }

        tokio::time::sleep(self.policy.delay_between).await;
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::integrations::http::transport::MockHttpTransport;
    use std::time::Duration;
    use tokio::time::Instant;

    fn policy() -> RateLimitPolicy {
        RateLimitPolicy {
            request_limit: 200,
            pause: Duration::from_secs(60),
            delay_between: Duration::from_millis(100),
            max_retries: 3,
        }
    }

    fn ok() -> HttpResponse {
        HttpResponse {
            status: 200,
            body: b"{}".to_vec(),
        }
    }

    fn throttled() -> HttpResponse {
        HttpResponse {
            status: 429,
            body: Vec::new(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_sleeps_only_the_smoothing_delay() {
        let mut transport = MockHttpTransport::new();
        transport.expect_get().times(1).returning(|_, _| Ok(ok()));
        let client = RateLimitedClient::new(Arc::new(transport), policy());

        let start = Instant::now();
        let response = client.get("http://cards", &[]).await.unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(start.elapsed(), Duration::from_millis(100));
        assert_eq!(client.request_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_throttling_backs_off_exponentially() {
        let mut transport = MockHttpTransport::new();
        let mut calls = 0;
        transport.expect_get().times(3).returning(move |_, _| {
            calls += 1;
            Ok(if calls < 3 { throttled() } else { ok() })
        });
        let client = RateLimitedClient::new(Arc::new(transport), policy());

        let start = Instant::now();
        let response = client.get("http://cards", &[]).await.unwrap();

        assert_eq!(response.status, 200);
        // 60 * 2^0 + 60 * 2^1 + smoothing delay
        assert_eq!(start.elapsed(), Duration::from_millis(180_100));
        assert_eq!(client.request_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_retries_return_last_response() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_get()
            .times(3)
            .returning(|_, _| Ok(throttled()));
        let client = RateLimitedClient::new(Arc::new(transport), policy());

        let response = client.get("http://cards", &[]).await.unwrap();
        assert_eq!(response.status, 429);
    }

    #[tokio::test(start_paused = true)]
    async fn test_long_retry_runs_do_not_overflow_the_backoff() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_get()
            .times(40)
            .returning(|_, _| Ok(throttled()));
        let client = RateLimitedClient::new(
            Arc::new(transport),
            RateLimitPolicy {
                pause: Duration::ZERO,
                max_retries: 40,
                ..policy()
            },
        );

        let response = client.get("http://cards", &[]).await.unwrap();
        assert_eq!(response.status, 429);
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_nth_request_pauses_after_completion() {
        let mut transport = MockHttpTransport::new();
        transport.expect_get().times(3).returning(|_, _| Ok(ok()));
        let client = RateLimitedClient::new(
            Arc::new(transport),
            RateLimitPolicy {
                request_limit: 3,
                ..policy()
            },
        );

        let start = Instant::now();
        client.get("http://cards", &[]).await.unwrap();
        client.get("http://cards", &[]).await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_millis(200));

        client.get("http://cards", &[]).await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_millis(60_300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_network_errors_propagate() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_get()
            .times(1)
            .returning(|_, _| Err(AppError::Transport("connection reset".to_string())));
        let client = RateLimitedClient::new(Arc::new(transport), policy());

        let result = client.get("http://cards", &[]).await;
        assert!(matches!(result, Err(AppError::Transport(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_params_are_forwarded() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_get()
            .withf(|url: &str, params: &[(String, String)]| {
                url == "http://cards/named"
                    && params.to_vec() == vec![("exact".to_string(), "Anger".to_string())]
            })
            .times(1)
            .returning(|_, _| Ok(ok()));
        let client = RateLimitedClient::new(Arc::new(transport), policy());

        let params = vec![("exact".to_string(), "Anger".to_string())];
        assert!(client.get("http://cards/named", &params).await.is_ok());
    }
}
