// src/integrations/http/transport.rs
//
// Raw HTTP GET transport.
//
// ARCHITECTURE:
// - The only place that talks to reqwest for the card-data API
// - Network-level failures become AppError::Transport
// - Non-success statuses are NOT errors here; callers inspect `status`

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::de::DeserializeOwned;

use crate::error::{AppError, AppResult};

const USER_AGENT: &str = concat!("manaprint/", env!("CARGO_PKG_VERSION"));

/// Status and body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status == 429
    }

    /// Decodes the body as JSON after checking the status.
    pub fn json<T: DeserializeOwned>(&self, url: &str) -> AppResult<T> {
        if !self.is_success() {
            return Err(AppError::Upstream {
                status: self.status,
                url: url.to_string(),
            });
        }
        Ok(serde_json::from_slice(&self.body)?)
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str, params: &[(String, String)]) -> AppResult<HttpResponse>;
}

pub struct ReqwestTransport {
    http_client: Client,
}

impl ReqwestTransport {
    pub fn new() -> AppResult<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json;q=0.9,*/*;q=0.8"),
        );

        let http_client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { http_client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str, params: &[(String, String)]) -> AppResult<HttpResponse> {
        let mut request = self.http_client.get(url);
        if !params.is_empty() {
            request = request.query(params);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::Transport(format!("GET {} failed: {}", url, e)))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| AppError::Transport(format!("Reading body of {} failed: {}", url, e)))?
            .to_vec();

        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Rates {
        rates: std::collections::HashMap<String, f64>,
    }

    #[test]
    fn test_json_decodes_success_body() {
        let response = HttpResponse {
            status: 200,
            body: br#"{"rates": {"EUR": 0.91}}"#.to_vec(),
        };
        let rates: Rates = response.json("http://rates").unwrap();
        assert_eq!(rates.rates["EUR"], 0.91);
    }

    #[test]
    fn test_json_rejects_error_status() {
        let response = HttpResponse {
            status: 404,
            body: b"{}".to_vec(),
        };
        let result: AppResult<Rates> = response.json("http://cards");
        assert!(matches!(result, Err(AppError::Upstream { status: 404, .. })));
    }

    #[test]
    fn test_transport_builds() {
        assert!(ReqwestTransport::new().is_ok());
    }
}
