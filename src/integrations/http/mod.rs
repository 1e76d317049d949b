// src/integrations/http/mod.rs

pub mod rate_limited_client;
pub mod transport;

pub use rate_limited_client::RateLimitedClient;
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport};
