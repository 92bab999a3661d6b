//! Page fetching with retry.
//!
//! The crawler only needs "address in, HTML out or failure". That contract
//! is the [`Fetch`] trait, so the crawler can be driven by the real
//! [`HttpFetcher`] or by an in-memory page map in tests.
//!
//! # Retry Strategy
//!
//! - 2 attempts per address
//! - Exponential backoff starting at 2 seconds
//! - Random jitter (0-250ms) added to each delay
//! - 404 and 410 answers fail immediately as [`FetchError::NotFound`]

use rand::{Rng, rng};
use reqwest::{Client, StatusCode};
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, instrument, warn};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Bodies shorter than this are treated as failed fetches.
pub const MIN_BODY_BYTES: usize = 200;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP status {0}")]
    Status(u16),
    #[error("response too short ({0} bytes)")]
    TooShort(usize),
    #[error("no page for {0}")]
    NotFound(String),
}

/// Anything that can turn an address into raw HTML.
pub trait Fetch {
    async fn fetch(&self, address: &str) -> Result<String, FetchError>;
}

/// HTTP fetcher with browser-like headers, a request timeout and retries.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    attempts: usize,
    base_delay: Duration,
}

impl HttpFetcher {
    /// Build a fetcher with a 15 second timeout, 2 attempts and 2 second backoff.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_settings(Duration::from_secs(15), 2, Duration::from_secs(2))
    }

    pub fn with_settings(
        timeout: Duration,
        attempts: usize,
        base_delay: Duration,
    ) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            attempts: attempts.max(1),
            base_delay,
        })
    }

    async fn fetch_once(&self, address: &str) -> Result<String, FetchError> {
        let response = self.client.get(address).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            return Err(FetchError::NotFound(address.to_string()));
        }
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let body = response.text().await?;
        if body.len() < MIN_BODY_BYTES {
            return Err(FetchError::TooShort(body.len()));
        }
        Ok(body)
    }
}

impl Fetch for HttpFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, address: &str) -> Result<String, FetchError> {
        let t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            match self.fetch_once(address).await {
                Ok(body) => {
                    debug!(
                        bytes = body.len(),
                        elapsed_ms = t0.elapsed().as_millis() as u64,
                        "Fetched page"
                    );
                    return Ok(body);
                }
                // A missing page will not appear on retry.
                Err(e @ FetchError::NotFound(_)) => return Err(e),
                Err(e) => {
                    attempt += 1;
                    if attempt >= self.attempts {
                        return Err(e);
                    }

                    let delay = self.base_delay.saturating_mul(1 << (attempt - 1));
                    let jitter_ms: u64 = rng().random_range(0..=250);
                    let delay = delay + Duration::from_millis(jitter_ms);
                    warn!(attempt, max = self.attempts, ?delay, error = %e, "Fetch attempt failed; backing off");
                    sleep(delay).await;
                }
            }
        }
    }
}
