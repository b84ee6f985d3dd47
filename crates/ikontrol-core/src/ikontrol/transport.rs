//! Transport seam between the iKontrol client and the network.

use anyhow::{Context, Result};
use std::time::Duration;
use url::Url;

use crate::http;

/// Fetches the raw body behind an iKontrol endpoint URL.
///
/// The client only depends on this trait; [`CurlTransport`] is the production
/// implementation.
pub trait Transport {
    fn get(&self, url: &Url) -> Result<Vec<u8>>;
}

/// libcurl-backed transport with HTTP basic authentication.
///
/// Runs in the current thread and blocks until the response completes.
pub struct CurlTransport {
    username: String,
    password: String,
    timeout: Option<Duration>,
}

impl CurlTransport {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            timeout: None,
        }
    }

    /// Abort requests that take longer than `timeout` in total.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Transport for CurlTransport {
    fn get(&self, url: &Url) -> Result<Vec<u8>> {
        let mut easy = curl::easy::Easy::new();
        easy.url(url.as_str()).context("invalid URL")?;
        easy.get(true)?;
        easy.follow_location(true)?;
        easy.username(&self.username)?;
        easy.password(&self.password)?;
        let mut auth = curl::easy::Auth::new();
        auth.basic(true);
        easy.http_auth(&auth)?;
        if let Some(timeout) = self.timeout {
            easy.timeout(timeout)?;
        }

        tracing::trace!(path = url.path(), "GET");
        http::perform(&mut easy, &format!("GET {}", url.path()))
    }
}
