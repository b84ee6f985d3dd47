//! Multipart upload to the ingress endpoint.

use anyhow::{Context, Result};
use std::time::Duration;

use super::token::TokenSource;
use super::Uploader;
use crate::config::IngressConfig;
use crate::http;

/// POSTs each payload as the `file` field of a multipart form to
/// `{ingress_url}/{dataset_guid}`, with a bearer token when client
/// credentials are configured.
pub struct HttpUploader {
    target: String,
    tokens: Option<TokenSource>,
    timeout: Option<Duration>,
}

impl HttpUploader {
    pub fn from_config(cfg: &IngressConfig) -> Self {
        let tokens = if cfg.has_client_credentials() {
            let source = TokenSource::from_config(cfg);
            tracing::debug!(token_url = source.token_url(), "ingress uploads use bearer tokens");
            Some(source)
        } else {
            tracing::warn!("no ingress client credentials configured; uploading without a token");
            None
        };
        Self {
            target: format!(
                "{}/{}",
                cfg.url.trim_end_matches('/'),
                cfg.dataset_guid.trim_matches('/')
            ),
            tokens,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// URL payloads are posted to.
    pub fn target(&self) -> &str {
        &self.target
    }
}

impl Uploader for HttpUploader {
    fn upload(&mut self, filename: &str, payload: &[u8]) -> Result<()> {
        let mut easy = curl::easy::Easy::new();
        easy.url(&self.target).context("invalid ingress URL")?;
        if let Some(timeout) = self.timeout {
            easy.timeout(timeout)?;
        }

        if let Some(tokens) = self.tokens.as_mut() {
            let bearer = tokens.bearer().context("failed to obtain ingress token")?;
            let mut headers = curl::easy::List::new();
            headers.append(&format!("Authorization: Bearer {}", bearer))?;
            easy.http_headers(headers)?;
        }

        let mut form = curl::easy::Form::new();
        form.part("file")
            .buffer(filename, payload.to_vec())
            .content_type("application/octet-stream")
            .add()?;
        easy.httppost(form)?;

        http::perform(&mut easy, &format!("POST {}", filename))
            .with_context(|| format!("upload of {} failed", filename))?;
        tracing::info!(filename, bytes = payload.len(), "uploaded payload");
        Ok(())
    }
}
