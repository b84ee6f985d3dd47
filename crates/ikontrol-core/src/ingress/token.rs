//! OAuth2 client-credentials tokens for the ingress endpoint.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::{Duration, Instant};

use crate::config::IngressConfig;
use crate::http;

/// Tokens are renewed this long before they expire.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// A bearer token and when it stops being usable.
#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: Option<Instant>,
}

impl AccessToken {
    fn is_fresh(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(at) => now + EXPIRY_MARGIN < at,
            None => true,
        }
    }
}

/// Fetches tokens from `{authority}/{tenant}/oauth2/v2.0/token` and caches
/// the current one until shortly before it expires.
pub struct TokenSource {
    token_url: String,
    client_id: String,
    client_secret: String,
    scope: String,
    cached: Option<AccessToken>,
}

impl TokenSource {
    pub fn from_config(cfg: &IngressConfig) -> Self {
        Self {
            token_url: format!(
                "{}/{}/oauth2/v2.0/token",
                cfg.authority_url.trim_end_matches('/'),
                cfg.tenant_id
            ),
            client_id: cfg.client_id.clone(),
            client_secret: cfg.client_secret.clone(),
            scope: cfg.scope.clone(),
            cached: None,
        }
    }

    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    /// Current token, requesting a new one when none is cached or it is about to expire.
    pub fn bearer(&mut self) -> Result<&str> {
        let now = Instant::now();
        let fresh = self.cached.as_ref().is_some_and(|t| t.is_fresh(now));
        if !fresh {
            let token = self.request(now)?;
            tracing::debug!("acquired ingress access token");
            self.cached = Some(token);
        }
        match &self.cached {
            Some(token) => Ok(token.value.as_str()),
            None => anyhow::bail!("no access token"),
        }
    }

    fn form_body(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .append_pair("grant_type", "client_credentials")
            .append_pair("client_id", &self.client_id)
            .append_pair("client_secret", &self.client_secret)
            .append_pair("scope", &self.scope)
            .finish()
    }

    fn request(&self, now: Instant) -> Result<AccessToken> {
        let mut easy = curl::easy::Easy::new();
        easy.url(&self.token_url).context("invalid token URL")?;
        easy.post(true)?;
        easy.post_fields_copy(self.form_body().as_bytes())?;

        let body = http::perform(&mut easy, "POST token")?;
        parse_token(&body, now)
    }
}

fn parse_token(body: &[u8], now: Instant) -> Result<AccessToken> {
    let resp: TokenResponse =
        serde_json::from_slice(body).context("malformed token response")?;
    Ok(AccessToken {
        value: resp.access_token,
        expires_at: resp.expires_in.map(|secs| now + Duration::from_secs(secs)),
    })
}
