//! iKontrol endpoint URLs: `{base}/{version}/{key}/{Resource}/{Action}?params`.

use anyhow::{Context, Result};
use url::Url;

/// Fixed prefix shared by every endpoint of one iKontrol account.
#[derive(Debug, Clone)]
pub struct ApiBase {
    url: String,
    version: String,
    key: String,
}

impl ApiBase {
    pub fn new(url: &str, version: &str, key: &str) -> Self {
        Self {
            url: url.trim().trim_end_matches('/').to_string(),
            version: version.trim().trim_matches('/').to_string(),
            key: key.trim().trim_matches('/').to_string(),
        }
    }

    /// Full URL for `resource/action` with `params` appended as a query string in order.
    pub fn endpoint(&self, resource: &str, action: &str, params: &[(&str, String)]) -> Result<Url> {
        let raw = format!(
            "{}/{}/{}/{}/{}",
            self.url, self.version, self.key, resource, action
        );
        let mut url = Url::parse(&raw).with_context(|| format!("invalid API URL for {resource}/{action}"))?;
        if !params.is_empty() {
            let mut query = url.query_pairs_mut();
            for (name, value) in params {
                query.append_pair(name, value);
            }
        }
        Ok(url)
    }
}
