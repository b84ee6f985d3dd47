use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::bundle::BundleStrategy;

/// Cutoff used when no `from_date` is configured: everything upstream has.
pub const DEFAULT_FROM_DATE: &str = "1970-01-01";

fn default_from_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or(NaiveDate::MIN)
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        ""
    } else {
        "***"
    }
}

fn default_authority_url() -> String {
    "https://login.microsoftonline.com".to_string()
}

fn default_scope() -> String {
    "https://storage.azure.com/.default".to_string()
}

/// Upstream iKontrol API (`[api]` section).
#[derive(Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL, e.g. `https://api.ikontrol.dk`.
    #[serde(default)]
    pub url: String,
    /// API version path segment.
    #[serde(default)]
    pub version: String,
    /// API key path segment.
    #[serde(default)]
    pub key: String,
    /// Basic-auth user.
    #[serde(default)]
    pub username: String,
    /// Basic-auth password.
    #[serde(default)]
    pub password: String,
    /// Passed straight through as `from` to scheme and task listings.
    #[serde(default = "default_from_date")]
    pub from_date: NaiveDate,
    /// Whole-request timeout in seconds (None = wait indefinitely).
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("url", &self.url)
            .field("version", &self.version)
            .field("key", &redact(&self.key))
            .field("username", &self.username)
            .field("password", &redact(&self.password))
            .field("from_date", &self.from_date)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            version: String::new(),
            key: String::new(),
            username: String::new(),
            password: String::new(),
            from_date: default_from_date(),
            timeout_secs: None,
        }
    }
}

/// Downstream ingestion endpoint (`[ingress]` section).
#[derive(Clone, Serialize, Deserialize)]
pub struct IngressConfig {
    /// Ingress base URL; payloads are posted to `{url}/{dataset_guid}`.
    #[serde(default)]
    pub url: String,
    /// Target dataset identifier.
    #[serde(default)]
    pub dataset_guid: String,
    /// OAuth2 client-credentials settings. Upload is unauthenticated when any is empty.
    #[serde(default)]
    pub tenant_id: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default = "default_authority_url")]
    pub authority_url: String,
    #[serde(default = "default_scope")]
    pub scope: String,
}

impl fmt::Debug for IngressConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngressConfig")
            .field("url", &self.url)
            .field("dataset_guid", &self.dataset_guid)
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &redact(&self.client_secret))
            .field("authority_url", &self.authority_url)
            .field("scope", &self.scope)
            .finish()
    }
}

impl IngressConfig {
    /// True when tenant, client id and secret are all present.
    pub fn has_client_credentials(&self) -> bool {
        !self.tenant_id.is_empty() && !self.client_id.is_empty() && !self.client_secret.is_empty()
    }
}

impl Default for IngressConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            dataset_guid: String::new(),
            tenant_id: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            authority_url: default_authority_url(),
            scope: default_scope(),
        }
    }
}

/// How each project's payload is produced (`[bundle]` section).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BundleConfig {
    #[serde(default)]
    pub strategy: BundleStrategy,
    /// Where staging directories and archives are created (None = system temp dir).
    #[serde(default)]
    pub work_dir: Option<PathBuf>,
}

impl BundleConfig {
    pub fn work_dir(&self) -> PathBuf {
        self.work_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

/// Configuration loaded from `~/.config/ikontrol-ingress/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdapterConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub ingress: IngressConfig,
    #[serde(default)]
    pub bundle: BundleConfig,
}

impl AdapterConfig {
    /// Overlay secrets from a credentials file onto this config.
    pub fn apply_credentials(&mut self, creds: Credentials) {
        let ik = creds.ikontrol;
        if let Some(key) = ik.api_key {
            self.api.key = key;
        }
        if let Some(user) = ik.username {
            self.api.username = user;
        }
        if let Some(pass) = ik.password {
            self.api.password = pass;
        }
        let auth = creds.authorization;
        if let Some(tenant) = auth.tenant_id {
            self.ingress.tenant_id = tenant;
        }
        if let Some(client) = auth.client_id {
            self.ingress.client_id = client;
        }
        if let Some(secret) = auth.client_secret {
            self.ingress.client_secret = secret;
        }
    }

    /// Check the fields needed to talk to iKontrol.
    pub fn validate_api(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.api.url.trim().is_empty() {
            missing.push("api.url");
        }
        if self.api.version.trim().is_empty() {
            missing.push("api.version");
        }
        if self.api.key.trim().is_empty() {
            missing.push("api.key");
        }
        if self.api.username.is_empty() {
            missing.push("api.username");
        }
        if !missing.is_empty() {
            anyhow::bail!("missing configuration: {}", missing.join(", "));
        }
        Ok(())
    }

    /// Check everything a full ingestion run needs, including the ingress target.
    pub fn validate(&self) -> Result<()> {
        self.validate_api()?;
        let mut missing = Vec::new();
        if self.ingress.url.trim().is_empty() {
            missing.push("ingress.url");
        }
        if self.ingress.dataset_guid.trim().is_empty() {
            missing.push("ingress.dataset_guid");
        }
        if !missing.is_empty() {
            anyhow::bail!("missing configuration: {}", missing.join(", "));
        }
        Ok(())
    }
}

/// Secrets kept apart from `config.toml` (`credentials.toml`).
#[derive(Clone, Default, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub ikontrol: IKontrolCredentials,
    #[serde(default)]
    pub authorization: AuthorizationCredentials,
}

#[derive(Clone, Default, Deserialize)]
pub struct IKontrolCredentials {
    pub api_key: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Clone, Default, Deserialize)]
pub struct AuthorizationCredentials {
    pub tenant_id: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("ikontrol-ingress")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// `credentials.toml` next to the given config file.
pub fn credentials_path_for(config_path: &Path) -> PathBuf {
    config_path.with_file_name("credentials.toml")
}

/// Load configuration from the XDG config dir, creating a default file if none exists.
pub fn load_or_init() -> Result<AdapterConfig> {
    load_or_init_at(&config_path()?)
}

/// Load `path`, writing a default config there first when it is missing.
/// `credentials.toml` beside it is applied either way.
pub fn load_or_init_at(path: &Path) -> Result<AdapterConfig> {
    if path.exists() {
        return load_from_path(path);
    }
    let mut cfg = AdapterConfig::default();
    let toml = toml::to_string_pretty(&cfg)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, toml).with_context(|| format!("write config {}", path.display()))?;
    tracing::info!("created default config at {}", path.display());
    overlay_credentials(&mut cfg, path)?;
    Ok(cfg)
}

/// Load `path` and overlay `credentials.toml` from the same directory if present.
pub fn load_from_path(path: &Path) -> Result<AdapterConfig> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let mut cfg: AdapterConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    overlay_credentials(&mut cfg, path)?;
    Ok(cfg)
}

fn overlay_credentials(cfg: &mut AdapterConfig, config_path: &Path) -> Result<()> {
    let creds_path = credentials_path_for(config_path);
    if !creds_path.exists() {
        return Ok(());
    }
    let data = fs::read_to_string(&creds_path)
        .with_context(|| format!("read credentials {}", creds_path.display()))?;
    let creds: Credentials = toml::from_str(&data)
        .with_context(|| format!("parse credentials {}", creds_path.display()))?;
    cfg.apply_credentials(creds);
    tracing::debug!("applied credentials from {}", creds_path.display());
    Ok(())
}
