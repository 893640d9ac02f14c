//! Service configuration.
//!
//! Settings are read from an optional JSON file (`REPORT_FORGE_CONFIG`,
//! default `config.json`) and then overridden from the environment. Secrets
//! are only ever taken from the environment.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

pub const DEFAULT_CONFIG_PATH: &str = "config.json";

#[derive(Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub bind_addr: String,
    /// LLM model identifier, as OpenRouter names it.
    pub model: String,
    pub openrouter_base_url: String,
    pub max_tokens: u32,
    pub extraction_timeout_secs: u64,
    pub vercel_api_url: String,
    pub deploy_timeout_secs: u64,
    pub retry_delay_ms: u64,
    /// Directory holding the dashboard sources shipped with every deployment.
    pub template_dir: PathBuf,
    #[serde(skip)]
    pub openrouter_api_key: Option<String>,
    #[serde(skip)]
    pub vercel_token: Option<String>,
    #[serde(skip)]
    pub vercel_team_id: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            model: "google/gemini-2.5-pro".to_string(),
            openrouter_base_url: "https://openrouter.ai/api/v1".to_string(),
            max_tokens: 16384,
            extraction_timeout_secs: 180,
            vercel_api_url: "https://api.vercel.com".to_string(),
            deploy_timeout_secs: 120,
            retry_delay_ms: 1000,
            template_dir: PathBuf::from("template"),
            openrouter_api_key: None,
            vercel_token: None,
            vercel_team_id: None,
        }
    }
}

impl std::fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("bind_addr", &self.bind_addr)
            .field("model", &self.model)
            .field("openrouter_base_url", &self.openrouter_base_url)
            .field("max_tokens", &self.max_tokens)
            .field("extraction_timeout_secs", &self.extraction_timeout_secs)
            .field("vercel_api_url", &self.vercel_api_url)
            .field("deploy_timeout_secs", &self.deploy_timeout_secs)
            .field("retry_delay_ms", &self.retry_delay_ms)
            .field("template_dir", &self.template_dir)
            .field(
                "openrouter_api_key",
                &self.openrouter_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "vercel_token",
                &self.vercel_token.as_ref().map(|_| "[redacted]"),
            )
            .field("vercel_team_id", &self.vercel_team_id)
            .finish()
    }
}

impl ServiceConfig {
    /// Load from the config file named by `REPORT_FORGE_CONFIG`, then apply
    /// environment overrides.
    pub fn load() -> Result<Self> {
        let path = std::env::var("REPORT_FORGE_CONFIG")
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::from_file(Path::new(&path))?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Read a JSON config file. A missing file yields the defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {:?}", path))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config: {:?}", path))?;
        info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Override settings from environment variables (looked up via `var`).
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = non_empty("BIND_ADDR") {
            self.bind_addr = v;
        }
        if let Some(v) = non_empty("LLM_MODEL") {
            self.model = v;
        }
        if let Some(v) = non_empty("OPENROUTER_BASE_URL") {
            self.openrouter_base_url = v;
        }
        if let Some(v) = non_empty("VERCEL_API_URL") {
            self.vercel_api_url = v;
        }
        if let Some(v) = non_empty("TEMPLATE_DIR") {
            self.template_dir = PathBuf::from(v);
        }
        self.openrouter_api_key = non_empty("OPENROUTER_API_KEY");
        self.vercel_token = non_empty("VERCEL_DEPLOY_TOKEN");
        self.vercel_team_id = non_empty("VERCEL_TEAM_ID");
    }

    pub fn extraction_timeout(&self) -> Duration {
        Duration::from_secs(self.extraction_timeout_secs)
    }

    pub fn deploy_timeout(&self) -> Duration {
        Duration::from_secs(self.deploy_timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}
