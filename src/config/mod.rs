//! Configuration management for NutriLog

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, Result};
use crate::query::QueryOptions;
use crate::query::options::{
    DEFAULT_CACHE_TIME, DEFAULT_RETRY, DEFAULT_RETRY_DELAY, DEFAULT_STALE_TIME,
};

/// Overrides the Supabase project URL (used by tests against a mock server)
pub const ENV_SUPABASE_URL: &str = "NUTRILOG_SUPABASE_URL";

/// Overrides the AI endpoint base URL
pub const ENV_AI_BASE_URL: &str = "NUTRILOG_AI_BASE_URL";

const DEFAULT_AI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_AI_MODEL: &str = "gpt-4o-mini";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Supabase project URL, e.g. `https://abc.supabase.co`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supabase_url: Option<String>,

    /// Supabase anon (public) key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supabase_key: Option<String>,

    /// User session token. Falls back to the anon key when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    /// Authenticated user id (row owner for every table)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    #[serde(default)]
    pub ai: AiConfig,

    #[serde(default)]
    pub query: QuerySettings,

    #[serde(default)]
    pub preferences: Preferences,
}

/// Food analysis endpoint (any OpenAI-compatible chat-completions API)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_ai_base_url")]
    pub base_url: String,

    #[serde(default = "default_ai_model")]
    pub model: String,
}

fn default_ai_base_url() -> String {
    DEFAULT_AI_BASE_URL.to_string()
}

fn default_ai_model() -> String {
    DEFAULT_AI_MODEL.to_string()
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_ai_base_url(),
            model: default_ai_model(),
        }
    }
}

/// Tuning for cached reads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuerySettings {
    #[serde(default = "default_stale_time_ms")]
    pub stale_time_ms: u64,

    #[serde(default = "default_cache_time_ms")]
    pub cache_time_ms: u64,

    #[serde(default = "default_retry")]
    pub retry: u32,

    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

fn default_stale_time_ms() -> u64 {
    DEFAULT_STALE_TIME.as_millis() as u64
}

fn default_cache_time_ms() -> u64 {
    DEFAULT_CACHE_TIME.as_millis() as u64
}

fn default_retry() -> u32 {
    DEFAULT_RETRY
}

fn default_retry_delay_ms() -> u64 {
    DEFAULT_RETRY_DELAY.as_millis() as u64
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            stale_time_ms: default_stale_time_ms(),
            cache_time_ms: default_cache_time_ms(),
            retry: default_retry(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl QuerySettings {
    /// Apply these settings on top of a set of query options
    pub fn apply<T>(&self, options: QueryOptions<T>) -> QueryOptions<T> {
        options
            .stale_time(Duration::from_millis(self.stale_time_ms))
            .cache_time(Duration::from_millis(self.cache_time_ms))
            .retry(self.retry)
            .retry_delay(Duration::from_millis(self.retry_delay_ms))
    }
}

/// User preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preferences {
    /// Default output format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Allow spinners when the terminal supports them
    #[serde(default = "default_animations")]
    pub animations: bool,
}

fn default_animations() -> bool {
    true
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            format: None,
            animations: default_animations(),
        }
    }
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".nutrilog").join("config.yaml"))
    }

    /// The explicit path if one was given, otherwise the default
    pub fn resolve_path(path: Option<&str>) -> Result<PathBuf> {
        match path {
            Some(p) => Ok(PathBuf::from(p)),
            None => Self::default_path(),
        }
    }

    /// Load configuration from `path` (or the default path), then apply
    /// environment overrides
    pub fn load_at(path: Option<&str>) -> Result<Self> {
        let mut config = Self::load_from(&Self::resolve_path(path)?)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound.into());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;

        Ok(config)
    }

    /// Save configuration to `path` (or the default path)
    pub fn save_at(&self, path: Option<&str>) -> Result<()> {
        self.save_to(&Self::resolve_path(path)?)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents =
            serde_yaml::to_string(self).map_err(|e| ConfigError::SaveError(e.to_string()))?;

        std::fs::write(path, contents)?;

        // Credentials live here: owner read/write only
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(path, perms)?;
        }

        Ok(())
    }

    /// Environment variables take precedence over the file
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(ENV_SUPABASE_URL) {
            if !url.is_empty() {
                self.supabase_url = Some(url);
            }
        }
        if let Ok(url) = std::env::var(ENV_AI_BASE_URL) {
            if !url.is_empty() {
                self.ai.base_url = url;
            }
        }
    }

    /// Require Supabase credentials and a user id
    pub fn validate_store(&self) -> Result<()> {
        if self.supabase_url.is_none() || self.supabase_key.is_none() {
            return Err(ConfigError::MissingSupabase.into());
        }
        if self.user_id.is_none() {
            return Err(ConfigError::MissingUserId.into());
        }
        Ok(())
    }

    /// Require an AI key
    pub fn validate_ai(&self) -> Result<()> {
        if self.ai.api_key.is_none() {
            return Err(ConfigError::MissingAiKey.into());
        }
        Ok(())
    }

    /// The configured user id
    pub fn user_id(&self) -> Result<&str> {
        self.user_id
            .as_deref()
            .ok_or_else(|| ConfigError::MissingUserId.into())
    }

    /// Expiry of the session token, read from its `exp` claim
    pub fn token_expires_at(&self) -> Option<DateTime<Utc>> {
        self.access_token.as_deref().and_then(jwt_expiry)
    }

    /// Check if the session token is expired or will expire soon (within 5 minutes).
    /// Tokens without a readable `exp` claim are treated as expired.
    pub fn is_token_expired(&self) -> bool {
        match self.token_expires_at() {
            None => true,
            Some(expires_at) => {
                let buffer = chrono::Duration::minutes(5);
                expires_at - buffer < Utc::now()
            }
        }
    }
}

/// Read the `exp` claim of a JWT without verifying it
pub fn jwt_expiry(token: &str) -> Option<DateTime<Utc>> {
    use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};

    #[derive(Deserialize)]
    struct Claims {
        exp: i64,
    }

    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: Claims = serde_json::from_slice(&bytes).ok()?;
    DateTime::from_timestamp(claims.exp, 0)
}
