//! # Client configuration
//!
//! [`ApiConfig`] says where the wiki API lives and how patient the client is
//! with it. On native builds it is layered with the `config` crate:
//!
//! 1. built-in defaults,
//! 2. an optional `wiki.toml` in the working directory,
//! 3. `WIKI_*` environment variables (a `.env` file is loaded first).
//!
//! ```toml
//! api_base_url = "https://wiki.example.org/api"
//! request_timeout_secs = 15
//! read_retries = 2
//! stale_after_secs = 30
//! gc_after_secs = 300
//! ```
//!
//! Web builds have no filesystem or process environment; the base URL is taken
//! from `WIKI_API_BASE_URL` at compile time and everything else uses defaults.

use std::time::Duration;

use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
const DEFAULT_TIMEOUT_SECS: u64 = 15;
const DEFAULT_READ_RETRIES: u32 = 2;
const DEFAULT_STALE_AFTER_SECS: i64 = 30;
const DEFAULT_GC_AFTER_SECS: i64 = 300;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiConfig {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    /// Extra attempts for failed reads. Mutations are never retried.
    pub read_retries: u32,
    /// Cached reads older than this are re-fetched.
    pub stale_after_secs: i64,
    /// Cached reads older than this are dropped.
    pub gc_after_secs: i64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_base_url: option_env!("WIKI_API_BASE_URL")
                .unwrap_or(DEFAULT_BASE_URL)
                .to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            read_retries: DEFAULT_READ_RETRIES,
            stale_after_secs: DEFAULT_STALE_AFTER_SECS,
            gc_after_secs: DEFAULT_GC_AFTER_SECS,
        }
    }
}

impl ApiConfig {
    /// Load the configuration for this platform, falling back to defaults.
    pub fn load() -> Self {
        #[cfg(not(target_arch = "wasm32"))]
        {
            match Self::from_sources() {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("invalid client configuration, using defaults: {e}");
                    Self::default()
                }
            }
        }
        #[cfg(target_arch = "wasm32")]
        {
            Self::default()
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn from_sources() -> Result<Self, config::ConfigError> {
        use config::{Config, Environment, File, FileFormat};

        dotenvy::dotenv().ok();
        let defaults = Self::default();

        Config::builder()
            .set_default("api_base_url", defaults.api_base_url)?
            .set_default("request_timeout_secs", defaults.request_timeout_secs as i64)?
            .set_default("read_retries", i64::from(defaults.read_retries))?
            .set_default("stale_after_secs", defaults.stale_after_secs)?
            .set_default("gc_after_secs", defaults.gc_after_secs)?
            .add_source(
                File::with_name("wiki")
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(Environment::with_prefix("WIKI"))
            .build()?
            .try_deserialize()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use std::env::set_var;

    #[test]
    fn test_env_overrides_defaults() {
        set_var("WIKI_API_BASE_URL", "https://wiki.test/api/");
        set_var("WIKI_READ_RETRIES", "4");
        let config = ApiConfig::from_sources().unwrap();
        assert_eq!(config.base_url(), "https://wiki.test/api");
        assert_eq!(config.read_retries, 4);
        assert_eq!(config.request_timeout(), Duration::from_secs(15));
    }
}
