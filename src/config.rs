//! User configuration, read from a TOML file.
//!
//! Every key is optional:
//!
//! ```toml
//! proxy_url = "https://curly-pond-9050.yuush.workers.dev"
//! language = "en"
//! compression_level = 9
//! timeout_secs = 30
//! fetch_cover = true
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::export::EpubConfig;
use crate::io::{DEFAULT_PROXY_URL, ProxyFetcher};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Base address of the raw-fetch proxy.
    pub proxy_url: String,
    /// `dc:language` written to the package.
    pub language: String,
    /// Deflate level for every entry except `mimetype`.
    pub compression_level: i64,
    /// Per-request timeout for the proxy.
    pub timeout_secs: u64,
    /// Download the cover image when the record has one.
    pub fetch_cover: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            proxy_url: DEFAULT_PROXY_URL.to_string(),
            language: "en".to_string(),
            compression_level: 9,
            timeout_secs: 30,
            fetch_cover: true,
        }
    }
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Exporter settings derived from this config.
    pub fn epub_config(&self) -> EpubConfig {
        EpubConfig {
            compression_level: self.compression_level,
            language: self.language.clone(),
            fetch_cover: self.fetch_cover,
            ..EpubConfig::default()
        }
    }

    /// A proxy fetcher using the configured address and timeout.
    pub fn fetcher(&self) -> ProxyFetcher {
        ProxyFetcher::with_timeout(&self.proxy_url, Duration::from_secs(self.timeout_secs))
    }
}
