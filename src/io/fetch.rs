use std::io::Read;
use std::time::Duration;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::error::{Error, Result};

/// Default raw-fetch proxy endpoint.
pub const DEFAULT_PROXY_URL: &str = "https://curly-pond-9050.yuush.workers.dev";

/// Characters left unescaped by JavaScript's `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode `value` the way `encodeURIComponent` does.
pub fn encode_uri_component(value: &str) -> String {
    utf8_percent_encode(value, URI_COMPONENT).to_string()
}

/// Retrieves raw bytes for a URL.
///
/// Used for the cover image and for catalog pages. Any closure
/// `Fn(&str) -> Result<Vec<u8>>` is a fetcher, which is how tests stub the network.
pub trait Fetcher {
    fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>>;

    /// Fetch a page and decode it as UTF-8, replacing invalid sequences.
    fn fetch_text(&self, url: &str) -> Result<String> {
        let bytes = self.fetch_bytes(url)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl<F> Fetcher for F
where
    F: Fn(&str) -> Result<Vec<u8>>,
{
    fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        self(url)
    }
}

/// Fetches through a proxy that takes the target as `?url=` and returns its body.
///
/// The proxy exists so pages and images from sites without CORS headers can be
/// read; it also keeps the user agent consistent across requests.
pub struct ProxyFetcher {
    base_url: String,
    agent: ureq::Agent,
}

impl ProxyFetcher {
    /// Create a fetcher for the given proxy base address with a 30 second timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, Duration::from_secs(30))
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            base_url: base_url.into(),
            agent,
        }
    }

    /// The proxy URL that retrieves `url`.
    pub fn raw_url(&self, url: &str) -> String {
        format!(
            "{}/api/raw?url={}",
            self.base_url.trim_end_matches('/'),
            encode_uri_component(url)
        )
    }
}

impl Default for ProxyFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_PROXY_URL)
    }
}

impl Fetcher for ProxyFetcher {
    fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let raw_url = self.raw_url(url);
        tracing::debug!(%url, "fetching through proxy");

        let response = match self.agent.get(&raw_url).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(code, _)) => {
                return Err(Error::fetch(url, format!("HTTP status {code}")));
            }
            Err(ureq::Error::Transport(transport)) => {
                return Err(Error::fetch(url, transport.to_string()));
            }
        };

        let mut data = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut data)
            .map_err(|e| Error::fetch(url, format!("read body: {e}")))?;

        Ok(data)
    }
}
