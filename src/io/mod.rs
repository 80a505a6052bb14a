//! Collaborators the exporter talks to: the byte fetcher and the progress log.

mod fetch;
mod log;

pub use fetch::{DEFAULT_PROXY_URL, Fetcher, ProxyFetcher, encode_uri_component};
pub use log::{LogSink, NullSink, TracingSink};
