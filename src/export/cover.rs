//! Cover image resolution.
//!
//! Downloading the cover is the only step allowed to fail without failing the
//! export: on any error the book is built exactly as if no cover were set.

use crate::error::Error;
use crate::io::{Fetcher, LogSink};
use crate::util::{ImageFormat, sniff_image_format};

/// File name of the cover image inside the content folder.
pub const COVER_IMAGE_HREF: &str = "cover.jpg";

/// A downloaded cover image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverImage {
    pub href: &'static str,
    pub media_type: &'static str,
    pub data: Vec<u8>,
}

/// Fetch the cover at `url`, or return `None` if there is no URL or the fetch fails.
///
/// Failures are reported to `log` as `Cover skipped: <reason>`.
pub fn resolve_cover(
    url: Option<&str>,
    fetcher: &dyn Fetcher,
    log: &dyn LogSink,
) -> Option<CoverImage> {
    let url = url?;

    match fetch_cover(url, fetcher) {
        Ok(cover) => {
            tracing::debug!(%url, bytes = cover.data.len(), media_type = cover.media_type, "cover resolved");
            Some(cover)
        }
        Err(e) => {
            let reason = match e {
                Error::Fetch { message, .. } => message,
                other => other.to_string(),
            };
            tracing::debug!(%url, %reason, "cover skipped");
            log.log(&format!("Cover skipped: {reason}"));
            None
        }
    }
}

fn fetch_cover(url: &str, fetcher: &dyn Fetcher) -> crate::Result<CoverImage> {
    let data = fetcher.fetch_bytes(url)?;
    if data.is_empty() {
        return Err(Error::fetch(url, "cover fetch failed: empty response"));
    }

    // The proxy does not forward Content-Type, so trust the bytes.
    let media_type = sniff_image_format(&data)
        .unwrap_or(ImageFormat::Jpeg)
        .mime_type();

    Ok(CoverImage {
        href: COVER_IMAGE_HREF,
        media_type,
        data,
    })
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::Result;
    use crate::io::NullSink;

    const PNG: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];

    #[test]
    fn test_no_url_skips_fetch() {
        let fetcher = |_: &str| -> Result<Vec<u8>> { panic!("should not fetch") };
        assert_eq!(resolve_cover(None, &fetcher, &NullSink), None);
    }

    #[test]
    fn test_success_sniffs_media_type() {
        let fetcher = |_: &str| -> Result<Vec<u8>> { Ok(PNG.to_vec()) };
        let cover = resolve_cover(Some("https://x/c"), &fetcher, &NullSink).unwrap();
        assert_eq!(cover.href, "cover.jpg");
        assert_eq!(cover.media_type, "image/png");
        assert_eq!(cover.data, PNG);
    }

    #[test]
    fn test_unknown_bytes_default_to_jpeg() {
        let fetcher = |_: &str| -> Result<Vec<u8>> { Ok(b"not an image".to_vec()) };
        let cover = resolve_cover(Some("https://x/c"), &fetcher, &NullSink).unwrap();
        assert_eq!(cover.media_type, "image/jpeg");
    }

    #[test]
    fn test_failure_is_logged_and_degrades() {
        let messages = RefCell::new(Vec::new());
        let log = |m: &str| messages.borrow_mut().push(m.to_string());
        let fetcher =
            |url: &str| -> Result<Vec<u8>> { Err(Error::fetch(url, "HTTP status 404")) };

        assert_eq!(resolve_cover(Some("https://x/c"), &fetcher, &log), None);
        assert_eq!(*messages.borrow(), ["Cover skipped: HTTP status 404"]);
    }

    #[test]
    fn test_empty_body_is_a_failure() {
        let messages = RefCell::new(Vec::new());
        let log = |m: &str| messages.borrow_mut().push(m.to_string());
        let fetcher = |_: &str| -> Result<Vec<u8>> { Ok(Vec::new()) };

        assert_eq!(resolve_cover(Some("https://x/c"), &fetcher, &log), None);
        assert!(messages.borrow()[0].starts_with("Cover skipped: "));
    }
}
