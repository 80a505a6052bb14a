//! Small helpers shared by the exporter: clocks, identifiers, image sniffing.

use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, SecondsFormat, Utc};

/// Get a time-based seed value for pseudo-random number generation.
pub fn time_seed_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(12345)
}

/// Generate a simple UUID v4 (random) from a seed.
pub fn uuid_v4(seed: u64) -> String {
    // Simple PRNG for UUID generation (not cryptographically secure, but fine for identifiers)
    let mut state = seed;
    let mut bytes = [0u8; 16];
    for byte in &mut bytes {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
        *byte = (state >> 33) as u8;
    }

    // Set version (4) and variant (2)
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;

    let hex: String = bytes.iter().map(|b| format!("{:02x}", b)).collect();
    format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    )
}

/// Format a UTC instant as `YYYY-MM-DDThh:mm:ssZ`, the shape `dcterms:modified` requires.
pub fn modified_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Image formats a downloaded cover may arrive in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    WebP,
}

impl ImageFormat {
    /// Get the MIME type string for this format.
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
            ImageFormat::Gif => "image/gif",
            ImageFormat::WebP => "image/webp",
        }
    }
}

/// Detect an image format from its magic bytes.
pub fn sniff_image_format(data: &[u8]) -> Option<ImageFormat> {
    if data.len() < 4 {
        return None;
    }
    // JPEG: FF D8
    if data[0] == 0xFF && data[1] == 0xD8 {
        return Some(ImageFormat::Jpeg);
    }
    // PNG: 89 50 4E 47 (.PNG)
    if data[..4] == [0x89, 0x50, 0x4E, 0x47] {
        return Some(ImageFormat::Png);
    }
    // GIF: 47 49 46 (GIF)
    if data[..3] == *b"GIF" {
        return Some(ImageFormat::Gif);
    }
    // WebP: RIFF....WEBP
    if data.len() >= 12 && data[..4] == *b"RIFF" && data[8..12] == *b"WEBP" {
        return Some(ImageFormat::WebP);
    }
    None
}

/// Turn a book title into a file stem: every character outside `[A-Za-z0-9]` becomes `_`.
pub fn safe_file_stem(title: &str) -> String {
    let stem: String = title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if stem.is_empty() {
        "novel".to_string()
    } else {
        stem
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_v4_shape() {
        let id = uuid_v4(42);
        assert_eq!(id.len(), 36);
        let parts: Vec<_> = id.split('-').collect();
        assert_eq!(
            parts.iter().map(|p| p.len()).collect::<Vec<_>>(),
            [8, 4, 4, 4, 12]
        );
        assert!(parts[2].starts_with('4'));
        assert_eq!(uuid_v4(42), id);
        assert_ne!(uuid_v4(43), id);
    }

    #[test]
    fn test_modified_timestamp() {
        let at = |secs| DateTime::from_timestamp(secs, 0).unwrap();
        assert_eq!(modified_timestamp(at(0)), "1970-01-01T00:00:00Z");
        assert_eq!(modified_timestamp(at(951_782_400)), "2000-02-29T00:00:00Z");
        assert_eq!(modified_timestamp(at(1_700_000_000)), "2023-11-14T22:13:20Z");

        let with_nanos = DateTime::from_timestamp(1_700_000_000, 123_456_789).unwrap();
        assert_eq!(modified_timestamp(with_nanos), "2023-11-14T22:13:20Z");
    }

    #[test]
    fn test_sniff_image_format() {
        assert_eq!(
            sniff_image_format(&[0xFF, 0xD8, 0xFF, 0xE0]),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(
            sniff_image_format(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A]),
            Some(ImageFormat::Png)
        );
        assert_eq!(sniff_image_format(b"GIF89a"), Some(ImageFormat::Gif));
        assert_eq!(sniff_image_format(b"RIFF\0\0\0\0WEBPVP8 "), Some(ImageFormat::WebP));
        assert_eq!(sniff_image_format(b"<html>"), None);
        assert_eq!(sniff_image_format(&[0xFF]), None);
    }

    #[test]
    fn test_safe_file_stem() {
        assert_eq!(safe_file_stem("Test Book"), "Test_Book");
        assert_eq!(safe_file_stem("A/B: C?"), "A_B__C_");
        assert_eq!(safe_file_stem(""), "novel");
    }
}
