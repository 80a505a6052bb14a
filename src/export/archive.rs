//! EPUB container assembly.
//!
//! The OCF rules this enforces: `mimetype` is the first entry and stored
//! uncompressed, `META-INF/container.xml` points at the package document, and
//! everything else lives under `OEBPS/`.

use std::collections::HashSet;
use std::io::{Cursor, Write};

use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::error::{Error, Result};

/// The EPUB media type, written as the `mimetype` entry.
pub const EPUB_MEDIA_TYPE: &str = "application/epub+zip";

/// Folder holding the package document and all content.
pub const CONTENT_ROOT: &str = "OEBPS";

/// Container.xml template.
pub const CONTAINER_XML: &str = r#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>
"#;

/// How an entry is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Stored,
    Deflated,
}

/// One file in the archive.
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    pub path: String,
    pub content: Vec<u8>,
    pub compression: Compression,
}

/// Collects entries and writes them as one ZIP in insertion order.
///
/// `mimetype` is added on construction so nothing can precede it. Nothing is
/// written until [`ArchiveBuilder::finish`], which either returns the whole
/// archive or an error.
#[derive(Debug)]
pub struct ArchiveBuilder {
    entries: Vec<ArchiveEntry>,
    compression_level: i64,
}

impl ArchiveBuilder {
    /// Start an archive whose deflated entries use `compression_level` (1-9).
    pub fn new(compression_level: i64) -> Self {
        Self {
            entries: vec![ArchiveEntry {
                path: "mimetype".to_string(),
                content: EPUB_MEDIA_TYPE.as_bytes().to_vec(),
                compression: Compression::Stored,
            }],
            compression_level: compression_level.clamp(1, 9),
        }
    }

    /// Add `META-INF/container.xml`.
    pub fn add_container(&mut self) {
        self.add("META-INF/container.xml", CONTAINER_XML.as_bytes().to_vec());
    }

    /// Add a deflated entry at an archive path.
    pub fn add(&mut self, path: impl Into<String>, content: Vec<u8>) {
        self.entries.push(ArchiveEntry {
            path: path.into(),
            content,
            compression: Compression::Deflated,
        });
    }

    /// Add a deflated entry under the content root.
    pub fn add_content(&mut self, href: &str, content: impl Into<Vec<u8>>) {
        self.add(format!("{CONTENT_ROOT}/{href}"), content.into());
    }

    /// Serialize every entry into a ZIP archive.
    pub fn finish(self) -> Result<Vec<u8>> {
        let mut seen = HashSet::new();
        for entry in &self.entries {
            if !seen.insert(entry.path.as_str()) {
                return Err(Error::Archive(format!("duplicate entry {}", entry.path)));
            }
        }

        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        let deflated = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(self.compression_level));

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for entry in &self.entries {
            let options = match entry.compression {
                Compression::Stored => stored,
                Compression::Deflated => deflated,
            };
            zip.start_file(entry.path.as_str(), options)
                .map_err(|e| archive_error(&entry.path, e))?;
            zip.write_all(&entry.content)
                .map_err(|e| archive_error(&entry.path, e))?;
            tracing::debug!(path = %entry.path, bytes = entry.content.len(), "wrote archive entry");
        }

        let cursor = zip.finish().map_err(|e| archive_error("central directory", e))?;
        Ok(cursor.into_inner())
    }
}

fn archive_error(path: &str, e: impl std::fmt::Display) -> Error {
    Error::Archive(format!("{path}: {e}"))
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use zip::ZipArchive;

    use super::*;

    #[test]
    fn test_mimetype_first_and_stored() {
        let mut builder = ArchiveBuilder::new(9);
        builder.add_container();
        builder.add_content("a.xhtml", "<html/>");

        let bytes = builder.finish().unwrap();
        // Readers sniff the media type at a fixed offset of the first local header.
        assert_eq!(&bytes[30..38], b"mimetype");
        let extra_len = u16::from_le_bytes([bytes[28], bytes[29]]) as usize;
        let data = 38 + extra_len;
        assert_eq!(&bytes[data..data + 20], b"application/epub+zip");

        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 3);

        let first = archive.by_index(0).unwrap();
        assert_eq!(first.name(), "mimetype");
        assert_eq!(first.compression(), CompressionMethod::Stored);
        drop(first);

        for i in 1..archive.len() {
            let entry = archive.by_index(i).unwrap();
            assert_eq!(entry.compression(), CompressionMethod::Deflated);
        }

        let mut page = String::new();
        archive
            .by_name("OEBPS/a.xhtml")
            .unwrap()
            .read_to_string(&mut page)
            .unwrap();
        assert_eq!(page, "<html/>");
    }

    #[test]
    fn test_duplicate_path_fails_whole_archive() {
        let mut builder = ArchiveBuilder::new(9);
        builder.add_content("a.xhtml", "one");
        builder.add_content("a.xhtml", "two");

        let err = builder.finish().unwrap_err();
        assert!(matches!(err, Error::Archive(_)));
        assert_eq!(
            err.to_string(),
            "Archive assembly failed: duplicate entry OEBPS/a.xhtml"
        );
    }

    #[test]
    fn test_compression_level_is_clamped() {
        assert_eq!(ArchiveBuilder::new(42).compression_level, 9);
        assert_eq!(ArchiveBuilder::new(0).compression_level, 1);
    }
}
