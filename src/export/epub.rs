//! EPUB exporter.
//!
//! Runs the packaging pipeline for one [`NovelRecord`]:
//!
//! ```text
//! Init -> MetaWritten -> CoverResolved -> DocsSynthesized -> Archived -> Done
//!                                                               \-> Failed
//! ```
//!
//! The cover download degrades instead of failing; only serializing the
//! archive can move the run to `Failed`.

use std::io::{self, Write};

use crate::error::Result;
use crate::io::{Fetcher, LogSink};
use crate::model::NovelRecord;
use crate::util::{modified_timestamp, safe_file_stem, time_seed_nanos, uuid_v4};

use super::Exporter;
use super::archive::{ArchiveBuilder, EPUB_MEDIA_TYPE};
use super::cover::{CoverImage, resolve_cover};
use super::html_synth::{chapter_page, contents_page, cover_page, info_page};
use super::ncx::generate_ncx;
use super::opf::{PackageIdentity, generate_opf};
use super::toc::TocSequence;

/// Configuration for EPUB export.
#[derive(Debug, Clone)]
pub struct EpubConfig {
    /// Compression level for deflate (1-9, default 9).
    pub compression_level: i64,
    /// `dc:language` code (default `en`).
    pub language: String,
    /// Fixed `dc:identifier`. A random `urn:uuid:` is generated when unset.
    pub identifier: Option<String>,
    /// Fixed `dcterms:modified`. The current time is used when unset.
    pub modified: Option<String>,
    /// If false, the record's cover URL is ignored.
    pub fetch_cover: bool,
}

impl Default for EpubConfig {
    fn default() -> Self {
        Self {
            compression_level: 9,
            language: "en".to_string(),
            identifier: None,
            modified: None,
            fetch_cover: true,
        }
    }
}

/// Where a run is in the packaging pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Init,
    /// `mimetype` and `container.xml` are queued.
    MetaWritten,
    /// The cover was downloaded, skipped, or not configured.
    CoverResolved,
    /// Every page and structural document is queued.
    DocsSynthesized,
    /// The archive is being serialized.
    Archived,
    Done,
    Failed,
}

impl PipelineState {
    /// Whether `next` directly follows `self`.
    pub fn can_advance_to(self, next: PipelineState) -> bool {
        use PipelineState::*;
        matches!(
            (self, next),
            (Init, MetaWritten)
                | (MetaWritten, CoverResolved)
                | (CoverResolved, DocsSynthesized)
                | (DocsSynthesized, Archived)
                | (Archived, Done)
                | (Archived, Failed)
        )
    }
}

struct Run {
    state: PipelineState,
}

impl Run {
    fn new() -> Self {
        Self {
            state: PipelineState::Init,
        }
    }

    fn advance(&mut self, next: PipelineState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "invalid transition {:?} -> {:?}",
            self.state,
            next
        );
        tracing::debug!(from = ?self.state, to = ?next, "pipeline transition");
        self.state = next;
    }
}

/// A finished EPUB file held in memory.
#[derive(Debug, Clone)]
pub struct EpubPackage {
    title: String,
    bytes: Vec<u8>,
}

impl EpubPackage {
    /// Always `application/epub+zip`.
    pub fn media_type(&self) -> &'static str {
        EPUB_MEDIA_TYPE
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// `<title>.epub`, with every non-alphanumeric character replaced by `_`.
    pub fn suggested_file_name(&self) -> String {
        format!("{}.epub", safe_file_stem(&self.title))
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.bytes)
    }
}

/// EPUB format exporter.
///
/// # Example
///
/// ```no_run
/// use novelpub::export::{EpubExporter, Exporter};
/// use novelpub::io::{ProxyFetcher, TracingSink};
/// use novelpub::{Chapter, NovelMetadata, NovelRecord};
///
/// let record = NovelRecord::new(NovelMetadata::new("My Novel").with_author("Me"))
///     .with_chapter(Chapter::new("Chapter 1", "<p>Hello</p>"));
/// let package = EpubExporter::new(ProxyFetcher::default()).export(&record, &TracingSink)?;
/// std::fs::write(package.suggested_file_name(), package.bytes())?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct EpubExporter<F> {
    config: EpubConfig,
    fetcher: F,
}

impl<F: Fetcher> EpubExporter<F> {
    /// Create a new exporter with default configuration.
    pub fn new(fetcher: F) -> Self {
        Self {
            config: EpubConfig::default(),
            fetcher,
        }
    }

    /// Configure the exporter with custom settings.
    pub fn with_config(mut self, config: EpubConfig) -> Self {
        self.config = config;
        self
    }

    fn identity(&self) -> PackageIdentity {
        PackageIdentity {
            identifier: self
                .config
                .identifier
                .clone()
                .unwrap_or_else(|| format!("urn:uuid:{}", uuid_v4(time_seed_nanos()))),
            modified: self
                .config
                .modified
                .clone()
                .unwrap_or_else(|| modified_timestamp(chrono::Utc::now())),
            language: self.config.language.clone(),
        }
    }
}

impl<F: Fetcher> Exporter for EpubExporter<F> {
    fn export(&self, record: &NovelRecord, log: &dyn LogSink) -> Result<EpubPackage> {
        record.validate()?;
        let mut run = Run::new();

        // 1. mimetype (first, stored) and container.xml
        let mut archive = ArchiveBuilder::new(self.config.compression_level);
        archive.add_container();
        run.advance(PipelineState::MetaWritten);

        // 2. Cover, if configured and reachable
        let cover_url = if self.config.fetch_cover {
            record.metadata.cover_url()
        } else {
            None
        };
        let cover = resolve_cover(cover_url, &self.fetcher, log);
        run.advance(PipelineState::CoverResolved);

        // 3. Pages and structural documents
        let identity = self.identity();
        synthesize(record, cover, &identity, &mut archive, log);
        run.advance(PipelineState::DocsSynthesized);

        // 4. Serialize
        log.log("Generating EPUB file, please wait...");
        run.advance(PipelineState::Archived);
        match archive.finish() {
            Ok(bytes) => {
                run.advance(PipelineState::Done);
                Ok(EpubPackage {
                    title: record.metadata.title.clone(),
                    bytes,
                })
            }
            Err(e) => {
                run.advance(PipelineState::Failed);
                Err(e)
            }
        }
    }
}

/// Queue every page, the NCX and the OPF into `archive`.
fn synthesize(
    record: &NovelRecord,
    cover: Option<CoverImage>,
    identity: &PackageIdentity,
    archive: &mut ArchiveBuilder,
    log: &dyn LogSink,
) {
    let metadata = &record.metadata;
    let mut toc = TocSequence::new();

    if let Some(ref cover) = cover {
        archive.add_content(cover.href, cover.data.clone());
        let entry = toc.push_cover();
        archive.add_content(&entry.href, cover_page(metadata, cover.href));
    }

    let entry = toc.push_info();
    archive.add_content(&entry.href, info_page(metadata));

    log.log("Processing chapters for EPUB...");
    for chapter in &record.chapters {
        let entry = toc.push_chapter(&chapter.title);
        archive.add_content(&entry.href, chapter_page(chapter));
    }

    let href = toc.push_contents().href.clone();
    archive.add_content(&href, contents_page(&toc.reading_order()));

    archive.add_content(
        "toc.ncx",
        generate_ncx(&metadata.title, &identity.identifier, toc.entries()),
    );
    archive.add_content(
        "content.opf",
        generate_opf(metadata, identity, cover.as_ref(), &toc),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::NullSink;
    use crate::model::NovelMetadata;

    #[test]
    fn test_state_transitions() {
        use PipelineState::*;
        let path = [Init, MetaWritten, CoverResolved, DocsSynthesized, Archived, Done];
        for pair in path.windows(2) {
            assert!(pair[0].can_advance_to(pair[1]));
        }
        assert!(Archived.can_advance_to(Failed));
        assert!(!CoverResolved.can_advance_to(Failed));
        assert!(!MetaWritten.can_advance_to(DocsSynthesized));
        assert!(!Done.can_advance_to(Init));
    }

    #[test]
    fn test_identity_uses_fixed_values() {
        let exporter = EpubExporter::new(|_: &str| -> Result<Vec<u8>> { Ok(Vec::new()) })
            .with_config(EpubConfig {
                identifier: Some("urn:isbn:123".into()),
                modified: Some("2020-02-02T00:00:00Z".into()),
                ..EpubConfig::default()
            });
        let identity = exporter.identity();
        assert_eq!(identity.identifier, "urn:isbn:123");
        assert_eq!(identity.modified, "2020-02-02T00:00:00Z");
    }

    #[test]
    fn test_generated_identity() {
        let exporter = EpubExporter::new(|_: &str| -> Result<Vec<u8>> { Ok(Vec::new()) });
        let identity = exporter.identity();
        assert!(identity.identifier.starts_with("urn:uuid:"));
        assert!(identity.modified.ends_with('Z'));
        assert_eq!(identity.modified.len(), "2024-01-01T00:00:00Z".len());
        assert_eq!(identity.language, "en");
    }

    #[test]
    fn test_invalid_record_fails_before_fetching() {
        let exporter =
            EpubExporter::new(|_: &str| -> Result<Vec<u8>> { panic!("should not fetch") });
        let record = NovelRecord::new(NovelMetadata::new("").with_cover("https://x/c.jpg"));
        assert!(exporter.export(&record, &NullSink).is_err());
    }

    #[test]
    fn test_suggested_file_name() {
        let package = EpubPackage {
            title: "My: Novel".into(),
            bytes: Vec::new(),
        };
        assert_eq!(package.suggested_file_name(), "My__Novel.epub");
        assert_eq!(package.media_type(), "application/epub+zip");
    }
}
