//! Export module for packaging novel records as EPUB.
//!
//! Provides the `Exporter` trait and the EPUB implementation, plus the pieces
//! it is built from: page synthesis, the shared TOC sequence, the OPF and NCX
//! writers and the OCF archive builder.
//!
//! # Architecture
//!
//! The `Exporter` trait uses a builder pattern:
//! - `new()` creates an exporter with default configuration
//! - `with_config()` allows customization
//! - `export()` produces an in-memory [`EpubPackage`]
//!
//! # Example
//!
//! ```no_run
//! use novelpub::NovelRecord;
//! use novelpub::export::{EpubExporter, Exporter};
//! use novelpub::io::{ProxyFetcher, TracingSink};
//!
//! let record = NovelRecord::open("novel.json")?;
//! let package = EpubExporter::new(ProxyFetcher::default()).export(&record, &TracingSink)?;
//! package.write_to(&mut std::fs::File::create(package.suggested_file_name())?)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::error::Result;
use crate::io::LogSink;
use crate::model::NovelRecord;

mod archive;
mod cover;
mod epub;
mod html_synth;
mod ncx;
mod normalize;
mod opf;
mod toc;

pub use archive::{ArchiveBuilder, ArchiveEntry, CONTAINER_XML, Compression, EPUB_MEDIA_TYPE};
pub use cover::{COVER_IMAGE_HREF, CoverImage, resolve_cover};
pub use epub::{EpubConfig, EpubExporter, EpubPackage, PipelineState};
pub use html_synth::{XhtmlPage, chapter_page, contents_page, cover_page, info_page};
pub use ncx::generate_ncx;
pub use normalize::{MISSING_CONTENT, normalize_chapter_body};
pub use opf::{ManifestItem, PackageIdentity, generate_opf, manifest_items, spine_refs};
pub use toc::{IdCounter, PageKind, TocEntry, TocSequence};

/// Trait for packaging a novel record into a finished book.
pub trait Exporter {
    /// Build the book for `record`.
    ///
    /// Progress messages (`Processing chapters for EPUB...`, `Cover skipped: ...`)
    /// go to `log`. Nothing is produced unless the whole archive was written.
    fn export(&self, record: &NovelRecord, log: &dyn LogSink) -> Result<EpubPackage>;
}
