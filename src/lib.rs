//! # novelpub
//!
//! Package scraped web novels as EPUB 3 books.
//!
//! ## Features
//!
//! - Read a novel record (metadata plus chapter fragments) from JSON
//! - Build a valid EPUB: cover, information page, chapters, navigation
//!   document, NCX and OPF package
//! - Download the cover through a raw-fetch proxy, degrading to no cover on failure
//! - Look series up on NovelUpdates and fill missing metadata
//!
//! ## Quick Start
//!
//! ```no_run
//! use novelpub::export::{EpubExporter, Exporter};
//! use novelpub::io::{ProxyFetcher, TracingSink};
//! use novelpub::NovelRecord;
//!
//! let record = NovelRecord::open("novel.json")?;
//! let package = EpubExporter::new(ProxyFetcher::default()).export(&record, &TracingSink)?;
//! std::fs::write(package.suggested_file_name(), package.bytes())?;
//! # Ok::<(), novelpub::Error>(())
//! ```
//!
//! ## Working with Records
//!
//! Records can also be built in code:
//!
//! ```
//! use novelpub::{Chapter, NovelMetadata, NovelRecord};
//!
//! let record = NovelRecord::new(
//!     NovelMetadata::new("My Novel")
//!         .with_author("Author Name")
//!         .with_status("Ongoing"),
//! )
//! .with_chapter(Chapter::new("Chapter 1", "<p>It begins.</p>"))
//! .with_chapter(Chapter::without_content("Chapter 2"));
//!
//! assert!(record.validate().is_ok());
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod export;
pub mod io;
pub mod model;
pub(crate) mod util;

pub use catalog::{Catalog, NovelUpdates, SeriesDetail};
pub use config::Config;
pub use error::{Error, Result};
pub use export::{EpubConfig, EpubExporter, EpubPackage, Exporter};
pub use model::{AltTitle, Chapter, NovelMetadata, NovelRecord};
