//! Input data model: the novel record handed to the exporter.
//!
//! Records come from the catalog enrichment workflow, from a JSON file, or are
//! built by hand with the `with_*` builders.

mod novel;

pub use novel::{AltTitle, Chapter, NovelMetadata, NovelRecord, non_blank};
