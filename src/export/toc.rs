//! The page sequence shared by the manifest, the spine, the NCX and the TOC page.
//!
//! Entries are appended in a fixed order (cover, info, chapters, contents) and
//! never modified afterwards. Every structural document is derived from the
//! same sequence so their ids and hrefs always agree.

/// What a page is, which decides where it sits in the spine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Cover,
    Info,
    Chapter,
    Contents,
}

/// One generated page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    pub id: String,
    pub href: String,
    pub title: String,
    pub kind: PageKind,
}

impl TocEntry {
    pub fn is_cover(&self) -> bool {
        self.kind == PageKind::Cover
    }
}

/// Sequential 1-based numbering for one synthesis run.
///
/// Each run owns its counters; nothing is shared between runs.
#[derive(Debug, Default)]
pub struct IdCounter {
    last: u32,
}

impl IdCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the next number, starting at 1.
    pub fn next_id(&mut self) -> u32 {
        self.last += 1;
        self.last
    }
}

/// Append-only list of generated pages, in construction order.
#[derive(Debug, Default)]
pub struct TocSequence {
    entries: Vec<TocEntry>,
    chapters: IdCounter,
}

pub const COVER_PAGE_HREF: &str = "cover.xhtml";
pub const INFO_PAGE_HREF: &str = "info.xhtml";
pub const CONTENTS_PAGE_HREF: &str = "toc.xhtml";

impl TocSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_cover(&mut self) -> &TocEntry {
        self.push("cover-page", COVER_PAGE_HREF, "Cover", PageKind::Cover)
    }

    pub fn push_info(&mut self) -> &TocEntry {
        self.push("info-page", INFO_PAGE_HREF, "Information", PageKind::Info)
    }

    /// Append the next chapter. Ids and file names come from the chapter's
    /// position, never from its title.
    pub fn push_chapter(&mut self, title: &str) -> &TocEntry {
        let n = self.chapters.next_id();
        self.push(
            format!("ch-{n}"),
            format!("chap{n}.xhtml"),
            title,
            PageKind::Chapter,
        )
    }

    pub fn push_contents(&mut self) -> &TocEntry {
        self.push(
            "toc-page",
            CONTENTS_PAGE_HREF,
            "Table of Contents",
            PageKind::Contents,
        )
    }

    fn push(
        &mut self,
        id: impl Into<String>,
        href: impl Into<String>,
        title: impl Into<String>,
        kind: PageKind,
    ) -> &TocEntry {
        self.entries.push(TocEntry {
            id: id.into(),
            href: href.into(),
            title: title.into(),
            kind,
        });
        &self.entries[self.entries.len() - 1]
    }

    /// All entries in construction order.
    pub fn entries(&self) -> &[TocEntry] {
        &self.entries
    }

    /// Reading order: cover, info, contents, then chapters.
    ///
    /// This is the spine order and the link order of the TOC page.
    pub fn reading_order(&self) -> Vec<&TocEntry> {
        let of_kind = |kind: PageKind| self.entries.iter().filter(move |e| e.kind == kind);
        of_kind(PageKind::Cover)
            .chain(of_kind(PageKind::Info))
            .chain(of_kind(PageKind::Contents))
            .chain(of_kind(PageKind::Chapter))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(entries: &[&TocEntry]) -> Vec<String> {
        entries.iter().map(|e| e.id.clone()).collect()
    }

    #[test]
    fn test_construction_order_is_kept() {
        let mut toc = TocSequence::new();
        toc.push_cover();
        toc.push_info();
        toc.push_chapter("One");
        toc.push_chapter("Two");
        toc.push_contents();

        let all: Vec<_> = toc.entries().iter().collect();
        assert_eq!(
            ids(&all),
            ["cover-page", "info-page", "ch-1", "ch-2", "toc-page"]
        );
        assert_eq!(toc.entries()[3].href, "chap2.xhtml");
        assert_eq!(toc.entries()[3].title, "Two");
        assert!(toc.entries()[0].is_cover());
    }

    #[test]
    fn test_reading_order_moves_contents_before_chapters() {
        let mut toc = TocSequence::new();
        toc.push_info();
        toc.push_chapter("One");
        toc.push_contents();

        assert_eq!(
            ids(&toc.reading_order()),
            ["info-page", "toc-page", "ch-1"]
        );
        assert!(!toc.entries().iter().any(TocEntry::is_cover));
    }

    #[test]
    fn test_counters_are_per_sequence() {
        let mut first = TocSequence::new();
        first.push_chapter("a");
        first.push_chapter("b");

        let mut second = TocSequence::new();
        assert_eq!(second.push_chapter("c").id, "ch-1");
    }

    #[test]
    fn test_chapter_file_names_ignore_title() {
        let mut toc = TocSequence::new();
        let entry = toc.push_chapter("../../etc/passwd <b>");
        assert_eq!(entry.href, "chap1.xhtml");
    }
}
