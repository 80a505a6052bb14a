//! XHTML page synthesis for the cover, info, chapter and contents pages.
//!
//! Every page goes through [`XhtmlPage`], which escapes all text it is given.
//! The one exception is [`XhtmlPage::raw`], used for chapter bodies: those are
//! trusted XHTML fragments and are embedded as-is.

use quick_xml::escape::escape;

use crate::model::{Chapter, NovelMetadata, non_blank};

use super::normalize::normalize_chapter_body;
use super::toc::TocEntry;

const CONTENTS_CSS: &str = "    body { font-family: sans-serif; line-height: 1.5; }
    h1 { text-align: center; }
    li { margin: 0.5em 0; }
";

/// A complete XHTML document under construction.
#[derive(Debug, Clone)]
pub struct XhtmlPage {
    title: String,
    epub_namespace: bool,
    stylesheet: Option<&'static str>,
    body_style: Option<&'static str>,
    body: String,
}

impl XhtmlPage {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            epub_namespace: false,
            stylesheet: None,
            body_style: None,
            body: String::new(),
        }
    }

    /// Declare `xmlns:epub` on the root element (needed for `epub:type`).
    pub fn with_epub_namespace(mut self) -> Self {
        self.epub_namespace = true;
        self
    }

    /// Embed a `<style>` block in the head.
    pub fn with_stylesheet(mut self, css: &'static str) -> Self {
        self.stylesheet = Some(css);
        self
    }

    pub fn with_body_style(mut self, style: &'static str) -> Self {
        self.body_style = Some(style);
        self
    }

    pub fn heading(&mut self, level: u8, text: &str) -> &mut Self {
        let level = level.clamp(1, 6);
        self.body
            .push_str(&format!("  <h{level}>{}</h{level}>\n", escape(text)));
        self
    }

    pub fn paragraph(&mut self, text: &str) -> &mut Self {
        self.body.push_str(&format!("  <p>{}</p>\n", escape(text)));
        self
    }

    /// A labelled row, e.g. `Author: A, B`.
    pub fn field(&mut self, label: &str, value: &str) -> &mut Self {
        self.body.push_str(&format!(
            "  <p><strong>{}:</strong> {}</p>\n",
            escape(label),
            escape(value)
        ));
        self
    }

    pub fn image(&mut self, src: &str, alt: &str, style: &str) -> &mut Self {
        self.body.push_str(&format!(
            "  <img style=\"{}\" src=\"{}\" alt=\"{}\"/>\n",
            escape(style),
            escape(src),
            escape(alt)
        ));
        self
    }

    /// Append an unescaped fragment.
    pub fn raw(&mut self, fragment: &str) -> &mut Self {
        self.body.push_str("  ");
        self.body.push_str(fragment);
        self.body.push('\n');
        self
    }

    pub fn render(&self) -> String {
        let mut doc = String::new();

        doc.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<!DOCTYPE html>\n");
        if self.epub_namespace {
            doc.push_str(
                "<html xmlns=\"http://www.w3.org/1999/xhtml\" xmlns:epub=\"http://www.idpf.org/2007/ops\">\n",
            );
        } else {
            doc.push_str("<html xmlns=\"http://www.w3.org/1999/xhtml\">\n");
        }

        doc.push_str("<head>\n");
        doc.push_str(&format!("  <title>{}</title>\n", escape(&self.title)));
        doc.push_str("  <meta charset=\"utf-8\"/>\n");
        if let Some(css) = self.stylesheet {
            doc.push_str("  <style type=\"text/css\">\n");
            doc.push_str(css);
            doc.push_str("  </style>\n");
        }
        doc.push_str("</head>\n");

        match self.body_style {
            Some(style) => doc.push_str(&format!("<body style=\"{}\">\n", escape(style))),
            None => doc.push_str("<body>\n"),
        }
        doc.push_str(&self.body);
        doc.push_str("</body>\n</html>\n");
        doc
    }
}

/// The cover page: image, title and authors.
pub fn cover_page(metadata: &NovelMetadata, image_href: &str) -> String {
    let mut page = XhtmlPage::new(&metadata.title).with_body_style("margin:0; text-align:center;");
    page.image(
        image_href,
        "Cover",
        "height:auto;width:100%;border-radius:5px;",
    )
    .heading(1, &metadata.title)
    .field("Author", &metadata.authors_display());
    page.render()
}

/// The information page.
///
/// Optional fields that are absent or blank produce no markup at all.
pub fn info_page(metadata: &NovelMetadata) -> String {
    let mut page = XhtmlPage::new("Information");
    page.heading(1, &metadata.title)
        .field("Author", &metadata.authors_display())
        .field("Status", &metadata.status);

    if let Some(alt_title) = metadata.alt_title.as_ref().filter(|t| !t.is_blank()) {
        page.field("Alternative Title", &alt_title.joined());
    }
    if let Some(language) = non_blank(&metadata.language) {
        page.field("Original Language", language);
    }
    if let Some(publisher) = non_blank(&metadata.original_publisher) {
        page.field("Original Publisher", publisher);
    }
    if let Some(status) = non_blank(&metadata.original_status) {
        page.field("Original Status", status);
    }
    if let Some(year) = non_blank(&metadata.date) {
        page.field("Year", year);
    }
    if !metadata.genres.is_empty() {
        page.field("Genres", &metadata.genres.join(", "));
    }

    if !metadata.description.trim().is_empty() {
        page.heading(3, "Description");
        for line in metadata.description.lines().map(str::trim) {
            if !line.is_empty() {
                page.paragraph(line);
            }
        }
    }

    page.render()
}

/// A chapter page: heading plus the normalized body.
pub fn chapter_page(chapter: &Chapter) -> String {
    let body = normalize_chapter_body(chapter.content.as_deref());
    let mut page = XhtmlPage::new(&chapter.title);
    page.heading(1, &chapter.title).raw(&body);
    page.render()
}

/// The contents page, doubling as the EPUB 3 navigation document.
///
/// `entries` are listed in the order given (reading order).
pub fn contents_page(entries: &[&TocEntry]) -> String {
    let mut page = XhtmlPage::new("Table of Contents")
        .with_epub_namespace()
        .with_stylesheet(CONTENTS_CSS);

    let mut list = String::from("<nav epub:type=\"toc\" id=\"toc\">\n    <ol>\n");
    for entry in entries {
        list.push_str(&format!(
            "      <li><a href=\"{}\">{}</a></li>\n",
            escape(&entry.href),
            escape(&entry.title)
        ));
    }
    list.push_str("    </ol>\n  </nav>");

    page.heading(1, "Table of Contents").raw(&list);
    page.render()
}
