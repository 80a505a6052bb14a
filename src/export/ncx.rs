//! NCX navigation map (`toc.ncx`).

use quick_xml::escape::escape;

use super::toc::{IdCounter, TocEntry};

/// Generate toc.ncx with one navPoint per entry.
///
/// playOrder runs 1..=entries.len() in the order given.
pub fn generate_ncx(title: &str, identifier: &str, entries: &[TocEntry]) -> String {
    let mut ncx = String::new();

    ncx.push_str(
        r#"<?xml version="1.0" encoding="utf-8"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <head>
    <meta name="dtb:uid" content=""#,
    );
    ncx.push_str(&escape(identifier));
    ncx.push_str(
        r#""/>
    <meta name="dtb:depth" content="1"/>
    <meta name="dtb:totalPageCount" content="0"/>
    <meta name="dtb:maxPageNumber" content="0"/>
  </head>
  <docTitle><text>"#,
    );
    ncx.push_str(&escape(title));
    ncx.push_str("</text></docTitle>\n  <navMap>\n");

    let mut play_order = IdCounter::new();
    for entry in entries {
        ncx.push_str(&format!(
            "    <navPoint id=\"{}\" playOrder=\"{}\">\n",
            escape(&entry.id),
            play_order.next_id()
        ));
        ncx.push_str(&format!(
            "      <navLabel><text>{}</text></navLabel>\n",
            escape(&entry.title)
        ));
        ncx.push_str(&format!(
            "      <content src=\"{}\"/>\n",
            escape(&entry.href)
        ));
        ncx.push_str("    </navPoint>\n");
    }

    ncx.push_str("  </navMap>\n</ncx>\n");
    ncx
}
