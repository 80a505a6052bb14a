//! OPF package document (`content.opf`): metadata, manifest and spine.

use quick_xml::escape::escape;

use crate::model::{NovelMetadata, non_blank};

use super::cover::CoverImage;
use super::toc::{PageKind, TocSequence};

pub const XHTML_MEDIA_TYPE: &str = "application/xhtml+xml";
pub const NCX_MEDIA_TYPE: &str = "application/x-dtbncx+xml";

/// Package-level values that do not come from the novel record.
#[derive(Debug, Clone)]
pub struct PackageIdentity {
    /// `dc:identifier`, also used as the NCX `dtb:uid`.
    pub identifier: String,
    /// `dcterms:modified`, formatted `YYYY-MM-DDThh:mm:ssZ`.
    pub modified: String,
    /// `dc:language` code.
    pub language: String,
}

/// A manifest `<item>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestItem {
    pub id: String,
    pub href: String,
    pub media_type: String,
    pub properties: Option<&'static str>,
}

/// Build the manifest: the NCX, the cover image, then every page in construction order.
pub fn manifest_items(cover: Option<&CoverImage>, toc: &TocSequence) -> Vec<ManifestItem> {
    let mut items = vec![ManifestItem {
        id: "ncx".to_string(),
        href: "toc.ncx".to_string(),
        media_type: NCX_MEDIA_TYPE.to_string(),
        properties: None,
    }];

    if let Some(cover) = cover {
        items.push(ManifestItem {
            id: "cover-image".to_string(),
            href: cover.href.to_string(),
            media_type: cover.media_type.to_string(),
            properties: Some("cover-image"),
        });
    }

    for entry in toc.entries() {
        items.push(ManifestItem {
            id: entry.id.clone(),
            href: entry.href.clone(),
            media_type: XHTML_MEDIA_TYPE.to_string(),
            properties: (entry.kind == PageKind::Contents).then_some("nav"),
        });
    }

    items
}

/// Spine idrefs: cover page (only with a cover), info, contents, then chapters.
pub fn spine_refs(toc: &TocSequence) -> Vec<String> {
    toc.reading_order().into_iter().map(|e| e.id.clone()).collect()
}

/// Generate content.opf.
pub fn generate_opf(
    metadata: &NovelMetadata,
    identity: &PackageIdentity,
    cover: Option<&CoverImage>,
    toc: &TocSequence,
) -> String {
    let mut opf = String::new();

    opf.push_str(
        r#"<?xml version="1.0" encoding="utf-8"?>
<package xmlns="http://www.idpf.org/2007/opf" unique-identifier="BookId" version="3.0">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
"#,
    );

    opf.push_str(&format!(
        "    <dc:title>{}</dc:title>\n",
        escape(&metadata.title)
    ));
    for author in &metadata.author {
        opf.push_str(&format!(
            "    <dc:creator>{}</dc:creator>\n",
            escape(author)
        ));
    }
    opf.push_str(&format!(
        "    <dc:language>{}</dc:language>\n",
        escape(&identity.language)
    ));
    for genre in &metadata.genres {
        opf.push_str(&format!("    <dc:subject>{}</dc:subject>\n", escape(genre)));
    }
    if let Some(date) = non_blank(&metadata.date) {
        opf.push_str(&format!("    <dc:date>{}</dc:date>\n", escape(date.trim())));
    }
    opf.push_str(&format!(
        "    <dc:identifier id=\"BookId\">{}</dc:identifier>\n",
        escape(&identity.identifier)
    ));
    if !metadata.description.trim().is_empty() {
        opf.push_str(&format!(
            "    <dc:description>{}</dc:description>\n",
            escape(&metadata.description)
        ));
    }
    opf.push_str(&format!(
        "    <meta property=\"dcterms:modified\">{}</meta>\n",
        escape(&identity.modified)
    ));
    if cover.is_some() {
        opf.push_str("    <meta name=\"cover\" content=\"cover-image\"/>\n");
    }
    opf.push_str("  </metadata>\n");

    opf.push_str("  <manifest>\n");
    for item in manifest_items(cover, toc) {
        opf.push_str(&format!(
            "    <item id=\"{}\" href=\"{}\" media-type=\"{}\"",
            escape(&item.id),
            escape(&item.href),
            escape(&item.media_type)
        ));
        if let Some(properties) = item.properties {
            opf.push_str(&format!(" properties=\"{}\"", properties));
        }
        opf.push_str("/>\n");
    }
    opf.push_str("  </manifest>\n");

    opf.push_str("  <spine toc=\"ncx\">\n");
    for id in spine_refs(toc) {
        opf.push_str(&format!("    <itemref idref=\"{}\"/>\n", escape(&id)));
    }
    opf.push_str("  </spine>\n</package>\n");

    opf
}
