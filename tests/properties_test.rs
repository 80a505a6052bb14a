//! Structural properties that hold for any record shape.

use std::io::{Cursor, Read};

use proptest::prelude::*;
use quick_xml::Reader;
use quick_xml::events::Event;
use zip::ZipArchive;

use novelpub::export::{EpubConfig, EpubExporter, Exporter};
use novelpub::io::NullSink;
use novelpub::{Chapter, NovelMetadata, NovelRecord, Result};

const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

fn build(title: &str, chapters: &[(String, Option<String>)], with_cover: bool) -> Vec<u8> {
    let mut metadata = NovelMetadata::new(title).with_author("Author");
    if with_cover {
        metadata = metadata.with_cover("https://img.example/cover");
    }
    let mut record = NovelRecord::new(metadata);
    for (title, content) in chapters {
        record.chapters.push(Chapter {
            title: title.clone(),
            content: content.clone(),
        });
    }

    let config = EpubConfig {
        identifier: Some("urn:uuid:prop".into()),
        modified: Some("2024-01-01T00:00:00Z".into()),
        ..EpubConfig::default()
    };
    EpubExporter::new(|_: &str| -> Result<Vec<u8>> { Ok(PNG.to_vec()) })
        .with_config(config)
        .export(&record, &NullSink)
        .unwrap()
        .into_bytes()
}

fn entry(bytes: &[u8], name: &str) -> String {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut out = String::new();
    archive
        .by_name(name)
        .unwrap()
        .read_to_string(&mut out)
        .unwrap();
    out
}

fn attribute_values(xml: &str, element: &[u8], attr: &[u8]) -> Vec<String> {
    let mut reader = Reader::from_str(xml);
    let mut values = Vec::new();
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.name().as_ref() == element => {
                for a in e.attributes().flatten() {
                    if a.key.as_ref() == attr {
                        values.push(String::from_utf8(a.value.to_vec()).unwrap());
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => panic!("malformed XML: {e}"),
            _ => {}
        }
    }
    values
}

fn chapters() -> impl Strategy<Value = Vec<(String, Option<String>)>> {
    prop::collection::vec(
        (
            "[A-Za-z0-9 &<>\"']{0,16}",
            prop::option::of("[a-z ]{0,12}(&nbsp;|<br>)?[a-z]{0,4}"),
        ),
        0..12,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_spine_has_fixed_shape(chapters in chapters(), with_cover in any::<bool>()) {
        let bytes = build("Prop", &chapters, with_cover);
        let spine = attribute_values(&entry(&bytes, "OEBPS/content.opf"), b"itemref", b"idref");

        let mut expected = Vec::new();
        if with_cover {
            expected.push("cover-page".to_string());
        }
        expected.push("info-page".to_string());
        expected.push("toc-page".to_string());
        expected.extend((1..=chapters.len()).map(|i| format!("ch-{i}")));

        prop_assert_eq!(spine.len(), chapters.len() + 2 + usize::from(with_cover));
        prop_assert_eq!(spine, expected);
    }

    #[test]
    fn prop_play_order_is_one_to_m(chapters in chapters(), with_cover in any::<bool>()) {
        let bytes = build("Prop", &chapters, with_cover);
        let ncx = entry(&bytes, "OEBPS/toc.ncx");
        let orders: Vec<usize> = attribute_values(&ncx, b"navPoint", b"playOrder")
            .iter()
            .map(|o| o.parse().unwrap())
            .collect();

        let m = chapters.len() + 2 + usize::from(with_cover);
        prop_assert_eq!(orders, (1..=m).collect::<Vec<_>>());
    }

    #[test]
    fn prop_manifest_ids_are_unique(chapters in chapters(), with_cover in any::<bool>()) {
        let bytes = build("Prop", &chapters, with_cover);
        let opf = entry(&bytes, "OEBPS/content.opf");
        let mut ids = attribute_values(&opf, b"item", b"id");
        let total = ids.len();
        ids.sort();
        ids.dedup();
        prop_assert_eq!(ids.len(), total);
    }

    #[test]
    fn prop_chapter_files_follow_record_order(chapters in chapters()) {
        let bytes = build("Prop", &chapters, false);
        let mut archive = ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        let names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .filter(|n| n.starts_with("OEBPS/chap"))
            .collect();
        let expected: Vec<String> =
            (1..=chapters.len()).map(|i| format!("OEBPS/chap{i}.xhtml")).collect();
        prop_assert_eq!(names, expected);

        for (i, (_, content)) in chapters.iter().enumerate() {
            let page = entry(&bytes, &format!("OEBPS/chap{}.xhtml", i + 1));
            prop_assert!(!page.contains("&nbsp;"));
            prop_assert!(!page.contains("<br>"));
            if content.as_deref().is_none_or(str::is_empty) {
                prop_assert!(page.contains("Content not found."));
            }
        }
    }
}
