use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A novel ready to be packaged: metadata plus chapters in reading order.
///
/// The record is read-only to the exporter. Chapter order here is the order of
/// the generated files, the spine and the navigation map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NovelRecord {
    pub metadata: NovelMetadata,
    #[serde(default)]
    pub chapters: Vec<Chapter>,
}

/// Descriptive metadata for a novel.
///
/// Optional fields that are `None` or blank are left out of every generated
/// document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NovelMetadata {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: Vec<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default, alias = "altitile", skip_serializing_if = "Option::is_none")]
    pub alt_title: Option<AltTitle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_publisher: Option<String>,
    #[serde(default, alias = "statuscoo", skip_serializing_if = "Option::is_none")]
    pub original_status: Option<String>,
    /// Year of first publication, as shown by the catalog.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub description: String,
    /// Remote cover image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
}

/// Alternative titles: scraped data carries either one string or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AltTitle {
    One(String),
    Many(Vec<String>),
}

/// One chapter. `content` is an XHTML fragment, or `None` if scraping failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl NovelRecord {
    pub fn new(metadata: NovelMetadata) -> Self {
        Self {
            metadata,
            chapters: Vec::new(),
        }
    }

    pub fn with_chapter(mut self, chapter: Chapter) -> Self {
        self.chapters.push(chapter);
        self
    }

    /// Parse a record from JSON and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let record: NovelRecord = serde_json::from_str(json)
            .map_err(|e| Error::InvalidRecord(format!("unreadable record: {e}")))?;
        record.validate()?;
        Ok(record)
    }

    /// Read a JSON record from disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Check the fields the exporter cannot do without.
    pub fn validate(&self) -> Result<()> {
        if self.metadata.title.trim().is_empty() {
            return Err(Error::InvalidRecord("title is required".to_string()));
        }
        Ok(())
    }
}

impl NovelMetadata {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author.push(author.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    pub fn with_alt_title(mut self, alt_title: AltTitle) -> Self {
        self.alt_title = Some(alt_title);
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_original_publisher(mut self, publisher: impl Into<String>) -> Self {
        self.original_publisher = Some(publisher.into());
        self
    }

    pub fn with_original_status(mut self, status: impl Into<String>) -> Self {
        self.original_status = Some(status.into());
        self
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genres.push(genre.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_cover(mut self, url: impl Into<String>) -> Self {
        self.cover = Some(url.into());
        self
    }

    /// Authors joined for display.
    pub fn authors_display(&self) -> String {
        self.author.join(", ")
    }

    /// The cover URL, if one is set and not blank.
    pub fn cover_url(&self) -> Option<&str> {
        non_blank(&self.cover)
    }
}

impl AltTitle {
    /// Titles joined for display.
    pub fn joined(&self) -> String {
        match self {
            AltTitle::One(title) => title.clone(),
            AltTitle::Many(titles) => titles.join(", "),
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            AltTitle::One(title) => title.trim().is_empty(),
            AltTitle::Many(titles) => titles.iter().all(|t| t.trim().is_empty()),
        }
    }
}

impl Chapter {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: Some(content.into()),
        }
    }

    /// A chapter whose body could not be retrieved.
    pub fn without_content(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: None,
        }
    }
}

/// `Some(value)` when the option holds a non-blank string.
pub fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_record_with_legacy_keys() {
        let json = r#"{
            "metadata": {
                "title": "Test Book",
                "author": ["A", "B"],
                "status": "Ongoing",
                "altitile": ["Alt One", "Alt Two"],
                "statuscoo": "Completed",
                "originalPublisher": "Qidian",
                "genres": ["Action"],
                "description": "d",
                "cover": "https://example.com/c.jpg"
            },
            "chapters": [
                {"title": "Ch1", "content": "Hello"},
                {"title": "Ch2", "content": null}
            ]
        }"#;

        let record = NovelRecord::from_json(json).unwrap();
        let meta = &record.metadata;
        assert_eq!(meta.authors_display(), "A, B");
        assert_eq!(
            meta.alt_title,
            Some(AltTitle::Many(vec!["Alt One".into(), "Alt Two".into()]))
        );
        assert_eq!(meta.original_status.as_deref(), Some("Completed"));
        assert_eq!(meta.original_publisher.as_deref(), Some("Qidian"));
        assert_eq!(meta.cover_url(), Some("https://example.com/c.jpg"));
        assert_eq!(record.chapters.len(), 2);
        assert_eq!(record.chapters[1].content, None);
    }

    #[test]
    fn test_alt_title_as_single_string() {
        let json = r#"{"metadata": {"title": "T", "altTitle": "Other"}}"#;
        let record = NovelRecord::from_json(json).unwrap();
        assert_eq!(record.metadata.alt_title, Some(AltTitle::One("Other".into())));
        assert!(record.chapters.is_empty());
    }

    #[test]
    fn test_missing_metadata_is_rejected() {
        let err = NovelRecord::from_json(r#"{"chapters": []}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidRecord(_)));
        assert!(err.to_string().contains("metadata"));
    }

    #[test]
    fn test_blank_title_is_rejected() {
        let err = NovelRecord::from_json(r#"{"metadata": {"title": "  "}}"#).unwrap_err();
        assert_eq!(err.to_string(), "Invalid novel record: title is required");
    }

    #[test]
    fn test_blank_cover_is_no_cover() {
        let meta = NovelMetadata::new("T").with_cover("   ");
        assert_eq!(meta.cover_url(), None);
    }

    #[test]
    fn test_alt_title_blank() {
        assert!(AltTitle::One(" ".into()).is_blank());
        assert!(AltTitle::Many(vec![]).is_blank());
        assert!(!AltTitle::Many(vec!["x".into()]).is_blank());
        assert_eq!(AltTitle::Many(vec!["a".into(), "b".into()]).joined(), "a, b");
    }
}
