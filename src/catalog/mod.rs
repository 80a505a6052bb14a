//! Series catalog lookups used to enrich a record's metadata before export.
//!
//! A catalog answers three questions: which series match a title, what does
//! a series page say about it, and what else has an author written. The
//! answers feed [`SeriesDetail::autofill`], which copies catalog values into a
//! [`NovelMetadata`] without overwriting what the record already has.

use crate::error::Result;
use crate::model::{AltTitle, NovelMetadata};

mod novelupdates;

pub use novelupdates::{
    NOVELUPDATES_BASE, NovelUpdates, parse_author_works, parse_search, parse_series_detail,
};

/// A hyperlink scraped from a catalog page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub text: String,
    pub url: String,
}

/// One search hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateSeries {
    pub title: String,
    /// Absolute URL of the series page.
    pub url: String,
    pub cover: Option<String>,
    pub genres: Vec<String>,
}

/// Everything a series page lists about one series.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeriesDetail {
    pub title: String,
    pub cover: Option<String>,
    /// e.g. "Web Novel", "Light Novel".
    pub series_type: Option<String>,
    pub genres: Vec<String>,
    /// Author names with their catalog pages.
    pub authors: Vec<Link>,
    pub year: Option<String>,
    /// Status in the country of origin.
    pub original_status: Option<String>,
    pub original_publisher: Option<String>,
    pub english_publisher: Option<String>,
    /// Paragraphs separated by `\n`.
    pub description: String,
    pub associated_names: Vec<String>,
    /// Original language, as the catalog names it.
    pub language: Option<String>,
    pub related: Vec<Link>,
}

/// Another series by the same author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorWork {
    pub title: String,
    pub url: String,
    pub cover: Option<String>,
    pub genres: Vec<String>,
    /// Plain text, with the "more/less" toggles removed.
    pub description: String,
}

/// A source of series information.
pub trait Catalog {
    /// Series whose titles match `query`, newest first. No match is an empty list.
    fn search(&self, query: &str) -> Result<Vec<CandidateSeries>>;

    /// The series page at `url`.
    fn series_detail(&self, url: &str) -> Result<SeriesDetail>;

    /// Series listed on the author page at `author_url`.
    fn author_works(&self, author_url: &str) -> Result<Vec<AuthorWork>>;
}

impl SeriesDetail {
    /// The first author's catalog page, if any.
    pub fn first_author_url(&self) -> Option<&str> {
        self.authors.first().map(|a| a.url.as_str())
    }

    /// Copy catalog values into `metadata`.
    ///
    /// Cover, alternative titles, year, original status, language and original
    /// publisher replace the record's values when the catalog has one.
    /// Genres, description and authors are only filled in when the record has
    /// none of its own. Empty catalog values never overwrite anything.
    pub fn autofill(&self, metadata: &mut NovelMetadata) {
        fn set(target: &mut Option<String>, value: &Option<String>) {
            if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                *target = Some(value.to_string());
            }
        }

        set(&mut metadata.cover, &self.cover);
        set(&mut metadata.date, &self.year);
        set(&mut metadata.original_status, &self.original_status);
        set(&mut metadata.language, &self.language);
        set(&mut metadata.original_publisher, &self.original_publisher);

        if !self.associated_names.is_empty() {
            metadata.alt_title = Some(AltTitle::Many(self.associated_names.clone()));
        }
        if metadata.genres.is_empty() {
            metadata.genres = self.genres.clone();
        }
        if metadata.description.trim().is_empty() && !self.description.is_empty() {
            metadata.description = self.description.clone();
        }
        if metadata.author.is_empty() {
            metadata.author = self.authors.iter().map(|a| a.text.clone()).collect();
        }
    }
}
