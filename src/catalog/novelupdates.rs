//! NovelUpdates scraper.
//!
//! Pages are fetched raw through a [`Fetcher`] and parsed with `scraper`.
//! The parse functions are public so saved pages can be read without a
//! network round-trip.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use crate::error::{Error, Result};
use crate::io::{Fetcher, encode_uri_component};

use super::{AuthorWork, CandidateSeries, Catalog, Link, SeriesDetail};

pub const NOVELUPDATES_BASE: &str = "https://www.novelupdates.com";

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector")
}

// Listing boxes (search results and author pages)
static RESULT_BOX: LazyLock<Selector> = LazyLock::new(|| selector(".search_main_box_nu"));
static RESULT_TITLE: LazyLock<Selector> = LazyLock::new(|| selector(".search_title a"));
static RESULT_GENRE: LazyLock<Selector> = LazyLock::new(|| selector(".search_genre a"));
static RESULT_DESCRIPTION: LazyLock<Selector> = LazyLock::new(|| selector(".testhide"));
static RESULT_BODY: LazyLock<Selector> = LazyLock::new(|| selector(".search_body_nu"));
static IMAGE: LazyLock<Selector> = LazyLock::new(|| selector("img"));

// Series page
static SERIES_TITLE: LazyLock<Selector> = LazyLock::new(|| selector(".seriestitlenu"));
static SERIES_IMAGE: LazyLock<Selector> = LazyLock::new(|| selector(".seriesimg img"));
static SERIES_TYPE: LazyLock<Selector> = LazyLock::new(|| selector("#showtype a"));
static SERIES_GENRES: LazyLock<Selector> = LazyLock::new(|| selector("#seriesgenre a"));
static SERIES_AUTHORS: LazyLock<Selector> = LazyLock::new(|| selector("#showauthors a"));
static SERIES_YEAR: LazyLock<Selector> = LazyLock::new(|| selector("#edityear"));
static SERIES_STATUS: LazyLock<Selector> = LazyLock::new(|| selector("#editstatus"));
static SERIES_ORIGINAL_PUBLISHER: LazyLock<Selector> =
    LazyLock::new(|| selector("#showopublisher a"));
static SERIES_ENGLISH_PUBLISHER: LazyLock<Selector> =
    LazyLock::new(|| selector("#showepublisher span"));
static SERIES_DESCRIPTION: LazyLock<Selector> = LazyLock::new(|| selector("#editdescription p"));
static SERIES_ASSOCIATED: LazyLock<Selector> = LazyLock::new(|| selector("#editassociated"));
static SERIES_LANGUAGE: LazyLock<Selector> = LazyLock::new(|| selector("#showlang a"));
static SERIES_RELATED: LazyLock<Selector> = LazyLock::new(|| selector("h5.seriesother + div a"));

/// [`Catalog`] backed by novelupdates.com.
pub struct NovelUpdates<F> {
    fetcher: F,
}

impl<F: Fetcher> NovelUpdates<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    /// Series-finder URL for a title search, newest series first.
    pub fn search_url(query: &str) -> String {
        format!(
            "{NOVELUPDATES_BASE}/series-finder/?sf=1&sh={}&sort=sdate&order=desc",
            encode_uri_component(query.trim())
        )
    }
}

impl<F: Fetcher> Catalog for NovelUpdates<F> {
    fn search(&self, query: &str) -> Result<Vec<CandidateSeries>> {
        if query.trim().is_empty() {
            return Err(Error::Scrape("search query is empty".to_string()));
        }
        tracing::info!(query = query.trim(), "searching NovelUpdates");
        let html = self.fetcher.fetch_text(&Self::search_url(query))?;
        let results = parse_search(&html);
        tracing::debug!(count = results.len(), "search results");
        Ok(results)
    }

    fn series_detail(&self, url: &str) -> Result<SeriesDetail> {
        tracing::info!(%url, "fetching series page");
        let html = self.fetcher.fetch_text(url)?;
        parse_series_detail(&html).map_err(|e| match e {
            Error::Scrape(message) => Error::Scrape(format!("{url}: {message}")),
            other => other,
        })
    }

    fn author_works(&self, author_url: &str) -> Result<Vec<AuthorWork>> {
        tracing::info!(url = %author_url, "fetching author works");
        let html = self.fetcher.fetch_text(author_url)?;
        Ok(parse_author_works(&html))
    }
}

/// Parse a series-finder result page. Boxes without a title link are skipped.
pub fn parse_search(html: &str) -> Vec<CandidateSeries> {
    let document = Html::parse_document(html);
    document
        .select(&RESULT_BOX)
        .filter_map(|item| {
            let link = item.select(&RESULT_TITLE).next()?;
            Some(CandidateSeries {
                title: text_of(link),
                url: absolute_url(link.value().attr("href")?),
                cover: image_src(item, &IMAGE),
                genres: texts(item, &RESULT_GENRE),
            })
        })
        .collect()
}

/// Parse a series page. Fails only when the page has no series title.
pub fn parse_series_detail(html: &str) -> Result<SeriesDetail> {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let title = first_text(root, &SERIES_TITLE)
        .ok_or_else(|| Error::Scrape("no series title on page".to_string()))?;

    let mut description: Vec<String> = root
        .select(&SERIES_DESCRIPTION)
        .map(text_of)
        .filter(|p| !p.is_empty())
        .collect();
    description.dedup();

    // Associated names are separated by <br>, so each text node is one name.
    let associated_names = root
        .select(&SERIES_ASSOCIATED)
        .next()
        .map(|el| {
            el.text()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    // The sibling selector also catches genre and author links; keep series pages only.
    let related = links(root, &SERIES_RELATED)
        .into_iter()
        .filter(|link| link.url.contains("/series/"))
        .collect();

    Ok(SeriesDetail {
        title,
        cover: image_src(root, &SERIES_IMAGE),
        series_type: first_text(root, &SERIES_TYPE),
        genres: texts(root, &SERIES_GENRES),
        authors: links(root, &SERIES_AUTHORS),
        year: first_text(root, &SERIES_YEAR),
        original_status: first_text(root, &SERIES_STATUS),
        original_publisher: first_text(root, &SERIES_ORIGINAL_PUBLISHER),
        english_publisher: first_text(root, &SERIES_ENGLISH_PUBLISHER),
        description: description.join("\n"),
        associated_names,
        language: first_text(root, &SERIES_LANGUAGE),
        related,
    })
}

/// Parse an author page's list of series.
pub fn parse_author_works(html: &str) -> Vec<AuthorWork> {
    let document = Html::parse_document(html);
    document
        .select(&RESULT_BOX)
        .map(|item| {
            let link = item.select(&RESULT_TITLE).next();
            let title = link.map(text_of).filter(|t| !t.is_empty());
            let description = item
                .select(&RESULT_DESCRIPTION)
                .next()
                .or_else(|| item.select(&RESULT_BODY).next())
                .map(description_text)
                .unwrap_or_default();

            AuthorWork {
                title: title.unwrap_or_else(|| "No Title".to_string()),
                url: link
                    .and_then(|l| l.value().attr("href"))
                    .map(absolute_url)
                    .unwrap_or_default(),
                cover: image_src(item, &IMAGE),
                genres: texts(item, &RESULT_GENRE),
                description,
            }
        })
        .collect()
}

/// Text of a listing description, without the "more"/"less" toggles.
fn description_text(el: ElementRef<'_>) -> String {
    let mut out = String::new();
    for node in el.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let in_toggle = node.ancestors().filter_map(ElementRef::wrap).any(|a| {
            a.value().name() == "span"
                && a.value()
                    .classes()
                    .any(|c| c.starts_with("morelink") || c.starts_with("less"))
        });
        if !in_toggle {
            out.push_str(text);
        }
    }
    collapse_whitespace(&out)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn text_of(el: ElementRef<'_>) -> String {
    collapse_whitespace(&el.text().collect::<String>())
}

fn first_text(scope: ElementRef<'_>, sel: &Selector) -> Option<String> {
    scope
        .select(sel)
        .next()
        .map(text_of)
        .filter(|t| !t.is_empty())
}

fn texts(scope: ElementRef<'_>, sel: &Selector) -> Vec<String> {
    scope
        .select(sel)
        .map(text_of)
        .filter(|t| !t.is_empty())
        .collect()
}

fn links(scope: ElementRef<'_>, sel: &Selector) -> Vec<Link> {
    scope
        .select(sel)
        .filter_map(|a| {
            Some(Link {
                text: text_of(a),
                url: absolute_url(a.value().attr("href")?),
            })
        })
        .collect()
}

/// `src` of the first matching image, falling back to the lazy-load attribute.
fn image_src(scope: ElementRef<'_>, sel: &Selector) -> Option<String> {
    let img = scope.select(sel).next()?;
    img.value()
        .attr("src")
        .or_else(|| img.value().attr("data-src"))
        .map(str::trim)
        .filter(|src| !src.is_empty())
        .map(absolute_url)
}

fn absolute_url(href: &str) -> String {
    let href = href.trim();
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else if let Some(rest) = href.strip_prefix("//") {
        format!("https://{rest}")
    } else if href.starts_with('/') {
        format!("{NOVELUPDATES_BASE}{href}")
    } else {
        format!("{NOVELUPDATES_BASE}/{href}")
    }
}
