//! Detail page extraction
//!
//! Fetches the detail page of one block and pulls out its full text and
//! publication date. Every outcome, good or bad, comes back as an
//! `ItemOutcome` so the coordinator can branch on it without unwinding.

use crate::config::SelectorConfig;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::listing::{compile, element_text, Block};
use crate::{ConfigError, ExtractError, FetchError};
use scraper::{Html, Selector};
use url::Url;

/// A fully extracted article, ready to be stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub natural_key: String,
    pub title: String,
    pub link: String,
    pub languages: Vec<String>,
    pub full_text: String,
    /// Publication date as printed by the site
    pub date: String,
}

/// Text and date taken from a detail page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleBody {
    pub full_text: String,
    pub date: String,
}

/// Result of extracting one block
#[derive(Debug)]
pub enum ItemOutcome {
    /// The detail page was fetched and parsed
    Extracted(Item),

    /// The detail page was fetched but a marker was missing
    ExtractionFailed { url: String, reason: ExtractError },

    /// The detail page could not be fetched
    TransportFailed { url: String, error: FetchError },
}

/// Compiled selectors for detail pages
#[derive(Debug, Clone)]
pub struct ArticleRules {
    text: Selector,
    date: Selector,
}

impl ArticleRules {
    pub fn from_config(selectors: &SelectorConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            text: compile("text", &selectors.text)?,
            date: compile("date", &selectors.date)?,
        })
    }
}

/// Parses the full text and date out of a detail page
///
/// Paragraphs matched by the text selector are joined with newlines; empty
/// ones are dropped.
pub fn parse_article(html: &str, rules: &ArticleRules) -> Result<ArticleBody, ExtractError> {
    let document = Html::parse_document(html);

    let full_text = document
        .select(&rules.text)
        .map(element_text)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    if full_text.is_empty() {
        return Err(ExtractError::MissingMarker { marker: "text" });
    }

    let date = document
        .select(&rules.date)
        .next()
        .map(element_text)
        .filter(|d| !d.is_empty())
        .ok_or(ExtractError::MissingMarker { marker: "date" })?;

    Ok(ArticleBody { full_text, date })
}

/// Builds the absolute detail-page URL for a relative link
pub fn detail_url(origin: &Url, link: &str) -> Result<Url, url::ParseError> {
    origin.join(link)
}

/// Fetches and parses the detail page of `block`
///
/// Never fails outright: transport and parse problems are reported through
/// the returned `ItemOutcome`.
pub async fn extract_article(
    fetcher: &Fetcher,
    origin: &Url,
    rules: &ArticleRules,
    block: Block,
    natural_key: String,
) -> ItemOutcome {
    let url = match detail_url(origin, &block.link) {
        Ok(url) => url.to_string(),
        Err(source) => {
            return ItemOutcome::ExtractionFailed {
                url: block.link.clone(),
                reason: ExtractError::BadLink {
                    link: block.link,
                    source,
                },
            }
        }
    };

    let html = match fetcher.fetch(&url).await {
        Ok(html) => html,
        Err(error) => return ItemOutcome::TransportFailed { url, error },
    };

    match parse_article(&html, rules) {
        Ok(body) => ItemOutcome::Extracted(Item {
            natural_key,
            title: block.title,
            link: block.link,
            languages: block.language_tags,
            full_text: body.full_text,
            date: body.date,
        }),
        Err(reason) => ItemOutcome::ExtractionFailed { url, reason },
    }
}
