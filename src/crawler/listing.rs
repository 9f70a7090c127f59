//! Listing page parser
//!
//! Turns a listing page into article blocks. Each entry is read in isolation:
//! a malformed entry is skipped and the rest of the page is still returned.

use crate::config::{LanguageConfig, SelectorConfig};
use crate::{ConfigError, ExtractError};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use url::Url;

/// An article preview taken from a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub title: String,
    /// Relative path of the detail page
    pub link: String,
    /// Language names, in listing order; never empty
    pub language_tags: Vec<String>,
}

/// Splits raw tag labels into language names
///
/// Labels listed in the compound table expand to their fixed language list.
/// Any other label is split on the separator.
#[derive(Debug, Clone)]
pub struct LanguageLabels {
    separator: String,
    compound: HashMap<String, Vec<String>>,
}

impl LanguageLabels {
    pub fn from_config(config: &LanguageConfig) -> Self {
        let compound = config
            .compound
            .iter()
            .map(|entry| (entry.label.trim().to_string(), entry.expands.clone()))
            .collect();

        Self {
            separator: config.separator.clone(),
            compound,
        }
    }

    /// Resolves a raw tag label into language names
    pub fn split(&self, raw: &str) -> Vec<String> {
        let raw = raw.trim();

        if let Some(languages) = self.compound.get(raw) {
            return languages.clone();
        }

        raw.split(self.separator.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Compiled selectors and label rules for listing pages
#[derive(Debug, Clone)]
pub struct ListingRules {
    entry: Selector,
    title: Selector,
    link: Selector,
    tags: Selector,
    labels: LanguageLabels,
}

impl ListingRules {
    pub fn from_config(
        selectors: &SelectorConfig,
        languages: &LanguageConfig,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            entry: compile("entry", &selectors.entry)?,
            title: compile("title", &selectors.title)?,
            link: compile("link", &selectors.link)?,
            tags: compile("tags", &selectors.tags)?,
            labels: LanguageLabels::from_config(languages),
        })
    }
}

pub(crate) fn compile(field: &'static str, selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|_| ConfigError::InvalidSelector {
        field,
        selector: selector.to_string(),
    })
}

/// Collects the text of an element with whitespace collapsed
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// True for links without a scheme or host, e.g. `/news/1/2` or `news/1/2`
fn is_relative_path(link: &str) -> bool {
    !link.starts_with("//")
        && matches!(Url::parse(link), Err(url::ParseError::RelativeUrlWithoutBase))
}

/// Extracts article blocks from a listing page
///
/// Entries without a title, link or tag list are skipped, as are entries
/// whose link is not a relative path. A page with no recognizable entries
/// yields an empty vector.
///
/// # Example
///
/// ```
/// use news_harvest::config::{LanguageConfig, SelectorConfig};
/// use news_harvest::crawler::{extract_blocks, ListingRules};
///
/// let rules = ListingRules::from_config(&SelectorConfig::default(), &LanguageConfig::default()).unwrap();
/// let html = r#"<div class="news-item">
///   <h2 class="news-item__title">Festival</h2>
///   <a class="news-item__link" href="/news/3/77">more</a>
///   <span class="news-item__tags">Komi, Udmurt</span>
/// </div>"#;
///
/// let blocks = extract_blocks(html, &rules);
/// assert_eq!(blocks[0].language_tags, vec!["Komi", "Udmurt"]);
/// ```
pub fn extract_blocks(html: &str, rules: &ListingRules) -> Vec<Block> {
    let document = Html::parse_document(html);
    let mut blocks = Vec::new();

    for (index, entry) in document.select(&rules.entry).enumerate() {
        match parse_entry(entry, rules) {
            Ok(block) => blocks.push(block),
            Err(e) => tracing::debug!(entry = index, "Skipping listing entry: {}", e),
        }
    }

    blocks
}

fn parse_entry(entry: ElementRef<'_>, rules: &ListingRules) -> Result<Block, ExtractError> {
    let title = entry
        .select(&rules.title)
        .next()
        .map(element_text)
        .filter(|t| !t.is_empty())
        .ok_or(ExtractError::MissingMarker { marker: "title" })?;

    let link = entry
        .select(&rules.link)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .ok_or(ExtractError::MissingMarker { marker: "link" })?;

    if !is_relative_path(link) {
        return Err(ExtractError::AbsoluteLink(link.to_string()));
    }

    let raw_tags = entry
        .select(&rules.tags)
        .next()
        .map(element_text)
        .ok_or(ExtractError::MissingMarker { marker: "tags" })?;

    let language_tags = rules.labels.split(&raw_tags);
    if language_tags.is_empty() {
        return Err(ExtractError::MissingMarker { marker: "tags" });
    }

    Ok(Block {
        title,
        link: link.to_string(),
        language_tags,
    })
}
