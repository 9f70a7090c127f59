//! Natural key extraction from article links
//!
//! Article links carry two numeric groups, e.g. `/news/12/48213-some-title`.
//! The key is the second group; the first one is ignored.

use crate::ExtractError;
use regex::Regex;
use std::sync::OnceLock;

fn numeric_group() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\d+").expect("numeric group pattern is valid"))
}

/// Derives the natural key of an article from its link path
///
/// Returns the second run of digits in `link`.
///
/// # Errors
///
/// `ExtractError::MissingKey` when the link has fewer than two numeric groups.
///
/// # Example
///
/// ```
/// use news_harvest::crawler::natural_key;
///
/// assert_eq!(natural_key("/news/12/48213-komi-festival").unwrap(), "48213");
/// assert!(natural_key("/1234").is_err());
/// ```
pub fn natural_key(link: &str) -> Result<String, ExtractError> {
    numeric_group()
        .find_iter(link)
        .nth(1)
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| ExtractError::MissingKey {
            link: link.to_string(),
        })
}
