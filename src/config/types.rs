use serde::Deserialize;

/// Main configuration structure for News-Harvest
///
/// Every section is optional; missing sections and keys fall back to the
/// built-in defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub selectors: SelectorConfig,
    pub languages: LanguageConfig,
    pub output: OutputConfig,
}

/// Target site configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Scheme and host every relative link is resolved against
    pub origin: String,

    /// Path prefix of listing pages; the page index is appended to it
    #[serde(rename = "listing-path")]
    pub listing_path: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            origin: "https://news.example.org".to_string(),
            listing_path: "/news/page/".to_string(),
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// First listing page index
    #[serde(rename = "start-page")]
    pub start_page: u32,

    /// Number of listing pages to walk
    #[serde(rename = "page-count")]
    pub page_count: u32,

    /// Fixed pause between consecutive requests (milliseconds)
    #[serde(rename = "request-delay-ms")]
    pub request_delay_ms: u64,

    /// Whole-request timeout (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            start_page: 0,
            page_count: 10,
            request_delay_ms: 1000,
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

/// User agent rotation configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Pool of user-agent strings; one is picked at random per request
    pub pool: Vec<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            pool: vec![
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36".to_string(),
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_4) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15".to_string(),
                "Mozilla/5.0 (X11; Linux x86_64; rv:125.0) Gecko/20100101 Firefox/125.0".to_string(),
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0".to_string(),
                "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36".to_string(),
            ],
        }
    }
}

/// CSS selectors for the structural markers on listing and detail pages
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// One listing entry
    pub entry: String,

    /// Title inside an entry
    pub title: String,

    /// Detail-page link inside an entry (its `href` is read)
    pub link: String,

    /// Language tag list inside an entry
    pub tags: String,

    /// Full-text paragraphs on a detail page
    pub text: String,

    /// Publication date on a detail page
    pub date: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            entry: "div.news-item".to_string(),
            title: ".news-item__title".to_string(),
            link: "a.news-item__link[href]".to_string(),
            tags: ".news-item__tags".to_string(),
            text: ".article__text p".to_string(),
            date: ".article__date".to_string(),
        }
    }
}

/// Language tag parsing configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LanguageConfig {
    /// Separator between language names in a tag list
    pub separator: String,

    /// Raw labels that expand to a fixed list of languages instead of being split
    pub compound: Vec<CompoundLabel>,
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            separator: ",".to_string(),
            compound: vec![CompoundLabel {
                label: "Sami languages".to_string(),
                expands: vec![
                    "Northern Sami".to_string(),
                    "Lule Sami".to_string(),
                    "Southern Sami".to_string(),
                ],
            }],
        }
    }
}

/// A tag label with a fixed expansion
#[derive(Debug, Clone, Deserialize)]
pub struct CompoundLabel {
    /// The raw label exactly as it appears on the listing page
    pub label: String,

    /// Languages the label stands for, in order
    pub expands: Vec<String>,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Path to the markdown summary file
    #[serde(rename = "summary-path")]
    pub summary_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: "./news.db".to_string(),
            summary_path: "./summary.md".to_string(),
        }
    }
}
