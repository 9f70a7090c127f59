//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock news sites and test
//! the full crawl cycle end-to-end.

use news_harvest::config::Config;
use news_harvest::crawler::{CrawlReport, Coordinator, Item};
use news_harvest::storage::{
    ItemStore, RunRecord, RunStatus, SqliteStore, StorageError, StorageResult, StoredItem,
};
use news_harvest::HarvestError;
use std::path::Path;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointed at the mock server
fn create_test_config(origin: &str, db_path: &Path, page_count: u32) -> Config {
    let mut config = Config::default();
    config.site.origin = origin.to_string();
    config.crawler.start_page = 0;
    config.crawler.page_count = page_count;
    config.crawler.request_delay_ms = 0;
    config.crawler.request_timeout_secs = 5;
    config.output.database_path = db_path.display().to_string();
    config
}

fn entry(title: &str, href: &str, tags: &str) -> String {
    format!(
        r#"<div class="news-item">
            <h2 class="news-item__title">{}</h2>
            <a class="news-item__link" href="{}">Read more</a>
            <span class="news-item__tags">{}</span>
        </div>"#,
        title, href, tags
    )
}

fn listing_page(entries: &[String]) -> String {
    format!(
        "<html><head><title>News</title></head><body>{}</body></html>",
        entries.join("\n")
    )
}

fn article_page(date: &str, paragraphs: &[&str]) -> String {
    let body: String = paragraphs.iter().map(|p| format!("<p>{}</p>", p)).collect();
    format!(
        r#"<html><body>
            <span class="article__date">{}</span>
            <div class="article__text">{}</div>
        </body></html>"#,
        date, body
    )
}

async fn mount_page(server: &MockServer, route: &str, body: String, calls: Option<u64>) {
    let mock = Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html; charset=utf-8"),
        );

    match calls {
        Some(n) => mock.expect(n).mount(server).await,
        None => mock.mount(server).await,
    }
}

/// Mounts a two-page site with three articles
async fn mount_basic_site(server: &MockServer, detail_calls: Option<u64>) {
    mount_page(
        server,
        "/news/page/0",
        listing_page(&[
            entry("Reindeer race", "/news/4/101-reindeer-race", "Komi"),
            entry("Song contest", "/news/4/102-song-contest", "Komi, Udmurt"),
        ]),
        None,
    )
    .await;

    mount_page(
        server,
        "/news/page/1",
        listing_page(&[entry("Summer camp", "/news/5/103-summer-camp", "Mari")]),
        None,
    )
    .await;

    mount_page(
        server,
        "/news/4/101-reindeer-race",
        article_page("2 March 2024", &["The race took place.", "Forty teams joined."]),
        detail_calls,
    )
    .await;

    mount_page(
        server,
        "/news/4/102-song-contest",
        article_page("5 March 2024", &["Singers gathered."]),
        detail_calls,
    )
    .await;

    mount_page(
        server,
        "/news/5/103-summer-camp",
        article_page("1 June 2024", &["Camp opens in July."]),
        detail_calls,
    )
    .await;
}

#[tokio::test]
async fn test_full_crawl_stores_all_items() {
    let mock_server = MockServer::start().await;
    mount_basic_site(&mock_server, Some(1)).await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("news.db");
    let config = create_test_config(&mock_server.uri(), &db_path, 2);

    let store = SqliteStore::open(&db_path).expect("Failed to open DB");
    let mut coordinator = Coordinator::new(config, store).expect("Failed to create coordinator");
    let report = coordinator.run().await.expect("Crawl failed");

    assert_eq!(report.pages_fetched, 2);
    assert_eq!(report.blocks_seen, 3);
    assert_eq!(report.items_inserted, 3);
    assert_eq!(report.duplicates, 0);
    assert_eq!(report.failed_blocks(), 0);

    let mut store = coordinator.into_store();
    assert_eq!(store.count_items().unwrap(), 3);
    assert!(store.has("101"));
    assert!(store.has("102"));
    assert!(store.has("103"));

    // Languages get ids in order of first sighting
    assert_eq!(store.language_id("Komi").unwrap(), 1);
    assert_eq!(store.language_id("Udmurt").unwrap(), 2);
    assert_eq!(store.language_id("Mari").unwrap(), 3);

    let item = store.get_item("101").unwrap().expect("item 101 stored");
    assert_eq!(item.title, "Reindeer race");
    assert_eq!(item.link, "/news/4/101-reindeer-race");
    assert_eq!(item.date, "2 March 2024");
    assert_eq!(item.full_text, "The race took place.\nForty teams joined.");

    let mut languages = store.get_item("102").unwrap().unwrap().languages;
    languages.sort();
    assert_eq!(languages, vec!["Komi", "Udmurt"]);

    let run = store.get_latest_run().unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.report, report);
}

#[tokio::test]
async fn test_recrawl_skips_stored_items() {
    let mock_server = MockServer::start().await;
    // Every detail page may be fetched exactly once across both runs
    mount_basic_site(&mock_server, Some(1)).await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("news.db");

    let first = {
        let config = create_test_config(&mock_server.uri(), &db_path, 2);
        let store = SqliteStore::open(&db_path).unwrap();
        let mut coordinator = Coordinator::new(config, store).unwrap();
        coordinator.run().await.expect("First crawl failed")
    };
    assert_eq!(first.items_inserted, 3);

    // Reopen from disk so the seen-set is rebuilt from the database
    let config = create_test_config(&mock_server.uri(), &db_path, 2);
    let store = SqliteStore::open(&db_path).unwrap();
    let mut coordinator = Coordinator::new(config, store).unwrap();
    let second = coordinator.run().await.expect("Second crawl failed");

    assert_eq!(second.items_inserted, 0);
    assert_eq!(second.duplicates, 3);
    assert_eq!(coordinator.store().count_items().unwrap(), 3);
    assert_eq!(coordinator.store().count_languages().unwrap(), 3);
}

#[tokio::test]
async fn test_shared_key_on_one_page_is_stored_once() {
    let mock_server = MockServer::start().await;

    // Both links have 500 as their second numeric group
    mount_page(
        &mock_server,
        "/news/page/0",
        listing_page(&[
            entry("Original", "/news/1/500-original", "Komi, Mari"),
            entry("Repost", "/news/2/500-repost", "Erzya"),
        ]),
        None,
    )
    .await;
    mount_page(
        &mock_server,
        "/news/1/500-original",
        article_page("9 April 2024", &["Original text."]),
        Some(1),
    )
    .await;
    mount_page(
        &mock_server,
        "/news/2/500-repost",
        article_page("10 April 2024", &["Repost text."]),
        Some(0),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("news.db");
    let config = create_test_config(&mock_server.uri(), &db_path, 1);

    let mut coordinator = Coordinator::new(config, SqliteStore::open(&db_path).unwrap()).unwrap();
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.items_inserted, 1);
    assert_eq!(report.duplicates, 1);

    let store = coordinator.store();
    assert_eq!(store.count_items().unwrap(), 1);
    let item = store.get_item("500").unwrap().unwrap();
    assert_eq!(item.title, "Original");
    assert_eq!(item.languages.len(), 2);
    // The repost's language was never seen
    assert_eq!(store.count_languages().unwrap(), 2);
}

#[tokio::test]
async fn test_failed_listing_page_does_not_stop_crawl() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/news/page/0"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;
    mount_page(
        &mock_server,
        "/news/page/1",
        listing_page(&[entry("Later", "/news/7/700-later", "Veps")]),
        None,
    )
    .await;
    mount_page(
        &mock_server,
        "/news/7/700-later",
        article_page("1 May 2024", &["Still crawled."]),
        Some(1),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("news.db");
    let config = create_test_config(&mock_server.uri(), &db_path, 2);

    let mut coordinator = Coordinator::new(config, SqliteStore::open(&db_path).unwrap()).unwrap();
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.pages_failed, 1);
    assert_eq!(report.pages_fetched, 1);
    assert_eq!(report.items_inserted, 1);
    assert!(coordinator.store().has("700"));
}

#[tokio::test]
async fn test_slow_responses_time_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/news/page/0"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(listing_page(&[entry("Never", "/news/1/901-never", "Komi")]))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;
    mount_page(
        &mock_server,
        "/news/page/1",
        listing_page(&[
            entry("Slow", "/news/2/902-slow", "Komi"),
            entry("Quick", "/news/2/903-quick", "Mari"),
        ]),
        None,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/news/2/902-slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(article_page("4 May 2024", &["Too late."]))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;
    mount_page(
        &mock_server,
        "/news/2/903-quick",
        article_page("4 May 2024", &["On time."]),
        Some(1),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("news.db");
    let mut config = create_test_config(&mock_server.uri(), &db_path, 2);
    config.crawler.request_timeout_secs = 1;

    let mut coordinator = Coordinator::new(config, SqliteStore::open(&db_path).unwrap()).unwrap();
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.pages_failed, 1);
    assert_eq!(report.pages_fetched, 1);
    assert_eq!(report.transport_failures, 1);
    assert_eq!(report.items_inserted, 1);

    let store = coordinator.store();
    assert!(store.has("903"));
    assert!(!store.has("902"));
    assert!(!store.has("901"));
    let run = store.get_latest_run().unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Completed);
}

#[tokio::test]
async fn test_bad_blocks_are_isolated() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/news/page/0",
        listing_page(&[
            entry("Gone", "/news/1/801-gone", "Komi"),
            entry("No date", "/news/1/802-no-date", "Komi"),
            entry("No key", "/news/803-no-key", "Komi"),
            entry("Fine", "/news/1/804-fine", "Komi"),
        ]),
        None,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/news/1/801-gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(
        &mock_server,
        "/news/1/802-no-date",
        r#"<html><body><div class="article__text"><p>Text only.</p></div></body></html>"#
            .to_string(),
        Some(1),
    )
    .await;
    mount_page(
        &mock_server,
        "/news/1/804-fine",
        article_page("3 May 2024", &["All good."]),
        Some(1),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("news.db");
    let config = create_test_config(&mock_server.uri(), &db_path, 1);

    let mut coordinator = Coordinator::new(config, SqliteStore::open(&db_path).unwrap()).unwrap();
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.blocks_seen, 4);
    assert_eq!(report.transport_failures, 1);
    assert_eq!(report.extraction_failures, 2);
    assert_eq!(report.items_inserted, 1);

    let store = coordinator.store();
    assert!(store.has("804"));
    assert!(!store.has("801"));
    assert!(!store.has("802"));
}

#[tokio::test]
async fn test_compound_label_stores_three_languages() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/news/page/0",
        listing_page(&[entry("Sami news", "/news/9/901-sami", "Sami languages")]),
        None,
    )
    .await;
    mount_page(
        &mock_server,
        "/news/9/901-sami",
        article_page("7 July 2024", &["Text."]),
        Some(1),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("news.db");
    let config = create_test_config(&mock_server.uri(), &db_path, 1);

    let mut coordinator = Coordinator::new(config, SqliteStore::open(&db_path).unwrap()).unwrap();
    coordinator.run().await.unwrap();

    let item = coordinator.store().get_item("901").unwrap().unwrap();
    assert_eq!(
        item.languages,
        vec!["Northern Sami", "Lule Sami", "Southern Sami"]
    );
}

#[tokio::test]
async fn test_requests_use_pool_user_agent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/news/page/0"))
        .and(header("user-agent", "HarvestTest/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&[])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("news.db");
    let mut config = create_test_config(&mock_server.uri(), &db_path, 1);
    config.user_agent.pool = vec!["HarvestTest/1.0".to_string()];

    let mut coordinator = Coordinator::new(config, SqliteStore::open(&db_path).unwrap()).unwrap();
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.pages_fetched, 1);
    assert_eq!(report.blocks_seen, 0);
}

/// Store whose inserts always fail, for exercising the abort path
struct FailingStore {
    inner: SqliteStore,
}

impl ItemStore for FailingStore {
    fn has(&self, natural_key: &str) -> bool {
        self.inner.has(natural_key)
    }

    fn language_id(&mut self, name: &str) -> StorageResult<i64> {
        self.inner.language_id(name)
    }

    fn insert(&mut self, item: &Item) -> StorageResult<()> {
        Err(StorageError::DuplicateKey(item.natural_key.clone()))
    }

    fn get_item(&self, natural_key: &str) -> StorageResult<Option<StoredItem>> {
        self.inner.get_item(natural_key)
    }

    fn count_items(&self) -> StorageResult<u64> {
        self.inner.count_items()
    }

    fn count_languages(&self) -> StorageResult<u64> {
        self.inner.count_languages()
    }

    fn language_item_counts(&self) -> StorageResult<Vec<(String, u64)>> {
        self.inner.language_item_counts()
    }

    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        self.inner.create_run(config_hash)
    }

    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        report: &CrawlReport,
    ) -> StorageResult<()> {
        self.inner.finish_run(run_id, status, report)
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        self.inner.get_latest_run()
    }
}

#[tokio::test]
async fn test_store_error_aborts_run() {
    let mock_server = MockServer::start().await;
    mount_basic_site(&mock_server, None).await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("news.db");
    let config = create_test_config(&mock_server.uri(), &db_path, 2);

    let store = FailingStore {
        inner: SqliteStore::open_in_memory().unwrap(),
    };
    let mut coordinator = Coordinator::new(config, store).unwrap();
    let result = coordinator.run().await;

    assert!(matches!(result, Err(HarvestError::Storage(_))));

    let run = coordinator.store().get_latest_run().unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Failed);
    assert_eq!(run.report.items_inserted, 0);
    // Aborted on the first block of the first page
    assert_eq!(run.report.pages_fetched, 1);
}
