//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end against an on-disk frontier store.

use std::path::Path;
use tempfile::TempDir;
use tidemark::config::Config;
use tidemark::crawler::{compute_hash, run_crawl};
use tidemark::storage::{open_storage, FrontierStore, SqliteFrontier};
use tidemark::url::extract_domain;
use tidemark::{CrawlError, FrontierStatus};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration crawling `seed` with no delay
fn create_test_config(seed: &str, db_dir: &Path) -> Config {
    let mut config = Config::default();
    config.crawl.seed_url = Some(seed.to_string());
    config.crawl.crawl_delay_secs = 0;
    config.fetch.user_agent = "TestBot/1.0 (+https://example.com/bot)".to_string();
    config.fetch.timeout_secs = 5;
    config.paths.db_dir = db_dir.to_path_buf();
    config
}

/// Domain key of the mock server, e.g. "127.0.0.1:12345"
fn domain_of(server: &MockServer) -> String {
    let base = Url::parse(&server.uri()).expect("Failed to parse base URL");
    extract_domain(&base).expect("Failed to extract domain")
}

fn open_store(db_dir: &Path, server: &MockServer) -> SqliteFrontier {
    open_storage(db_dir, &domain_of(server), true).expect("Store should exist after a crawl")
}

async fn mount_html(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_single_domain() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(
        &mock_server,
        "/",
        format!(
            r#"<html><body>
            <a href="{}/page1">Page 1</a>
            <a href="/page2#top">Page 2</a>
            <a href="http://other.test/y">Elsewhere</a>
            </body></html>"#,
            base_url
        ),
    )
    .await;
    mount_html(&mock_server, "/page1", "<p>Content 1</p>".to_string()).await;
    mount_html(&mock_server, "/page2", r#"<a href="/">Home</a>"#.to_string()).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&format!("{}/", base_url), dir.path());

    let report = run_crawl(config).await.expect("Crawl should succeed");

    assert_eq!(report.crawled, 3);
    assert_eq!(report.failed, 0);

    let store = open_store(dir.path(), &mock_server);
    for page in ["/", "/page1", "/page2"] {
        let record = store
            .get_record(&format!("{}{}", base_url, page))
            .unwrap()
            .unwrap_or_else(|| panic!("{} should be in the frontier", page));
        assert_eq!(record.status, FrontierStatus::Crawled);
        assert_eq!(record.domain, domain_of(&mock_server));
        assert!(record.crawled_at.is_some());
    }
    assert!(store.get_record("http://other.test/y").unwrap().is_none());
    assert_eq!(store.count_by_status(FrontierStatus::Crawled).unwrap(), 3);
    assert_eq!(store.count_by_status(FrontierStatus::Pending).unwrap(), 0);
}

#[tokio::test]
async fn test_robots_txt_respect() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /secret"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    mount_html(
        &mock_server,
        "/",
        r#"<a href="/secret">Secret</a><a href="/open">Open</a>"#.to_string(),
    )
    .await;
    mount_html(&mock_server, "/open", "<p>Open</p>".to_string()).await;

    Mock::given(method("GET"))
        .and(path("/secret"))
        .respond_with(ResponseTemplate::new(200).set_body_string("classified"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&format!("{}/", base_url), dir.path());
    config.crawl.respect_robots = true;

    let report = run_crawl(config).await.expect("Crawl should succeed");

    assert_eq!(report.crawled, 2);
    let store = open_store(dir.path(), &mock_server);
    assert!(store
        .get_record(&format!("{}/secret", base_url))
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_missing_robots_txt_allows_all() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(&mock_server, "/", r#"<a href="/page">Page</a>"#.to_string()).await;
    mount_html(&mock_server, "/page", "<p>Page</p>".to_string()).await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&format!("{}/", base_url), dir.path());
    config.crawl.respect_robots = true;

    let report = run_crawl(config).await.expect("Crawl should succeed");

    assert_eq!(report.crawled, 2);
    assert_eq!(report.skipped_robots, 0);
}

#[tokio::test]
async fn test_resume_without_store_fails() {
    let dir = TempDir::new().unwrap();
    let mut config = create_test_config("http://127.0.0.1:9/", dir.path());
    config.crawl.resume = true;

    let result = run_crawl(config).await;

    assert!(matches!(result, Err(CrawlError::MissingStore { .. })));
}

#[tokio::test]
async fn test_resume_from_pending_urls() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let domain = domain_of(&mock_server);
    let root = format!("{}/", base_url);
    let pending = format!("{}/pending", base_url);

    let dir = TempDir::new().unwrap();
    {
        let mut store = open_storage(dir.path(), &domain, false).unwrap();
        store.enqueue(&domain, &root, FrontierStatus::Pending).unwrap();
        store
            .record_result(&root, "<p>old</p>", &compute_hash("<p>old</p>"), FrontierStatus::Crawled)
            .unwrap();
        store.enqueue(&domain, &pending, FrontierStatus::Pending).unwrap();
    }

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>new</p>"))
        .expect(0)
        .mount(&mock_server)
        .await;
    mount_html(&mock_server, "/pending", "<p>Finally</p>".to_string()).await;

    let mut config = create_test_config(&root, dir.path());
    config.crawl.resume = true;

    let report = run_crawl(config).await.expect("Crawl should succeed");

    assert_eq!(report.crawled, 1);
    let store = open_store(dir.path(), &mock_server);
    let record = store.get_record(&pending).unwrap().unwrap();
    assert_eq!(record.status, FrontierStatus::Crawled);
    assert_eq!(record.content.as_deref(), Some("<p>Finally</p>"));
}

#[tokio::test]
async fn test_no_duplicates_skips_repeated_content() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(
        &mock_server,
        "/",
        r#"<a href="/first">First</a><a href="/mirror">Mirror</a>"#.to_string(),
    )
    .await;
    let shared = r#"<p>Shared</p><a href="/only-from-shared">More</a>"#.to_string();
    mount_html(&mock_server, "/first", shared.clone()).await;
    mount_html(&mock_server, "/mirror", shared).await;
    mount_html(&mock_server, "/only-from-shared", "<p>Leaf</p>".to_string()).await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&format!("{}/", base_url), dir.path());
    config.crawl.no_duplicates = true;

    let report = run_crawl(config).await.expect("Crawl should succeed");

    assert_eq!(report.duplicates, 1);
    assert_eq!(report.crawled, 3);

    let store = open_store(dir.path(), &mock_server);
    let mirror = store
        .get_record(&format!("{}/mirror", base_url))
        .unwrap()
        .unwrap();
    assert_eq!(mirror.status, FrontierStatus::Pending);
    assert!(mirror.content.is_none());
    assert!(mirror.content_hash.is_none());
}

#[tokio::test]
async fn test_http_error_recorded_as_crawled() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(&mock_server, "/", r#"<a href="/missing">Gone</a>"#.to_string()).await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&format!("{}/", base_url), dir.path());

    let report = run_crawl(config).await.expect("Crawl should succeed");

    assert_eq!(report.crawled, 1);
    assert_eq!(report.failed, 1);

    let store = open_store(dir.path(), &mock_server);
    let record = store
        .get_record(&format!("{}/missing", base_url))
        .unwrap()
        .unwrap();
    assert_eq!(record.status, FrontierStatus::Crawled);
    assert_eq!(record.content.as_deref(), Some("HTTP Error 404"));
    assert_eq!(record.content_hash, Some(compute_hash("HTTP Error 404")));
}

#[tokio::test]
async fn test_server_error_is_retried() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_html(&mock_server, "/", "<p>Recovered</p>".to_string()).await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&format!("{}/", base_url), dir.path());
    config.fetch.timeout_secs = 1;

    let report = run_crawl(config).await.expect("Crawl should succeed");

    assert_eq!(report.crawled, 1);
    let store = open_store(dir.path(), &mock_server);
    let record = store.get_record(&format!("{}/", base_url)).unwrap().unwrap();
    assert_eq!(record.content.as_deref(), Some("<p>Recovered</p>"));
}

#[tokio::test]
async fn test_binary_content_stored_as_base64() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(&mock_server, "/", r#"<a href="/logo.png">Logo</a>"#.to_string()).await;
    Mock::given(method("GET"))
        .and(path("/logo.png"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(vec![0x89, b'P', b'N', b'G'])
                .insert_header("content-type", "image/png"),
        )
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&format!("{}/", base_url), dir.path());

    run_crawl(config).await.expect("Crawl should succeed");

    let store = open_store(dir.path(), &mock_server);
    let record = store
        .get_record(&format!("{}/logo.png", base_url))
        .unwrap()
        .unwrap();
    assert_eq!(record.content.as_deref(), Some("iVBORw=="));
}

#[tokio::test]
async fn test_second_run_skips_fresh_pages() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<p>Home</p>")
                .insert_header("content-type", "text/html"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let seed = format!("{}/", base_url);

    let first = run_crawl(create_test_config(&seed, dir.path()))
        .await
        .expect("First crawl should succeed");
    assert_eq!(first.crawled, 1);

    let second = run_crawl(create_test_config(&seed, dir.path()))
        .await
        .expect("Second crawl should succeed");
    assert_eq!(second.skipped_fresh, 1);
    assert_eq!(second.crawled, 0);

    let store = open_store(dir.path(), &mock_server);
    let record = store.get_record(&seed).unwrap().unwrap();
    assert_eq!(record.status, FrontierStatus::Pending);
    assert_eq!(record.content.as_deref(), Some("<p>Home</p>"));
}
