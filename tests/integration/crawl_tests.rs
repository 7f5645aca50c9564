//! Integration tests for the mirror
//!
//! These tests use wiremock to create mock HTTP servers and run the full
//! fetch/extract/persist cycle end-to-end against a temporary output directory.

use std::time::Duration;
use sumi_mirror::config::CrawlConfig;
use sumi_mirror::crawler::{prepare, run_until};
use sumi_mirror::SupervisorState;
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration rooted at the mock server
fn create_test_config(base_url: &str, dest: &TempDir) -> CrawlConfig {
    CrawlConfig::new(Url::parse(base_url).expect("Failed to parse base URL"), dest.path())
        .with_max_depth(3)
        .with_max_pages(50)
        .with_concurrency(4)
        .with_fetch_timeout(Some(Duration::from_secs(5)))
}

async fn mount_html(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html"))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_mirror_single_site() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(
        &mock_server,
        "/",
        format!(
            r#"<html><head><title>Home</title></head><body>
            <a href="{}/page1">Page 1</a>
            <a href="/page2">Page 2</a>
            <a href="http://other.example/offsite">Offsite</a>
            </body></html>"#,
            base_url
        ),
    )
    .await;
    mount_html(
        &mock_server,
        "/page1",
        r#"<html><body><a href="/">Home</a><a href="/docs/guide">Guide</a></body></html>"#
            .to_string(),
    )
    .await;
    mount_html(
        &mock_server,
        "/page2",
        "<html><body>Content 2</body></html>".to_string(),
    )
    .await;
    mount_html(
        &mock_server,
        "/docs/guide",
        "<html><body>Guide</body></html>".to_string(),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/style.css"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("body{}", "text/css"))
        .mount(&mock_server)
        .await;

    let dest = TempDir::new().expect("Failed to create temp dir");
    let supervisor = prepare(create_test_config(&base_url, &dest))
        .await
        .expect("Failed to prepare");

    let stats = run_until(&supervisor, std::future::pending())
        .await
        .expect("Mirror failed");

    assert_eq!(stats.pages_claimed, 4);
    assert_eq!(stats.pages_fetched, 4);
    assert_eq!(stats.files_written, 4);
    assert_eq!(supervisor.state(), SupervisorState::Drained);

    for name in ["index.html", "page1.html", "page2.html", "guide.html"] {
        assert!(dest.path().join(name).is_file(), "missing {}", name);
    }
    assert_eq!(
        std::fs::read_to_string(dest.path().join("page2.html")).unwrap(),
        "<html><body>Content 2</body></html>"
    );
}

#[tokio::test]
async fn test_root_without_anchors_writes_one_file() {
    let mock_server = MockServer::start().await;
    mount_html(
        &mock_server,
        "/start",
        "<html><body><p>No links here</p></body></html>".to_string(),
    )
    .await;

    let dest = TempDir::new().unwrap();
    let root = format!("{}/start", mock_server.uri());
    let supervisor = prepare(create_test_config(&root, &dest)).await.unwrap();

    let stats = run_until(&supervisor, std::future::pending()).await.unwrap();

    assert_eq!(stats.files_written, 1);
    let files: Vec<_> = std::fs::read_dir(dest.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(files, vec!["start.html".to_string()]);
}

#[tokio::test]
async fn test_failed_pages_do_not_block_siblings() {
    let mock_server = MockServer::start().await;

    mount_html(
        &mock_server,
        "/",
        r#"<a href="/good">Good</a>
           <a href="/missing">Missing</a>
           <a href="/broken">Broken</a>
           <a href="/also-good">Also good</a>"#
            .to_string(),
    )
    .await;
    mount_html(&mock_server, "/good", "good".to_string()).await;
    mount_html(&mock_server, "/also-good", "also good".to_string()).await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let dest = TempDir::new().unwrap();
    let supervisor = prepare(create_test_config(&mock_server.uri(), &dest)).await.unwrap();

    let stats = run_until(&supervisor, std::future::pending()).await.unwrap();

    assert_eq!(stats.pages_fetched, 3);
    assert_eq!(stats.pages_failed, 2);
    assert!(dest.path().join("good.html").is_file());
    assert!(dest.path().join("also-good.html").is_file());
    assert!(!dest.path().join("missing.html").exists());
    assert!(!dest.path().join("broken.html").exists());
}

#[tokio::test]
async fn test_max_depth_zero_fetches_only_root() {
    let mock_server = MockServer::start().await;

    mount_html(
        &mock_server,
        "/",
        r#"<a href="/a">A</a><a href="/b">B</a>"#.to_string(),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dest = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), &dest).with_max_depth(0);
    let supervisor = prepare(config).await.unwrap();

    let stats = run_until(&supervisor, std::future::pending()).await.unwrap();

    assert_eq!(stats.pages_claimed, 1);
    assert_eq!(stats.files_written, 1);
}

#[tokio::test]
async fn test_each_url_fetched_once() {
    let mock_server = MockServer::start().await;

    // Every page links to every other page, plus fragment and slash variants
    let nav = r#"<a href="/">Home</a><a href="/x">X</a><a href="/x/">X/</a>
                 <a href="/y#top">Y</a><a href="/y">Y</a>"#;
    for route in ["/", "/x", "/y"] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_raw(nav, "text/html"))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let dest = TempDir::new().unwrap();
    let supervisor = prepare(create_test_config(&mock_server.uri(), &dest)).await.unwrap();

    let stats = run_until(&supervisor, std::future::pending()).await.unwrap();

    assert_eq!(stats.pages_claimed, 3);
    mock_server.verify().await;
}

#[tokio::test]
async fn test_non_html_is_saved_but_not_parsed() {
    let mock_server = MockServer::start().await;

    mount_html(
        &mock_server,
        "/",
        r#"<a href="/notes.txt">Notes</a>"#.to_string(),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/notes.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(r#"<a href="/hidden">x</a>"#, "text/plain"),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/hidden"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dest = TempDir::new().unwrap();
    let supervisor = prepare(create_test_config(&mock_server.uri(), &dest)).await.unwrap();

    let stats = run_until(&supervisor, std::future::pending()).await.unwrap();

    assert_eq!(stats.files_written, 2);
    assert!(dest.path().join("notes.txt").is_file());
}

#[tokio::test]
async fn test_interrupt_persists_in_flight_pages() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"<a href="/later">Later</a>"#, "text/html")
                .set_delay(Duration::from_millis(400)),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/later"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dest = TempDir::new().unwrap();
    let supervisor = prepare(create_test_config(&mock_server.uri(), &dest)).await.unwrap();

    let stats = run_until(&supervisor, tokio::time::sleep(Duration::from_millis(100)))
        .await
        .unwrap();

    assert!(stats.stopped_early);
    assert_eq!(stats.files_written, 1);
    assert!(dest.path().join("index.html").is_file());
    assert_eq!(supervisor.state(), SupervisorState::Drained);
    assert_eq!(supervisor.in_flight(), 0);
    assert!(supervisor.is_channel_closed());
}

#[tokio::test]
async fn test_resume_skips_existing_pages() {
    let mock_server = MockServer::start().await;

    mount_html(
        &mock_server,
        "/",
        r#"<a href="/done">Done</a><a href="/todo">Todo</a>"#.to_string(),
    )
    .await;
    mount_html(&mock_server, "/todo", "todo".to_string()).await;
    Mock::given(method("GET"))
        .and(path("/done"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("fresh", "text/html"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dest = TempDir::new().unwrap();
    std::fs::write(dest.path().join("done.html"), "from last run").unwrap();

    let config = create_test_config(&mock_server.uri(), &dest).with_resume(true);
    let supervisor = prepare(config).await.unwrap();

    let stats = run_until(&supervisor, std::future::pending()).await.unwrap();

    assert_eq!(stats.pages_claimed, 2);
    assert_eq!(
        std::fs::read_to_string(dest.path().join("done.html")).unwrap(),
        "from last run"
    );
    assert!(dest.path().join("todo.html").is_file());
}

#[tokio::test]
async fn test_redirect_to_directory_keeps_relative_links() {
    let mock_server = MockServer::start().await;

    mount_html(
        &mock_server,
        "/",
        r#"<a href="/docs">Docs</a><a href="/docs/">Docs again</a>"#.to_string(),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/docs"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/docs/"))
        .mount(&mock_server)
        .await;
    mount_html(
        &mock_server,
        "/docs/",
        r#"<a href="intro">Intro</a>"#.to_string(),
    )
    .await;
    mount_html(&mock_server, "/docs/intro", "intro".to_string()).await;
    Mock::given(method("GET"))
        .and(path("/intro"))
        .respond_with(ResponseTemplate::new(404))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dest = TempDir::new().unwrap();
    let supervisor = prepare(create_test_config(&mock_server.uri(), &dest))
        .await
        .unwrap();

    let stats = run_until(&supervisor, std::future::pending()).await.unwrap();

    assert_eq!(stats.pages_fetched, 3);
    assert_eq!(stats.pages_failed, 0);
    assert_eq!(
        std::fs::read_to_string(dest.path().join("intro.html")).unwrap(),
        "intro"
    );
    assert!(dest.path().join("docs.html").is_file());
}
