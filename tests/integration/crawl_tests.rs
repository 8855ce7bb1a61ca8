//! Integration tests for the crawl run
//!
//! A scripted renderer stands in for the browser so every property of the
//! worker pool can be observed without a network.

use async_trait::async_trait;
use onion_lens::anonymity::AnonymityCheck;
use onion_lens::config::{Config, CrawlerConfig, OutputConfig};
use onion_lens::crawler::{run_crawl, Coordinator, SUCCESS_DETAIL};
use onion_lens::output::CrawlReport;
use onion_lens::output::{HTML_DIR, IMAGE_DIR, LINKS_DIR};
use onion_lens::render::{RenderError, RenderResult, Renderer};
use onion_lens::{CrawlError, Destination, TaskStatus};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

/// How the stub answers one URL
#[derive(Clone)]
enum Script {
    Ok { links: Vec<String> },
    Fail,
    Slow(Duration),
}

/// Renderer following a per-URL script, tracking call and concurrency counts
struct StubRenderer {
    scripts: HashMap<String, Script>,
    delay: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl StubRenderer {
    fn new() -> Self {
        Self {
            scripts: HashMap::new(),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn script(mut self, url: &str, script: Script) -> Self {
        self.scripts.insert(url.to_string(), script);
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

/// Decrements the in-flight counter even when the render future is dropped
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Renderer for StubRenderer {
    async fn render(&self, url: &str) -> Result<RenderResult, RenderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        tokio::time::sleep(self.delay).await;

        let script = self.scripts.get(url).cloned().unwrap_or(Script::Ok {
            links: vec![format!("{}/about", url)],
        });
        match script {
            Script::Ok { links } => Ok(RenderResult {
                markup: format!("<html><body>{}</body></html>", url),
                image: vec![0x89, b'P', b'N', b'G'],
                links,
            }),
            Script::Fail => Err(RenderError::Navigation(format!(
                "net::ERR_NAME_NOT_RESOLVED at {}",
                url
            ))),
            Script::Slow(delay) => {
                tokio::time::sleep(delay).await;
                Ok(RenderResult::default())
            }
        }
    }
}

struct StubCheck {
    connected: bool,
    calls: AtomicUsize,
}

impl StubCheck {
    fn new(connected: bool) -> Self {
        Self {
            connected,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl AnonymityCheck for StubCheck {
    async fn verify(&self) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.connected
    }
}

/// Creates a test configuration rooted in a temporary directory
fn create_test_config(dir: &Path, workers: usize) -> Config {
    Config {
        crawler: CrawlerConfig {
            workers,
            task_timeout_secs: 5,
            queue_capacity: 0,
        },
        output: OutputConfig {
            root: dir.join("scraped_data"),
            log_path: dir.join("scan_report.log"),
            targets_path: dir.join("targets.yaml"),
        },
        ..Config::default()
    }
}

fn write_targets(config: &Config, destinations: &[&str]) {
    let mut content = String::from("# crawl list\nurls:\n");
    for d in destinations {
        content.push_str(&format!("  - {}\n", d));
    }
    std::fs::write(&config.output.targets_path, content).unwrap();
}

/// Runs a full crawl that is never interrupted
async fn crawl(
    config: Config,
    check: &StubCheck,
    renderer: Arc<StubRenderer>,
) -> Result<CrawlReport, CrawlError> {
    run_crawl(config, check, renderer, CancellationToken::new()).await
}

fn count_files(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}

fn log_lines(config: &Config) -> Vec<String> {
    std::fs::read_to_string(&config.output.log_path)
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn test_every_destination_gets_one_record() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path(), 3);
    let destinations: Vec<String> = (0..12).map(|i| format!("site{}.onion", i)).collect();
    let refs: Vec<&str> = destinations.iter().map(String::as_str).collect();
    write_targets(&config, &refs);

    let renderer = Arc::new(
        StubRenderer::new()
            .script("http://site3.onion", Script::Fail)
            .script("http://site7.onion", Script::Fail),
    );
    let report = crawl(config.clone(), &StubCheck::new(true), renderer.clone())
        .await
        .unwrap();

    assert_eq!(report.total(), 12);
    assert_eq!(report.failed(), 2);
    assert_eq!(renderer.calls(), 12);
    for d in &destinations {
        assert!(report.record_for(d).is_some(), "no record for {}", d);
    }

    let lines = log_lines(&config);
    assert_eq!(lines.len(), 12);
    for d in &destinations {
        let prefix = format!("] {} -> ", d);
        assert_eq!(lines.iter().filter(|l| l.contains(&prefix)).count(), 1);
    }
}

#[tokio::test]
async fn test_failed_verification_does_no_crawl_work() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path(), 2);
    write_targets(&config, &["a.onion", "b.onion"]);

    let renderer = Arc::new(StubRenderer::new());
    let check = StubCheck::new(false);
    let result = crawl(config.clone(), &check, renderer.clone()).await;

    assert!(matches!(result, Err(CrawlError::VerificationFailed)));
    assert_eq!(check.calls.load(Ordering::SeqCst), 1);
    assert_eq!(renderer.calls(), 0);
    assert!(!config.output.root.exists());
    assert!(!config.output.log_path.exists());
}

#[tokio::test]
async fn test_failed_render_writes_no_artifacts() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path(), 1);
    write_targets(&config, &["gone.onion"]);

    let renderer = Arc::new(StubRenderer::new().script("http://gone.onion", Script::Fail));
    let report = crawl(config.clone(), &StubCheck::new(true), renderer)
        .await
        .unwrap();

    let record = report.record_for("gone.onion").unwrap();
    assert_eq!(record.status, TaskStatus::Fail);
    assert!(record.detail.contains("ERR_NAME_NOT_RESOLVED"));

    for sub in [HTML_DIR, IMAGE_DIR, LINKS_DIR] {
        assert_eq!(count_files(&config.output.root.join(sub)), 0, "{}", sub);
    }
}

#[tokio::test]
async fn test_success_writes_three_artifacts() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path(), 1);
    write_targets(&config, &["https://news.onion/today"]);

    let links = vec![
        "http://news.onion/a".to_string(),
        "http://news.onion/b".to_string(),
        "http://other.onion/".to_string(),
    ];
    let renderer = Arc::new(StubRenderer::new().script(
        "https://news.onion/today",
        Script::Ok {
            links: links.clone(),
        },
    ));
    let report = crawl(config.clone(), &StubCheck::new(true), renderer)
        .await
        .unwrap();
    assert_eq!(report.succeeded(), 1);

    let root = &config.output.root;
    let markup = std::fs::read_to_string(root.join(HTML_DIR).join("news_today.html")).unwrap();
    assert!(markup.contains("https://news.onion/today"));
    let image = std::fs::read(root.join(IMAGE_DIR).join("news_today.png")).unwrap();
    assert_eq!(image, vec![0x89, b'P', b'N', b'G']);
    let listed = std::fs::read_to_string(root.join(LINKS_DIR).join("news_today_links.txt")).unwrap();
    assert_eq!(listed.lines().collect::<Vec<_>>(), links);
}

#[tokio::test]
async fn test_concurrency_never_exceeds_workers() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path(), 3);
    let destinations: Vec<String> = (0..15).map(|i| format!("n{}.onion", i)).collect();
    let refs: Vec<&str> = destinations.iter().map(String::as_str).collect();
    write_targets(&config, &refs);

    let renderer = Arc::new(StubRenderer::new().with_delay(Duration::from_millis(50)));
    let report = crawl(config, &StubCheck::new(true), renderer.clone())
        .await
        .unwrap();

    assert_eq!(report.total(), 15);
    // The pool is saturated but never exceeded
    assert_eq!(renderer.max_in_flight(), 3);
}

#[tokio::test]
async fn test_timeout_fails_task_and_frees_worker() {
    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(dir.path(), 1);
    config.crawler.task_timeout_secs = 1;
    write_targets(&config, &["slow.onion", "fast.onion"]);

    let renderer = Arc::new(
        StubRenderer::new().script("http://slow.onion", Script::Slow(Duration::from_secs(30))),
    );
    let started = Instant::now();
    let report = crawl(config.clone(), &StubCheck::new(true), renderer)
        .await
        .unwrap();

    assert!(started.elapsed() < Duration::from_secs(10));

    let slow = report.record_for("slow.onion").unwrap();
    assert_eq!(slow.status, TaskStatus::Fail);
    assert!(slow.detail.starts_with("render timed out after"));
    assert!(!config.output.root.join(HTML_DIR).join("slow.html").exists());

    let fast = report.record_for("fast.onion").unwrap();
    assert_eq!(fast.status, TaskStatus::Success);
}

#[tokio::test]
async fn test_small_queue_still_drains_every_destination() {
    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(dir.path(), 2);
    config.crawler.queue_capacity = 1;
    let destinations: Vec<String> = (0..8).map(|i| format!("q{}.onion", i)).collect();
    let refs: Vec<&str> = destinations.iter().map(String::as_str).collect();
    write_targets(&config, &refs);

    let renderer = Arc::new(StubRenderer::new().with_delay(Duration::from_millis(10)));
    let report = crawl(config, &StubCheck::new(true), renderer.clone())
        .await
        .unwrap();

    assert_eq!(report.total(), 8);
    assert_eq!(renderer.calls(), 8);
}

#[tokio::test]
async fn test_cancellation_mid_run_records_remaining_destinations() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path(), 1);

    let renderer = Arc::new(StubRenderer::new().with_delay(Duration::from_secs(30)));
    let coordinator = Coordinator::new(config, renderer.clone());
    let token = coordinator.shutdown_token();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        token.cancel();
    });

    let targets: Vec<Destination> = ["a.onion", "b.onion", "c.onion"]
        .iter()
        .filter_map(|s| Destination::new(s))
        .collect();
    let report = coordinator.crawl_targets(targets).await.unwrap();

    assert_eq!(report.total(), 3);
    assert_eq!(report.failed(), 3);
    assert!(report.records.iter().all(|r| r.detail == "render cancelled"));
    assert_eq!(renderer.calls(), 1);
}

#[tokio::test]
async fn test_two_destination_scenario() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path(), 5);
    write_targets(&config, &["a.onion", "b.onion"]);

    let renderer = Arc::new(
        StubRenderer::new()
            .script(
                "http://a.onion",
                Script::Ok {
                    links: vec!["http://x.onion/".to_string(), "http://y.onion/".to_string()],
                },
            )
            .script("http://b.onion", Script::Fail),
    );
    let report = crawl(config.clone(), &StubCheck::new(true), renderer)
        .await
        .unwrap();

    let root = &config.output.root;
    assert!(root.join(HTML_DIR).join("a.html").is_file());
    assert!(root.join(IMAGE_DIR).join("a.png").is_file());
    let links = std::fs::read_to_string(root.join(LINKS_DIR).join("a_links.txt")).unwrap();
    assert_eq!(links.lines().count(), 2);
    assert!(!root.join(HTML_DIR).join("b.html").exists());

    assert_eq!(
        report.record_for("a.onion").unwrap().detail,
        SUCCESS_DETAIL
    );
    let lines = log_lines(&config);
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().any(|l| l.contains("a.onion -> SUCCESS (Saved HTML, IMG, URLs)")));
    assert!(lines.iter().any(|l| l.contains("b.onion -> FAIL (")));
}

#[tokio::test]
async fn test_artifact_write_failure_fails_only_that_task() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path(), 2);
    write_targets(&config, &["ok1.onion", "blocked.onion", "ok2.onion"]);

    // A directory where the screenshot belongs makes that single write fail
    let root = &config.output.root;
    std::fs::create_dir_all(root.join(IMAGE_DIR).join("blocked.png")).unwrap();

    let report = crawl(config.clone(), &StubCheck::new(true), Arc::new(StubRenderer::new()))
        .await
        .unwrap();

    assert_eq!(report.total(), 3);
    assert_eq!(report.succeeded(), 2);

    let blocked = report.record_for("blocked.onion").unwrap();
    assert_eq!(blocked.status, TaskStatus::Fail);
    assert!(blocked.detail.starts_with("Failed to write"));
    assert!(blocked.detail.contains("blocked.png"));

    // No rollback: the writes that succeeded stay on disk
    assert!(root.join(HTML_DIR).join("blocked.html").is_file());
    assert!(root.join(LINKS_DIR).join("blocked_links.txt").is_file());

    for name in ["ok1", "ok2"] {
        assert!(root.join(HTML_DIR).join(format!("{}.html", name)).is_file());
        assert!(root.join(IMAGE_DIR).join(format!("{}.png", name)).is_file());
    }

    let lines = log_lines(&config);
    assert!(lines
        .iter()
        .any(|l| l.contains("blocked.onion -> FAIL (Failed to write")));
}
