use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for Onion-Lens
///
/// Every section and key has a default, so an empty file (or no file at all)
/// reproduces the stock behaviour: Tor on `127.0.0.1:9050`, five workers,
/// a 40 second page deadline and output under `scraped_data/`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub proxy: ProxyConfig,
    pub crawler: CrawlerConfig,
    pub renderer: RendererConfig,
    pub output: OutputConfig,
}

/// Anonymizing proxy configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ProxyConfig {
    /// SOCKS5 proxy address as `host:port`
    pub address: String,

    /// Page that confirms whether the request arrived through Tor
    pub check_url: String,

    /// Timeout for the verification request (seconds)
    pub check_timeout_secs: u64,
}

impl ProxyConfig {
    /// Proxy URL for the HTTP client; `socks5h` so hostnames resolve on the Tor side
    pub fn client_proxy_url(&self) -> String {
        format!("socks5h://{}", self.address)
    }

    /// Proxy URL for Chromium's `--proxy-server` flag
    pub fn browser_proxy_url(&self) -> String {
        format!("socks5://{}", self.address)
    }

    pub fn check_timeout(&self) -> Duration {
        Duration::from_secs(self.check_timeout_secs)
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:9050".to_string(),
            check_url: "https://check.torproject.org".to_string(),
            check_timeout_secs: 15,
        }
    }
}

/// Worker pool configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Number of concurrent workers
    pub workers: usize,

    /// Deadline for a single page render (seconds)
    pub task_timeout_secs: u64,

    /// Job queue capacity; 0 sizes the queue to the number of targets
    pub queue_capacity: usize,
}

impl CrawlerConfig {
    pub fn task_timeout(&self) -> Duration {
        Duration::from_secs(self.task_timeout_secs)
    }

    /// Resolves the queue capacity for a run with `target_count` destinations
    pub fn effective_queue_capacity(&self, target_count: usize) -> usize {
        let capacity = if self.queue_capacity == 0 {
            target_count
        } else {
            self.queue_capacity
        };
        capacity.max(1)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            workers: 5,
            task_timeout_secs: 40,
            queue_capacity: 0,
        }
    }
}

/// Headless browser configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RendererConfig {
    pub window_width: u32,
    pub window_height: u32,

    /// Screenshot quality passed to the capture call (0-100)
    pub screenshot_quality: u8,

    /// Run Chromium without a visible window
    pub headless: bool,

    /// Explicit Chromium binary; auto-detected when absent
    pub chrome_executable: Option<PathBuf>,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            window_width: 1920,
            window_height: 1080,
            screenshot_quality: 90,
            headless: true,
            chrome_executable: None,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Directory holding the `htmls/`, `images/` and `urls/` subdirectories
    pub root: PathBuf,

    /// Append-only outcome log
    pub log_path: PathBuf,

    /// Line-oriented list of destinations
    pub targets_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("scraped_data"),
            log_path: PathBuf::from("scan_report.log"),
            targets_path: PathBuf::from("targets.yaml"),
        }
    }
}
