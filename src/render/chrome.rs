//! Headless Chromium renderer
//!
//! One browser process is launched lazily on the first render and shared by
//! all workers; every render opens its own tab and closes it afterwards.
//! All browser traffic goes through the configured SOCKS proxy.

use crate::config::{ProxyConfig, RendererConfig};
use crate::render::{RenderError, RenderResult, Renderer};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::{Page, ScreenshotParams};
use futures::StreamExt;
use std::ops::Deref;
use std::time::Duration;
use tokio::sync::OnceCell;

/// Collects the resolved target of every anchor that carries an href
const LINKS_SCRIPT: &str = "Array.from(document.querySelectorAll('a[href]')).map(a => a.href)";

/// Serializes the whole document
const MARKUP_SCRIPT: &str = "document.documentElement.outerHTML";

/// Interval between checks for a ready document body
const BODY_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Renderer backed by a shared headless Chromium instance
pub struct ChromeRenderer {
    config: RendererConfig,
    proxy_server: String,
    browser: OnceCell<Browser>,
}

impl ChromeRenderer {
    /// Creates a renderer; the browser itself is started on first use
    pub fn new(config: &RendererConfig, proxy: &ProxyConfig) -> Self {
        Self {
            config: config.clone(),
            proxy_server: proxy.browser_proxy_url(),
            browser: OnceCell::new(),
        }
    }

    /// Builds the Chromium launch configuration
    fn browser_config(&self) -> Result<BrowserConfig, RenderError> {
        let mut builder = BrowserConfig::builder()
            .window_size(self.config.window_width, self.config.window_height)
            .arg(format!("--proxy-server={}", self.proxy_server))
            .arg("--ignore-certificate-errors");

        if !self.config.headless {
            builder = builder.with_head();
        }

        if let Some(executable) = &self.config.chrome_executable {
            builder = builder.chrome_executable(executable);
        }

        builder.build().map_err(RenderError::Browser)
    }

    /// Launches Chromium and spawns its CDP event loop
    async fn launch(&self) -> Result<Browser, RenderError> {
        let config = self.browser_config()?;

        tracing::info!("Launching headless browser (proxy: {})", self.proxy_server);
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| RenderError::Browser(e.to_string()))?;

        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::trace!("Browser handler error: {}", e);
                }
            }
            tracing::debug!("Browser handler finished");
        });

        Ok(browser)
    }

    /// Returns the shared browser, launching it if necessary
    async fn browser(&self) -> Result<&Browser, RenderError> {
        self.browser.get_or_try_init(|| self.launch()).await
    }

    /// Closes the browser if it was ever launched
    pub async fn shutdown(self) {
        if let Some(mut browser) = self.browser.into_inner() {
            if let Err(e) = browser.close().await {
                tracing::warn!("Failed to close browser: {}", e);
            }
            if let Err(e) = browser.wait().await {
                tracing::warn!("Failed to wait for browser exit: {}", e);
            }
        }
    }

    /// Runs the capture steps on an already opened tab
    async fn capture(&self, page: &Page, url: &str) -> Result<RenderResult, RenderError> {
        page.goto(url)
            .await
            .map_err(|e| RenderError::Navigation(e.to_string()))?;

        wait_for_body(page).await;

        let links: Vec<String> = page
            .evaluate(LINKS_SCRIPT)
            .await
            .map_err(|e| RenderError::Extraction(e.to_string()))?
            .into_value()
            .map_err(|e| RenderError::Extraction(e.to_string()))?;

        let markup: String = page
            .evaluate(MARKUP_SCRIPT)
            .await
            .map_err(|e| RenderError::Extraction(e.to_string()))?
            .into_value()
            .map_err(|e| RenderError::Extraction(e.to_string()))?;

        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .quality(i64::from(self.config.screenshot_quality))
            .full_page(true)
            .build();

        let image = page
            .screenshot(params)
            .await
            .map_err(|e| RenderError::Capture(e.to_string()))?;

        Ok(RenderResult {
            markup,
            image,
            links,
        })
    }
}

#[async_trait]
impl Renderer for ChromeRenderer {
    async fn render(&self, url: &str) -> Result<RenderResult, RenderError> {
        let browser = self.browser().await?;

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| RenderError::Browser(e.to_string()))?;
        let page = PageGuard::new(page, url);

        let result = self.capture(&page, url).await;
        page.close().await;
        result
    }
}

/// Polls until the document has a body element
///
/// Never gives up on its own; the caller's deadline bounds the wait.
async fn wait_for_body(page: &Page) {
    loop {
        if page.find_element("body").await.is_ok() {
            return;
        }
        tokio::time::sleep(BODY_POLL_INTERVAL).await;
    }
}

/// Closes its tab when dropped
///
/// A render abandoned at its deadline drops the guard mid-flight, so the
/// close is spawned onto the runtime instead of awaited.
struct PageGuard {
    page: Page,
    url: String,
    closed: bool,
}

impl PageGuard {
    fn new(page: Page, url: &str) -> Self {
        Self {
            page,
            url: url.to_string(),
            closed: false,
        }
    }

    /// Closes the tab, logging failures
    async fn close(mut self) {
        self.closed = true;
        if let Err(e) = self.page.clone().close().await {
            tracing::debug!("Failed to close tab for {}: {}", self.url, e);
        }
    }
}

impl Deref for PageGuard {
    type Target = Page;

    fn deref(&self) -> &Self::Target {
        &self.page
    }
}

impl Drop for PageGuard {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        let page = self.page.clone();
        let url = std::mem::take(&mut self.url);

        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                if let Err(e) = page.close().await {
                    tracing::debug!("Failed to close abandoned tab for {}: {}", url, e);
                }
            });
        }
    }
}
