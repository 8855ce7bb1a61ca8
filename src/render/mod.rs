//! Page rendering for Onion-Lens
//!
//! The coordinator never talks to a browser directly. It calls a `Renderer`
//! and reacts to the result, which keeps the worker pool testable with
//! scripted renderers. The production implementation drives headless
//! Chromium over CDP.

mod chrome;

pub use chrome::ChromeRenderer;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Everything captured from one successfully rendered page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderResult {
    /// Serialized document markup
    pub markup: String,

    /// Full-page screenshot
    pub image: Vec<u8>,

    /// Targets of every anchor on the page, in document order
    pub links: Vec<String>,
}

/// Errors raised while rendering a single page
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    #[error("render timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("render cancelled")]
    Cancelled,

    #[error("browser error: {0}")]
    Browser(String),

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("extraction failed: {0}")]
    Extraction(String),

    #[error("screenshot failed: {0}")]
    Capture(String),
}

/// Loads a page and captures its markup, links and a screenshot
///
/// Implementations are all-or-nothing: any failed step fails the whole call.
/// The caller owns the deadline and cancellation and enforces both by
/// dropping the returned future, so implementations must tolerate being
/// dropped at any await point.
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, url: &str) -> Result<RenderResult, RenderError>;
}
