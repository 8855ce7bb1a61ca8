//! Tor connection check
//!
//! Sends a single GET through the SOCKS proxy to a page that reports whether
//! the request came from a Tor exit, and classifies the response body.

use crate::anonymity::AnonymityCheck;
use crate::config::ProxyConfig;
use async_trait::async_trait;
use reqwest::{Client, Proxy};
use std::time::Duration;

/// Phrases the check page uses when the request arrived through Tor
const POSITIVE_MARKERS: &[&str] = &["Congratulations", "successfully"];

/// Phrase the check page uses when the request did not arrive through Tor
const NEGATIVE_MARKER: &str = "Sorry. You are not using Tor";

/// Verifies that requests leave through the Tor network
#[derive(Debug, Clone)]
pub struct TorVerifier {
    /// Proxy URL, or None to connect directly
    proxy_url: Option<String>,

    /// Page reporting whether the request came through Tor
    check_url: String,

    /// Overall timeout for the check request
    timeout: Duration,
}

impl TorVerifier {
    /// Creates a verifier that routes the check through the configured proxy
    ///
    /// # Example
    ///
    /// ```no_run
    /// use onion_lens::anonymity::{AnonymityCheck, TorVerifier};
    /// use onion_lens::config::ProxyConfig;
    ///
    /// # async fn example() {
    /// let verifier = TorVerifier::new(&ProxyConfig::default());
    /// if !verifier.verify().await {
    ///     eprintln!("not connected to Tor");
    /// }
    /// # }
    /// ```
    pub fn new(config: &ProxyConfig) -> Self {
        Self {
            proxy_url: Some(config.client_proxy_url()),
            check_url: config.check_url.clone(),
            timeout: config.check_timeout(),
        }
    }

    /// Creates a verifier that contacts the check page without any proxy
    ///
    /// Only useful against a local stand-in for the check page.
    pub fn direct(check_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            proxy_url: None,
            check_url: check_url.into(),
            timeout,
        }
    }

    /// Builds the HTTP client used for the check
    fn build_client(&self) -> Result<Client, reqwest::Error> {
        let mut builder = Client::builder().timeout(self.timeout);

        if let Some(proxy_url) = &self.proxy_url {
            builder = builder.proxy(Proxy::all(proxy_url)?);
        }

        builder.build()
    }
}

#[async_trait]
impl AnonymityCheck for TorVerifier {
    async fn verify(&self) -> bool {
        let client = match self.build_client() {
            Ok(client) => client,
            Err(e) => {
                tracing::warn!("Proxy setup error: {}", e);
                return false;
            }
        };

        tracing::debug!("Checking Tor connection via {}", self.check_url);

        let response = match client.get(&self.check_url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Tor connection error: {}", e);
                return false;
            }
        };

        match response.text().await {
            Ok(body) => is_anonymized_body(&body),
            Err(e) => {
                tracing::warn!("Failed to read Tor check response: {}", e);
                false
            }
        }
    }
}

/// Classifies the body of the Tor check page
///
/// True only if the body carries a positive marker and not the negative one.
///
/// # Examples
///
/// ```
/// use onion_lens::anonymity::is_anonymized_body;
///
/// assert!(is_anonymized_body("Congratulations. This browser is configured to use Tor."));
/// assert!(!is_anonymized_body("Sorry. You are not using Tor."));
/// assert!(!is_anonymized_body("<html></html>"));
/// ```
pub fn is_anonymized_body(body: &str) -> bool {
    if body.contains(NEGATIVE_MARKER) {
        return false;
    }

    POSITIVE_MARKERS.iter().any(|marker| body.contains(marker))
}
