//! Anonymity verification for Onion-Lens
//!
//! No crawl work may start until a request sent through the configured proxy
//! has been confirmed as arriving over Tor. This module provides:
//!
//! - `AnonymityCheck`: the gate the coordinator consults before anything else
//! - `TorVerifier`: the real check against a Tor confirmation page
//! - `is_anonymized_body`: the marker test applied to that page

mod verifier;

pub use verifier::{is_anonymized_body, TorVerifier};

use async_trait::async_trait;

/// A check that must pass before any crawl work begins
#[async_trait]
pub trait AnonymityCheck: Send + Sync {
    /// Returns true only if outbound traffic is confirmed to be anonymized
    ///
    /// Any setup, transport or read error must yield false.
    async fn verify(&self) -> bool;
}
