//! Target handling for Onion-Lens
//!
//! This module provides the destination type handed to workers, the
//! filesystem-safe naming scheme for artifacts, and the reader for the
//! line-oriented target list.

mod destination;
mod source;

pub use destination::{normalize_destination, safe_name, Destination};
pub use source::{load_targets, parse_targets};
