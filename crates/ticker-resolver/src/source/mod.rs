//! Listing source adapter.
//!
//! Turns the raw tables of the registered providers into validated
//! `(identifier, display name)` rows per universe, with provider fallback
//! and per-call timeouts.

mod diagnostics;
mod listing_source;

pub use diagnostics::{ProviderAttempt, RefreshReport};
pub use listing_source::ListingSource;
