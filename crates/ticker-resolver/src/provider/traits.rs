//! Listing provider trait definitions.

use async_trait::async_trait;

use crate::errors::ResolverError;
use crate::models::Market;

use super::table::ListingTable;

/// Trait for upstream listing providers.
///
/// A provider lists every instrument of one universe. The listing source
/// detects identifier and name columns itself, so providers may return
/// whatever columns their upstream publishes.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use ticker_resolver::provider::{ListingProvider, ListingTable};
///
/// struct FixtureProvider;
///
/// #[async_trait]
/// impl ListingProvider for FixtureProvider {
///     fn id(&self) -> &'static str {
///         "FIXTURE"
///     }
///
///     fn universe(&self) -> Market {
///         Market::Offshore
///     }
///
///     async fn fetch_table(&self) -> Result<ListingTable, ResolverError> {
///         // ... load rows
///     }
/// }
/// ```
#[async_trait]
pub trait ListingProvider: Send + Sync {
    /// Unique identifier for this provider.
    ///
    /// Should be a constant string like "EASTMONEY_A", "SINA_HK", etc.
    /// Used for logging and refresh diagnostics.
    fn id(&self) -> &'static str;

    /// The universe this provider lists.
    fn universe(&self) -> Market;

    /// Provider priority within its universe.
    ///
    /// Lower values are tried first. Default is 10.
    fn priority(&self) -> u8 {
        10
    }

    /// Fetch the full listing.
    ///
    /// An empty table is not an error here; the listing source treats it
    /// as a miss and moves to the next provider.
    async fn fetch_table(&self) -> Result<ListingTable, ResolverError>;
}
