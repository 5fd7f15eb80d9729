//! Listing data models
//!
//! - `types` - Type aliases for identifiers (ProviderId, Identifier)
//! - `record` - One listed instrument (InstrumentRecord) with its Market and Venue
//! - `snapshot` - Immutable identifier-keyed index of records (ListingSnapshot)

mod record;
mod snapshot;
mod types;

pub use record::{InstrumentRecord, Market, Venue};
pub use snapshot::ListingSnapshot;
pub use types::{Identifier, ProviderId};
