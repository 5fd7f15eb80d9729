//! Listing cache: the current snapshot, its staleness, refresh and
//! persistence.

mod listing_cache;
mod store;

pub use listing_cache::{CacheState, ListingCache};
pub use store::SnapshotFile;
