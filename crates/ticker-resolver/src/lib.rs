//! Ticker Resolver Crate
//!
//! Maps free-form Chinese company names to listing identifiers on the
//! mainland A-share markets (Shanghai, Shenzhen) and the Hong Kong main
//! board.
//!
//! # Overview
//!
//! - A cached listing index, refreshed from upstream providers when stale
//! - Name normalization (status markers, legal-entity suffixes)
//! - A four-stage match cascade: exact, canonical, containment, fuzzy
//! - Provider fallback with per-provider timeouts
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! | ResolverService  |  resolve_one / resolve_many
//! +------------------+
//!          |
//!          v
//! +------------------+     +------------------+
//! |  ListingCache    | --> |  SnapshotFile    |  (JSON persistence)
//! +------------------+     +------------------+
//!          |  (when empty or stale)
//!          v
//! +------------------+
//! |  ListingSource   |  (fallback per universe)
//! +------------------+
//!          |
//!          v
//! +------------------+
//! | ListingProvider  |  (Eastmoney, Sina, static)
//! +------------------+
//! ```
//!
//! Matching runs on an immutable [`ListingSnapshot`] through
//! [`MatchCascade`], which needs no network and can be used on its own.
//!
//! # Core Types
//!
//! - [`InstrumentRecord`] - One listed instrument with its canonical name
//! - [`ListingSnapshot`] - Identifier-keyed index of records plus build time
//! - [`ListingCache`] - Current snapshot with Empty/Fresh/Stale lifecycle
//! - [`ResolverService`] - Name resolution entry point
//! - [`ResolverConfig`] - Cache path, staleness, timeouts

pub mod cache;
pub mod config;
pub mod errors;
pub mod models;
pub mod provider;
pub mod resolver;
pub mod source;

pub use cache::{CacheState, ListingCache, SnapshotFile};
pub use config::ResolverConfig;
pub use errors::{Recovery, ResolverError};
pub use models::{Identifier, InstrumentRecord, ListingSnapshot, Market, ProviderId, Venue};
pub use provider::{
    EastmoneyBoard, EastmoneyListingProvider, ListingProvider, ListingTable,
    SinaHkListingProvider, StaticListingProvider,
};
pub use resolver::{
    normalize, similarity, split_names, MatchCascade, MatchStage, Resolution, ResolverService,
};
pub use source::{ListingSource, ProviderAttempt, RefreshReport};
