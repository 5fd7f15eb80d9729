//! Listing provider abstractions and implementations.
//!
//! This module contains:
//! - The `ListingProvider` trait every upstream listing source implements
//! - `ListingTable` and the column detection used to read provider output
//! - Concrete providers (Eastmoney A-share and HK boards, Sina HK, static)
//!
//! Providers only fetch; identifier formatting, row validation and
//! fallback between providers live in the listing source.

mod headers;
mod paging;
mod static_provider;
mod table;
mod traits;

pub mod eastmoney;
pub mod sina;

pub use eastmoney::{EastmoneyBoard, EastmoneyListingProvider};
pub use sina::SinaHkListingProvider;
pub use static_provider::StaticListingProvider;
pub use table::{
    ColumnCandidate, ColumnMapping, ListingRow, ListingTable, MappingSource, COLUMN_CANDIDATES,
};
pub use traits::ListingProvider;
