//! Name resolution.
//!
//! - `normalizer` - strips status markers and legal-entity suffixes
//! - `similarity` - matching-blocks similarity ratio used by the fuzzy stage
//! - `cascade` - the ordered match stages over a snapshot
//! - `service` - `ResolverService`, owning the cache and the cascade

mod cascade;
mod normalizer;
mod service;
mod similarity;
mod traits;

pub use cascade::{
    CanonicalMatch, ContainmentMatch, ExactRawMatch, FuzzyMatch, MatchCascade,
    DEFAULT_FUZZY_THRESHOLD,
};
pub use normalizer::normalize;
pub use service::{split_names, ResolverService};
pub use similarity::similarity;
pub use traits::{Match, MatchQuery, MatchStage, MatchStrategy, Resolution};
