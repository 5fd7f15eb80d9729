//! Matching traits for the resolver crate.
//!
//! Defines the stage abstraction the match cascade is built from and the
//! result types it hands back.

use std::fmt;

use crate::models::{InstrumentRecord, ListingSnapshot, Market};

use super::normalizer::normalize;

/// Indicates which cascade stage produced a match.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum MatchStage {
    /// Query equals a published display name verbatim.
    ExactRaw,
    /// Normalized query equals a canonical name.
    ExactCanonical,
    /// Query and a name contain one another.
    Containment,
    /// Similarity ratio above the threshold.
    Fuzzy,
}

impl fmt::Display for MatchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExactRaw => write!(f, "ExactRaw"),
            Self::ExactCanonical => write!(f, "ExactCanonical"),
            Self::Containment => write!(f, "Containment"),
            Self::Fuzzy => write!(f, "Fuzzy"),
        }
    }
}

/// A query prepared once for every stage.
#[derive(Clone, Debug)]
pub struct MatchQuery {
    /// Trimmed query as supplied.
    pub raw: String,
    /// `normalize(raw)`.
    pub canonical: String,
}

impl MatchQuery {
    /// Returns `None` for empty or whitespace-only input.
    pub fn new(query: &str) -> Option<Self> {
        let raw = query.trim();
        if raw.is_empty() {
            return None;
        }
        Some(Self {
            raw: raw.to_string(),
            canonical: normalize(raw),
        })
    }
}

/// A record selected by one cascade stage, borrowed from the snapshot.
#[derive(Clone, Copy, Debug)]
pub struct Match<'a> {
    pub record: &'a InstrumentRecord,
    pub stage: MatchStage,
    /// 1.0 for the exact and containment stages, the similarity ratio for fuzzy.
    pub score: f64,
}

impl<'a> Match<'a> {
    pub fn exact(record: &'a InstrumentRecord, stage: MatchStage) -> Self {
        Self {
            record,
            stage,
            score: 1.0,
        }
    }

    pub fn identifier(&self) -> &'a str {
        &self.record.identifier
    }

    /// Detaches the match from the snapshot it was found in.
    pub fn to_resolution(&self, query: &str) -> Resolution {
        Resolution {
            query: query.to_string(),
            identifier: self.record.identifier.clone(),
            display_name: self.record.display_name.clone(),
            market: self.record.market,
            stage: self.stage,
            score: self.score,
        }
    }
}

/// Owned resolution result, safe to keep after the snapshot is replaced.
#[derive(Clone, Debug, PartialEq)]
pub struct Resolution {
    pub query: String,
    pub identifier: String,
    pub display_name: String,
    pub market: Market,
    pub stage: MatchStage,
    pub score: f64,
}

/// Individual stage in the match cascade.
///
/// Stages are tried in order until one returns a match. Returning `None`
/// means this stage found no candidate and the cascade moves on.
pub trait MatchStrategy: Send + Sync {
    /// The stage this strategy implements.
    fn stage(&self) -> MatchStage;

    /// Look for the best record for `query` in `snapshot`.
    fn find<'a>(&self, query: &MatchQuery, snapshot: &'a ListingSnapshot) -> Option<Match<'a>>;
}
