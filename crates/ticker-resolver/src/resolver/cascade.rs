//! Match cascade - ordered matching stages over a listing snapshot.
//!
//! The cascade is pure computation over an immutable snapshot; it never
//! touches the network and can be called from synchronous code.

use crate::models::{InstrumentRecord, ListingSnapshot};

use super::similarity::similarity;
use super::traits::{Match, MatchQuery, MatchStage, MatchStrategy};

/// Minimum similarity for the fuzzy stage to accept a record.
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.6;

/// Minimum canonical-name length (in chars) for a name to match by being
/// contained in the query.
const MIN_CONTAINED_NAME_CHARS: usize = 2;

/// Stage 1: a record whose display name equals the query verbatim.
pub struct ExactRawMatch;

impl MatchStrategy for ExactRawMatch {
    fn stage(&self) -> MatchStage {
        MatchStage::ExactRaw
    }

    fn find<'a>(&self, query: &MatchQuery, snapshot: &'a ListingSnapshot) -> Option<Match<'a>> {
        snapshot
            .records()
            .find(|r| r.display_name == query.raw)
            .map(|r| Match::exact(r, self.stage()))
    }
}

/// Stage 2: a record whose canonical name equals the normalized query.
pub struct CanonicalMatch;

impl MatchStrategy for CanonicalMatch {
    fn stage(&self) -> MatchStage {
        MatchStage::ExactCanonical
    }

    fn find<'a>(&self, query: &MatchQuery, snapshot: &'a ListingSnapshot) -> Option<Match<'a>> {
        snapshot
            .records()
            .find(|r| r.canonical_name == query.canonical)
            .map(|r| Match::exact(r, self.stage()))
    }
}

/// Stage 3: substring containment in either direction.
///
/// Names containing the query (priority 1) beat names contained in the
/// query (priority 2). Within a priority the longest canonical name wins,
/// and equal lengths keep index order.
pub struct ContainmentMatch;

impl ContainmentMatch {
    fn name_contains_query(record: &InstrumentRecord, query: &MatchQuery) -> bool {
        record.canonical_name.contains(&query.raw) || record.display_name.contains(&query.raw)
    }

    fn query_contains_name(record: &InstrumentRecord, query: &MatchQuery) -> bool {
        record.canonical_name.chars().count() >= MIN_CONTAINED_NAME_CHARS
            && query.raw.contains(&record.canonical_name)
    }
}

impl MatchStrategy for ContainmentMatch {
    fn stage(&self) -> MatchStage {
        MatchStage::Containment
    }

    fn find<'a>(&self, query: &MatchQuery, snapshot: &'a ListingSnapshot) -> Option<Match<'a>> {
        let candidates = snapshot
            .records()
            .filter(|r| Self::name_contains_query(r, query))
            .map(|r| (1u8, r))
            .chain(
                snapshot
                    .records()
                    .filter(|r| Self::query_contains_name(r, query))
                    .map(|r| (2u8, r)),
            );

        let mut best: Option<(u8, usize, &'a InstrumentRecord)> = None;
        for (priority, record) in candidates {
            let len = record.canonical_name.chars().count();
            let better = match best {
                None => true,
                Some((best_priority, best_len, _)) => {
                    priority < best_priority || (priority == best_priority && len > best_len)
                }
            };
            if better {
                best = Some((priority, len, record));
            }
        }

        best.map(|(_, _, record)| Match::exact(record, self.stage()))
    }
}

/// Stage 4: best similarity ratio against canonical or display name.
pub struct FuzzyMatch {
    threshold: f64,
}

impl FuzzyMatch {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl Default for FuzzyMatch {
    fn default() -> Self {
        Self::new(DEFAULT_FUZZY_THRESHOLD)
    }
}

impl MatchStrategy for FuzzyMatch {
    fn stage(&self) -> MatchStage {
        MatchStage::Fuzzy
    }

    fn find<'a>(&self, query: &MatchQuery, snapshot: &'a ListingSnapshot) -> Option<Match<'a>> {
        let mut best: Option<Match<'a>> = None;
        let mut best_score = 0.0;

        for record in snapshot.records() {
            let score = similarity(&query.canonical, &record.canonical_name)
                .max(similarity(&query.canonical, &record.display_name));

            // strict `>`: on equal scores the first record seen stays
            if score > best_score && score >= self.threshold {
                best_score = score;
                best = Some(Match {
                    record,
                    stage: self.stage(),
                    score,
                });
            }
        }

        best
    }
}

/// Composite matcher that tries stages in order.
///
/// The order is:
/// 1. Exact display name
/// 2. Exact canonical name
/// 3. Containment
/// 4. Fuzzy similarity
///
/// The first stage producing a candidate decides the result; scores are
/// never compared across stages.
///
/// # Example
///
/// ```ignore
/// let cascade = MatchCascade::new();
/// let found = cascade.resolve("平安", &snapshot);
/// // found.map(|m| m.identifier()) == Some("601318")
/// ```
pub struct MatchCascade {
    stages: Vec<Box<dyn MatchStrategy>>,
}

impl MatchCascade {
    /// Create a cascade with the default stages and threshold.
    pub fn new() -> Self {
        Self::with_fuzzy_threshold(DEFAULT_FUZZY_THRESHOLD)
    }

    /// Create a cascade with a custom fuzzy acceptance threshold.
    pub fn with_fuzzy_threshold(threshold: f64) -> Self {
        Self {
            stages: vec![
                Box::new(ExactRawMatch),
                Box::new(CanonicalMatch),
                Box::new(ContainmentMatch),
                Box::new(FuzzyMatch::new(threshold)),
            ],
        }
    }

    /// Resolve `query` against `snapshot`.
    ///
    /// Empty or whitespace-only queries return `None` without running any stage.
    pub fn resolve<'a>(&self, query: &str, snapshot: &'a ListingSnapshot) -> Option<Match<'a>> {
        let query = MatchQuery::new(query)?;
        self.stages
            .iter()
            .find_map(|stage| stage.find(&query, snapshot))
    }
}

impl Default for MatchCascade {
    fn default() -> Self {
        Self::new()
    }
}
