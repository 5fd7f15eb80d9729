//! Resolver service - the entry point for name resolution.
//!
//! Owns one listing cache and a match cascade. Callers pass plain strings
//! and get identifiers back; an unresolvable name is `None`, never an
//! error.

use std::sync::Arc;

use log::{debug, warn};

use crate::cache::ListingCache;
use crate::config::ResolverConfig;
use crate::errors::ResolverError;
use crate::models::{Identifier, InstrumentRecord, ListingSnapshot};
use crate::source::ListingSource;

use super::cascade::MatchCascade;
use super::traits::Resolution;

/// Characters separating names in a multi-name string, besides whitespace.
const NAME_DELIMITERS: [char; 5] = [',', '，', ';', '；', '、'];

/// Separator used when resolved identifiers are written back as one field.
const IDENTIFIER_SEPARATOR: &str = ",";

/// Splits a multi-name string on the name delimiters and whitespace runs.
///
/// Segments are trimmed; empty ones are dropped. Order and duplicates are
/// kept.
///
/// ```
/// use ticker_resolver::resolver::split_names;
///
/// assert_eq!(split_names("茅台，五粮液; 茅台"), vec!["茅台", "五粮液", "茅台"]);
/// ```
pub fn split_names(names: &str) -> Vec<String> {
    names
        .split(|c: char| NAME_DELIMITERS.contains(&c) || c.is_whitespace())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

pub struct ResolverService {
    cache: ListingCache,
    cascade: MatchCascade,
}

impl ResolverService {
    pub fn new(cache: ListingCache) -> Self {
        Self::with_cascade(cache, MatchCascade::new())
    }

    pub fn with_cascade(cache: ListingCache, cascade: MatchCascade) -> Self {
        Self { cache, cascade }
    }

    /// Production wiring: the default providers and the persisted cache
    /// at `config.cache_path`.
    pub fn from_config(config: &ResolverConfig) -> Self {
        let source = ListingSource::from_config(config);
        Self::new(ListingCache::open(source, config))
    }

    pub fn cache(&self) -> &ListingCache {
        &self.cache
    }

    /// Resolves one name to its identifier.
    pub async fn resolve_one(&self, name: &str) -> Option<Identifier> {
        self.resolve_detailed(name).await.map(|r| r.identifier)
    }

    /// Resolves one name, reporting the record and the stage that matched.
    pub async fn resolve_detailed(&self, name: &str) -> Option<Resolution> {
        let query = name.trim();
        if query.is_empty() {
            return None;
        }
        let snapshot = self.current_snapshot().await?;
        self.resolve_in(query, &snapshot)
    }

    /// Resolves every name in a delimiter-separated string.
    ///
    /// The snapshot is fetched once for the whole batch.
    pub async fn resolve_many(&self, names: &str) -> Vec<(String, Option<Identifier>)> {
        let names = split_names(names);
        if names.is_empty() {
            return Vec::new();
        }

        let snapshot = self.current_snapshot().await;
        names
            .into_iter()
            .map(|name| {
                let identifier = snapshot
                    .as_deref()
                    .and_then(|s| self.resolve_in(&name, s))
                    .map(|r| r.identifier);
                (name, identifier)
            })
            .collect()
    }

    /// Resolved identifiers of a delimiter-separated string, joined by `,`.
    /// Unresolved names are left out.
    pub async fn joined_identifiers(&self, names: &str) -> String {
        self.resolve_many(names)
            .await
            .into_iter()
            .filter_map(|(_, identifier)| identifier)
            .collect::<Vec<_>>()
            .join(IDENTIFIER_SEPARATOR)
    }

    /// The record listed under `identifier`.
    pub async fn lookup(&self, identifier: &str) -> Option<InstrumentRecord> {
        let snapshot = self.current_snapshot().await?;
        snapshot.get(identifier.trim()).cloned()
    }

    /// Forces a refresh, regardless of staleness or retry cooldown.
    pub async fn refresh(&self) -> Result<Arc<ListingSnapshot>, ResolverError> {
        self.cache.refresh().await
    }

    async fn current_snapshot(&self) -> Option<Arc<ListingSnapshot>> {
        let snapshot = self.cache.ensure_current().await;
        if snapshot.is_none() {
            warn!("No listing snapshot available, names cannot be resolved");
        }
        snapshot
    }

    fn resolve_in(&self, query: &str, snapshot: &ListingSnapshot) -> Option<Resolution> {
        match self.cascade.resolve(query, snapshot) {
            Some(found) => {
                debug!(
                    "Resolved '{}' -> {} ({}, {} match, score {:.2})",
                    query,
                    found.identifier(),
                    found.record.display_name,
                    found.stage,
                    found.score
                );
                Some(found.to_resolution(query))
            }
            None => {
                warn!("No listing matches '{}'", query);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::models::Market;
    use crate::provider::{ListingProvider, StaticListingProvider};
    use crate::resolver::MatchStage;

    fn service() -> ResolverService {
        let providers: Vec<Arc<dyn ListingProvider>> = vec![
            Arc::new(StaticListingProvider::from_pairs(
                "A",
                Market::Domestic,
                &[
                    ("600519", "贵州茅台"),
                    ("000858", "五粮液"),
                    ("601318", "中国平安"),
                    ("000001", "平安银行"),
                ],
            )),
            Arc::new(StaticListingProvider::from_pairs(
                "HK",
                Market::Offshore,
                &[("00700", "腾讯控股")],
            )),
        ];
        let config = ResolverConfig::default();
        let source = ListingSource::new(providers, Duration::from_secs(5));
        ResolverService::new(ListingCache::in_memory(source, &config))
    }

    #[test]
    fn test_split_names_on_every_delimiter() {
        assert_eq!(
            split_names(" 茅台,五粮液，腾讯;平安；招商、比亚迪  宁德时代\t"),
            vec!["茅台", "五粮液", "腾讯", "平安", "招商", "比亚迪", "宁德时代"]
        );
    }

    #[test]
    fn test_split_names_drops_empty_segments() {
        assert!(split_names(" ,，;  ").is_empty());
        assert_eq!(split_names("茅台,,茅台"), vec!["茅台", "茅台"]);
    }

    #[tokio::test]
    async fn test_resolve_one() {
        let service = service();

        assert_eq!(service.resolve_one("贵州茅台").await.as_deref(), Some("600519"));
        assert_eq!(service.resolve_one("腾讯").await.as_deref(), Some("00700.HK"));
        assert_eq!(service.resolve_one("不存在的公司XYZ").await, None);
    }

    #[tokio::test]
    async fn test_blank_name_does_not_refresh() {
        let service = service();

        assert_eq!(service.resolve_one("   ").await, None);
        assert!(service.cache().snapshot().await.is_none());
    }

    #[tokio::test]
    async fn test_resolve_detailed_reports_stage() {
        let service = service();

        let resolution = service.resolve_detailed(" 腾讯控股 ").await.unwrap();
        assert_eq!(resolution.query, "腾讯控股");
        assert_eq!(resolution.identifier, "00700.HK");
        assert_eq!(resolution.stage, MatchStage::ExactRaw);
        assert_eq!(resolution.market, Market::Offshore);
    }

    #[tokio::test]
    async fn test_resolve_many_keeps_order_and_duplicates() {
        let service = service();

        let results = service.resolve_many("贵州茅台，五粮液, 贵州茅台;未知公司QQ").await;
        assert_eq!(
            results,
            vec![
                ("贵州茅台".to_string(), Some("600519".to_string())),
                ("五粮液".to_string(), Some("000858".to_string())),
                ("贵州茅台".to_string(), Some("600519".to_string())),
                ("未知公司QQ".to_string(), None),
            ]
        );
    }

    #[tokio::test]
    async fn test_joined_identifiers_skips_unresolved() {
        let service = service();

        assert_eq!(
            service.joined_identifiers("贵州茅台、未知公司QQ、腾讯控股").await,
            "600519,00700.HK"
        );
        assert_eq!(service.joined_identifiers("").await, "");
    }

    #[tokio::test]
    async fn test_lookup() {
        let service = service();

        let record = service.lookup("601318").await.unwrap();
        assert_eq!(record.display_name, "中国平安");
        assert!(service.lookup("999999").await.is_none());
    }
}
