//! Listing source - fetches every universe from its ordered providers.
//!
//! For each universe the providers are tried by priority until one yields
//! usable rows. Each call is bounded by the provider timeout. A universe
//! whose providers all fail contributes nothing, and the other universe is
//! still fetched.

use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use log::{debug, error, info, warn};
use tokio::time::timeout;

use crate::config::ResolverConfig;
use crate::errors::{Recovery, ResolverError};
use crate::models::{InstrumentRecord, Market, ProviderId};
use crate::provider::{
    EastmoneyBoard, EastmoneyListingProvider, ListingProvider, ListingRow, MappingSource,
    SinaHkListingProvider,
};

use super::diagnostics::{ProviderAttempt, RefreshReport};

/// Ordered set of listing providers covering every universe.
pub struct ListingSource {
    providers: Vec<Arc<dyn ListingProvider>>,
    provider_timeout: Duration,
}

impl ListingSource {
    /// Create a listing source from explicit providers.
    pub fn new(providers: Vec<Arc<dyn ListingProvider>>, provider_timeout: Duration) -> Self {
        Self {
            providers,
            provider_timeout,
        }
    }

    /// The production providers: Eastmoney for A-shares; Eastmoney then
    /// Sina for Hong Kong.
    pub fn from_config(config: &ResolverConfig) -> Self {
        let providers: Vec<Arc<dyn ListingProvider>> = vec![
            Arc::new(EastmoneyListingProvider::new(
                EastmoneyBoard::AShares,
                config.page_size,
            )),
            Arc::new(EastmoneyListingProvider::new(
                EastmoneyBoard::HongKong,
                config.page_size,
            )),
            Arc::new(SinaHkListingProvider::new(config.page_size)),
        ];
        Self::new(providers, config.provider_timeout)
    }

    /// Providers registered for `universe`, by priority. Registration order
    /// breaks ties.
    pub fn providers_for(&self, universe: Market) -> Vec<Arc<dyn ListingProvider>> {
        let mut providers: Vec<Arc<dyn ListingProvider>> = self
            .providers
            .iter()
            .filter(|p| p.universe() == universe)
            .cloned()
            .collect();
        providers.sort_by_key(|p| p.priority());
        providers
    }

    /// Fetch `(identifier, display name)` rows for one universe.
    ///
    /// Fails with `SourceUnavailable` (or `Timeout`) carrying the last
    /// provider error when no provider produced rows.
    pub async fn fetch_universe(&self, universe: Market) -> Result<Vec<ListingRow>, ResolverError> {
        let mut report = RefreshReport::new(Utc::now());
        self.fetch_universe_with_diagnostics(universe, &mut report)
            .await
    }

    /// Same as [`fetch_universe`](Self::fetch_universe), recording every
    /// provider attempt in `report`.
    pub async fn fetch_universe_with_diagnostics(
        &self,
        universe: Market,
        report: &mut RefreshReport,
    ) -> Result<Vec<ListingRow>, ResolverError> {
        let providers = self.providers_for(universe);
        let mut last_error: Option<ResolverError> = None;

        for provider in providers {
            let provider_id: ProviderId = Cow::Borrowed(provider.id());

            let outcome = match self.fetch_rows(provider.as_ref(), universe).await {
                Ok(rows) if rows.is_empty() => Err(ResolverError::unavailable(
                    provider.id(),
                    "no parseable rows",
                )),
                other => other,
            };

            match outcome {
                Ok(rows) => {
                    info!(
                        "Provider '{}' returned {} {} rows",
                        provider_id,
                        rows.len(),
                        universe
                    );
                    report.record(ProviderAttempt {
                        provider_id,
                        universe,
                        rows: rows.len(),
                        error: None,
                        success: true,
                    });
                    return Ok(rows);
                }
                Err(e) => {
                    let recovery = e.recovery();
                    report.record(ProviderAttempt {
                        provider_id: provider_id.clone(),
                        universe,
                        rows: 0,
                        error: Some(e.to_string()),
                        success: false,
                    });
                    if recovery != Recovery::NextProvider {
                        warn!(
                            "Provider '{}' failed for {}: {} ({:?}), giving up on {}",
                            provider_id, universe, e, recovery, universe
                        );
                        return Err(e);
                    }
                    warn!(
                        "Provider '{}' failed for {}: {}, trying next",
                        provider_id, universe, e
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            ResolverError::unavailable("NONE", format!("no provider registered for {}", universe))
        }))
    }

    /// Fetch and normalize both universes.
    ///
    /// Never fails: a universe that cannot be fetched is logged and left
    /// out. The caller decides what an empty result means.
    pub async fn fetch_all(&self) -> (Vec<InstrumentRecord>, RefreshReport) {
        let mut report = RefreshReport::new(Utc::now());
        let mut records = Vec::new();

        for universe in Market::ALL {
            match self
                .fetch_universe_with_diagnostics(universe, &mut report)
                .await
            {
                Ok(rows) => {
                    let before = records.len();
                    for row in rows {
                        match InstrumentRecord::from_listing(
                            universe,
                            &row.identifier,
                            &row.display_name,
                        ) {
                            Ok(record) => records.push(record),
                            Err(e) if e.recovery() == Recovery::SkipRow => {
                                debug!("Skipping {} row: {}", universe, e)
                            }
                            Err(e) => warn!("Dropping {} row: {}", universe, e),
                        }
                    }
                    info!(
                        "Fetched {} {} instruments",
                        records.len() - before,
                        universe
                    );
                }
                Err(e) => {
                    error!(
                        "Fetching {} listing failed, continuing without it: {}",
                        universe, e
                    );
                }
            }
        }

        (records, report)
    }

    async fn fetch_rows(
        &self,
        provider: &dyn ListingProvider,
        universe: Market,
    ) -> Result<Vec<ListingRow>, ResolverError> {
        let table = timeout(self.provider_timeout, provider.fetch_table())
            .await
            .map_err(|_| ResolverError::Timeout {
                provider: provider.id().to_string(),
            })??;

        if table.is_empty() {
            return Ok(Vec::new());
        }

        let mapping = table.detect_columns().ok_or_else(|| {
            ResolverError::unavailable(
                provider.id(),
                format!("cannot map columns {:?}", table.columns),
            )
        })?;

        if mapping.source == MappingSource::Positional {
            info!(
                "Provider '{}' has no known columns, using '{}' / '{}'",
                provider.id(),
                table.columns[mapping.identifier],
                table.columns[mapping.name]
            );
        }

        Ok(table
            .rows_with(mapping)
            .into_iter()
            .map(|row| ListingRow {
                identifier: universe.canonical_identifier(&row.identifier),
                display_name: row.display_name,
            })
            .collect())
    }
}
