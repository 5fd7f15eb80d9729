//! Common test utilities and fixtures

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use ticker_resolver::{
    ListingCache, ListingProvider, ListingSource, ListingTable, Market, ResolverConfig,
    ResolverError, ResolverService, StaticListingProvider,
};

/// Install a test subscriber once; `RUST_LOG` controls verbosity.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_test_writer())
        .try_init();
}

/// Provider backed by a fixed table that counts calls, can be switched to
/// failing, and can be slowed down.
pub struct FakeProvider {
    id: &'static str,
    universe: Market,
    priority: u8,
    table: ListingTable,
    delay: Duration,
    pub calls: AtomicUsize,
    pub failing: AtomicBool,
}

impl FakeProvider {
    pub fn new(id: &'static str, universe: Market, pairs: &[(&str, &str)]) -> Self {
        let mut table = ListingTable::new(vec!["代码".to_string(), "名称".to_string()]);
        table.rows = pairs
            .iter()
            .map(|(code, name)| vec![code.to_string(), name.to_string()])
            .collect();
        Self {
            id,
            universe,
            priority: 10,
            table,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
        }
    }

    pub fn failing(id: &'static str, universe: Market) -> Self {
        let provider = Self::new(id, universe, &[]);
        provider.failing.store(true, Ordering::SeqCst);
        provider
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl ListingProvider for FakeProvider {
    fn id(&self) -> &'static str {
        self.id
    }

    fn universe(&self) -> Market {
        self.universe
    }

    fn priority(&self) -> u8 {
        self.priority
    }

    async fn fetch_table(&self) -> Result<ListingTable, ResolverError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(ResolverError::SourceUnavailable {
                provider: self.id.to_string(),
                message: "connection refused".to_string(),
            });
        }
        Ok(self.table.clone())
    }
}

/// A-share listing used across the scenarios.
pub fn domestic_listing() -> StaticListingProvider {
    StaticListingProvider::from_pairs(
        "TEST_A",
        Market::Domestic,
        &[
            ("600001", "浦发银行"),
            ("000002", "*ST万科"),
            ("601318", "中国平安"),
            ("600519", "贵州茅台"),
            ("002594", "比亚迪"),
        ],
    )
}

/// Hong Kong listing used across the scenarios.
pub fn offshore_listing() -> StaticListingProvider {
    StaticListingProvider::from_pairs(
        "TEST_HK",
        Market::Offshore,
        &[("00700", "腾讯控股"), ("09988", "阿里巴巴-W"), ("01211", "比亚迪股份")],
    )
}

/// Config suitable for tests: no retry cooldown, short provider timeout.
pub fn test_config() -> ResolverConfig {
    ResolverConfig::default()
        .with_provider_timeout(Duration::from_millis(500))
        .with_retry_cooldown(Duration::ZERO)
}

pub fn in_memory_service(providers: Vec<Arc<dyn ListingProvider>>) -> ResolverService {
    let config = test_config();
    let source = ListingSource::new(providers, config.provider_timeout);
    ResolverService::new(ListingCache::in_memory(source, &config))
}

pub fn standard_service() -> ResolverService {
    in_memory_service(vec![
        Arc::new(domestic_listing()),
        Arc::new(offshore_listing()),
    ])
}
