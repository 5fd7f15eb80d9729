//! End-to-end resolution through the service, cache and listing source.

mod common;

use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use tempfile::tempdir;

use common::{
    domestic_listing, in_memory_service, init_logging, offshore_listing, standard_service,
    test_config, FakeProvider,
};
use ticker_resolver::{
    CacheState, InstrumentRecord, ListingCache, ListingProvider, ListingSnapshot, ListingSource,
    Market, MatchStage, ResolverError, ResolverService, SnapshotFile,
};

#[tokio::test]
async fn test_exact_display_name_resolves() {
    init_logging();
    let service = standard_service();

    assert_eq!(service.resolve_one("浦发银行").await.as_deref(), Some("600001"));
}

#[tokio::test]
async fn test_status_marker_is_ignored() {
    init_logging();
    let service = standard_service();

    let resolution = service.resolve_detailed("万科").await.unwrap();
    assert_eq!(resolution.identifier, "000002");
    assert_eq!(resolution.display_name, "*ST万科");
    assert_eq!(resolution.stage, MatchStage::ExactCanonical);
}

#[tokio::test]
async fn test_resolve_many_across_universes() {
    init_logging();
    let service = standard_service();

    let results = service.resolve_many("平安,腾讯").await;
    assert_eq!(
        results,
        vec![
            ("平安".to_string(), Some("601318".to_string())),
            ("腾讯".to_string(), Some("00700.HK".to_string())),
        ]
    );
}

#[tokio::test]
async fn test_empty_index_resolves_nothing() {
    init_logging();
    let service = in_memory_service(vec![
        Arc::new(FakeProvider::failing("DOWN_A", Market::Domestic)),
        Arc::new(FakeProvider::failing("DOWN_HK", Market::Offshore)),
    ]);

    for query in ["浦发银行", "腾讯", "平安", "x"] {
        assert_eq!(service.resolve_one(query).await, None);
    }
    assert!(service.resolve_many("浦发银行，腾讯").await.iter().all(|(_, id)| id.is_none()));
    assert_eq!(service.cache().state().await, CacheState::Empty);
}

#[tokio::test]
async fn test_unknown_company_resolves_nothing() {
    init_logging();
    let service = standard_service();

    assert_eq!(service.resolve_one("不存在的公司名称").await, None);
}

#[tokio::test]
async fn test_exact_display_name_beats_shared_canonical_name() {
    init_logging();
    let service = standard_service();

    // "比亚迪" and "比亚迪股份" share the canonical name "比亚迪".
    assert_eq!(service.resolve_one("比亚迪").await.as_deref(), Some("002594"));
    assert_eq!(
        service.resolve_one("比亚迪股份").await.as_deref(),
        Some("01211.HK")
    );
}

#[tokio::test]
async fn test_offshore_fallback_on_provider_error() {
    init_logging();
    let primary = Arc::new(FakeProvider::failing("PRIMARY_HK", Market::Offshore).with_priority(1));
    let backup = Arc::new(
        FakeProvider::new("BACKUP_HK", Market::Offshore, &[("00700", "腾讯控股")]).with_priority(2),
    );
    let service = in_memory_service(vec![
        Arc::new(domestic_listing()),
        primary.clone() as Arc<dyn ListingProvider>,
        backup.clone() as Arc<dyn ListingProvider>,
    ]);

    assert_eq!(service.resolve_one("腾讯").await.as_deref(), Some("00700.HK"));
    assert_eq!(primary.call_count(), 1);
    assert_eq!(backup.call_count(), 1);

    let report = service.cache().last_report().await.unwrap();
    assert_eq!(report.provider_for(Market::Offshore).unwrap(), "BACKUP_HK");
    assert_eq!(report.rows_for(Market::Domestic), 5);
}

#[tokio::test]
async fn test_offshore_fallback_on_timeout() {
    init_logging();
    let slow = FakeProvider::new("SLOW_HK", Market::Offshore, &[("00005", "汇丰控股")])
        .with_priority(1)
        .with_delay(Duration::from_secs(5));
    let service = in_memory_service(vec![
        Arc::new(slow),
        Arc::new(offshore_listing().with_priority(2)),
    ]);

    assert_eq!(service.resolve_one("腾讯控股").await.as_deref(), Some("00700.HK"));
    assert_eq!(service.resolve_one("汇丰控股").await, None);
}

#[tokio::test]
async fn test_failed_universe_does_not_block_the_other() {
    init_logging();
    let service = in_memory_service(vec![
        Arc::new(FakeProvider::failing("DOWN_A", Market::Domestic)),
        Arc::new(offshore_listing()),
    ]);

    assert_eq!(service.resolve_one("腾讯").await.as_deref(), Some("00700.HK"));
    assert_eq!(service.resolve_one("浦发银行").await, None);
}

#[tokio::test]
async fn test_failed_refresh_keeps_serving_previous_snapshot() {
    init_logging();
    let provider = Arc::new(FakeProvider::new(
        "FLAKY_A",
        Market::Domestic,
        &[("600519", "贵州茅台")],
    ));
    let service = in_memory_service(vec![provider.clone() as Arc<dyn ListingProvider>]);

    service.refresh().await.unwrap();
    provider.set_failing(true);

    assert!(matches!(
        service.refresh().await,
        Err(ResolverError::RefreshFailed)
    ));
    assert_eq!(service.resolve_one("茅台").await.as_deref(), Some("600519"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_requests_fetch_once() {
    init_logging();
    let provider = Arc::new(
        FakeProvider::new("SLOW_A", Market::Domestic, &[("600519", "贵州茅台")])
            .with_delay(Duration::from_millis(100)),
    );
    let service = Arc::new(in_memory_service(vec![
        provider.clone() as Arc<dyn ListingProvider>
    ]));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.resolve_one("贵州茅台").await })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap().as_deref(), Some("600519"));
    }
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_stale_requests_refresh_once() {
    init_logging();
    let provider = Arc::new(
        FakeProvider::new("SLOW_A", Market::Domestic, &[("600519", "贵州茅台")])
            .with_delay(Duration::from_millis(400)),
    );
    let config = test_config()
        .with_staleness(Duration::from_millis(300))
        .with_provider_timeout(Duration::from_secs(5));
    let source = ListingSource::new(
        vec![provider.clone() as Arc<dyn ListingProvider>],
        config.provider_timeout,
    );
    let service = Arc::new(ResolverService::new(ListingCache::in_memory(source, &config)));

    service.refresh().await.unwrap();
    tokio::time::sleep(Duration::from_millis(350)).await;
    assert!(service.cache().is_stale().await);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let service = Arc::clone(&service);
            tokio::spawn(async move {
                let started = std::time::Instant::now();
                let resolved = service.resolve_one("贵州茅台").await;
                (resolved, started.elapsed())
            })
        })
        .collect();

    let mut fast_readers = 0;
    for handle in handles {
        let (resolved, elapsed) = handle.await.unwrap();
        assert_eq!(resolved.as_deref(), Some("600519"));
        if elapsed < Duration::from_millis(200) {
            fast_readers += 1;
        }
    }
    assert_eq!(provider.call_count(), 2);
    assert!(fast_readers >= 7, "only {} readers were served the stale snapshot", fast_readers);
}

#[tokio::test]
async fn test_persisted_cache_is_reused_across_instances() {
    init_logging();
    let dir = tempdir().unwrap();
    let config = test_config().with_cache_path(dir.path().join("data/stock_cache.json"));

    let first = ResolverService::new(ListingCache::open(
        ListingSource::new(
            vec![Arc::new(domestic_listing()), Arc::new(offshore_listing())],
            config.provider_timeout,
        ),
        &config,
    ));
    assert_eq!(first.resolve_one("腾讯").await.as_deref(), Some("00700.HK"));

    // The second instance has no working provider; it must serve the file.
    let down = Arc::new(FakeProvider::failing("DOWN_A", Market::Domestic));
    let second = ResolverService::new(ListingCache::open(
        ListingSource::new(
            vec![down.clone() as Arc<dyn ListingProvider>],
            config.provider_timeout,
        ),
        &config,
    ));

    assert_eq!(second.cache().state().await, CacheState::Fresh);
    assert_eq!(second.resolve_one("腾讯").await.as_deref(), Some("00700.HK"));
    assert_eq!(second.resolve_one("浦发银行").await.as_deref(), Some("600001"));
    assert_eq!(down.call_count(), 0);

    let original = first.cache().snapshot().await.unwrap();
    let reloaded = second.cache().snapshot().await.unwrap();
    let codes = |s: &ListingSnapshot| -> Vec<String> {
        s.records().map(|r| r.identifier.clone()).collect()
    };
    assert_eq!(codes(&original), codes(&reloaded));
}

fn write_stale_cache(path: &std::path::Path) {
    let records = vec![
        InstrumentRecord::from_listing(Market::Domestic, "600519", "贵州茅台").unwrap(),
        InstrumentRecord::from_listing(Market::Domestic, "000001", "平安银行").unwrap(),
    ];
    let snapshot = ListingSnapshot::build(records, Utc::now() - ChronoDuration::hours(48));
    SnapshotFile::new(path).save(&snapshot).unwrap();
}

#[tokio::test]
async fn test_stale_cache_is_refreshed_on_use() {
    init_logging();
    let dir = tempdir().unwrap();
    let path = dir.path().join("stock_cache.json");
    write_stale_cache(&path);

    let provider = Arc::new(FakeProvider::new(
        "LIVE_A",
        Market::Domestic,
        &[("600519", "贵州茅台"), ("600036", "招商银行")],
    ));
    let config = test_config().with_cache_path(&path);
    let service = ResolverService::new(ListingCache::open(
        ListingSource::new(
            vec![provider.clone() as Arc<dyn ListingProvider>],
            config.provider_timeout,
        ),
        &config,
    ));

    assert!(service.cache().is_stale().await);
    assert_eq!(service.resolve_one("招商银行").await.as_deref(), Some("600036"));
    assert_eq!(provider.call_count(), 1);
    assert_eq!(service.cache().state().await, CacheState::Fresh);
    assert!(service.lookup("000001").await.is_none());
}

#[tokio::test]
async fn test_stale_cache_is_served_when_refresh_fails() {
    init_logging();
    let dir = tempdir().unwrap();
    let path = dir.path().join("stock_cache.json");
    write_stale_cache(&path);

    let config = test_config().with_cache_path(&path);
    let service = ResolverService::new(ListingCache::open(
        ListingSource::new(
            vec![Arc::new(FakeProvider::failing("DOWN_A", Market::Domestic))],
            config.provider_timeout,
        ),
        &config,
    ));

    assert_eq!(service.resolve_one("平安银行").await.as_deref(), Some("000001"));
    assert_eq!(service.cache().state().await, CacheState::Stale);
}
