//! Integration tests for top-K selection over a paginated catalog.

use std::sync::Arc;

use catalog_scout::application::{select_top_k, select_top_k_by, FetchRequest, PaginatedFetcher};
use catalog_scout::config::FetchConfig;
use catalog_scout::domain::{CatalogEntry, EntityKind, Metric};
use catalog_scout::error::{FetchError, TransportError};
use catalog_scout::port::CatalogFilter;
use catalog_scout::testkit::catalog::ScriptedCatalog;
use catalog_scout::testkit::domain::{market, market_with_metrics};
use serde_json::json;

fn fetcher(catalog: ScriptedCatalog) -> PaginatedFetcher {
    let settings = FetchConfig {
        page_size: 2,
        retry_max_attempts: 2,
        retry_backoff_ms: 1,
        retry_backoff_cap_ms: 2,
        ..FetchConfig::default()
    };
    PaginatedFetcher::new(Arc::new(catalog), settings)
}

fn all_markets() -> FetchRequest {
    FetchRequest::new(EntityKind::Market, CatalogFilter::default())
}

#[tokio::test]
async fn ranking_over_pages_matches_a_full_sort() {
    let entries: Vec<CatalogEntry> = (0..50)
        .map(|i| market(&format!("M{i:02}"), f64::from((i * 37) % 101)))
        .collect();

    let mut expected: Vec<(f64, String)> = entries
        .iter()
        .map(|e| (e.metric(Metric::Volume).unwrap(), e.identifier().to_string()))
        .collect();
    expected.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    let expected: Vec<String> = expected.into_iter().take(5).map(|(_, id)| id).collect();

    let fetcher = fetcher(ScriptedCatalog::paged(entries, 7));
    let ranking = select_top_k(fetcher.fetch(all_markets()), Metric::Volume, 5)
        .await
        .unwrap();

    let ids: Vec<String> = ranking.identifiers().into_iter().map(str::to_string).collect();
    assert_eq!(ids, expected);
    assert_eq!(ranking.scanned, 50);
}

#[tokio::test]
async fn failure_on_third_page_keeps_first_two() {
    let outage = TransportError::Status {
        status: 500,
        body: String::new(),
    };
    let catalog = ScriptedCatalog::new()
        .then_page(vec![market("P1A", 10.0), market("P1B", 50.0)], true)
        .then_page(vec![market("P2A", 5.0), market("P2B", 90.0)], true)
        .then_error(outage.clone())
        .then_error(outage)
        .then_page(vec![market("P3A", 1000.0)], true)
        .then_page(vec![market("P4A", 2000.0)], false);

    let partial = select_top_k(fetcher(catalog).fetch(all_markets()), Metric::Volume, 3)
        .await
        .unwrap_err();

    assert_eq!(partial.scanned, 4);
    assert!(matches!(
        partial.cause,
        FetchError::FetchFailed {
            page: 3,
            attempts: 2,
            ..
        }
    ));
    let ranking = partial.ranking(Metric::Volume).unwrap();
    assert_eq!(ranking.identifiers(), vec!["P2B", "P1B", "P1A"]);
}

#[tokio::test]
async fn equal_values_across_pages_rank_by_identifier() {
    let catalog = ScriptedCatalog::new()
        .then_page(vec![market("D", 7.0), market("B", 7.0)], true)
        .then_page(vec![market("A", 7.0), market("C", 7.0)], false);

    let ranking = select_top_k(fetcher(catalog).fetch(all_markets()), Metric::Volume, 3)
        .await
        .unwrap();

    assert_eq!(ranking.identifiers(), vec!["A", "B", "C"]);
}

#[tokio::test]
async fn one_walk_ranks_lifetime_and_daily_volume() {
    let catalog = ScriptedCatalog::paged(
        vec![
            market_with_metrics("OLD", &[("volume", json!(9000)), ("volume_24h", json!(0))]),
            market_with_metrics("HOT", &[("volume", json!(300)), ("volume_24h", json!(250))]),
            market_with_metrics("MID", &[("volume", json!(800)), ("volume_24h", json!("40.5"))]),
        ],
        2,
    );
    let catalog = Arc::new(catalog);
    let fetcher = PaginatedFetcher::new(
        catalog.clone(),
        FetchConfig {
            page_size: 2,
            ..FetchConfig::default()
        },
    );

    let rankings = select_top_k_by(
        fetcher.fetch(all_markets()),
        &[Metric::Volume, Metric::Volume24h],
        2,
    )
    .await
    .unwrap();

    assert_eq!(rankings[0].identifiers(), vec!["OLD", "MID"]);
    assert_eq!(rankings[1].identifiers(), vec!["HOT", "MID"]);
    assert_eq!(rankings[1].values(), vec![250.0, 40.5]);
    assert_eq!(catalog.request_count(), 2);
}
