use anyhow::Result;
use std::collections::HashSet;
use std::sync::atomic::Ordering;
use std::io::Write;
use std::sync::{Arc, Mutex};

use electrifind::catalog::{load_stations_csv, StationCatalog};
use electrifind::config::SearchConfig;
use electrifind::geo::{Coordinates, GeoFilter};
use electrifind::index::{CollaborativeSignal, VectorIndex};
use electrifind::{RankingMode, SearchEngine, SearchError, StationId, UserId};

use crate::helpers::counting_embedder::CountingEmbedder;
use crate::helpers::test_harness::{TestHarness, ORIGIN};

const SMALL: f64 = 0.01;
const MED: f64 = 0.03;
const LARGE: f64 = 0.05;

fn ids(raw: &[u64]) -> Vec<StationId> {
    raw.iter().copied().map(StationId).collect()
}

#[tokio::test]
async fn test_small_radius_includes_near_excludes_far() -> Result<()> {
    let harness = TestHarness::new()?;
    let engine = harness.engine().await?;

    let results = engine
        .get_results_all(RankingMode::Distance, ORIGIN.0, ORIGIN.1, None, None, SMALL)
        .await?;

    assert!(results.contains(&StationId(1)));
    assert!(!results.contains(&StationId(7)));
    assert_eq!(results, ids(&[1, 3, 2]));

    Ok(())
}

#[tokio::test]
async fn test_distance_mode_matches_geo_order() -> Result<()> {
    let harness = TestHarness::new()?;
    let engine = harness.engine().await?;
    let geo = GeoFilter::new(engine.catalog());
    let origin = Coordinates::new(ORIGIN.0, ORIGIN.1)?;

    for radius in [SMALL, MED, LARGE] {
        let expected: Vec<StationId> = geo.select(&origin, radius).iter().map(|c| c.id).collect();
        let results = engine
            .get_results_all(
                RankingMode::Distance,
                ORIGIN.0,
                ORIGIN.1,
                Some("ignored prompt"),
                Some(UserId(1)),
                radius,
            )
            .await?;
        assert_eq!(results, expected);
    }

    Ok(())
}

#[tokio::test]
async fn test_larger_radius_is_superset_in_every_mode() -> Result<()> {
    let harness = TestHarness::new()?;
    let engine = harness.engine().await?;

    for mode in RankingMode::ALL {
        let mut previous: HashSet<StationId> = HashSet::new();
        for radius in [SMALL, MED, LARGE] {
            let results: HashSet<StationId> = engine
                .get_results_all(mode, ORIGIN.0, ORIGIN.1, Some("tesla"), Some(UserId(1)), radius)
                .await?
                .into_iter()
                .collect();
            assert!(previous.is_subset(&results), "{} at {}", mode, radius);
            previous = results;
        }
    }

    Ok(())
}

#[tokio::test]
async fn test_results_never_exceed_radius() -> Result<()> {
    let harness = TestHarness::new()?;
    let engine = harness.engine().await?;
    let origin = Coordinates::new(ORIGIN.0, ORIGIN.1)?;

    for radius in [SMALL, MED, LARGE] {
        let results = engine
            .get_results_all(RankingMode::Distance, ORIGIN.0, ORIGIN.1, None, None, radius)
            .await?;
        for info in engine.get_station_info(&results)? {
            let coordinates = Coordinates::new(info.latitude, info.longitude)?;
            assert!(origin.chebyshev_degrees(&coordinates) <= radius);
        }
    }

    Ok(())
}

#[tokio::test]
async fn test_vector_mode_orders_by_similarity() -> Result<()> {
    let harness = TestHarness::new()?;
    let engine = harness.engine().await?;
    let prompt = "tesla supercharger";

    let by_distance = engine
        .get_results_all(RankingMode::Distance, ORIGIN.0, ORIGIN.1, None, None, LARGE)
        .await?;
    let by_vector = engine
        .get_results_all(RankingMode::Vector, ORIGIN.0, ORIGIN.1, Some(prompt), None, LARGE)
        .await?;

    let mut sorted_a = by_distance.clone();
    let mut sorted_b = by_vector.clone();
    sorted_a.sort();
    sorted_b.sort();
    assert_eq!(sorted_a, sorted_b, "vector mode must permute the candidate set");

    let scores = engine.reranker().vectors().score(prompt, &by_vector).await?;
    assert!(by_vector
        .windows(2)
        .all(|w| scores[&w[0]] >= scores[&w[1]]));

    let again = engine
        .get_results_all(RankingMode::Vector, ORIGIN.0, ORIGIN.1, Some(prompt), None, LARGE)
        .await?;
    assert_eq!(by_vector, again);

    Ok(())
}

#[tokio::test]
async fn test_cf_without_user_fails_before_scoring() -> Result<()> {
    let stations = {
        let harness = TestHarness::new()?;
        load_stations_csv(&harness.config.stations_path(harness.path()))?
    };
    let catalog = Arc::new(StationCatalog::new(stations)?);
    let (embedder, queries) = CountingEmbedder::new(64);
    let vectors = VectorIndex::build(&catalog, Arc::new(embedder)).await?;
    let engine = SearchEngine::new(
        catalog,
        Arc::new(vectors),
        Arc::new(CollaborativeSignal::empty()),
        &SearchConfig::default(),
    );

    let err = engine
        .get_results_all(RankingMode::VectorPlusCf, ORIGIN.0, ORIGIN.1, Some("tesla"), None, SMALL)
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::MissingUser));
    assert_eq!(queries.load(Ordering::SeqCst), 0);

    // Missing user is reported even when the prompt is also missing
    let err = engine
        .get_results_all(RankingMode::VectorPlusCf, ORIGIN.0, ORIGIN.1, None, None, SMALL)
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::MissingUser));
    assert_eq!(queries.load(Ordering::SeqCst), 0);

    Ok(())
}

#[tokio::test]
async fn test_empty_prompt_rejected_only_when_used() -> Result<()> {
    let harness = TestHarness::new()?;
    let engine = harness.engine().await?;

    let err = engine
        .get_results_all(RankingMode::Vector, ORIGIN.0, ORIGIN.1, Some(""), None, SMALL)
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::MissingPrompt));

    let err = engine
        .get_results_all(RankingMode::Vector, ORIGIN.0, ORIGIN.1, Some("   "), None, SMALL)
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::MissingPrompt));

    let results = engine
        .get_results_all(RankingMode::Distance, ORIGIN.0, ORIGIN.1, Some(""), None, SMALL)
        .await?;
    assert_eq!(results.len(), 3);

    Ok(())
}

#[tokio::test]
async fn test_no_candidates_is_empty_not_error() -> Result<()> {
    let harness = TestHarness::new()?;
    let engine = harness.engine().await?;

    // Middle of Lake Michigan
    for mode in RankingMode::ALL {
        let results = engine
            .get_results_all(mode, 43.5, -87.0, Some("fast"), Some(UserId(1)), LARGE)
            .await?;
        assert!(results.is_empty());
    }
    assert!(engine.get_station_info(&[])?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_validation_still_applies_with_no_candidates() -> Result<()> {
    let harness = TestHarness::new()?;
    let engine = harness.engine().await?;

    let err = engine
        .get_results_all(RankingMode::Vector, 43.5, -87.0, None, None, LARGE)
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::MissingPrompt));

    Ok(())
}

#[tokio::test]
async fn test_invalid_coordinates() -> Result<()> {
    let harness = TestHarness::new()?;
    let engine = harness.engine().await?;

    for (lat, lng) in [(91.0, 0.0), (0.0, 181.0), (f64::NAN, 0.0)] {
        let err = engine
            .get_results_all(RankingMode::Distance, lat, lng, None, None, SMALL)
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::InvalidCoordinates(_)));
    }

    Ok(())
}

#[tokio::test]
async fn test_station_info_preserves_order() -> Result<()> {
    let harness = TestHarness::new()?;
    let engine = harness.engine().await?;

    let request = ids(&[5, 1, 3, 1]);
    let records = engine.get_station_info(&request)?;
    let returned: Vec<StationId> = records.iter().map(|r| r.id).collect();
    assert_eq!(returned, request);

    assert_eq!(records[1].station_name, "Fuller Road Supercharger");
    assert_eq!(records[1].street_address, "1500 Fuller Rd");
    assert_eq!(records[1].ev_network, "Tesla");
    assert_eq!(records[0].ev_network, "Non-Networked");

    Ok(())
}

#[tokio::test]
async fn test_station_info_unknown_id() -> Result<()> {
    let harness = TestHarness::new()?;
    let engine = harness.engine().await?;

    let err = engine.get_station_info(&ids(&[1, 404])).unwrap_err();
    assert!(matches!(err, SearchError::NotFound(StationId(404))));

    Ok(())
}

#[tokio::test]
async fn test_max_candidates_keeps_nearest() -> Result<()> {
    let mut harness = TestHarness::new()?;
    harness.config.search.max_candidates = 2;
    let engine = harness.engine().await?;

    let results = engine
        .get_results_all(RankingMode::Distance, ORIGIN.0, ORIGIN.1, None, None, SMALL)
        .await?;
    assert_eq!(results, ids(&[1, 3]));

    let results = engine
        .get_results_all(RankingMode::Vector, ORIGIN.0, ORIGIN.1, Some("library"), None, LARGE)
        .await?;
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|id| [1, 3].contains(&id.0)));

    Ok(())
}

#[derive(Clone, Default)]
struct CapturedLog(Arc<Mutex<Vec<u8>>>);

impl Write for CapturedLog {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_search_log_carries_structured_fields() -> Result<()> {
    let harness = TestHarness::new()?;
    let engine = harness.engine().await?;

    let log = CapturedLog::default();
    let writer = log.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let results = engine
        .get_results_all(RankingMode::Distance, ORIGIN.0, ORIGIN.1, None, None, SMALL)
        .await?;
    assert_eq!(results.len(), 3);

    let output = String::from_utf8(log.0.lock().unwrap().clone())?;
    let line = output
        .lines()
        .find(|line| line.contains("Search completed"))
        .expect("search summary line");
    assert!(line.contains("mode=\"distance\"") || line.contains("mode=distance"));
    assert!(line.contains("candidates=3"));
    assert!(line.contains("results=3"));
    assert!(line.contains("elapsed_ms="));

    Ok(())
}
