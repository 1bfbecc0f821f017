use anyhow::Result;

use electrifind::{RankingMode, StationId, UserId};

use crate::helpers::test_harness::{TestHarness, ORIGIN};

const SMALL: f64 = 0.01;

fn ids(raw: &[u64]) -> Vec<StationId> {
    raw.iter().copied().map(StationId).collect()
}

#[tokio::test]
async fn test_cf_affinity_only_follows_history() -> Result<()> {
    let mut harness = TestHarness::new()?;
    harness.config.search.blend_alpha = 0.0;
    let engine = harness.engine().await?;

    // User 1 rated 3 above 2 and never saw 1
    let results = engine
        .get_results_all(
            RankingMode::VectorPlusCf,
            ORIGIN.0,
            ORIGIN.1,
            Some("anything"),
            Some(UserId(1)),
            SMALL,
        )
        .await?;
    assert_eq!(results, ids(&[3, 2, 1]));

    // User 2 only rated 1 here; 3 and 2 tie at zero and fall back to distance
    let results = engine
        .get_results_all(
            RankingMode::VectorPlusCf,
            ORIGIN.0,
            ORIGIN.1,
            Some("anything"),
            Some(UserId(2)),
            SMALL,
        )
        .await?;
    assert_eq!(results, ids(&[1, 3, 2]));

    Ok(())
}

#[tokio::test]
async fn test_cf_unknown_user_is_neutral() -> Result<()> {
    let harness = TestHarness::new()?;
    let engine = harness.engine().await?;
    let prompt = "dc fast charging at the mall";

    let vector = engine
        .get_results_all(RankingMode::Vector, ORIGIN.0, ORIGIN.1, Some(prompt), None, 0.05)
        .await?;
    let blended = engine
        .get_results_all(
            RankingMode::VectorPlusCf,
            ORIGIN.0,
            ORIGIN.1,
            Some(prompt),
            Some(UserId(4242)),
            0.05,
        )
        .await?;

    assert_eq!(vector, blended);

    Ok(())
}

#[tokio::test]
async fn test_cf_similarity_only_matches_vector_mode() -> Result<()> {
    let mut harness = TestHarness::new()?;
    harness.config.search.blend_alpha = 1.0;
    let engine = harness.engine().await?;
    let prompt = "tesla";

    let vector = engine
        .get_results_all(RankingMode::Vector, ORIGIN.0, ORIGIN.1, Some(prompt), None, 0.05)
        .await?;
    let blended = engine
        .get_results_all(
            RankingMode::VectorPlusCf,
            ORIGIN.0,
            ORIGIN.1,
            Some(prompt),
            Some(UserId(1)),
            0.05,
        )
        .await?;

    assert_eq!(vector, blended);

    Ok(())
}

#[tokio::test]
async fn test_cf_is_deterministic() -> Result<()> {
    let harness = TestHarness::new()?;
    let engine = harness.engine().await?;

    let mut runs = Vec::new();
    for _ in 0..3 {
        runs.push(
            engine
                .get_results_all(
                    RankingMode::VectorPlusCf,
                    ORIGIN.0,
                    ORIGIN.1,
                    Some("chargepoint library"),
                    Some(UserId(2)),
                    0.05,
                )
                .await?,
        );
    }

    assert!(runs.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(runs[0].len(), 5);

    Ok(())
}

#[tokio::test]
async fn test_concurrent_queries_use_their_own_mode() -> Result<()> {
    let harness = TestHarness::new()?;
    let engine = std::sync::Arc::new(harness.engine().await?);

    let expected_distance = engine
        .get_results_all(RankingMode::Distance, ORIGIN.0, ORIGIN.1, None, None, 0.05)
        .await?;
    let expected_vector = engine
        .get_results_all(RankingMode::Vector, ORIGIN.0, ORIGIN.1, Some("hotel"), None, 0.05)
        .await?;

    let mut handles = Vec::new();
    for i in 0..16 {
        let engine = std::sync::Arc::clone(&engine);
        handles.push(tokio::spawn(async move {
            let mode = if i % 2 == 0 {
                RankingMode::Distance
            } else {
                RankingMode::Vector
            };
            let results = engine
                .get_results_all(mode, ORIGIN.0, ORIGIN.1, Some("hotel"), None, 0.05)
                .await;
            (mode, results)
        }));
    }

    for handle in handles {
        let (mode, results) = handle.await?;
        let results = results?;
        match mode {
            RankingMode::Distance => assert_eq!(results, expected_distance),
            _ => assert_eq!(results, expected_vector),
        }
    }

    Ok(())
}
