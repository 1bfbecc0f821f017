//! Sparse user × station affinity model.
//!
//! Interactions (visits, ratings) are normalised per user to `[0, 1]`.
//! A station the user has interacted with scores its normalised weight;
//! any other station is predicted from the user's history through item
//! cosine similarity over co-interacting users. No signal resolves to
//! `0.0`, which callers must read as neutral rather than negative.

use anyhow::{bail, Context};
use polars::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::catalog::{StationCatalog, StationId};

/// Opaque requester identity. Absence is modelled as `Option<UserId>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl UserId {
    /// Raw value the presentation layer uses to mean "no user".
    pub const SENTINEL: i64 = -1;

    /// Map a raw identity to an optional one, folding the sentinel to `None`.
    pub fn from_raw(raw: i64) -> Option<Self> {
        (raw != Self::SENTINEL).then_some(Self(raw))
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One observed user/station interaction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interaction {
    pub user: UserId,
    pub station: StationId,
    /// Non-negative strength (visit count, rating, ...)
    pub weight: f32,
}

/// Item-based collaborative filtering model.
///
/// Per-user and per-station entries are kept ordered so every float sum
/// runs in the same order on every run.
#[derive(Debug, Default)]
pub struct CollaborativeSignal {
    by_user: HashMap<UserId, BTreeMap<StationId, f32>>,
    by_station: HashMap<StationId, BTreeMap<UserId, f32>>,
    station_norms: HashMap<StationId, f32>,
}

impl CollaborativeSignal {
    /// Model with no history; every score is neutral.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from raw interactions. Repeated pairs are summed; negative
    /// or non-finite weights are dropped.
    pub fn from_interactions(interactions: impl IntoIterator<Item = Interaction>) -> Self {
        let mut raw: HashMap<UserId, BTreeMap<StationId, f32>> = HashMap::new();
        let mut dropped = 0usize;

        for interaction in interactions {
            if !interaction.weight.is_finite() || interaction.weight < 0.0 {
                dropped += 1;
                continue;
            }
            *raw.entry(interaction.user)
                .or_default()
                .entry(interaction.station)
                .or_insert(0.0) += interaction.weight;
        }

        if dropped > 0 {
            warn!(dropped, "Dropped interactions with invalid weights");
        }

        let mut by_user = HashMap::with_capacity(raw.len());
        let mut by_station: HashMap<StationId, BTreeMap<UserId, f32>> = HashMap::new();

        for (user, stations) in raw {
            let max = stations.values().copied().fold(0.0f32, f32::max);
            if max <= 0.0 {
                continue;
            }

            let normalized: BTreeMap<StationId, f32> = stations
                .into_iter()
                .filter(|(_, w)| *w > 0.0)
                .map(|(station, w)| (station, w / max))
                .collect();

            for (&station, &w) in &normalized {
                by_station.entry(station).or_default().insert(user, w);
            }
            by_user.insert(user, normalized);
        }

        let station_norms = by_station
            .iter()
            .map(|(&station, users)| {
                let norm = users.values().map(|w| w * w).sum::<f32>().sqrt();
                (station, norm)
            })
            .collect();

        info!(
            users = by_user.len(),
            stations = by_station.len(),
            "Affinity model built"
        );

        Self {
            by_user,
            by_station,
            station_norms,
        }
    }

    /// Affinity of `user` for each candidate, all in `[0, 1]`.
    pub fn score(&self, user: UserId, candidates: &[StationId]) -> HashMap<StationId, f32> {
        let Some(history) = self.by_user.get(&user) else {
            debug!(user = %user, "No interaction history; affinity is neutral");
            return candidates.iter().map(|id| (*id, 0.0)).collect();
        };

        candidates
            .par_iter()
            .map(|id| (*id, self.affinity(history, *id)))
            .collect()
    }

    /// Whether the model has any history for `user`.
    pub fn knows(&self, user: UserId) -> bool {
        self.by_user.contains_key(&user)
    }

    /// Cosine similarity between two stations' user columns.
    pub fn item_similarity(&self, a: StationId, b: StationId) -> f32 {
        let (Some(col_a), Some(col_b)) = (self.by_station.get(&a), self.by_station.get(&b)) else {
            return 0.0;
        };
        let denom = self.station_norms.get(&a).copied().unwrap_or(0.0)
            * self.station_norms.get(&b).copied().unwrap_or(0.0);
        if denom <= 0.0 {
            return 0.0;
        }

        let (small, large) = if col_a.len() <= col_b.len() {
            (col_a, col_b)
        } else {
            (col_b, col_a)
        };
        let dot: f32 = small
            .iter()
            .filter_map(|(user, w)| large.get(user).map(|other| w * other))
            .sum();

        (dot / denom).clamp(0.0, 1.0)
    }

    fn affinity(&self, history: &BTreeMap<StationId, f32>, station: StationId) -> f32 {
        if let Some(&observed) = history.get(&station) {
            return observed;
        }

        let (weighted, total) = history
            .iter()
            .map(|(&rated, &w)| (self.item_similarity(station, rated), w))
            .filter(|(sim, _)| *sim > 0.0)
            .fold((0.0f32, 0.0f32), |(num, den), (sim, w)| {
                (num + sim * w, den + sim)
            });

        if total > 0.0 {
            (weighted / total).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn user_count(&self) -> usize {
        self.by_user.len()
    }

    pub fn station_count(&self) -> usize {
        self.by_station.len()
    }
}

/// Read `user_id,station_id,score` rows, dropping stations the catalog
/// does not know.
pub fn load_interactions_csv(
    path: &Path,
    catalog: &StationCatalog,
) -> anyhow::Result<Vec<Interaction>> {
    let mut frame = LazyCsvReader::new(path)
        .with_has_header(true)
        .finish()
        .with_context(|| format!("Failed to open interaction data {:?}", path))?;

    let schema = frame
        .collect_schema()
        .with_context(|| format!("Failed to read header of {:?}", path))?;
    for column in ["user_id", "station_id", "score"] {
        if !schema.contains(column) {
            bail!("Interaction data {:?} is missing column '{}'", path, column);
        }
    }

    let df = frame
        .select([
            col("user_id").cast(DataType::Int64),
            col("station_id").cast(DataType::UInt64),
            col("score").cast(DataType::Float64),
        ])
        .collect()
        .with_context(|| format!("Failed to parse interaction data {:?}", path))?;

    let users = df.column("user_id")?.i64()?;
    let stations = df.column("station_id")?.u64()?;
    let scores = df.column("score")?.f64()?;

    let mut interactions = Vec::with_capacity(df.height());
    let mut unknown = 0usize;

    for row in 0..df.height() {
        let (Some(user), Some(station), Some(score)) =
            (users.get(row), stations.get(row), scores.get(row))
        else {
            continue;
        };
        let Some(user) = UserId::from_raw(user) else {
            continue;
        };

        let station = StationId(station);
        if !catalog.contains(station) {
            unknown += 1;
            continue;
        }

        interactions.push(Interaction {
            user,
            station,
            weight: score as f32,
        });
    }

    if unknown > 0 {
        warn!(unknown, "Dropped interactions for stations missing from the catalog");
    }
    info!(interactions = interactions.len(), path = %path.display(), "Loaded interaction data");

    Ok(interactions)
}
