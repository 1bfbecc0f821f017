//! Ranking strategies over a geo-filtered candidate set.
//!
//! The mode is a closed enum matched exhaustively; each variant states
//! what it needs (prompt, requester) and fails before any scoring when
//! that input is missing.

mod blend;

pub use blend::{BlendWeights, DEFAULT_ALPHA};

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

use self::blend::{blended_order, BlendedScore};
use crate::catalog::StationId;
use crate::error::{Result, SearchError};
use crate::geo::Candidate;
use crate::index::{CollaborativeSignal, UserId, VectorIndex};

/// How candidates are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RankingMode {
    /// Nearest first; prompt and requester are ignored
    #[default]
    #[serde(rename = "distance")]
    Distance,
    /// Prompt similarity, nearest first on ties
    #[serde(rename = "base", alias = "vector")]
    Vector,
    /// Blend of prompt similarity and the requester's affinity
    #[serde(rename = "cf", alias = "vector+cf")]
    VectorPlusCf,
}

impl RankingMode {
    pub const ALL: [Self; 3] = [Self::Distance, Self::Vector, Self::VectorPlusCf];

    /// Name used at the request boundary (`distance`, `base`, `cf`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Distance => "distance",
            Self::Vector => "base",
            Self::VectorPlusCf => "cf",
        }
    }

    /// Name of the scoring strategy, for logs.
    pub fn strategy(&self) -> &'static str {
        match self {
            Self::Distance => "distance",
            Self::Vector => "vector",
            Self::VectorPlusCf => "vector+cf",
        }
    }

    /// Validate that the inputs this mode needs are present.
    pub fn check(&self, prompt: Option<&str>, user: Option<UserId>) -> Result<()> {
        match self {
            Self::Distance => Ok(()),
            Self::Vector => require_prompt(prompt).map(|_| ()),
            Self::VectorPlusCf => {
                require_user(user)?;
                require_prompt(prompt).map(|_| ())
            }
        }
    }
}

impl FromStr for RankingMode {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "distance" => Ok(Self::Distance),
            "base" | "vector" => Ok(Self::Vector),
            "cf" | "vector+cf" => Ok(Self::VectorPlusCf),
            other => Err(SearchError::InvalidMode(other.to_string())),
        }
    }
}

impl std::fmt::Display for RankingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn require_prompt(prompt: Option<&str>) -> Result<&str> {
    prompt
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or(SearchError::MissingPrompt)
}

fn require_user(user: Option<UserId>) -> Result<UserId> {
    user.ok_or(SearchError::MissingUser)
}

/// Orders candidates for a given mode using the shared read-only indexes.
pub struct Reranker {
    vectors: Arc<VectorIndex>,
    affinity: Arc<CollaborativeSignal>,
    blend: BlendWeights,
}

impl Reranker {
    pub fn new(
        vectors: Arc<VectorIndex>,
        affinity: Arc<CollaborativeSignal>,
        blend: BlendWeights,
    ) -> Self {
        Self {
            vectors,
            affinity,
            blend,
        }
    }

    /// Return candidate ids in final order.
    ///
    /// `candidates` must already be nearest-first, as produced by
    /// [`crate::geo::GeoFilter::select`].
    pub async fn rerank(
        &self,
        mode: RankingMode,
        prompt: Option<&str>,
        user: Option<UserId>,
        candidates: &[Candidate],
    ) -> Result<Vec<StationId>> {
        mode.check(prompt, user)?;

        let ranked = match mode {
            RankingMode::Distance => candidates.iter().map(|c| c.id).collect(),
            RankingMode::Vector => {
                self.by_similarity(require_prompt(prompt)?, candidates)
                    .await?
            }
            RankingMode::VectorPlusCf => {
                let user = require_user(user)?;
                self.by_blend(require_prompt(prompt)?, user, candidates)
                    .await?
            }
        };

        debug!(
            strategy = mode.strategy(),
            candidates = candidates.len(),
            "Reranked candidates"
        );

        Ok(ranked)
    }

    async fn by_similarity(&self, prompt: &str, candidates: &[Candidate]) -> Result<Vec<StationId>> {
        let ids: Vec<StationId> = candidates.iter().map(|c| c.id).collect();
        let similarities = self.vectors.score(prompt, &ids).await?;

        let mut scored: Vec<(f32, &Candidate)> = candidates
            .iter()
            .map(|c| (similarities.get(&c.id).copied().unwrap_or(0.0), c))
            .collect();

        scored.sort_by(|(sim_a, a), (sim_b, b)| {
            sim_b
                .total_cmp(sim_a)
                .then(a.distance_m.total_cmp(&b.distance_m))
                .then(a.position.cmp(&b.position))
        });

        Ok(scored.into_iter().map(|(_, c)| c.id).collect())
    }

    async fn by_blend(
        &self,
        prompt: &str,
        user: UserId,
        candidates: &[Candidate],
    ) -> Result<Vec<StationId>> {
        let ids: Vec<StationId> = candidates.iter().map(|c| c.id).collect();
        let similarities = self.vectors.score(prompt, &ids).await?;
        let affinities = self.affinity.score(user, &ids);

        let mut scored: Vec<BlendedScore> = candidates
            .iter()
            .map(|c| {
                let similarity = similarities.get(&c.id).copied().unwrap_or(0.0);
                // missing affinity is neutral, never a penalty
                let affinity = affinities.get(&c.id).copied().unwrap_or(0.0);
                BlendedScore {
                    composite: self.blend.combine(similarity, affinity),
                    distance_m: c.distance_m,
                    similarity,
                    id: c.id.0,
                }
            })
            .collect();

        scored.sort_by(blended_order);

        Ok(scored.into_iter().map(|s| StationId(s.id)).collect())
    }

    pub fn blend(&self) -> BlendWeights {
        self.blend
    }

    pub fn vectors(&self) -> &VectorIndex {
        &self.vectors
    }

    pub fn affinity(&self) -> &CollaborativeSignal {
        &self.affinity
    }
}
