//! Linear blending of similarity and affinity for the `cf` mode.

use std::cmp::Ordering;

/// Default weight for similarity; affinity gets the remainder.
pub const DEFAULT_ALPHA: f32 = 0.7;

/// `composite = alpha * similarity + (1 - alpha) * affinity`
///
/// `alpha` is clamped to `[0, 1]`, which keeps the composite
/// non-decreasing in both inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendWeights {
    alpha: f32,
}

impl BlendWeights {
    pub fn new(alpha: f32) -> Self {
        let alpha = if alpha.is_finite() {
            alpha.clamp(0.0, 1.0)
        } else {
            DEFAULT_ALPHA
        };
        Self { alpha }
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn combine(&self, similarity: f32, affinity: f32) -> f32 {
        self.alpha * similarity + (1.0 - self.alpha) * affinity
    }
}

impl Default for BlendWeights {
    fn default() -> Self {
        Self::new(DEFAULT_ALPHA)
    }
}

/// Per-candidate inputs to the blended ordering.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BlendedScore {
    pub composite: f32,
    pub distance_m: f64,
    pub similarity: f32,
    pub id: u64,
}

/// Composite desc, then distance asc, then similarity desc, then id asc.
pub(crate) fn blended_order(a: &BlendedScore, b: &BlendedScore) -> Ordering {
    b.composite
        .total_cmp(&a.composite)
        .then(a.distance_m.total_cmp(&b.distance_m))
        .then(b.similarity.total_cmp(&a.similarity))
        .then(a.id.cmp(&b.id))
}
