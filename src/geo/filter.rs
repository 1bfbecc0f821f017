//! Radius filtering over the station catalog.
//!
//! Two stages: the R-tree returns everything inside the circle that
//! circumscribes the query box, then the per-axis degree test decides
//! eligibility. Survivors are ordered by haversine distance.

use rstar::{PointDistance, RTree, RTreeObject, AABB};
use tracing::debug;

use super::Coordinates;
use crate::catalog::{StationCatalog, StationId};

/// Tolerance on the box edge. Coordinate deltas carry subtraction error,
/// so a station exactly `r` degrees north or east can compute as slightly
/// more than `r`.
const EDGE_SLACK: f64 = 1e-9;

/// A station that passed geographic eligibility.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub id: StationId,
    /// Great-circle distance from the query origin in metres
    pub distance_m: f64,
    /// Catalog insertion order, the last-resort tiebreak
    pub position: usize,
}

#[derive(Debug, Clone)]
struct StationNode {
    id: StationId,
    position: usize,
    coordinates: Coordinates,
    point: [f64; 2],
}

impl RTreeObject for StationNode {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for StationNode {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

/// Spatial index over catalog coordinates.
pub struct GeoFilter {
    tree: RTree<StationNode>,
}

impl GeoFilter {
    pub fn new(catalog: &StationCatalog) -> Self {
        let nodes = catalog
            .all()
            .enumerate()
            .map(|(position, station)| StationNode {
                id: station.id,
                position,
                coordinates: station.coordinates,
                point: station.coordinates.as_xy(),
            })
            .collect();

        Self {
            tree: RTree::bulk_load(nodes),
        }
    }

    /// Stations with `max(|Δlat|, |Δlng|) <= radius` (edge tolerance included), nearest first.
    ///
    /// `radius` is in degrees. A non-positive or non-finite radius selects
    /// nothing. Equal distances keep catalog order.
    pub fn select(&self, origin: &Coordinates, radius: f64) -> Vec<Candidate> {
        if radius <= 0.0 || !radius.is_finite() {
            debug!(radius, "Non-positive radius selects no stations");
            return Vec::new();
        }

        // The box of half-width r sits inside the circle of radius r * sqrt(2)
        let reach = radius + EDGE_SLACK;
        let max_squared = 2.0 * reach * reach;

        let mut candidates: Vec<Candidate> = self
            .tree
            .locate_within_distance(origin.as_xy(), max_squared)
            .filter(|node| origin.chebyshev_degrees(&node.coordinates) <= reach)
            .map(|node| Candidate {
                id: node.id,
                distance_m: origin.haversine_meters(&node.coordinates),
                position: node.position,
            })
            .collect();

        candidates.sort_by(|a, b| {
            a.distance_m
                .total_cmp(&b.distance_m)
                .then(a.position.cmp(&b.position))
        });

        debug!(
            origin = %origin,
            radius,
            candidates = candidates.len(),
            "Geo filter selected candidates"
        );

        candidates
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}
