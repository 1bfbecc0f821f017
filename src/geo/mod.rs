//! Geographic eligibility: coordinates, radius buckets, and the
//! R-tree backed [`GeoFilter`].

mod coordinates;
mod filter;
mod radius;

pub use coordinates::Coordinates;
pub use filter::{Candidate, GeoFilter};
pub use radius::{RadiusBuckets, RadiusCategory};
