//! Read-only scoring indexes consulted by the reranker.

mod affinity;
mod vector;

pub use affinity::{load_interactions_csv, CollaborativeSignal, Interaction, UserId};
pub use vector::VectorIndex;
