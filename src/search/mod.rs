//! Query validation, retrieval, and the per-requester session.
//!
//! [`SearchEngine`] composes the geo filter and the reranker over shared
//! read-only indexes. [`SearchSession`] carries the one piece of
//! per-requester state, the selected ranking mode.

mod engine;
mod query;
mod session;

pub use engine::{SearchEngine, StationInfo};
pub use query::{Query, RawQuery};
pub use session::SearchSession;
