use super::{SearchEngine, StationInfo};
use crate::catalog::StationId;
use crate::error::Result;
use crate::index::UserId;
use crate::rerank::RankingMode;

/// One requester's view of the engine.
///
/// Remembers the ranking mode selected with [`SearchSession::set_reranker`]
/// and passes it into each query. Sessions share the engine and never see
/// each other's mode.
pub struct SearchSession<'a> {
    engine: &'a SearchEngine,
    mode: RankingMode,
}

impl<'a> SearchSession<'a> {
    pub fn new(engine: &'a SearchEngine) -> Self {
        Self {
            engine,
            mode: engine.default_mode(),
        }
    }

    /// Select the ranking mode for subsequent searches.
    pub fn set_reranker(&mut self, mode: RankingMode) {
        self.mode = mode;
    }

    /// Select the ranking mode by its request name (`distance`, `base`, `cf`).
    ///
    /// An unknown name leaves the current mode unchanged.
    pub fn set_reranker_by_name(&mut self, name: &str) -> Result<()> {
        self.mode = name.parse()?;
        Ok(())
    }

    pub fn mode(&self) -> RankingMode {
        self.mode
    }

    pub async fn get_results_all(
        &self,
        lat: f64,
        lng: f64,
        prompt: Option<&str>,
        user: Option<UserId>,
        radius: f64,
    ) -> Result<Vec<StationId>> {
        let mode = self.mode;
        self.engine
            .get_results_all(mode, lat, lng, prompt, user, radius)
            .await
    }

    pub fn get_station_info(&self, ids: &[StationId]) -> Result<Vec<StationInfo>> {
        self.engine.get_station_info(ids)
    }
}
