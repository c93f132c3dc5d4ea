use std::sync::Arc;

use crate::config::Config;
use crate::orchestrator::ScoreOrchestrator;
use crate::scoring_client::ScoringClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Used directly only for resume uploads; scoring goes through the orchestrator.
    pub scoring: Arc<dyn ScoringClient>,
    /// Sole owner of the current input and the published score.
    pub orchestrator: ScoreOrchestrator,
    pub config: Config,
}
