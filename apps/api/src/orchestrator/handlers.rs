use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::graph::{GraphSummary, TrustGraph};
use crate::orchestrator::{CurrentInput, ScoreView};
use crate::presenter::{present, render_lines, ScoreDisplay};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ScoreQuery {
    /// Block until the current request settles (bounded by the scoring timeout).
    #[serde(default)]
    pub wait: bool,
}

#[derive(Debug, Serialize)]
pub struct ScoreResponse {
    pub input: Option<CurrentInput>,
    pub view: ScoreView,
    pub display: ScoreDisplay,
    pub lines: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct TrustGraphResponse {
    pub graph: TrustGraph,
    pub summary: GraphSummary,
}

/// GET /api/v1/score
pub async fn handle_get_score(
    State(state): State<AppState>,
    Query(params): Query<ScoreQuery>,
) -> Result<Json<ScoreResponse>, AppError> {
    let mut view = state.orchestrator.view();
    if params.wait && view.state.is_loading() {
        let settled = state.orchestrator.settled(view.epoch);
        // On timeout, report the view as it stands (still loading)
        if let Ok(v) = tokio::time::timeout(state.config.scoring_timeout, settled).await {
            view = v;
        }
    }

    Ok(Json(ScoreResponse {
        input: state.orchestrator.current_input(),
        display: present(&view.state),
        lines: render_lines(&view),
        view,
    }))
}

/// GET /api/v1/trust-graph
pub async fn handle_get_trust_graph(
    State(state): State<AppState>,
) -> Result<Json<TrustGraphResponse>, AppError> {
    let graph = state
        .orchestrator
        .trust_graph()
        .ok_or_else(|| AppError::NotFound("No profile is currently submitted".to_string()))?;
    Ok(Json(TrustGraphResponse {
        summary: graph.summary(),
        graph,
    }))
}
