use axum::{extract::State, routing::post, Json, Router};
use trava_jobs::RetryOutcome;

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/admin/failed-checks/retry", post(retry_failed_checks))
}

/// POST /v1/admin/failed-checks/retry
/// Run one retry pass over all failed availability checks.
async fn retry_failed_checks(State(state): State<AppState>) -> Json<RetryOutcome> {
    let outcome = state.supervisor.retry_all_failed().await;
    Json(outcome)
}
