use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use futures_util::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tokio_stream::wrappers::BroadcastStream;
use uuid::Uuid;

use trava_core::batch::BatchStatus;
use trava_core::package::Package;
use trava_core::search::PackageSearchRequest;
use trava_jobs::StartBatchError;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/packages/search", post(start_search))
        .route("/v1/packages/search/{batch_id}", get(get_search))
        .route("/v1/packages/search/{batch_id}/live", get(live_search))
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_per_page")]
    pub per_page: usize,
}

fn default_page() -> usize {
    1
}

fn default_per_page() -> usize {
    20
}

#[derive(Debug, Serialize)]
pub struct StartSearchResponse {
    pub batch_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct SearchStatusResponse {
    pub batch_id: Uuid,
    pub status: BatchStatus,
    pub tasks_pending: usize,
    pub tasks_succeeded: usize,
    pub tasks_failed: usize,
    pub packages: Vec<Package>,
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/packages/search
/// Validate the request and start an availability batch for it.
async fn start_search(
    State(state): State<AppState>,
    Json(request): Json<PackageSearchRequest>,
) -> Result<impl IntoResponse, AppError> {
    let batch_id = state
        .orchestrator
        .start_batch(request)
        .await
        .map_err(|e| match e {
            StartBatchError::Validation(v) => AppError::Validation(v.to_string()),
            StartBatchError::Storage(e) => AppError::Internal(e.to_string()),
        })?;

    Ok((StatusCode::ACCEPTED, Json(StartSearchResponse { batch_id })))
}

/// GET /v1/packages/search/{batch_id}
/// Poll-style read-back: batch status plus one page of packages.
async fn get_search(
    State(state): State<AppState>,
    Path(batch_id): Path<Uuid>,
    Query(query): Query<PageQuery>,
) -> Result<Json<SearchStatusResponse>, AppError> {
    let batch = state
        .batches
        .get_batch(batch_id)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .ok_or_else(|| AppError::NotFound(format!("search {batch_id} not found")))?;

    let page = state
        .aggregator
        .results_page(batch_id, query.page, query.per_page)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let (tasks_pending, tasks_succeeded, tasks_failed) = batch.counts();
    Ok(Json(SearchStatusResponse {
        batch_id,
        status: batch.status,
        tasks_pending,
        tasks_succeeded,
        tasks_failed,
        packages: page.packages,
        total: page.total,
        page: page.page,
        per_page: page.per_page,
    }))
}

/// GET /v1/packages/search/{batch_id}/live
/// SSE stream of the batch's live events for subscribing clients.
async fn live_search(
    State(state): State<AppState>,
    Path(batch_id): Path<Uuid>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let rx = state.sse_tx.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(move |event| {
        futures_util::future::ready(match event {
            Ok(event) if event.batch_id() == batch_id => {
                Some(Event::default().event(event.name()).json_data(&event))
            }
            _ => None,
        })
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
