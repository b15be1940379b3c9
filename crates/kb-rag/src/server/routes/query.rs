//! Query and search endpoints

use axum::{extract::State, Json};
use std::time::Instant;

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::{QueryRequest, QueryResponse, SearchRequest, SearchResponse};

/// POST /api/query - Answer a question
///
/// Always 200: failures come back as a readable answer.
pub async fn query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Json<QueryResponse> {
    Json(state.qa().ask(&request.question).await)
}

/// POST /api/search - Ranked chunks without answer generation
pub async fn search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>> {
    let start = Instant::now();

    let results = state.qa().search(&request.question, request.top_k).await?;
    let processing_time_ms = start.elapsed().as_millis() as u64;

    tracing::info!(
        "Search completed in {}ms, {} results",
        processing_time_ms,
        results.len()
    );

    Ok(Json(SearchResponse {
        results,
        processing_time_ms,
    }))
}
