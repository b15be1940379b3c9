//! API routes for the knowledge-base server

pub mod query;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/query", post(query::query))
        .route("/search", post(query::search))
        .route("/info", get(info))
}

/// API info endpoint
async fn info(State(state): State<AppState>) -> Json<serde_json::Value> {
    let kb = state.knowledge_base();
    let config = state.config();
    let llm = state.qa().llm();

    Json(serde_json::json!({
        "name": "kb-rag",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Question answering grounded in a fixed document set",
        "knowledge_base": {
            "chunks": kb.len(),
            "dimensions": kb.dimensions(),
            "sources": kb.report(),
        },
        "models": {
            "embedding": config.embeddings.model,
            "llm": llm.model(),
            "llm_provider": llm.name(),
        },
        "retrieval": {
            "top_k": state.qa().top_k(),
            "chunk_size": config.chunking.chunk_size,
        },
        "endpoints": {
            "GET /health": "Liveness check",
            "GET /api/info": "Corpus and model information",
            "POST /api/query": "Answer a question from the documents",
            "POST /api/search": "Ranked chunks for a question, no generation"
        }
    }))
}
