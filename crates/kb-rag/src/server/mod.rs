//! HTTP server for the knowledge-base QA system

pub mod routes;
pub mod state;

use axum::{routing::get, Router};
use std::net::SocketAddr;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::KbConfig;
use crate::error::{Error, Result};
use crate::qa::QaService;
use state::AppState;

/// Knowledge-base HTTP server
pub struct KbServer {
    config: KbConfig,
    state: AppState,
}

impl KbServer {
    /// Create a server answering through `qa`
    pub fn new(config: KbConfig, qa: QaService) -> Self {
        let state = AppState::new(config.clone(), qa);
        Self { config, state }
    }

    /// Build the router with all routes
    pub fn router(&self) -> Router {
        let router = Router::new()
            .route("/health", get(health_check))
            .nest("/api", routes::api_routes())
            .with_state(self.state.clone())
            // Applied bottom to top
            .layer(TraceLayer::new_for_http())
            .layer(CompressionLayer::new());

        if self.config.server.enable_cors {
            router.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            )
        } else {
            router
        }
    }

    /// Start the server
    pub async fn start(self) -> Result<()> {
        let addr: SocketAddr = self
            .address()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid address: {}", e)))?;

        let router = self.router();

        tracing::info!("Starting knowledge-base server on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| Error::Config(format!("Failed to bind: {}", e)))?;

        axum::serve(listener, router)
            .await
            .map_err(|e| Error::Internal(format!("Server error: {}", e)))?;

        Ok(())
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.server.host, self.config.server.port)
    }
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge_base::KnowledgeBase;
    use crate::providers::memory::{GroundedEchoLlm, HashingEmbedder};
    use crate::providers::EmbeddingProvider;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn server() -> KbServer {
        let embedder = Arc::new(HashingEmbedder::new(64));
        let chunks = vec![
            "The sky is blue.".to_string(),
            "Water boils at 100 degrees.".to_string(),
        ];
        let embeddings = embedder.embed_batch(&chunks).await.unwrap();
        let kb = Arc::new(KnowledgeBase::from_parts(chunks, embeddings).unwrap());
        let qa = QaService::new(kb, embedder, Arc::new(GroundedEchoLlm::new())).with_top_k(1);
        KbServer::new(KbConfig::default(), qa)
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = server()
            .await
            .router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_query_route_answers() {
        let response = server()
            .await
            .router()
            .oneshot(post_json(
                "/api/query",
                serde_json::json!({ "question": "What color is the sky?" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(
            body["answer"],
            "### Answer\n\nAccording to the documents: The sky is blue."
        );
        assert_eq!(body["chunks_retrieved"], 1);
    }

    #[tokio::test]
    async fn test_query_route_empty_question_is_still_ok() {
        let response = server()
            .await
            .router()
            .oneshot(post_json("/api/query", serde_json::json!({ "question": " " })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["answer"], crate::qa::EMPTY_QUESTION_MESSAGE);
    }

    #[tokio::test]
    async fn test_search_route() {
        let router = server().await.router();

        let response = router
            .clone()
            .oneshot(post_json(
                "/api/search",
                serde_json::json!({ "question": "water boils", "top_k": 2 }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["results"].as_array().unwrap().len(), 2);
        assert_eq!(body["results"][0]["position"], 1);

        let response = router
            .oneshot(post_json("/api/search", serde_json::json!({ "question": "" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["type"], "empty_query");
    }

    #[tokio::test]
    async fn test_info_route() {
        let response = server()
            .await
            .router()
            .oneshot(Request::get("/api/info").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["knowledge_base"]["chunks"], 2);
        assert_eq!(body["knowledge_base"]["dimensions"], 64);
        assert_eq!(body["retrieval"]["top_k"], 1);
    }
}
