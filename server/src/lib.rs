use axum::extract::{DefaultBodyLimit, Request};
use axum::http::{HeaderName, HeaderValue};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{routing::{get, post}, Router};
use docsearch_core::{Corpus, Strategy};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::Instrument;

pub mod error;
pub mod handlers;

/// Correlation id attached to every request and echoed in error bodies.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Largest single uploaded document accepted by `/v1/train`.
pub const DEFAULT_MAX_DOCUMENT_BYTES: usize = 16 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub corpus: Arc<Corpus>,
    pub strategy: Strategy,
    /// Per-document cap; larger uploads are reported as read failures.
    pub max_document_bytes: usize,
}

impl AppState {
    pub fn new(corpus: Corpus, strategy: Strategy) -> Self {
        Self { corpus: Arc::new(corpus), strategy, max_document_bytes: DEFAULT_MAX_DOCUMENT_BYTES }
    }

    pub fn with_max_document_bytes(mut self, max_document_bytes: usize) -> Self {
        self.max_document_bytes = max_document_bytes;
        self
    }
}

pub fn build_app(state: AppState) -> Router {
    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        // Size is enforced per document inside the handler instead.
        .route("/v1/train", post(handlers::train).layer(DefaultBodyLimit::disable()))
        .route("/v1/search/:text", get(handlers::search))
        .route("/v1/docs/:doc_id", get(handlers::document))
        .route("/v1/stats", get(handlers::stats))
        .with_state(state)
        .layer(middleware::from_fn(request_id))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

async fn request_id(mut req: Request, next: Next) -> Response {
    let id = uuid::Uuid::new_v4().to_string();
    req.extensions_mut().insert(RequestId(id.clone()));
    let span = tracing::info_span!("request", request_id = %id);
    async move {
        let mut response = next.run(req).await;
        if let Ok(value) = HeaderValue::from_str(&id) {
            response.headers_mut().insert(HeaderName::from_static("x-request-id"), value);
        }
        response
    }
    .instrument(span)
    .await
}
