use axum::extract::multipart::{Field, MultipartError, MultipartRejection};
use axum::extract::{Multipart, Path, State};
use axum::{Extension, Json};
use docsearch_core::{rank, CorpusStats, DocSummary, RankedDoc, Strategy, TrainOutcome};
use serde::Serialize;
use std::sync::Arc;

use crate::error::{ApiError, DOCS_MISSING_ERROR, READING_ERROR, TEXT_MISSING_ERROR};
use crate::{AppState, RequestId};

/// Multipart field carrying uploaded documents.
pub const DOCS_FIELD: &str = "docs";

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum TrainEntry {
    Outcome { doc_id: i64, doc_name: String, result: &'static str },
    ReadFailure { doc_name: String, error: &'static str },
}

impl From<TrainOutcome> for TrainEntry {
    fn from(outcome: TrainOutcome) -> Self {
        TrainEntry::Outcome {
            // -1 marks a document that was not indexed.
            doc_id: outcome.doc_id.and_then(|id| i64::try_from(id).ok()).unwrap_or(-1),
            doc_name: outcome.doc_name,
            result: outcome.status.message(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TrainResponse {
    pub result: Vec<TrainEntry>,
    pub req_id: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub result: Vec<RankedDoc>,
    pub req_id: String,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: CorpusStats,
    pub strategy: Strategy,
}

/// Run a corpus operation on the blocking pool so lock waits never stall async workers.
async fn run_blocking<T, F>(request_id: &RequestId, f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|err| ApiError::internal(request_id, err))
}

/// Read one uploaded document. `Ok(None)` when it exceeds `limit`; the rest of
/// the field is still drained so the next part can be read.
async fn read_document(mut field: Field<'_>, limit: usize) -> Result<Option<Vec<u8>>, MultipartError> {
    let mut content = Vec::new();
    let mut oversize = false;
    while let Some(chunk) = field.chunk().await? {
        if oversize {
            continue;
        }
        if content.len() + chunk.len() > limit {
            oversize = true;
            content = Vec::new();
            continue;
        }
        content.extend_from_slice(&chunk);
    }
    Ok(if oversize { None } else { Some(content) })
}

/// `POST /v1/train`
pub async fn train(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<TrainResponse>, ApiError> {
    tracing::info!("got a request to train documents");
    let mut multipart = multipart.map_err(|err| ApiError::internal(&request_id, err))?;

    // `None` slots are filled from the corpus outcomes, in upload order.
    let mut slots: Vec<Option<TrainEntry>> = Vec::new();
    let mut batch: Vec<(String, Vec<u8>)> = Vec::new();
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            // Nothing read yet means the body itself is unusable.
            Err(err) if slots.is_empty() => return Err(ApiError::internal(&request_id, err)),
            Err(err) => {
                tracing::warn!(error = %err, "upload stream ended early, keeping documents read so far");
                break;
            }
        };
        if field.name() != Some(DOCS_FIELD) {
            continue;
        }
        let doc_name = field.file_name().unwrap_or_default().to_string();
        match read_document(field, state.max_document_bytes).await {
            Ok(Some(content)) => {
                batch.push((doc_name, content));
                slots.push(None);
            }
            Ok(None) => {
                tracing::warn!(doc_name = %doc_name, limit = state.max_document_bytes, "uploaded document too large");
                slots.push(Some(TrainEntry::ReadFailure { doc_name, error: READING_ERROR }));
            }
            Err(err) => {
                // The stream cannot be resumed after a broken part.
                tracing::warn!(doc_name = %doc_name, error = %err, "error reading uploaded document");
                slots.push(Some(TrainEntry::ReadFailure { doc_name, error: READING_ERROR }));
                break;
            }
        }
    }
    if slots.is_empty() {
        return Err(ApiError::bad_request(&request_id, DOCS_MISSING_ERROR));
    }

    let corpus = Arc::clone(&state.corpus);
    let outcomes = run_blocking(&request_id, move || corpus.train(batch)).await?;

    let mut outcomes = outcomes.into_iter().map(TrainEntry::from);
    let result = slots
        .into_iter()
        .filter_map(|slot| slot.or_else(|| outcomes.next()))
        .collect();
    Ok(Json(TrainResponse { result, req_id: request_id.0 }))
}

/// `GET /v1/search/:text`
pub async fn search(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(text): Path<String>,
) -> Result<Json<SearchResponse>, ApiError> {
    tracing::info!("got a request to search documents");
    let text = text.trim().to_string();
    if text.is_empty() {
        return Err(ApiError::bad_request(&request_id, TEXT_MISSING_ERROR));
    }
    let corpus = Arc::clone(&state.corpus);
    let strategy = state.strategy;
    let result = run_blocking(&request_id, move || rank(&corpus, &text, strategy)).await?;
    Ok(Json(SearchResponse { result, req_id: request_id.0 }))
}

/// `GET /v1/docs/:doc_id`
pub async fn document(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(doc_id): Path<u64>,
) -> Result<Json<DocSummary>, ApiError> {
    let corpus = Arc::clone(&state.corpus);
    run_blocking(&request_id, move || corpus.document(doc_id))
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(&request_id, format!("document {doc_id} not found.")))
}

/// `GET /v1/stats`
pub async fn stats(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> Result<Json<StatsResponse>, ApiError> {
    let corpus = Arc::clone(&state.corpus);
    let stats = run_blocking(&request_id, move || corpus.stats()).await?;
    Ok(Json(StatsResponse { stats, strategy: state.strategy }))
}
