// src/api.rs
//! Thin HTTP operator surface over the triage engine. Rendering stays with
//! the caller; every route returns plain JSON.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;

use crate::analyze::AnalysisResult;
use crate::commit::{CommittedRecord, MemorySink};
use crate::engine::{BulkReport, ProcessError, TriageEngine};
use crate::highlight::{segment, Segment};
use crate::inbox::types::{MailId, MailPlatform, MailSource};
use crate::inbox::AdmitOutcome;
use crate::store::ProcessingState;

#[derive(Clone)]
pub struct AppState {
    engine: Arc<Mutex<TriageEngine>>,
    archive: Arc<MemorySink>,
    source: Arc<dyn MailSource>,
}

impl AppState {
    pub fn new(engine: TriageEngine, archive: Arc<MemorySink>, source: Arc<dyn MailSource>) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
            archive,
            source,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/highlight", post(highlight))
        .route("/fetch", post(fetch))
        .route("/inbox", get(inbox))
        .route("/focus/{id}", post(focus))
        .route("/process/{id}", post(process))
        .route("/draft/{id}", put(set_draft))
        .route("/commit/{id}", post(commit))
        .route("/bulk-commit", post(bulk_commit))
        .route("/archive", get(archive))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

fn error_response(err: ProcessError) -> (StatusCode, String) {
    let status = match &err {
        ProcessError::UnknownMail(_) => StatusCode::NOT_FOUND,
        ProcessError::AlreadyProcessing(_) => StatusCode::CONFLICT,
        ProcessError::Analysis(_) => StatusCode::BAD_GATEWAY,
    };
    (status, err.to_string())
}

#[derive(serde::Deserialize)]
struct HighlightReq {
    text: String,
    sender_name: String,
}

async fn highlight(Json(body): Json<HighlightReq>) -> Json<Vec<Segment>> {
    Json(segment(&body.text, &body.sender_name))
}

async fn fetch(State(state): State<AppState>) -> Result<Json<AdmitOutcome>, (StatusCode, String)> {
    let mut engine = state.engine.lock().await;
    engine
        .fetch_new(state.source.as_ref())
        .await
        .map(Json)
        .map_err(|e| (StatusCode::BAD_GATEWAY, e.to_string()))
}

#[derive(serde::Serialize)]
struct InboxRow {
    id: MailId,
    sender: String,
    sender_name: String,
    subject: String,
    received_at: DateTime<Utc>,
    platform: MailPlatform,
    state: ProcessingState,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<AnalysisResult>,
}

async fn inbox(State(state): State<AppState>) -> Json<Vec<InboxRow>> {
    let engine = state.engine.lock().await;
    let rows = engine
        .inbox()
        .iter()
        .map(|m| InboxRow {
            id: m.id.clone(),
            sender: m.sender.clone(),
            sender_name: m.sender_name.clone(),
            subject: m.subject.clone(),
            received_at: m.received_at,
            platform: m.platform,
            state: engine.store().state(&m.id),
            error: engine.store().error(&m.id).map(str::to_string),
            result: engine.store().result(&m.id).cloned(),
        })
        .collect();
    Json(rows)
}

#[derive(serde::Serialize)]
struct FocusResp {
    state: ProcessingState,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<AnalysisResult>,
}

async fn focus(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<FocusResp>, (StatusCode, String)> {
    let id: MailId = id.as_str().into();
    let mut engine = state.engine.lock().await;
    let result = engine.focus(&id).await.map_err(error_response)?;
    Ok(Json(FocusResp {
        state: engine.store().state(&id),
        result,
    }))
}

async fn process(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AnalysisResult>, (StatusCode, String)> {
    let id: MailId = id.as_str().into();
    let mut engine = state.engine.lock().await;
    engine
        .process(&id)
        .await
        .map(Json)
        .map_err(error_response)
}

#[derive(serde::Deserialize)]
struct DraftReq {
    draft: String,
}

async fn set_draft(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<DraftReq>,
) -> StatusCode {
    let id: MailId = id.as_str().into();
    let mut engine = state.engine.lock().await;
    engine.set_draft(&id, body.draft);
    StatusCode::NO_CONTENT
}

#[derive(serde::Serialize)]
struct CommitResp {
    committed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    entry_id: Option<uuid::Uuid>,
}

async fn commit(State(state): State<AppState>, Path(id): Path<String>) -> Json<CommitResp> {
    let id: MailId = id.as_str().into();
    let mut engine = state.engine.lock().await;
    let entry_id = engine.commit(&id);
    Json(CommitResp {
        committed: entry_id.is_some(),
        entry_id,
    })
}

#[derive(serde::Deserialize)]
struct BulkReq {
    ids: Vec<MailId>,
}

async fn bulk_commit(
    State(state): State<AppState>,
    Json(body): Json<BulkReq>,
) -> Json<BulkReport> {
    let mut engine = state.engine.lock().await;
    Json(engine.bulk_commit(&body.ids).await)
}

async fn archive(State(state): State<AppState>) -> Json<Vec<CommittedRecord>> {
    Json(state.archive.snapshot())
}
