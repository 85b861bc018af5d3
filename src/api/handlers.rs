use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::AppResult;
use crate::models::{
    AudioFeatures, Prediction, PreferenceConfig, PreferenceUpdate, QueueRunOutcome, SkipReason,
    TrackCandidate,
};
use crate::services::pipeline;

use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkipRequest {
    pub track_features: AudioFeatures,
    pub skip_reason: Option<SkipReason>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayedRequest {
    pub track_features: AudioFeatures,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictRequest {
    pub track_features: AudioFeatures,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackSummary {
    pub id: String,
    pub name: String,
    pub artist: String,
}

impl From<&TrackCandidate> for TrackSummary {
    fn from(track: &TrackCandidate) -> Self {
        Self {
            id: track.id.clone(),
            name: track.name.clone(),
            artist: track.primary_artist.clone(),
        }
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueueOutcomeKind {
    Ok,
    NoCandidates,
    CommitFailed,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicQueueResponse {
    pub outcome: QueueOutcomeKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_track: Option<TrackSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,
    /// Whether the selection reached the playback queue; a false value with
    /// a present track means the commit can be retried as-is
    pub committed: bool,
}

impl From<QueueRunOutcome> for DynamicQueueResponse {
    fn from(outcome: QueueRunOutcome) -> Self {
        match outcome {
            QueueRunOutcome::Queued(selection) => Self {
                outcome: QueueOutcomeKind::Ok,
                message: "Queue updated".to_string(),
                next_track: Some(TrackSummary::from(&selection.track)),
                rationale: Some(selection.rationale),
                probability: Some(selection.probability),
                committed: true,
            },
            QueueRunOutcome::CommitFailed { selection, error } => Self {
                outcome: QueueOutcomeKind::CommitFailed,
                message: format!("Selection made but queue commit failed: {}", error),
                next_track: Some(TrackSummary::from(&selection.track)),
                rationale: Some(selection.rationale),
                probability: Some(selection.probability),
                committed: false,
            },
            QueueRunOutcome::NoCandidates(stage) => Self {
                outcome: QueueOutcomeKind::NoCandidates,
                message: stage.reason().to_string(),
                next_track: None,
                rationale: None,
                probability: None,
                committed: false,
            },
        }
    }
}

// Handlers

/// Run the recommendation pipeline and enqueue the best match
pub async fn dynamic_queue(
    State(state): State<AppState>,
) -> AppResult<Json<DynamicQueueResponse>> {
    // One consistent snapshot for the whole run
    let prefs = state.preferences.get().await;

    let outcome = pipeline::run_dynamic_queue(
        state.catalog.clone(),
        state.model.clone(),
        prefs,
        state.pipeline,
    )
    .await?;

    Ok(Json(DynamicQueueResponse::from(outcome)))
}

/// Get the current preference configuration
pub async fn get_preferences(State(state): State<AppState>) -> Json<PreferenceConfig> {
    Json(state.preferences.get().await)
}

/// Apply a partial preference update and return the merged configuration
pub async fn update_preferences(
    State(state): State<AppState>,
    Json(update): Json<PreferenceUpdate>,
) -> AppResult<Json<PreferenceConfig>> {
    let config = state.preferences.update(update).await?;
    Ok(Json(config))
}

/// Record a skip; the send to the model service happens off the request path
pub async fn skip(
    State(state): State<AppState>,
    Json(request): Json<SkipRequest>,
) -> (StatusCode, Json<Value>) {
    let _ = state
        .feedback
        .record_skip(request.track_features, request.skip_reason);
    (StatusCode::ACCEPTED, Json(json!({ "status": "skip recorded" })))
}

/// Record a full play
pub async fn played(
    State(state): State<AppState>,
    Json(request): Json<PlayedRequest>,
) -> (StatusCode, Json<Value>) {
    let _ = state.feedback.record_play(request.track_features);
    (StatusCode::ACCEPTED, Json(json!({ "status": "play recorded" })))
}

/// Score one feature vector against the preference model
pub async fn predict(
    State(state): State<AppState>,
    Json(request): Json<PredictRequest>,
) -> AppResult<Json<Prediction>> {
    let prediction = state.model.predict(&request.track_features).await?;
    Ok(Json(prediction))
}

/// Trigger a model training pass
pub async fn train(State(state): State<AppState>) -> AppResult<Json<Value>> {
    state.model.train().await?;
    Ok(Json(json!({ "status": "trained" })))
}

/// Manually append one track to the playback queue
pub async fn enqueue_track(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    state.catalog.enqueue(&id).await?;
    Ok(Json(json!({ "status": "queued", "id": id })))
}

/// List the raw candidate pool, unfiltered
pub async fn list_candidates(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<TrackCandidate>>> {
    let candidates = state
        .catalog
        .list_candidates(state.pipeline.candidate_limit)
        .await?;
    Ok(Json(candidates))
}
