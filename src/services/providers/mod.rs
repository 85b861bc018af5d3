use std::future::Future;
use std::time::Duration;

/// External capability abstractions
///
/// The catalog and the preference model are consumed services. Each is a
/// trait seam so the pipeline can be exercised against mocks and stubs
/// without network access.
use crate::{
    error::{AppError, AppResult},
    models::{AudioFeatures, FeedbackEvent, Prediction, TrackCandidate},
};

pub mod catalog;
pub mod model;

const MAX_ATTEMPTS: u32 = 3;
const BASE_BACKOFF: Duration = Duration::from_millis(200);

/// Track catalog and playback queue capability
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Catalog: Send + Sync {
    /// List the candidate track pool, up to `limit` tracks
    async fn list_candidates(&self, limit: usize) -> AppResult<Vec<TrackCandidate>>;

    /// Fetch the audio feature vector for one track
    async fn audio_features(&self, track_id: &str) -> AppResult<AudioFeatures>;

    /// Append a track to the listener's playback queue
    async fn enqueue(&self, track_id: &str) -> AppResult<()>;
}

/// Preference-model capability: an opaque scoring oracle plus its feedback
/// and training entry points
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PreferenceModel: Send + Sync {
    /// Preference probability in [0, 1] with a human-readable rationale
    async fn predict(&self, features: &AudioFeatures) -> AppResult<Prediction>;

    /// Forward one play/skip observation
    async fn submit_feedback(&self, event: &FeedbackEvent) -> AppResult<()>;

    /// Trigger a training pass over accumulated feedback
    async fn train(&self) -> AppResult<()>;
}

/// Runs an idempotent external call with bounded retries and exponential
/// backoff. Non-idempotent calls (queue append, feedback submission) are
/// sent once and must not go through here.
pub(crate) async fn with_retries<T, F, Fut>(operation: &'static str, mut call: F) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match call().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < MAX_ATTEMPTS => {
                let backoff = BASE_BACKOFF * 2u32.pow(attempt - 1);
                tracing::warn!(
                    operation,
                    attempt,
                    backoff_ms = backoff.as_millis() as u64,
                    error = %e,
                    "External call failed, retrying"
                );
                tokio::time::sleep(backoff).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Maps a non-success HTTP response to an external-API error carrying the
/// status and body
pub(crate) async fn ensure_success(
    response: reqwest::Response,
    context: &str,
) -> AppResult<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(AppError::ExternalApi(format!(
        "{} returned status {}: {}",
        context, status, body
    )))
}
