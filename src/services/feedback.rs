use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::error::AppResult;
use crate::models::{AudioFeatures, FeedbackEvent, FeedbackLabel, SkipReason};
use crate::services::providers::PreferenceModel;

/// Forwards play/skip observations to the model service without blocking
/// the caller.
///
/// Each call dispatches one send on a spawned task and returns the join
/// handle; callers may await it for the send result or drop it. Failures
/// are logged in-task either way and never affect playback flow.
#[derive(Clone)]
pub struct FeedbackRecorder {
    model: Arc<dyn PreferenceModel>,
}

impl FeedbackRecorder {
    pub fn new(model: Arc<dyn PreferenceModel>) -> Self {
        Self { model }
    }

    pub fn record_skip(
        &self,
        features: AudioFeatures,
        reason: Option<SkipReason>,
    ) -> JoinHandle<AppResult<()>> {
        self.dispatch(FeedbackEvent {
            features,
            label: FeedbackLabel::Skipped,
            skip_reason: Some(reason.unwrap_or(SkipReason::Unspecified)),
        })
    }

    pub fn record_play(&self, features: AudioFeatures) -> JoinHandle<AppResult<()>> {
        self.dispatch(FeedbackEvent {
            features,
            label: FeedbackLabel::Played,
            skip_reason: None,
        })
    }

    fn dispatch(&self, event: FeedbackEvent) -> JoinHandle<AppResult<()>> {
        let model = self.model.clone();
        tokio::spawn(async move {
            let result = model.submit_feedback(&event).await;
            if let Err(e) = &result {
                tracing::warn!(
                    label = event.label.as_value(),
                    error = %e,
                    "Feedback send failed"
                );
            }
            result
        })
    }
}
