/// HTTP client for the preference-model service
///
/// The model is an opaque oracle: features in, probability + rationale out.
/// Its wire contract is snake_case JSON; the `reason` field maps to the
/// domain `rationale`.
use std::time::Duration;

use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};

use crate::{
    error::AppResult,
    models::{AudioFeatures, FeedbackEvent, Prediction, SkipReason},
    services::providers::{ensure_success, with_retries, PreferenceModel},
};

pub struct ModelServiceClient {
    http_client: HttpClient,
    api_url: String,
}

impl ModelServiceClient {
    pub fn new(api_url: String, timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            api_url,
        })
    }
}

#[async_trait::async_trait]
impl PreferenceModel for ModelServiceClient {
    async fn predict(&self, features: &AudioFeatures) -> AppResult<Prediction> {
        let url = format!("{}/predict", self.api_url);
        let url = url.as_str();
        let client = &self.http_client;
        let request = PredictRequest {
            track_features: features,
        };
        let request = &request;

        let response: PredictResponse =
            with_retries("preference prediction", move || async move {
                let response = client.post(url).json(request).send().await?;
                let response = ensure_success(response, "Model service").await?;
                Ok(response.json().await?)
            })
            .await?;

        tracing::debug!(
            probability = response.probability,
            "Preference prediction received"
        );

        Ok(Prediction {
            probability: response.probability,
            rationale: response.reason,
        })
    }

    async fn submit_feedback(&self, event: &FeedbackEvent) -> AppResult<()> {
        // Sent once: a retry would duplicate the training observation
        let url = format!("{}/add_feedback", self.api_url);
        let request = FeedbackRequest {
            track_features: &event.features,
            feedback: event.label.as_value(),
            skip_reason: event.skip_reason,
        };

        let response = self.http_client.post(&url).json(&request).send().await?;
        ensure_success(response, "Model service").await?;

        tracing::debug!(label = event.label.as_value(), "Feedback submitted");

        Ok(())
    }

    async fn train(&self) -> AppResult<()> {
        let url = format!("{}/train", self.api_url);

        let response = self.http_client.post(&url).send().await?;
        ensure_success(response, "Model service").await?;

        tracing::info!("Model training triggered");

        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    track_features: &'a AudioFeatures,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    probability: f64,
    #[serde(default)]
    reason: String,
}

#[derive(Debug, Serialize)]
struct FeedbackRequest<'a> {
    track_features: &'a AudioFeatures,
    feedback: u8,
    skip_reason: Option<SkipReason>,
}
