use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::models::{AudioFeatures, PreferenceConfig, ScoredCandidate, TrackCandidate};
use crate::services::providers::{Catalog, PreferenceModel};

/// Fetches audio features and a model score for each candidate, with a cap
/// on in-flight external calls.
///
/// A failed feature fetch or prediction excludes that candidate; the rest of
/// the batch continues. Candidates whose energy or tempo fall outside the
/// preferred ranges are excluded silently, before any model call. Output
/// order matches input order regardless of task completion order.
pub async fn score_candidates(
    catalog: Arc<dyn Catalog>,
    model: Arc<dyn PreferenceModel>,
    prefs: &PreferenceConfig,
    candidates: Vec<TrackCandidate>,
    max_in_flight: usize,
) -> Vec<ScoredCandidate> {
    let semaphore = Arc::new(Semaphore::new(max_in_flight.max(1)));
    let mut tasks = Vec::with_capacity(candidates.len());

    for (index, track) in candidates.into_iter().enumerate() {
        let semaphore = semaphore.clone();
        let catalog = catalog.clone();
        let model = model.clone();
        let prefs = prefs.clone();

        tasks.push(tokio::spawn(async move {
            let _permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => return (index, None),
            };
            let scored = score_one(catalog.as_ref(), model.as_ref(), &prefs, track).await;
            (index, scored)
        }));
    }

    let mut scored = Vec::new();
    for task in tasks {
        match task.await {
            Ok((index, Some(candidate))) => scored.push((index, candidate)),
            Ok((_, None)) => {}
            Err(e) => {
                tracing::error!(error = %e, "Scoring task join error");
            }
        }
    }

    // Completion order is non-deterministic; re-associate by candidate index
    scored.sort_by_key(|(index, _)| *index);
    scored.into_iter().map(|(_, candidate)| candidate).collect()
}

async fn score_one(
    catalog: &dyn Catalog,
    model: &dyn PreferenceModel,
    prefs: &PreferenceConfig,
    track: TrackCandidate,
) -> Option<ScoredCandidate> {
    let features = match catalog.audio_features(&track.id).await {
        Ok(features) => features,
        Err(e) => {
            tracing::warn!(
                track_id = %track.id,
                error = %e,
                "Audio feature fetch failed, excluding candidate"
            );
            return None;
        }
    };

    if !within_feature_ranges(&features, prefs) {
        tracing::debug!(
            track_id = %track.id,
            energy = features.energy,
            tempo = features.tempo,
            "Candidate outside preferred feature ranges"
        );
        return None;
    }

    match model.predict(&features).await {
        Ok(prediction) => Some(ScoredCandidate {
            track,
            features,
            probability: prediction.probability,
            rationale: prediction.rationale,
        }),
        Err(e) => {
            tracing::warn!(
                track_id = %track.id,
                error = %e,
                "Preference prediction failed, excluding candidate"
            );
            None
        }
    }
}

fn within_feature_ranges(features: &AudioFeatures, prefs: &PreferenceConfig) -> bool {
    prefs.energy_range.contains(features.energy) && prefs.tempo_range.contains(features.tempo)
}
