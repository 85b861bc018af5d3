use std::sync::Arc;
use std::time::Instant;

use crate::error::AppResult;
use crate::models::{
    EmptyStage, PreferenceConfig, QueueRunOutcome, ScoredCandidate, Selection,
};
use crate::services::providers::{Catalog, PreferenceModel};
use crate::services::{filter, scorer};

/// Tuning knobs for one dynamic-queue run
#[derive(Debug, Clone, Copy)]
pub struct PipelineSettings {
    pub candidate_limit: usize,
    pub scoring_concurrency: usize,
}

/// Runs one dynamic-queue pass: list candidates, filter on preferences,
/// score the survivors, pick the winner, commit it to the playback queue.
///
/// The caller supplies a preference snapshot taken at entry; the run never
/// re-reads the store. Empty stages short-circuit with no further external
/// calls. A commit failure still returns the computed selection so the
/// caller can retry without rescoring. Only a candidate-listing failure is
/// an error.
pub async fn run_dynamic_queue(
    catalog: Arc<dyn Catalog>,
    model: Arc<dyn PreferenceModel>,
    prefs: PreferenceConfig,
    settings: PipelineSettings,
) -> AppResult<QueueRunOutcome> {
    let start = Instant::now();

    let candidates = catalog.list_candidates(settings.candidate_limit).await?;
    if candidates.is_empty() {
        tracing::info!("Dynamic queue run ended: {}", EmptyStage::Catalog.reason());
        return Ok(QueueRunOutcome::NoCandidates(EmptyStage::Catalog));
    }

    let filtered = filter::filter_candidates(candidates, &prefs);
    tracing::info!(surviving = filtered.len(), "Preference filter applied");
    if filtered.is_empty() {
        return Ok(QueueRunOutcome::NoCandidates(EmptyStage::PreferenceFilter));
    }

    let scored = scorer::score_candidates(
        catalog.clone(),
        model,
        &prefs,
        filtered,
        settings.scoring_concurrency,
    )
    .await;
    tracing::info!(scored = scored.len(), "Candidates scored");

    let selection = match select_best(&scored) {
        Some(winner) => Selection::from(winner.clone()),
        None => return Ok(QueueRunOutcome::NoCandidates(EmptyStage::FeatureScoring)),
    };

    tracing::info!(
        track_id = %selection.track.id,
        probability = selection.probability,
        processing_time_ms = start.elapsed().as_millis() as u64,
        "Selection computed"
    );

    match catalog.enqueue(&selection.track.id).await {
        Ok(()) => Ok(QueueRunOutcome::Queued(selection)),
        Err(e) => {
            tracing::error!(
                track_id = %selection.track.id,
                error = %e,
                "Queue commit failed"
            );
            Ok(QueueRunOutcome::CommitFailed {
                selection,
                error: e.to_string(),
            })
        }
    }
}

/// Highest probability wins; ties go to the earliest candidate in the
/// original pool order.
fn select_best(scored: &[ScoredCandidate]) -> Option<&ScoredCandidate> {
    scored.iter().reduce(|best, candidate| {
        if candidate.probability > best.probability {
            candidate
        } else {
            best
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::{AudioFeatures, PrefRange, Prediction, TrackCandidate};
    use crate::services::providers::{MockCatalog, MockPreferenceModel};

    fn candidate(id: &str, artist: &str) -> TrackCandidate {
        TrackCandidate {
            id: id.to_string(),
            name: format!("Track {}", id),
            primary_artist: artist.to_string(),
            explicit: false,
            release_year: Some(2015),
            popularity: 40,
        }
    }

    fn scored(id: &str, probability: f64) -> ScoredCandidate {
        ScoredCandidate {
            track: candidate(id, "Artist"),
            features: AudioFeatures::default(),
            probability,
            rationale: "fits".to_string(),
        }
    }

    fn settings() -> PipelineSettings {
        PipelineSettings {
            candidate_limit: 20,
            scoring_concurrency: 4,
        }
    }

    #[test]
    fn test_select_best_picks_max_probability() {
        let candidates = vec![scored("t1", 0.2), scored("t2", 0.9), scored("t3", 0.5)];
        assert_eq!(select_best(&candidates).unwrap().track.id, "t2");
    }

    #[test]
    fn test_select_best_tie_break_keeps_first_occurrence() {
        let candidates = vec![scored("t1", 0.4), scored("t2", 0.9), scored("t3", 0.9)];
        assert_eq!(select_best(&candidates).unwrap().track.id, "t2");
    }

    #[test]
    fn test_select_best_is_deterministic() {
        let candidates = vec![scored("t1", 0.7), scored("t2", 0.7), scored("t3", 0.1)];
        let first = select_best(&candidates).unwrap().track.id.clone();
        for _ in 0..10 {
            assert_eq!(select_best(&candidates).unwrap().track.id, first);
        }
    }

    #[test]
    fn test_select_best_empty_is_none() {
        assert!(select_best(&[]).is_none());
    }

    #[tokio::test]
    async fn test_empty_catalog_short_circuits_without_scoring() {
        let mut catalog = MockCatalog::new();
        catalog.expect_list_candidates().returning(|_| Ok(vec![]));
        catalog.expect_audio_features().times(0);
        catalog.expect_enqueue().times(0);

        let mut model = MockPreferenceModel::new();
        model.expect_predict().times(0);

        let outcome = run_dynamic_queue(
            Arc::new(catalog),
            Arc::new(model),
            PreferenceConfig::default(),
            settings(),
        )
        .await
        .unwrap();

        assert_eq!(outcome, QueueRunOutcome::NoCandidates(EmptyStage::Catalog));
    }

    #[tokio::test]
    async fn test_all_filtered_short_circuits_without_feature_fetches() {
        let mut catalog = MockCatalog::new();
        catalog
            .expect_list_candidates()
            .returning(|_| Ok(vec![candidate("t1", "Blocked")]));
        catalog.expect_audio_features().times(0);
        catalog.expect_enqueue().times(0);

        let mut model = MockPreferenceModel::new();
        model.expect_predict().times(0);

        let prefs = PreferenceConfig {
            block_artists: ["Blocked".to_string()].into_iter().collect(),
            ..Default::default()
        };

        let outcome = run_dynamic_queue(Arc::new(catalog), Arc::new(model), prefs, settings())
            .await
            .unwrap();

        assert_eq!(
            outcome,
            QueueRunOutcome::NoCandidates(EmptyStage::PreferenceFilter)
        );
    }

    #[tokio::test]
    async fn test_nothing_survives_scoring() {
        let mut catalog = MockCatalog::new();
        catalog
            .expect_list_candidates()
            .returning(|_| Ok(vec![candidate("t1", "A")]));
        catalog.expect_audio_features().returning(|_| {
            Ok(AudioFeatures {
                energy: 0.9,
                tempo: 120.0,
                ..Default::default()
            })
        });
        catalog.expect_enqueue().times(0);

        let mut model = MockPreferenceModel::new();
        model.expect_predict().times(0);

        let prefs = PreferenceConfig {
            energy_range: PrefRange(0.0, 0.5),
            ..Default::default()
        };

        let outcome = run_dynamic_queue(Arc::new(catalog), Arc::new(model), prefs, settings())
            .await
            .unwrap();

        assert_eq!(
            outcome,
            QueueRunOutcome::NoCandidates(EmptyStage::FeatureScoring)
        );
    }

    #[tokio::test]
    async fn test_happy_path_commits_winner() {
        let mut catalog = MockCatalog::new();
        catalog
            .expect_list_candidates()
            .returning(|_| Ok(vec![candidate("t1", "A"), candidate("t2", "B")]));
        catalog.expect_audio_features().withf(|id| id == "t1").returning(|_| {
            Ok(AudioFeatures {
                energy: 0.3,
                tempo: 100.0,
                ..Default::default()
            })
        });
        catalog.expect_audio_features().withf(|id| id == "t2").returning(|_| {
            Ok(AudioFeatures {
                energy: 0.6,
                tempo: 130.0,
                ..Default::default()
            })
        });
        catalog
            .expect_enqueue()
            .withf(|id| id == "t2")
            .times(1)
            .returning(|_| Ok(()));

        let mut model = MockPreferenceModel::new();
        model
            .expect_predict()
            .withf(|f| f.energy == 0.3)
            .returning(|_| {
                Ok(Prediction {
                    probability: 0.4,
                    rationale: "meh".to_string(),
                })
            });
        model
            .expect_predict()
            .withf(|f| f.energy == 0.6)
            .returning(|_| {
                Ok(Prediction {
                    probability: 0.9,
                    rationale: "Because it fits your listening profile.".to_string(),
                })
            });

        let outcome = run_dynamic_queue(
            Arc::new(catalog),
            Arc::new(model),
            PreferenceConfig::default(),
            settings(),
        )
        .await
        .unwrap();

        match outcome {
            QueueRunOutcome::Queued(selection) => {
                assert_eq!(selection.track.id, "t2");
                assert_eq!(selection.probability, 0.9);
                assert_eq!(
                    selection.rationale,
                    "Because it fits your listening profile."
                );
            }
            other => panic!("expected Queued, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_commit_failure_keeps_selection_for_retry() {
        let mut catalog = MockCatalog::new();
        catalog
            .expect_list_candidates()
            .returning(|_| Ok(vec![candidate("t1", "A")]));
        catalog.expect_audio_features().returning(|_| {
            Ok(AudioFeatures {
                energy: 0.5,
                tempo: 120.0,
                ..Default::default()
            })
        });
        catalog
            .expect_enqueue()
            .returning(|_| Err(AppError::ExternalApi("queue unavailable".to_string())));

        let mut model = MockPreferenceModel::new();
        model.expect_predict().returning(|_| {
            Ok(Prediction {
                probability: 0.8,
                rationale: "fits".to_string(),
            })
        });

        let outcome = run_dynamic_queue(
            Arc::new(catalog),
            Arc::new(model),
            PreferenceConfig::default(),
            settings(),
        )
        .await
        .unwrap();

        match outcome {
            QueueRunOutcome::CommitFailed { selection, error } => {
                assert_eq!(selection.track.id, "t1");
                assert_eq!(selection.probability, 0.8);
                assert!(error.contains("queue unavailable"));
            }
            other => panic!("expected CommitFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_listing_failure_surfaces_as_error() {
        let mut catalog = MockCatalog::new();
        catalog
            .expect_list_candidates()
            .returning(|_| Err(AppError::ExternalApi("catalog down".to_string())));

        let model = MockPreferenceModel::new();

        let result = run_dynamic_queue(
            Arc::new(catalog),
            Arc::new(model),
            PreferenceConfig::default(),
            settings(),
        )
        .await;

        assert!(result.is_err());
    }
}
