use crate::models::{PreferenceConfig, TrackCandidate};

/// Popularity above this ceiling disqualifies a candidate when the listener
/// focuses on obscure tracks (0-100 scale)
pub const OBSCURE_POPULARITY_CEILING: u8 = 70;

/// Applies the listener's preference rules to the raw candidate pool.
///
/// Order-preserving. Each rule is an independent predicate; a candidate
/// survives only if all of them hold. An empty result is a normal outcome.
pub fn filter_candidates(
    candidates: Vec<TrackCandidate>,
    prefs: &PreferenceConfig,
) -> Vec<TrackCandidate> {
    let before = candidates.len();
    let survivors: Vec<TrackCandidate> = candidates
        .into_iter()
        .filter(|track| passes_preferences(track, prefs))
        .collect();

    tracing::debug!(
        before,
        after = survivors.len(),
        "Preference filter applied"
    );

    survivors
}

fn passes_preferences(track: &TrackCandidate, prefs: &PreferenceConfig) -> bool {
    if prefs.block_artists.contains(&track.primary_artist) {
        return false;
    }
    if prefs.block_explicit && track.explicit {
        return false;
    }
    // Candidates without a release year are not filtered by the year rule
    if let Some(year) = track.release_year {
        if !prefs.release_year_range.contains(year) {
            return false;
        }
    }
    if prefs.focus_obscure && track.popularity > OBSCURE_POPULARITY_CEILING {
        return false;
    }
    true
}
