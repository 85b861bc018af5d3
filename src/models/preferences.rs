use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::{AppError, AppResult};

/// An inclusive `[min, max]` bound, serialized as a two-element JSON array
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PrefRange<T>(pub T, pub T);

impl<T: PartialOrd + Copy> PrefRange<T> {
    pub fn contains(&self, value: T) -> bool {
        value >= self.0 && value <= self.1
    }

    pub fn is_ordered(&self) -> bool {
        self.0 <= self.1
    }
}

/// Advisory mood tag, carried through but not applied by filtering
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Mood {
    Relaxing,
    Workout,
}

/// Advisory listening-context tag, carried through but not applied by filtering
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ListeningContext {
    Raining,
    Gym,
    LateNight,
}

/// The listener's current preference configuration
///
/// Ranges always satisfy `min <= max`; `update` rejects anything else before
/// the store is touched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceConfig {
    pub energy_range: PrefRange<f64>,
    pub tempo_range: PrefRange<f64>,
    pub release_year_range: PrefRange<i32>,
    pub block_explicit: bool,
    /// Case-sensitive exact artist names
    pub block_artists: HashSet<String>,
    /// When set, candidates above the popularity ceiling are excluded
    pub focus_obscure: bool,
    pub mood: Option<Mood>,
    pub context: Option<ListeningContext>,
}

impl Default for PreferenceConfig {
    fn default() -> Self {
        Self {
            energy_range: PrefRange(0.0, 1.0),
            tempo_range: PrefRange(50.0, 200.0),
            release_year_range: PrefRange(1970, 2025),
            block_explicit: false,
            block_artists: HashSet::new(),
            focus_obscure: false,
            mood: None,
            context: None,
        }
    }
}

/// Partial preference update; only present fields overwrite
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceUpdate {
    pub energy_range: Option<PrefRange<f64>>,
    pub tempo_range: Option<PrefRange<f64>>,
    pub release_year_range: Option<PrefRange<i32>>,
    pub block_explicit: Option<bool>,
    pub block_artists: Option<HashSet<String>>,
    pub focus_obscure: Option<bool>,
    pub mood: Option<Mood>,
    pub context: Option<ListeningContext>,
}

impl PreferenceUpdate {
    /// Rejects any supplied range whose bounds are inverted, naming the field
    fn validate(&self) -> AppResult<()> {
        if let Some(range) = &self.energy_range {
            if !range.is_ordered() {
                return Err(AppError::InvalidInput(
                    "energyRange bounds must satisfy min <= max".to_string(),
                ));
            }
        }
        if let Some(range) = &self.tempo_range {
            if !range.is_ordered() {
                return Err(AppError::InvalidInput(
                    "tempoRange bounds must satisfy min <= max".to_string(),
                ));
            }
        }
        if let Some(range) = &self.release_year_range {
            if !range.is_ordered() {
                return Err(AppError::InvalidInput(
                    "releaseYearRange bounds must satisfy min <= max".to_string(),
                ));
            }
        }
        Ok(())
    }

    fn apply(self, config: &mut PreferenceConfig) {
        if let Some(range) = self.energy_range {
            config.energy_range = range;
        }
        if let Some(range) = self.tempo_range {
            config.tempo_range = range;
        }
        if let Some(range) = self.release_year_range {
            config.release_year_range = range;
        }
        if let Some(block_explicit) = self.block_explicit {
            config.block_explicit = block_explicit;
        }
        if let Some(block_artists) = self.block_artists {
            config.block_artists = block_artists;
        }
        if let Some(focus_obscure) = self.focus_obscure {
            config.focus_obscure = focus_obscure;
        }
        if let Some(mood) = self.mood {
            config.mood = Some(mood);
        }
        if let Some(context) = self.context {
            config.context = Some(context);
        }
    }
}

/// Owning handle to the single process-wide preference configuration
///
/// All mutation goes through `update`; a pipeline run takes one `get`
/// snapshot at entry and never re-reads mid-run.
#[derive(Clone, Default)]
pub struct PreferenceStore {
    inner: Arc<RwLock<PreferenceConfig>>,
}

impl PreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot
    pub async fn get(&self) -> PreferenceConfig {
        self.inner.read().await.clone()
    }

    /// Applies the fields present in `update` and returns the merged result.
    /// A malformed update leaves the store unchanged.
    pub async fn update(&self, update: PreferenceUpdate) -> AppResult<PreferenceConfig> {
        update.validate()?;

        let mut config = self.inner.write().await;
        update.apply(&mut config);

        tracing::info!(
            block_explicit = config.block_explicit,
            blocked_artists = config.block_artists.len(),
            focus_obscure = config.focus_obscure,
            "Preferences updated"
        );

        Ok(config.clone())
    }
}
