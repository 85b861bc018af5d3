use serde::{Deserialize, Serialize};

pub mod preferences;

pub use preferences::{
    ListeningContext, Mood, PrefRange, PreferenceConfig, PreferenceStore, PreferenceUpdate,
};

/// A track eligible for queueing, as pulled from the catalog for one run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrackCandidate {
    pub id: String,
    pub name: String,
    pub primary_artist: String,
    pub explicit: bool,
    /// Derived from the album release date; absent when the catalog omits it
    pub release_year: Option<i32>,
    /// 0-100 scale
    pub popularity: u8,
}

/// Numeric descriptors of a track's audio character
///
/// Missing wire fields deserialize to 0, matching how the model service
/// treats absent features.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AudioFeatures {
    #[serde(default)]
    pub danceability: f64,
    #[serde(default)]
    pub energy: f64,
    #[serde(default)]
    pub valence: f64,
    #[serde(default)]
    pub tempo: f64,
    #[serde(default)]
    pub loudness: f64,
    #[serde(default)]
    pub speechiness: f64,
    #[serde(default)]
    pub instrumentalness: f64,
    #[serde(default)]
    pub liveness: f64,
    #[serde(default)]
    pub acousticness: f64,
}

/// Model output for one feature vector
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Prediction {
    pub probability: f64,
    pub rationale: String,
}

/// A candidate that survived scoring, alive only within one pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub track: TrackCandidate,
    pub features: AudioFeatures,
    pub probability: f64,
    pub rationale: String,
}

/// The winning candidate of a run
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub track: TrackCandidate,
    pub probability: f64,
    pub rationale: String,
}

impl From<ScoredCandidate> for Selection {
    fn from(scored: ScoredCandidate) -> Self {
        Self {
            track: scored.track,
            probability: scored.probability,
            rationale: scored.rationale,
        }
    }
}

/// Which stage left the pipeline without candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyStage {
    Catalog,
    PreferenceFilter,
    FeatureScoring,
}

impl EmptyStage {
    pub fn reason(&self) -> &'static str {
        match self {
            EmptyStage::Catalog => "no candidates from catalog",
            EmptyStage::PreferenceFilter => "no candidates after preference filtering",
            EmptyStage::FeatureScoring => "no candidates after feature and range scoring",
        }
    }
}

/// Terminal outcome of one dynamic-queue run
///
/// An empty candidate set and a failed queue append are normal terminals,
/// not errors; both carry enough context for the caller to act on.
#[derive(Debug, Clone, PartialEq)]
pub enum QueueRunOutcome {
    /// Winner committed to the playback queue
    Queued(Selection),
    /// Winner computed but the queue append failed; the selection is kept so
    /// the caller can retry the commit without rescoring
    CommitFailed { selection: Selection, error: String },
    NoCandidates(EmptyStage),
}

/// Implicit feedback label sent to the model service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackLabel {
    Skipped,
    Played,
}

impl FeedbackLabel {
    /// Wire encoding: 1 = played/liked, 0 = skipped
    pub fn as_value(&self) -> u8 {
        match self {
            FeedbackLabel::Skipped => 0,
            FeedbackLabel::Played => 1,
        }
    }
}

/// Why a track was skipped
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SkipReason {
    NotInMood,
    HeardTooOften,
    DontLikeArtist,
    #[serde(other)]
    Unspecified,
}

/// One play/skip observation forwarded to the model service
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackEvent {
    pub features: AudioFeatures,
    pub label: FeedbackLabel,
    pub skip_reason: Option<SkipReason>,
}
