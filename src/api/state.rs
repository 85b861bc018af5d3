use std::sync::Arc;

use crate::models::PreferenceStore;
use crate::services::feedback::FeedbackRecorder;
use crate::services::pipeline::PipelineSettings;
use crate::services::providers::{Catalog, PreferenceModel};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn Catalog>,
    pub model: Arc<dyn PreferenceModel>,
    pub preferences: PreferenceStore,
    pub feedback: FeedbackRecorder,
    pub pipeline: PipelineSettings,
}

impl AppState {
    pub fn new(
        catalog: Arc<dyn Catalog>,
        model: Arc<dyn PreferenceModel>,
        pipeline: PipelineSettings,
    ) -> Self {
        Self {
            catalog,
            preferences: PreferenceStore::new(),
            feedback: FeedbackRecorder::new(model.clone()),
            model,
            pipeline,
        }
    }
}
