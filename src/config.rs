use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Catalog API base URL
    #[serde(default = "default_catalog_api_url")]
    pub catalog_api_url: String,

    /// Bearer token for the catalog API, managed outside this service
    pub catalog_api_token: String,

    /// Preference-model service base URL
    #[serde(default = "default_model_service_url")]
    pub model_service_url: String,

    /// Timeout for any single external call, in seconds
    #[serde(default = "default_external_timeout_secs")]
    pub external_timeout_secs: u64,

    /// How many candidates to pull from the catalog per run
    #[serde(default = "default_candidate_limit")]
    pub candidate_limit: usize,

    /// Cap on in-flight feature-fetch/scoring calls per run
    #[serde(default = "default_scoring_concurrency")]
    pub scoring_concurrency: usize,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_catalog_api_url() -> String {
    "https://api.spotify.com/v1".to_string()
}

fn default_model_service_url() -> String {
    "http://localhost:5001".to_string()
}

fn default_external_timeout_secs() -> u64 {
    10
}

fn default_candidate_limit() -> usize {
    20
}

fn default_scoring_concurrency() -> usize {
    4
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3001
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }
}
