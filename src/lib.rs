pub mod algorithms;
pub mod config;
pub mod models;
pub mod services;
pub mod utils;

pub use config::Config;
pub use models::*;

use anyhow::Result;
use services::artifacts::Artifacts;
use services::recommendation::RecommendationService;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Clone)]
pub struct AppState {
    pub recommendation_service: Arc<RecommendationService>,
}

impl AppState {
    /// Load every artifact named in `config`. Fails if any of them is
    /// missing, unreadable or inconsistent with the others.
    pub fn new(config: Config) -> Result<Self> {
        let artifacts = Artifacts::load(&config.artifacts)?;
        Ok(Self::from_artifacts(config, artifacts))
    }

    pub fn from_artifacts(config: Config, artifacts: Artifacts) -> Self {
        let recommendation_service =
            Arc::new(RecommendationService::new(artifacts, Arc::new(config)));

        Self {
            recommendation_service,
        }
    }
}

/// `RUST_LOG` takes precedence; `default_filter` applies when it is unset.
pub fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
