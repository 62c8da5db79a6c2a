use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub artifacts: ArtifactsConfig,
    pub recommendation: RecommendationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse()
            .map_err(|e| anyhow::anyhow!("Invalid listen address {}: {}", addr, e))
    }
}

/// Locations of the four startup artifacts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactsConfig {
    pub model_path: PathBuf,
    pub item_mapping_path: PathBuf,
    pub dataset_path: PathBuf,
    pub titles_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationConfig {
    pub default_num_recs: usize,
    pub exclude_watched_by_default: bool,
    pub exclusion_policy: ExclusionPolicy,
}

/// What happens to already-seen items when there are not enough unseen
/// items to fill the requested slate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExclusionPolicy {
    /// Seen items never appear; the slate may come back short.
    #[default]
    Drop,
    /// Seen items rank last and fill remaining slots in index order.
    Backfill,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
                workers: num_cpus::get(),
            },
            artifacts: ArtifactsConfig {
                model_path: PathBuf::from("model/lightfm_model.json"),
                item_mapping_path: PathBuf::from("model/item_mapping.json"),
                dataset_path: PathBuf::from("model/dataset.json"),
                titles_path: PathBuf::from("model/id_to_title.json"),
            },
            recommendation: RecommendationConfig {
                default_num_recs: 5,
                exclude_watched_by_default: true,
                exclusion_policy: ExclusionPolicy::Drop,
            },
        }
    }
}

impl Config {
    /// Built-in defaults, overlaid by `path` when it exists, then by
    /// `RECSERVE__SECTION__KEY` environment variables.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Config::default())?)
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("RECSERVE").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
