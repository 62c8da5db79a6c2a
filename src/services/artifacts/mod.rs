use crate::algorithms::{FactorizationModel, ScoringModel};
use crate::config::ArtifactsConfig;
use crate::models::{ItemMapping, ModelParameters, TitleIndex, UserDataset};
use crate::utils::validation;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("failed to open artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse artifact {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid artifact {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },

    #[error("artifacts are inconsistent: {0}")]
    Inconsistent(String),
}

/// On-disk shape of the dataset artifact.
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetArtifact {
    pub user_mapping: HashMap<String, usize>,
    #[serde(default)]
    pub interactions: Vec<(String, String)>,
}

/// Everything a recommendation request reads. Built once at startup and
/// never mutated afterwards.
#[derive(Clone)]
pub struct Artifacts {
    pub model: Arc<dyn ScoringModel>,
    pub items: Arc<ItemMapping>,
    pub users: Arc<UserDataset>,
    pub titles: Arc<TitleIndex>,
}

impl std::fmt::Debug for Artifacts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Artifacts")
            .field("n_users", &self.model.n_users())
            .field("n_items", &self.model.n_items())
            .field("mapped_users", &self.users.n_users())
            .field("titles", &self.titles.len())
            .finish()
    }
}

impl Artifacts {
    /// Check that the parts describe the same catalog and user population.
    pub fn new(
        model: Arc<dyn ScoringModel>,
        items: ItemMapping,
        users: UserDataset,
        titles: TitleIndex,
    ) -> Result<Self, ArtifactError> {
        validation::validate_artifact_consistency(
            model.n_users(),
            model.n_items(),
            items.len(),
            users.max_user_index(),
        )
        .map_err(|e| ArtifactError::Inconsistent(format!("{:#}", e)))?;

        Ok(Self {
            model,
            items: Arc::new(items),
            users: Arc::new(users),
            titles: Arc::new(titles),
        })
    }

    /// Load and cross-check all four artifacts. Any failure is fatal to the
    /// caller; there is no partial mode.
    pub fn load(config: &ArtifactsConfig) -> Result<Self, ArtifactError> {
        let start = Instant::now();

        let model = load_model(&config.model_path)?;
        let items = load_item_mapping(&config.item_mapping_path)?;
        let users = load_dataset(&config.dataset_path, &items)?;
        let titles = load_titles(&config.titles_path)?;

        info!(
            n_users = model.n_users(),
            n_items = model.n_items(),
            no_components = model.no_components(),
            interactions = users.interactions().nnz(),
            titles = titles.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Loaded recommendation artifacts"
        );

        Self::new(Arc::new(model), items, users, titles)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let file = File::open(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_reader(BufReader::new(file)).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn invalid(path: &Path, err: anyhow::Error) -> ArtifactError {
    ArtifactError::Invalid {
        path: path.to_path_buf(),
        reason: format!("{:#}", err),
    }
}

pub fn load_model(path: &Path) -> Result<FactorizationModel, ArtifactError> {
    let params: ModelParameters = read_json(path)?;
    FactorizationModel::from_parameters(params).map_err(|e| invalid(path, e))
}

pub fn load_item_mapping(path: &Path) -> Result<ItemMapping, ArtifactError> {
    let mapping: HashMap<String, usize> = read_json(path)?;
    ItemMapping::new(mapping).map_err(|e| invalid(path, e))
}

pub fn load_dataset(path: &Path, items: &ItemMapping) -> Result<UserDataset, ArtifactError> {
    let dataset: DatasetArtifact = read_json(path)?;
    UserDataset::new(dataset.user_mapping, &dataset.interactions, items)
        .map_err(|e| invalid(path, e))
}

pub fn load_titles(path: &Path) -> Result<TitleIndex, ArtifactError> {
    let titles: HashMap<String, String> = read_json(path)?;
    Ok(TitleIndex::new(titles))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, value: serde_json::Value) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, serde_json::to_vec(&value).unwrap()).unwrap();
        path
    }

    fn write_fixture(dir: &TempDir) -> ArtifactsConfig {
        ArtifactsConfig {
            model_path: write(
                dir,
                "model.json",
                json!({
                    "no_components": 1,
                    "user_embeddings": [[1.0]],
                    "user_biases": [0.0],
                    "item_embeddings": [[0.9], [0.1], [0.5]],
                    "item_biases": [0.0, 0.0, 0.0]
                }),
            ),
            item_mapping_path: write(dir, "items.json", json!({ "A": 0, "B": 1, "C": 2 })),
            dataset_path: write(
                dir,
                "dataset.json",
                json!({ "user_mapping": { "u1": 0 }, "interactions": [["u1", "B"]] }),
            ),
            titles_path: write(dir, "titles.json", json!({ "A": "Alpha", "B": "Beta" })),
        }
    }

    #[test]
    fn test_load_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_fixture(&dir);

        let artifacts = Artifacts::load(&config).unwrap();
        assert_eq!(artifacts.model.n_items(), 3);
        assert_eq!(artifacts.items.id_at(1), Some("B"));
        assert_eq!(artifacts.users.user_index("u1"), Some(0));
        assert_eq!(artifacts.users.interacted_items(0), &[1]);
        assert_eq!(artifacts.titles.get("C"), None);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = write_fixture(&dir);
        config.titles_path = dir.path().join("absent.json");

        let err = Artifacts::load(&config).unwrap_err();
        assert!(matches!(err, ArtifactError::Io { .. }));
        assert!(err.to_string().contains("absent.json"));
    }

    #[test]
    fn test_corrupt_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = write_fixture(&dir);
        let path = dir.path().join("broken.json");
        std::fs::write(&path, b"{ not json").unwrap();
        config.model_path = path;

        assert!(matches!(
            Artifacts::load(&config).unwrap_err(),
            ArtifactError::Parse { .. }
        ));
    }

    #[test]
    fn test_item_count_mismatch_is_inconsistent() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = write_fixture(&dir);
        config.item_mapping_path = write(&dir, "items2.json", json!({ "A": 0, "B": 1 }));
        config.dataset_path = write(
            &dir,
            "dataset2.json",
            json!({ "user_mapping": { "u1": 0 }, "interactions": [] }),
        );

        assert!(matches!(
            Artifacts::load(&config).unwrap_err(),
            ArtifactError::Inconsistent(_)
        ));
    }

    #[test]
    fn test_unknown_interaction_item_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = write_fixture(&dir);
        config.dataset_path = write(
            &dir,
            "dataset3.json",
            json!({ "user_mapping": { "u1": 0 }, "interactions": [["u1", "Z"]] }),
        );

        assert!(matches!(
            Artifacts::load(&config).unwrap_err(),
            ArtifactError::Invalid { .. }
        ));
    }
}
