pub mod catalog;

pub use catalog::{InteractionMatrix, ItemMapping, TitleIndex, UserDataset};

use serde::{de, Deserialize, Deserializer, Serialize};

/// Query string accepted by `GET /recommend`. Absent options fall back to
/// the configured defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationQuery {
    pub user_id: String,
    pub num_recs: Option<usize>,
    #[serde(default, deserialize_with = "deserialize_query_bool")]
    pub exclude_watched: Option<bool>,
}

/// Boolean spellings accepted in query strings, case-insensitive:
/// `true`/`false`, `t`/`f`, `yes`/`no`, `y`/`n`, `on`/`off`, `1`/`0`.
pub fn parse_query_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "on" | "1" => Some(true),
        "false" | "f" | "no" | "n" | "off" | "0" => Some(false),
        _ => None,
    }
}

fn deserialize_query_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_query_bool(&raw)
        .map(Some)
        .ok_or_else(|| de::Error::custom(format!("invalid boolean value: {:?}", raw)))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationRequest {
    pub user_id: String,
    pub num_recs: usize,
    pub exclude_watched: bool,
}

impl RecommendationRequest {
    pub fn new(user_id: impl Into<String>, num_recs: usize) -> Self {
        Self {
            user_id: user_id.into(),
            num_recs,
            exclude_watched: true,
        }
    }

    pub fn with_exclude_watched(mut self, exclude_watched: bool) -> Self {
        self.exclude_watched = exclude_watched;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub user_id: String,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Outcome of a recommendation lookup. A cold-start user is an expected
/// outcome, so it is a variant here rather than an `Err`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecommendationResult {
    Found(RecommendationResponse),
    UserNotFound(ErrorResponse),
}

impl RecommendationResult {
    pub fn user_not_found(user_id: &str) -> Self {
        Self::UserNotFound(ErrorResponse {
            error: format!("User ID {} not found in training data.", user_id),
        })
    }

    pub fn recommendations(&self) -> Option<&[String]> {
        match self {
            Self::Found(response) => Some(&response.recommendations),
            Self::UserNotFound(_) => None,
        }
    }
}

/// Serialized factorization model: one latent vector and one bias per user
/// and per item, all vectors `no_components` long.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelParameters {
    pub no_components: usize,
    pub user_embeddings: Vec<Vec<f32>>,
    pub user_biases: Vec<f32>,
    pub item_embeddings: Vec<Vec<f32>>,
    pub item_biases: Vec<f32>,
}

/// Display string for an item that has no entry in the title mapping.
pub fn placeholder_title(item_id: &str) -> String {
    format!("Unknown Title (ID {})", item_id)
}
