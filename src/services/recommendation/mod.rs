use crate::algorithms::ranking;
use crate::config::Config;
use crate::models::*;
use crate::services::artifacts::Artifacts;
use anyhow::{anyhow, Result};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct RecommendationService {
    artifacts: Artifacts,
    config: Arc<Config>,
}

impl RecommendationService {
    pub fn new(artifacts: Artifacts, config: Arc<Config>) -> Self {
        Self { artifacts, config }
    }

    pub fn artifacts(&self) -> &Artifacts {
        &self.artifacts
    }

    /// Fill in the options the query left out with the configured defaults.
    pub fn request_from_query(&self, query: RecommendationQuery) -> RecommendationRequest {
        let defaults = &self.config.recommendation;
        RecommendationRequest {
            user_id: query.user_id,
            num_recs: query.num_recs.unwrap_or(defaults.default_num_recs),
            exclude_watched: query
                .exclude_watched
                .unwrap_or(defaults.exclude_watched_by_default),
        }
    }

    /// Score the whole catalog for the user, optionally drop what they have
    /// already interacted with, and return the best `num_recs` titles.
    pub fn recommend(&self, request: &RecommendationRequest) -> Result<RecommendationResult> {
        let Some(user_index) = self.artifacts.users.user_index(&request.user_id) else {
            warn!(user_id = %request.user_id, "User not found in training data");
            return Ok(RecommendationResult::user_not_found(&request.user_id));
        };

        let scores = self.artifacts.model.score_catalog(user_index)?.to_vec();

        let excluded: &[usize] = if request.exclude_watched {
            self.artifacts.users.interacted_items(user_index)
        } else {
            &[]
        };

        let top_items = ranking::select_top_k(
            scores,
            excluded,
            request.num_recs,
            self.config.recommendation.exclusion_policy,
        );

        debug!(
            user_id = %request.user_id,
            user_index,
            excluded = excluded.len(),
            selected = top_items.len(),
            "Ranked catalog"
        );

        let recommendations = top_items
            .into_iter()
            .map(|index| self.title_for(index))
            .collect::<Result<Vec<_>>>()?;

        Ok(RecommendationResult::Found(RecommendationResponse {
            user_id: request.user_id.clone(),
            recommendations,
        }))
    }

    fn title_for(&self, index: usize) -> Result<String> {
        let item_id = self
            .artifacts
            .items
            .id_at(index)
            .ok_or_else(|| anyhow!("No item identifier for internal index {}", index))?;

        Ok(self
            .artifacts
            .titles
            .get(item_id)
            .map(str::to_string)
            .unwrap_or_else(|| placeholder_title(item_id)))
    }
}
