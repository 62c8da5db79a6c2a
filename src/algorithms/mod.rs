pub mod ranking;

use crate::models::ModelParameters;
use crate::utils::validation;
use anyhow::{anyhow, Result};
use ndarray::{Array1, Array2, ArrayView1};

/// A pretrained model that assigns an affinity score to user/item pairs
/// addressed by internal index.
pub trait ScoringModel: Send + Sync {
    fn n_users(&self) -> usize;
    fn n_items(&self) -> usize;

    /// Scores for `user_index` against each of `item_indices`, in order.
    fn predict(&self, user_index: usize, item_indices: &[usize]) -> Result<Array1<f32>>;

    /// Scores for `user_index` against every item in the catalog, indexed
    /// by internal item index.
    fn score_catalog(&self, user_index: usize) -> Result<Array1<f32>> {
        let items: Vec<usize> = (0..self.n_items()).collect();
        self.predict(user_index, &items)
    }
}

/// Latent-factor model with user and item biases:
/// `score(u, i) = dot(U[u], V[i]) + b_u[u] + b_i[i]`.
#[derive(Debug, Clone)]
pub struct FactorizationModel {
    user_embeddings: Array2<f32>,
    user_biases: Array1<f32>,
    item_embeddings: Array2<f32>,
    item_biases: Array1<f32>,
}

impl FactorizationModel {
    pub fn from_parameters(params: ModelParameters) -> Result<Self> {
        validation::validate_model_parameters(&params)?;

        let k = params.no_components;
        let user_embeddings = stack_rows(params.user_embeddings, k)?;
        let item_embeddings = stack_rows(params.item_embeddings, k)?;

        Ok(Self {
            user_embeddings,
            user_biases: Array1::from_vec(params.user_biases),
            item_embeddings,
            item_biases: Array1::from_vec(params.item_biases),
        })
    }

    pub fn no_components(&self) -> usize {
        self.user_embeddings.ncols()
    }

    fn user_row(&self, user_index: usize) -> Result<(ArrayView1<'_, f32>, f32)> {
        if user_index >= self.n_users() {
            return Err(anyhow!(
                "User index {} out of range for model with {} users",
                user_index,
                self.n_users()
            ));
        }
        Ok((
            self.user_embeddings.row(user_index),
            self.user_biases[user_index],
        ))
    }
}

fn stack_rows(rows: Vec<Vec<f32>>, k: usize) -> Result<Array2<f32>> {
    let n = rows.len();
    let flat: Vec<f32> = rows.into_iter().flatten().collect();
    Array2::from_shape_vec((n, k), flat)
        .map_err(|e| anyhow!("Embedding matrix shape mismatch: {}", e))
}

impl ScoringModel for FactorizationModel {
    fn n_users(&self) -> usize {
        self.user_embeddings.nrows()
    }

    fn n_items(&self) -> usize {
        self.item_embeddings.nrows()
    }

    fn predict(&self, user_index: usize, item_indices: &[usize]) -> Result<Array1<f32>> {
        let (user_vec, user_bias) = self.user_row(user_index)?;

        let mut scores = Array1::zeros(item_indices.len());
        for (slot, &item) in item_indices.iter().enumerate() {
            if item >= self.n_items() {
                return Err(anyhow!(
                    "Item index {} out of range for model with {} items",
                    item,
                    self.n_items()
                ));
            }
            scores[slot] =
                self.item_embeddings.row(item).dot(&user_vec) + self.item_biases[item] + user_bias;
        }
        Ok(scores)
    }

    fn score_catalog(&self, user_index: usize) -> Result<Array1<f32>> {
        let (user_vec, user_bias) = self.user_row(user_index)?;
        Ok(self.item_embeddings.dot(&user_vec) + &self.item_biases + user_bias)
    }
}
