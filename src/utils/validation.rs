use crate::models::ModelParameters;
use anyhow::{anyhow, Result};
use std::collections::HashMap;

pub fn validate_model_parameters(params: &ModelParameters) -> Result<()> {
    if params.no_components == 0 {
        return Err(anyhow!("Model must have at least one latent component"));
    }

    if params.user_biases.len() != params.user_embeddings.len() {
        return Err(anyhow!(
            "User bias count {} does not match user embedding count {}",
            params.user_biases.len(),
            params.user_embeddings.len()
        ));
    }

    if params.item_biases.len() != params.item_embeddings.len() {
        return Err(anyhow!(
            "Item bias count {} does not match item embedding count {}",
            params.item_biases.len(),
            params.item_embeddings.len()
        ));
    }

    for (index, embedding) in params.user_embeddings.iter().enumerate() {
        validate_embedding_dimension(embedding, params.no_components)
            .map_err(|e| anyhow!("User embedding {}: {}", index, e))?;
        if embedding.iter().any(|w| !w.is_finite()) {
            return Err(anyhow!("User embedding {} contains invalid values", index));
        }
    }

    for (index, embedding) in params.item_embeddings.iter().enumerate() {
        validate_embedding_dimension(embedding, params.no_components)
            .map_err(|e| anyhow!("Item embedding {}: {}", index, e))?;
        if embedding.iter().any(|w| !w.is_finite()) {
            return Err(anyhow!("Item embedding {} contains invalid values", index));
        }
    }

    if params.user_biases.iter().any(|b| !b.is_finite()) {
        return Err(anyhow!("User biases contain invalid values"));
    }

    if params.item_biases.iter().any(|b| !b.is_finite()) {
        return Err(anyhow!("Item biases contain invalid values"));
    }

    Ok(())
}

pub fn validate_embedding_dimension(embedding: &[f32], expected_dim: usize) -> Result<()> {
    if embedding.len() != expected_dim {
        return Err(anyhow!(
            "Embedding dimension mismatch: expected {}, got {}",
            expected_dim,
            embedding.len()
        ));
    }
    Ok(())
}

/// Every index in `0..mapping.len()` must be used by exactly one item.
pub fn validate_item_mapping(mapping: &HashMap<String, usize>) -> Result<()> {
    let n_items = mapping.len();
    let mut owner: Vec<Option<&str>> = vec![None; n_items];

    for (item_id, &index) in mapping {
        if index >= n_items {
            return Err(anyhow!(
                "Item {} has index {} outside 0..{}",
                item_id,
                index,
                n_items
            ));
        }
        if let Some(other) = owner[index] {
            return Err(anyhow!(
                "Items {} and {} share index {}",
                other,
                item_id,
                index
            ));
        }
        owner[index] = Some(item_id.as_str());
    }

    Ok(())
}

pub fn validate_user_mapping(mapping: &HashMap<String, usize>) -> Result<()> {
    let mut seen: HashMap<usize, &str> = HashMap::with_capacity(mapping.len());
    for (user_id, &index) in mapping {
        if let Some(other) = seen.insert(index, user_id.as_str()) {
            return Err(anyhow!(
                "Users {} and {} share index {}",
                other,
                user_id,
                index
            ));
        }
    }
    Ok(())
}

/// The artifacts must describe the same catalog and user population.
pub fn validate_artifact_consistency(
    model_users: usize,
    model_items: usize,
    mapped_items: usize,
    max_user_index: Option<usize>,
) -> Result<()> {
    if model_items != mapped_items {
        return Err(anyhow!(
            "Model scores {} items but the item mapping has {}",
            model_items,
            mapped_items
        ));
    }

    if let Some(max_index) = max_user_index {
        if max_index >= model_users {
            return Err(anyhow!(
                "User index {} exceeds the model's {} users",
                max_index,
                model_users
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> ModelParameters {
        ModelParameters {
            no_components: 2,
            user_embeddings: vec![vec![0.1, 0.2]],
            user_biases: vec![0.0],
            item_embeddings: vec![vec![0.3, 0.4], vec![0.5, 0.6]],
            item_biases: vec![0.0, 0.1],
        }
    }

    #[test]
    fn test_validate_model_parameters() {
        assert!(validate_model_parameters(&params()).is_ok());

        let mut nan = params();
        nan.item_embeddings[0][1] = f32::NAN;
        assert!(validate_model_parameters(&nan).is_err());

        let mut short_biases = params();
        short_biases.item_biases.pop();
        assert!(validate_model_parameters(&short_biases).is_err());

        let mut no_components = params();
        no_components.no_components = 0;
        assert!(validate_model_parameters(&no_components).is_err());
    }

    #[test]
    fn test_validate_item_mapping() {
        let good = HashMap::from([("a".to_string(), 1), ("b".to_string(), 0)]);
        assert!(validate_item_mapping(&good).is_ok());

        let duplicate = HashMap::from([("a".to_string(), 0), ("b".to_string(), 0)]);
        assert!(validate_item_mapping(&duplicate).is_err());

        let out_of_range = HashMap::from([("a".to_string(), 0), ("b".to_string(), 5)]);
        assert!(validate_item_mapping(&out_of_range).is_err());
    }

    #[test]
    fn test_validate_user_mapping() {
        let good = HashMap::from([("u1".to_string(), 0), ("u2".to_string(), 3)]);
        assert!(validate_user_mapping(&good).is_ok());

        let duplicate = HashMap::from([("u1".to_string(), 2), ("u2".to_string(), 2)]);
        assert!(validate_user_mapping(&duplicate).is_err());
    }

    #[test]
    fn test_validate_artifact_consistency() {
        assert!(validate_artifact_consistency(2, 3, 3, Some(1)).is_ok());
        assert!(validate_artifact_consistency(2, 3, 4, Some(1)).is_err());
        assert!(validate_artifact_consistency(2, 3, 3, Some(2)).is_err());
        assert!(validate_artifact_consistency(0, 0, 0, None).is_ok());
    }
}
