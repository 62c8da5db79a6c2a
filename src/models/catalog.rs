use crate::utils::validation;
use anyhow::{anyhow, Result};
use std::collections::HashMap;

/// Bijection between external item identifiers and the dense indices the
/// scoring model uses.
#[derive(Debug, Clone)]
pub struct ItemMapping {
    index_of: HashMap<String, usize>,
    ids: Vec<String>,
}

impl ItemMapping {
    pub fn new(index_of: HashMap<String, usize>) -> Result<Self> {
        validation::validate_item_mapping(&index_of)?;

        let mut ids = vec![String::new(); index_of.len()];
        for (item_id, &index) in &index_of {
            ids[index] = item_id.clone();
        }

        Ok(Self { index_of, ids })
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn index_of(&self, item_id: &str) -> Option<usize> {
        self.index_of.get(item_id).copied()
    }

    pub fn id_at(&self, index: usize) -> Option<&str> {
        self.ids.get(index).map(String::as_str)
    }
}

/// Compressed sparse row matrix of user/item interactions. Each row holds
/// the sorted, deduplicated item indices a user interacted with.
#[derive(Debug, Clone, Default)]
pub struct InteractionMatrix {
    indptr: Vec<usize>,
    indices: Vec<usize>,
}

impl InteractionMatrix {
    pub fn from_pairs<I>(n_rows: usize, pairs: I) -> Self
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let mut rows: Vec<Vec<usize>> = vec![Vec::new(); n_rows];
        for (row, col) in pairs {
            if row < n_rows {
                rows[row].push(col);
            }
        }

        let mut indptr = Vec::with_capacity(n_rows + 1);
        let mut indices = Vec::new();
        indptr.push(0);
        for mut row in rows {
            row.sort_unstable();
            row.dedup();
            indices.extend(row);
            indptr.push(indices.len());
        }

        Self { indptr, indices }
    }

    pub fn n_rows(&self) -> usize {
        self.indptr.len().saturating_sub(1)
    }

    /// Number of stored interactions.
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    /// Item indices for `row`; empty when the row is out of range.
    pub fn row(&self, row: usize) -> &[usize] {
        if row >= self.n_rows() {
            return &[];
        }
        &self.indices[self.indptr[row]..self.indptr[row + 1]]
    }
}

/// Training-time user mapping together with the interactions each user
/// had, re-encoded into internal indices.
#[derive(Debug, Clone)]
pub struct UserDataset {
    index_of: HashMap<String, usize>,
    interactions: InteractionMatrix,
}

impl UserDataset {
    pub fn new(
        index_of: HashMap<String, usize>,
        interactions: &[(String, String)],
        items: &ItemMapping,
    ) -> Result<Self> {
        validation::validate_user_mapping(&index_of)?;

        let mut pairs = Vec::with_capacity(interactions.len());
        for (user_id, item_id) in interactions {
            let user = index_of
                .get(user_id)
                .copied()
                .ok_or_else(|| anyhow!("Interaction references unknown user {}", user_id))?;
            let item = items
                .index_of(item_id)
                .ok_or_else(|| anyhow!("Interaction references unknown item {}", item_id))?;
            pairs.push((user, item));
        }

        let n_rows = index_of.values().max().map_or(0, |max| max + 1);
        let interactions = InteractionMatrix::from_pairs(n_rows, pairs);

        Ok(Self {
            index_of,
            interactions,
        })
    }

    pub fn n_users(&self) -> usize {
        self.index_of.len()
    }

    pub fn user_index(&self, user_id: &str) -> Option<usize> {
        self.index_of.get(user_id).copied()
    }

    /// Largest internal user index, if any users are known.
    pub fn max_user_index(&self) -> Option<usize> {
        self.index_of.values().max().copied()
    }

    pub fn interacted_items(&self, user_index: usize) -> &[usize] {
        self.interactions.row(user_index)
    }

    pub fn interactions(&self) -> &InteractionMatrix {
        &self.interactions
    }
}

/// Item identifier to display title.
#[derive(Debug, Clone, Default)]
pub struct TitleIndex {
    titles: HashMap<String, String>,
}

impl TitleIndex {
    pub fn new(titles: HashMap<String, String>) -> Self {
        Self { titles }
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    pub fn get(&self, item_id: &str) -> Option<&str> {
        self.titles.get(item_id).map(String::as_str)
    }
}
