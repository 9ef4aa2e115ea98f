//! Sparse feature vectors produced by the vectorizer.

use serde::{Deserialize, Serialize};

use crate::error::{PhishError, Result};

/// A sparse vector of TF-IDF weights.
///
/// Entries are kept sorted by feature index with no duplicates and no
/// explicit zeros. A vector is never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    dim: usize,
    indices: Vec<usize>,
    values: Vec<f64>,
}

impl FeatureVector {
    /// The all-zero vector of the given dimension.
    pub fn zeros(dim: usize) -> Self {
        FeatureVector {
            dim,
            indices: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Build a vector from `(index, value)` pairs.
    ///
    /// Pairs may come in any order; zero values are dropped. Duplicate or
    /// out-of-range indices are rejected.
    pub fn from_pairs(dim: usize, mut pairs: Vec<(usize, f64)>) -> Result<Self> {
        pairs.retain(|&(_, value)| value != 0.0);
        pairs.sort_by_key(|&(index, _)| index);

        for window in pairs.windows(2) {
            if window[0].0 == window[1].0 {
                return Err(PhishError::invalid_input(format!(
                    "duplicate feature index {}",
                    window[0].0
                )));
            }
        }
        if let Some(&(index, _)) = pairs.last()
            && index >= dim
        {
            return Err(PhishError::invalid_input(format!(
                "feature index {index} out of range for dimension {dim}"
            )));
        }

        let (indices, values) = pairs.into_iter().unzip();
        Ok(FeatureVector {
            dim,
            indices,
            values,
        })
    }

    /// Dimension of the vector (the vocabulary size).
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of stored non-zero entries.
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    pub fn is_zero(&self) -> bool {
        self.indices.is_empty()
    }

    /// Iterate over `(index, value)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }

    /// Value at `index`, zero when absent.
    pub fn get(&self, index: usize) -> f64 {
        match self.indices.binary_search(&index) {
            Ok(pos) => self.values[pos],
            Err(_) => 0.0,
        }
    }

    /// Euclidean norm.
    pub fn norm(&self) -> f64 {
        self.values.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    /// Dot product with a dense weight vector of the same dimension.
    pub fn dot(&self, weights: &[f64]) -> f64 {
        self.iter().map(|(index, value)| weights[index] * value).sum()
    }

    /// Scale to unit Euclidean norm; the zero vector is returned unchanged.
    pub fn l2_normalized(mut self) -> Self {
        let norm = self.norm();
        if norm > 0.0 {
            for value in &mut self.values {
                *value /= norm;
            }
        }
        self
    }

    /// Expand into a dense vector.
    pub fn to_dense(&self) -> Vec<f64> {
        let mut dense = vec![0.0; self.dim];
        for (index, value) in self.iter() {
            dense[index] = value;
        }
        dense
    }
}
