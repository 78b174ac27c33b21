//! Flat vector store with exact top-1 search.

use std::collections::BTreeSet;

use intent_types::Example;
use tracing::debug;

use crate::error::VectorError;
use crate::similarity::cosine_similarity;

/// Result of a nearest-neighbour query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Position of the matched example in insertion order
    pub index: usize,
    /// Cosine similarity in [-1, 1]
    pub similarity: f32,
}

/// Read-only collection of labelled vectors.
///
/// `vectors` and `labels` are parallel: `labels[i]` is the intent of
/// `vectors[i]`. There is no insert or delete after construction.
#[derive(Debug, Clone)]
pub struct VectorStore {
    vectors: Vec<Vec<f32>>,
    labels: Vec<String>,
    dimension: usize,
}

impl VectorStore {
    /// Build a store from parallel vector and label arrays.
    ///
    /// Fails if the arrays differ in length or the vectors differ in
    /// dimension. An empty store is valid but cannot be queried.
    pub fn new(vectors: Vec<Vec<f32>>, labels: Vec<String>) -> Result<Self, VectorError> {
        if vectors.len() != labels.len() {
            return Err(VectorError::LengthMismatch {
                vectors: vectors.len(),
                labels: labels.len(),
            });
        }

        let dimension = vectors.first().map(Vec::len).unwrap_or(0);
        if let Some(bad) = vectors.iter().find(|v| v.len() != dimension) {
            return Err(VectorError::DimensionMismatch {
                expected: dimension,
                actual: bad.len(),
            });
        }

        debug!(count = vectors.len(), dim = dimension, "Built vector store");
        Ok(Self {
            vectors,
            labels,
            dimension,
        })
    }

    /// Build a store from examples, preserving their order.
    pub fn from_examples(examples: Vec<Example>) -> Result<Self, VectorError> {
        let (vectors, labels) = examples.into_iter().map(|e| (e.vector, e.label)).unzip();
        Self::new(vectors, labels)
    }

    /// Find the stored vector most similar to `query`.
    ///
    /// Equal similarities resolve to the lowest index.
    pub fn nearest(&self, query: &[f32]) -> Result<Neighbor, VectorError> {
        if self.vectors.is_empty() {
            return Err(VectorError::EmptyStore);
        }
        if query.len() != self.dimension {
            return Err(VectorError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let mut best = Neighbor {
            index: 0,
            similarity: cosine_similarity(query, &self.vectors[0]),
        };
        for (index, vector) in self.vectors.iter().enumerate().skip(1) {
            let similarity = cosine_similarity(query, vector);
            if similarity > best.similarity {
                best = Neighbor { index, similarity };
            }
        }
        Ok(best)
    }

    /// Label of the example at `index`.
    pub fn label_at(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn vector_at(&self, index: usize) -> Option<&[f32]> {
        self.vectors.get(index).map(Vec::as_slice)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn vectors(&self) -> &[Vec<f32>] {
        &self.vectors
    }

    /// Sorted set of labels present in the store.
    pub fn distinct_labels(&self) -> BTreeSet<&str> {
        self.labels.iter().map(String::as_str).collect()
    }

    /// Vector dimension (0 for an empty store).
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn unit(v: Vec<f32>) -> Vec<f32> {
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        v.into_iter().map(|x| x / norm).collect()
    }

    fn three_intents() -> VectorStore {
        VectorStore::new(
            vec![
                vec![1.0, 0.0, 0.0],
                vec![0.0, 1.0, 0.0],
                vec![0.0, 0.0, 1.0],
            ],
            vec!["FLIGHT".into(), "CANCEL".into(), "WEATHER".into()],
        )
        .unwrap()
    }

    #[test]
    fn test_empty_store_query_fails() {
        let store = VectorStore::new(vec![], vec![]).unwrap();
        assert!(store.is_empty());
        assert!(matches!(
            store.nearest(&[1.0, 0.0]),
            Err(VectorError::EmptyStore)
        ));
    }

    #[test]
    fn test_self_similarity() {
        let v = unit(vec![0.2, -0.5, 0.7, 0.1]);
        let store = VectorStore::new(vec![v.clone()], vec!["ONLY".into()]).unwrap();
        let hit = store.nearest(&v).unwrap();
        assert_eq!(hit.index, 0);
        assert!((hit.similarity - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_nearest_picks_best_match() {
        let store = three_intents();
        let query = unit(vec![0.1, 0.9, 0.2]);
        let hit = store.nearest(&query).unwrap();
        assert_eq!(store.label_at(hit.index), Some("CANCEL"));
    }

    #[test]
    fn test_ties_resolve_to_lowest_index() {
        let store = VectorStore::new(
            vec![vec![0.0, 1.0], vec![1.0, 0.0], vec![1.0, 0.0]],
            vec!["A".into(), "B".into(), "C".into()],
        )
        .unwrap();
        let hit = store.nearest(&[1.0, 0.0]).unwrap();
        assert_eq!(hit.index, 1);

        // Equidistant from all three intents
        let store = three_intents();
        let q = unit(vec![1.0, 1.0, 1.0]);
        assert_eq!(store.nearest(&q).unwrap().index, 0);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let err = VectorStore::new(vec![vec![1.0]], vec![]).unwrap_err();
        assert!(matches!(
            err,
            VectorError::LengthMismatch {
                vectors: 1,
                labels: 0
            }
        ));
    }

    #[test]
    fn test_ragged_vectors_rejected() {
        let err = VectorStore::new(
            vec![vec![1.0, 0.0], vec![1.0]],
            vec!["A".into(), "B".into()],
        )
        .unwrap_err();
        assert!(matches!(err, VectorError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_query_dimension_checked() {
        let store = three_intents();
        assert!(matches!(
            store.nearest(&[1.0, 0.0]),
            Err(VectorError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_from_examples_preserves_order() {
        let store = VectorStore::from_examples(vec![
            Example::new(vec![1.0, 0.0], "A"),
            Example::new(vec![0.0, 1.0], "B"),
        ])
        .unwrap();
        assert_eq!(store.labels(), &["A".to_string(), "B".to_string()]);
        assert_eq!(store.vector_at(1), Some(&[0.0f32, 1.0][..]));
        assert_eq!(store.distinct_labels().len(), 2);
    }

    #[test]
    fn test_nearest_matches_brute_force_max() {
        let mut rng = rand::rng();
        let vectors: Vec<Vec<f32>> = (0..50)
            .map(|_| unit((0..16).map(|_| rng.random_range(-1.0..1.0)).collect()))
            .collect();
        let labels = (0..50).map(|i| format!("L{}", i % 5)).collect();
        let store = VectorStore::new(vectors.clone(), labels).unwrap();

        let query = unit((0..16).map(|_| rng.random_range(-1.0..1.0)).collect());
        let hit = store.nearest(&query).unwrap();
        let max = vectors
            .iter()
            .map(|v| cosine_similarity(&query, v))
            .fold(f32::MIN, f32::max);
        assert!((hit.similarity - max).abs() < 1e-6);
        assert!((-1.0..=1.0).contains(&hit.similarity));
    }
}
