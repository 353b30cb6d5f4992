//! Exact nearest-neighbour index over catalog embeddings.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("vector has dimension {found}, index expects {expected}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt index file: {0}")]
    Format(#[from] serde_json::Error),
}

/// A search hit: catalog row and squared L2 distance to the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub row: usize,
    pub distance: f32,
}

/// Brute-force squared-L2 index. Rows are numbered in insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatIndex {
    dimension: usize,
    vectors: Vec<Vec<f32>>,
}

impl FlatIndex {
    fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: Vec::new(),
        }
    }

    /// Build an index from a batch, taking the dimension from the first
    /// vector.
    pub fn from_vectors(vectors: Vec<Vec<f32>>) -> Result<Self, IndexError> {
        let dimension = vectors.first().map_or(0, Vec::len);
        let mut index = Self::new(dimension);
        index.add(vectors)?;
        Ok(index)
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Append vectors. Nothing is added if any of them has the wrong size.
    pub fn add(&mut self, vectors: Vec<Vec<f32>>) -> Result<(), IndexError> {
        if let Some(bad) = vectors.iter().find(|v| v.len() != self.dimension) {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                found: bad.len(),
            });
        }
        self.vectors.extend(vectors);
        Ok(())
    }

    /// The `k` nearest rows, closest first. `k` is clamped to the index size.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>, IndexError> {
        if query.len() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                found: query.len(),
            });
        }

        let mut hits: Vec<Neighbor> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(row, v)| Neighbor {
                row,
                distance: squared_l2(query, v),
            })
            .collect();

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance).then(a.row.cmp(&b.row)));
        hits.truncate(k);
        Ok(hits)
    }

    pub async fn save(&self, path: impl AsRef<Path>) -> Result<(), IndexError> {
        let bytes = serde_json::to_vec(self)?;
        tokio::fs::write(path, bytes).await?;
        Ok(())
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self, IndexError> {
        let bytes = tokio::fs::read(path).await?;
        let index: Self = serde_json::from_slice(&bytes)?;
        if let Some(bad) = index.vectors.iter().find(|v| v.len() != index.dimension) {
            return Err(IndexError::DimensionMismatch {
                expected: index.dimension,
                found: bad.len(),
            });
        }
        Ok(index)
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FlatIndex {
        FlatIndex::from_vectors(vec![
            vec![0.0, 0.0],
            vec![1.0, 0.0],
            vec![5.0, 5.0],
            vec![0.0, 2.0],
        ])
        .unwrap()
    }

    #[test]
    fn test_search_orders_by_distance() {
        let hits = sample().search(&[0.9, 0.1], 3).unwrap();
        let rows: Vec<usize> = hits.iter().map(|h| h.row).collect();
        assert_eq!(rows, vec![1, 0, 3]);
        assert!((hits[0].distance - 0.02).abs() < 1e-6);
    }

    #[test]
    fn test_k_larger_than_index() {
        let hits = sample().search(&[0.0, 0.0], 10).unwrap();
        assert_eq!(hits.len(), 4);
    }

    #[test]
    fn test_dimension_mismatch() {
        let mut index = sample();
        assert!(matches!(
            index.search(&[1.0], 1),
            Err(IndexError::DimensionMismatch { expected: 2, found: 1 })
        ));
        assert!(index.add(vec![vec![1.0, 1.0], vec![1.0]]).is_err());
        assert_eq!(index.len(), 4);
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.json");

        let index = sample();
        index.save(&path).await.unwrap();
        let loaded = FlatIndex::load(&path).await.unwrap();

        assert_eq!(loaded, index);
        assert_eq!(loaded.search(&[5.0, 4.0], 1).unwrap()[0].row, 2);
    }

    #[tokio::test]
    async fn test_load_rejects_inconsistent_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.json");
        tokio::fs::write(&path, r#"{"dimension":3,"vectors":[[1.0,2.0]]}"#)
            .await
            .unwrap();

        assert!(matches!(
            FlatIndex::load(&path).await,
            Err(IndexError::DimensionMismatch { .. })
        ));
    }
}
