//! Exact nearest-neighbour index under squared Euclidean distance

use std::cmp::Ordering;

use crate::error::{Error, Result};

/// One search hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchHit {
    /// Position of the vector in insertion order
    pub position: usize,
    /// Squared L2 distance to the query
    pub distance: f32,
}

/// Squared L2 distance between two equal-length vectors
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());

    let n = a.len().min(b.len());
    let mut sum = 0.0;
    let mut i = 0;

    // Unrolling 4
    while i + 3 < n {
        let d0 = a[i] - b[i];
        let d1 = a[i + 1] - b[i + 1];
        let d2 = a[i + 2] - b[i + 2];
        let d3 = a[i + 3] - b[i + 3];
        sum += d0 * d0 + d1 * d1 + d2 * d2 + d3 * d3;
        i += 4;
    }

    while i < n {
        let d = a[i] - b[i];
        sum += d * d;
        i += 1;
    }

    sum
}

/// Ascending distance, ties by ascending position
fn rank(a: &SearchHit, b: &SearchHit) -> Ordering {
    a.distance
        .total_cmp(&b.distance)
        .then(a.position.cmp(&b.position))
}

/// Flat (brute-force) vector index
///
/// Vectors are stored contiguously; positions are assigned in insertion
/// order and double as chunk identifiers.
#[derive(Debug, Clone)]
pub struct VectorIndex {
    dimensions: usize,
    data: Vec<f32>,
    len: usize,
}

impl VectorIndex {
    /// Create an empty index for `dimensions`-long vectors
    pub fn with_dimensions(dimensions: usize) -> Self {
        Self {
            dimensions,
            data: Vec::new(),
            len: 0,
        }
    }

    /// Build an index over all `vectors`
    ///
    /// Fails with `EmptyCorpus` for an empty input and with
    /// `DimensionMismatch` when the vectors disagree on length.
    pub fn build(vectors: &[Vec<f32>]) -> Result<Self> {
        let first = vectors.first().ok_or(Error::EmptyCorpus)?;

        let mut index = Self::with_dimensions(first.len());
        index.data.reserve(first.len() * vectors.len());
        for vector in vectors {
            index.add(vector)?;
        }
        Ok(index)
    }

    /// Append a vector, returning its position
    pub fn add(&mut self, vector: &[f32]) -> Result<usize> {
        self.check_dimensions(vector)?;
        self.data.extend_from_slice(vector);
        self.len += 1;
        Ok(self.len - 1)
    }

    /// The `k` nearest vectors to `query`, closest first
    ///
    /// Returns `min(k, len)` hits.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        self.check_dimensions(query)?;

        let k = k.min(self.len);
        if k == 0 {
            return Ok(Vec::new());
        }

        let mut hits: Vec<SearchHit> = self
            .iter()
            .enumerate()
            .map(|(position, vector)| SearchHit {
                position,
                distance: squared_l2(query, vector),
            })
            .collect();

        if k < hits.len() {
            hits.select_nth_unstable_by(k - 1, rank);
            hits.truncate(k);
        }
        hits.sort_unstable_by(rank);

        Ok(hits)
    }

    /// Stored vector at `position`
    pub fn vector(&self, position: usize) -> Option<&[f32]> {
        if position >= self.len {
            return None;
        }
        let start = position * self.dimensions;
        Some(&self.data[start..start + self.dimensions])
    }

    /// Iterate over stored vectors in position order
    pub fn iter(&self) -> impl Iterator<Item = &[f32]> + '_ {
        (0..self.len).filter_map(move |position| self.vector(position))
    }

    /// Number of stored vectors
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the index holds no vectors
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Vector dimensionality
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn check_dimensions(&self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dimensions {
            return Err(Error::DimensionMismatch {
                expected: self.dimensions,
                actual: vector.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions(hits: &[SearchHit]) -> Vec<usize> {
        hits.iter().map(|h| h.position).collect()
    }

    #[test]
    fn test_squared_l2() {
        assert_eq!(squared_l2(&[0.0, 0.0], &[3.0, 4.0]), 25.0);
        let a = [1.0, 2.0, 3.0, 4.0, 5.0];
        let b = [0.0, 0.0, 0.0, 0.0, 0.0];
        assert_eq!(squared_l2(&a, &b), 55.0);
        assert_eq!(squared_l2(&a, &a), 0.0);
    }

    #[test]
    fn test_known_nearest_first() {
        let index = VectorIndex::build(&[
            vec![10.0, 10.0],
            vec![1.0, 1.0],
            vec![-5.0, 2.0],
        ])
        .unwrap();

        let hits = index.search(&[0.9, 1.2], 1).unwrap();
        assert_eq!(positions(&hits), vec![1]);
        assert!((hits[0].distance - 0.05).abs() < 1e-5);
    }

    #[test]
    fn test_k_at_least_n_returns_everything_sorted_with_ties_by_position() {
        let index = VectorIndex::build(&[
            vec![2.0, 0.0],
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![0.0, 2.0],
            vec![-1.0, 0.0],
        ])
        .unwrap();

        let hits = index.search(&[0.0, 0.0], 10).unwrap();
        assert_eq!(positions(&hits), vec![1, 2, 4, 0, 3]);
        assert!(hits.windows(2).all(|w| w[0].distance <= w[1].distance));

        let top3 = index.search(&[0.0, 0.0], 3).unwrap();
        assert_eq!(positions(&top3), vec![1, 2, 4]);
    }

    #[test]
    fn test_k_zero_and_empty_index() {
        let index = VectorIndex::build(&[vec![1.0]]).unwrap();
        assert!(index.search(&[1.0], 0).unwrap().is_empty());

        let empty = VectorIndex::with_dimensions(3);
        assert!(empty.is_empty());
        assert!(empty.search(&[0.0, 0.0, 0.0], 3).unwrap().is_empty());
    }

    #[test]
    fn test_build_errors() {
        assert!(matches!(VectorIndex::build(&[]), Err(Error::EmptyCorpus)));
        assert!(matches!(
            VectorIndex::build(&[vec![1.0, 2.0], vec![1.0]]),
            Err(Error::DimensionMismatch { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_query_dimension_mismatch() {
        let index = VectorIndex::build(&[vec![1.0, 2.0, 3.0]]).unwrap();
        assert!(matches!(
            index.search(&[1.0, 2.0], 1),
            Err(Error::DimensionMismatch { expected: 3, actual: 2 })
        ));
    }

    #[test]
    fn test_incremental_add() {
        let mut index = VectorIndex::build(&[vec![0.0, 0.0]]).unwrap();
        assert_eq!(index.add(&[5.0, 5.0]).unwrap(), 1);
        assert!(index.add(&[5.0]).is_err());
        assert_eq!(index.len(), 2);
        assert_eq!(index.vector(1), Some(&[5.0, 5.0][..]));
        assert_eq!(index.vector(2), None);

        let hits = index.search(&[4.0, 4.0], 1).unwrap();
        assert_eq!(positions(&hits), vec![1]);
    }
}
