//! All-pairs cosine similarity over the feature matrix.
//!
//! ## Algorithm
//! 1. Compute every row's L2 norm once
//! 2. Build column postings (which rows use each term, with counts)
//! 3. For each row i (in parallel), accumulate dot products with every row
//!    j >= i through the postings of i's terms
//! 4. Divide by the norms, then mirror the upper triangle
//!
//! A zero row has similarity 0 with everything, itself included.

use crate::vectorizer::FeatureMatrix;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// N x N symmetric cosine similarity matrix, row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityMatrix {
    size: usize,
    values: Vec<f64>,
}

impl SimilarityMatrix {
    /// Build the full matrix from count vectors.
    pub fn from_features(features: &FeatureMatrix) -> Self {
        let size = features.n_rows();
        let norms: Vec<f64> = features.rows().par_iter().map(|row| row.norm()).collect();

        let mut postings: Vec<Vec<(usize, u32)>> = vec![Vec::new(); features.n_cols()];
        for (row_index, row) in features.rows().iter().enumerate() {
            for (column, count) in row.iter() {
                postings[column].push((row_index, count));
            }
        }

        // upper[i] holds similarities for columns i..size
        let upper: Vec<Vec<f64>> = (0..size)
            .into_par_iter()
            .map(|i| {
                let mut dots = vec![0.0f64; size - i];
                if let Some(row) = features.row(i) {
                    for (column, count) in row.iter() {
                        // postings are in ascending row order
                        let start = postings[column].partition_point(|&(r, _)| r < i);
                        for &(j, other) in &postings[column][start..] {
                            dots[j - i] += count as f64 * other as f64;
                        }
                    }
                }
                dots.iter()
                    .enumerate()
                    .map(|(offset, &dot)| {
                        let j = i + offset;
                        cosine(dot, norms[i], norms[j], i == j)
                    })
                    .collect()
            })
            .collect();

        let mut values = vec![0.0f64; size * size];
        for (i, row) in upper.into_iter().enumerate() {
            for (offset, value) in row.into_iter().enumerate() {
                let j = i + offset;
                values[i * size + j] = value;
                values[j * size + i] = value;
            }
        }

        Self { size, values }
    }

    /// Number of rows (and columns)
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Similarity between movies `i` and `j`
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        if i < self.size && j < self.size {
            Some(self.values[i * self.size + j])
        } else {
            None
        }
    }

    /// Every similarity of movie `i`, in catalog order
    pub fn row(&self, i: usize) -> Option<&[f64]> {
        if i < self.size {
            Some(&self.values[i * self.size..(i + 1) * self.size])
        } else {
            None
        }
    }
}

/// Cosine from a dot product and two norms, clamped to [0, 1].
fn cosine(dot: f64, norm_a: f64, norm_b: f64, diagonal: bool) -> f64 {
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    if diagonal {
        return 1.0;
    }
    (dot / (norm_a * norm_b)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vectorizer::CountVectorizer;

    fn matrix(docs: &[&str]) -> SimilarityMatrix {
        let (_, features) = CountVectorizer::new().fit_transform(docs);
        SimilarityMatrix::from_features(&features)
    }

    #[test]
    fn test_known_cosine() {
        // [1, 1] vs [1, 0] -> 1 / sqrt(2)
        let sim = matrix(&["alpha beta", "alpha"]);
        let expected = 1.0 / 2f64.sqrt();
        assert!((sim.get(0, 1).unwrap() - expected).abs() < 1e-6);
    }

    #[test]
    fn test_identical_rows_are_fully_similar() {
        let sim = matrix(&["space war hero", "hero war space"]);
        assert!((sim.get(0, 1).unwrap() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_disjoint_rows_are_zero() {
        let sim = matrix(&["space war", "love story"]);
        assert_eq!(sim.get(0, 1), Some(0.0));
    }

    #[test]
    fn test_zero_row_is_zero_everywhere() {
        let sim = matrix(&["space war", "the and of", "space"]);
        assert_eq!(sim.get(1, 1), Some(0.0));
        assert_eq!(sim.get(1, 0), Some(0.0));
        assert_eq!(sim.get(0, 1), Some(0.0));
        assert!(sim.row(1).unwrap().iter().all(|v| !v.is_nan()));
    }

    #[test]
    fn test_properties_hold() {
        let docs = [
            "space war hero alien",
            "hero love story",
            "alien space space ship",
            "story story war",
            "the of and",
        ];
        let sim = matrix(&docs);
        assert_eq!(sim.len(), docs.len());

        for i in 0..sim.len() {
            for j in 0..sim.len() {
                let v = sim.get(i, j).unwrap();
                assert!((0.0..=1.0).contains(&v));
                assert!((v - sim.get(j, i).unwrap()).abs() < 1e-9);
            }
        }
        for i in 0..4 {
            assert_eq!(sim.get(i, i), Some(1.0));
        }
    }

    #[test]
    fn test_out_of_bounds() {
        let sim = matrix(&["alpha"]);
        assert_eq!(sim.get(0, 1), None);
        assert!(sim.row(1).is_none());
    }
}
