use tracing::debug;

use crate::region::Region;
use crate::traits::{RegionMatcher, SimilarityContext, SimilarityMetric};

/// Dense `sources x destinations` similarity scores
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl ScoreMatrix {
    /// Create a new all-zero matrix
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Score every source region against every destination region
    pub fn build(
        sources: &[&Region],
        destinations: &[&Region],
        metric: &dyn SimilarityMetric,
        context: &SimilarityContext,
    ) -> Self {
        let mut matrix = Self::new(sources.len(), destinations.len());
        for (i, source) in sources.iter().enumerate() {
            for (j, destination) in destinations.iter().enumerate() {
                matrix.set(i, j, metric.score(source, destination, context));
            }
        }
        debug!(
            metric = metric.name(),
            rows = matrix.rows,
            cols = matrix.cols,
            "built score matrix"
        );
        matrix
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[row * self.cols + col]
    }

    pub fn set(&mut self, row: usize, col: usize, score: f32) {
        self.data[row * self.cols + col] = score;
    }

    /// Column with the highest positive score in `row`; first wins on ties
    pub fn best_in_row(&self, row: usize) -> Option<usize> {
        Self::argmax((0..self.cols).map(|col| self.get(row, col)))
    }

    /// Row with the highest positive score in `col`; first wins on ties
    pub fn best_in_col(&self, col: usize) -> Option<usize> {
        Self::argmax((0..self.rows).map(|row| self.get(row, col)))
    }

    fn argmax(scores: impl Iterator<Item = f32>) -> Option<usize> {
        let mut best = None;
        let mut best_score = 0.0;
        for (i, score) in scores.enumerate() {
            if score > best_score {
                best = Some(i);
                best_score = score;
            }
        }
        best
    }
}

/// Accepts `(i, j)` only when each is the other's best match
#[derive(Debug, Clone, Copy, Default)]
pub struct MutualBestMatcher;

impl RegionMatcher for MutualBestMatcher {
    fn match_pairs(&self, scores: &ScoreMatrix) -> Vec<(usize, usize)> {
        let best_for_col: Vec<Option<usize>> = (0..scores.cols()).map(|c| scores.best_in_col(c)).collect();
        let pairs: Vec<(usize, usize)> = (0..scores.rows())
            .filter_map(|row| {
                let col = scores.best_in_row(row)?;
                (best_for_col[col] == Some(row)).then_some((row, col))
            })
            .collect();
        debug!(pairs = pairs.len(), "mutual best matching");
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: &[&[f32]]) -> ScoreMatrix {
        let mut m = ScoreMatrix::new(rows.len(), rows[0].len());
        for (i, row) in rows.iter().enumerate() {
            for (j, score) in row.iter().enumerate() {
                m.set(i, j, *score);
            }
        }
        m
    }

    #[test]
    fn test_argmax_ties_and_zero_rows() {
        let m = matrix(&[&[0.5, 0.5], &[0.0, 0.0]]);
        assert_eq!(m.best_in_row(0), Some(0));
        assert_eq!(m.best_in_row(1), None);
        assert_eq!(m.best_in_col(1), Some(0));
    }

    #[test]
    fn test_mutual_best_only() {
        // row 1 prefers col 0, but col 0 prefers row 0
        let m = matrix(&[&[0.9, 0.1, 0.0], &[0.8, 0.7, 0.0], &[0.0, 0.0, 0.0]]);
        let pairs = MutualBestMatcher.match_pairs(&m);
        assert_eq!(pairs, vec![(0, 0)]);

        for (i, j) in pairs {
            assert_eq!(m.best_in_row(i), Some(j));
            assert_eq!(m.best_in_col(j), Some(i));
        }
    }

    #[test]
    fn test_empty_matrix() {
        let m = ScoreMatrix::new(0, 3);
        assert!(MutualBestMatcher.match_pairs(&m).is_empty());
    }
}
