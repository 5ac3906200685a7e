use crate::{
    algorithms::matching::ScoreMatrix,
    region::Region,
    types::ViewRotation,
};

/// What a similarity metric knows about the two views being compared
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SimilarityContext {
    /// Rotation of the destination view relative to the source view
    pub rotation_change: ViewRotation,
}

/// Trait for pairwise region similarity scores
pub trait SimilarityMetric: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Score in `[0, 1]`-ish; 0 means "never match"
    fn score(&self, source: &Region, destination: &Region, context: &SimilarityContext) -> f32;
}

/// Trait for turning a score matrix into one-to-one pairs
pub trait RegionMatcher: Send + Sync {
    /// Return `(row, column)` pairs; no row or column appears twice
    fn match_pairs(&self, scores: &ScoreMatrix) -> Vec<(usize, usize)>;
}
