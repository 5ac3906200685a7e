pub mod boundary;
pub mod depth;
pub mod distance;
pub mod flood_fill;
pub mod matching;
pub mod resample;
pub mod similarity;

pub use boundary::{Boundary, trace_boundary};
pub use depth::{Ray3, estimate_intersection};
pub use flood_fill::{Component, Labeling, label_components};
pub use matching::{MutualBestMatcher, ScoreMatrix};
pub use similarity::{OverlapSimilarity, ProximitySimilarity, metric_for};
