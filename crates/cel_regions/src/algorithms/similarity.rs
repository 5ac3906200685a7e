use std::sync::Arc;

use cel_raster::Vec2;
use tracing::warn;

use crate::config::{BOUNDARY_REJECT_DISTANCE, COLOR_REJECT_DISTANCE, SimilarityKind};
use crate::region::Region;
use crate::traits::{SimilarityContext, SimilarityMetric};

/// Bounding-box proximity times a size ratio term.
///
/// The proximity falloff is `exp(-w_y * |dy|) * exp(-w_x * |dx|)` on
/// bbox-center pixel distances. Both weights are 0.5, raised to 1.0 on the
/// screen axis the rotation change does not move things along.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProximitySimilarity;

impl SimilarityMetric for ProximitySimilarity {
    fn name(&self) -> &'static str {
        "proximity"
    }

    fn score(&self, source: &Region, destination: &Region, context: &SimilarityContext) -> f32 {
        if source.color().distance(destination.color()) > COLOR_REJECT_DISTANCE {
            return 0.0;
        }

        let change = context.rotation_change;
        let weight_x = if change.pitch != 0.0 { 1.0 } else { 0.5 };
        let weight_y = if change.yaw != 0.0 { 1.0 } else { 0.5 };
        let d = (source.center() - destination.center()).abs();
        let proximity = (-d.y * weight_y).exp() * (-d.x * weight_x).exp();

        let (ra, rb) = (source.area() as f32, destination.area() as f32);
        let mean = (ra + rb) * 0.5;
        if mean <= 0.0 {
            warn!(source = source.id(), destination = destination.id(), "scoring zero-area regions");
            return 0.0;
        }
        let size = (-(ra - rb).abs() / mean).exp();

        proximity * size
    }
}

/// Mask overlap or size/compactness agreement, for regions whose
/// boundaries come within [`BOUNDARY_REJECT_DISTANCE`] of each other
#[derive(Debug, Clone, Copy, Default)]
pub struct OverlapSimilarity;

impl OverlapSimilarity {
    /// Pixels covered by both masks, compared at equal coordinates
    pub fn overlap(a: &Region, b: &Region) -> usize {
        a.map()
            .enumerate()
            .filter(|(p, px)| px.is_painted() && b.contains(*p))
            .count()
    }

    /// Smallest distance between the two boundaries in normalized image
    /// coordinates; 0 when the masks overlap
    pub fn boundary_distance(a: &Region, b: &Region) -> f32 {
        if Self::overlap(a, b) > 0 {
            return 0.0;
        }
        let norm = |r: &Region| Vec2::new(r.width() as f32, r.height() as f32);
        let (na, nb) = (norm(a), norm(b));
        let mut best = f32::INFINITY;
        for pa in a.boundary() {
            let pa = pa.as_vec2() / na;
            for pb in b.boundary() {
                best = best.min(pa.distance(pb.as_vec2() / nb));
            }
        }
        best
    }
}

impl SimilarityMetric for OverlapSimilarity {
    fn name(&self) -> &'static str {
        "overlap"
    }

    fn score(&self, source: &Region, destination: &Region, _context: &SimilarityContext) -> f32 {
        if source.color().distance(destination.color()) > COLOR_REJECT_DISTANCE {
            return 0.0;
        }
        if Self::boundary_distance(source, destination) > BOUNDARY_REJECT_DISTANCE {
            return 0.0;
        }

        let (ra, rb) = (source.area() as f32, destination.area() as f32);
        let min_r = ra.min(rb);
        if min_r <= 0.0 {
            warn!(source = source.id(), destination = destination.id(), "scoring zero-area regions");
            return 0.0;
        }
        let left = Self::overlap(source, destination) as f32 / min_r;

        let (pa, pb) = (source.perimeter(), destination.perimeter());
        let right = if pa > 0.0 && pb > 0.0 {
            let (ha, hb) = (ra / pa, rb / pb);
            (-(ra - rb).abs() / min_r - (ha - hb).abs() / ha.min(hb)).exp()
        } else {
            0.0
        };

        left.max(right)
    }
}

/// The metric configured by `kind`
pub fn metric_for(kind: SimilarityKind) -> Arc<dyn SimilarityMetric> {
    match kind {
        SimilarityKind::Proximity => Arc::new(ProximitySimilarity),
        SimilarityKind::Overlap => Arc::new(OverlapSimilarity),
    }
}
