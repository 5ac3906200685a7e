pub mod builder;

use std::sync::Arc;

use cel_raster::orientation::rgb_grid_from_image;
use cel_raster::{Grid, Rgb};
use image::RgbImage;
use tracing::info_span;

use crate::{
    config::SessionConfig,
    error::{RegionError, Result},
    frame::Frame,
    session::Session,
    traits::{RegionMatcher, SimilarityMetric},
    types::View,
};

/// Turns a front and a side illustration into a matched [`Session`]:
/// segmentation of both views, mutual-best matching, then depth estimation
pub struct Pipeline {
    config: SessionConfig,
    metric: Arc<dyn SimilarityMetric>,
    matcher: Arc<dyn RegionMatcher>,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> builder::PipelineBuilder {
        builder::PipelineBuilder::new()
    }

    /// Create a new pipeline with the given components
    pub fn new(
        config: SessionConfig,
        metric: Arc<dyn SimilarityMetric>,
        matcher: Arc<dyn RegionMatcher>,
    ) -> Self {
        Self {
            config,
            metric,
            matcher,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Process both views through the entire pipeline
    pub fn process(&self, front: Grid<Rgb>, side: Grid<Rgb>) -> Result<Session> {
        let _span = info_span!("pipeline", metric = self.metric.name()).entered();
        if !front.same_size(&side) {
            return Err(RegionError::DimensionMismatch {
                expected_width: front.width(),
                expected_height: front.height(),
                width: side.width(),
                height: side.height(),
            });
        }

        // Step 1: Segment both views
        let front = Frame::segment(View::Front, front, &self.config)?;
        let side = Frame::segment(View::Side, side, &self.config)?;

        // Step 2: Link every mutual best pair
        let mut session = Session::new(
            self.config.clone(),
            front,
            side,
            Arc::clone(&self.metric),
            Arc::clone(&self.matcher),
        )?;
        session.match_regions()?;

        Ok(session)
    }

    /// Process two top-down RGB images
    pub fn process_images(&self, front: &RgbImage, side: &RgbImage) -> Result<Session> {
        if front.is_empty() || side.is_empty() {
            return Err(RegionError::EmptyRaster);
        }
        self.process(rgb_grid_from_image(front)?, rgb_grid_from_image(side)?)
    }

    /// Get information about the pipeline configuration
    pub fn info(&self) -> String {
        format!(
            "Pipeline: {} similarity, line art absorption {}, front {:?}, side {:?}",
            self.metric.name(),
            if self.config.absorb_line_art { "on" } else { "off" },
            self.config.front_rotation,
            self.config.side_rotation,
        )
    }
}
