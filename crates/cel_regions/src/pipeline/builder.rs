use std::sync::Arc;

use cel_raster::Rgb;

use crate::{
    algorithms::{MutualBestMatcher, metric_for},
    config::{SessionConfig, SimilarityKind},
    pipeline::Pipeline,
    traits::{RegionMatcher, SimilarityMetric},
    types::ViewRotation,
};

/// Builder for creating pipelines with a fluent API
pub struct PipelineBuilder {
    config: SessionConfig,
    metric: Option<Arc<dyn SimilarityMetric>>,
    matcher: Option<Arc<dyn RegionMatcher>>,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            config: SessionConfig::default(),
            metric: None,
            matcher: None,
        }
    }

    /// Start from an existing config (replaces all settings)
    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn background_color(mut self, color: Rgb) -> Self {
        self.config.background_color = color;
        self
    }

    pub fn absorb_line_art(mut self, absorb: bool) -> Self {
        self.config.absorb_line_art = absorb;
        self
    }

    /// Use one of the built-in similarity metrics
    pub fn similarity(mut self, kind: SimilarityKind) -> Self {
        self.config.similarity = kind;
        self.metric = None;
        self
    }

    /// Set a custom similarity metric (replaces any existing one)
    pub fn set_similarity<M>(mut self, metric: M) -> Self
    where
        M: SimilarityMetric + 'static,
    {
        self.metric = Some(Arc::new(metric));
        self
    }

    /// Set the matcher (replaces any existing one)
    pub fn set_matcher<M>(mut self, matcher: M) -> Self
    where
        M: RegionMatcher + 'static,
    {
        self.matcher = Some(Arc::new(matcher));
        self
    }

    pub fn front_rotation(mut self, rotation: ViewRotation) -> Self {
        self.config.front_rotation = rotation.clamped();
        self
    }

    pub fn side_rotation(mut self, rotation: ViewRotation) -> Self {
        self.config.side_rotation = rotation.clamped();
        self
    }

    pub fn brush_radius(mut self, radius: u32) -> Self {
        self.config.brush_radius = radius.max(1);
        self
    }

    /// Build the pipeline with default components if not specified
    pub fn build(self) -> Pipeline {
        let metric = self.metric.unwrap_or_else(|| metric_for(self.config.similarity));
        let matcher = self
            .matcher
            .unwrap_or_else(|| Arc::new(MutualBestMatcher));
        Pipeline::new(self.config, metric, matcher)
    }

    /// Build a pipeline with default settings for the given background
    pub fn build_simple(background: Rgb) -> Pipeline {
        Self::new().background_color(background).build()
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
