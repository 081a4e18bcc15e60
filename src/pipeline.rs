// THEORY:
// The `pipeline` module is the final, top-level API for the entire recognition
// engine. It encapsulates the full staged stack into a single, easy-to-use
// interface: construct a `RecognitionPipeline` with a configuration and a
// plant database, hand it raw RGBA frames, and receive high-level reports
// with ranked candidates.
//
// Analysis is total. Degraded frames degrade the output (an empty ranking,
// `Report::NoPlantDetected`) instead of erroring; `Err` is reserved for
// contract violations such as malformed buffers or an invalid configuration.
// The pipeline itself is immutable once built, so a single instance can be
// shared across frames and across worker tasks.

use crate::core_modules::color_clusterizer::find_clusters;
use crate::core_modules::contour_tracer::trace_contours;
use crate::core_modules::edge_detector::detect_edges;
use crate::core_modules::feature_aggregator::aggregate;
use crate::core_modules::matcher;
use crate::core_modules::texture_analyzer::analyze_texture;
use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

// Re-export key data structures for the public API.
pub use crate::core_modules::feature_aggregator::FeatureDescriptor;
pub use crate::core_modules::matcher::MatchResult;
pub use crate::core_modules::pixel_buffer::{FrameError, OwnedFrame, PixelBuffer};
pub use crate::core_modules::plant_database::{DatabaseError, PlantDatabase, PlantDescriptor};
pub use crate::core_modules::vocabulary::{
    ColorLabel, FlowerShape, FlowerSize, GrowthPattern, LeafMargin, LeafShape, LeafSize,
    LeafTexture, PlantCategory, PlantHeight, StemType,
};

/// Raised when a pipeline is built from an unusable configuration.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(String),
}

/// Configuration for the RecognitionPipeline, allowing for tunable behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Longest frame side above which input is downsampled before analysis.
    pub max_dimension: u32,
    /// Pixel step, in both axes, used when sampling colors for clustering.
    pub sample_stride: u32,
    /// Number of k-means color clusters to fit.
    pub cluster_count: usize,
    /// Lloyd iterations per clustering run.
    pub kmeans_iterations: u32,
    /// Seed for centroid initialization. A fixed seed makes every run over
    /// the same frame reproducible.
    pub kmeans_seed: u64,
    /// Sobel magnitude at or above which a pixel counts as a strong edge.
    pub edge_threshold: f64,
    /// Connected edge regions smaller than this are discarded as noise.
    pub min_contour_size: usize,
    /// Hard cap on pixels traced per region before the trace is cut off.
    pub max_contour_size: usize,
    /// Candidates below this confidence are dropped from the ranking.
    pub min_match_confidence: f64,
    /// Maximum number of ranked matches returned, between 1 and 3.
    pub max_matches: usize,
    /// Substitute a single cue-based default when no candidate clears the
    /// confidence bar.
    pub smart_defaults: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_dimension: 512,
            sample_stride: 4,
            cluster_count: 5,
            kmeans_iterations: 10,
            kmeans_seed: 42,
            edge_threshold: 50.0,
            min_contour_size: 10,
            max_contour_size: 1000,
            min_match_confidence: 0.45,
            max_matches: 3,
            smart_defaults: true,
        }
    }
}

impl PipelineConfig {
    /// Checks the configuration against the ranges the stages assume.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.max_dimension == 0 {
            return Err(PipelineError::InvalidConfig(
                "max_dimension must be at least 1".into(),
            ));
        }
        if self.sample_stride == 0 {
            return Err(PipelineError::InvalidConfig(
                "sample_stride must be at least 1".into(),
            ));
        }
        if self.cluster_count == 0 {
            return Err(PipelineError::InvalidConfig(
                "cluster_count must be at least 1".into(),
            ));
        }
        if !(1..=3).contains(&self.max_matches) {
            return Err(PipelineError::InvalidConfig(
                "max_matches must be between 1 and 3".into(),
            ));
        }
        if self.min_contour_size > self.max_contour_size {
            return Err(PipelineError::InvalidConfig(
                "min_contour_size cannot exceed max_contour_size".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.min_match_confidence) {
            return Err(PipelineError::InvalidConfig(
                "min_match_confidence must lie in [0, 1]".into(),
            ));
        }
        Ok(())
    }
}

/// The primary output of the recognition pipeline for a single frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Report {
    /// Nothing in the frame cleared the matcher's bar.
    NoPlantDetected,
    /// The frame produced a usable descriptor and at least one candidate.
    Recognized {
        descriptor: FeatureDescriptor,
        matches: Vec<MatchResult>,
    },
}

/// The main, top-level struct for the recognition engine.
pub struct RecognitionPipeline {
    config: PipelineConfig,
    database: Arc<PlantDatabase>,
}

impl RecognitionPipeline {
    pub fn new(config: PipelineConfig, database: PlantDatabase) -> Result<Self, PipelineError> {
        Self::with_shared(config, Arc::new(database))
    }

    /// Builds a pipeline around an already-shared database. The worker pool
    /// uses this to hand every worker the same copy.
    pub fn with_shared(
        config: PipelineConfig,
        database: Arc<PlantDatabase>,
    ) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self { config, database })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn database(&self) -> &PlantDatabase {
        &self.database
    }

    /// Runs the extraction stages over a frame without matching. Useful when
    /// the caller wants the descriptor even for frames that match nothing.
    pub fn describe(&self, frame: &PixelBuffer) -> FeatureDescriptor {
        // Stage 0: Normalization
        let scaled = frame.downsample(self.config.max_dimension);
        let frame = match &scaled {
            Some(owned) => owned.view(),
            None => *frame,
        };
        if scaled.is_some() {
            debug!(
                "Pipeline: downsampled input to {}x{}",
                frame.width(),
                frame.height()
            );
        }

        // Stage 1: Color Clustering
        let clusters = find_clusters(&frame, &self.config);

        // Stage 2: Edge Detection
        let edges = detect_edges(&frame, &self.config);

        // Stage 3: Contour Tracing
        let (_, shape) = trace_contours(&edges, &self.config);

        // Stage 4: Texture Analysis
        let texture = analyze_texture(&frame);

        // Stage 5: Feature Aggregation
        aggregate(&clusters, &shape, &edges, &texture, frame.height())
    }

    /// Analyzes one frame end to end and reports ranked candidates.
    pub fn analyze(&self, frame: &PixelBuffer) -> Report {
        let descriptor = self.describe(frame);

        // Stage 6: Database Matching
        let matches = matcher::rank(&descriptor, &self.database, &self.config);
        debug!(
            "Pipeline: quality {:.2}, confidence {:.2}, {} match(es)",
            descriptor.quality,
            descriptor.confidence,
            matches.len()
        );

        if matches.is_empty() {
            Report::NoPlantDetected
        } else {
            Report::Recognized {
                descriptor,
                matches,
            }
        }
    }

    /// Wraps raw RGBA bytes and analyzes them in one call.
    pub fn generate_report(
        &self,
        width: u32,
        height: u32,
        frame_buffer: &[u8],
    ) -> Result<Report, FrameError> {
        let frame = PixelBuffer::new(width, height, frame_buffer)?;
        Ok(self.analyze(&frame))
    }
}
