// THEORY:
// This file wires together the internal stages of the recognition engine.
// The modules are listed in pipeline order: raw pixel primitives first,
// then the four feature-extraction stages, then the aggregation and
// matching layers that turn stage outputs into ranked candidates.
//
// Every stage is a stateless free function over plain data. The only
// stateful pieces are the `PlantDatabase` (loaded once, read many) and
// the pipeline facade in `crate::pipeline` that owns the configuration.

pub mod pixel;
pub mod pixel_buffer;
pub mod vocabulary;
pub mod color_clusterizer;
pub mod edge_detector;
pub mod contour_tracer;
pub mod texture_analyzer;
pub mod feature_aggregator;
pub mod plant_database;
pub mod matcher;
