// THEORY:
// This file is the main entry point for the `flora_vision` library crate.
// It follows the standard Rust convention of using `lib.rs` to define the public
// API that will be exposed to external consumers (like the gardening app's
// capture loop).
//
// The primary goal is to export the `RecognitionPipeline` and its associated
// data structures (`PipelineConfig`, `Report`, `FeatureDescriptor`, etc.) as
// the clean, high-level interface for the entire recognition engine. All the
// staged internal modules (`core_modules`) are encapsulated behind it, and the
// `parallel_pipeline` adds a pooled front end for callers with many frames in
// flight.

pub mod core_modules;
pub mod pipeline;
pub mod parallel_pipeline;
