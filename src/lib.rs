// THEORY:
// This file is the main entry point for the `skin_vision` library crate. It
// defines the public API exposed to external consumers (the CLI binary and the
// HTTP server crate).
//
// The primary goal is to export the two orchestrators (`AnalysisPipeline` for
// synchronous use, `AnalysisPool` for concurrent use) and the data they produce
// (`SkinReport`, `AnalysisOutcome`, `AnalysisError`) as the high-level interface
// of the engine. The pixel-level building blocks stay reachable under
// `core_modules` and `classifiers` for callers that want a single statistic or
// an intermediate mask.

pub mod classifiers;
pub mod core_modules;
pub mod diagnostics;
pub mod error;
pub mod parallel_pipeline;
pub mod pipeline;

pub use core_modules::pixel_buffer::PixelBuffer;
pub use error::{AnalysisError, Result};
pub use parallel_pipeline::AnalysisPool;
pub use pipeline::{AnalysisOutcome, AnalysisPipeline, PipelineConfig, SkinReport};
