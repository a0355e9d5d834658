//! Pipeline module.
//!
//! This module provides the main preprocessing pipeline and its stages.

mod builder;
pub mod outliers;

pub use builder::{Pipeline, PipelineBuilder, preprocess};
pub use outliers::{ClipOutcome, OutlierHandler};
