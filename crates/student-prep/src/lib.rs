//! Student Performance Preprocessing Library
//!
//! Turns the raw student-performance CSV into a fully numeric/boolean table
//! ready for model training, built with Rust and Polars.
//!
//! # Overview
//!
//! The pipeline runs four stages in a fixed order:
//!
//! - **Loading**: Reads the CSV with its header, keeping row and column order
//! - **Outlier Correction**: Clips `Exam_Score` to an upper bound of 100
//! - **Missing Value Imputation**: Fills three categorical columns with their mode
//! - **Categorical Encoding**: Ordinal rank tables for ordered levels, one-hot
//!   indicators (first category dropped) for nominal columns
//!
//! Each stage takes a table and returns a new one; the caller's table is
//! never mutated.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use student_prep::preprocess;
//!
//! let df = preprocess("data/student_performance.csv")?;
//! println!("{:?}", df.shape());
//! ```
//!
//! # Configuration
//!
//! Column lists, rank tables and the score bound live in [`PipelineConfig`].
//! The default describes the student-performance dataset:
//!
//! ```rust,ignore
//! use student_prep::{OrdinalMapping, Pipeline, PipelineConfig, UnknownCategoryPolicy};
//!
//! let config = PipelineConfig::builder()
//!     .score_upper_bound(100.0)
//!     .ordinal_mapping(OrdinalMapping::new("Motivation_Level", ["Low", "Medium", "High"]))
//!     .unknown_category(UnknownCategoryPolicy::Null)
//!     .build()?;
//!
//! let result = Pipeline::builder().config(config).build()?.run("data.csv")?;
//!
//! for step in result.summary.processing_steps() {
//!     println!("- {}", step);
//! }
//! ```

pub mod config;
pub mod encoders;
pub mod error;
pub mod imputers;
pub mod loader;
pub mod pipeline;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use config::{
    ConfigValidationError, OrdinalMapping, PipelineConfig, PipelineConfigBuilder,
    UnknownCategoryPolicy,
};
pub use encoders::{CategoricalEncoder, OneHotEncoder, OrdinalEncoder};
pub use error::{PreprocessingError, Result as PreprocessingResult, ResultExt};
pub use imputers::StatisticalImputer;
pub use loader::CsvLoader;
pub use pipeline::{OutlierHandler, Pipeline, PipelineBuilder, preprocess};
pub use types::{ActionType, PipelineResult, PreprocessingAction, PreprocessingSummary};
