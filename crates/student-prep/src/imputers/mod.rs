//! Imputation module for handling missing values.
//!
//! Categorical columns are filled with their mode.

mod statistical;

pub use statistical::{ColumnImputation, ImputationOutcome, StatisticalImputer};
