//! Categorical encoding.
//!
//! Ordinal columns become integer ranks, nominal columns become one-hot
//! indicator columns. The two touch disjoint columns, so the order in which
//! they run does not change the result; ordinal encoding runs first.

mod onehot;
mod ordinal;

pub use onehot::{DEFAULT_SEPARATOR, ExpandedColumn, OneHotEncoder, OneHotOutcome};
pub use ordinal::{OrdinalEncoder, OrdinalOutcome, UnknownLabels};

use crate::config::PipelineConfig;
use crate::error::Result;
use polars::prelude::*;
use tracing::debug;

/// Outcome of the full encoding stage.
#[derive(Debug, Clone)]
pub struct EncodingOutcome {
    pub data: DataFrame,
    pub ordinal_columns: Vec<String>,
    pub unknown: Vec<UnknownLabels>,
    pub expanded: Vec<ExpandedColumn>,
}

/// Runs ordinal and one-hot encoding with injected rank tables and column
/// lists.
#[derive(Debug, Clone)]
pub struct CategoricalEncoder {
    ordinal: OrdinalEncoder,
    one_hot: OneHotEncoder,
}

impl CategoricalEncoder {
    pub fn new(ordinal: OrdinalEncoder, one_hot: OneHotEncoder) -> Self {
        Self { ordinal, one_hot }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(
            OrdinalEncoder::new(config.ordinal_mappings.clone(), config.unknown_category),
            OneHotEncoder::new(config.nominal_columns.clone()),
        )
    }

    pub fn encode(&self, df: &DataFrame) -> Result<EncodingOutcome> {
        let ordinal = self.ordinal.encode(df)?;
        let one_hot = self.one_hot.encode(&ordinal.data)?;

        debug!(
            "Encoded {} ordinal columns, expanded {} nominal columns into {} indicators",
            ordinal.columns.len(),
            one_hot.expanded.len(),
            one_hot.indicator_count()
        );

        Ok(EncodingOutcome {
            data: one_hot.data,
            ordinal_columns: ordinal.columns,
            unknown: ordinal.unknown,
            expanded: one_hot.expanded,
        })
    }
}
