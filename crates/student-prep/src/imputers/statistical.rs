//! Statistical imputation methods.
//!
//! Fills missing categorical values with the column mode.

use crate::error::{PreprocessingError, Result};
use crate::utils::{categorical_series, require_series, string_mode};
use polars::prelude::*;
use tracing::debug;

/// Mode imputation applied to one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnImputation {
    pub column: String,
    pub mode: String,
    pub values_filled: usize,
}

/// Outcome of imputing a set of columns.
#[derive(Debug, Clone)]
pub struct ImputationOutcome {
    /// Frame with the imputed columns.
    pub data: DataFrame,
    /// One entry per requested column, in request order.
    pub columns: Vec<ColumnImputation>,
}

impl ImputationOutcome {
    /// Total number of cells filled across all columns.
    pub fn values_filled(&self) -> usize {
        self.columns.iter().map(|c| c.values_filled).sum()
    }
}

/// Statistical imputation methods for filling missing values.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Fill the missing values of each column in `columns` with that column's
    /// mode.
    ///
    /// Each column is handled independently. The mode is computed even when a
    /// column has nothing to fill, so an all-missing column is always
    /// reported.
    ///
    /// # Errors
    ///
    /// - [`PreprocessingError::ColumnNotFound`] if a column is absent
    /// - [`PreprocessingError::EmptyColumn`] if a non-empty column has no
    ///   non-missing values
    pub fn impute_mode<S: AsRef<str>>(df: &DataFrame, columns: &[S]) -> Result<ImputationOutcome> {
        let mut data = df.clone();
        let mut imputed = Vec::with_capacity(columns.len());

        for column in columns {
            let column = column.as_ref();
            let (filled, summary) = Self::mode_fill(&data, column)?;
            if let Some(filled) = filled {
                data.replace(column, filled)?;
            }
            imputed.push(summary);
        }

        Ok(ImputationOutcome {
            data,
            columns: imputed,
        })
    }

    /// Compute the mode of `column` and, if it has missing values, a filled
    /// copy of it.
    fn mode_fill(df: &DataFrame, column: &str) -> Result<(Option<Series>, ColumnImputation)> {
        let series = require_series(df, column)?;

        if series.is_empty() {
            return Ok((
                None,
                ColumnImputation {
                    column: column.to_string(),
                    mode: String::new(),
                    values_filled: 0,
                },
            ));
        }

        let strings = categorical_series(series)?;
        let values = strings.str()?;
        let mode = string_mode(values)
            .ok_or_else(|| PreprocessingError::EmptyColumn(column.to_string()))?;

        let missing = values.null_count();
        let summary = ColumnImputation {
            column: column.to_string(),
            mode: mode.clone(),
            values_filled: missing,
        };

        if missing == 0 {
            debug!("'{}' has no missing values (mode: '{}')", column, mode);
            return Ok((None, summary));
        }

        let filled: Vec<&str> = values
            .into_iter()
            .map(|v| v.unwrap_or(mode.as_str()))
            .collect();
        debug!("Filled {} values in '{}' with mode: '{}'", missing, column, mode);

        Ok((Some(Series::new(column.into(), filled)), summary))
    }
}
