//! One-hot encoding with a dropped reference category.

use crate::error::{PreprocessingError, Result};
use crate::utils::{categorical_series, require_series};
use polars::prelude::*;
use std::collections::BTreeSet;
use tracing::debug;

/// Separator placed between the column name and the label.
pub const DEFAULT_SEPARATOR: &str = "_";

/// Indicator columns produced for one source column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandedColumn {
    pub column: String,
    /// Lexicographically first label; no indicator is created for it.
    pub reference: Option<String>,
    /// Names of the created indicator columns.
    pub indicators: Vec<String>,
}

/// Outcome of one-hot encoding.
#[derive(Debug, Clone)]
pub struct OneHotOutcome {
    pub data: DataFrame,
    pub expanded: Vec<ExpandedColumn>,
}

impl OneHotOutcome {
    /// Total number of indicator columns created.
    pub fn indicator_count(&self) -> usize {
        self.expanded.iter().map(|e| e.indicators.len()).sum()
    }
}

/// Expands nominal columns into boolean indicator columns.
///
/// For a column with k distinct labels, k-1 indicators are created: the
/// labels are sorted lexicographically and the first one is the implicit
/// reference (all indicators false). A row with a missing label also has all
/// indicators false.
///
/// The source columns are removed and the indicators are appended after the
/// remaining columns, grouped by source column in configuration order.
#[derive(Debug, Clone)]
pub struct OneHotEncoder {
    columns: Vec<String>,
    separator: String,
}

impl OneHotEncoder {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn encode(&self, df: &DataFrame) -> Result<OneHotOutcome> {
        let mut indicator_series = Vec::new();
        let mut expanded = Vec::with_capacity(self.columns.len());

        for column in &self.columns {
            let (series, info) = self.expand_column(df, column)?;
            indicator_series.extend(series);
            expanded.push(info);
        }

        let mut data = df.clone();
        for column in &self.columns {
            data = data.drop(column)?;
        }
        for series in indicator_series {
            if data.column(series.name()).is_ok() {
                return Err(PreprocessingError::DuplicateColumn(series.name().to_string()));
            }
            data.with_column(series)?;
        }

        Ok(OneHotOutcome { data, expanded })
    }

    fn expand_column(&self, df: &DataFrame, column: &str) -> Result<(Vec<Series>, ExpandedColumn)> {
        let series = require_series(df, column)?;
        let strings = categorical_series(series)?;
        let values = strings.str()?;

        let categories: BTreeSet<&str> = values.into_iter().flatten().collect();
        let mut categories = categories.into_iter();
        let reference = categories.next().map(str::to_string);

        let mut indicators = Vec::new();
        let mut names = Vec::new();
        for label in categories {
            let name = format!("{}{}{}", column, self.separator, label);
            let flags: Vec<bool> = values.into_iter().map(|v| v == Some(label)).collect();
            indicators.push(Series::new(name.as_str().into(), flags));
            names.push(name);
        }

        debug!(
            "Expanded '{}' into {} indicator columns (reference: {:?})",
            column,
            names.len(),
            reference
        );

        Ok((
            indicators,
            ExpandedColumn {
                column: column.to_string(),
                reference,
                indicators: names,
            },
        ))
    }
}
