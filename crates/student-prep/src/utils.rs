//! Shared utilities for the preprocessing stages.
//!
//! Column lookup, dtype checks and small Series statistics used by more than
//! one stage live here so every stage reports schema problems the same way.

use crate::error::{PreprocessingError, Result};
use polars::prelude::*;
use std::collections::HashMap;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Category of a data type for preprocessing purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DtypeCategory {
    /// Signed or unsigned integers
    Integer,
    /// Floating point numbers
    Float,
    /// Boolean type
    Boolean,
    /// String/text type
    String,
    /// Other/unknown types
    Other,
}

/// Check if a DataType is an integer type.
#[inline]
pub fn is_integer_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

/// Check if a DataType is a float type.
#[inline]
pub fn is_float_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Float32 | DataType::Float64)
}

/// Get the category of a DataType.
pub fn get_dtype_category(dtype: &DataType) -> DtypeCategory {
    if is_integer_dtype(dtype) {
        DtypeCategory::Integer
    } else if is_float_dtype(dtype) {
        DtypeCategory::Float
    } else if matches!(dtype, DataType::Boolean) {
        DtypeCategory::Boolean
    } else if matches!(dtype, DataType::String | DataType::Categorical(_, _)) {
        DtypeCategory::String
    } else {
        DtypeCategory::Other
    }
}

// =============================================================================
// Column Access Utilities
// =============================================================================

/// Fetch a column as a materialized Series, or fail with `ColumnNotFound`.
pub fn require_series<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    df.column(name)
        .map(|column| column.as_materialized_series())
        .map_err(|_| PreprocessingError::ColumnNotFound(name.to_string()))
}

/// View a categorical column as strings.
///
/// String columns are returned as-is. A column with no non-missing values is
/// inferred by the CSV reader as some other type, so null-only columns are
/// cast. Anything else is rejected: a categorical stage never silently
/// stringifies numbers.
pub fn categorical_series(series: &Series) -> Result<Series> {
    match series.dtype() {
        DataType::String => Ok(series.clone()),
        DataType::Categorical(_, _) => Ok(series.cast(&DataType::String)?),
        _ if series.null_count() == series.len() => Ok(series.cast(&DataType::String)?),
        other => Err(PreprocessingError::InvalidColumnType {
            column: series.name().to_string(),
            expected: "String".to_string(),
            found: other.to_string(),
        }),
    }
}

// =============================================================================
// Series Statistics Utilities
// =============================================================================

/// Calculate the mode (most frequent non-null value) of a string column.
///
/// Ties are broken by first occurrence in row order, so the result is
/// deterministic for a given column.
pub fn string_mode(values: &StringChunked) -> Option<String> {
    // label -> (count, first row index)
    let mut value_counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (idx, val) in values.into_iter().enumerate() {
        if let Some(val) = val {
            value_counts.entry(val).or_insert((0, idx)).0 += 1;
        }
    }

    value_counts
        .into_iter()
        .max_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
            count_a.cmp(count_b).then(first_b.cmp(first_a))
        })
        .map(|(val, _)| val.to_string())
}

/// Total number of null cells across all columns.
pub fn total_null_count(df: &DataFrame) -> usize {
    df.get_columns().iter().map(|col| col.null_count()).sum()
}

// =============================================================================
// Tests
// =============================================================================
