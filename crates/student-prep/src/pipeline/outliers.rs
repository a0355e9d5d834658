//! Outlier handling.
//!
//! Clips a numeric column to an upper bound. The input frame is never
//! modified; a new frame with the clipped column is returned.

use crate::error::{PreprocessingError, Result};
use crate::utils::{DtypeCategory, get_dtype_category, require_series};
use polars::prelude::*;
use tracing::debug;

/// Outcome of clipping a column.
#[derive(Debug, Clone)]
pub struct ClipOutcome {
    /// Frame with the clipped column.
    pub data: DataFrame,
    /// Number of values that were above the bound.
    pub values_capped: usize,
}

/// Handles outlier detection and treatment.
pub struct OutlierHandler;

impl OutlierHandler {
    /// Replace every value of `column` above `upper_bound` with the bound.
    ///
    /// Values at or below the bound, and missing values, pass through
    /// unchanged. Integer columns stay integer; the bound is floored for them
    /// so a clipped value never exceeds it.
    ///
    /// # Errors
    ///
    /// - [`PreprocessingError::ColumnNotFound`] if `column` is absent
    /// - [`PreprocessingError::InvalidColumnType`] if it is not numeric
    pub fn clip_upper(df: &DataFrame, column: &str, upper_bound: f64) -> Result<ClipOutcome> {
        let series = require_series(df, column)?;

        if series.is_empty() {
            return Ok(ClipOutcome {
                data: df.clone(),
                values_capped: 0,
            });
        }

        let dtype = series.dtype().clone();
        let (clipped, values_capped) = match get_dtype_category(&dtype) {
            DtypeCategory::Integer => {
                let cap = upper_bound.floor() as i64;
                let cast_result = series.cast(&DataType::Int64)?;
                let values = cast_result.i64()?;
                let values_capped = values
                    .into_iter()
                    .filter(|v| v.map(|val| val > cap).unwrap_or(false))
                    .count();
                let clipped = values
                    .apply(|v| v.map(|val| val.min(cap)))
                    .into_series()
                    .cast(&dtype)?;
                (clipped, values_capped)
            }
            DtypeCategory::Float => {
                let cast_result = series.cast(&DataType::Float64)?;
                let values = cast_result.f64()?;
                let values_capped = values
                    .into_iter()
                    .filter(|v| v.map(|val| val > upper_bound).unwrap_or(false))
                    .count();
                let clipped = values
                    .apply(|v| v.map(|val| if val > upper_bound { upper_bound } else { val }))
                    .into_series()
                    .cast(&dtype)?;
                (clipped, values_capped)
            }
            _ => {
                return Err(PreprocessingError::InvalidColumnType {
                    column: column.to_string(),
                    expected: "numeric".to_string(),
                    found: dtype.to_string(),
                });
            }
        };

        let mut data = df.clone();
        data.replace(column, clipped.with_name(column.into()))?;

        debug!(
            "Capped {} values in '{}' at {}",
            values_capped, column, upper_bound
        );

        Ok(ClipOutcome {
            data,
            values_capped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn scores(df: &DataFrame) -> Vec<Option<i64>> {
        df.column("Exam_Score")
            .unwrap()
            .i64()
            .unwrap()
            .into_iter()
            .collect()
    }

    #[test]
    fn test_clip_scores_above_bound() {
        let df = df!["Exam_Score" => [60i64, 70, 101, 105, 80]].unwrap();

        let outcome = OutlierHandler::clip_upper(&df, "Exam_Score", 100.0).unwrap();

        assert_eq!(
            scores(&outcome.data),
            vec![Some(60), Some(70), Some(100), Some(100), Some(80)]
        );
        assert_eq!(outcome.values_capped, 2);
    }

    #[test]
    fn test_clip_preserves_valid_scores() {
        let df = df!["Exam_Score" => [55i64, 67, 80, 95, 100]].unwrap();

        let outcome = OutlierHandler::clip_upper(&df, "Exam_Score", 100.0).unwrap();

        assert_eq!(
            scores(&outcome.data),
            vec![Some(55), Some(67), Some(80), Some(95), Some(100)]
        );
        assert_eq!(outcome.values_capped, 0);
    }

    #[test]
    fn test_clip_keeps_integer_dtype() {
        let df = df!["Exam_Score" => [60i64, 105]].unwrap();

        let outcome = OutlierHandler::clip_upper(&df, "Exam_Score", 100.0).unwrap();

        assert_eq!(
            outcome.data.column("Exam_Score").unwrap().dtype(),
            &DataType::Int64
        );
    }

    #[test]
    fn test_clip_float_column() {
        let df = df!["Exam_Score" => [Some(99.5), Some(100.5), None]].unwrap();

        let outcome = OutlierHandler::clip_upper(&df, "Exam_Score", 100.0).unwrap();

        let values: Vec<Option<f64>> = outcome
            .data
            .column("Exam_Score")
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(values, vec![Some(99.5), Some(100.0), None]);
    }

    #[test]
    fn test_clip_empty_dataframe() {
        let df = df!["Exam_Score" => Vec::<i64>::new()].unwrap();

        let outcome = OutlierHandler::clip_upper(&df, "Exam_Score", 100.0).unwrap();

        assert_eq!(outcome.data.height(), 0);
        assert_eq!(outcome.values_capped, 0);
    }

    #[test]
    fn test_clip_does_not_modify_input() {
        let df = df!["Exam_Score" => [60i64, 70, 105]].unwrap();
        let original = scores(&df);

        let outcome = OutlierHandler::clip_upper(&df, "Exam_Score", 100.0).unwrap();

        assert_eq!(scores(&df), original);
        assert_eq!(scores(&outcome.data), vec![Some(60), Some(70), Some(100)]);
    }

    #[test]
    fn test_clip_leaves_other_columns() {
        let df = df![
            "Hours_Studied" => [10i64, 200],
            "Exam_Score" => [60i64, 105],
        ]
        .unwrap();

        let outcome = OutlierHandler::clip_upper(&df, "Exam_Score", 100.0).unwrap();

        let before = df.column("Hours_Studied").unwrap().as_materialized_series();
        let after = outcome.data.column("Hours_Studied").unwrap().as_materialized_series();
        assert!(after.equals(before));
    }

    #[test]
    fn test_clip_missing_column() {
        let df = df!["other" => [1i64, 2, 3]].unwrap();

        let result = OutlierHandler::clip_upper(&df, "Exam_Score", 100.0);

        assert!(matches!(
            result,
            Err(PreprocessingError::ColumnNotFound(col)) if col == "Exam_Score"
        ));
    }

    #[test]
    fn test_clip_non_numeric_column() {
        let df = df!["Exam_Score" => ["high", "low"]].unwrap();

        let result = OutlierHandler::clip_upper(&df, "Exam_Score", 100.0);

        assert!(matches!(
            result,
            Err(PreprocessingError::InvalidColumnType { .. })
        ));
    }
}
