//! Ordinal encoding through explicit rank tables.

use crate::config::{OrdinalMapping, UnknownCategoryPolicy};
use crate::error::{PreprocessingError, Result};
use crate::utils::{categorical_series, require_series};
use polars::prelude::*;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Labels of one column that were outside its rank table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLabels {
    pub column: String,
    /// Label -> number of cells holding it.
    pub labels: BTreeMap<String, usize>,
}

/// Outcome of ordinal encoding.
#[derive(Debug, Clone)]
pub struct OrdinalOutcome {
    pub data: DataFrame,
    /// Columns that were encoded, in rank table order.
    pub columns: Vec<String>,
    /// Unknown labels nulled under [`UnknownCategoryPolicy::Null`].
    pub unknown: Vec<UnknownLabels>,
}

/// Replaces labels with their integer rank.
#[derive(Debug, Clone)]
pub struct OrdinalEncoder {
    mappings: Vec<OrdinalMapping>,
    policy: UnknownCategoryPolicy,
}

impl OrdinalEncoder {
    pub fn new(mappings: Vec<OrdinalMapping>, policy: UnknownCategoryPolicy) -> Self {
        Self { mappings, policy }
    }

    /// Encode every configured column as `Int64` ranks.
    ///
    /// Missing cells stay missing. A label outside a rank table either fails
    /// the whole call or becomes missing, depending on the policy.
    pub fn encode(&self, df: &DataFrame) -> Result<OrdinalOutcome> {
        let mut data = df.clone();
        let mut columns = Vec::with_capacity(self.mappings.len());
        let mut unknown = Vec::new();

        for mapping in &self.mappings {
            let (encoded, unknown_labels) = self.encode_column(&data, mapping)?;
            data.replace(&mapping.column, encoded)?;
            columns.push(mapping.column.clone());

            if !unknown_labels.is_empty() {
                warn!(
                    "'{}' has labels outside its rank table, left missing: {:?}",
                    mapping.column, unknown_labels
                );
                unknown.push(UnknownLabels {
                    column: mapping.column.clone(),
                    labels: unknown_labels,
                });
            }
        }

        Ok(OrdinalOutcome {
            data,
            columns,
            unknown,
        })
    }

    fn encode_column(
        &self,
        df: &DataFrame,
        mapping: &OrdinalMapping,
    ) -> Result<(Series, BTreeMap<String, usize>)> {
        let series = require_series(df, &mapping.column)?;
        let strings = categorical_series(series)?;
        let values = strings.str()?;

        let mut unknown_labels: BTreeMap<String, usize> = BTreeMap::new();
        let mut ranks: Vec<Option<i64>> = Vec::with_capacity(values.len());

        for value in values.into_iter() {
            let rank = match value {
                None => None,
                Some(label) => match mapping.rank(label) {
                    Some(rank) => Some(rank),
                    None => match self.policy {
                        UnknownCategoryPolicy::Error => {
                            return Err(PreprocessingError::UnknownCategory {
                                column: mapping.column.clone(),
                                label: label.to_string(),
                            });
                        }
                        UnknownCategoryPolicy::Null => {
                            *unknown_labels.entry(label.to_string()).or_insert(0) += 1;
                            None
                        }
                    },
                },
            };
            ranks.push(rank);
        }

        debug!(
            "Encoded '{}' with ranks {:?}",
            mapping.column, mapping.labels
        );

        Ok((
            Series::new(mapping.column.as_str().into(), ranks),
            unknown_labels,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn motivation_encoder(policy: UnknownCategoryPolicy) -> OrdinalEncoder {
        OrdinalEncoder::new(
            vec![OrdinalMapping::new(
                "Motivation_Level",
                ["Low", "Medium", "High"],
            )],
            policy,
        )
    }

    fn ranks(df: &DataFrame, column: &str) -> Vec<Option<i64>> {
        df.column(column)
            .unwrap()
            .i64()
            .unwrap()
            .into_iter()
            .collect()
    }

    #[test]
    fn test_encode_low_medium_high() {
        let df = df!["Motivation_Level" => ["Low", "Medium", "High"]].unwrap();

        let outcome = motivation_encoder(UnknownCategoryPolicy::Error)
            .encode(&df)
            .unwrap();

        assert_eq!(
            ranks(&outcome.data, "Motivation_Level"),
            vec![Some(0), Some(1), Some(2)]
        );
        assert_eq!(
            outcome.data.column("Motivation_Level").unwrap().dtype(),
            &DataType::Int64
        );
        assert_eq!(outcome.columns, vec!["Motivation_Level".to_string()]);
    }

    #[test]
    fn test_encode_keeps_missing_cells() {
        let df = df!["Motivation_Level" => [Some("High"), None]].unwrap();

        let outcome = motivation_encoder(UnknownCategoryPolicy::Error)
            .encode(&df)
            .unwrap();

        assert_eq!(ranks(&outcome.data, "Motivation_Level"), vec![Some(2), None]);
    }

    #[test]
    fn test_encode_unknown_label_errors() {
        let df = df!["Motivation_Level" => ["Low", "Extreme"]].unwrap();

        let result = motivation_encoder(UnknownCategoryPolicy::Error).encode(&df);

        assert!(matches!(
            result,
            Err(PreprocessingError::UnknownCategory { column, label })
                if column == "Motivation_Level" && label == "Extreme"
        ));
    }

    #[test]
    fn test_encode_unknown_label_nulled() {
        let df = df!["Motivation_Level" => ["Low", "Extreme", "Extreme", "High"]].unwrap();

        let outcome = motivation_encoder(UnknownCategoryPolicy::Null)
            .encode(&df)
            .unwrap();

        assert_eq!(
            ranks(&outcome.data, "Motivation_Level"),
            vec![Some(0), None, None, Some(2)]
        );
        assert_eq!(outcome.unknown.len(), 1);
        assert_eq!(outcome.unknown[0].labels.get("Extreme"), Some(&2));
    }

    #[test]
    fn test_encode_labels_are_case_sensitive() {
        let df = df!["Motivation_Level" => ["low"]].unwrap();

        let result = motivation_encoder(UnknownCategoryPolicy::Error).encode(&df);

        assert!(matches!(
            result,
            Err(PreprocessingError::UnknownCategory { .. })
        ));
    }

    #[test]
    fn test_encode_missing_column() {
        let df = df!["Gender" => ["Male"]].unwrap();

        let result = motivation_encoder(UnknownCategoryPolicy::Error).encode(&df);

        assert!(matches!(
            result,
            Err(PreprocessingError::ColumnNotFound(col)) if col == "Motivation_Level"
        ));
    }

    #[test]
    fn test_encode_preserves_column_position() {
        let df = df![
            "Hours_Studied" => [10i64, 20],
            "Motivation_Level" => ["Low", "High"],
            "Exam_Score" => [60i64, 70],
        ]
        .unwrap();

        let outcome = motivation_encoder(UnknownCategoryPolicy::Error)
            .encode(&df)
            .unwrap();

        let names: Vec<String> = outcome
            .data
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names, vec!["Hours_Studied", "Motivation_Level", "Exam_Score"]);
    }
}
