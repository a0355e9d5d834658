//! Configuration types for the preprocessing pipeline.
//!
//! Column names, rank tables and the score bound are data, not code: the
//! default configuration describes the student-performance dataset, and any
//! other dataset with the same shape of problem can be described by building
//! (or deserializing) a different [`PipelineConfig`].

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Column holding the exam score that gets clipped.
pub const DEFAULT_SCORE_COLUMN: &str = "Exam_Score";

/// Upper bound applied to the score column.
pub const DEFAULT_SCORE_UPPER_BOUND: f64 = 100.0;

/// Categorical columns whose missing values are filled with the mode.
pub const DEFAULT_IMPUTED_COLUMNS: [&str; 3] = [
    "Teacher_Quality",
    "Parental_Education_Level",
    "Distance_from_Home",
];

/// Nominal columns expanded into one-hot indicators.
pub const DEFAULT_NOMINAL_COLUMNS: [&str; 6] = [
    "School_Type",
    "Peer_Influence",
    "Extracurricular_Activities",
    "Internet_Access",
    "Learning_Disabilities",
    "Gender",
];

const LOW_MEDIUM_HIGH: [&str; 3] = ["Low", "Medium", "High"];

/// Ordinal columns with their labels in rank order.
pub const DEFAULT_ORDINAL_MAPPINGS: [(&str, [&str; 3]); 7] = [
    ("Parental_Involvement", LOW_MEDIUM_HIGH),
    ("Access_to_Resources", LOW_MEDIUM_HIGH),
    ("Motivation_Level", LOW_MEDIUM_HIGH),
    ("Family_Income", LOW_MEDIUM_HIGH),
    ("Teacher_Quality", LOW_MEDIUM_HIGH),
    (
        "Parental_Education_Level",
        ["High School", "College", "Postgraduate"],
    ),
    ("Distance_from_Home", ["Near", "Moderate", "Far"]),
];

/// Textual markers read as missing in addition to empty fields.
pub const DEFAULT_NULL_VALUES: [&str; 4] = ["NA", "N/A", "NaN", "null"];

/// What to do with an ordinal label that is not in the column's rank table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum UnknownCategoryPolicy {
    /// Fail with `UnknownCategory`
    #[default]
    Error,
    /// Leave the cell missing and log a warning
    Null,
}

/// Rank table for one ordinal column.
///
/// The rank of a label is its position in `labels`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrdinalMapping {
    pub column: String,
    pub labels: Vec<String>,
}

impl OrdinalMapping {
    pub fn new<I, S>(column: impl Into<String>, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            column: column.into(),
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    /// Rank of `label`, or `None` if it is outside the table.
    pub fn rank(&self, label: &str) -> Option<i64> {
        self.labels
            .iter()
            .position(|l| l == label)
            .map(|idx| idx as i64)
    }
}

/// Configuration for the preprocessing pipeline.
///
/// Use [`PipelineConfig::builder()`] to create a configuration with a fluent
/// API, or [`PipelineConfig::default()`] for the student-performance dataset.
///
/// # Example
///
/// ```rust,ignore
/// use student_prep::config::{PipelineConfig, UnknownCategoryPolicy};
///
/// let config = PipelineConfig::builder()
///     .score_upper_bound(20.0)
///     .unknown_category(UnknownCategoryPolicy::Null)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Numeric column clipped by the outlier corrector.
    /// Default: "Exam_Score"
    pub score_column: String,

    /// Values of `score_column` above this bound are replaced by it.
    /// Default: 100.0
    pub score_upper_bound: f64,

    /// Categorical columns whose missing values are replaced by the mode.
    pub imputed_columns: Vec<String>,

    /// Ordinal columns and their rank tables.
    pub ordinal_mappings: Vec<OrdinalMapping>,

    /// Nominal columns expanded into one-hot indicator columns.
    pub nominal_columns: Vec<String>,

    /// Handling of ordinal labels missing from a rank table.
    /// Default: Error
    pub unknown_category: UnknownCategoryPolicy,

    /// Field delimiter of the input file.
    /// Default: ','
    pub delimiter: char,

    /// Extra field values read as missing.
    pub null_values: Vec<String>,

    /// Rows scanned to infer column types. `None` scans the whole file.
    /// Default: None
    pub infer_schema_length: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            score_column: DEFAULT_SCORE_COLUMN.to_string(),
            score_upper_bound: DEFAULT_SCORE_UPPER_BOUND,
            imputed_columns: DEFAULT_IMPUTED_COLUMNS
                .iter()
                .map(|c| c.to_string())
                .collect(),
            ordinal_mappings: DEFAULT_ORDINAL_MAPPINGS
                .iter()
                .map(|(column, labels)| OrdinalMapping::new(*column, *labels))
                .collect(),
            nominal_columns: DEFAULT_NOMINAL_COLUMNS
                .iter()
                .map(|c| c.to_string())
                .collect(),
            unknown_category: UnknownCategoryPolicy::default(),
            delimiter: ',',
            null_values: DEFAULT_NULL_VALUES.iter().map(|v| v.to_string()).collect(),
            infer_schema_length: None,
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Load and validate a configuration from a JSON file.
    ///
    /// Fields absent from the file keep their default values.
    pub fn from_json_file(path: impl AsRef<Path>) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: PipelineConfig = serde_json::from_str(&content)?;
        config
            .validate()
            .map_err(|e| crate::error::PreprocessingError::InvalidConfig(e.to_string()))?;
        Ok(config)
    }

    /// Look up the rank table for an ordinal column.
    pub fn ordinal_mapping(&self, column: &str) -> Option<&OrdinalMapping> {
        self.ordinal_mappings.iter().find(|m| m.column == column)
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.score_column.trim().is_empty() {
            return Err(ConfigValidationError::EmptyColumnName("score_column".to_string()));
        }

        if !self.score_upper_bound.is_finite() {
            return Err(ConfigValidationError::InvalidBound(self.score_upper_bound));
        }

        if !self.delimiter.is_ascii() {
            return Err(ConfigValidationError::InvalidDelimiter(self.delimiter));
        }

        let mut seen_imputed = HashSet::new();
        for column in &self.imputed_columns {
            if column.trim().is_empty() {
                return Err(ConfigValidationError::EmptyColumnName(
                    "imputed_columns".to_string(),
                ));
            }
            if !seen_imputed.insert(column.as_str()) {
                return Err(ConfigValidationError::DuplicateColumn {
                    field: "imputed_columns".to_string(),
                    column: column.clone(),
                });
            }
        }

        let mut seen_ordinal = HashSet::new();
        for mapping in &self.ordinal_mappings {
            if mapping.column.trim().is_empty() {
                return Err(ConfigValidationError::EmptyColumnName(
                    "ordinal_mappings".to_string(),
                ));
            }
            if !seen_ordinal.insert(mapping.column.as_str()) {
                return Err(ConfigValidationError::DuplicateColumn {
                    field: "ordinal_mappings".to_string(),
                    column: mapping.column.clone(),
                });
            }
            if mapping.labels.is_empty() {
                return Err(ConfigValidationError::EmptyRankTable(mapping.column.clone()));
            }
            let mut seen = HashSet::new();
            for label in &mapping.labels {
                if !seen.insert(label.as_str()) {
                    return Err(ConfigValidationError::DuplicateLabel {
                        column: mapping.column.clone(),
                        label: label.clone(),
                    });
                }
            }
        }

        let mut seen_nominal = HashSet::new();
        for column in &self.nominal_columns {
            if column.trim().is_empty() {
                return Err(ConfigValidationError::EmptyColumnName(
                    "nominal_columns".to_string(),
                ));
            }
            if !seen_nominal.insert(column.as_str()) {
                return Err(ConfigValidationError::DuplicateColumn {
                    field: "nominal_columns".to_string(),
                    column: column.clone(),
                });
            }
            if self.ordinal_mapping(column).is_some() {
                return Err(ConfigValidationError::ConflictingEncoding(column.clone()));
            }
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Empty column name in '{0}'")]
    EmptyColumnName(String),

    #[error("Invalid score upper bound: {0} (must be finite)")]
    InvalidBound(f64),

    #[error("Invalid delimiter: {0:?} (must be a single ASCII character)")]
    InvalidDelimiter(char),

    #[error("Rank table for '{0}' has no labels")]
    EmptyRankTable(String),

    #[error("Label '{label}' appears twice in the rank table for '{column}'")]
    DuplicateLabel { column: String, label: String },

    #[error("Column '{0}' is configured as both ordinal and nominal")]
    ConflictingEncoding(String),

    #[error("Column '{column}' appears twice in '{field}'")]
    DuplicateColumn { field: String, column: String },
}

/// Builder for [`PipelineConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    score_column: Option<String>,
    score_upper_bound: Option<f64>,
    imputed_columns: Option<Vec<String>>,
    ordinal_mappings: Option<Vec<OrdinalMapping>>,
    nominal_columns: Option<Vec<String>>,
    unknown_category: Option<UnknownCategoryPolicy>,
    delimiter: Option<char>,
    null_values: Option<Vec<String>>,
    infer_schema_length: Option<Option<usize>>,
}

impl PipelineConfigBuilder {
    /// Set the column clipped by the outlier corrector.
    pub fn score_column(mut self, column: impl Into<String>) -> Self {
        self.score_column = Some(column.into());
        self
    }

    /// Set the upper bound for the score column.
    pub fn score_upper_bound(mut self, bound: f64) -> Self {
        self.score_upper_bound = Some(bound);
        self
    }

    /// Replace the set of mode-imputed columns.
    pub fn imputed_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.imputed_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Replace all ordinal rank tables.
    pub fn ordinal_mappings(mut self, mappings: Vec<OrdinalMapping>) -> Self {
        self.ordinal_mappings = Some(mappings);
        self
    }

    /// Add or replace the rank table of a single ordinal column.
    pub fn ordinal_mapping(mut self, mapping: OrdinalMapping) -> Self {
        let mappings = self.ordinal_mappings.get_or_insert_with(|| {
            PipelineConfig::default().ordinal_mappings
        });
        match mappings.iter_mut().find(|m| m.column == mapping.column) {
            Some(existing) => *existing = mapping,
            None => mappings.push(mapping),
        }
        self
    }

    /// Replace the set of one-hot encoded columns.
    pub fn nominal_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.nominal_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set how unknown ordinal labels are handled.
    pub fn unknown_category(mut self, policy: UnknownCategoryPolicy) -> Self {
        self.unknown_category = Some(policy);
        self
    }

    /// Set the field delimiter of the input file.
    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Replace the textual missing-value markers.
    pub fn null_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.null_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Limit schema inference to the first `rows` rows.
    pub fn infer_schema_length(mut self, rows: Option<usize>) -> Self {
        self.infer_schema_length = Some(rows);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PipelineConfig` or an error if validation fails.
    pub fn build(self) -> Result<PipelineConfig, ConfigValidationError> {
        let defaults = PipelineConfig::default();
        let config = PipelineConfig {
            score_column: self.score_column.unwrap_or(defaults.score_column),
            score_upper_bound: self.score_upper_bound.unwrap_or(defaults.score_upper_bound),
            imputed_columns: self.imputed_columns.unwrap_or(defaults.imputed_columns),
            ordinal_mappings: self.ordinal_mappings.unwrap_or(defaults.ordinal_mappings),
            nominal_columns: self.nominal_columns.unwrap_or(defaults.nominal_columns),
            unknown_category: self.unknown_category.unwrap_or_default(),
            delimiter: self.delimiter.unwrap_or(defaults.delimiter),
            null_values: self.null_values.unwrap_or(defaults.null_values),
            infer_schema_length: self
                .infer_schema_length
                .unwrap_or(defaults.infer_schema_length),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.score_column, "Exam_Score");
        assert_eq!(config.score_upper_bound, 100.0);
        assert_eq!(config.imputed_columns.len(), 3);
        assert_eq!(config.ordinal_mappings.len(), 7);
        assert_eq!(config.nominal_columns.len(), 6);
        assert_eq!(config.unknown_category, UnknownCategoryPolicy::Error);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_rank_tables() {
        let config = PipelineConfig::default();
        let motivation = config.ordinal_mapping("Motivation_Level").unwrap();
        assert_eq!(motivation.rank("Low"), Some(0));
        assert_eq!(motivation.rank("Medium"), Some(1));
        assert_eq!(motivation.rank("High"), Some(2));
        assert_eq!(motivation.rank("low"), None);

        let education = config.ordinal_mapping("Parental_Education_Level").unwrap();
        assert_eq!(education.rank("High School"), Some(0));
        assert_eq!(education.rank("Postgraduate"), Some(2));

        let distance = config.ordinal_mapping("Distance_from_Home").unwrap();
        assert_eq!(distance.rank("Far"), Some(2));
    }

    #[test]
    fn test_builder_defaults() {
        let config = PipelineConfig::builder().build().unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn test_builder_custom_values() {
        let config = PipelineConfig::builder()
            .score_column("Final_Grade")
            .score_upper_bound(20.0)
            .imputed_columns(["Teacher_Quality"])
            .nominal_columns(["Gender"])
            .unknown_category(UnknownCategoryPolicy::Null)
            .delimiter(';')
            .build()
            .unwrap();

        assert_eq!(config.score_column, "Final_Grade");
        assert_eq!(config.score_upper_bound, 20.0);
        assert_eq!(config.imputed_columns, vec!["Teacher_Quality".to_string()]);
        assert_eq!(config.nominal_columns, vec!["Gender".to_string()]);
        assert_eq!(config.unknown_category, UnknownCategoryPolicy::Null);
        assert_eq!(config.delimiter, ';');
    }

    #[test]
    fn test_builder_replaces_single_mapping() {
        let config = PipelineConfig::builder()
            .ordinal_mapping(OrdinalMapping::new(
                "Motivation_Level",
                ["None", "Low", "Medium", "High"],
            ))
            .build()
            .unwrap();

        assert_eq!(config.ordinal_mappings.len(), 7);
        let motivation = config.ordinal_mapping("Motivation_Level").unwrap();
        assert_eq!(motivation.rank("High"), Some(3));
    }

    #[test]
    fn test_validation_invalid_bound() {
        let result = PipelineConfig::builder()
            .score_upper_bound(f64::NAN)
            .build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidBound(_)
        ));
    }

    #[test]
    fn test_validation_duplicate_label() {
        let result = PipelineConfig::builder()
            .ordinal_mappings(vec![OrdinalMapping::new("Level", ["Low", "Low"])])
            .build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::DuplicateLabel { .. }
        ));
    }

    #[test]
    fn test_validation_empty_rank_table() {
        let result = PipelineConfig::builder()
            .ordinal_mappings(vec![OrdinalMapping::new("Level", Vec::<String>::new())])
            .build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::EmptyRankTable(_)
        ));
    }

    #[test]
    fn test_validation_conflicting_encoding() {
        let result = PipelineConfig::builder()
            .nominal_columns(["Gender", "Motivation_Level"])
            .build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::ConflictingEncoding(col) if col == "Motivation_Level"
        ));
    }

    #[test]
    fn test_validation_duplicate_columns() {
        let result = PipelineConfig::builder()
            .nominal_columns(["Gender", "School_Type", "Gender"])
            .build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::DuplicateColumn { field, column }
                if field == "nominal_columns" && column == "Gender"
        ));

        let result = PipelineConfig::builder()
            .imputed_columns(["Teacher_Quality", "Teacher_Quality"])
            .build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::DuplicateColumn { field, .. } if field == "imputed_columns"
        ));

        let result = PipelineConfig::builder()
            .ordinal_mappings(vec![
                OrdinalMapping::new("Family_Income", ["Low", "Medium", "High"]),
                OrdinalMapping::new("Family_Income", ["Low", "High"]),
            ])
            .build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::DuplicateColumn { field, column }
                if field == "ordinal_mappings" && column == "Family_Income"
        ));
    }

    #[test]
    fn test_config_serialization_round_trip() {
        let config = PipelineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: PipelineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_partial_config_from_json() {
        let json = r#"{
            "score_upper_bound": 20.0,
            "unknown_category": "Null",
            "nominal_columns": ["Gender"]
        }"#;

        let config: PipelineConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.score_upper_bound, 20.0);
        assert_eq!(config.unknown_category, UnknownCategoryPolicy::Null);
        assert_eq!(config.nominal_columns, vec!["Gender".to_string()]);
        // Unspecified fields fall back to the defaults
        assert_eq!(config.score_column, "Exam_Score");
        assert_eq!(config.ordinal_mappings.len(), 7);
    }
}
