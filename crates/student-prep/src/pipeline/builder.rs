//! Main preprocessing pipeline module.
//!
//! This module provides the core `Pipeline` struct and builder for
//! orchestrating the preprocessing workflow:
//! load → clip outliers → impute → encode.

use crate::config::{ConfigValidationError, PipelineConfig};
use crate::encoders::CategoricalEncoder;
use crate::error::Result;
use crate::imputers::StatisticalImputer;
use crate::loader::CsvLoader;
use crate::pipeline::outliers::OutlierHandler;
use crate::types::{ActionType, PipelineResult, PreprocessingAction, PreprocessingSummary};
use crate::utils::total_null_count;
use polars::prelude::*;
use std::path::Path;
use std::time::Instant;
use tracing::{error, info};

/// The main preprocessing pipeline.
///
/// A pipeline holds only immutable configuration, so one instance can be
/// shared between threads that process different files.
///
/// # Example
///
/// ```rust,ignore
/// use student_prep::{Pipeline, PipelineConfig, UnknownCategoryPolicy};
///
/// let result = Pipeline::builder()
///     .config(
///         PipelineConfig::builder()
///             .unknown_category(UnknownCategoryPolicy::Null)
///             .build()?,
///     )
///     .build()?
///     .run("data/student_performance.csv")?;
///
/// println!("{:?}", result.data.shape());
/// ```
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    loader: CsvLoader,
    encoder: CategoricalEncoder,
}

static_assertions::assert_impl_all!(Pipeline: Send, Sync);

impl Default for Pipeline {
    fn default() -> Self {
        Self::from_validated(PipelineConfig::default())
    }
}

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    fn from_validated(config: PipelineConfig) -> Self {
        Self {
            loader: CsvLoader::from_config(&config),
            encoder: CategoricalEncoder::from_config(&config),
            config,
        }
    }

    /// The configuration this pipeline runs with.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Load a CSV file and run every preprocessing stage on it.
    pub fn run(&self, path: impl AsRef<Path>) -> Result<PipelineResult> {
        let start_time = Instant::now();
        let df = self.loader.load(path)?;
        let mut result = self.process(&df)?;
        result.summary.duration_ms = start_time.elapsed().as_millis() as u64;
        Ok(result)
    }

    /// Run the transform stages on an in-memory table.
    ///
    /// `df` is left untouched; the processed table is returned in the result.
    pub fn process(&self, df: &DataFrame) -> Result<PipelineResult> {
        self.process_internal(df).inspect_err(|e| {
            error!("Pipeline error: {}", e);
        })
    }

    fn process_internal(&self, df: &DataFrame) -> Result<PipelineResult> {
        let start_time = Instant::now();
        info!("Starting preprocessing pipeline...");

        let mut summary = PreprocessingSummary::new();
        summary.rows_before = df.height();
        summary.columns_before = df.width();
        summary.missing_values_before = total_null_count(df);

        // Step 1: Outlier correction
        info!("Step 1: Clipping '{}'...", self.config.score_column);
        let clipped = OutlierHandler::clip_upper(
            df,
            &self.config.score_column,
            self.config.score_upper_bound,
        )?;
        summary.values_capped = clipped.values_capped;
        summary.add_action(PreprocessingAction::new(
            ActionType::OutlierHandled,
            &self.config.score_column,
            format!(
                "Capped {} values in '{}' at {}",
                clipped.values_capped, self.config.score_column, self.config.score_upper_bound
            ),
        ));

        // Step 2: Missing value imputation
        info!("Step 2: Imputing missing categorical values...");
        let imputed = StatisticalImputer::impute_mode(&clipped.data, &self.config.imputed_columns)?;
        summary.values_imputed = imputed.values_filled();
        for column in &imputed.columns {
            if column.values_filled > 0 {
                summary.add_action(
                    PreprocessingAction::new(
                        ActionType::ValueImputed,
                        &column.column,
                        format!(
                            "Filled {} missing values in '{}' with mode",
                            column.values_filled, column.column
                        ),
                    )
                    .with_details(format!("mode: {}", column.mode)),
                );
            }
        }

        // Step 3: Categorical encoding
        info!("Step 3: Encoding categorical columns...");
        let encoded = self.encoder.encode(&imputed.data)?;
        summary.ordinal_columns_encoded = encoded.ordinal_columns.len();
        for column in &encoded.ordinal_columns {
            summary.add_action(PreprocessingAction::new(
                ActionType::OrdinalEncoded,
                column,
                format!("Replaced '{}' labels with ranks", column),
            ));
        }
        for unknown in &encoded.unknown {
            let labels: Vec<&str> = unknown.labels.keys().map(String::as_str).collect();
            summary.add_warning(format!(
                "'{}' has labels outside its rank table, left missing: {}",
                unknown.column,
                labels.join(", ")
            ));
        }
        for expanded in &encoded.expanded {
            summary.indicator_columns_created += expanded.indicators.len();
            let mut action = PreprocessingAction::new(
                ActionType::OneHotEncoded,
                &expanded.column,
                format!(
                    "Expanded '{}' into {} indicator columns",
                    expanded.column,
                    expanded.indicators.len()
                ),
            );
            if let Some(reference) = &expanded.reference {
                action = action.with_details(format!(
                    "reference: {}; indicators: {}",
                    reference,
                    expanded.indicators.join(", ")
                ));
            }
            summary.add_action(action);
            summary.add_action(PreprocessingAction::new(
                ActionType::ColumnRemoved,
                &expanded.column,
                format!("Removed original column '{}'", expanded.column),
            ));
        }

        let data = encoded.data;
        summary.rows_after = data.height();
        summary.columns_after = data.width();
        summary.missing_values_after = total_null_count(&data);
        summary.duration_ms = start_time.elapsed().as_millis() as u64;

        info!(
            "Preprocessing complete: {:?} -> {:?}",
            (summary.rows_before, summary.columns_before),
            (summary.rows_after, summary.columns_after)
        );

        Ok(PipelineResult { data, summary })
    }
}

/// Load and preprocess a CSV file with the default student-performance
/// configuration.
pub fn preprocess(path: impl AsRef<Path>) -> Result<DataFrame> {
    Pipeline::default().run(path).map(|result| result.data)
}

/// Builder for creating a [`Pipeline`] instance.
///
/// Use [`Pipeline::builder()`] to get started.
#[derive(Debug, Default)]
pub struct PipelineBuilder {
    config: Option<PipelineConfig>,
}

impl PipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<Pipeline, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;
        Ok(Pipeline::from_validated(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UnknownCategoryPolicy;
    use crate::error::PreprocessingError;
    use pretty_assertions::assert_eq;

    fn small_frame() -> DataFrame {
        df![
            "Teacher_Quality" => [Some("Low"), None, Some("High")],
            "Gender" => ["Male", "Female", "Male"],
            "Exam_Score" => [60i64, 70, 105],
        ]
        .unwrap()
    }

    fn small_config() -> PipelineConfig {
        PipelineConfig::builder()
            .imputed_columns(["Teacher_Quality"])
            .ordinal_mappings(vec![crate::config::OrdinalMapping::new(
                "Teacher_Quality",
                ["Low", "Medium", "High"],
            )])
            .nominal_columns(["Gender"])
            .build()
            .unwrap()
    }

    #[test]
    fn test_pipeline_builder_default() {
        let pipeline = Pipeline::builder().build().unwrap();
        assert_eq!(pipeline.config(), &PipelineConfig::default());
    }

    #[test]
    fn test_pipeline_builder_rejects_invalid_config() {
        let mut config = PipelineConfig::default();
        config.score_upper_bound = f64::INFINITY;

        let result = Pipeline::builder().config(config).build();

        assert!(matches!(result, Err(ConfigValidationError::InvalidBound(_))));
    }

    #[test]
    fn test_process_small_frame() {
        let pipeline = Pipeline::builder().config(small_config()).build().unwrap();

        let result = pipeline.process(&small_frame()).unwrap();

        let quality: Vec<Option<i64>> = result
            .data
            .column("Teacher_Quality")
            .unwrap()
            .i64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(quality, vec![Some(0), Some(0), Some(2)]);

        let scores: Vec<Option<i64>> = result
            .data
            .column("Exam_Score")
            .unwrap()
            .i64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(scores, vec![Some(60), Some(70), Some(100)]);

        assert!(result.data.column("Gender").is_err());
        assert!(result.data.column("Gender_Male").is_ok());
    }

    #[test]
    fn test_process_summary() {
        let pipeline = Pipeline::builder().config(small_config()).build().unwrap();

        let summary = pipeline.process(&small_frame()).unwrap().summary;

        assert_eq!(summary.rows_before, 3);
        assert_eq!(summary.rows_after, 3);
        assert_eq!(summary.columns_before, 3);
        assert_eq!(summary.columns_after, 3);
        assert_eq!(summary.values_capped, 1);
        assert_eq!(summary.values_imputed, 1);
        assert_eq!(summary.missing_values_before, 1);
        assert_eq!(summary.missing_values_after, 0);
        assert_eq!(summary.ordinal_columns_encoded, 1);
        assert_eq!(summary.indicator_columns_created, 1);
        assert_eq!(summary.actions_of(ActionType::ColumnRemoved).count(), 1);
        assert!(summary.warnings.is_empty());
    }

    #[test]
    fn test_process_does_not_modify_input() {
        let pipeline = Pipeline::builder().config(small_config()).build().unwrap();
        let df = small_frame();
        let before = df.clone();

        let _ = pipeline.process(&df).unwrap();

        assert!(df.equals_missing(&before));
    }

    #[test]
    fn test_process_unknown_label_policy() {
        let df = df![
            "Teacher_Quality" => ["Low", "Excellent"],
            "Gender" => ["Male", "Female"],
            "Exam_Score" => [60i64, 70],
        ]
        .unwrap();

        let strict = Pipeline::builder().config(small_config()).build().unwrap();
        assert!(matches!(
            strict.process(&df),
            Err(PreprocessingError::UnknownCategory { .. })
        ));

        let mut lenient_config = small_config();
        lenient_config.unknown_category = UnknownCategoryPolicy::Null;
        let lenient = Pipeline::builder().config(lenient_config).build().unwrap();
        let result = lenient.process(&df).unwrap();
        assert_eq!(result.data.column("Teacher_Quality").unwrap().null_count(), 1);
        assert_eq!(result.summary.warnings.len(), 1);
        assert!(result.summary.warnings[0].contains("Excellent"));
    }

    #[test]
    fn test_process_missing_score_column() {
        let df = df!["Teacher_Quality" => ["Low"], "Gender" => ["Male"]].unwrap();
        let pipeline = Pipeline::builder().config(small_config()).build().unwrap();

        assert!(matches!(
            pipeline.process(&df),
            Err(PreprocessingError::ColumnNotFound(col)) if col == "Exam_Score"
        ));
    }
}
