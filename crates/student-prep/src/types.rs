use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

/// Output of a pipeline run: the processed table and what was done to it.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub data: DataFrame,
    pub summary: PreprocessingSummary,
}

// ============================================================================
// Preprocessing Summary Types
// ============================================================================

/// Human-readable summary of what the pipeline did.
///
/// # Example
///
/// ```rust,ignore
/// let result = Pipeline::builder().build()?.run("student_performance.csv")?;
/// println!(
///     "Processed {} rows in {}ms, {} values imputed",
///     result.summary.rows_after, result.summary.duration_ms, result.summary.values_imputed
/// );
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreprocessingSummary {
    /// Total execution time in milliseconds.
    pub duration_ms: u64,

    /// Number of rows before preprocessing.
    pub rows_before: usize,
    /// Number of rows after preprocessing.
    pub rows_after: usize,

    /// Number of columns before preprocessing.
    pub columns_before: usize,
    /// Number of columns after preprocessing.
    pub columns_after: usize,

    /// Missing cells across the whole table before preprocessing.
    pub missing_values_before: usize,
    /// Missing cells across the whole table after preprocessing.
    pub missing_values_after: usize,

    /// Missing values filled by the imputer.
    pub values_imputed: usize,
    /// Score values clipped to the upper bound.
    pub values_capped: usize,
    /// Ordinal columns replaced by ranks.
    pub ordinal_columns_encoded: usize,
    /// Indicator columns created by one-hot encoding.
    pub indicator_columns_created: usize,

    /// List of actions taken during preprocessing.
    pub actions: Vec<PreprocessingAction>,

    /// Warnings and notes generated during preprocessing.
    pub warnings: Vec<String>,
}

impl PreprocessingSummary {
    /// Create a new empty summary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an action to the summary.
    pub fn add_action(&mut self, action: PreprocessingAction) {
        self.actions.push(action);
    }

    /// Add a warning to the summary.
    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Actions of a given type.
    pub fn actions_of(&self, action_type: ActionType) -> impl Iterator<Item = &PreprocessingAction> {
        self.actions
            .iter()
            .filter(move |a| a.action_type == action_type)
    }

    /// Descriptions of every action, in execution order.
    pub fn processing_steps(&self) -> Vec<String> {
        self.actions.iter().map(|a| a.description.clone()).collect()
    }
}

/// A single action taken during preprocessing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessingAction {
    /// Type of action performed.
    pub action_type: ActionType,
    /// Target of the action (column name or "dataset").
    pub target: String,
    /// Human-readable description of the action.
    pub description: String,
    /// Additional details (e.g., mode used, indicator names).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl PreprocessingAction {
    /// Create a new preprocessing action.
    pub fn new(
        action_type: ActionType,
        target: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            action_type,
            target: target.into(),
            description: description.into(),
            details: None,
        }
    }

    /// Add details to the action.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Types of actions that can be taken during preprocessing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Missing values were imputed.
    ValueImputed,
    /// Outliers were clipped.
    OutlierHandled,
    /// A column was replaced by integer ranks.
    OrdinalEncoded,
    /// A column was expanded into indicator columns.
    OneHotEncoded,
    /// A column was removed from the dataset.
    ColumnRemoved,
}
