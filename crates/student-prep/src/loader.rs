//! CSV loading and saving.
//!
//! Reads a delimited text file with a header row into a [`DataFrame`],
//! keeping column order, row order and row count exactly as in the file.

use crate::config::PipelineConfig;
use crate::error::{PreprocessingError, Result, ResultExt};
use polars::prelude::*;
use std::fs::{self, File};
use std::io::{ErrorKind, Seek, SeekFrom};
use std::path::Path;
use tracing::{debug, info};

/// Loads delimited text files into DataFrames.
#[derive(Debug, Clone)]
pub struct CsvLoader {
    delimiter: u8,
    null_values: Vec<String>,
    infer_schema_length: Option<usize>,
}

impl Default for CsvLoader {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}

impl CsvLoader {
    /// Create a loader using the parsing settings of `config`.
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            // validated as ASCII by PipelineConfig::validate
            delimiter: config.delimiter as u8,
            null_values: config.null_values.clone(),
            infer_schema_length: config.infer_schema_length,
        }
    }

    /// Load a CSV file.
    ///
    /// The file handle is owned by the reader and closed when this returns,
    /// on success and on every error path.
    ///
    /// # Errors
    ///
    /// - [`PreprocessingError::NotFound`] if `path` does not exist
    /// - [`PreprocessingError::Io`] if it cannot be opened
    /// - [`PreprocessingError::Parse`] if it is not a valid delimited table
    pub fn load(&self, path: impl AsRef<Path>) -> Result<DataFrame> {
        let path = path.as_ref();
        info!("Loading dataset from: {}", path.display());

        let mut file = File::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => PreprocessingError::NotFound(path.to_path_buf()),
            _ => PreprocessingError::Io(e),
        })?;

        self.check_field_counts(&file, path)?;
        file.seek(SeekFrom::Start(0))?;

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(self.infer_schema_length)
            .with_parse_options(self.parse_options())
            .into_reader_with_file_handle(file)
            .finish()
            .map_err(|e| {
                debug!("CSV parsing failed: {}", e);
                PreprocessingError::Parse {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                }
            })?;

        info!("Dataset loaded successfully: {:?}", df.shape());
        Ok(df)
    }

    /// Reject records whose field count differs from the header.
    ///
    /// The polars reader pads short rows with nulls instead of failing.
    fn check_field_counts(&self, file: &File, path: &Path) -> Result<()> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(self.delimiter)
            .quote(b'"')
            .flexible(false)
            .from_reader(file);

        for record in reader.byte_records() {
            record.map_err(|e| {
                debug!("CSV record check failed: {}", e);
                PreprocessingError::Parse {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                }
            })?;
        }
        Ok(())
    }

    /// Write `df` as CSV with a header row, using the loader's delimiter.
    ///
    /// Parent directories are created as needed.
    pub fn write(&self, df: &mut DataFrame, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut file = File::create(path)?;

        CsvWriter::new(&mut file)
            .include_header(true)
            .with_separator(self.delimiter)
            .with_quote_char(b'"')
            .finish(df)
            .context(format!("Writing {}", path.display()))?;

        info!("Dataset saved: {}", path.display());
        Ok(())
    }

    fn parse_options(&self) -> CsvParseOptions {
        let null_values = if self.null_values.is_empty() {
            None
        } else {
            Some(NullValues::AllColumns(
                self.null_values.iter().map(|v| v.as_str().into()).collect(),
            ))
        };

        CsvParseOptions::default()
            .with_separator(self.delimiter)
            .with_quote_char(Some(b'"'))
            .with_null_values(null_values)
    }
}
