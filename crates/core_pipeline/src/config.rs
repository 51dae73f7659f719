//! Runtime configuration for the pipeline

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What to do when a numeric field fails to parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericFailurePolicy {
    /// Reject the whole sheet on the first bad number
    #[default]
    AbortSheet,
    /// Drop only the offending line and keep parsing
    SkipLine,
}

/// What to do when a ratio's denominator is zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DivisionPolicy {
    /// Record the ratio as undefined and exclude it from ranking
    #[default]
    Undefined,
    /// Abort analysis of the sheet
    Fail,
}

/// Configuration for the Tesseract engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrConfig {
    /// Tesseract language code (default: eng)
    pub language: String,
    /// Directory holding traineddata files; `None` uses Tesseract's default
    pub data_path: Option<PathBuf>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            data_path: None,
        }
    }
}

/// Configuration for a pipeline run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub ocr: OcrConfig,
    pub numeric_failure: NumericFailurePolicy,
    pub division: DivisionPolicy,
}
