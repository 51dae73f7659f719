//! Error taxonomy for a single image's trip through the pipeline
//!
//! Every variant aborts the image it was raised for and nothing else;
//! the orchestrator records it in that image's report and moves on.

use crate::types::Ratio;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PipelineError {
    /// The image could not be decoded or the OCR engine rejected it
    #[error("text extraction failed: {message}")]
    Extraction { message: String },

    /// No usable columns were recovered from the sheet
    #[error("missing columns in {sheet}: {}", .missing.join(", "))]
    MissingColumns { sheet: String, missing: Vec<String> },

    /// A numeric field on an otherwise well-formed line did not parse
    #[error("line {line}: {field} is not a number: {value:?}")]
    NumericParse {
        line: usize,
        field: String,
        value: String,
    },

    /// A ratio denominator was zero under `DivisionPolicy::Fail`
    #[error("{ratio} for {company} divides by zero")]
    DivisionByZero { company: String, ratio: Ratio },

    /// Every row has an undefined return on assets
    #[error("no company in {sheet} has a defined return on assets")]
    NoRankableRecords { sheet: String },
}

impl PipelineError {
    pub fn extraction(message: impl Into<String>) -> Self {
        Self::Extraction {
            message: message.into(),
        }
    }
}
