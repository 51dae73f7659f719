//! Core types for the finsheet pipeline
//!
//! Everything here lives for exactly one run: it is built from the
//! uploaded images, handed to a display adapter, and dropped.

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for one analysis run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

/// Columns every sheet must provide, in reporting order
pub const REQUIRED_COLUMNS: [&str; 5] = [
    "total_liabilities",
    "total_equity",
    "net_income",
    "total_assets",
    "company",
];

/// One balance-sheet line:
/// `Company, TotalLiabilities, TotalEquity, NetIncome, TotalAssets`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialRecord {
    pub company: String,
    pub total_liabilities: f64,
    pub total_equity: f64,
    pub net_income: f64,
    pub total_assets: f64,
}

/// The derived ratios
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ratio {
    /// total_liabilities / total_equity
    #[serde(rename = "debt_to_equity_ratio")]
    DebtToEquity,
    /// net_income / total_assets
    #[serde(rename = "return_on_assets")]
    ReturnOnAssets,
    /// total_assets / total_liabilities
    #[serde(rename = "current_ratio")]
    Current,
}

impl Ratio {
    pub fn as_str(&self) -> &'static str {
        match self {
            Ratio::DebtToEquity => "debt_to_equity_ratio",
            Ratio::ReturnOnAssets => "return_on_assets",
            Ratio::Current => "current_ratio",
        }
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record together with its ratios.
///
/// A ratio is `None` when it is undefined (zero denominator, or NaN inputs).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioRow {
    #[serde(flatten)]
    pub record: FinancialRecord,
    pub debt_to_equity_ratio: Option<f64>,
    pub return_on_assets: Option<f64>,
    pub current_ratio: Option<f64>,
}

/// Analysis of one sheet: every row plus the best one by return on assets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetAnalysis {
    pub sheet: String,
    pub rows: Vec<RatioRow>,
    pub best: RatioRow,
}

/// The strongest company across every analysed sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallBest {
    /// Label of the image the row came from
    pub sheet: String,
    pub row: RatioRow,
}

/// How one image's processing ended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum ImageOutcome {
    Analyzed(SheetAnalysis),
    Failed(PipelineError),
}

/// Everything a display adapter needs to show for one image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageReport {
    /// Upload name (usually the file name)
    pub label: String,
    /// SHA-256 of the decoded pixels; absent for text-only input or undecodable images
    pub content_hash: Option<String>,
    /// Raw OCR output; absent when extraction never produced text
    pub extracted_text: Option<String>,
    /// Records recovered by the parser, in line order
    pub records: Vec<FinancialRecord>,
    /// Non-blank lines the parser dropped
    pub skipped_lines: usize,
    pub outcome: ImageOutcome,
}

impl ImageReport {
    pub fn analysis(&self) -> Option<&SheetAnalysis> {
        match &self.outcome {
            ImageOutcome::Analyzed(analysis) => Some(analysis),
            ImageOutcome::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&PipelineError> {
        match &self.outcome {
            ImageOutcome::Analyzed(_) => None,
            ImageOutcome::Failed(err) => Some(err),
        }
    }
}

/// Result of a whole run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub id: RunId,
    pub images: Vec<ImageReport>,
    pub overall_best: Option<OverallBest>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acme_row() -> RatioRow {
        RatioRow {
            record: FinancialRecord {
                company: "Acme".to_string(),
                total_liabilities: 200.0,
                total_equity: 100.0,
                net_income: 50.0,
                total_assets: 500.0,
            },
            debt_to_equity_ratio: Some(2.0),
            return_on_assets: Some(0.1),
            current_ratio: Some(2.5),
        }
    }

    #[test]
    fn test_run_id_creation() {
        let id1 = RunId::new();
        let id2 = RunId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_ratio_row_serializes_flat() {
        let json = serde_json::to_value(acme_row()).unwrap();
        assert_eq!(json["company"], "Acme");
        assert_eq!(json["total_assets"], 500.0);
        assert_eq!(json["return_on_assets"], 0.1);
    }

    #[test]
    fn test_undefined_ratio_serializes_as_null() {
        let mut row = acme_row();
        row.debt_to_equity_ratio = None;
        let json = serde_json::to_value(row).unwrap();
        assert!(json["debt_to_equity_ratio"].is_null());
    }

    #[test]
    fn test_image_outcome_serialization() {
        let outcome = ImageOutcome::Failed(PipelineError::extraction("blank"));
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains("\"status\":\"failed\""));
        let back: ImageOutcome = serde_json::from_str(&json).unwrap();
        assert_eq!(back, outcome);
    }

    #[test]
    fn test_image_report_accessors() {
        let row = acme_row();
        let report = ImageReport {
            label: "sheet.png".to_string(),
            content_hash: None,
            extracted_text: None,
            records: vec![row.record.clone()],
            skipped_lines: 0,
            outcome: ImageOutcome::Analyzed(SheetAnalysis {
                sheet: "sheet.png".to_string(),
                rows: vec![row.clone()],
                best: row,
            }),
        };
        assert!(report.analysis().is_some());
        assert!(report.error().is_none());
    }
}
