//! Record parser
//!
//! Turns OCR text into [`FinancialRecord`]s. Fields are bound by position:
//!
//! ```text
//! Company, TotalLiabilities, TotalEquity, NetIncome, TotalAssets
//! ```
//!
//! Lines that do not split into exactly five fields are dropped without
//! being reported. A bad number on a five-field line is handled according
//! to [`NumericFailurePolicy`].

use crate::config::NumericFailurePolicy;
use crate::error::PipelineError;
use crate::types::FinancialRecord;
use tracing::{debug, warn};

/// Number of comma-separated fields on a balance-sheet line
pub const FIELD_COUNT: usize = 5;

const NUMERIC_FIELDS: [&str; 4] = [
    "total_liabilities",
    "total_equity",
    "net_income",
    "total_assets",
];

/// Output of parsing one sheet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedSheet {
    /// Records in source line order
    pub records: Vec<FinancialRecord>,
    /// Non-blank lines that produced no record
    pub skipped_lines: usize,
}

/// Parse extracted text into records
pub fn parse_balance_sheet(
    text: &str,
    policy: NumericFailurePolicy,
) -> Result<ParsedSheet, PipelineError> {
    let mut sheet = ParsedSheet::default();

    for (index, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let line_no = index + 1;

        match parse_line(line, line_no) {
            Ok(Some(record)) => sheet.records.push(record),
            Ok(None) => {
                debug!(line = line_no, "skipping line without {} fields", FIELD_COUNT);
                sheet.skipped_lines += 1;
            }
            Err(err) => match policy {
                NumericFailurePolicy::AbortSheet => return Err(err),
                NumericFailurePolicy::SkipLine => {
                    warn!(line = line_no, error = %err, "dropping line with bad number");
                    sheet.skipped_lines += 1;
                }
            },
        }
    }

    Ok(sheet)
}

/// Parse a single line.
///
/// Returns `Ok(None)` when the line has the wrong number of fields.
pub fn parse_line(line: &str, line_no: usize) -> Result<Option<FinancialRecord>, PipelineError> {
    let parts: Vec<&str> = line.split(',').collect();
    if parts.len() != FIELD_COUNT {
        return Ok(None);
    }

    let mut amounts = [0.0f64; 4];
    for ((slot, raw), field) in amounts.iter_mut().zip(&parts[1..]).zip(NUMERIC_FIELDS) {
        let raw = raw.trim();
        *slot = raw.parse().map_err(|_| PipelineError::NumericParse {
            line: line_no,
            field: field.to_string(),
            value: raw.to_string(),
        })?;
    }
    let [total_liabilities, total_equity, net_income, total_assets] = amounts;

    Ok(Some(FinancialRecord {
        company: parts[0].trim().to_string(),
        total_liabilities,
        total_equity,
        net_income,
        total_assets,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIXED: &str = "Acme, 200, 100, 50, 500\nBeta, abc, 100, 50, 500";

    #[test]
    fn test_parse_valid_line() {
        let record = parse_line("  Acme Corp , 200.5, 100 ,50,  500 ", 1)
            .unwrap()
            .unwrap();
        assert_eq!(record.company, "Acme Corp");
        assert_eq!(record.total_liabilities, 200.5);
        assert_eq!(record.total_equity, 100.0);
        assert_eq!(record.net_income, 50.0);
        assert_eq!(record.total_assets, 500.0);
    }

    #[test]
    fn test_parse_accepts_signs_and_exponents() {
        let record = parse_line("Loss Co, 1e3, -250, -12.5, +4000", 1)
            .unwrap()
            .unwrap();
        assert_eq!(record.total_liabilities, 1000.0);
        assert_eq!(record.total_equity, -250.0);
        assert_eq!(record.net_income, -12.5);
        assert_eq!(record.total_assets, 4000.0);
    }

    #[test]
    fn test_wrong_field_count_is_skipped() {
        assert_eq!(parse_line("Acme, 200, 100, 50", 1).unwrap(), None);
        assert_eq!(parse_line("Acme, 200, 100, 50, 500, 9", 1).unwrap(), None);
        assert_eq!(parse_line("Company Total Liabilities", 1).unwrap(), None);
    }

    #[test]
    fn test_sheet_keeps_line_order_and_counts_skips() {
        let text = "BALANCE SHEET 2024\n\nAcme, 200, 100, 50, 500\n   \n\
                    Beta, 10, 20, 5, 20\nfooter, page 1";
        let sheet = parse_balance_sheet(text, NumericFailurePolicy::AbortSheet).unwrap();
        let names: Vec<&str> = sheet.records.iter().map(|r| r.company.as_str()).collect();
        assert_eq!(names, vec!["Acme", "Beta"]);
        // header and footer lines; blank lines are not counted
        assert_eq!(sheet.skipped_lines, 2);
    }

    #[test]
    fn test_crlf_line_endings() {
        let sheet = parse_balance_sheet(
            "Acme, 200, 100, 50, 500\r\nBeta, 10, 20, 5, 20\r\n",
            NumericFailurePolicy::AbortSheet,
        )
        .unwrap();
        assert_eq!(sheet.records.len(), 2);
        assert_eq!(sheet.records[1].total_assets, 20.0);
    }

    #[test]
    fn test_bad_number_aborts_sheet() {
        let err = parse_balance_sheet(MIXED, NumericFailurePolicy::AbortSheet).unwrap_err();
        assert_eq!(
            err,
            PipelineError::NumericParse {
                line: 2,
                field: "total_liabilities".to_string(),
                value: "abc".to_string(),
            }
        );
    }

    #[test]
    fn test_bad_number_skips_line() {
        let sheet = parse_balance_sheet(MIXED, NumericFailurePolicy::SkipLine).unwrap();
        assert_eq!(sheet.records.len(), 1);
        assert_eq!(sheet.records[0].company, "Acme");
        assert_eq!(sheet.skipped_lines, 1);
    }

    #[test]
    fn test_empty_text_yields_no_records() {
        let sheet = parse_balance_sheet("", NumericFailurePolicy::AbortSheet).unwrap();
        assert!(sheet.records.is_empty());
        assert_eq!(sheet.skipped_lines, 0);
    }
}
