//! Ratio analyzer
//!
//! Pure functions: records in, ratios and the best company out.

use crate::config::DivisionPolicy;
use crate::error::PipelineError;
use crate::types::{FinancialRecord, Ratio, RatioRow, SheetAnalysis, REQUIRED_COLUMNS};

/// Columns the record set fails to provide.
///
/// Fields are positional, so a sheet either has all of them or, when no
/// line parsed, none of them.
pub fn missing_columns(records: &[FinancialRecord]) -> Vec<String> {
    if records.is_empty() {
        REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect()
    } else {
        Vec::new()
    }
}

/// Analyze one sheet's records
pub fn analyze_balance_sheet(
    records: &[FinancialRecord],
    sheet: &str,
    policy: DivisionPolicy,
) -> Result<SheetAnalysis, PipelineError> {
    let missing = missing_columns(records);
    if !missing.is_empty() {
        return Err(PipelineError::MissingColumns {
            sheet: sheet.to_string(),
            missing,
        });
    }

    let rows = records
        .iter()
        .map(|record| compute_ratios(record, policy))
        .collect::<Result<Vec<_>, _>>()?;

    let best = select_best(rows.iter(), |row| row.return_on_assets)
        .cloned()
        .ok_or_else(|| PipelineError::NoRankableRecords {
            sheet: sheet.to_string(),
        })?;

    Ok(SheetAnalysis {
        sheet: sheet.to_string(),
        rows,
        best,
    })
}

/// Derive the three ratios for a record
pub fn compute_ratios(
    record: &FinancialRecord,
    policy: DivisionPolicy,
) -> Result<RatioRow, PipelineError> {
    let ratio = |numerator: f64, denominator: f64, which: Ratio| {
        divide(numerator, denominator, policy).ok_or_else(|| PipelineError::DivisionByZero {
            company: record.company.clone(),
            ratio: which,
        })
    };

    Ok(RatioRow {
        debt_to_equity_ratio: ratio(
            record.total_liabilities,
            record.total_equity,
            Ratio::DebtToEquity,
        )?,
        return_on_assets: ratio(record.net_income, record.total_assets, Ratio::ReturnOnAssets)?,
        current_ratio: ratio(
            record.total_assets,
            record.total_liabilities,
            Ratio::Current,
        )?,
        record: record.clone(),
    })
}

/// `None` when the division is refused, `Some(None)` when it is undefined
fn divide(numerator: f64, denominator: f64, policy: DivisionPolicy) -> Option<Option<f64>> {
    if denominator == 0.0 {
        return match policy {
            DivisionPolicy::Undefined => Some(None),
            DivisionPolicy::Fail => None,
        };
    }
    let value = numerator / denominator;
    Some((!value.is_nan()).then_some(value))
}

/// Pick the item with the largest key; the first one wins a tie.
///
/// Items whose key is `None` are never selected.
pub fn select_best<T, I, F>(items: I, key: F) -> Option<T>
where
    I: IntoIterator<Item = T>,
    F: Fn(&T) -> Option<f64>,
{
    let mut best: Option<(T, f64)> = None;
    for item in items {
        let Some(value) = key(&item) else {
            continue;
        };
        match &best {
            Some((_, top)) if value <= *top => {}
            _ => best = Some((item, value)),
        }
    }
    best.map(|(item, _)| item)
}
