//! Terminal rendering of a run report

use core_pipeline::{
    FinancialRecord, ImageOutcome, ImageReport, PipelineError, RatioRow, RunReport,
};
use std::io::{self, Write};

pub fn render_run(out: &mut impl Write, report: &RunReport) -> io::Result<()> {
    if report.images.is_empty() {
        writeln!(out, "Upload images of balance sheets to start the analysis.")?;
        return Ok(());
    }

    for image in &report.images {
        render_image(out, image)?;
        writeln!(out)?;
    }

    match &report.overall_best {
        Some(best) => writeln!(
            out,
            "Overall best investment option: {} (from {}) with a return on assets of {}",
            best.row.record.company,
            best.sheet,
            fmt_return(best.row.return_on_assets)
        ),
        None => writeln!(out, "No sheet produced a best investment option."),
    }
}

fn render_image(out: &mut impl Write, image: &ImageReport) -> io::Result<()> {
    writeln!(out, "== Financial analysis report: {} ==", image.label)?;

    if let Some(text) = &image.extracted_text {
        writeln!(out, "Extracted text:")?;
        for line in text.lines() {
            writeln!(out, "  | {}", line)?;
        }
        writeln!(out)?;
        writeln!(out, "Balance sheet data from {}:", image.label)?;
        render_records(out, &image.records)?;
        if image.skipped_lines > 0 {
            writeln!(
                out,
                "({} line(s) not recognised as balance-sheet rows)",
                image.skipped_lines
            )?;
        }
        writeln!(out)?;
    }

    match &image.outcome {
        ImageOutcome::Analyzed(analysis) => {
            writeln!(out, "Key financial ratios ({}):", image.label)?;
            render_ratios(out, &analysis.rows)?;
            writeln!(
                out,
                "Best investment option in {}: {} with a return on assets of {}",
                image.label,
                analysis.best.record.company,
                fmt_return(analysis.best.return_on_assets)
            )
        }
        ImageOutcome::Failed(PipelineError::MissingColumns { missing, .. }) => writeln!(
            out,
            "Missing columns in {}: {}. Please check your images.",
            image.label,
            missing.join(", ")
        ),
        ImageOutcome::Failed(err) => writeln!(out, "Could not analyze {}: {}", image.label, err),
    }
}

fn company_width<'a>(names: impl Iterator<Item = &'a str>) -> usize {
    names.map(|n| n.chars().count()).max().unwrap_or(0).max("company".len())
}

fn render_records(out: &mut impl Write, records: &[FinancialRecord]) -> io::Result<()> {
    if records.is_empty() {
        return writeln!(out, "  (no records)");
    }
    let w = company_width(records.iter().map(|r| r.company.as_str()));
    writeln!(
        out,
        "  {:<w$}  {:>17}  {:>12}  {:>10}  {:>12}",
        "company", "total_liabilities", "total_equity", "net_income", "total_assets"
    )?;
    for r in records {
        writeln!(
            out,
            "  {:<w$}  {:>17}  {:>12}  {:>10}  {:>12}",
            r.company, r.total_liabilities, r.total_equity, r.net_income, r.total_assets
        )?;
    }
    Ok(())
}

fn render_ratios(out: &mut impl Write, rows: &[RatioRow]) -> io::Result<()> {
    let w = company_width(rows.iter().map(|r| r.record.company.as_str()));
    writeln!(
        out,
        "  {:<w$}  {:>20}  {:>16}  {:>13}",
        "company", "debt_to_equity_ratio", "return_on_assets", "current_ratio"
    )?;
    for row in rows {
        writeln!(
            out,
            "  {:<w$}  {:>20}  {:>16}  {:>13}",
            row.record.company,
            fmt_ratio(row.debt_to_equity_ratio),
            fmt_ratio(row.return_on_assets),
            fmt_ratio(row.current_ratio)
        )?;
    }
    Ok(())
}

fn fmt_ratio(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.4}", v))
}

fn fmt_return(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.2}", v))
}
