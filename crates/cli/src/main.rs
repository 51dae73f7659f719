//! finsheet CLI
//!
//! Reads balance-sheet images (or already-transcribed text), ranks the
//! companies on each sheet by return on assets, and prints the report.
//!
//! Copyright (c) 2025 Michael A Wright

mod inputs;
mod report;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use core_pipeline::{
    load_text, DivisionPolicy, NumericFailurePolicy, OcrConfig, Pipeline, PipelineConfig,
    RunReport, TesseractExtractor, Upload,
};
use std::io::Write;
use std::path::PathBuf;

#[allow(dead_code)]
mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\ncommit: ",
    env!("FINSHEET_COMMIT"),
    "\nbuilt:  ",
    env!("FINSHEET_BUILT_AT"),
);

#[derive(Parser)]
#[command(name = "finsheet")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Rank companies by return on assets from balance-sheet images",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// OCR balance-sheet images and analyze them
    Analyze {
        /// Image files, or directories searched for .jpg/.jpeg/.png files
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        #[command(flatten)]
        ocr: OcrArgs,

        #[command(flatten)]
        analysis: AnalysisArgs,
    },

    /// Analyze text files that already hold transcribed balance sheets
    Parse {
        /// Text files, one sheet per file
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[command(flatten)]
        analysis: AnalysisArgs,
    },
}

#[derive(Args)]
struct OcrArgs {
    /// Tesseract language code
    #[arg(long, default_value = "eng")]
    lang: String,

    /// Directory holding Tesseract traineddata files
    #[arg(long)]
    tessdata: Option<PathBuf>,
}

#[derive(Args)]
struct AnalysisArgs {
    /// What to do with a line whose amounts are not numbers
    #[arg(long, value_enum, default_value_t = BadNumber::Abort)]
    on_bad_number: BadNumber,

    /// What to do when a ratio would divide by zero
    #[arg(long, value_enum, default_value_t = ZeroDivision::Undefined)]
    on_zero_division: ZeroDivision,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum BadNumber {
    /// Reject the whole sheet
    Abort,
    /// Drop only the offending line
    Skip,
}

#[derive(Clone, Copy, ValueEnum)]
enum ZeroDivision {
    /// Show the ratio as n/a
    Undefined,
    /// Reject the whole sheet
    Fail,
}

impl AnalysisArgs {
    fn config(&self, ocr: OcrConfig) -> PipelineConfig {
        PipelineConfig {
            ocr,
            numeric_failure: match self.on_bad_number {
                BadNumber::Abort => NumericFailurePolicy::AbortSheet,
                BadNumber::Skip => NumericFailurePolicy::SkipLine,
            },
            division: match self.on_zero_division {
                ZeroDivision::Undefined => DivisionPolicy::Undefined,
                ZeroDivision::Fail => DivisionPolicy::Fail,
            },
        }
    }
}

fn main() -> Result<()> {
    // Logs go to stderr so the report on stdout stays clean
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    tracing::debug!(
        target_triple = built_info::TARGET,
        rustc = built_info::RUSTC_VERSION,
        "finsheet starting"
    );

    let cli = Cli::parse();

    let (report, json) = match cli.command {
        Commands::Analyze {
            paths,
            ocr,
            analysis,
        } => {
            let config = analysis.config(OcrConfig {
                language: ocr.lang,
                data_path: ocr.tessdata,
            });
            (analyze_images(&paths, config), analysis.json)
        }
        Commands::Parse { files, analysis } => {
            let config = analysis.config(OcrConfig::default());
            (parse_files(&files, config), analysis.json)
        }
    };

    emit(&report, json)
}

fn log_policies(pipeline: &Pipeline<TesseractExtractor>) {
    let config = pipeline.config();
    tracing::info!(
        language = %config.ocr.language,
        numeric_failure = ?config.numeric_failure,
        division = ?config.division,
        "pipeline configured"
    );
}

/// OCR and analyze images; an unreadable file is reported as a failed image
fn analyze_images(paths: &[PathBuf], config: PipelineConfig) -> RunReport {
    let loaded: Vec<_> = inputs::collect_image_paths(paths)
        .iter()
        .map(|path| Upload::load(path))
        .collect();

    let pipeline = Pipeline::new(TesseractExtractor::new(config.ocr.clone()), config);
    log_policies(&pipeline);
    pipeline.run_loaded(loaded.iter().map(Result::as_ref))
}

/// Analyze transcribed sheets; an unreadable file is reported as a failed sheet
fn parse_files(files: &[PathBuf], config: PipelineConfig) -> RunReport {
    // No images, so the extractor is never called
    let pipeline = Pipeline::new(TesseractExtractor::default(), config);
    log_policies(&pipeline);
    pipeline.run_text_loaded(files.iter().map(|path| load_text(path)))
}

fn emit(report: &RunReport, json: bool) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if json {
        serde_json::to_writer_pretty(&mut out, report).context("Failed to write JSON report")?;
        writeln!(out).context("Failed to write JSON report")
    } else {
        report::render_run(&mut out, report).context("Failed to write report")
    }
}
