//! Core pipeline for finsheet
//!
//! This crate provides the data structures and processing logic for
//! turning photographed balance sheets into structured records, deriving
//! financial ratios from them, and picking the strongest company by
//! return on assets.
//!
//! The stages run strictly forward: image -> text -> records -> ratios -> report.
//! Nothing in here renders output; the CLI and server crates are the
//! display adapters.

pub mod analyzer;
pub mod config;
pub mod error;
pub mod ingest;
pub mod ocr;
pub mod parser;
pub mod pipeline;
pub mod preprocess;
pub mod types;

pub use config::{DivisionPolicy, NumericFailurePolicy, OcrConfig, PipelineConfig};
pub use error::PipelineError;
pub use ingest::{file_label, load_text, LoadFailure, Upload};
pub use ocr::{TesseractExtractor, TextExtractor};
pub use pipeline::Pipeline;
pub use types::*;
