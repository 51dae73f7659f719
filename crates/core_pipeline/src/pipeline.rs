//! Run orchestrator
//!
//! Drives every upload through decode -> OCR -> parse -> analyze, one at a
//! time, then picks the overall best from the per-image winners. A failure
//! is recorded on the image it happened to and never stops the run.

use crate::analyzer::{analyze_balance_sheet, select_best};
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::ingest::{LoadFailure, Upload};
use crate::ocr::TextExtractor;
use crate::parser::parse_balance_sheet;
use crate::preprocess::compute_image_hash;
use crate::types::{ImageOutcome, ImageReport, OverallBest, RunId, RunReport};
use std::collections::HashMap;
use tracing::{info, warn};

pub struct Pipeline<E> {
    extractor: E,
    config: PipelineConfig,
}

impl<E: TextExtractor> Pipeline<E> {
    pub fn new(extractor: E, config: PipelineConfig) -> Self {
        Self { extractor, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Process uploaded images in order
    pub fn run(&self, uploads: &[Upload]) -> RunReport {
        self.run_loaded(uploads.iter().map(Ok))
    }

    /// Process a batch in which some inputs may already have failed to load.
    ///
    /// A load failure is reported as that image's outcome; the batch goes on.
    pub fn run_loaded<'a, I>(&self, inputs: I) -> RunReport
    where
        I: IntoIterator<Item = Result<&'a Upload, &'a LoadFailure>>,
    {
        let mut seen: HashMap<String, &str> = HashMap::new();
        let mut images = Vec::new();

        for input in inputs {
            let upload = match input {
                Ok(upload) => upload,
                Err(failure) => {
                    images.push(failed(&failure.name, None, failure.error.clone()));
                    continue;
                }
            };

            info!(image = %upload.name, "processing image");
            let report = self.process_upload(upload);
            if let Some(hash) = &report.content_hash {
                if let Some(first) = seen.get(hash.as_str()) {
                    warn!(
                        image = %upload.name,
                        duplicate_of = %first,
                        "image content already uploaded"
                    );
                } else {
                    seen.insert(hash.clone(), &upload.name);
                }
            }
            images.push(report);
        }

        aggregate(images)
    }

    /// Process text that is already available, skipping decode and OCR
    pub fn run_text<I, L, T>(&self, sheets: I) -> RunReport
    where
        I: IntoIterator<Item = (L, T)>,
        L: Into<String>,
        T: Into<String>,
    {
        self.run_text_loaded(
            sheets
                .into_iter()
                .map(|(label, text)| Ok((label.into(), text.into()))),
        )
    }

    /// Like [`Pipeline::run_text`], for sheets read from disk where some
    /// reads may have failed
    pub fn run_text_loaded<I>(&self, sheets: I) -> RunReport
    where
        I: IntoIterator<Item = Result<(String, String), LoadFailure>>,
    {
        let images = sheets
            .into_iter()
            .map(|sheet| match sheet {
                Ok((label, text)) => {
                    info!(sheet = %label, "processing text");
                    self.analyze_text(label, None, text)
                }
                Err(failure) => failed(&failure.name, None, failure.error),
            })
            .collect();
        aggregate(images)
    }

    fn process_upload(&self, upload: &Upload) -> ImageReport {
        let image = match upload.decode() {
            Ok(image) => image,
            Err(err) => return failed(&upload.name, None, err),
        };
        let content_hash = compute_image_hash(&image.to_rgb8());

        match self.extractor.extract_text(&image) {
            Ok(text) => self.analyze_text(upload.name.clone(), Some(content_hash), text),
            Err(err) => failed(&upload.name, Some(content_hash), err),
        }
    }

    fn analyze_text(
        &self,
        label: String,
        content_hash: Option<String>,
        text: String,
    ) -> ImageReport {
        let (records, skipped_lines, outcome) =
            match parse_balance_sheet(&text, self.config.numeric_failure) {
                Ok(sheet) => {
                    let analysis =
                        analyze_balance_sheet(&sheet.records, &label, self.config.division);
                    let outcome = match analysis {
                        Ok(analysis) => ImageOutcome::Analyzed(analysis),
                        Err(err) => ImageOutcome::Failed(err),
                    };
                    (sheet.records, sheet.skipped_lines, outcome)
                }
                Err(err) => (Vec::new(), 0, ImageOutcome::Failed(err)),
            };

        if let ImageOutcome::Failed(err) = &outcome {
            warn!(sheet = %label, error = %err, "sheet analysis failed");
        }

        ImageReport {
            label,
            content_hash,
            extracted_text: Some(text),
            records,
            skipped_lines,
            outcome,
        }
    }
}

fn failed(label: &str, content_hash: Option<String>, err: PipelineError) -> ImageReport {
    warn!(image = %label, error = %err, "image processing failed");
    ImageReport {
        label: label.to_string(),
        content_hash,
        extracted_text: None,
        records: Vec::new(),
        skipped_lines: 0,
        outcome: ImageOutcome::Failed(err),
    }
}

fn aggregate(images: Vec<ImageReport>) -> RunReport {
    let overall_best = select_best(
        images.iter().filter_map(|report| report.analysis()),
        |analysis| analysis.best.return_on_assets,
    )
    .map(|analysis| OverallBest {
        sheet: analysis.sheet.clone(),
        row: analysis.best.clone(),
    });

    RunReport {
        id: RunId::new(),
        images,
        overall_best,
    }
}
