//! OCR module
//!
//! Text extraction sits behind [`TextExtractor`] so the pipeline can be
//! driven by Tesseract in production and by canned text in tests.

use crate::config::OcrConfig;
use crate::error::PipelineError;
use crate::preprocess::preprocess_image;
use anyhow::{Context, Result};
use image::{DynamicImage, GrayImage};
use leptess::LepTess;

/// Turns a decoded image into plain text
pub trait TextExtractor: Send + Sync {
    /// Best-effort transcription; the result may be empty or garbled
    fn extract_text(&self, image: &DynamicImage) -> Result<String, PipelineError>;
}

impl<T: TextExtractor + ?Sized> TextExtractor for Box<T> {
    fn extract_text(&self, image: &DynamicImage) -> Result<String, PipelineError> {
        (**self).extract_text(image)
    }
}

/// Tesseract-backed extractor
#[derive(Debug, Clone, Default)]
pub struct TesseractExtractor {
    config: OcrConfig,
}

impl TesseractExtractor {
    pub fn new(config: OcrConfig) -> Self {
        Self { config }
    }
}

impl TextExtractor for TesseractExtractor {
    fn extract_text(&self, image: &DynamicImage) -> Result<String, PipelineError> {
        let gray = preprocess_image(image);
        extract_text_tesseract(&gray, &self.config)
            .map_err(|e| PipelineError::extraction(format!("{:#}", e)))
    }
}

/// Extract text from an image using Tesseract OCR
///
/// # Errors
/// * Returns error if Tesseract is not installed, the language data is
///   missing, or OCR fails
pub fn extract_text_tesseract(input: &GrayImage, config: &OcrConfig) -> Result<String> {
    let data_path = match &config.data_path {
        Some(path) => Some(
            path.to_str()
                .context("Tesseract data path is not valid UTF-8")?,
        ),
        None => None,
    };

    let mut tesseract = LepTess::new(data_path, &config.language).with_context(|| {
        format!(
            "Failed to initialize Tesseract for language '{}'. Is Tesseract installed?",
            config.language
        )
    })?;

    // leptess wants an encoded image, not raw pixels
    let mut png_bytes = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut png_bytes);
    input
        .write_to(&mut cursor, image::ImageFormat::Png)
        .context("Failed to encode image as PNG")?;

    tesseract
        .set_image_from_mem(&png_bytes)
        .context("Failed to load image into Tesseract")?;

    let text = tesseract
        .get_utf8_text()
        .context("Failed to extract text from image")?;

    Ok(text)
}
