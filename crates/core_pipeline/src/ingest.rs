//! Image ingestion
//!
//! Uploads carry the encoded bytes; decoding happens inside the pipeline
//! so that an undecodable file fails only its own image.

use crate::error::PipelineError;
use image::DynamicImage;
use std::path::Path;

/// An input that failed before it could enter the pipeline.
///
/// It is still reported, as a failed image, so the rest of the batch runs.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadFailure {
    pub name: String,
    pub error: PipelineError,
}

/// Label for a file on disk: its file name, or the whole path if it has none
pub fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn read_failure(path: &Path, err: impl std::fmt::Display) -> LoadFailure {
    LoadFailure {
        name: file_label(path),
        error: PipelineError::extraction(format!("cannot read {}: {}", path.display(), err)),
    }
}

/// Read a transcribed sheet from disk as `(label, text)`
pub fn load_text(path: &Path) -> Result<(String, String), LoadFailure> {
    let bytes = std::fs::read(path).map_err(|e| read_failure(path, e))?;
    let text = String::from_utf8(bytes).map_err(|e| read_failure(path, e))?;
    Ok((file_label(path), text))
}

/// An uploaded image, still encoded
#[derive(Debug, Clone)]
pub struct Upload {
    /// Display label, usually the original file name
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Read an upload from disk, labelled with its file name
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        Ok(Self {
            name: file_label(path),
            bytes,
        })
    }

    /// Like [`Upload::from_path`], but an unreadable file becomes a
    /// [`LoadFailure`] carrying an extraction error
    pub fn load(path: &Path) -> Result<Self, LoadFailure> {
        Self::from_path(path).map_err(|e| read_failure(path, e))
    }

    /// Decode the image; the format is guessed from the content
    pub fn decode(&self) -> Result<DynamicImage, PipelineError> {
        image::load_from_memory(&self.bytes).map_err(|e| {
            PipelineError::extraction(format!("cannot decode {}: {}", self.name, e))
        })
    }
}
