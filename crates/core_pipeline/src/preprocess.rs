//! Image preprocessing module
//!
//! Prepares decoded uploads for OCR and fingerprints them so repeated
//! uploads of the same sheet can be spotted.

use image::{DynamicImage, GrayImage, ImageBuffer, Rgb};
use sha2::{Digest, Sha256};

/// Type alias for image with RGB pixels
pub type RgbImage = ImageBuffer<Rgb<u8>, Vec<u8>>;

/// Preprocess a photographed sheet for OCR
pub fn preprocess_image(input: &DynamicImage) -> GrayImage {
    input.to_luma8()
}

/// Compute SHA-256 hash of an image's pixels
///
/// Returns a 64-character hexadecimal string. Two files that decode to the
/// same pixels hash identically regardless of container format.
pub fn compute_image_hash(image: &RgbImage) -> String {
    let mut hasher = Sha256::new();
    hasher.update(image.as_raw());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preprocess_keeps_dimensions() {
        let img = ImageBuffer::from_pixel(40, 20, Rgb([255u8, 255u8, 255u8]));
        let gray = preprocess_image(&DynamicImage::ImageRgb8(img));
        assert_eq!(gray.dimensions(), (40, 20));
        assert_eq!(gray.get_pixel(0, 0).0, [255u8]);
    }

    #[test]
    fn test_compute_image_hash_deterministic() {
        let img1 = ImageBuffer::from_pixel(10, 10, Rgb([128u8, 128u8, 128u8]));
        let img2 = ImageBuffer::from_pixel(10, 10, Rgb([128u8, 128u8, 128u8]));

        let hash1 = compute_image_hash(&img1);
        let hash2 = compute_image_hash(&img2);

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_compute_image_hash_different_for_different_images() {
        let img1 = ImageBuffer::from_pixel(10, 10, Rgb([128u8, 128u8, 128u8]));
        let img2 = ImageBuffer::from_pixel(10, 10, Rgb([64u8, 64u8, 64u8]));

        assert_ne!(compute_image_hash(&img1), compute_image_hash(&img2));
    }
}
