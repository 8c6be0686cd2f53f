//! Raster normalization onto the canonical sheet coordinate space.
//!
//! The input photo is converted to single-channel grayscale and stretched to
//! the template's canonical size. Aspect ratio is not preserved and nothing is
//! cropped or rotated: a skewed photo simply yields misaligned bubbles.

use image::{DynamicImage, GrayImage};

use crate::config::ResampleFilter;
use crate::error::ScanError;

/// Fixed-size grayscale raster in template pixel coordinates.
#[derive(Debug, Clone)]
pub struct CanonicalRaster {
    gray: GrayImage,
}

impl CanonicalRaster {
    /// Decode image bytes (any supported format) and normalize them.
    pub fn from_bytes(
        bytes: &[u8],
        canonical_size: [u32; 2],
        filter: ResampleFilter,
    ) -> Result<Self, ScanError> {
        let img = image::load_from_memory(bytes)?;
        Self::from_image(&img, canonical_size, filter)
    }

    /// Normalize an already decoded image.
    pub fn from_image(
        img: &DynamicImage,
        canonical_size: [u32; 2],
        filter: ResampleFilter,
    ) -> Result<Self, ScanError> {
        Self::from_gray(img.to_luma8(), canonical_size, filter)
    }

    /// Normalize a grayscale image, resampling only when its size differs.
    pub fn from_gray(
        gray: GrayImage,
        canonical_size: [u32; 2],
        filter: ResampleFilter,
    ) -> Result<Self, ScanError> {
        let (w, h) = gray.dimensions();
        if w == 0 || h == 0 {
            return Err(ScanError::EmptyImage {
                width: w,
                height: h,
            });
        }

        let [cw, ch] = canonical_size;
        if (w, h) == (cw, ch) {
            return Ok(Self { gray });
        }

        tracing::debug!("resampling {}x{} input to canonical {}x{}", w, h, cw, ch);
        let gray = image::imageops::resize(&gray, cw, ch, filter.to_filter_type());
        Ok(Self { gray })
    }

    pub fn width(&self) -> u32 {
        self.gray.width()
    }

    pub fn height(&self) -> u32 {
        self.gray.height()
    }

    /// Underlying grayscale buffer.
    pub fn as_gray(&self) -> &GrayImage {
        &self.gray
    }
}
