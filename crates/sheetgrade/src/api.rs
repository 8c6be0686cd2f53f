//! High-level scanning API.
//!
//! [`Scanner`] is the primary entry point. It owns a [`SheetTemplate`] and a
//! [`ScanConfig`] and turns sheet photos into [`RecognitionResult`]s.

use std::path::Path;

use image::DynamicImage;

use crate::config::ScanConfig;
use crate::error::{GradeError, ScanError};
use crate::grading::{self, AnswerKeySection, GradedResult};
use crate::pipeline;
use crate::raster::CanonicalRaster;
use crate::recognition::RecognitionResult;
use crate::template::SheetTemplate;

/// Primary scanning interface.
///
/// Create once, scan many sheets. Holds no mutable state, so one scanner can
/// be shared across threads.
///
/// # Examples
///
/// ```no_run
/// use sheetgrade::{Scanner, SheetTemplate};
/// use std::path::Path;
///
/// let scanner = Scanner::new(SheetTemplate::default());
/// let result = scanner.scan_path(Path::new("sheet.jpg")).unwrap();
/// println!("{:?} confidence={:.2}", result.student_id, result.confidence);
/// ```
#[derive(Debug, Clone)]
pub struct Scanner {
    template: SheetTemplate,
    config: ScanConfig,
}

impl Scanner {
    /// Create a scanner with default scan configuration.
    pub fn new(template: SheetTemplate) -> Self {
        Self::with_config(template, ScanConfig::default())
    }

    /// Create with full config control.
    pub fn with_config(template: SheetTemplate, config: ScanConfig) -> Self {
        Self { template, config }
    }

    pub fn template(&self) -> &SheetTemplate {
        &self.template
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Mutable access to configuration for post-construction tuning.
    pub fn config_mut(&mut self) -> &mut ScanConfig {
        &mut self.config
    }

    /// Normalize an image onto this scanner's canonical raster.
    pub fn normalize(&self, image: &DynamicImage) -> Result<CanonicalRaster, ScanError> {
        CanonicalRaster::from_image(
            image,
            self.template.canonical_size(),
            self.config.resample_filter,
        )
    }

    /// Scan an already normalized raster.
    pub fn scan_raster(&self, raster: &CanonicalRaster) -> RecognitionResult {
        pipeline::scan_raster(raster, &self.template, &self.config)
    }

    /// Scan a decoded image of any size.
    pub fn scan_image(&self, image: &DynamicImage) -> Result<RecognitionResult, ScanError> {
        Ok(self.scan_raster(&self.normalize(image)?))
    }

    /// Scan encoded image bytes (PNG, JPEG, ...).
    pub fn scan_bytes(&self, bytes: &[u8]) -> Result<RecognitionResult, ScanError> {
        let raster = CanonicalRaster::from_bytes(
            bytes,
            self.template.canonical_size(),
            self.config.resample_filter,
        )?;
        Ok(self.scan_raster(&raster))
    }

    /// Read and scan an image file.
    pub fn scan_path(&self, path: &Path) -> Result<RecognitionResult, ScanError> {
        let bytes = std::fs::read(path)?;
        self.scan_bytes(&bytes)
    }

    /// Grade a (possibly human-corrected) answer vector against `key`.
    pub fn grade(
        &self,
        answers: &[u8],
        key: &[AnswerKeySection],
    ) -> Result<GradedResult, GradeError> {
        grading::grade(answers, key)
    }
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new(SheetTemplate::default())
    }
}
