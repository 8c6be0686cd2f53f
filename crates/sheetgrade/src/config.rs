use std::path::Path;

use image::imageops::FilterType;

use crate::error::ConfigError;

/// Resampling kernel used when stretching a photo onto the canonical raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResampleFilter {
    Nearest,
    #[default]
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl ResampleFilter {
    pub(crate) fn to_filter_type(self) -> FilterType {
        match self {
            Self::Nearest => FilterType::Nearest,
            Self::Triangle => FilterType::Triangle,
            Self::CatmullRom => FilterType::CatmullRom,
            Self::Gaussian => FilterType::Gaussian,
            Self::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Scan-time tuning shared by every decoder stage.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// A pixel is dark when its grayscale value is strictly below this.
    /// Default: [`ScanConfig::DEFAULT_LUMINANCE_CUTOFF`].
    pub luminance_cutoff: u8,
    /// Fill ratio a bubble must strictly exceed to be accepted.
    ///
    /// One value for all bubble fields; recognition results are only
    /// comparable between scans that use the same threshold.
    /// Default: [`ScanConfig::DEFAULT_ACCEPT_THRESHOLD`].
    pub accept_threshold: f32,
    /// Kernel used by the raster normalizer.
    pub resample_filter: ResampleFilter,
    /// Key of the identifier inside the 2D code's JSON payload.
    /// Default: [`ScanConfig::DEFAULT_IDENTIFIER_FIELD`].
    pub identifier_field: String,
}

impl ScanConfig {
    pub const DEFAULT_LUMINANCE_CUTOFF: u8 = 128;
    pub const DEFAULT_ACCEPT_THRESHOLD: f32 = 0.30;
    pub const DEFAULT_IDENTIFIER_FIELD: &'static str = "testId";

    /// Load a scan configuration from a JSON file. Missing keys take defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    /// Parse a scan configuration from JSON text.
    pub fn from_json_str(data: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(data)?)
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            luminance_cutoff: Self::DEFAULT_LUMINANCE_CUTOFF,
            accept_threshold: Self::DEFAULT_ACCEPT_THRESHOLD,
            resample_filter: ResampleFilter::default(),
            identifier_field: Self::DEFAULT_IDENTIFIER_FIELD.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: ScanConfig = serde_json::from_str(r#"{"luminance_cutoff":100}"#).unwrap();
        assert_eq!(cfg.luminance_cutoff, 100);
        assert_eq!(cfg.accept_threshold, ScanConfig::DEFAULT_ACCEPT_THRESHOLD);
        assert_eq!(cfg.identifier_field, "testId");
        assert_eq!(cfg.resample_filter, ResampleFilter::Triangle);
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        let err = ScanConfig::from_json_str(r#"{"accept_threshold":"high"}"#)
            .expect_err("string threshold must fail");
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn missing_config_file_is_io_error() {
        let err = ScanConfig::from_json_file(Path::new("/nonexistent/scan.json"))
            .expect_err("missing file must fail");
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn filter_names_are_snake_case() {
        let cfg: ScanConfig = serde_json::from_str(r#"{"resample_filter":"catmull_rom"}"#).unwrap();
        assert_eq!(cfg.resample_filter, ResampleFilter::CatmullRom);
        assert!(matches!(
            cfg.resample_filter.to_filter_type(),
            FilterType::CatmullRom
        ));
    }
}
