//! Test identifier from the 2D code printed in the sheet's top-left corner.
//!
//! The code region is cropped at fixed template coordinates and handed to
//! `rqrr`. Only the first detected grid is decoded; there is no orientation
//! or threshold fallback, so either the code's own error correction succeeds
//! or the identifier is missing. The payload is a small JSON object and the
//! identifier is read from one configured key.

use image::GrayImage;

use crate::template::PixelSquare;

/// Why the identifier could not be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierRejectReason {
    /// No code grid found in the region.
    NoCode,
    /// A grid was found but failed to decode.
    DecodeFailed,
    /// The decoded payload is not a JSON object.
    PayloadNotObject,
    /// The payload lacks the identifier key, or its value is not a scalar.
    MissingField,
}

/// Identifier decode outcome. Confidence is binary: 1.0 when read, else 0.0.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentifierReading {
    pub value: Option<String>,
    pub confidence: f32,
    pub reject_reason: Option<IdentifierRejectReason>,
}

impl IdentifierReading {
    fn accepted(value: String) -> Self {
        Self {
            value: Some(value),
            confidence: 1.0,
            reject_reason: None,
        }
    }

    fn rejected(reason: IdentifierRejectReason) -> Self {
        Self {
            value: None,
            confidence: 0.0,
            reject_reason: Some(reason),
        }
    }
}

/// Decode the identifier from `region` of the canonical raster.
pub fn read_identifier(gray: &GrayImage, region: PixelSquare, field: &str) -> IdentifierReading {
    let crop = image::imageops::crop_imm(gray, region.x, region.y, region.size, region.size).to_image();
    let (w, h) = (crop.width() as usize, crop.height() as usize);
    if w == 0 || h == 0 {
        return IdentifierReading::rejected(IdentifierRejectReason::NoCode);
    }

    let raw = crop.as_raw();
    let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(w, h, |x, y| raw[y * w + x]);
    let grids = prepared.detect_grids();
    let Some(grid) = grids.first() else {
        tracing::debug!("no 2D code found in identifier region");
        return IdentifierReading::rejected(IdentifierRejectReason::NoCode);
    };

    let content = match grid.decode() {
        Ok((_, content)) => content,
        Err(err) => {
            tracing::debug!("2D code decode failed: {:?}", err);
            return IdentifierReading::rejected(IdentifierRejectReason::DecodeFailed);
        }
    };

    match parse_payload(&content, field) {
        Ok(value) => IdentifierReading::accepted(value),
        Err(reason) => {
            tracing::debug!("2D code payload rejected ({:?})", reason);
            IdentifierReading::rejected(reason)
        }
    }
}

/// Extract `field` from a JSON object payload.
///
/// String values are taken verbatim, numbers by their JSON text.
pub fn parse_payload(content: &str, field: &str) -> Result<String, IdentifierRejectReason> {
    let payload: serde_json::Value =
        serde_json::from_str(content).map_err(|_| IdentifierRejectReason::PayloadNotObject)?;
    let object = payload
        .as_object()
        .ok_or(IdentifierRejectReason::PayloadNotObject)?;
    match object.get(field) {
        Some(serde_json::Value::String(s)) => Ok(s.clone()),
        Some(serde_json::Value::Number(n)) => Ok(n.to_string()),
        _ => Err(IdentifierRejectReason::MissingField),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::SheetTemplate;
    use crate::test_utils::{blank_sheet, draw_identifier_code};
    use image::Luma;

    #[test]
    fn payload_string_field_is_extracted() {
        assert_eq!(
            parse_payload(r#"{"testId":"T-2024-07","v":1}"#, "testId"),
            Ok("T-2024-07".to_string())
        );
    }

    #[test]
    fn payload_numeric_field_is_stringified() {
        assert_eq!(parse_payload(r#"{"testId":42}"#, "testId"), Ok("42".to_string()));
    }

    #[test]
    fn payload_without_field_is_rejected() {
        assert_eq!(
            parse_payload(r#"{"id":"x"}"#, "testId"),
            Err(IdentifierRejectReason::MissingField)
        );
        assert_eq!(
            parse_payload(r#"{"testId":null}"#, "testId"),
            Err(IdentifierRejectReason::MissingField)
        );
    }

    #[test]
    fn non_object_payload_is_rejected() {
        assert_eq!(
            parse_payload("T-2024-07", "testId"),
            Err(IdentifierRejectReason::PayloadNotObject)
        );
        assert_eq!(
            parse_payload(r#"["testId"]"#, "testId"),
            Err(IdentifierRejectReason::PayloadNotObject)
        );
    }

    #[test]
    fn blank_region_has_no_code() {
        let img = GrayImage::from_pixel(300, 300, Luma([255]));
        let region = PixelSquare {
            x: 20,
            y: 20,
            size: 200,
        };
        let reading = read_identifier(&img, region, "testId");
        assert_eq!(reading.value, None);
        assert_eq!(reading.confidence, 0.0);
        assert_eq!(reading.reject_reason, Some(IdentifierRejectReason::NoCode));
    }

    #[test]
    fn code_in_template_region_is_decoded() {
        let t = SheetTemplate::default();
        let region = t.pixels().identifier_region;
        let mut img = blank_sheet(&t);
        draw_identifier_code(&mut img, region, r#"{"testId":"T-2024-07"}"#);

        let reading = read_identifier(&img, region, "testId");
        assert_eq!(reading.value.as_deref(), Some("T-2024-07"));
        assert_eq!(reading.confidence, 1.0);
        assert_eq!(reading.reject_reason, None);
    }

    #[test]
    fn decoded_payload_without_field_is_missing_field() {
        let t = SheetTemplate::default();
        let region = t.pixels().identifier_region;
        let mut img = blank_sheet(&t);
        draw_identifier_code(&mut img, region, r#"{"examId":"T-2024-07"}"#);

        let reading = read_identifier(&img, region, "testId");
        assert_eq!(reading.value, None);
        assert_eq!(reading.confidence, 0.0);
        assert_eq!(
            reading.reject_reason,
            Some(IdentifierRejectReason::MissingField)
        );
    }

    #[test]
    fn region_outside_raster_has_no_code() {
        let img = GrayImage::from_pixel(50, 50, Luma([255]));
        let region = PixelSquare {
            x: 100,
            y: 100,
            size: 40,
        };
        let reading = read_identifier(&img, region, "testId");
        assert_eq!(reading.reject_reason, Some(IdentifierRejectReason::NoCode));
    }
}
