//! Answer-sheet geometry contract.
//!
//! The printed sheet is described in millimetres and converted once into
//! canonical pixel coordinates at [`MM_TO_PX`]. Template JSON follows a
//! parametric schema (`sheetgrade.template.v1`): every bubble centre is
//! generated from an origin and fixed pitches, per-bubble coordinate lists are
//! intentionally not part of the schema.
//!
//! The section/question/choice/digit counts are fixed by the sheet design and
//! are not template parameters.

use std::path::Path;

use crate::error::TemplateError;

const TEMPLATE_SCHEMA_V1: &str = "sheetgrade.template.v1";

/// Canonical resolution: 150 DPI expressed as pixels per millimetre.
pub const MM_TO_PX: f64 = 150.0 / 25.4;

/// Number of answer sections on the sheet.
pub const SECTIONS: usize = 3;
/// Questions in every section.
pub const QUESTIONS_PER_SECTION: usize = 10;
/// Choices per question (values 1..=5).
pub const CHOICES: usize = 5;
/// Length of the decoded answer vector.
pub const ANSWER_COUNT: usize = SECTIONS * QUESTIONS_PER_SECTION;
/// Digit positions in the structured student ID.
pub const ID_DIGITS: usize = 5;

const DEFAULT_NAME: &str = "academy_a4_3x10x5";
const DEFAULT_PAGE_SIZE_MM: [f32; 2] = [210.0, 297.0];
const DEFAULT_MARGIN_MM: f32 = 10.0;
const DEFAULT_FIDUCIAL_SIZE_MM: f32 = 6.0;
const DEFAULT_IDENTIFIER_ORIGIN_MM: [f32; 2] = [18.0, 18.0];
const DEFAULT_IDENTIFIER_SIZE_MM: f32 = 40.0;
const DEFAULT_BUBBLE_RADIUS_MM: f32 = 1.8;
const DEFAULT_ID_PREFIXES: [char; 2] = ['h', 'm'];
const DEFAULT_ID_PREFIX_XY_MM: [[f32; 2]; 2] = [[66.0, 22.0], [76.0, 22.0]];
const DEFAULT_ID_DIGITS_ORIGIN_MM: [f32; 2] = [94.0, 22.0];
const DEFAULT_ID_DIGIT_COL_PITCH_MM: f32 = 8.0;
const DEFAULT_ID_DIGIT_ROW_PITCH_MM: f32 = 6.0;
const DEFAULT_ANSWERS_ORIGIN_MM: [f32; 2] = [32.0, 100.0];
const DEFAULT_SECTION_PITCH_MM: f32 = 60.0;
const DEFAULT_CHOICE_PITCH_MM: f32 = 7.0;
const DEFAULT_QUESTION_PITCH_MM: f32 = 9.0;

/// Bubble centre in canonical pixels `[x, y]`.
pub type BubbleCenter = [i32; 2];

/// Axis-aligned square region in canonical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PixelSquare {
    pub x: u32,
    pub y: u32,
    pub size: u32,
}

/// Every decodable location on the sheet, in canonical pixels.
///
/// Derived once from the millimetre description; decoders never convert
/// units themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelGeometry {
    /// Canonical raster size `[width, height]`.
    pub canonical_size: [u32; 2],
    /// Sampling radius shared by all bubbles.
    pub bubble_radius: i32,
    /// Square crop holding the 2D identifier code.
    pub identifier_region: PixelSquare,
    /// The two competing ID prefix bubbles.
    pub id_prefix: [BubbleCenter; 2],
    /// `id_digits[position][digit]`.
    pub id_digits: [[BubbleCenter; 10]; ID_DIGITS],
    /// `answers[global_question][choice_index]`.
    pub answers: [[BubbleCenter; CHOICES]; ANSWER_COUNT],
    /// Corner fiducials (top-left, top-right, bottom-left, bottom-right).
    pub fiducials: [PixelSquare; 4],
}

/// Runtime sheet template used by every decoder stage.
#[derive(Debug, Clone)]
pub struct SheetTemplate {
    pub name: String,
    pub page_size_mm: [f32; 2],
    pub margin_mm: f32,
    pub fiducial_size_mm: f32,
    pub identifier_origin_mm: [f32; 2],
    pub identifier_size_mm: f32,
    pub bubble_radius_mm: f32,
    /// Letters selected by the two prefix bubbles, in bubble order.
    pub id_prefixes: [char; 2],
    pub id_prefix_xy_mm: [[f32; 2]; 2],
    pub id_digits_origin_mm: [f32; 2],
    pub id_digit_col_pitch_mm: f32,
    pub id_digit_row_pitch_mm: f32,
    pub answers_origin_mm: [f32; 2],
    pub section_pitch_mm: f32,
    pub choice_pitch_mm: f32,
    pub question_pitch_mm: f32,

    pixels: PixelGeometry,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct SheetTemplateSpecV1 {
    schema: String,
    name: String,
    page_size_mm: [f32; 2],
    margin_mm: f32,
    fiducial_size_mm: f32,
    identifier_origin_mm: [f32; 2],
    identifier_size_mm: f32,
    bubble_radius_mm: f32,
    id_prefixes: [char; 2],
    id_prefix_xy_mm: [[f32; 2]; 2],
    id_digits_origin_mm: [f32; 2],
    id_digit_col_pitch_mm: f32,
    id_digit_row_pitch_mm: f32,
    answers_origin_mm: [f32; 2],
    section_pitch_mm: f32,
    choice_pitch_mm: f32,
    question_pitch_mm: f32,
}

impl SheetTemplate {
    /// Canonical pixel geometry derived from this template.
    pub fn pixels(&self) -> &PixelGeometry {
        &self.pixels
    }

    /// Canonical raster size `[width, height]`.
    pub fn canonical_size(&self) -> [u32; 2] {
        self.pixels.canonical_size
    }

    /// Corner fiducial squares printed on the sheet.
    ///
    /// No decoder stage reads these; sheets are aligned by plain resampling.
    pub fn fiducials_px(&self) -> &[PixelSquare; 4] {
        &self.pixels.fiducials
    }

    /// Millimetre centre of one answer bubble (`question` is 0-based global).
    pub fn answer_xy_mm(&self, question: usize, choice: usize) -> [f32; 2] {
        let section = question / QUESTIONS_PER_SECTION;
        let row = question % QUESTIONS_PER_SECTION;
        [
            self.answers_origin_mm[0]
                + section as f32 * self.section_pitch_mm
                + choice as f32 * self.choice_pitch_mm,
            self.answers_origin_mm[1] + row as f32 * self.question_pitch_mm,
        ]
    }

    /// Millimetre centre of one ID digit bubble.
    pub fn id_digit_xy_mm(&self, position: usize, digit: usize) -> [f32; 2] {
        [
            self.id_digits_origin_mm[0] + position as f32 * self.id_digit_col_pitch_mm,
            self.id_digits_origin_mm[1] + digit as f32 * self.id_digit_row_pitch_mm,
        ]
    }

    /// Load a sheet template from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, TemplateError> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    /// Parse a sheet template from JSON text.
    pub fn from_json_str(data: &str) -> Result<Self, TemplateError> {
        let spec: SheetTemplateSpecV1 = serde_json::from_str(data)?;
        Self::from_spec(spec)
    }

    fn from_spec(spec: SheetTemplateSpecV1) -> Result<Self, TemplateError> {
        if spec.schema != TEMPLATE_SCHEMA_V1 {
            return Err(TemplateError::UnsupportedSchema {
                found: spec.schema,
                expected: TEMPLATE_SCHEMA_V1,
            });
        }
        validate_spec(&spec).map_err(TemplateError::Invalid)?;

        let mut template = Self {
            name: spec.name,
            page_size_mm: spec.page_size_mm,
            margin_mm: spec.margin_mm,
            fiducial_size_mm: spec.fiducial_size_mm,
            identifier_origin_mm: spec.identifier_origin_mm,
            identifier_size_mm: spec.identifier_size_mm,
            bubble_radius_mm: spec.bubble_radius_mm,
            id_prefixes: spec.id_prefixes,
            id_prefix_xy_mm: spec.id_prefix_xy_mm,
            id_digits_origin_mm: spec.id_digits_origin_mm,
            id_digit_col_pitch_mm: spec.id_digit_col_pitch_mm,
            id_digit_row_pitch_mm: spec.id_digit_row_pitch_mm,
            answers_origin_mm: spec.answers_origin_mm,
            section_pitch_mm: spec.section_pitch_mm,
            choice_pitch_mm: spec.choice_pitch_mm,
            question_pitch_mm: spec.question_pitch_mm,
            pixels: PixelGeometry::empty(),
        };
        template.pixels = template.derive_pixels();
        validate_extent(&template).map_err(TemplateError::Invalid)?;
        Ok(template)
    }

    fn derive_pixels(&self) -> PixelGeometry {
        let mut id_digits = [[[0; 2]; 10]; ID_DIGITS];
        for (position, column) in id_digits.iter_mut().enumerate() {
            for (digit, center) in column.iter_mut().enumerate() {
                *center = mm_xy_to_px(self.id_digit_xy_mm(position, digit));
            }
        }

        let mut answers = [[[0; 2]; CHOICES]; ANSWER_COUNT];
        for (question, row) in answers.iter_mut().enumerate() {
            for (choice, center) in row.iter_mut().enumerate() {
                *center = mm_xy_to_px(self.answer_xy_mm(question, choice));
            }
        }

        let [page_w, page_h] = self.page_size_mm;
        let far_x = page_w - self.margin_mm - self.fiducial_size_mm;
        let far_y = page_h - self.margin_mm - self.fiducial_size_mm;
        let fiducial = |x: f32, y: f32| square_to_px([x, y], self.fiducial_size_mm);

        PixelGeometry {
            canonical_size: [mm_to_px(page_w) as u32, mm_to_px(page_h) as u32],
            bubble_radius: mm_to_px(self.bubble_radius_mm),
            identifier_region: square_to_px(self.identifier_origin_mm, self.identifier_size_mm),
            id_prefix: [
                mm_xy_to_px(self.id_prefix_xy_mm[0]),
                mm_xy_to_px(self.id_prefix_xy_mm[1]),
            ],
            id_digits,
            answers,
            fiducials: [
                fiducial(self.margin_mm, self.margin_mm),
                fiducial(far_x, self.margin_mm),
                fiducial(self.margin_mm, far_y),
                fiducial(far_x, far_y),
            ],
        }
    }
}

impl Default for SheetTemplate {
    fn default() -> Self {
        let spec = SheetTemplateSpecV1 {
            schema: TEMPLATE_SCHEMA_V1.to_string(),
            name: DEFAULT_NAME.to_string(),
            page_size_mm: DEFAULT_PAGE_SIZE_MM,
            margin_mm: DEFAULT_MARGIN_MM,
            fiducial_size_mm: DEFAULT_FIDUCIAL_SIZE_MM,
            identifier_origin_mm: DEFAULT_IDENTIFIER_ORIGIN_MM,
            identifier_size_mm: DEFAULT_IDENTIFIER_SIZE_MM,
            bubble_radius_mm: DEFAULT_BUBBLE_RADIUS_MM,
            id_prefixes: DEFAULT_ID_PREFIXES,
            id_prefix_xy_mm: DEFAULT_ID_PREFIX_XY_MM,
            id_digits_origin_mm: DEFAULT_ID_DIGITS_ORIGIN_MM,
            id_digit_col_pitch_mm: DEFAULT_ID_DIGIT_COL_PITCH_MM,
            id_digit_row_pitch_mm: DEFAULT_ID_DIGIT_ROW_PITCH_MM,
            answers_origin_mm: DEFAULT_ANSWERS_ORIGIN_MM,
            section_pitch_mm: DEFAULT_SECTION_PITCH_MM,
            choice_pitch_mm: DEFAULT_CHOICE_PITCH_MM,
            question_pitch_mm: DEFAULT_QUESTION_PITCH_MM,
        };

        Self::from_spec(spec).expect("default sheet template must be valid")
    }
}

impl PixelGeometry {
    fn empty() -> Self {
        let square = PixelSquare {
            x: 0,
            y: 0,
            size: 0,
        };
        Self {
            canonical_size: [0, 0],
            bubble_radius: 0,
            identifier_region: square,
            id_prefix: [[0; 2]; 2],
            id_digits: [[[0; 2]; 10]; ID_DIGITS],
            answers: [[[0; 2]; CHOICES]; ANSWER_COUNT],
            fiducials: [square; 4],
        }
    }

    fn all_bubbles(&self) -> impl Iterator<Item = &BubbleCenter> {
        self.id_prefix
            .iter()
            .chain(self.id_digits.iter().flatten())
            .chain(self.answers.iter().flatten())
    }
}

/// Convert millimetres to whole canonical pixels.
#[inline]
pub fn mm_to_px(mm: f32) -> i32 {
    (mm as f64 * MM_TO_PX).round() as i32
}

fn mm_xy_to_px(xy: [f32; 2]) -> BubbleCenter {
    [mm_to_px(xy[0]), mm_to_px(xy[1])]
}

fn square_to_px(origin_mm: [f32; 2], size_mm: f32) -> PixelSquare {
    PixelSquare {
        x: mm_to_px(origin_mm[0]).max(0) as u32,
        y: mm_to_px(origin_mm[1]).max(0) as u32,
        size: mm_to_px(size_mm).max(0) as u32,
    }
}

fn positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

fn validate_spec(spec: &SheetTemplateSpecV1) -> Result<(), String> {
    if spec.name.trim().is_empty() {
        return Err("template name must not be empty".to_string());
    }

    if !positive(spec.page_size_mm[0]) || !positive(spec.page_size_mm[1]) {
        return Err("page_size_mm must be finite and > 0".to_string());
    }

    if !spec.margin_mm.is_finite() || spec.margin_mm < 0.0 {
        return Err("margin_mm must be finite and >= 0".to_string());
    }

    for (field, value) in [
        ("fiducial_size_mm", spec.fiducial_size_mm),
        ("identifier_size_mm", spec.identifier_size_mm),
        ("bubble_radius_mm", spec.bubble_radius_mm),
        ("id_digit_col_pitch_mm", spec.id_digit_col_pitch_mm),
        ("id_digit_row_pitch_mm", spec.id_digit_row_pitch_mm),
        ("section_pitch_mm", spec.section_pitch_mm),
        ("choice_pitch_mm", spec.choice_pitch_mm),
        ("question_pitch_mm", spec.question_pitch_mm),
    ] {
        if !positive(value) {
            return Err(format!("{field} must be finite and > 0"));
        }
    }

    if spec.id_prefixes[0] == spec.id_prefixes[1] {
        return Err("id_prefixes must be two distinct letters".to_string());
    }
    if !spec.id_prefixes.iter().all(|c| c.is_ascii_alphabetic()) {
        return Err("id_prefixes must be ASCII letters".to_string());
    }

    let min_pitch = [
        spec.id_digit_col_pitch_mm,
        spec.id_digit_row_pitch_mm,
        spec.choice_pitch_mm,
        spec.question_pitch_mm,
    ]
    .into_iter()
    .fold(f32::INFINITY, f32::min);
    if spec.bubble_radius_mm * 2.0 >= min_pitch {
        return Err(format!(
            "bubble diameter ({:.4}mm) must be smaller than minimum bubble pitch ({:.4}mm)",
            spec.bubble_radius_mm * 2.0,
            min_pitch
        ));
    }

    let choices_span = (CHOICES - 1) as f32 * spec.choice_pitch_mm + 2.0 * spec.bubble_radius_mm;
    if choices_span >= spec.section_pitch_mm {
        return Err(format!(
            "section_pitch_mm ({:.4}mm) must exceed the width of one choice row ({:.4}mm)",
            spec.section_pitch_mm, choices_span
        ));
    }

    Ok(())
}

fn validate_extent(template: &SheetTemplate) -> Result<(), String> {
    let px = &template.pixels;
    let [w, h] = px.canonical_size;
    let r = px.bubble_radius;

    for c in px.all_bubbles() {
        if c[0] - r < 0 || c[1] - r < 0 || c[0] + r >= w as i32 || c[1] + r >= h as i32 {
            return Err(format!(
                "bubble at ({}, {}) px lies outside the {}x{} canonical page",
                c[0], c[1], w, h
            ));
        }
    }

    let region = px.identifier_region;
    if region.size == 0 || region.x + region.size > w || region.y + region.size > h {
        return Err("identifier region must lie inside the page".to_string());
    }

    Ok(())
}
