//! Shared test utilities: synthetic canonical answer sheets.

use std::io::Cursor;

use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut, draw_hollow_circle_mut};
use imageproc::rect::Rect;

use crate::template::{BubbleCenter, PixelSquare, SheetTemplate, ID_DIGITS};

const PAPER: Luma<u8> = Luma([245]);
const INK: Luma<u8> = Luma([25]);
const PRINT: Luma<u8> = Luma([90]);

/// White canonical page with nothing printed on it.
pub(crate) fn blank_sheet(template: &SheetTemplate) -> GrayImage {
    let [w, h] = template.canonical_size();
    GrayImage::from_pixel(w, h, PAPER)
}

/// Pencil-fill one bubble slightly beyond its sampling radius.
pub(crate) fn fill_bubble(img: &mut GrayImage, center: BubbleCenter, radius: i32) {
    draw_filled_circle_mut(img, (center[0], center[1]), radius + 1, INK);
}

/// Marks a respondent made on a sheet.
#[derive(Debug, Clone)]
pub(crate) struct SheetMarks {
    pub prefix: Option<usize>,
    pub digits: [Option<usize>; ID_DIGITS],
    /// 30 values, 0 leaves the row blank.
    pub answers: Vec<u8>,
}

/// Render a printed sheet (fiducials, bubble outlines) with `marks` filled in.
pub(crate) fn render_sheet(template: &SheetTemplate, marks: &SheetMarks) -> GrayImage {
    let px = template.pixels();
    let r = px.bubble_radius;
    let mut img = blank_sheet(template);

    for f in template.fiducials_px() {
        draw_filled_rect_mut(
            &mut img,
            Rect::at(f.x as i32, f.y as i32).of_size(f.size, f.size),
            INK,
        );
    }

    let outlines = px
        .id_prefix
        .iter()
        .chain(px.id_digits.iter().flatten())
        .chain(px.answers.iter().flatten());
    for c in outlines {
        draw_hollow_circle_mut(&mut img, (c[0], c[1]), r + 4, PRINT);
    }

    if let Some(p) = marks.prefix {
        fill_bubble(&mut img, px.id_prefix[p], r);
    }
    for (pos, digit) in marks.digits.iter().enumerate() {
        if let Some(d) = digit {
            fill_bubble(&mut img, px.id_digits[pos][*d], r);
        }
    }
    for (q, &a) in marks.answers.iter().enumerate() {
        if a > 0 {
            fill_bubble(&mut img, px.answers[q][a as usize - 1], r);
        }
    }

    img
}

/// Draw a QR code holding `payload` into `region`, with a 4-module quiet zone.
pub(crate) fn draw_identifier_code(img: &mut GrayImage, region: PixelSquare, payload: &str) {
    let code = qrcode::QrCode::new(payload.as_bytes()).expect("payload fits a QR code");
    let modules = code.width() as u32;
    let module_px = region.size / (modules + 8);
    assert!(module_px >= 2, "identifier region too small for payload");
    let offset = (region.size - module_px * modules) / 2;

    draw_filled_rect_mut(
        img,
        Rect::at(region.x as i32, region.y as i32).of_size(region.size, region.size),
        PAPER,
    );
    for (i, color) in code.to_colors().into_iter().enumerate() {
        if color != qrcode::Color::Dark {
            continue;
        }
        let (mx, my) = (i as u32 % modules, i as u32 / modules);
        draw_filled_rect_mut(
            img,
            Rect::at(
                (region.x + offset + mx * module_px) as i32,
                (region.y + offset + my * module_px) as i32,
            )
            .of_size(module_px, module_px),
            INK,
        );
    }
}

/// Encode a grayscale image as PNG bytes.
pub(crate) fn encode_png(img: &GrayImage) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageLuma8(img.clone())
        .write_to(&mut buf, ImageFormat::Png)
        .expect("png encode");
    buf.into_inner()
}
