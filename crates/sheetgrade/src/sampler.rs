//! Fill-ratio sampling shared by every bubble-reading stage.

use image::GrayImage;

use crate::template::BubbleCenter;

/// Fraction of dark pixels within `radius` of `center`.
///
/// A pixel at offset `(dx, dy)` is considered when `dx² + dy² <= radius²`.
/// Pixels outside the buffer are dropped from both numerator and denominator;
/// a neighbourhood with no in-bounds pixel yields `0.0`.
pub fn fill_ratio(
    pixels: &[u8],
    width: usize,
    center: BubbleCenter,
    radius: i32,
    luminance_cutoff: u8,
) -> f32 {
    if width == 0 || radius < 0 {
        return 0.0;
    }
    let height = (pixels.len() / width) as i64;
    let width = width as i64;
    let r = radius as i64;
    let r2 = r * r;
    let (cx, cy) = (center[0] as i64, center[1] as i64);

    let mut dark = 0u32;
    let mut considered = 0u32;
    for dy in -r..=r {
        let y = cy + dy;
        if y < 0 || y >= height {
            continue;
        }
        let row = (y * width) as usize;
        for dx in -r..=r {
            if dx * dx + dy * dy > r2 {
                continue;
            }
            let x = cx + dx;
            if x < 0 || x >= width {
                continue;
            }
            considered += 1;
            if pixels[row + x as usize] < luminance_cutoff {
                dark += 1;
            }
        }
    }

    if considered == 0 {
        0.0
    } else {
        dark as f32 / considered as f32
    }
}

/// Bubble sampler bound to one raster, radius and luminance cutoff.
#[derive(Clone, Copy)]
pub struct FillSampler<'a> {
    img: &'a GrayImage,
    radius: i32,
    luminance_cutoff: u8,
}

impl<'a> FillSampler<'a> {
    pub fn new(img: &'a GrayImage, radius: i32, luminance_cutoff: u8) -> Self {
        Self {
            img,
            radius,
            luminance_cutoff,
        }
    }

    /// Fill ratio of the bubble centred at `center`.
    #[inline]
    pub fn sample(self, center: BubbleCenter) -> f32 {
        fill_ratio(
            self.img.as_raw(),
            self.img.width() as usize,
            center,
            self.radius,
            self.luminance_cutoff,
        )
    }

    /// Fill ratios for a row of competing bubbles.
    pub fn sample_all<const N: usize>(self, centers: &[BubbleCenter; N]) -> [f32; N] {
        std::array::from_fn(|i| self.sample(centers[i]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use image::Luma;

    #[test]
    fn neighbourhood_outside_raster_is_zero() {
        let img = GrayImage::from_pixel(20, 20, Luma([0]));
        let s = FillSampler::new(&img, 5, 128);
        assert_eq!(s.sample([-100, -100]), 0.0);
        assert_eq!(s.sample([500, 5]), 0.0);
        assert_eq!(s.sample([5, 500]), 0.0);
    }

    #[test]
    fn fully_dark_neighbourhood_is_one() {
        let img = GrayImage::from_pixel(40, 40, Luma([0]));
        assert_eq!(FillSampler::new(&img, 10, 128).sample([20, 20]), 1.0);
    }

    #[test]
    fn light_neighbourhood_is_zero() {
        let img = GrayImage::from_pixel(40, 40, Luma([255]));
        assert_eq!(FillSampler::new(&img, 10, 128).sample([20, 20]), 0.0);
    }

    #[test]
    fn half_dark_neighbourhood_is_about_half() {
        let img = GrayImage::from_fn(40, 40, |x, _| if x < 20 { Luma([0]) } else { Luma([255]) });
        let v = FillSampler::new(&img, 10, 128).sample([20, 20]);
        assert_abs_diff_eq!(v, 0.5, epsilon = 0.05);
    }

    #[test]
    fn partially_out_of_bounds_pixels_are_excluded() {
        // Only the in-bounds quarter of the disc is counted, and all of it is dark.
        let img = GrayImage::from_pixel(10, 10, Luma([0]));
        assert_eq!(FillSampler::new(&img, 4, 128).sample([0, 0]), 1.0);
    }

    #[test]
    fn boundary_is_inclusive_and_cutoff_is_strict() {
        // radius 1 covers the centre plus its 4-neighbourhood.
        let mut img = GrayImage::from_pixel(5, 5, Luma([255]));
        img.put_pixel(2, 1, Luma([0]));
        img.put_pixel(1, 1, Luma([0])); // diagonal, outside radius 1
        img.put_pixel(3, 2, Luma([128])); // equal to cutoff, not dark
        assert_abs_diff_eq!(fill_ratio(img.as_raw(), 5, [2, 2], 1, 128), 0.2);
    }

    #[test]
    fn zero_width_buffer_is_zero() {
        assert_eq!(fill_ratio(&[], 0, [0, 0], 3, 128), 0.0);
    }
}
