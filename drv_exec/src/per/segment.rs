//! # Colour segmentation
//!
//! Threshold windows over 8-bit HSV or grayscale pixels, producing binary [`Mask`]s, plus the small
//! amount of mask algebra the detectors need.
//!
//! HSV values follow the usual 8-bit camera convention: hue is halved into `[0, 180)`, saturation
//! and value are scaled to `[0, 255]`.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use image::{GrayImage, Luma, RgbImage};
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Value of a foreground pixel in a mask
pub const FG: u8 = 255;

/// Value of a background pixel in a mask
pub const BG: u8 = 0;

// ------------------------------------------------------------------------------------------------
// TYPES
// ------------------------------------------------------------------------------------------------

/// Single channel binary image, foreground pixels are [`FG`], all others [`BG`].
pub type Mask = GrayImage;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// An inclusive HSV threshold window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HsvWindow {
    /// Lower bound as `[h, s, v]`
    pub lower: [u8; 3],

    /// Upper bound as `[h, s, v]`
    pub upper: [u8; 3],

    /// Evaluate the window with the red and blue channels exchanged.
    ///
    /// Some windows were tuned against images with the opposite channel order, setting this keeps
    /// the tuned bounds valid.
    #[serde(default)]
    pub swap_rb: bool,
}

/// An inclusive grayscale threshold window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrayWindow {
    pub min: u8,
    pub max: u8,
}

/// Rectangular region of interest, in pixels, with exclusive upper bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRect {
    pub x_min: u32,
    pub x_max: u32,
    pub y_min: u32,
    pub y_max: u32,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl HsvWindow {
    pub fn new(lower: [u8; 3], upper: [u8; 3]) -> Self {
        Self {
            lower,
            upper,
            swap_rb: false,
        }
    }

    /// Same window, evaluated on red/blue swapped pixels.
    pub fn swapped(mut self) -> Self {
        self.swap_rb = true;
        self
    }

    /// Returns true if the RGB pixel lies inside the window.
    pub fn contains(&self, rgb: [u8; 3]) -> bool {
        let px = match self.swap_rb {
            true => [rgb[2], rgb[1], rgb[0]],
            false => rgb,
        };
        let hsv = rgb_to_hsv(px);

        (0..3).all(|i| self.lower[i] <= hsv[i] && hsv[i] <= self.upper[i])
    }

    /// Threshold the image.
    pub fn mask(&self, img: &RgbImage) -> Mask {
        threshold(img, |px| self.contains(px))
    }
}

impl GrayWindow {
    pub fn contains(&self, rgb: [u8; 3]) -> bool {
        let l = luma(rgb);
        self.min <= l && l <= self.max
    }

    /// Threshold the luma of the image.
    pub fn mask(&self, img: &RgbImage) -> Mask {
        threshold(img, |px| self.contains(px))
    }
}

impl CropRect {
    /// Clamp the rectangle into an image of the given size, returning `(x, y, width, height)`.
    ///
    /// Returns `None` if nothing of the rectangle lies inside the image.
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
        let x_max = self.x_max.min(width);
        let y_max = self.y_max.min(height);

        if self.x_min >= x_max || self.y_min >= y_max {
            return None;
        }

        Some((self.x_min, self.y_min, x_max - self.x_min, y_max - self.y_min))
    }

    /// Copy the part of the image inside this rectangle.
    pub fn crop(&self, img: &RgbImage) -> Option<RgbImage> {
        let (x, y, w, h) = self.clamp_to(img.width(), img.height())?;
        Some(image::imageops::crop_imm(img, x, y, w, h).to_image())
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Convert an RGB pixel into 8-bit HSV (hue in `[0, 180)`).
pub fn rgb_to_hsv(rgb: [u8; 3]) -> [u8; 3] {
    let r = rgb[0] as f64;
    let g = rgb[1] as f64;
    let b = rgb[2] as f64;

    let v = r.max(g).max(b);
    let min = r.min(g).min(b);
    let diff = v - min;

    let s = match v > 0.0 {
        true => (255.0 * diff / v).round(),
        false => 0.0,
    };

    let mut h_deg = if diff == 0.0 {
        0.0
    } else if v == r {
        60.0 * (g - b) / diff
    } else if v == g {
        120.0 + 60.0 * (b - r) / diff
    } else {
        240.0 + 60.0 * (r - g) / diff
    };
    if h_deg < 0.0 {
        h_deg += 360.0;
    }

    let mut h = (h_deg / 2.0).round();
    if h >= 180.0 {
        h -= 180.0;
    }

    [h as u8, s as u8, v as u8]
}

/// Luma of an RGB pixel, with 0.299/0.587/0.114 channel weights.
pub fn luma(rgb: [u8; 3]) -> u8 {
    (0.299 * rgb[0] as f64 + 0.587 * rgb[1] as f64 + 0.114 * rgb[2] as f64)
        .round()
        .min(255.0) as u8
}

/// Pixelwise AND of two masks of equal size.
pub fn and(a: &Mask, b: &Mask) -> Mask {
    combine(a, b, |x, y| x && y)
}

/// Pixels set in `a` but not in `b`.
pub fn and_not(a: &Mask, b: &Mask) -> Mask {
    combine(a, b, |x, y| x && !y)
}

/// Pixelwise OR of two masks of equal size.
pub fn or(a: &Mask, b: &Mask) -> Mask {
    combine(a, b, |x, y| x || y)
}

/// Number of foreground pixels in the mask.
pub fn count_fg(mask: &Mask) -> usize {
    mask.pixels().filter(|p| p[0] != BG).count()
}

/// Returns true if the mask has no foreground at all.
pub fn is_empty(mask: &Mask) -> bool {
    mask.pixels().all(|p| p[0] == BG)
}

fn threshold<F: Fn([u8; 3]) -> bool>(img: &RgbImage, inside: F) -> Mask {
    let mut mask = Mask::new(img.width(), img.height());

    for (x, y, px) in img.enumerate_pixels() {
        if inside(px.0) {
            mask.put_pixel(x, y, Luma([FG]));
        }
    }

    mask
}

fn combine<F: Fn(bool, bool) -> bool>(a: &Mask, b: &Mask, op: F) -> Mask {
    let mut out = Mask::new(a.width().min(b.width()), a.height().min(b.height()));

    for (x, y, px) in out.enumerate_pixels_mut() {
        if op(a.get_pixel(x, y)[0] != BG, b.get_pixel(x, y)[0] != BG) {
            *px = Luma([FG]);
        }
    }

    out
}

#[cfg(test)]
mod test {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_rgb_to_hsv() {
        assert_eq!(rgb_to_hsv([0, 0, 0]), [0, 0, 0]);
        assert_eq!(rgb_to_hsv([255, 255, 255]), [0, 0, 255]);
        assert_eq!(rgb_to_hsv([255, 0, 0]), [0, 255, 255]);
        assert_eq!(rgb_to_hsv([0, 200, 0]), [60, 255, 200]);
        assert_eq!(rgb_to_hsv([0, 0, 255]), [120, 255, 255]);
        assert_eq!(rgb_to_hsv([255, 0, 255]), [150, 255, 255]);
    }

    #[test]
    fn test_luma() {
        assert_eq!(luma([255, 255, 255]), 255);
        assert_eq!(luma([100, 100, 100]), 100);
        assert_eq!(luma([255, 0, 0]), 76);
    }

    #[test]
    fn test_swapped_window() {
        // Hue around 120 is blue in RGB order, but pure red once the channels are swapped
        let window = HsvWindow::new([90, 50, 230], [255, 255, 255]);
        assert!(window.contains([0, 0, 255]));
        assert!(!window.contains([255, 0, 0]));

        let window = window.swapped();
        assert!(window.contains([255, 0, 0]));
        assert!(!window.contains([0, 0, 255]));
    }

    #[test]
    fn test_mask_algebra() {
        let mut img = RgbImage::new(4, 1);
        img.put_pixel(0, 0, Rgb([0, 200, 0]));
        img.put_pixel(1, 0, Rgb([0, 80, 0]));
        img.put_pixel(2, 0, Rgb([255, 255, 255]));

        let wide = HsvWindow::new([56, 86, 63], [66, 255, 255]).mask(&img);
        let bright = HsvWindow::new([57, 96, 89], [68, 255, 255]).mask(&img);
        let white = GrayWindow { min: 250, max: 255 }.mask(&img);

        assert_eq!(count_fg(&wide), 2);
        assert_eq!(count_fg(&bright), 1);

        let dark_only = and_not(&wide, &bright);
        assert_eq!(dark_only.get_pixel(1, 0)[0], FG);
        assert_eq!(count_fg(&dark_only), 1);

        assert_eq!(count_fg(&and(&wide, &bright)), 1);
        assert_eq!(count_fg(&or(&dark_only, &white)), 2);
        assert!(!is_empty(&white));
        assert!(is_empty(&and(&white, &bright)));
    }

    #[test]
    fn test_crop_clamps() {
        let img = RgbImage::new(640, 360);
        let rect = CropRect {
            x_min: 400,
            x_max: 920,
            y_min: 320,
            y_max: 440,
        };

        assert_eq!(rect.clamp_to(1280, 720), Some((400, 320, 520, 120)));
        assert_eq!(rect.clamp_to(640, 360), Some((400, 320, 240, 40)));
        assert_eq!(rect.crop(&img).map(|c| c.dimensions()), Some((240, 40)));
        assert_eq!(rect.clamp_to(320, 240), None);
    }
}
