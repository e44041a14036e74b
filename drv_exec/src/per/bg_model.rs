//! # Adaptive background model
//!
//! A per-pixel Gaussian model of the static scene, used to pick out moving objects (the pedestrian,
//! the lead vehicle) and to tell whether the scene is moving at all (hill stall).
//!
//! Each pixel holds a mean colour and a single isotropic variance. A pixel is foreground when its
//! squared colour distance from the mean exceeds `var_threshold` times the variance. Every update
//! blends the new frame in with a learning rate of `1 / min(2n, history)`, so the model adapts
//! quickly at first and settles to a long memory.
//!
//! Models are stateful and deliberately not `Clone`: every consumer owns its own instance, so
//! feeding one never disturbs another.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use image::{Luma, RgbImage};
use log::debug;
use ndarray::{Array2, Array3};
use serde::{Deserialize, Serialize};

use super::segment::{Mask, FG};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BgModelParams {
    /// Number of frames after which the learning rate stops decreasing
    pub history: u32,

    /// Squared distance, in units of the pixel variance, beyond which a pixel is foreground
    pub var_threshold: f32,

    /// Variance given to every pixel when the model is (re)initialised
    pub var_init: f32,

    /// Lower bound on a pixel's variance
    pub var_min: f32,

    /// Upper bound on a pixel's variance
    pub var_max: f32,
}

/// A per-pixel background model.
#[derive(Debug)]
pub struct BackgroundModel {
    params: BgModelParams,

    /// Mean colour of each pixel, indexed `[y, x, channel]`
    mean: Array3<f32>,

    /// Variance of each pixel, indexed `[y, x]`
    var: Array2<f32>,

    /// Number of frames the model has been updated with since it was initialised
    frames_seen: u32,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for BgModelParams {
    fn default() -> Self {
        Self {
            history: 500,
            var_threshold: 16.0,
            var_init: 15.0,
            var_min: 4.0,
            var_max: 75.0,
        }
    }
}

impl BackgroundModel {
    /// Create an empty model, which initialises itself from the first frame it's given.
    pub fn new(params: BgModelParams) -> Self {
        Self {
            params,
            mean: Array3::zeros((0, 0, 3)),
            var: Array2::zeros((0, 0)),
            frames_seen: 0,
        }
    }

    /// Number of frames the model has been updated with since it was last initialised.
    pub fn frames_seen(&self) -> u32 {
        self.frames_seen
    }

    /// Classify the image against the model, then update the model with it.
    ///
    /// The first image (or the first after a change of image size) initialises the model and is
    /// entirely background.
    pub fn apply(&mut self, img: &RgbImage) -> Mask {
        let (width, height) = img.dimensions();
        let mut fg = Mask::new(width, height);

        if self.var.dim() != (height as usize, width as usize) {
            if self.frames_seen > 0 {
                debug!(
                    "Background model reinitialised for {}x{} images",
                    width, height
                );
            }
            self.init(img);
            return fg;
        }

        self.frames_seen = self.frames_seen.saturating_add(1);
        let alpha = 1.0 / (2 * self.frames_seen).min(self.params.history.max(1)) as f32;

        for (x, y, px) in img.enumerate_pixels() {
            let (x, y) = (x as usize, y as usize);

            let mut dist2 = 0.0;
            let mut diff = [0f32; 3];
            for c in 0..3 {
                diff[c] = px[c] as f32 - self.mean[[y, x, c]];
                dist2 += diff[c] * diff[c];
            }

            let var = self.var[[y, x]];
            if dist2 > self.params.var_threshold * var {
                fg.put_pixel(x as u32, y as u32, Luma([FG]));
            }

            for c in 0..3 {
                self.mean[[y, x, c]] += alpha * diff[c];
            }
            self.var[[y, x]] = (var + alpha * (dist2 - var))
                .max(self.params.var_min)
                .min(self.params.var_max);
        }

        fg
    }

    fn init(&mut self, img: &RgbImage) {
        let (width, height) = img.dimensions();

        self.mean = Array3::from_shape_fn((height as usize, width as usize, 3), |(y, x, c)| {
            img.get_pixel(x as u32, y as u32)[c] as f32
        });
        self.var = Array2::from_elem((height as usize, width as usize), self.params.var_init);
        self.frames_seen = 1;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::per::segment::count_fg;
    use image::Rgb;

    fn scene() -> RgbImage {
        RgbImage::from_pixel(40, 30, Rgb([90, 120, 60]))
    }

    #[test]
    fn test_static_scene_is_background() {
        let mut model = BackgroundModel::new(BgModelParams::default());

        for _ in 0..10 {
            assert_eq!(count_fg(&model.apply(&scene())), 0);
        }
        assert_eq!(model.frames_seen(), 10);
    }

    #[test]
    fn test_moving_object_is_foreground() {
        let mut model = BackgroundModel::new(BgModelParams::default());
        for _ in 0..5 {
            model.apply(&scene());
        }

        let mut img = scene();
        for y in 10..20 {
            for x in 5..15 {
                img.put_pixel(x, y, Rgb([250, 250, 250]));
            }
        }

        assert_eq!(count_fg(&model.apply(&img)), 100);
    }

    #[test]
    fn test_resize_reinitialises() {
        let mut model = BackgroundModel::new(BgModelParams::default());
        model.apply(&scene());
        model.apply(&scene());

        let other = RgbImage::from_pixel(20, 10, Rgb([255, 255, 255]));
        assert_eq!(count_fg(&model.apply(&other)), 0);
        assert_eq!(model.frames_seen(), 1);
    }
}
