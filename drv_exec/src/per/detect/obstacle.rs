//! Mascot and cactus obstacle detectors
//!
//! Both obstacles are green, the cactus slightly darker and less saturated than the mascot. The
//! cactus is therefore found in a wider window with the mascot window cut out of it.

use image::RgbImage;
use log::trace;
use serde::Deserialize;

use crate::per::{
    region::largest_region,
    segment::{and_not, HsvWindow},
};

/// Inclusive range of pixel areas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct AreaRange {
    pub min: u32,

    /// No upper bound if `None`
    #[serde(default)]
    pub max: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MascotParams {
    pub window: HsvWindow,

    /// Colours removed from the mascot mask
    #[serde(default)]
    pub exclude: Option<HsvWindow>,

    pub area: AreaRange,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CactusParams {
    pub window: HsvWindow,

    pub area: AreaRange,
}

impl AreaRange {
    pub fn contains(&self, area: u32) -> bool {
        self.min <= area && self.max.map_or(true, |max| area <= max)
    }
}

impl Default for MascotParams {
    fn default() -> Self {
        Self {
            window: HsvWindow::new([57, 96, 89], [68, 255, 255]),
            exclude: None,
            area: AreaRange {
                min: 801,
                max: None,
            },
        }
    }
}

impl Default for CactusParams {
    fn default() -> Self {
        Self {
            window: HsvWindow::new([56, 86, 63], [66, 255, 255]),
            area: AreaRange {
                min: 641,
                max: Some(824),
            },
        }
    }
}

pub fn mascot_present(img: &RgbImage, params: &MascotParams) -> bool {
    let mut mask = params.window.mask(img);
    if let Some(ref exclude) = params.exclude {
        mask = and_not(&mask, &exclude.mask(img));
    }

    let area = largest_region(&mask).map_or(0, |r| r.area);
    trace!("Mascot area {}", area);

    area > 0 && params.area.contains(area)
}

pub fn cactus_present(img: &RgbImage, params: &CactusParams, mascot: &MascotParams) -> bool {
    let mask = and_not(&params.window.mask(img), &mascot.window.mask(img));

    let area = largest_region(&mask).map_or(0, |r| r.area);
    trace!("Cactus area {}", area);

    area > 0 && params.area.contains(area)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::per::detect::test_util::{fill, scene};

    #[test]
    fn test_mascot() {
        let params = MascotParams::default();

        let mut img = scene();
        assert!(!mascot_present(&img, &params));

        // 800 px is not enough
        fill(&mut img, 100, 100, 40, 20, [0, 200, 0]);
        assert!(!mascot_present(&img, &params));

        fill(&mut img, 100, 120, 40, 1, [0, 200, 0]);
        assert!(mascot_present(&img, &params));

        // Excluding the mascot's own colour removes it
        let params = MascotParams {
            exclude: Some(HsvWindow::new([55, 0, 0], [65, 255, 255])),
            ..MascotParams::default()
        };
        assert!(!mascot_present(&img, &params));
    }

    #[test]
    fn test_cactus() {
        let params = CactusParams::default();
        let mascot = MascotParams::default();

        let mut img = scene();
        fill(&mut img, 300, 300, 30, 25, [0, 80, 0]);
        assert!(cactus_present(&img, &params, &mascot));

        // The mascot isn't a cactus
        let mut img = scene();
        fill(&mut img, 300, 300, 30, 25, [0, 200, 0]);
        assert!(!cactus_present(&img, &params, &mascot));

        // Too large
        let mut img = scene();
        fill(&mut img, 300, 300, 30, 30, [0, 80, 0]);
        assert!(!cactus_present(&img, &params, &mascot));

        assert!(params.area.contains(641));
        assert!(params.area.contains(824));
        assert!(!params.area.contains(640));
        assert!(!params.area.contains(825));
    }
}
