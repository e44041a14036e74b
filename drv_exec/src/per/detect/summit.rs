//! Summit marker detector
//!
//! The marker at the summit is a flat gray board. It's found in a narrow grayscale band with every
//! coloured pixel removed.

use image::RgbImage;
use serde::Deserialize;

use crate::per::{
    region::largest_region,
    segment::{and_not, GrayWindow, HsvWindow},
};

#[derive(Debug, Clone, Deserialize)]
pub struct SummitParams {
    pub gray: GrayWindow,

    /// Coloured pixels removed from the gray band
    pub exclude: HsvWindow,

    /// The marker's centre is reported above this area
    pub centre_min_area: u32,

    /// The vehicle has arrived above this area
    pub close_area: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummitObs {
    pub area: u32,

    /// Bounding box centre column
    pub centre_x: Option<u32>,

    /// The marker fills enough of the frame to stop
    pub close: bool,
}

impl Default for SummitParams {
    fn default() -> Self {
        Self {
            gray: GrayWindow { min: 95, max: 105 },
            exclude: HsvWindow::new([5, 20, 0], [150, 255, 255]),
            centre_min_area: 5000,
            close_area: 25000,
        }
    }
}

pub fn detect(img: &RgbImage, params: &SummitParams) -> SummitObs {
    let mask = and_not(&params.gray.mask(img), &params.exclude.mask(img));

    match largest_region(&mask) {
        Some(r) => SummitObs {
            area: r.area,
            centre_x: match r.area > params.centre_min_area {
                true => Some(r.bbox.centre_x()),
                false => None,
            },
            close: r.area > params.close_area,
        },
        None => SummitObs {
            area: 0,
            centre_x: None,
            close: false,
        },
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::per::detect::test_util::{fill, scene};

    #[test]
    fn test_summit() {
        let params = SummitParams::default();

        let mut img = scene();
        fill(&mut img, 100, 100, 50, 50, [100, 100, 100]);
        let obs = detect(&img, &params);
        assert_eq!(obs.area, 2500);
        assert_eq!(obs.centre_x, None);
        assert!(!obs.close);

        fill(&mut img, 800, 100, 100, 100, [100, 100, 100]);
        let obs = detect(&img, &params);
        assert_eq!(obs.centre_x, Some(850));
        assert!(!obs.close);

        fill(&mut img, 300, 300, 200, 200, [100, 100, 100]);
        let obs = detect(&img, &params);
        assert_eq!(obs.centre_x, Some(400));
        assert!(obs.close);

        // Same luma, but coloured
        let mut img = scene();
        fill(&mut img, 300, 300, 200, 200, [60, 120, 90]);
        assert_eq!(detect(&img, &params).area, 0);
    }
}
