//! Crosswalk stop-line detector

use image::RgbImage;
use serde::Deserialize;

use crate::per::{region::largest_region, segment::HsvWindow};

#[derive(Debug, Clone, Deserialize)]
pub struct CrosswalkParams {
    /// Window selecting the red stop line
    pub window: HsvWindow,

    /// Minimum pixel area for the line to count as present
    pub min_area: u32,
}

/// What the crosswalk detector sees in one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrosswalkObs {
    pub present: bool,

    /// Angle of the line's minimum-area rectangle, 0 when no line is visible
    pub angle_deg: f64,

    /// Centroid row of the line, 0 when no line is visible
    pub centroid_y: f64,
}

impl Default for CrosswalkParams {
    fn default() -> Self {
        Self {
            window: HsvWindow::new([90, 50, 230], [255, 255, 255]).swapped(),
            min_area: 1000,
        }
    }
}

pub fn detect(img: &RgbImage, params: &CrosswalkParams) -> CrosswalkObs {
    match largest_region(&params.window.mask(img)) {
        Some(r) => CrosswalkObs {
            present: r.area >= params.min_area,
            angle_deg: r.angle_deg,
            centroid_y: r.centroid.y,
        },
        None => CrosswalkObs {
            present: false,
            angle_deg: 0.0,
            centroid_y: 0.0,
        },
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::per::detect::test_util::{fill, scene};

    #[test]
    fn test_crosswalk() {
        let params = CrosswalkParams::default();

        let mut img = scene();
        assert!(!detect(&img, &params).present);

        // Thin line below the area threshold
        fill(&mut img, 100, 300, 90, 10, [255, 0, 0]);
        let obs = detect(&img, &params);
        assert!(!obs.present);

        fill(&mut img, 100, 500, 400, 20, [255, 0, 0]);
        let obs = detect(&img, &params);
        assert!(obs.present);
        assert_eq!(obs.angle_deg, 0.0);
        assert!((obs.centroid_y - 509.5).abs() < 1e-9);
    }
}
