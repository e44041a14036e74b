//! Tunnel opening detector

use image::RgbImage;
use serde::Deserialize;

use crate::per::{
    region::{regions_larger_than, union_bbox},
    segment::{HsvWindow, Mask},
};

#[derive(Debug, Clone, Deserialize)]
pub struct TunnelParams {
    /// Window selecting the tunnel's brick face
    pub window: HsvWindow,

    /// Regions of this area or less are noise
    pub min_region_area: u32,
}

/// The tunnel as seen in one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TunnelObs {
    /// Centre column of the box around all tunnel regions
    pub centre_x: Option<u32>,

    /// Total pixel area of all tunnel regions
    pub area: u32,
}

impl Default for TunnelParams {
    fn default() -> Self {
        Self {
            window: HsvWindow::new([0, 106, 66], [9, 255, 255]),
            min_region_area: 30,
        }
    }
}

/// Raw tunnel colour mask.
pub fn mask(img: &RgbImage, params: &TunnelParams) -> Mask {
    params.window.mask(img)
}

pub fn detect(img: &RgbImage, params: &TunnelParams) -> TunnelObs {
    let regions = regions_larger_than(&mask(img, params), params.min_region_area);

    TunnelObs {
        centre_x: union_bbox(&regions).map(|b| b.centre_x()),
        area: regions.iter().map(|r| r.area).sum(),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::per::detect::test_util::{fill, scene};

    #[test]
    fn test_tunnel() {
        let params = TunnelParams::default();

        let mut img = scene();
        assert_eq!(
            detect(&img, &params),
            TunnelObs {
                centre_x: None,
                area: 0
            }
        );

        // Noise is ignored
        fill(&mut img, 10, 10, 5, 5, [200, 30, 20]);
        assert_eq!(detect(&img, &params).centre_x, None);

        // Two walls either side of the opening
        fill(&mut img, 400, 200, 100, 200, [200, 30, 20]);
        fill(&mut img, 700, 200, 100, 200, [200, 30, 20]);
        let obs = detect(&img, &params);
        assert_eq!(obs.centre_x, Some(600));
        assert_eq!(obs.area, 40_000);
    }
}
