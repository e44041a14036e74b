//! Off-road terrain detectors
//!
//! Off the paved road the lane is bounded by sand coloured lines. Patches of sand elsewhere in
//! the frame are rejected by keeping only regions with a long boundary and a tall bounding box.
//!
//! The hill stall detector also lives here: on the hill the vehicle can lose traction and stop,
//! which shows up as a frame with next to nothing moving in it.

use image::RgbImage;
use log::trace;
use serde::Deserialize;

use crate::per::{
    bg_model::BgModelParams,
    region::{largest_region, retain_regions},
    segment::{is_empty, or, HsvWindow, Mask},
};

#[derive(Debug, Clone, Deserialize)]
pub struct TerrainParams {
    /// Window selecting the sand lines
    pub window: HsvWindow,

    /// Lower value bound of the second window used on the climb
    pub climb_value_min: u8,

    /// Regions with a boundary this long or shorter are rejected, in pixels
    pub min_perimeter_px: u32,

    /// Regions with a bounding box this tall or shorter are rejected, in pixels
    pub min_height_px: u32,

    /// Window selecting the driveable surface on the climb
    pub road_window: HsvWindow,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HillStallParams {
    pub bg_model: BgModelParams,

    /// The vehicle has stalled if nothing larger than this is moving
    pub min_area: u32,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            window: HsvWindow::new([13, 35, 179], [37, 98, 255]),
            climb_value_min: 173,
            min_perimeter_px: 750,
            min_height_px: 125,
            road_window: HsvWindow::new([0, 27, 110], [37, 255, 255]),
        }
    }
}

impl Default for HillStallParams {
    fn default() -> Self {
        Self {
            bg_model: BgModelParams::default(),
            min_area: 30,
        }
    }
}

/// Mask of the terrain lane lines.
pub fn line_mask(img: &RgbImage, params: &TerrainParams) -> Mask {
    filter_lines(&params.window.mask(img), params)
}

/// Mask of the terrain lane lines on the climb.
///
/// The lines on the climb are partly in shadow, so a second window with a lower value bound is
/// added in, as long as the first window found any lines at all.
pub fn climb_mask(img: &RgbImage, params: &TerrainParams) -> Mask {
    let lines = line_mask(img, params);
    if is_empty(&lines) {
        return lines;
    }

    let mut window = params.window;
    window.lower[2] = params.climb_value_min;

    or(&lines, &filter_lines(&window.mask(img), params))
}

/// Returns true if the pixel at the given position is on the driveable surface.
pub fn on_road_surface(img: &RgbImage, column: u32, row: u32, params: &TerrainParams) -> bool {
    if column >= img.width() || row >= img.height() {
        return false;
    }

    params.road_window.contains(img.get_pixel(column, row).0)
}

/// Returns true if nothing is moving in the full-frame foreground mask.
pub fn hill_stalled(fg: &Mask, params: &HillStallParams) -> bool {
    let area = largest_region(fg).map_or(0, |r| r.area);
    trace!("Hill stall foreground area {}", area);

    area < params.min_area
}

fn filter_lines(mask: &Mask, params: &TerrainParams) -> Mask {
    retain_regions(mask, |r| {
        r.perimeter > params.min_perimeter_px && r.bbox.h > params.min_height_px
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::per::{
        detect::test_util::{fill, scene},
        segment::count_fg,
    };
    use image::Luma;

    const SAND: [u8; 3] = [230, 210, 170];

    /// Sand, but darker than the main window allows
    const SHADED_SAND: [u8; 3] = [176, 160, 130];

    #[test]
    fn test_line_mask() {
        let params = TerrainParams::default();

        let mut img = scene();
        assert!(is_empty(&line_mask(&img, &params)));

        // Long diagonal line kept, short patch rejected
        for i in 0..400 {
            fill(&mut img, 300 + i, 300 + i, 8, 1, SAND);
        }
        fill(&mut img, 900, 100, 50, 50, SAND);

        let mask = line_mask(&img, &params);
        assert_eq!(count_fg(&mask), 400 * 8);
        assert_eq!(mask.get_pixel(920, 120)[0], 0);
    }

    #[test]
    fn test_climb_mask() {
        let params = TerrainParams::default();

        // Shaded line only, no main line, so nothing at all
        let mut img = scene();
        fill(&mut img, 100, 100, 400, 200, SHADED_SAND);
        assert!(is_empty(&climb_mask(&img, &params)));

        // With a main line the shaded one is added in
        fill(&mut img, 700, 100, 400, 200, SAND);
        let mask = climb_mask(&img, &params);
        assert_eq!(mask.get_pixel(200, 200)[0], 255);
        assert_eq!(mask.get_pixel(800, 200)[0], 255);
        assert!(is_empty(&line_mask(&RgbImage::new(4, 4), &params)));
    }

    #[test]
    fn test_road_surface() {
        let params = TerrainParams::default();

        let mut img = scene();
        fill(&mut img, 0, 500, 100, 10, SAND);

        assert!(on_road_surface(&img, 50, 505, &params));
        assert!(!on_road_surface(&img, 150, 505, &params));
        assert!(!on_road_surface(&img, 5000, 505, &params));
    }

    #[test]
    fn test_hill_stalled() {
        let params = HillStallParams::default();

        let mut fg = Mask::new(100, 100);
        assert!(hill_stalled(&fg, &params));

        for x in 0..29 {
            fg.put_pixel(x, 0, Luma([255]));
        }
        assert!(hill_stalled(&fg, &params));

        fg.put_pixel(29, 0, Luma([255]));
        assert!(!hill_stalled(&fg, &params));
    }
}
