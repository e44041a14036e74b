//! Pedestrian occupancy detector
//!
//! The crosswalk area of the frame is cropped and run through a background model. The largest
//! moving region is the pedestrian candidate, which occupies the crossing if its centre lies
//! between the lane edges at its foot row, widened by a buffer on either side. If no lane edge can
//! be seen at that row the crossing is assumed to be occupied.

use image::RgbImage;
use log::trace;
use serde::Deserialize;

use crate::per::{
    bg_model::BgModelParams,
    region::largest_region,
    road::find_edges,
    segment::{CropRect, GrayWindow, Mask},
};

#[derive(Debug, Clone, Deserialize)]
pub struct PedestrianParams {
    /// Part of the frame covering the crosswalk
    pub crop: CropRect,

    pub bg_model: BgModelParams,

    /// Moving regions smaller than this are ignored
    pub min_area: u32,

    /// Window selecting the white lane edges inside the crop
    pub lane_window: GrayWindow,

    /// Widening of the lane on the left, in pixels
    pub left_buffer_px: i64,

    /// Widening of the lane on the right, in pixels
    pub right_buffer_px: i64,
}

impl Default for PedestrianParams {
    fn default() -> Self {
        Self {
            crop: CropRect {
                x_min: 400,
                x_max: 920,
                y_min: 320,
                y_max: 440,
            },
            bg_model: BgModelParams::default(),
            min_area: 400,
            lane_window: GrayWindow { min: 250, max: 255 },
            left_buffer_px: 60,
            right_buffer_px: 80,
        }
    }
}

/// Decide whether the crossing is occupied, given the cropped image and the foreground mask of
/// the crop.
pub fn is_occupied(crop: &RgbImage, fg: &Mask, params: &PedestrianParams) -> bool {
    let region = match largest_region(fg) {
        Some(r) if r.area >= params.min_area => r,
        _ => return false,
    };

    let row = region.bbox.bottom();
    let lane = params.lane_window.mask(crop);

    let edges = match find_edges(&lane, row) {
        Some(e) => e,
        None => {
            trace!("Pedestrian candidate with no lane edges at row {}", row);
            return true;
        }
    };

    let cx = region.bbox.centre_x() as i64;
    let occupied = edges.left as i64 - params.left_buffer_px < cx
        && cx < edges.right as i64 + params.right_buffer_px;

    trace!(
        "Pedestrian at {} between lane edges {:?}: {}",
        cx,
        edges,
        occupied
    );

    occupied
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::per::detect::test_util::fill;
    use image::Luma;

    fn crop_with_lane() -> RgbImage {
        let mut crop = RgbImage::from_pixel(520, 120, image::Rgb([40, 40, 40]));
        fill(&mut crop, 100, 0, 4, 120, [255, 255, 255]);
        fill(&mut crop, 400, 0, 4, 120, [255, 255, 255]);
        crop
    }

    fn fg_block(x: u32, w: u32) -> Mask {
        let mut fg = Mask::new(520, 120);
        for yy in 40..80 {
            for xx in x..x + w {
                fg.put_pixel(xx, yy, Luma([255]));
            }
        }
        fg
    }

    #[test]
    fn test_occupancy() {
        let params = PedestrianParams::default();
        let crop = crop_with_lane();

        // Nothing moving
        assert!(!is_occupied(&crop, &Mask::new(520, 120), &params));

        // Too small to be a pedestrian
        assert!(!is_occupied(&crop, &fg_block(200, 5), &params));

        // On the crossing
        assert!(is_occupied(&crop, &fg_block(200, 20), &params));

        // Inside the left buffer
        assert!(is_occupied(&crop, &fg_block(40, 20), &params));

        // Outside the right buffer
        assert!(!is_occupied(&crop, &fg_block(490, 20), &params));
    }

    #[test]
    fn test_no_lane_is_occupied() {
        let params = PedestrianParams::default();
        let crop = RgbImage::from_pixel(520, 120, image::Rgb([40, 40, 40]));

        assert!(is_occupied(&crop, &fg_block(490, 20), &params));
    }
}
