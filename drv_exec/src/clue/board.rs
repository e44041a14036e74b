//! # Clue board finder
//!
//! Clue boards are gray panels with blue lettering. The panel is found by taking the pixels in
//! any of the board's gray bands that aren't blue, the largest such region being the board.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use image::RgbImage;
use log::trace;
use serde::Deserialize;

use crate::per::{
    region::largest_region,
    segment::{and_not, or, CropRect, GrayWindow, HsvWindow, Mask},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct BoardParams {
    /// Gray bands making up the board
    pub bands: Vec<GrayWindow>,

    /// Coloured pixels, removed from the bands
    pub exclude: HsvWindow,

    /// Smallest board area worth reading
    pub min_area: u32,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for BoardParams {
    fn default() -> Self {
        Self {
            bands: vec![
                GrayWindow { min: 95, max: 105 },
                GrayWindow { min: 115, max: 125 },
                GrayWindow { min: 195, max: 205 },
            ],
            exclude: HsvWindow::new([5, 20, 0], [150, 255, 255]),
            min_area: 5000,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Crop the largest clue board out of the image.
pub fn find_board(img: &RgbImage, params: &BoardParams) -> Option<RgbImage> {
    let bands = params
        .bands
        .iter()
        .fold(Mask::new(img.width(), img.height()), |acc, band| {
            or(&acc, &band.mask(img))
        });
    let mask = and_not(&bands, &params.exclude.mask(img));

    let region = largest_region(&mask)?;
    trace!("Largest board candidate {:?}, area {}", region.bbox, region.area);

    if region.area < params.min_area {
        return None;
    }

    CropRect {
        x_min: region.bbox.x,
        x_max: region.bbox.x + region.bbox.w,
        y_min: region.bbox.y,
        y_max: region.bbox.y + region.bbox.h,
    }
    .crop(img)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::per::detect::test_util::{fill, scene};

    #[test]
    fn test_find_board() {
        let params = BoardParams::default();

        let mut img = scene();
        assert!(find_board(&img, &params).is_none());

        // Small board
        fill(&mut img, 100, 100, 40, 40, [200, 200, 200]);
        assert!(find_board(&img, &params).is_none());

        // Board with blue lettering across it, lettering doesn't split the panel
        fill(&mut img, 500, 200, 150, 100, [120, 120, 120]);
        fill(&mut img, 520, 240, 100, 10, [0, 0, 200]);
        let board = find_board(&img, &params).unwrap();
        assert_eq!(board.dimensions(), (150, 100));
    }
}
