//! # Road-centre estimation
//!
//! The lane is found by scanning a single row of a lane mask a fixed distance above the bottom of
//! the image. The first and last foreground pixels in that row are the lane edges, from which the
//! centre of the lane is chosen.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::trace;
use serde::{Deserialize, Serialize};

use super::segment::{Mask, BG};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Where and how to scan a lane mask.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScanParams {
    /// Distance of the scan row above the bottom of the image, in pixels
    pub offset_px: u32,

    /// Edges further apart than this are taken to be both sides of the lane, in pixels
    pub line_width_px: u32,
}

/// Lane edges found in a scan row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoadEdges {
    /// Column of the first foreground pixel
    pub left: u32,

    /// Column of the last foreground pixel, equal to `left` if only one pixel is set
    pub right: u32,
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Row scanned for a given offset above the bottom of an image of the given height.
pub fn scan_row(height: u32, offset_px: u32) -> u32 {
    height
        .saturating_sub(offset_px)
        .min(height.saturating_sub(1))
}

/// Find the lane edges in the given row of the mask.
pub fn find_edges(mask: &Mask, row: u32) -> Option<RoadEdges> {
    if row >= mask.height() {
        return None;
    }

    let mut edges: Option<RoadEdges> = None;

    for x in 0..mask.width() {
        if mask.get_pixel(x, row)[0] != BG {
            match edges {
                Some(ref mut e) => e.right = x,
                None => edges = Some(RoadEdges { left: x, right: x }),
            }
        }
    }

    edges
}

/// Choose the lane centre from the edges.
///
/// - Edges further apart than the line width bound the lane, the centre is their midpoint.
/// - Otherwise only one side of the lane is visible. A line in the left half of the image is the
///   left edge so the centre is midway between it and the right of the image, a line in the right
///   half is the right edge so the centre is midway between the left of the image and it.
pub fn centre_from_edges(edges: RoadEdges, width: u32, line_width_px: u32) -> u32 {
    if edges.right - edges.left > line_width_px {
        (edges.left + edges.right) / 2
    } else if edges.left < width / 2 {
        (edges.left + width) / 2
    } else {
        edges.right / 2
    }
}

/// Estimate the column of the lane centre, or `None` if the scan row has no foreground.
pub fn find_centre(mask: &Mask, scan: &ScanParams) -> Option<u32> {
    let row = scan_row(mask.height(), scan.offset_px);
    let edges = find_edges(mask, row)?;
    let centre = centre_from_edges(edges, mask.width(), scan.line_width_px);

    trace!("Road edges {:?} on row {}, centre {}", edges, row, centre);

    Some(centre)
}

/// Normalised offset of a column from the image centre, positive when the column is left of
/// centre, in `[-1, 1]` for columns inside the image.
pub fn centre_offset(column: u32, width: u32) -> f64 {
    let half = (width / 2) as f64;
    if half == 0.0 {
        return 0.0;
    }
    (half - column as f64) / half
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::per::segment::FG;
    use image::Luma;

    const SCAN: ScanParams = ScanParams {
        offset_px: 200,
        line_width_px: 150,
    };

    fn mask_with(width: u32, height: u32, cols: &[u32], row: u32) -> Mask {
        let mut mask = Mask::new(width, height);
        for &c in cols {
            mask.put_pixel(c, row, Luma([FG]));
        }
        mask
    }

    #[test]
    fn test_two_edges() {
        let mask = mask_with(1280, 720, &[100, 500], 520);
        let centre = find_centre(&mask, &SCAN);
        assert_eq!(centre, Some(300));
        assert_eq!(centre_offset(300, 1280), 0.53125);
    }

    #[test]
    fn test_single_edges() {
        // Lone edge left of centre
        let mask = mask_with(1280, 720, &[200], 520);
        assert_eq!(find_centre(&mask, &SCAN), Some((200 + 1280) / 2));

        // Lone edge right of centre
        let mask = mask_with(1280, 720, &[1000], 520);
        assert_eq!(find_centre(&mask, &SCAN), Some(500));

        // Two pixels closer than the line width act like a single line
        let mask = mask_with(1280, 720, &[900, 960], 520);
        assert_eq!(find_centre(&mask, &SCAN), Some(480));
    }

    #[test]
    fn test_no_foreground() {
        // Foreground away from the scan row is ignored
        let mask = mask_with(1280, 720, &[100, 500], 300);
        assert_eq!(find_centre(&mask, &SCAN), None);
        assert_eq!(find_edges(&mask, 720), None);
    }

    #[test]
    fn test_scan_row_clamped() {
        assert_eq!(scan_row(720, 200), 520);
        assert_eq!(scan_row(100, 200), 0);
        assert_eq!(scan_row(100, 0), 99);
    }

    #[test]
    fn test_centre_in_image() {
        for left in (0..1280).step_by(37) {
            for right in (left..1280).step_by(53) {
                let c = centre_from_edges(RoadEdges { left, right }, 1280, 150);
                assert!(c < 1280);
            }
        }
    }
}
