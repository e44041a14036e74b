//! # Region analysis
//!
//! Extracts 8-connected foreground regions from a [`Mask`] along with the geometry the detectors
//! make decisions on: pixel area, bounding box, centroid, boundary length and the angle of the
//! minimum-area rotated rectangle.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use image::{ImageBuffer, Luma};
use imageproc::{
    geometry::convex_hull,
    point::Point,
    region_labelling::{connected_components, Connectivity},
};
use nalgebra::Point2;
use serde::Serialize;

use super::segment::{Mask, BG, FG};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Axis aligned bounding box in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BBox {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

/// A connected foreground region.
#[derive(Debug, Clone, Serialize)]
pub struct Region {
    /// Number of pixels in the region
    pub area: u32,

    pub bbox: BBox,

    /// Angle of the minimum-area enclosing rectangle in degrees, in `[0, 90)`. Axis aligned
    /// regions have an angle of 0.
    pub angle_deg: f64,

    /// Mean pixel position
    pub centroid: Point2<f64>,

    /// Number of region pixels touching the background (4-connected) or the image border
    pub perimeter: u32,
}

/// Running statistics of a region while the label image is scanned.
struct RegionAcc {
    area: u32,
    x_min: u32,
    x_max: u32,
    y_min: u32,
    y_max: u32,
    x_sum: u64,
    y_sum: u64,
    perimeter: u32,

    /// Horizontal extent of each row the region occupies, as `(y, x_min, x_max)`
    rows: Vec<(u32, u32, u32)>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl BBox {
    /// Column half way across the box, rounded down.
    pub fn centre_x(&self) -> u32 {
        self.x + self.w / 2
    }

    /// Row half way down the box, rounded down.
    pub fn centre_y(&self) -> u32 {
        self.y + self.h / 2
    }

    /// Last row covered by the box.
    pub fn bottom(&self) -> u32 {
        self.y + self.h.saturating_sub(1)
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &BBox) -> BBox {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let x_end = (self.x + self.w).max(other.x + other.w);
        let y_end = (self.y + self.h).max(other.y + other.h);

        BBox {
            x,
            y,
            w: x_end - x,
            h: y_end - y,
        }
    }
}

impl RegionAcc {
    fn new(x: u32, y: u32) -> Self {
        Self {
            area: 0,
            x_min: x,
            x_max: x,
            y_min: y,
            y_max: y,
            x_sum: 0,
            y_sum: 0,
            perimeter: 0,
            rows: Vec::new(),
        }
    }

    fn add(&mut self, x: u32, y: u32, on_boundary: bool) {
        self.area += 1;
        self.x_min = self.x_min.min(x);
        self.x_max = self.x_max.max(x);
        self.y_min = self.y_min.min(y);
        self.y_max = self.y_max.max(y);
        self.x_sum += x as u64;
        self.y_sum += y as u64;

        if on_boundary {
            self.perimeter += 1;
        }

        // Pixels are visited in row-major order so only the last row can need extending
        match self.rows.last_mut() {
            Some(row) if row.0 == y => row.2 = x,
            _ => self.rows.push((y, x, x)),
        }
    }

    fn into_region(self) -> Region {
        // Use pixel corners rather than centres so single row or column regions still have a
        // non-degenerate hull
        let mut corners = Vec::with_capacity(self.rows.len() * 4);
        for &(y, x0, x1) in self.rows.iter() {
            let (y, x0, x1) = (y as i32, x0 as i32, x1 as i32);
            corners.push(Point::new(x0, y));
            corners.push(Point::new(x1 + 1, y));
            corners.push(Point::new(x0, y + 1));
            corners.push(Point::new(x1 + 1, y + 1));
        }

        Region {
            area: self.area,
            bbox: BBox {
                x: self.x_min,
                y: self.y_min,
                w: self.x_max - self.x_min + 1,
                h: self.y_max - self.y_min + 1,
            },
            angle_deg: min_area_rect_angle(&convex_hull(&corners)),
            centroid: Point2::new(
                self.x_sum as f64 / self.area as f64,
                self.y_sum as f64 / self.area as f64,
            ),
            perimeter: self.perimeter,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Find all 8-connected regions in the mask, largest first.
pub fn regions(mask: &Mask) -> Vec<Region> {
    let (_, regions) = label(mask);

    let mut regions: Vec<Region> = regions.into_iter().flatten().collect();
    regions.sort_by(|a, b| b.area.cmp(&a.area));

    regions
}

/// Keep only the pixels of regions for which `keep` returns true.
pub fn retain_regions<F: Fn(&Region) -> bool>(mask: &Mask, keep: F) -> Mask {
    let (labels, regions) = label(mask);
    let kept: Vec<bool> = regions
        .iter()
        .map(|r| r.as_ref().map_or(false, |r| keep(r)))
        .collect();

    let mut out = Mask::new(mask.width(), mask.height());
    for (x, y, l) in labels.enumerate_pixels() {
        let l = l[0] as usize;
        if l > 0 && kept[l - 1] {
            out.put_pixel(x, y, Luma([FG]));
        }
    }

    out
}

/// The region with the largest area, if the mask has any foreground.
pub fn largest_region(mask: &Mask) -> Option<Region> {
    regions(mask).into_iter().next()
}

/// All regions with an area strictly greater than `min_area`, largest first.
pub fn regions_larger_than(mask: &Mask, min_area: u32) -> Vec<Region> {
    regions(mask)
        .into_iter()
        .take_while(|r| r.area > min_area)
        .collect()
}

/// Bounding box containing every given region.
pub fn union_bbox(regions: &[Region]) -> Option<BBox> {
    let mut iter = regions.iter();
    let first = iter.next()?.bbox;
    Some(iter.fold(first, |acc, r| acc.union(&r.bbox)))
}

/// Label the mask and measure every region, indexed by label - 1.
fn label(mask: &Mask) -> (ImageBuffer<Luma<u32>, Vec<u32>>, Vec<Option<Region>>) {
    let labels = connected_components(mask, Connectivity::Eight, Luma([BG]));

    // Labels are consecutive from 1
    let mut accs: Vec<Option<RegionAcc>> = Vec::new();

    for (x, y, label) in labels.enumerate_pixels() {
        let label = label[0] as usize;
        if label == 0 {
            continue;
        }

        if accs.len() < label {
            accs.resize_with(label, || None);
        }

        accs[label - 1]
            .get_or_insert_with(|| RegionAcc::new(x, y))
            .add(x, y, is_boundary(mask, x, y));
    }

    let regions = accs
        .into_iter()
        .map(|a| a.map(RegionAcc::into_region))
        .collect();

    (labels, regions)
}

/// A foreground pixel is on the boundary if it touches the image edge or a 4-connected
/// background pixel.
fn is_boundary(mask: &Mask, x: u32, y: u32) -> bool {
    if x == 0 || y == 0 || x + 1 >= mask.width() || y + 1 >= mask.height() {
        return true;
    }

    mask.get_pixel(x - 1, y)[0] == BG
        || mask.get_pixel(x + 1, y)[0] == BG
        || mask.get_pixel(x, y - 1)[0] == BG
        || mask.get_pixel(x, y + 1)[0] == BG
}

/// Angle in degrees, in `[0, 90)`, of the minimum-area rectangle enclosing a convex hull.
///
/// One side of the minimum-area rectangle is always collinear with a hull edge, so only the hull
/// edge directions need testing.
fn min_area_rect_angle(hull: &[Point<i32>]) -> f64 {
    if hull.len() < 3 {
        return 0.0;
    }

    let mut best_area = std::f64::INFINITY;
    let mut best_theta = 0.0;

    for i in 0..hull.len() {
        let p = hull[i];
        let q = hull[(i + 1) % hull.len()];
        let (dx, dy) = ((q.x - p.x) as f64, (q.y - p.y) as f64);
        if dx == 0.0 && dy == 0.0 {
            continue;
        }

        let theta = dy.atan2(dx);
        let (s, c) = theta.sin_cos();

        let mut u = (std::f64::INFINITY, std::f64::NEG_INFINITY);
        let mut v = (std::f64::INFINITY, std::f64::NEG_INFINITY);
        for pt in hull {
            let (x, y) = (pt.x as f64, pt.y as f64);
            let pu = x * c + y * s;
            let pv = -x * s + y * c;
            u = (u.0.min(pu), u.1.max(pu));
            v = (v.0.min(pv), v.1.max(pv));
        }

        let area = (u.1 - u.0) * (v.1 - v.0);
        if area < best_area - 1e-9 {
            best_area = area;
            best_theta = theta;
        }
    }

    let angle = best_theta.to_degrees().rem_euclid(90.0);

    // Snap float noise either side of the wrap point back to axis aligned
    if angle < 1e-6 || angle > 90.0 - 1e-6 {
        0.0
    } else {
        angle
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn fill(mask: &mut Mask, x: u32, y: u32, w: u32, h: u32) {
        for yy in y..y + h {
            for xx in x..x + w {
                mask.put_pixel(xx, yy, Luma([FG]));
            }
        }
    }

    #[test]
    fn test_regions_geometry() {
        let mut mask = Mask::new(100, 80);
        fill(&mut mask, 10, 20, 30, 10);
        fill(&mut mask, 70, 60, 5, 5);

        let regions = regions(&mask);
        assert_eq!(regions.len(), 2);

        let big = &regions[0];
        assert_eq!(big.area, 300);
        assert_eq!(big.bbox, BBox { x: 10, y: 20, w: 30, h: 10 });
        assert_eq!(big.bbox.centre_x(), 25);
        assert_eq!(big.bbox.bottom(), 29);
        assert!((big.centroid.x - 24.5).abs() < 1e-9);
        assert!((big.centroid.y - 24.5).abs() < 1e-9);
        assert_eq!(big.angle_deg, 0.0);
        // Outline of a 30x10 block
        assert_eq!(big.perimeter, 2 * 30 + 2 * 8);

        assert_eq!(regions[1].area, 25);
        assert_eq!(
            union_bbox(&regions),
            Some(BBox { x: 10, y: 20, w: 65, h: 45 })
        );
        assert_eq!(regions_larger_than(&mask, 25).len(), 1);
    }

    #[test]
    fn test_retain_regions() {
        let mut mask = Mask::new(100, 80);
        fill(&mut mask, 10, 20, 30, 10);
        fill(&mut mask, 70, 40, 5, 30);

        let tall = retain_regions(&mask, |r| r.bbox.h > 20);
        let regions = regions(&tall);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].bbox, BBox { x: 70, y: 40, w: 5, h: 30 });

        assert!(regions_larger_than(&retain_regions(&mask, |_| false), 0).is_empty());
    }

    #[test]
    fn test_diagonal_connectivity() {
        let mut mask = Mask::new(10, 10);
        mask.put_pixel(2, 2, Luma([FG]));
        mask.put_pixel(3, 3, Luma([FG]));

        assert_eq!(regions(&mask).len(), 1);
        assert!(largest_region(&Mask::new(10, 10)).is_none());
    }

    #[test]
    fn test_rotated_angle() {
        // A thick stripe rising to the right at 45 degrees in image coordinates
        let mut mask = Mask::new(120, 120);
        for i in 10..90 {
            fill(&mut mask, i, 100 - i, 6, 6);
        }

        let region = largest_region(&mask).unwrap();
        assert!(
            (region.angle_deg - 45.0).abs() < 3.0,
            "angle was {}",
            region.angle_deg
        );
    }
}
