//! Route marker detector
//!
//! The magenta route marker lines separate the course segments. How the largest marker region is
//! read depends on the segment the vehicle is in, so the observation keeps the region and exposes
//! one accessor per reading.

use image::RgbImage;
use serde::Deserialize;

use crate::per::{
    region::{largest_region, Region},
    segment::HsvWindow,
};

#[derive(Debug, Clone, Deserialize)]
pub struct RouteMarkerParams {
    pub window: HsvWindow,

    /// While passing the lead vehicle the marker is present once its top is within this distance
    /// of the bottom of the frame, in pixels
    pub scan_offset_px: u32,

    /// On the route marker segment the marker is present above this area
    pub segment_min_area: u32,

    /// On the route marker segment a marker below this area has been driven past
    pub past_line_area: u32,

    /// At the tunnel gate the marker is present above this area
    pub gate_min_area: u32,
}

/// The largest marker region in a frame.
#[derive(Debug, Clone)]
pub struct RouteMarkerObs {
    pub region: Option<Region>,

    /// Height of the frame the marker was found in
    pub img_height: u32,
}

impl Default for RouteMarkerParams {
    fn default() -> Self {
        Self {
            window: HsvWindow::new([150, 90, 110], [175, 255, 255]),
            scan_offset_px: 200,
            segment_min_area: 5000,
            past_line_area: 1000,
            gate_min_area: 100,
        }
    }
}

impl RouteMarkerObs {
    fn area(&self) -> u32 {
        self.region.as_ref().map_or(0, |r| r.area)
    }

    /// Marker reached the bottom of the frame.
    pub fn in_scan_zone(&self, params: &RouteMarkerParams) -> bool {
        match self.region {
            Some(ref r) => r.bbox.y >= self.img_height.saturating_sub(params.scan_offset_px),
            None => false,
        }
    }

    /// Marker present on the route marker segment.
    pub fn segment_present(&self, params: &RouteMarkerParams) -> bool {
        self.area() > params.segment_min_area
    }

    /// Centroid row on the route marker segment, the bottom row of the frame when the marker has
    /// been driven past.
    pub fn segment_centroid_y(&self, params: &RouteMarkerParams) -> f64 {
        match self.region {
            Some(ref r) if r.area >= params.past_line_area => r.centroid.y,
            _ => self.img_height.saturating_sub(1) as f64,
        }
    }

    /// Marker present at the tunnel gate.
    pub fn gate_present(&self, params: &RouteMarkerParams) -> bool {
        self.area() > params.gate_min_area
    }

    /// Bounding box centre of the marker, `(0, 0)` when no marker is visible.
    pub fn gate_centre(&self) -> (u32, u32) {
        self.region
            .as_ref()
            .map_or((0, 0), |r| (r.bbox.centre_x(), r.bbox.centre_y()))
    }

    /// Angle of the marker's minimum-area rectangle, 0 when no marker is visible.
    pub fn angle_deg(&self) -> f64 {
        self.region.as_ref().map_or(0.0, |r| r.angle_deg)
    }
}

pub fn detect(img: &RgbImage, params: &RouteMarkerParams) -> RouteMarkerObs {
    RouteMarkerObs {
        region: largest_region(&params.window.mask(img)),
        img_height: img.height(),
    }
}
