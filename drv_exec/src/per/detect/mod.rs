//! # Event detector bank
//!
//! Every detector is a thin composition of colour segmentation and region analysis. Those that
//! look for motion own a background model, all of which live in the [`DetectorBank`] and are
//! updated once per cycle through [`DetectorBank::update`], whether or not the active state
//! consults them.
//!
//! Detectors never fail, an absent signal is reported as `None`, `false` or a fixed sentinel.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod crosswalk;
pub mod lead_vehicle;
pub mod obstacle;
pub mod pedestrian;
pub mod route_marker;
pub mod summit;
pub mod terrain;
pub mod tunnel;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

use super::{
    bg_model::BackgroundModel,
    frame::Frame,
    segment::{GrayWindow, Mask},
};

pub use crosswalk::{CrosswalkObs, CrosswalkParams};
pub use lead_vehicle::{LeadVehicleDir, LeadVehicleObs, LeadVehicleParams};
pub use obstacle::{AreaRange, CactusParams, MascotParams};
pub use pedestrian::PedestrianParams;
pub use route_marker::{RouteMarkerObs, RouteMarkerParams};
pub use summit::{SummitObs, SummitParams};
pub use terrain::{HillStallParams, TerrainParams};
pub use tunnel::{TunnelObs, TunnelParams};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters of every detector in the bank.
#[derive(Debug, Clone, Deserialize)]
pub struct DetectParams {
    /// Window selecting the white paint of the paved road
    pub road_window: GrayWindow,

    pub crosswalk: CrosswalkParams,
    pub pedestrian: PedestrianParams,
    pub lead_vehicle: LeadVehicleParams,
    pub route_marker: RouteMarkerParams,
    pub mascot: MascotParams,
    pub cactus: CactusParams,
    pub tunnel: TunnelParams,
    pub summit: SummitParams,
    pub terrain: TerrainParams,
    pub hill_stall: HillStallParams,
}

/// The detectors and the background models behind them.
///
/// Each background model is a separate owned field, fed only with its own region of interest.
pub struct DetectorBank {
    params: DetectParams,

    pedestrian_model: BackgroundModel,
    lead_vehicle_model: BackgroundModel,
    hill_stall_model: BackgroundModel,

    /// Foreground of the current cycle, per model
    pedestrian_fg: Option<Mask>,
    lead_vehicle_fg: Option<Mask>,
    hill_stall_fg: Option<Mask>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for DetectParams {
    fn default() -> Self {
        Self {
            road_window: GrayWindow { min: 250, max: 255 },
            crosswalk: CrosswalkParams::default(),
            pedestrian: PedestrianParams::default(),
            lead_vehicle: LeadVehicleParams::default(),
            route_marker: RouteMarkerParams::default(),
            mascot: MascotParams::default(),
            cactus: CactusParams::default(),
            tunnel: TunnelParams::default(),
            summit: SummitParams::default(),
            terrain: TerrainParams::default(),
            hill_stall: HillStallParams::default(),
        }
    }
}

impl DetectorBank {
    pub fn new(params: DetectParams) -> Self {
        Self {
            pedestrian_model: BackgroundModel::new(params.pedestrian.bg_model),
            lead_vehicle_model: BackgroundModel::new(params.lead_vehicle.bg_model),
            hill_stall_model: BackgroundModel::new(params.hill_stall.bg_model),
            params,
            pedestrian_fg: None,
            lead_vehicle_fg: None,
            hill_stall_fg: None,
        }
    }

    pub fn params(&self) -> &DetectParams {
        &self.params
    }

    /// Feed the frame to every background model.
    pub fn update(&mut self, frame: &Frame) {
        let crop = self.params.pedestrian.crop.crop(&frame.image);
        let pedestrian_model = &mut self.pedestrian_model;
        self.pedestrian_fg = crop.map(|c| pedestrian_model.apply(&c));
        self.lead_vehicle_fg = Some(self.lead_vehicle_model.apply(&frame.image));
        self.hill_stall_fg = Some(self.hill_stall_model.apply(&frame.image));
    }

    pub fn pedestrian_model(&self) -> &BackgroundModel {
        &self.pedestrian_model
    }

    pub fn lead_vehicle_model(&self) -> &BackgroundModel {
        &self.lead_vehicle_model
    }

    pub fn hill_stall_model(&self) -> &BackgroundModel {
        &self.hill_stall_model
    }

    /// Mask of the white road paint.
    pub fn road_mask(&self, frame: &Frame) -> Mask {
        self.params.road_window.mask(&frame.image)
    }

    pub fn crosswalk(&self, frame: &Frame) -> CrosswalkObs {
        crosswalk::detect(&frame.image, &self.params.crosswalk)
    }

    /// Returns true if someone is on, or about to step onto, the crossing.
    ///
    /// Before the first update nothing is known to be moving, so the crossing is free.
    pub fn pedestrian_occupied(&self, frame: &Frame) -> bool {
        let params = &self.params.pedestrian;

        match (&self.pedestrian_fg, params.crop.crop(&frame.image)) {
            (Some(fg), Some(crop)) => pedestrian::is_occupied(&crop, fg, params),
            _ => false,
        }
    }

    pub fn lead_vehicle(&self) -> LeadVehicleObs {
        self.lead_vehicle_fg
            .as_ref()
            .map(lead_vehicle::observe)
            .unwrap_or_default()
    }

    pub fn route_marker(&self, frame: &Frame) -> RouteMarkerObs {
        route_marker::detect(&frame.image, &self.params.route_marker)
    }

    pub fn mascot_present(&self, frame: &Frame) -> bool {
        obstacle::mascot_present(&frame.image, &self.params.mascot)
    }

    pub fn cactus_present(&self, frame: &Frame) -> bool {
        obstacle::cactus_present(&frame.image, &self.params.cactus, &self.params.mascot)
    }

    pub fn tunnel(&self, frame: &Frame) -> TunnelObs {
        tunnel::detect(&frame.image, &self.params.tunnel)
    }

    pub fn summit(&self, frame: &Frame) -> SummitObs {
        summit::detect(&frame.image, &self.params.summit)
    }

    pub fn terrain_mask(&self, frame: &Frame) -> Mask {
        terrain::line_mask(&frame.image, &self.params.terrain)
    }

    pub fn climb_mask(&self, frame: &Frame) -> Mask {
        terrain::climb_mask(&frame.image, &self.params.terrain)
    }

    pub fn on_road_surface(&self, frame: &Frame, column: u32, row: u32) -> bool {
        terrain::on_road_surface(&frame.image, column, row, &self.params.terrain)
    }

    /// Returns true if the vehicle appears to have stalled. Without a foreground yet there is no
    /// evidence of motion, so the vehicle counts as stalled.
    pub fn hill_stalled(&self) -> bool {
        match self.hill_stall_fg {
            Some(ref fg) => terrain::hill_stalled(fg, &self.params.hill_stall),
            None => true,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TEST UTILITIES
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod test_util {
    use image::{Rgb, RgbImage};

    pub const WIDTH: u32 = 1280;
    pub const HEIGHT: u32 = 720;

    /// A dark, colourless frame none of the detectors respond to.
    pub fn scene() -> RgbImage {
        RgbImage::from_pixel(WIDTH, HEIGHT, Rgb([40, 40, 40]))
    }

    /// Fill a rectangle, clipped to the image.
    pub fn fill(img: &mut RgbImage, x: u32, y: u32, w: u32, h: u32, rgb: [u8; 3]) {
        for yy in y..(y + h).min(img.height()) {
            for xx in x..(x + w).min(img.width()) {
                img.put_pixel(xx, yy, Rgb(rgb));
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::test_util::*;
    use super::*;
    use chrono::{TimeZone, Utc};

    fn frame(img: image::RgbImage, seq: u64) -> Frame {
        Frame::new(
            img,
            Utc.timestamp_millis_opt(seq as i64 * 100).unwrap(),
            seq,
        )
    }

    #[test]
    fn test_models_are_separate() {
        let mut bank = DetectorBank::new(DetectParams::default());

        assert!(!std::ptr::eq(
            bank.pedestrian_model(),
            bank.lead_vehicle_model()
        ));
        assert!(!std::ptr::eq(
            bank.lead_vehicle_model(),
            bank.hill_stall_model()
        ));

        for seq in 0..4 {
            bank.update(&frame(scene(), seq));
        }

        assert_eq!(bank.pedestrian_model().frames_seen(), 4);
        assert_eq!(bank.lead_vehicle_model().frames_seen(), 4);
        assert_eq!(bank.hill_stall_model().frames_seen(), 4);
    }

    #[test]
    fn test_lead_vehicle_motion() {
        let mut bank = DetectorBank::new(DetectParams::default());
        assert_eq!(bank.lead_vehicle(), LeadVehicleObs::default());
        assert!(bank.hill_stalled());

        for seq in 0..3 {
            bank.update(&frame(scene(), seq));
        }
        assert!(bank.hill_stalled());

        let mut img = scene();
        fill(&mut img, 100, 300, 40, 30, [250, 250, 250]);
        bank.update(&frame(img, 3));

        assert_eq!(
            bank.lead_vehicle(),
            LeadVehicleObs {
                area: 1200,
                centre_x: 120
            }
        );
        assert!(!bank.hill_stalled());
    }

    #[test]
    fn test_pedestrian_motion() {
        let mut bank = DetectorBank::new(DetectParams::default());
        let f = frame(scene(), 0);
        assert!(!bank.pedestrian_occupied(&f));

        for seq in 0..3 {
            bank.update(&frame(scene(), seq));
        }

        // Someone walking inside the crosswalk crop, no lane edges visible
        let mut img = scene();
        fill(&mut img, 600, 340, 20, 60, [250, 250, 0]);
        let f = frame(img, 3);
        bank.update(&f);

        assert!(bank.pedestrian_occupied(&f));
    }
}
