//! Lead vehicle detector
//!
//! At the intersection the vehicle waits for the lead vehicle to show itself in the full-frame
//! background model. Its size and position decide which way the vehicle turns to pass it.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::per::{bg_model::BgModelParams, region::largest_region, segment::Mask};

#[derive(Debug, Clone, Deserialize)]
pub struct LeadVehicleParams {
    pub bg_model: BgModelParams,

    /// A lead vehicle on the left of the frame larger than this is passed on the right
    pub right_area: u32,

    /// A lead vehicle larger than this, anywhere but the left, is waited for
    pub wait_area: u32,

    /// A lead vehicle larger than this is close
    pub presence_area: u32,
}

/// Size and position of the largest moving region in the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LeadVehicleObs {
    /// Pixel area, 0 when nothing is moving
    pub area: u32,

    /// Bounding box centre column, 0 when nothing is moving
    pub centre_x: u32,
}

/// Which way to pass the lead vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeadVehicleDir {
    Unknown,
    Left,
    Right,
    Wait,
}

impl Default for LeadVehicleParams {
    fn default() -> Self {
        Self {
            bg_model: BgModelParams::default(),
            right_area: 580,
            wait_area: 7000,
            presence_area: 5000,
        }
    }
}

impl Default for LeadVehicleDir {
    fn default() -> Self {
        LeadVehicleDir::Unknown
    }
}

impl LeadVehicleObs {
    /// Returns true if the lead vehicle is large enough to be considered close.
    pub fn is_close(&self, params: &LeadVehicleParams) -> bool {
        self.area > params.presence_area
    }
}

impl std::fmt::Display for LeadVehicleDir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LeadVehicleDir::Unknown => write!(f, "unknown"),
            LeadVehicleDir::Left => write!(f, "left"),
            LeadVehicleDir::Right => write!(f, "right"),
            LeadVehicleDir::Wait => write!(f, "wait"),
        }
    }
}

/// Observe the lead vehicle in a full-frame foreground mask.
pub fn observe(fg: &Mask) -> LeadVehicleObs {
    match largest_region(fg) {
        Some(r) => LeadVehicleObs {
            area: r.area,
            centre_x: r.bbox.centre_x(),
        },
        None => LeadVehicleObs::default(),
    }
}

/// Choose how to pass the lead vehicle.
///
/// A large enough vehicle on the left half is passed on the right. A very large vehicle anywhere
/// else means waiting. Everything else, including no vehicle at all, is passed on the left.
pub fn classify(obs: &LeadVehicleObs, width: u32, params: &LeadVehicleParams) -> LeadVehicleDir {
    let dir = if obs.centre_x < width / 2 && obs.area > params.right_area {
        LeadVehicleDir::Right
    } else if obs.area > params.wait_area {
        LeadVehicleDir::Wait
    } else {
        LeadVehicleDir::Left
    };

    debug!(
        "Lead vehicle area {} at column {} (close: {}), passing {}",
        obs.area,
        obs.centre_x,
        obs.is_close(params),
        dir
    );

    dir
}

#[cfg(test)]
mod test {
    use super::*;
    use image::Luma;

    #[test]
    fn test_classify() {
        let params = LeadVehicleParams::default();
        let obs = |area, centre_x| LeadVehicleObs { area, centre_x };

        assert_eq!(classify(&obs(600, 300), 1280, &params), LeadVehicleDir::Right);
        assert_eq!(classify(&obs(8000, 300), 1280, &params), LeadVehicleDir::Right);
        assert_eq!(classify(&obs(8000, 900), 1280, &params), LeadVehicleDir::Wait);
        assert_eq!(classify(&obs(500, 300), 1280, &params), LeadVehicleDir::Left);
        assert_eq!(classify(&obs(0, 0), 1280, &params), LeadVehicleDir::Left);

        assert!(obs(6000, 0).is_close(&params));
        assert!(!obs(5000, 0).is_close(&params));
    }

    #[test]
    fn test_observe() {
        let mut fg = Mask::new(100, 50);
        for y in 10..20 {
            for x in 30..50 {
                fg.put_pixel(x, y, Luma([255]));
            }
        }

        assert_eq!(
            observe(&fg),
            LeadVehicleObs {
                area: 200,
                centre_x: 40
            }
        );
        assert_eq!(observe(&Mask::new(100, 50)), LeadVehicleObs::default());
    }
}
