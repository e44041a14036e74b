//! # MissionMgr Parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::drive::VelCmd;
use serde::Deserialize;

use crate::{
    clue::{board::BoardParams, ClueParams},
    ctrl::RampParams,
    per::DetectParams,
};

use super::{
    climb::ClimbParams, lead_vehicle::LeadVehiclePassParams, mascot::MascotObstacleParams,
    ped_crossing::PedCrossingParams, road::RoadParams, route_marker::RouteMarkerSegmentParams,
    summit::SummitApproachParams, tunnel::TunnelStateParams,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MissionParams {
    pub timing: TimingParams,

    pub ramp: RampParams,

    pub clue: ClueParams,

    pub board: BoardParams,

    pub detect: DetectParams,

    pub road: RoadParams,

    pub ped_crossing: PedCrossingParams,

    pub lead_vehicle: LeadVehiclePassParams,

    pub route_marker: RouteMarkerSegmentParams,

    pub mascot: MascotObstacleParams,

    pub tunnel: TunnelStateParams,

    pub climb: ClimbParams,

    pub summit: SummitApproachParams,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimingParams {
    /// Once the cycle count exceeds this the clues are submitted, wherever the vehicle is
    pub deadline_cycle: u64,

    /// From this cycle on every waiting sub-phase gives up and moves on
    pub sub_loop_ceiling: u64,
}

/// Lane following speeds, normal and while a clue board is in view.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DriveSpeeds {
    pub lin_speed_ms: f64,

    /// Multiplier on the steering command
    pub rot_gain: f64,

    pub sign_lin_speed_ms: f64,

    pub sign_rot_gain: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for TimingParams {
    fn default() -> Self {
        Self {
            deadline_cycle: 1700,
            sub_loop_ceiling: 1500,
        }
    }
}

impl Default for DriveSpeeds {
    fn default() -> Self {
        Self {
            lin_speed_ms: 0.5,
            rot_gain: 1.0,
            sign_lin_speed_ms: 0.25,
            sign_rot_gain: 1.1,
        }
    }
}

impl DriveSpeeds {
    /// Command for the given steering value, slowing down to read a sign if `slow` is set.
    pub fn cmd(&self, steer: f64, slow: bool) -> VelCmd {
        match slow {
            true => VelCmd::new(self.sign_lin_speed_ms, self.sign_rot_gain * steer),
            false => VelCmd::new(self.lin_speed_ms, self.rot_gain * steer),
        }
    }
}
