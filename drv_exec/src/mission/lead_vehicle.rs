//! # [`MissionMgr`](super::MissionMgr) lead vehicle pass
//!
//! At the end of the road the vehicle stops and watches the moving vehicle ahead for a few
//! cycles, so that the background model settles, then decides which way round to go:
//!
//! - `right` if the lead vehicle is near and on the left of the frame,
//! - `wait` if it's large in the frame, deciding again next cycle,
//! - `left` otherwise.
//!
//! Once the route marker reaches the bottom of the frame the vehicle creeps forward onto it.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::drive::VelCmd;
use log::{debug, info};
use serde::Deserialize;

use super::{
    params::{DriveSpeeds, MissionParams},
    states::RouteMarkerSegment,
    CycleInput, MissionOutput, MissionPersistantData, MissionState, StepOutput,
};
use crate::{
    ctrl::{lane_error, LaneFallback},
    per::{
        detect::{lead_vehicle::classify, LeadVehicleDir},
        road::find_centre,
        ScanParams,
    },
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Lead vehicle pass state of the MissionMgr.
///
/// Possible transitions:
/// - RouteMarker, once the way round has been chosen and the route marker is at the bottom of
///   the frame
#[derive(Debug, Default)]
pub struct LeadVehiclePass;

#[derive(Debug, Clone, Deserialize)]
pub struct LeadVehiclePassParams {
    /// Cycles to wait after stopping before the lead vehicle is classified
    pub settle_cycles: u64,

    pub scan: ScanParams,

    /// Proportional gain when passing on the left
    pub kp: f64,

    pub speeds: DriveSpeeds,

    /// Multiplier on the error towards the virtual left target
    pub left_amplifier: f64,

    /// Proportional gain when passing on the right
    pub right_kp: f64,

    pub right_lin_speed_ms: f64,

    pub right_rot_gain: f64,

    /// Forward creep onto the route marker
    pub creep_lin_speed_ms: f64,
    pub creep_s: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for LeadVehiclePassParams {
    fn default() -> Self {
        Self {
            settle_cycles: 13,
            scan: ScanParams {
                offset_px: 200,
                line_width_px: 150,
            },
            kp: 11.0,
            speeds: DriveSpeeds::default(),
            left_amplifier: 1.5,
            right_kp: 12.0,
            right_lin_speed_ms: 0.7,
            right_rot_gain: 1.0,
            creep_lin_speed_ms: 0.5,
            creep_s: 0.3,
        }
    }
}

impl LeadVehiclePass {
    pub fn new() -> Self {
        Self
    }

    pub fn step(
        &mut self,
        params: &MissionParams,
        persistant: &mut MissionPersistantData,
        input: &CycleInput,
    ) -> StepOutput {
        let lead = &params.lead_vehicle;
        let frame = input.frame;
        let width = frame.width();

        // Decide which way round to go
        if !persistant.ctx.reached_lead_vehicle {
            let ctx = &mut persistant.ctx;

            if ctx.cycle_count >= ctx.lead_phase_start_cycle + lead.settle_cycles {
                let obs = persistant.bank.lead_vehicle();
                let dir = classify(&obs, width, &params.detect.lead_vehicle);

                if dir != ctx.lead_vehicle_dir {
                    info!("Passing the lead vehicle: {}", dir);
                }

                ctx.lead_vehicle_dir = dir;
                ctx.reached_lead_vehicle = dir != LeadVehicleDir::Wait;
            }

            return StepOutput::drive(VelCmd::stop());
        }

        let centre = find_centre(&persistant.bank.road_mask(frame), &lead.scan);
        persistant.tm.lane_centre = centre;

        let cmd = match persistant.ctx.lead_vehicle_dir {
            LeadVehicleDir::Right => {
                let fallback = LaneFallback::Target {
                    column: 3 * width / 4,
                    amplifier: 1.0,
                };
                let e = lane_error(centre, width, fallback).value();
                persistant.tm.last_error = e;

                VelCmd::new(lead.right_lin_speed_ms, lead.right_rot_gain * lead.right_kp * e)
            }
            _ => {
                let fallback = LaneFallback::Target {
                    column: width / 4,
                    amplifier: lead.left_amplifier,
                };
                let e = lane_error(centre, width, fallback).value();
                persistant.tm.last_error = e;

                lead.speeds.cmd(lead.kp * e, input.candidate_visible)
            }
        };

        if persistant
            .bank
            .route_marker(frame)
            .in_scan_zone(&params.detect.route_marker)
        {
            debug!("Route marker reached");
            return StepOutput::transition(
                MissionState::RouteMarker(RouteMarkerSegment::new()),
                MissionOutput::DriveHold {
                    cmd: VelCmd::straight(lead.creep_lin_speed_ms),
                    hold_s: lead.creep_s,
                },
            );
        }

        StepOutput::drive(cmd)
    }
}
