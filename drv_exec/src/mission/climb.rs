//! # [`MissionMgr`](super::MissionMgr) climb
//!
//! The mountain lane is steep and the lane lines are often lost over the brow of a rise. The
//! vehicle steers with a PD law on the lane error, and whenever the lane centre isn't on the
//! road surface it drives straight and asks for a boost, a single hard left pulse given at most
//! every other cycle once the climb is well under way.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::drive::VelCmd;
use log::{debug, info};
use serde::Deserialize;

use super::{
    params::MissionParams, states::SummitApproach, CycleInput, MissionOutput,
    MissionPersistantData, MissionState, StepOutput,
};
use crate::{
    ctrl::derivative,
    per::{
        road::{centre_offset, find_centre, scan_row},
        segment::is_empty,
        ScanParams,
    },
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Climb state of the MissionMgr.
///
/// Possible transitions:
/// - Summit, once the summit board is in view
#[derive(Debug, Default)]
pub struct Climb;

#[derive(Debug, Clone, Deserialize)]
pub struct ClimbParams {
    /// Speed while looking for the lane lines
    pub seek_lin_speed_ms: f64,

    /// Time the last command is held for once the lines are found, in seconds
    pub settle_s: f64,

    pub scan: ScanParams,

    pub kp: f64,
    pub kd: f64,

    /// Multiplier from the PD output to the turn rate
    pub rot_scale: f64,

    /// Most negative turn rate allowed
    pub min_rot_rads: f64,

    pub lin_speed_ms: f64,

    /// Cycles after finding the lines before any boost is given
    pub boost_after_cycles: u64,

    pub boost_lin_speed_ms: f64,
    pub boost_rot_rads: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for ClimbParams {
    fn default() -> Self {
        Self {
            seek_lin_speed_ms: 0.5,
            settle_s: 0.4,
            scan: ScanParams {
                offset_px: 215,
                line_width_px: 450,
            },
            kp: 8.0,
            kd: 0.5,
            rot_scale: 1.2,
            min_rot_rads: -1.5,
            lin_speed_ms: 0.3,
            boost_after_cycles: 150,
            boost_lin_speed_ms: 0.5,
            boost_rot_rads: 0.9,
        }
    }
}

impl Climb {
    pub fn new() -> Self {
        Self
    }

    pub fn step(
        &mut self,
        params: &MissionParams,
        persistant: &mut MissionPersistantData,
        input: &CycleInput,
    ) -> StepOutput {
        let climb = &params.climb;
        let frame = input.frame;
        let past_ceiling = persistant.ctx.past_ceiling(&params.timing);

        let mask = persistant.bank.climb_mask(frame);

        // Creep forward until the lane lines show up
        if !persistant.ctx.found_climb_lines {
            if !past_ceiling && is_empty(&mask) {
                return StepOutput::drive(VelCmd::straight(climb.seek_lin_speed_ms));
            }

            info!("Found the climb lines");
            persistant.ctx.found_climb_lines = true;
            persistant.ctx.climb_start_cycle = persistant.ctx.cycle_count;

            return StepOutput::hold(persistant.ramp.last(), climb.settle_s);
        }

        if past_ceiling || persistant.bank.summit(frame).centre_x.is_some() {
            info!("Summit board in view");
            return StepOutput::transition(
                MissionState::Summit(SummitApproach::new()),
                MissionOutput::None,
            );
        }

        // Lane error, forced to zero when the centre isn't on the road
        let centre = find_centre(&mask, &climb.scan);
        let row = scan_row(frame.height(), climb.scan.offset_px);
        persistant.tm.lane_centre = centre;

        let error = match centre {
            Some(c) if persistant.bank.on_road_surface(frame, c, row) => {
                centre_offset(c, frame.width())
            }
            _ => {
                persistant.ctx.boost_pending = true;
                0.0
            }
        };

        let ctx = &mut persistant.ctx;
        let d = derivative(error, ctx.prev_error, ctx.dt_s);
        ctx.prev_error = error;
        persistant.tm.last_error = error;

        let rot_amp = climb.kp * error + climb.kd * d;

        if ctx.boost_pending
            && ctx.cycle_count - ctx.climb_start_cycle > climb.boost_after_cycles
            && ctx.cycle_count > ctx.boost_cycle + 1
        {
            debug!("Boosting on cycle {}", ctx.cycle_count);
            ctx.boost_pending = false;
            ctx.boost_cycle = ctx.cycle_count;

            return StepOutput::drive(VelCmd::new(
                climb.boost_lin_speed_ms,
                climb.boost_rot_rads,
            ));
        }

        let rot = (climb.rot_scale * rot_amp).max(climb.min_rot_rads);
        StepOutput::drive(VelCmd::new(climb.lin_speed_ms, rot))
    }
}
