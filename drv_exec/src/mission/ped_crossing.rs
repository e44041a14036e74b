//! # [`MissionMgr`](super::MissionMgr) pedestrian crossing

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::drive::VelCmd;
use log::{debug, info};
use serde::Deserialize;

use super::{
    params::MissionParams, states::Road, CycleInput, MissionOutput, MissionPersistantData,
    MissionState, StepOutput,
};
use crate::ctrl::align_rate;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Pedestrian crossing state of the MissionMgr.
///
/// Squares up to the crosswalk line, drives up to it and waits until the crossing has been clear
/// for long enough, then crosses and returns to Road.
#[derive(Debug)]
pub struct PedCrossing {
    phase: PedCrossingPhase,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PedCrossingParams {
    /// Line angles strictly between these limits need squaring up, in degrees
    pub min_angle_deg: f64,
    pub max_angle_deg: f64,

    pub align_lin_speed_ms: f64,

    /// Turn rate per degree of line angle while squaring up
    pub align_rot_gain: f64,

    pub approach_lin_speed_ms: f64,

    /// Row the line centroid must reach before stopping
    pub stop_y_px: f64,

    /// Number of consecutive clear cycles after which the crossing is taken
    pub safe_cycles: u32,

    /// Speed used to cross
    pub cross_lin_speed_ms: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PedCrossingPhase {
    /// Turning square to the line
    Align,

    /// Driving up to the line
    Approach,

    /// Stopped at the line, counting clear cycles
    Wait { safe_count: u32 },
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for PedCrossingParams {
    fn default() -> Self {
        Self {
            min_angle_deg: 1.0,
            max_angle_deg: 89.0,
            align_lin_speed_ms: 0.4,
            align_rot_gain: 0.3,
            approach_lin_speed_ms: 0.5,
            stop_y_px: 400.0,
            safe_cycles: 5,
            cross_lin_speed_ms: 2.5,
        }
    }
}

impl PedCrossing {
    pub fn new() -> Self {
        Self {
            phase: PedCrossingPhase::Align,
        }
    }

    pub fn phase(&self) -> PedCrossingPhase {
        self.phase
    }

    pub fn step(
        &mut self,
        params: &MissionParams,
        persistant: &mut MissionPersistantData,
        input: &CycleInput,
    ) -> StepOutput {
        let ped = &params.ped_crossing;
        let frame = input.frame;
        let past_ceiling = persistant.ctx.past_ceiling(&params.timing);

        loop {
            match self.phase {
                PedCrossingPhase::Align => {
                    let angle = persistant.bank.crosswalk(frame).angle_deg;

                    if !past_ceiling && ped.min_angle_deg < angle && angle < ped.max_angle_deg {
                        return StepOutput::drive(VelCmd::new(
                            ped.align_lin_speed_ms,
                            align_rate(angle, ped.align_rot_gain),
                        ));
                    }

                    debug!("Square to the crosswalk at {:.1} deg", angle);
                    self.phase = PedCrossingPhase::Approach;
                }
                PedCrossingPhase::Approach => {
                    if !past_ceiling && persistant.bank.crosswalk(frame).centroid_y < ped.stop_y_px {
                        return StepOutput::drive(VelCmd::straight(ped.approach_lin_speed_ms));
                    }

                    debug!("At the crosswalk, waiting for it to clear");
                    self.phase = PedCrossingPhase::Wait { safe_count: 0 };
                }
                PedCrossingPhase::Wait { safe_count } => {
                    if persistant.bank.pedestrian_occupied(frame) {
                        self.phase = PedCrossingPhase::Wait { safe_count: 0 };
                        return StepOutput::drive(VelCmd::stop());
                    }

                    let safe_count = safe_count + 1;
                    self.phase = PedCrossingPhase::Wait { safe_count };

                    if safe_count > ped.safe_cycles {
                        info!("Crosswalk clear, crossing");
                        persistant.ctx.reached_crosswalk = true;

                        return StepOutput::transition(
                            MissionState::Road(Road::new()),
                            MissionOutput::Drive(VelCmd::straight(ped.cross_lin_speed_ms)),
                        );
                    }

                    return StepOutput::drive(VelCmd::stop());
                }
            }
        }
    }
}
