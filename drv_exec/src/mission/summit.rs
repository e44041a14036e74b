//! # [`MissionMgr`](super::MissionMgr) summit approach

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::drive::VelCmd;
use log::{debug, info};
use serde::Deserialize;

use super::{
    params::MissionParams, CycleInput, MissionOutput, MissionPersistantData, MissionState,
    StepOutput,
};
use crate::per::road::centre_offset;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Summit approach state of the MissionMgr.
///
/// Steers on the summit board until close to it, then stops and submits the clues.
#[derive(Debug, Default)]
pub struct SummitApproach;

#[derive(Debug, Clone, Deserialize)]
pub struct SummitApproachParams {
    pub kp: f64,

    pub lin_speed_ms: f64,

    pub rot_gain: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for SummitApproachParams {
    fn default() -> Self {
        Self {
            kp: 9.0,
            lin_speed_ms: 0.3,
            rot_gain: 1.0,
        }
    }
}

impl SummitApproach {
    pub fn new() -> Self {
        Self
    }

    pub fn step(
        &mut self,
        params: &MissionParams,
        persistant: &mut MissionPersistantData,
        input: &CycleInput,
    ) -> StepOutput {
        let summit = &params.summit;
        let frame = input.frame;
        let obs = persistant.bank.summit(frame);

        if obs.close || persistant.ctx.past_ceiling(&params.timing) {
            info!("At the summit on cycle {}", persistant.ctx.cycle_count);
            return StepOutput::transition(
                MissionState::ClueSubmission,
                MissionOutput::Drive(VelCmd::stop()),
            );
        }

        match obs.centre_x {
            Some(c) => {
                let e = summit.kp * centre_offset(c, frame.width());
                debug!("Summit board at {}, error {:.3}", c, e);
                persistant.tm.last_error = e;

                StepOutput::drive(VelCmd::new(summit.lin_speed_ms, summit.rot_gain * e))
            }
            None => StepOutput::drive(VelCmd::straight(summit.lin_speed_ms)),
        }
    }
}
