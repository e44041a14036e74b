//! # [`MissionMgr`](super::MissionMgr) road following

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{debug, info};
use serde::Deserialize;

use super::{
    params::{DriveSpeeds, MissionParams},
    states::{LeadVehiclePass, PedCrossing},
    CycleInput, MissionOutput, MissionPersistantData, MissionState, StepOutput,
};
use crate::{
    ctrl::{lane_error, LaneError, LaneFallback},
    per::{road::find_centre, ScanParams},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Road state of the MissionMgr.
///
/// Follows the white road paint. Possible transitions:
/// - PedCrossing, when the crosswalk comes into view for the first time
/// - LeadVehiclePass, when the road runs out after the crosswalk and enough clues have been
///   captured
#[derive(Debug, Default)]
pub struct Road;

#[derive(Debug, Clone, Deserialize)]
pub struct RoadParams {
    pub scan: ScanParams,

    /// Proportional gain on the lane error
    pub kp: f64,

    pub speeds: DriveSpeeds,

    /// Clues that must have been captured before the road can be left for the lead vehicle
    pub lead_min_signs: usize,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for RoadParams {
    fn default() -> Self {
        Self {
            scan: ScanParams {
                offset_px: 200,
                line_width_px: 150,
            },
            kp: 11.0,
            speeds: DriveSpeeds::default(),
            lead_min_signs: 2,
        }
    }
}

impl Road {
    pub fn new() -> Self {
        Self
    }

    pub fn step(
        &mut self,
        params: &MissionParams,
        persistant: &mut MissionPersistantData,
        input: &CycleInput,
    ) -> StepOutput {
        let road = &params.road;
        let frame = input.frame;

        if !persistant.ctx.reached_crosswalk && persistant.bank.crosswalk(frame).present {
            info!("Crosswalk ahead");
            return StepOutput::transition(
                MissionState::PedCrossing(PedCrossing::new()),
                MissionOutput::None,
            );
        }

        let num_signs = persistant.num_signs();
        let slow = input.candidate_visible;

        let fallback = if persistant.ctx.reached_crosswalk
            && !persistant.ctx.reached_lead_vehicle
            && num_signs >= road.lead_min_signs
        {
            LaneFallback::RequestTransition
        } else {
            LaneFallback::Straight
        };

        let centre = find_centre(&persistant.bank.road_mask(frame), &road.scan);
        persistant.tm.lane_centre = centre;

        match lane_error(centre, frame.width(), fallback) {
            LaneError::RequestTransition => {
                info!("End of the road, waiting for the lead vehicle");
                persistant.ctx.lead_phase_start_cycle = persistant.ctx.cycle_count;
                persistant.tm.last_error = 0.0;

                StepOutput::transition(
                    MissionState::LeadVehiclePass(LeadVehiclePass::new()),
                    MissionOutput::Drive(road.speeds.cmd(0.0, slow)),
                )
            }
            LaneError::Error(e) => {
                debug!("Road centre {:?}, error {:.3}, slow {}", centre, e, slow);
                persistant.tm.last_error = e;

                StepOutput::drive(road.speeds.cmd(road.kp * e, slow))
            }
        }
    }
}
