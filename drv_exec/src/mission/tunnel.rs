//! # [`MissionMgr`](super::MissionMgr) tunnel

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::drive::VelCmd;
use log::info;
use serde::Deserialize;

use super::{
    params::MissionParams, states::Climb, CycleInput, MissionOutput, MissionPersistantData,
    MissionState, StepOutput,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Tunnel state of the MissionMgr.
///
/// Drives straight through while the tunnel fills the view, then settles into Climb.
#[derive(Debug, Default)]
pub struct Tunnel;

#[derive(Debug, Clone, Deserialize)]
pub struct TunnelStateParams {
    /// Still inside the tunnel while its area is above this
    pub inside_area: u32,

    pub lin_speed_ms: f64,

    /// Time the last command is held for when leaving the tunnel, in seconds
    pub exit_settle_s: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for TunnelStateParams {
    fn default() -> Self {
        Self {
            inside_area: 10000,
            lin_speed_ms: 1.2,
            exit_settle_s: 0.5,
        }
    }
}

impl Tunnel {
    pub fn new() -> Self {
        Self
    }

    pub fn step(
        &mut self,
        params: &MissionParams,
        persistant: &mut MissionPersistantData,
        input: &CycleInput,
    ) -> StepOutput {
        let tunnel = &params.tunnel;

        if persistant.bank.tunnel(input.frame).area > tunnel.inside_area {
            return StepOutput::drive(VelCmd::straight(tunnel.lin_speed_ms));
        }

        info!("Out of the tunnel");
        StepOutput::transition(
            MissionState::Climb(Climb::new()),
            MissionOutput::DriveHold {
                cmd: persistant.ramp.last(),
                hold_s: tunnel.exit_settle_s,
            },
        )
    }
}
