//! # Defines Telemetry Pack for the Mission

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use comms_if::eqpt::drive::VelCmd;
use serde::Serialize;

use super::StateKind;

// -----------------------------------------------------------------------------------------------
// STRUCTS
// -----------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Default)]
pub struct MissionTm {
    pub state: StateKind,
    pub cycle_count: u64,

    /// Lane centre column found by the last lane following state
    pub lane_centre: Option<u32>,

    /// Last steering error
    pub last_error: f64,

    pub num_signs: usize,
    pub last_cmd: VelCmd,

    /// Predictions submitted to the scorer, in order
    pub predictions: Vec<String>,
}
