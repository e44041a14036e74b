//! # Steering and speed control
//!
//! Turns a lateral error into a turn rate and keeps the commanded speed from jumping.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod ramp;
mod steer;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use ramp::{RampParams, SpeedRamp};
pub use steer::{align_rate, derivative, lane_error, LaneError, LaneFallback};
