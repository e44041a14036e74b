//! # Communications interface crate.
//!
//! Provides all common communications interfaces for the driver software: the camera frames
//! coming in, the velocity commands and score messages going out, and the zmq network layer they
//! travel over.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Command and data definitions for equipment (camera, drive base)
pub mod eqpt;

/// Network module
pub mod net;

/// Score/telemetry messages sent to the competition scorer
pub mod score;
