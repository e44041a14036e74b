//! # Driver library.
//!
//! This library allows other crates in the workspace, and the benches, to access items defined
//! inside the driver crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Camera client - recieves frames from the camera bridge
pub mod cam_client;

/// Clue capture - debounces clue board sightings into one sign per board
pub mod clue;

/// Control - steering law and speed ramp
pub mod ctrl;

/// Drive client - sends velocity commands to the drive bridge
pub mod drive_client;

/// Mission I/O traits
pub mod io;

/// Mission manager - sequences the course segments
pub mod mission;

/// Executable parameters
pub mod params;

/// Perception - segmentation, regions, lane centre and event detectors
pub mod per;

/// Score client - sends score messages to the scorer
pub mod score_client;

/// Remote sign reader - reads clue boards using the classification service
pub mod sign_reader;
