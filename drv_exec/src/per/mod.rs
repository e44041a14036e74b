//! # Perception
//!
//! Everything the vehicle knows about the world comes from the forward camera. This module turns
//! camera frames into the signals the mission consumes: binary masks, connected regions, the lane
//! centre and the outputs of the event detectors.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod bg_model;
pub mod detect;
pub mod frame;
pub mod region;
pub mod road;
pub mod segment;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use bg_model::{BackgroundModel, BgModelParams};
pub use detect::{DetectParams, DetectorBank};
pub use frame::Frame;
pub use region::{BBox, Region};
pub use road::ScanParams;
pub use segment::{CropRect, GrayWindow, HsvWindow, Mask};
