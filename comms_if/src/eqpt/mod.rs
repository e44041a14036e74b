//! # Equipment Interface
//!
//! This module defines the interface structures which are exchanged with the vehicle's
//! equipment: frames from the camera and velocity commands to the drive base.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod cam;
pub mod drive;
