//! # Camera frames
//!
//! A [`Frame`] is the decoded camera image a single control cycle works on.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chrono::{DateTime, Utc};
use comms_if::eqpt::cam::CamImage;
use image::RgbImage;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A colour frame from the forward camera.
#[derive(Clone)]
pub struct Frame {
    /// The image, in RGB channel order
    pub image: RgbImage,

    /// UTC time at which the frame was captured
    pub timestamp: DateTime<Utc>,

    /// Sequence number assigned by the frame source, increasing with each new frame
    pub seq: u64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Frame {
    pub fn new(image: RgbImage, timestamp: DateTime<Utc>, seq: u64) -> Self {
        Self {
            image,
            timestamp,
            seq,
        }
    }

    /// Build a frame from a decoded camera image.
    pub fn from_cam_image(cam_image: CamImage, seq: u64) -> Self {
        Self {
            image: cam_image.image.to_rgb8(),
            timestamp: cam_image.timestamp,
            seq,
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Capture time in seconds since the unix epoch.
    pub fn time_s(&self) -> f64 {
        util::time::timestamp_to_seconds(&self.timestamp)
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("timestamp", &self.timestamp)
            .field("seq", &self.seq)
            .finish()
    }
}
