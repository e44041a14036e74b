//! # Steering law
//!
//! The lateral error is the normalised offset of the lane centre from the middle of the image.
//! When no lane centre was found the active state decides what happens instead through a
//! [`LaneFallback`].

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use crate::per::road::centre_offset;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// What to do when no lane centre is visible.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LaneFallback {
    /// Go straight, error 0
    Straight,

    /// Steer towards a virtual target column, with the error scaled by `amplifier`
    Target { column: u32, amplifier: f64 },

    /// Hand control back to the mission, which should change state
    RequestTransition,
}

/// Result of the lane error computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LaneError {
    /// Normalised lateral error, positive when the lane centre is left of the image centre
    Error(f64),

    /// No lane was visible and the state asked to hand over
    RequestTransition,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl LaneError {
    /// The numeric error, 0 for a transition request.
    pub fn value(&self) -> f64 {
        match self {
            LaneError::Error(e) => *e,
            LaneError::RequestTransition => 0.0,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Compute the lateral error for an image of the given width.
pub fn lane_error(centre: Option<u32>, width: u32, fallback: LaneFallback) -> LaneError {
    match (centre, fallback) {
        (Some(c), _) => LaneError::Error(centre_offset(c, width)),
        (None, LaneFallback::Straight) => LaneError::Error(0.0),
        (None, LaneFallback::Target { column, amplifier }) => {
            LaneError::Error(amplifier * centre_offset(column, width))
        }
        (None, LaneFallback::RequestTransition) => LaneError::RequestTransition,
    }
}

/// Rate of change of the error over `dt_s` seconds.
///
/// There is no derivative when the interval is zero, negative or not finite.
pub fn derivative(error: f64, prev_error: f64, dt_s: f64) -> f64 {
    if dt_s > 0.0 && dt_s.is_finite() {
        (error - prev_error) / dt_s
    } else {
        0.0
    }
}

/// Turn rate squaring the vehicle up to a line at the given rectangle angle.
///
/// Rectangle angles are in `[0, 90)`, so a line tilted one way reads just above 0 and the other
/// way just below 90. Both are turned back towards square at `gain` rad/s per degree.
pub fn align_rate(angle_deg: f64, gain: f64) -> f64 {
    if angle_deg < 45.0 {
        -angle_deg * gain
    } else {
        (90.0 - angle_deg) * gain
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_lane_error() {
        assert_eq!(
            lane_error(Some(300), 1280, LaneFallback::RequestTransition),
            LaneError::Error(0.53125)
        );
        assert_eq!(
            lane_error(None, 1280, LaneFallback::Straight),
            LaneError::Error(0.0)
        );
        assert_eq!(
            lane_error(None, 1280, LaneFallback::RequestTransition),
            LaneError::RequestTransition
        );
        assert_eq!(LaneError::RequestTransition.value(), 0.0);
    }

    #[test]
    fn test_target_fallback() {
        // Quarter width, amplified
        let left = LaneFallback::Target {
            column: 320,
            amplifier: 1.5,
        };
        assert_eq!(lane_error(None, 1280, left), LaneError::Error(0.75));

        // Three quarter width
        let right = LaneFallback::Target {
            column: 960,
            amplifier: 1.0,
        };
        assert_eq!(lane_error(None, 1280, right), LaneError::Error(-0.5));
    }

    #[test]
    fn test_align_rate() {
        assert!((align_rate(10.0, 0.3) + 3.0).abs() < 1e-9);
        assert!((align_rate(80.0, 0.3) - 3.0).abs() < 1e-9);
        assert_eq!(align_rate(0.0, 0.3), 0.0);
    }

    #[test]
    fn test_derivative() {
        assert_eq!(derivative(0.5, 0.25, 0.5), 0.5);
        assert_eq!(derivative(0.5, 0.25, 0.0), 0.0);
        assert_eq!(derivative(0.5, 0.25, -0.1), 0.0);
        assert_eq!(derivative(0.5, 0.25, std::f64::NAN), 0.0);
        assert_eq!(derivative(0.5, 0.25, std::f64::INFINITY), 0.0);
    }
}
