//! # Drive Base Communications Module

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A velocity command for the two-axis drive base.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VelCmd {
    /// Forward speed in metres per second
    pub linear_ms: f64,

    /// Turn rate in radians per second, positive anticlockwise (to the left)
    pub angular_rads: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl VelCmd {
    pub fn new(linear_ms: f64, angular_rads: f64) -> Self {
        Self {
            linear_ms,
            angular_rads,
        }
    }

    /// Zero velocity
    pub fn stop() -> Self {
        Self::default()
    }

    /// Drive straight at the given speed
    pub fn straight(linear_ms: f64) -> Self {
        Self::new(linear_ms, 0.0)
    }

    /// Turn on the spot at the given rate
    pub fn turn(angular_rads: f64) -> Self {
        Self::new(0.0, angular_rads)
    }

    pub fn is_stop(&self) -> bool {
        self.linear_ms == 0.0 && self.angular_rads == 0.0
    }
}

impl std::fmt::Display for VelCmd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(lin: {:.3} m/s, ang: {:.3} rad/s)", self.linear_ms, self.angular_rads)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_json_shape() {
        let s = serde_json::to_string(&VelCmd::new(0.5, -0.25)).unwrap();
        assert_eq!(s, r#"{"linear_ms":0.5,"angular_rads":-0.25}"#);
        assert!(VelCmd::stop().is_stop());
        assert!(!VelCmd::turn(4.0).is_stop());
    }
}
