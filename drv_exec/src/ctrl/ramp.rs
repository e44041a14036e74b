//! # Speed ramp
//!
//! Large jumps in the commanded linear speed make the vehicle pitch and lose traction. When a
//! request differs from the last commanded speed by more than the buffer the ramp walks the speed
//! there in fixed steps, going straight while it does, before issuing the request itself.
//!
//! The ramp blocks the caller for the duration of the steps.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{thread, time::Duration};

use comms_if::eqpt::drive::VelCmd;
use log::debug;
use serde::Deserialize;

use crate::io::ActuationSink;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct RampParams {
    /// Speed changes larger than this are ramped, in m/s
    pub buffer_ms: f64,

    /// Size of each ramp step, in m/s
    pub step_ms: f64,

    /// Rate at which ramp steps are issued, in Hz
    pub step_hz: f64,
}

/// Slew-rate limiter on the commanded linear speed.
#[derive(Debug)]
pub struct SpeedRamp {
    params: RampParams,

    /// The last command issued
    last: VelCmd,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for RampParams {
    fn default() -> Self {
        Self {
            buffer_ms: 1.3,
            step_ms: 0.1,
            step_hz: 50.0,
        }
    }
}

impl SpeedRamp {
    pub fn new(params: RampParams) -> Self {
        Self {
            params,
            last: VelCmd::stop(),
        }
    }

    /// The last command issued.
    pub fn last(&self) -> VelCmd {
        self.last
    }

    /// Issue the target command, ramping up or down to it if needed.
    ///
    /// Returns the number of commands published.
    pub fn command<S: ActuationSink + ?Sized>(&mut self, target: VelCmd, sink: &mut S) -> usize {
        let start = self.last.linear_ms;
        let delta = target.linear_ms - start;
        let mut published = 0;

        if delta.abs() > self.params.buffer_ms && self.params.step_ms > 0.0 {
            let num_steps = (delta.abs() / self.params.step_ms).ceil() as usize;
            let step = self.params.step_ms.copysign(delta);
            let period = match self.params.step_hz > 0.0 {
                true => Duration::from_secs_f64(1.0 / self.params.step_hz),
                false => Duration::from_secs(0),
            };

            debug!(
                "Ramping speed from {:.2} to {:.2} m/s in {} steps",
                start, target.linear_ms, num_steps
            );

            for i in 0..num_steps {
                sink.publish(VelCmd::straight(start + step * i as f64));
                published += 1;
                thread::sleep(period);
            }
        }

        sink.publish(target);
        self.last = target;

        published + 1
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::io::test_util::Recorder;

    fn fast_ramp() -> SpeedRamp {
        SpeedRamp::new(RampParams {
            step_hz: 1.0e6,
            ..RampParams::default()
        })
    }

    #[test]
    fn test_small_change_is_direct() {
        let mut ramp = fast_ramp();
        let mut sink = Recorder::default();

        assert_eq!(ramp.command(VelCmd::new(0.5, 0.3), &mut sink), 1);
        assert_eq!(sink.published, vec![VelCmd::new(0.5, 0.3)]);
        assert_eq!(ramp.last(), VelCmd::new(0.5, 0.3));
    }

    #[test]
    fn test_ramp_up_and_down() {
        let mut ramp = fast_ramp();
        let mut sink = Recorder::default();

        // 0 to 2.5 in 0.1 steps is 25 steps then the target
        assert_eq!(ramp.command(VelCmd::straight(2.5), &mut sink), 26);
        assert_eq!(sink.published[0], VelCmd::straight(0.0));
        assert!(sink.published[..25].iter().all(|c| c.angular_rads == 0.0));
        assert!(sink.published[..25].iter().all(|c| c.linear_ms < 2.5));
        assert_eq!(sink.published[25], VelCmd::straight(2.5));

        sink.published.clear();
        assert_eq!(ramp.command(VelCmd::new(0.5, 1.0), &mut sink), 21);
        assert!((sink.published[1].linear_ms - 2.4).abs() < 1e-9);
        assert_eq!(sink.published[20], VelCmd::new(0.5, 1.0));
    }

    #[test]
    fn test_idempotent() {
        let mut ramp = fast_ramp();
        let mut sink = Recorder::default();

        let first = ramp.command(VelCmd::straight(2.5), &mut sink);
        let second = ramp.command(VelCmd::straight(2.5), &mut sink);

        assert!(first > 1);
        assert_eq!(second, 1);
    }
}
