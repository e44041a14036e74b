//! # Mission I/O
//!
//! The mission only talks to the outside world through these traits, the network clients
//! implement them for the real vehicle.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::sync::Arc;

use comms_if::{eqpt::drive::VelCmd, score::ScoreMsg};

use crate::per::Frame;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Source of camera frames.
pub trait FrameSource {
    /// The most recently received frame, or `None` if no frame has arrived yet.
    fn latest(&self) -> Option<Arc<Frame>>;
}

/// Consumer of velocity commands. Publishing is fire-and-forget.
pub trait ActuationSink {
    fn publish(&mut self, cmd: VelCmd);
}

/// Consumer of score messages. Publishing is fire-and-forget.
pub trait TelemetrySink {
    fn publish(&mut self, msg: &ScoreMsg);
}

// ------------------------------------------------------------------------------------------------
// TEST UTILITIES
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod test_util {
    use super::*;

    /// Sink recording everything published to it.
    #[derive(Debug, Default)]
    pub struct Recorder<T> {
        pub published: Vec<T>,
    }

    impl ActuationSink for Recorder<VelCmd> {
        fn publish(&mut self, cmd: VelCmd) {
            self.published.push(cmd);
        }
    }

    impl TelemetrySink for Recorder<String> {
        fn publish(&mut self, msg: &ScoreMsg) {
            self.published.push(msg.to_string());
        }
    }
}
