//! # Driver Executable Parameters
//!
//! This module provide parameters for the driver executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{net::NetParams, score::TeamCredentials};
use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct DrvExecParams {
    /// Network endpoints
    pub net: NetParams,

    /// Credentials given to the scorer
    pub team: TeamCredentials,

    /// Time slept between polls of the frame source when no new frame has arrived, in seconds
    pub poll_period_s: f64,

    /// How long a classification request waits for its reply, in milliseconds
    pub sign_reader_timeout_ms: i32,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_shipped_params_parse() {
        let params: DrvExecParams =
            util::params::from_str(include_str!("../../params/drv_exec.toml")).unwrap();

        assert!(params.net.cam_endpoint.starts_with("tcp://"));
        assert!(!params.team.team.is_empty());
        assert!(params.poll_period_s > 0.0);
    }
}
