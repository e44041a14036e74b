//! # Drive Client
//!
//! Publishes velocity commands to the drive bridge as JSON.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    eqpt::drive::VelCmd,
    net::{zmq, MonitoredSocket, MonitoredSocketError, SocketOptions},
};
use log::warn;

use crate::{io::ActuationSink, params::DrvExecParams};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The drive client
pub struct DriveClient {
    socket: MonitoredSocket,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum DriveClientError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not send the command: {0}")]
    SendError(zmq::Error),

    #[error("Could not serialize the command: {0}")]
    SerializationError(serde_json::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl DriveClient {
    /// Create a new instance of the drive client
    pub fn new(ctx: &zmq::Context, params: &DrvExecParams) -> Result<Self, DriveClientError> {
        let socket_options = SocketOptions {
            bind: true,
            linger: 1,
            send_timeout: 10,
            ..Default::default()
        };

        let socket = MonitoredSocket::new(
            ctx,
            zmq::PUB,
            socket_options,
            &params.net.drive_endpoint,
        )
        .map_err(DriveClientError::SocketError)?;

        Ok(Self { socket })
    }

    /// Send a command to the drive bridge.
    pub fn send(&mut self, cmd: &VelCmd) -> Result<(), DriveClientError> {
        let cmd_str = serde_json::to_string(cmd).map_err(DriveClientError::SerializationError)?;

        self.socket
            .send(&cmd_str, 0)
            .map_err(DriveClientError::SendError)
    }
}

impl ActuationSink for DriveClient {
    fn publish(&mut self, cmd: VelCmd) {
        if let Err(e) = self.send(&cmd) {
            warn!("Could not publish {:?}: {}", cmd, e);
        }
    }
}
