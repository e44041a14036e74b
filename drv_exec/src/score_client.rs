//! # Score Client
//!
//! Publishes score messages to the competition scorer in their text form.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    net::{zmq, MonitoredSocket, MonitoredSocketError, SocketOptions},
    score::ScoreMsg,
};
use log::{info, warn};

use crate::{io::TelemetrySink, params::DrvExecParams};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The score client
pub struct ScoreClient {
    socket: MonitoredSocket,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ScoreClientError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not send the message: {0}")]
    SendError(zmq::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ScoreClient {
    /// Create a new instance of the score client
    pub fn new(ctx: &zmq::Context, params: &DrvExecParams) -> Result<Self, ScoreClientError> {
        let socket_options = SocketOptions {
            bind: true,
            // Score messages must not be lost on shutdown
            linger: 1000,
            send_timeout: 100,
            ..Default::default()
        };

        let socket = MonitoredSocket::new(
            ctx,
            zmq::PUB,
            socket_options,
            &params.net.score_endpoint,
        )
        .map_err(ScoreClientError::SocketError)?;

        Ok(Self { socket })
    }

    /// Send a message to the scorer.
    pub fn send(&mut self, msg: &ScoreMsg) -> Result<(), ScoreClientError> {
        self.socket
            .send(&msg.to_string(), 0)
            .map_err(ScoreClientError::SendError)
    }
}

impl TelemetrySink for ScoreClient {
    fn publish(&mut self, msg: &ScoreMsg) {
        match self.send(msg) {
            Ok(()) => info!("Score: {}", msg),
            Err(e) => warn!("Could not publish score message \"{}\": {}", msg, e),
        }
    }
}
