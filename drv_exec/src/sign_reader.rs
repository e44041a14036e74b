//! # Remote sign reader
//!
//! Boards are found locally with the [`board`](crate::clue::board) finder, and reading them is
//! handed to the classification service over a REQ/REP socket. The crop travels as a PNG
//! [`CamFrame`] and the reply is the plain text of the clue. A reader which can't get an answer
//! reports [`NO_PAYLOAD`] so that the clue still scores its position.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chrono::Utc;
use comms_if::{
    eqpt::cam::{CamImage, ImageFormat},
    net::{zmq, MonitoredSocket, MonitoredSocketError, SocketOptions},
    score::NO_PAYLOAD,
};
use image::{DynamicImage, RgbImage};
use log::{debug, warn};

use crate::{
    clue::{
        board::{find_board, BoardParams},
        SignReader,
    },
    params::DrvExecParams,
    per::Frame,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Sign reader backed by the remote classification service.
pub struct RemoteSignReader {
    socket: MonitoredSocket,

    board_params: BoardParams,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SignReaderError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not encode the sign: {0}")]
    ImageEncodeError(image::ImageError),

    #[error("Could not serialize the request: {0}")]
    SerializationError(serde_json::Error),

    #[error("Could not send the request to the server: {0}")]
    SendError(zmq::Error),

    #[error("Could not recieve a response from the server: {0}")]
    RecvError(zmq::Error),

    #[error("The server did not respond in time")]
    NoResponse,

    #[error("The server responed with a message which was not valid UTF-8")]
    NonUtf8Response,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl RemoteSignReader {
    /// Create a new reader connected to the classification service.
    pub fn new(
        ctx: &zmq::Context,
        params: &DrvExecParams,
        board_params: BoardParams,
    ) -> Result<Self, SignReaderError> {
        let socket_options = SocketOptions {
            block_on_first_connect: false,
            connect_timeout: 1000,
            heartbeat_ivl: 500,
            heartbeat_ttl: 1000,
            heartbeat_timeout: 1000,
            linger: 1,
            recv_timeout: params.sign_reader_timeout_ms,
            send_timeout: 10,
            req_correlate: true,
            req_relaxed: true,
            ..Default::default()
        };

        let socket = MonitoredSocket::new(
            ctx,
            zmq::REQ,
            socket_options,
            &params.net.sign_reader_endpoint,
        )
        .map_err(SignReaderError::SocketError)?;

        Ok(Self {
            socket,
            board_params,
        })
    }

    /// Send a sign to the service and wait for its reading.
    pub fn request(&mut self, sign: &RgbImage) -> Result<String, SignReaderError> {
        let request = encode_request(sign)?;

        self.socket
            .send(&request, 0)
            .map_err(SignReaderError::SendError)?;

        match self.socket.recv_string(0) {
            Ok(Ok(s)) => Ok(s.trim().to_string()),
            Ok(Err(_)) => Err(SignReaderError::NonUtf8Response),
            Err(zmq::Error::EAGAIN) => Err(SignReaderError::NoResponse),
            Err(e) => Err(SignReaderError::RecvError(e)),
        }
    }
}

impl SignReader for RemoteSignReader {
    fn detect_candidate(&mut self, frame: &Frame) -> Option<RgbImage> {
        find_board(&frame.image, &self.board_params)
    }

    fn classify(&mut self, sign: &RgbImage) -> String {
        match self.request(sign) {
            Ok(s) if !s.is_empty() => {
                debug!("Sign read as \"{}\"", s);
                s
            }
            Ok(_) => {
                warn!("Empty reading for sign, reporting {}", NO_PAYLOAD);
                NO_PAYLOAD.into()
            }
            Err(e) => {
                warn!("Could not read sign, reporting {}: {}", NO_PAYLOAD, e);
                NO_PAYLOAD.into()
            }
        }
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Encode a sign as a PNG camera frame in JSON.
fn encode_request(sign: &RgbImage) -> Result<String, SignReaderError> {
    let cam_image = CamImage {
        timestamp: Utc::now(),
        image: DynamicImage::ImageRgb8(sign.clone()),
    };

    let frame = cam_image
        .to_cam_frame(ImageFormat::Png)
        .map_err(SignReaderError::ImageEncodeError)?;

    serde_json::to_string(&frame).map_err(SignReaderError::SerializationError)
}

#[cfg(test)]
mod test {
    use super::*;
    use comms_if::eqpt::cam::CamFrame;
    use image::Rgb;

    #[test]
    fn test_request_carries_sign() {
        let mut sign = RgbImage::new(30, 20);
        sign.put_pixel(5, 5, Rgb([0, 0, 255]));

        let request = encode_request(&sign).unwrap();
        let frame: CamFrame = serde_json::from_str(&request).unwrap();

        assert_eq!(frame.format, ImageFormat::Png);

        let back = frame.to_cam_image().unwrap().image.to_rgb8();
        assert_eq!(back, sign);
    }
}
