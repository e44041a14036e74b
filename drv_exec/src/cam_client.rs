//! # Camera Client
//!
//! The camera client subscribes to the frames published by the camera bridge. Frames are
//! received and decoded on a background thread which keeps only the most recent one, so the
//! control loop always works on the newest frame and never waits on the network.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    thread,
};

use comms_if::{
    eqpt::cam::CamFrame,
    net::{zmq, MonitoredSocket, MonitoredSocketError, SocketOptions},
};
use log::{debug, warn};

use crate::{io::FrameSource, params::DrvExecParams, per::Frame};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Receive timeout of the frame socket, bounds how long the receiver takes to notice a shutdown
/// request.
const FRAME_RECV_TIMEOUT_MS: i32 = 100;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The camera client
pub struct CamClient {
    /// The most recent frame, replaced by the receiver thread on every new frame
    slot: Arc<Mutex<Option<Arc<Frame>>>>,

    shutdown: Arc<AtomicBool>,

    join_handle: Option<thread::JoinHandle<()>>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum CamClientError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not recieve a message from the server: {0}")]
    RecvError(zmq::Error),

    #[error("The server sent a message which was not valid UTF-8")]
    NonUtf8Message,

    #[error("Could not deserialize the frame: {0}")]
    DeserializeError(serde_json::Error),

    #[error("Could not decode the frame image: {0}")]
    ImageDecodeError(image::ImageError),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl CamClient {
    /// Create a new instance of the camera client, starting the receiver thread.
    pub fn new(ctx: &zmq::Context, params: &DrvExecParams) -> Result<Self, CamClientError> {
        let socket_options = SocketOptions {
            block_on_first_connect: false,
            subscribe_all: true,
            conflate: true,
            connect_timeout: 1000,
            heartbeat_ivl: 500,
            heartbeat_ttl: 1000,
            heartbeat_timeout: 1000,
            linger: 1,
            recv_timeout: FRAME_RECV_TIMEOUT_MS,
            ..Default::default()
        };

        let socket = MonitoredSocket::new(
            ctx,
            zmq::SUB,
            socket_options,
            &params.net.cam_endpoint,
        )
        .map_err(CamClientError::SocketError)?;

        let slot = Arc::new(Mutex::new(None));
        let shutdown = Arc::new(AtomicBool::new(false));

        let slot_clone = slot.clone();
        let shutdown_clone = shutdown.clone();

        let join_handle = thread::spawn(move || receive_frames(socket, slot_clone, shutdown_clone));

        Ok(Self {
            slot,
            shutdown,
            join_handle: Some(join_handle),
        })
    }
}

impl FrameSource for CamClient {
    fn latest(&self) -> Option<Arc<Frame>> {
        match self.slot.lock() {
            Ok(slot) => slot.clone(),
            // The receiver only ever replaces the whole slot, so a poisoned slot is still valid
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Drop for CamClient {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);

        if let Some(jh) = self.join_handle.take() {
            if jh.join().is_err() {
                warn!("Camera receiver thread panicked");
            }
        }
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Decode a frame message from the camera bridge.
pub fn decode(msg: &str, seq: u64) -> Result<Frame, CamClientError> {
    let cam_frame: CamFrame =
        serde_json::from_str(msg).map_err(CamClientError::DeserializeError)?;

    let cam_image = cam_frame
        .to_cam_image()
        .map_err(CamClientError::ImageDecodeError)?;

    Ok(Frame::from_cam_image(cam_image, seq))
}

fn receive_frames(
    socket: MonitoredSocket,
    slot: Arc<Mutex<Option<Arc<Frame>>>>,
    shutdown: Arc<AtomicBool>,
) {
    let mut seq = 0u64;

    while !shutdown.load(Ordering::Relaxed) {
        let msg = match socket.recv_string(0) {
            Ok(Ok(s)) => s,
            Ok(Err(_)) => {
                warn!("{}", CamClientError::NonUtf8Message);
                continue;
            }
            Err(zmq::Error::EAGAIN) => continue,
            Err(e) => {
                warn!("{}", CamClientError::RecvError(e));
                continue;
            }
        };

        let frame = match decode(&msg, seq + 1) {
            Ok(f) => f,
            Err(e) => {
                warn!("Dropping camera frame: {}", e);
                continue;
            }
        };

        seq += 1;

        let frame = Some(Arc::new(frame));
        match slot.lock() {
            Ok(mut s) => *s = frame,
            Err(poisoned) => *poisoned.into_inner() = frame,
        }
    }

    debug!("Camera receiver stopped after {} frames", seq);
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::{TimeZone, Utc};
    use comms_if::eqpt::cam::{CamImage, ImageFormat};
    use image::{DynamicImage, Rgb, RgbImage};

    #[test]
    fn test_decode_frame() {
        let mut img = RgbImage::new(8, 6);
        img.put_pixel(3, 2, Rgb([10, 200, 30]));

        let cam_image = CamImage {
            timestamp: Utc.timestamp_millis_opt(1_600_000_000_500).unwrap(),
            image: DynamicImage::ImageRgb8(img),
        };
        let msg = serde_json::to_string(&cam_image.to_cam_frame(ImageFormat::Png).unwrap())
            .unwrap();

        let frame = decode(&msg, 7).unwrap();

        assert_eq!(frame.seq, 7);
        assert_eq!((frame.width(), frame.height()), (8, 6));
        assert_eq!(frame.image.get_pixel(3, 2), &Rgb([10, 200, 30]));
        assert!((frame.time_s() - 1_600_000_000.5).abs() < 1e-6);
    }

    #[test]
    fn test_decode_garbage() {
        assert!(matches!(
            decode("not a frame", 1),
            Err(CamClientError::DeserializeError(_))
        ));
    }
}
