//! # Clue capture
//!
//! Clue boards are visible for many frames as the vehicle drives past them, often partly hidden
//! or at an angle. Rather than reading every sighting, the [`ClueDebouncer`] keeps the largest
//! crop seen since the first sighting and commits it once the quiet duration has elapsed. Each
//! window of sightings commits exactly one sign.
//!
//! Finding and reading the boards is left to a [`SignReader`].

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod board;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use image::RgbImage;
use log::{debug, info};
use serde::Deserialize;

use crate::per::Frame;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Finds and reads clue boards.
pub trait SignReader {
    /// Crop a clue board out of the frame, if one is visible.
    fn detect_candidate(&mut self, frame: &Frame) -> Option<RgbImage>;

    /// Read the clue on a board.
    fn classify(&mut self, sign: &RgbImage) -> String;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ClueParams {
    /// Time after the first sighting at which the best crop is committed, in seconds
    pub quiet_duration_s: f64,
}

/// The best crop of the open window and all committed signs.
#[derive(Debug, Default)]
pub struct SignBoard {
    held: Option<RgbImage>,

    /// Time of the first sighting in the open window
    first_candidate_s: Option<f64>,

    committed: Vec<RgbImage>,
}

/// Commits one sign per window of sightings.
#[derive(Debug)]
pub struct ClueDebouncer {
    params: ClueParams,

    board: SignBoard,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for ClueParams {
    fn default() -> Self {
        Self {
            quiet_duration_s: 3.0,
        }
    }
}

impl SignBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// The best crop of the open window.
    pub fn held(&self) -> Option<&RgbImage> {
        self.held.as_ref()
    }

    /// Time of the first sighting in the open window, `None` if no window is open.
    pub fn first_candidate_s(&self) -> Option<f64> {
        self.first_candidate_s
    }

    pub fn committed(&self) -> &[RgbImage] {
        &self.committed
    }

    pub fn num_committed(&self) -> usize {
        self.committed.len()
    }

    /// Hold the crop if it's larger than the held one, opening a window if none is open.
    ///
    /// Returns true if the crop is now held.
    pub fn retain_if_larger(&mut self, crop: RgbImage, now_s: f64) -> bool {
        if self.first_candidate_s.is_none() {
            self.first_candidate_s = Some(now_s);
        }

        let area = |img: &RgbImage| img.width() as u64 * img.height() as u64;

        match self.held {
            Some(ref held) if area(held) >= area(&crop) => false,
            _ => {
                self.held = Some(crop);
                true
            }
        }
    }

    /// Commit the held crop and close the window.
    fn commit(&mut self) -> bool {
        self.first_candidate_s = None;

        match self.held.take() {
            Some(sign) => {
                self.committed.push(sign);
                true
            }
            None => false,
        }
    }
}

impl ClueDebouncer {
    pub fn new(params: ClueParams) -> Self {
        Self {
            params,
            board: SignBoard::new(),
        }
    }

    pub fn board(&self) -> &SignBoard {
        &self.board
    }

    /// Look for a sign in the frame, holding it if it's the best of the window.
    ///
    /// Returns true if a candidate was visible.
    pub fn observe<R: SignReader + ?Sized>(&mut self, reader: &mut R, frame: &Frame) -> bool {
        match reader.detect_candidate(frame) {
            Some(crop) => {
                let (w, h) = crop.dimensions();
                if self.board.retain_if_larger(crop, frame.time_s()) {
                    debug!("Holding {}x{} clue candidate", w, h);
                }
                true
            }
            None => false,
        }
    }

    /// Commit the held crop once the quiet duration has elapsed since the first sighting.
    ///
    /// Returns true if a sign was committed.
    pub fn commit_if_quiet(&mut self, now_s: f64) -> bool {
        let first = match self.board.first_candidate_s {
            Some(t) => t,
            None => return false,
        };

        if now_s - first > self.params.quiet_duration_s && self.board.commit() {
            info!("Clue {} captured", self.board.num_committed());
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::{TimeZone, Utc};

    /// Reader returning a scripted sequence of candidate sizes.
    struct ScriptedReader {
        sizes: Vec<Option<u32>>,
        next: usize,
    }

    impl SignReader for ScriptedReader {
        fn detect_candidate(&mut self, _frame: &Frame) -> Option<RgbImage> {
            let size = self.sizes.get(self.next).cloned().flatten();
            self.next += 1;
            size.map(|s| RgbImage::new(s, s))
        }

        fn classify(&mut self, sign: &RgbImage) -> String {
            format!("SIGN{}", sign.width())
        }
    }

    fn frame_at(t_ms: i64) -> Frame {
        Frame::new(
            RgbImage::new(4, 4),
            Utc.timestamp_millis_opt(t_ms).unwrap(),
            0,
        )
    }

    #[test]
    fn test_growing_candidates_commit_once() {
        let mut reader = ScriptedReader {
            sizes: (1..=10).map(|s| Some(s * 10)).collect(),
            next: 0,
        };
        let mut deb = ClueDebouncer::new(ClueParams::default());

        // Ten growing sightings, 0.2 s apart
        for i in 0..10 {
            let frame = frame_at(1000 + i * 200);
            assert!(deb.observe(&mut reader, &frame));
            assert!(!deb.commit_if_quiet(frame.time_s()));
        }

        // Nothing in view until the quiet duration elapses
        assert!(!deb.commit_if_quiet(3.9));
        assert!(deb.commit_if_quiet(4.1));
        assert!(!deb.commit_if_quiet(10.0));

        assert_eq!(deb.board().num_committed(), 1);
        assert_eq!(deb.board().committed()[0].width(), 100);
        assert_eq!(reader.classify(&deb.board().committed()[0]), "SIGN100");
        assert!(deb.board().held().is_none());
        assert!(deb.board().first_candidate_s().is_none());
    }

    #[test]
    fn test_smaller_candidate_not_retained() {
        let mut board = SignBoard::new();

        assert!(board.retain_if_larger(RgbImage::new(50, 50), 1.0));
        assert!(!board.retain_if_larger(RgbImage::new(40, 40), 1.5));
        assert_eq!(board.held().map(|s| s.width()), Some(50));

        // The window opened with the first sighting
        assert_eq!(board.first_candidate_s(), Some(1.0));
    }

    #[test]
    fn test_new_window_after_commit() {
        let mut reader = ScriptedReader {
            sizes: vec![Some(20), None, Some(30)],
            next: 0,
        };
        let mut deb = ClueDebouncer::new(ClueParams::default());

        assert!(deb.observe(&mut reader, &frame_at(0)));
        assert!(!deb.observe(&mut reader, &frame_at(1000)));
        assert!(deb.commit_if_quiet(3.5));

        assert!(deb.observe(&mut reader, &frame_at(5000)));
        assert_eq!(deb.board().first_candidate_s(), Some(5.0));
        assert!(deb.commit_if_quiet(8.5));

        let widths: Vec<u32> = deb.board().committed().iter().map(|s| s.width()).collect();
        assert_eq!(widths, vec![20, 30]);
    }
}
