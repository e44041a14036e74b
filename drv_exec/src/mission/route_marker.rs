//! # [`MissionMgr`](super::MissionMgr) route marker segment

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::drive::VelCmd;
use log::{debug, info};
use serde::Deserialize;

use super::{
    params::{DriveSpeeds, MissionParams},
    states::MascotObstacle,
    CycleInput, MissionOutput, MissionPersistantData, MissionState, StepOutput,
};
use crate::{
    ctrl::{align_rate, lane_error, LaneFallback},
    per::{road::find_centre, ScanParams},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Route marker segment state of the MissionMgr.
///
/// Follows the sand lane until the route marker is seen, squares up to it and drives onto it,
/// then stops and moves to Mascot.
#[derive(Debug)]
pub struct RouteMarkerSegment {
    phase: RouteMarkerPhase,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RouteMarkerSegmentParams {
    pub scan: ScanParams,

    pub kp: f64,

    pub speeds: DriveSpeeds,

    /// Marker angles strictly between these limits need squaring up, in degrees
    pub min_angle_deg: f64,
    pub max_angle_deg: f64,

    pub align_lin_speed_ms: f64,

    pub align_rot_gain: f64,

    pub approach_lin_speed_ms: f64,

    /// Distance from the bottom of the frame at which the marker centroid counts as reached
    pub approach_margin_px: u32,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteMarkerPhase {
    /// Following the sand lane
    Follow,

    /// Squaring up to the marker
    Align,

    /// Driving onto the marker
    Approach,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for RouteMarkerSegmentParams {
    fn default() -> Self {
        Self {
            scan: ScanParams {
                offset_px: 250,
                line_width_px: 150,
            },
            kp: 11.0,
            speeds: DriveSpeeds::default(),
            min_angle_deg: 0.5,
            max_angle_deg: 89.5,
            align_lin_speed_ms: 0.2,
            align_rot_gain: 0.2,
            approach_lin_speed_ms: 0.2,
            approach_margin_px: 10,
        }
    }
}

impl RouteMarkerSegment {
    pub fn new() -> Self {
        Self {
            phase: RouteMarkerPhase::Follow,
        }
    }

    pub fn phase(&self) -> RouteMarkerPhase {
        self.phase
    }

    pub fn step(
        &mut self,
        params: &MissionParams,
        persistant: &mut MissionPersistantData,
        input: &CycleInput,
    ) -> StepOutput {
        let seg = &params.route_marker;
        let marker_params = &params.detect.route_marker;
        let frame = input.frame;
        let past_ceiling = persistant.ctx.past_ceiling(&params.timing);

        let marker = persistant.bank.route_marker(frame);

        loop {
            match self.phase {
                RouteMarkerPhase::Follow => {
                    if marker.segment_present(marker_params) {
                        info!("Route marker in view");
                        self.phase = RouteMarkerPhase::Align;
                        continue;
                    }

                    let centre = find_centre(&persistant.bank.terrain_mask(frame), &seg.scan);
                    let e = lane_error(centre, frame.width(), LaneFallback::Straight).value();
                    persistant.tm.lane_centre = centre;
                    persistant.tm.last_error = e;

                    return StepOutput::drive(seg.speeds.cmd(seg.kp * e, input.candidate_visible));
                }
                RouteMarkerPhase::Align => {
                    let angle = marker.angle_deg();

                    if !past_ceiling && seg.min_angle_deg < angle && angle < seg.max_angle_deg {
                        return StepOutput::drive(VelCmd::new(
                            seg.align_lin_speed_ms,
                            align_rate(angle, seg.align_rot_gain),
                        ));
                    }

                    debug!("Square to the route marker at {:.1} deg", angle);
                    self.phase = RouteMarkerPhase::Approach;
                }
                RouteMarkerPhase::Approach => {
                    let target_y = frame.height().saturating_sub(seg.approach_margin_px) as f64;

                    if !past_ceiling && marker.segment_centroid_y(marker_params) < target_y {
                        return StepOutput::drive(VelCmd::straight(seg.approach_lin_speed_ms));
                    }

                    info!("On the route marker");
                    return StepOutput::transition(
                        MissionState::Mascot(MascotObstacle::new()),
                        MissionOutput::Drive(VelCmd::stop()),
                    );
                }
            }
        }
    }
}
