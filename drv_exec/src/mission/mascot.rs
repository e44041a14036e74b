//! # [`MissionMgr`](super::MissionMgr) mascot obstacle
//!
//! The longest state of the mission, made of three parts:
//!
//! 1. Before the mascot has been passed: wait for the mascot to leave the view, drive up to the
//!    cactus, then turn until the tunnel is on the right of the view.
//! 2. Before the hill has been crossed: steer on the tunnel centre while it's in view, pausing
//!    whenever the mascot crosses in front, then climb blind until the gate marker shows up.
//! 3. Over the hill: track the gate marker until it's low in the frame, drive onto it, square up
//!    and creep into the tunnel.
//!
//! Every waiting phase gives up once the sub-loop ceiling is reached.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::drive::VelCmd;
use log::{debug, info};
use serde::Deserialize;

use super::{
    params::MissionParams, states::Tunnel, CycleInput, MissionOutput, MissionPersistantData,
    MissionState, StepOutput,
};
use crate::ctrl::align_rate;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Mascot obstacle state of the MissionMgr.
///
/// Possible transitions:
/// - Tunnel, once lined up on the gate marker
#[derive(Debug)]
pub struct MascotObstacle {
    phase: MascotPhase,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MascotObstacleParams {
    pub cactus_lin_speed_ms: f64,

    /// Turn rate used to bring the tunnel into view
    pub tunnel_turn_rads: f64,

    /// Column the tunnel centre is steered to
    pub tunnel_mid_x: u32,

    pub kp: f64,

    pub lin_speed_ms: f64,

    pub rot_gain: f64,

    /// Command used to climb the hill while the tunnel is out of view
    pub hill_lin_speed_ms: f64,
    pub hill_rot_rads: f64,

    /// Stop this long when the mascot crosses in front, in seconds
    pub mascot_pause_s: f64,

    /// Stop this long when stalled on the hill, in seconds
    pub stall_pause_s: f64,

    /// Column the gate marker is steered to
    pub gate_mid_x: u32,

    pub gate_lin_speed_ms: f64,

    /// Row the gate marker is tracked down to
    pub gate_track_y: u32,

    /// Row the gate marker is driven down to
    pub gate_approach_y: u32,

    pub gate_approach_lin_speed_ms: f64,

    pub gate_min_angle_deg: f64,
    pub gate_max_angle_deg: f64,

    pub gate_align_rot_gain: f64,

    /// Creep into the tunnel
    pub creep_lin_speed_ms: f64,
    pub creep_s: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MascotPhase {
    /// Stopped while the mascot is in view
    WatchMascot,

    /// Driving straight until the cactus is in view
    ApproachObstacle,

    /// Turning until the tunnel is on the right of the view
    AlignTunnel,

    /// Steering on the tunnel centre
    SeekTunnel,

    /// Climbing with the tunnel out of view until the gate marker shows up
    BlindClimb,

    /// Steering on the gate marker
    GateTrack,

    /// Driving onto the gate marker
    GateApproach,

    /// Squaring up to the gate marker
    GateAlign,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for MascotObstacleParams {
    fn default() -> Self {
        Self {
            cactus_lin_speed_ms: 0.6,
            tunnel_turn_rads: 4.0,
            tunnel_mid_x: 500,
            kp: 11.0,
            lin_speed_ms: 0.5,
            rot_gain: 1.0,
            hill_lin_speed_ms: 0.5,
            hill_rot_rads: -0.1,
            mascot_pause_s: 0.3,
            stall_pause_s: 0.5,
            gate_mid_x: 550,
            gate_lin_speed_ms: 0.6,
            gate_track_y: 408,
            gate_approach_y: 590,
            gate_approach_lin_speed_ms: 0.5,
            gate_min_angle_deg: 0.5,
            gate_max_angle_deg: 89.5,
            gate_align_rot_gain: 0.05,
            creep_lin_speed_ms: 0.4,
            creep_s: 0.3,
        }
    }
}

impl MascotObstacle {
    pub fn new() -> Self {
        Self {
            phase: MascotPhase::WatchMascot,
        }
    }

    pub fn phase(&self) -> MascotPhase {
        self.phase
    }

    pub fn step(
        &mut self,
        params: &MissionParams,
        persistant: &mut MissionPersistantData,
        input: &CycleInput,
    ) -> StepOutput {
        let p = &params.mascot;
        let marker_params = &params.detect.route_marker;
        let frame = input.frame;
        let waiting = !persistant.ctx.past_ceiling(&params.timing);

        loop {
            match self.phase {
                MascotPhase::WatchMascot => {
                    if waiting && persistant.bank.mascot_present(frame) {
                        return StepOutput::drive(VelCmd::stop());
                    }

                    debug!("Mascot out of the way, approaching the cactus");
                    self.phase = MascotPhase::ApproachObstacle;
                }
                MascotPhase::ApproachObstacle => {
                    if waiting && !persistant.bank.cactus_present(frame) {
                        return StepOutput::drive(VelCmd::straight(p.cactus_lin_speed_ms));
                    }

                    debug!("At the cactus, turning to the tunnel");
                    self.phase = MascotPhase::AlignTunnel;
                }
                MascotPhase::AlignTunnel => {
                    let tunnel = persistant.bank.tunnel(frame);

                    if waiting && tunnel.centre_x.map_or(true, |c| c < p.tunnel_mid_x) {
                        return StepOutput::drive(VelCmd::turn(p.tunnel_turn_rads));
                    }

                    info!("Tunnel in view, heading over the hill");
                    persistant.ctx.reached_mascot = true;
                    self.phase = MascotPhase::SeekTunnel;

                    return StepOutput::drive(VelCmd::stop());
                }
                MascotPhase::SeekTunnel => {
                    let centre = match persistant.bank.tunnel(frame).centre_x {
                        Some(c) => c,
                        None => {
                            debug!("Tunnel out of view, climbing blind");
                            self.phase = MascotPhase::BlindClimb;
                            continue;
                        }
                    };

                    if persistant.bank.mascot_present(frame) {
                        return StepOutput::hold(VelCmd::stop(), p.mascot_pause_s);
                    }

                    let e = p.kp * offset_from(centre, p.tunnel_mid_x);
                    persistant.tm.last_error = e;

                    return StepOutput::drive(VelCmd::new(p.lin_speed_ms, p.rot_gain * e));
                }
                MascotPhase::BlindClimb => {
                    let marker = persistant.bank.route_marker(frame);

                    if waiting && !marker.gate_present(marker_params) {
                        return StepOutput::drive(VelCmd::new(p.hill_lin_speed_ms, p.hill_rot_rads));
                    }

                    info!("Over the hill, tracking the gate marker");
                    persistant.ctx.over_hill = true;
                    self.phase = MascotPhase::GateTrack;
                }
                MascotPhase::GateTrack => {
                    let (gate_x, gate_y) = persistant.bank.route_marker(frame).gate_centre();

                    if !waiting || gate_y >= p.gate_track_y {
                        debug!("Gate marker close, driving onto it");
                        self.phase = MascotPhase::GateApproach;
                        continue;
                    }

                    if persistant.bank.hill_stalled() {
                        debug!("Stalled on the hill");
                        return StepOutput::hold(VelCmd::stop(), p.stall_pause_s);
                    }

                    if persistant.bank.mascot_present(frame) {
                        return StepOutput::hold(VelCmd::stop(), p.mascot_pause_s);
                    }

                    let e = p.kp * offset_from(gate_x, p.gate_mid_x);
                    persistant.tm.last_error = e;

                    return StepOutput::drive(VelCmd::new(p.gate_lin_speed_ms, p.rot_gain * e));
                }
                MascotPhase::GateApproach => {
                    let (_, gate_y) = persistant.bank.route_marker(frame).gate_centre();

                    if waiting && gate_y < p.gate_approach_y {
                        return StepOutput::drive(VelCmd::straight(p.gate_approach_lin_speed_ms));
                    }

                    debug!("On the gate marker, squaring up");
                    self.phase = MascotPhase::GateAlign;
                }
                MascotPhase::GateAlign => {
                    let angle = persistant.bank.route_marker(frame).angle_deg();

                    if waiting && p.gate_min_angle_deg < angle && angle < p.gate_max_angle_deg {
                        return StepOutput::drive(VelCmd::turn(align_rate(
                            angle,
                            p.gate_align_rot_gain,
                        )));
                    }

                    info!("Lined up on the tunnel");
                    return StepOutput::transition(
                        MissionState::Tunnel(Tunnel::new()),
                        MissionOutput::DriveHold {
                            cmd: VelCmd::straight(p.creep_lin_speed_ms),
                            hold_s: p.creep_s,
                        },
                    );
                }
            }
        }
    }
}

/// Normalised offset of a column from a target column, positive when left of the target.
fn offset_from(column: u32, target: u32) -> f64 {
    if target == 0 {
        return 0.0;
    }
    (target as f64 - column as f64) / target as f64
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_offset_from() {
        assert_eq!(offset_from(275, 550), 0.5);
        assert_eq!(offset_from(825, 550), -0.5);
        assert_eq!(offset_from(550, 550), 0.0);

        // A zero target column gives no error rather than infinity
        assert_eq!(offset_from(300, 0), 0.0);
        assert_eq!(offset_from(0, 0), 0.0);
    }
}
