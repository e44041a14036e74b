//! # MissionMgr module
//!
//! This module implements the [`MissionMgr`] state machine, which drives the vehicle around the
//! course one camera frame at a time. The mission is broken down into a number of states, visited
//! in order:
//!
//! - `Init` - Starts the scorer's timer.
//! - `Road` - Follows the paved road, reading clue boards, until the crosswalk or the end of the
//!   road.
//! - `PedCrossing` - Squares up to the crosswalk and waits for it to be clear.
//! - `LeadVehiclePass` - Waits to see which way the lead vehicle goes and passes it.
//! - `RouteMarker` - Follows the sand lane to the route marker and lines up on it.
//! - `Mascot` - Waits for the mascot, then drives past the cactus and over the hill to the tunnel
//!   gate.
//! - `Tunnel` - Drives through the tunnel.
//! - `Climb` - Follows the mountain lane up to the summit.
//! - `Summit` - Drives up to the summit board.
//! - `ClueSubmission` - Reads and submits every captured clue.
//! - `Finished` - Stopped.
//!
//! States which run over several cycles keep their progress in a sub-phase inside the state
//! rather than blocking, so that the deadline check runs every cycle. Once the deadline is passed
//! the clues are submitted from wherever the vehicle is.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod climb;
mod clue_submission;
mod lead_vehicle;
mod mascot;
mod params;
mod ped_crossing;
mod road;
mod route_marker;
mod summit;
pub mod tm;
mod tunnel;


// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::fmt::Display;

use comms_if::{
    eqpt::drive::VelCmd,
    score::{ScoreEntry, TeamCredentials},
};
use log::{debug, error, info, warn};
use serde::Serialize;

pub use self::{
    params::{DriveSpeeds, MissionParams, TimingParams},
    tm::MissionTm,
};

use crate::{
    clue::{ClueDebouncer, SignReader},
    ctrl::SpeedRamp,
    io::{ActuationSink, TelemetrySink},
    per::{detect::LeadVehicleDir, DetectorBank, Frame},
};

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub mod states {
    pub use super::climb::{Climb, ClimbParams};
    pub use super::lead_vehicle::{LeadVehiclePass, LeadVehiclePassParams};
    pub use super::mascot::{MascotObstacle, MascotObstacleParams, MascotPhase};
    pub use super::ped_crossing::{PedCrossing, PedCrossingParams, PedCrossingPhase};
    pub use super::road::{Road, RoadParams};
    pub use super::route_marker::{
        RouteMarkerPhase, RouteMarkerSegment, RouteMarkerSegmentParams,
    };
    pub use super::summit::{SummitApproach, SummitApproachParams};
    pub use super::tunnel::{Tunnel, TunnelStateParams};
}

use states::*;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Mission Manager
///
/// Owns the mission state, everything that persists between states, and sequences the states
/// once per camera frame.
pub struct MissionMgr {
    /// Parameters for the MissionMgr and all it's states.
    pub params: MissionParams,

    /// Persistant data of the MissionMgr.
    ///
    /// This is data which is valid over all states, such as the mission progress flags, the
    /// background models and the captured clues.
    pub persistant: MissionPersistantData,

    /// The currently active state.
    state: MissionState,
}

pub struct MissionPersistantData {
    /// Progress flags and cycle bookkeeping.
    pub ctx: MissionContext,

    /// Event detectors, including the background models which must see every frame.
    pub bank: DetectorBank,

    /// Clue capture.
    pub debouncer: ClueDebouncer,

    /// Speed ramp, which also remembers the last command sent to the drive.
    pub ramp: SpeedRamp,

    /// Telemetry summarising the mission, saved when the mission ends.
    pub tm: MissionTm,

    /// Credentials used in the score messages.
    pub credentials: TeamCredentials,
}

/// Mission progress flags and the bookkeeping the states share.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MissionContext {
    /// Number of cycles run so far, the first cycle is cycle 1
    pub cycle_count: u64,

    pub reached_crosswalk: bool,

    pub reached_lead_vehicle: bool,

    pub reached_mascot: bool,

    pub over_hill: bool,

    pub found_climb_lines: bool,

    pub lead_vehicle_dir: LeadVehicleDir,

    /// Error of the previous derivative computation
    pub prev_error: f64,

    /// Timestamp of the previous frame
    pub prev_timestamp_s: Option<f64>,

    /// Time between this frame and the previous one, 0 on the first cycle
    pub dt_s: f64,

    /// Cycle on which the lead vehicle pass started
    pub lead_phase_start_cycle: u64,

    /// Cycle on which the climb lines were found
    pub climb_start_cycle: u64,

    /// A boost was requested since the last one was made
    pub boost_pending: bool,

    /// Cycle of the last boost
    pub boost_cycle: u64,

    /// Command being held, if any
    pub hold: Option<Hold>,
}

/// A command held until a fixed time, during which the active state isn't stepped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Hold {
    pub cmd: VelCmd,
    pub until_s: f64,
}

/// Collaborators the mission talks to every cycle.
pub struct MissionIo<'a> {
    pub actuation: &'a mut dyn ActuationSink,
    pub telemetry: &'a mut dyn TelemetrySink,
    pub sign_reader: &'a mut dyn SignReader,
}

/// What a state sees in a cycle.
pub struct CycleInput<'a> {
    pub frame: &'a Frame,

    /// A clue board is in view this cycle
    pub candidate_visible: bool,
}

/// Output of a state's step function.
#[derive(Debug)]
pub struct StepOutput {
    /// Action to perform on the state
    pub action: StateAction,

    /// Data for the manager to act on
    pub data: MissionOutput,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors that can occur in the mission manager.
#[derive(Debug, thiserror::Error)]
pub enum MissionError {
    #[error("Failed to load MissionParams: {0:?}")]
    ParamLoadError(util::params::LoadError),

    #[error("Illegal transition from {0} to {1}")]
    IllegalTransition(StateKind, StateKind),
}

#[derive(Debug)]
pub enum MissionState {
    Init,
    Road(Road),
    PedCrossing(PedCrossing),
    LeadVehiclePass(LeadVehiclePass),
    RouteMarker(RouteMarkerSegment),
    Mascot(MascotObstacle),
    Tunnel(Tunnel),
    Climb(Climb),
    Summit(SummitApproach),
    ClueSubmission,
    Finished,
}

/// The states without their data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StateKind {
    Init,
    Road,
    PedCrossing,
    LeadVehiclePass,
    RouteMarker,
    Mascot,
    Tunnel,
    Climb,
    Summit,
    ClueSubmission,
    Finished,
}

/// Actions that can be performed on the state at the end of a state's step function.
#[derive(Debug)]
pub enum StateAction {
    None,
    Transition(MissionState),
}

/// Possible data that can be passed out of a state's step function.
#[derive(Debug, Clone, PartialEq)]
pub enum MissionOutput {
    /// Nothing to do this cycle
    None,

    /// Send a command to the drive
    Drive(VelCmd),

    /// Send a command to the drive and hold it for the given time
    DriveHold { cmd: VelCmd, hold_s: f64 },

    /// Tell the scorer the mission has started
    StartMarker,

    /// Read and submit every captured clue, then tell the scorer the mission has ended
    Submit,
}

/// Whether the mission loop should keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleStatus {
    Running,
    Finished,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl MissionMgr {
    pub fn init(params_path: &str, credentials: TeamCredentials) -> Result<Self, MissionError> {
        // Load parameters
        let params: MissionParams = match util::params::load(params_path) {
            Ok(p) => p,
            Err(e) => return Err(MissionError::ParamLoadError(e)),
        };

        Ok(Self::new(params, credentials))
    }

    pub fn new(params: MissionParams, credentials: TeamCredentials) -> Self {
        Self {
            persistant: MissionPersistantData::new(&params, credentials),
            params,
            state: MissionState::Init,
        }
    }

    pub fn state(&self) -> &MissionState {
        &self.state
    }

    pub fn context(&self) -> &MissionContext {
        &self.persistant.ctx
    }

    pub fn tm(&self) -> &MissionTm {
        &self.persistant.tm
    }

    pub fn bank(&self) -> &DetectorBank {
        &self.persistant.bank
    }

    pub fn debouncer(&self) -> &ClueDebouncer {
        &self.persistant.debouncer
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, MissionState::Finished)
    }

    /// Run one cycle of the mission on a new frame.
    pub fn step(
        &mut self,
        frame: &Frame,
        io: &mut MissionIo,
    ) -> Result<CycleStatus, MissionError> {
        let now_s = frame.time_s();

        // Cycle bookkeeping
        {
            let ctx = &mut self.persistant.ctx;
            ctx.cycle_count += 1;
            ctx.dt_s = match ctx.prev_timestamp_s {
                Some(prev) => now_s - prev,
                None => 0.0,
            };
            ctx.prev_timestamp_s = Some(now_s);
        }

        // The background models see every frame whatever the state
        self.persistant.bank.update(frame);

        // Commit a held clue once it's been quiet long enough
        self.persistant.debouncer.commit_if_quiet(now_s);

        let status = self.run_cycle(frame, io, now_s);
        self.update_tm();

        status
    }

    /// Move to a new state, if the transition is legal.
    pub fn transition(&mut self, new: MissionState) -> Result<(), MissionError> {
        let (from, to) = (self.state.kind(), new.kind());

        if !from.can_transition_to(to) {
            error!("MissionMgr refused transition from {} to {}", from, to);
            return Err(MissionError::IllegalTransition(from, to));
        }

        self.state = new;
        info!("MissionMgr state change to: {}", self.state);

        Ok(())
    }

    fn run_cycle(
        &mut self,
        frame: &Frame,
        io: &mut MissionIo,
        now_s: f64,
    ) -> Result<CycleStatus, MissionError> {
        // Finished is terminal, keep the vehicle stopped
        if self.is_finished() {
            self.persistant.ramp.command(VelCmd::stop(), &mut *io.actuation);
            return Ok(CycleStatus::Finished);
        }

        // Once past the deadline submit whatever has been captured
        if self.persistant.ctx.cycle_count > self.params.timing.deadline_cycle
            && !matches!(self.state, MissionState::ClueSubmission)
        {
            warn!(
                "Deadline passed on cycle {} in {}, submitting clues",
                self.persistant.ctx.cycle_count, self.state
            );
            self.persistant.ctx.hold = None;
            self.state = MissionState::ClueSubmission;
            info!("MissionMgr state change to: {}", self.state);
            return Ok(CycleStatus::Running);
        }

        // While a command is held the state isn't stepped
        if let Some(hold) = self.persistant.ctx.hold {
            if now_s < hold.until_s {
                self.persistant.ramp.command(hold.cmd, &mut *io.actuation);
                return Ok(CycleStatus::Running);
            }
            debug!("Hold of {} expired", hold.cmd);
            self.persistant.ctx.hold = None;
        }

        // Look for clue boards
        let candidate_visible = match self.state.kind().reads_clues() {
            true => self.persistant.debouncer.observe(&mut *io.sign_reader, frame),
            false => false,
        };

        let input = CycleInput {
            frame,
            candidate_visible,
        };

        let output = self.state.step(&self.params, &mut self.persistant, &input);

        // Refuse illegal transitions before anything is sent
        if let StateAction::Transition(ref new) = output.action {
            let (from, to) = (self.state.kind(), new.kind());
            if !from.can_transition_to(to) {
                error!("MissionMgr refused transition from {} to {}", from, to);
                return Err(MissionError::IllegalTransition(from, to));
            }
        }

        self.execute(output.data, io, now_s);

        if let StateAction::Transition(new) = output.action {
            self.transition(new)?;

            if self.is_finished() {
                self.persistant.ramp.command(VelCmd::stop(), &mut *io.actuation);
                return Ok(CycleStatus::Finished);
            }
        }

        Ok(CycleStatus::Running)
    }

    fn execute(&mut self, data: MissionOutput, io: &mut MissionIo, now_s: f64) {
        let persistant = &mut self.persistant;

        match data {
            MissionOutput::None => (),
            MissionOutput::Drive(cmd) => {
                persistant.ramp.command(cmd, &mut *io.actuation);
            }
            MissionOutput::DriveHold { cmd, hold_s } => {
                persistant.ramp.command(cmd, &mut *io.actuation);
                persistant.ctx.hold = Some(Hold {
                    cmd,
                    until_s: now_s + hold_s,
                });
            }
            MissionOutput::StartMarker => {
                io.telemetry
                    .publish(&persistant.credentials.msg(ScoreEntry::Start));
            }
            MissionOutput::Submit => {
                let signs = persistant.debouncer.board().committed();
                info!("Submitting {} clues", signs.len());

                for (i, sign) in signs.iter().enumerate() {
                    let prediction = io.sign_reader.classify(sign);
                    info!("Clue {}: {}", i + 1, prediction);

                    io.telemetry.publish(&persistant.credentials.msg(ScoreEntry::Clue {
                        index: i as u32 + 1,
                        prediction: prediction.clone(),
                    }));
                    persistant.tm.predictions.push(prediction);
                }

                io.telemetry
                    .publish(&persistant.credentials.msg(ScoreEntry::End));
            }
        }
    }

    fn update_tm(&mut self) {
        let persistant = &mut self.persistant;

        persistant.tm.state = self.state.kind();
        persistant.tm.cycle_count = persistant.ctx.cycle_count;
        persistant.tm.num_signs = persistant.debouncer.board().num_committed();
        persistant.tm.last_cmd = persistant.ramp.last();
    }
}

impl MissionPersistantData {
    pub fn new(params: &MissionParams, credentials: TeamCredentials) -> Self {
        Self {
            ctx: MissionContext::default(),
            bank: DetectorBank::new(params.detect.clone()),
            debouncer: ClueDebouncer::new(params.clue.clone()),
            ramp: SpeedRamp::new(params.ramp.clone()),
            tm: MissionTm::default(),
            credentials,
        }
    }

    /// Number of clues committed so far.
    pub fn num_signs(&self) -> usize {
        self.debouncer.board().num_committed()
    }
}

impl MissionContext {
    /// Waiting sub-phases give up once the ceiling is reached.
    pub fn past_ceiling(&self, timing: &TimingParams) -> bool {
        self.cycle_count >= timing.sub_loop_ceiling
    }
}

impl Display for MissionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MissionState::{}", self.kind())
    }
}

impl MissionState {
    pub fn kind(&self) -> StateKind {
        match self {
            MissionState::Init => StateKind::Init,
            MissionState::Road(_) => StateKind::Road,
            MissionState::PedCrossing(_) => StateKind::PedCrossing,
            MissionState::LeadVehiclePass(_) => StateKind::LeadVehiclePass,
            MissionState::RouteMarker(_) => StateKind::RouteMarker,
            MissionState::Mascot(_) => StateKind::Mascot,
            MissionState::Tunnel(_) => StateKind::Tunnel,
            MissionState::Climb(_) => StateKind::Climb,
            MissionState::Summit(_) => StateKind::Summit,
            MissionState::ClueSubmission => StateKind::ClueSubmission,
            MissionState::Finished => StateKind::Finished,
        }
    }

    fn step(
        &mut self,
        params: &MissionParams,
        persistant: &mut MissionPersistantData,
        input: &CycleInput,
    ) -> StepOutput {
        match self {
            MissionState::Init => StepOutput {
                action: StateAction::Transition(MissionState::Road(Road::new())),
                data: MissionOutput::StartMarker,
            },
            MissionState::Road(road) => road.step(params, persistant, input),
            MissionState::PedCrossing(ped) => ped.step(params, persistant, input),
            MissionState::LeadVehiclePass(lead) => lead.step(params, persistant, input),
            MissionState::RouteMarker(marker) => marker.step(params, persistant, input),
            MissionState::Mascot(mascot) => mascot.step(params, persistant, input),
            MissionState::Tunnel(tunnel) => tunnel.step(params, persistant, input),
            MissionState::Climb(climb) => climb.step(params, persistant, input),
            MissionState::Summit(summit) => summit.step(params, persistant, input),
            MissionState::ClueSubmission => clue_submission::step(),
            MissionState::Finished => StepOutput::drive(VelCmd::stop()),
        }
    }
}

impl StateKind {
    pub const ALL: [StateKind; 11] = [
        StateKind::Init,
        StateKind::Road,
        StateKind::PedCrossing,
        StateKind::LeadVehiclePass,
        StateKind::RouteMarker,
        StateKind::Mascot,
        StateKind::Tunnel,
        StateKind::Climb,
        StateKind::Summit,
        StateKind::ClueSubmission,
        StateKind::Finished,
    ];

    /// The states that can be entered from this one by a state's own guards. The deadline is
    /// the only other way to change state.
    pub fn successors(&self) -> &'static [StateKind] {
        match self {
            StateKind::Init => &[StateKind::Road],
            StateKind::Road => &[StateKind::PedCrossing, StateKind::LeadVehiclePass],
            StateKind::PedCrossing => &[StateKind::Road],
            StateKind::LeadVehiclePass => &[StateKind::RouteMarker],
            StateKind::RouteMarker => &[StateKind::Mascot],
            StateKind::Mascot => &[StateKind::Tunnel],
            StateKind::Tunnel => &[StateKind::Climb],
            StateKind::Climb => &[StateKind::Summit],
            StateKind::Summit => &[StateKind::ClueSubmission],
            StateKind::ClueSubmission => &[StateKind::Finished],
            StateKind::Finished => &[],
        }
    }

    pub fn can_transition_to(&self, to: StateKind) -> bool {
        self.successors().contains(&to)
    }

    /// States in which the vehicle looks for clue boards.
    pub fn reads_clues(&self) -> bool {
        matches!(
            self,
            StateKind::Road
                | StateKind::LeadVehiclePass
                | StateKind::RouteMarker
                | StateKind::Mascot
                | StateKind::Summit
        )
    }
}

impl Default for StateKind {
    fn default() -> Self {
        StateKind::Init
    }
}

impl Display for StateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StateKind::Init => "Init",
            StateKind::Road => "Road",
            StateKind::PedCrossing => "PedCrossing",
            StateKind::LeadVehiclePass => "LeadVehiclePass",
            StateKind::RouteMarker => "RouteMarker",
            StateKind::Mascot => "Mascot",
            StateKind::Tunnel => "Tunnel",
            StateKind::Climb => "Climb",
            StateKind::Summit => "Summit",
            StateKind::ClueSubmission => "ClueSubmission",
            StateKind::Finished => "Finished",
        };
        write!(f, "{}", name)
    }
}

impl StepOutput {
    pub fn drive(cmd: VelCmd) -> Self {
        Self {
            action: StateAction::None,
            data: MissionOutput::Drive(cmd),
        }
    }

    /// Drive with the command and hold it for `hold_s` seconds.
    pub fn hold(cmd: VelCmd, hold_s: f64) -> Self {
        Self {
            action: StateAction::None,
            data: MissionOutput::DriveHold { cmd, hold_s },
        }
    }

    pub fn transition(to: MissionState, data: MissionOutput) -> Self {
        Self {
            action: StateAction::Transition(to),
            data,
        }
    }
}
