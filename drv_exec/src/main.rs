//! Main driver executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise the session, logging and parameters
//!     - Connect the camera, drive, score and sign reader clients
//!     - Main loop, one cycle per new camera frame:
//!         - Frame acquisition
//!         - Perception and clue capture
//!         - Mission state step
//!         - Drive and score output
//!     - Save the mission summary and exit once the mission is finished

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{debug, error, info};
use std::{thread, time::Duration};
use structopt::StructOpt;

// Internal
use comms_if::{eqpt::drive::VelCmd, net::zmq};
use drv_lib::{
    cam_client::CamClient,
    drive_client::DriveClient,
    io::{ActuationSink, FrameSource},
    mission::{CycleStatus, MissionIo, MissionMgr},
    params::DrvExecParams,
    score_client::ScoreClient,
    sign_reader::RemoteSignReader,
};
use util::{
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

/// Command line options
#[derive(Debug, StructOpt)]
#[structopt(name = "drv_exec", about = "Autonomous driver mission controller")]
struct Opt {
    /// Mission parameter file, relative to the params directory
    #[structopt(long, default_value = "mission.toml")]
    mission_params: String,

    /// Executable parameter file, relative to the params directory
    #[structopt(long, default_value = "drv_exec.toml")]
    exec_params: String,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opt = Opt::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("drv_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Driver Executable\n");
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI options: {:?}", opt);

    // ---- LOAD PARAMETERS ----

    let exec_params: DrvExecParams =
        util::params::load(&opt.exec_params).wrap_err("Could not load exec params")?;

    let mut mission_mgr = MissionMgr::init(&opt.mission_params, exec_params.team.clone())
        .wrap_err("Failed to initialise the mission manager")?;

    info!("Parameters loaded");

    // ---- INITIALISE NETWORK ----

    let zmq_ctx = zmq::Context::new();

    let cam_client = {
        let c = CamClient::new(&zmq_ctx, &exec_params).wrap_err("Failed to initialise CamClient")?;
        info!("CamClient initialised");
        c
    };

    let mut drive_client = {
        let c = DriveClient::new(&zmq_ctx, &exec_params)
            .wrap_err("Failed to initialise DriveClient")?;
        info!("DriveClient initialised");
        c
    };

    let mut score_client = {
        let c = ScoreClient::new(&zmq_ctx, &exec_params)
            .wrap_err("Failed to initialise ScoreClient")?;
        info!("ScoreClient initialised");
        c
    };

    let mut sign_reader = {
        let r = RemoteSignReader::new(&zmq_ctx, &exec_params, mission_mgr.params.board.clone())
            .wrap_err("Failed to initialise RemoteSignReader")?;
        info!("RemoteSignReader initialised");
        r
    };

    info!("Network initialised\n");

    // ---- MAIN LOOP ----

    info!("Begining main loop, waiting for frames\n");

    let poll_period = Duration::from_secs_f64(exec_params.poll_period_s);
    let mut last_seq = None;

    loop {
        // Only run a cycle on a frame that hasn't been seen before
        let frame = match cam_client.latest() {
            Some(f) if Some(f.seq) != last_seq => f,
            _ => {
                thread::sleep(poll_period);
                continue;
            }
        };
        last_seq = Some(frame.seq);

        let mut io = MissionIo {
            actuation: &mut drive_client,
            telemetry: &mut score_client,
            sign_reader: &mut sign_reader,
        };

        match mission_mgr.step(&frame, &mut io) {
            Ok(CycleStatus::Running) => (),
            Ok(CycleStatus::Finished) => {
                info!(
                    "Mission finished after {} cycles with {} clues",
                    mission_mgr.context().cycle_count,
                    mission_mgr.tm().num_signs
                );
                break;
            }
            Err(e) => error!("Error in cycle {}: {}", mission_mgr.context().cycle_count, e),
        }
    }

    // ---- SHUTDOWN ----

    drive_client.publish(VelCmd::stop());

    session.save("mission_tm.json", mission_mgr.tm().clone());
    session.exit();

    info!("End of execution");

    Ok(())
}
