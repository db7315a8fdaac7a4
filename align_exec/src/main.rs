//! Main alignment executable entry point.
//!
//! # Architecture
//!
//! The executable runs the control pipeline against the simulation harness. Each run consists of:
//!
//!     - Initialise the session, logging and parameters
//!     - Initialise all modules
//!     - Main loop:
//!         - Operator tuning input
//!         - Vision acquisition
//!         - Control processing (drive sequence or heading hold)
//!         - Simulated vehicle update
//!     - Save the final telemetry snapshot
//!
//! # Modules
//!
//! All cyclic control modules (e.g. `align_ctrl`) shall provide a public struct implementing the
//! `util::module::State` trait.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{debug, info, warn};
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};
use structopt::StructOpt;

// Internal
use align_lib::{
    align_ctrl::AlignCtrl,
    data_store::DataStore,
    drive_seq::{DriveSeq, SeqState},
    head_ctrl::{HeadCtrl, HeadHold},
    params::AlignExecParams,
    sim::{SimVehicle, VisionSim},
    tuning::Tuning,
    vehicle::PoseSource,
    vision::VisionMgr,
};
use comms_if::table::Table;
use util::{
    host,
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Debug, StructOpt)]
#[structopt(
    name = "align_exec",
    about = "Vision based marker alignment, run in closed loop against the simulator"
)]
struct Opt {
    /// Parameter file, relative to $ALIGN_SW_ROOT/params unless it exists as given
    #[structopt(short, long, default_value = "align_exec.toml")]
    params: String,

    /// Minimum log level, one of trace, debug or info
    #[structopt(short, long, default_value = "debug")]
    log_level: LevelFilter,

    /// Sleep to keep each cycle to the cycle period, rather than running as fast as possible
    #[structopt(long)]
    realtime: bool,

    /// Override the maximum number of cycles in the run
    #[structopt(long)]
    max_cycles: Option<u64>,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(Debug, StructOpt)]
enum Command {
    /// Drive into alignment with the target marker
    #[structopt(name = "align")]
    Align {
        /// Starting distance from the marker in meters
        #[structopt(long, default_value = "2.5")]
        start_distance_m: f64,

        /// Starting bearing from the marker in degrees
        #[structopt(long, default_value = "20")]
        start_bearing_deg: f64,

        /// Hide the marker from the camera at this cycle
        #[structopt(long)]
        lose_target_at: Option<u64>,
    },

    /// Turn to face a heading (forward, left, backward, right or operator) and hold it
    #[structopt(name = "face")]
    Face {
        heading: String,

        /// Starting heading in degrees
        #[structopt(long, default_value = "0")]
        start_heading_deg: f64,

        /// How long to hold the heading for in seconds
        #[structopt(long, default_value = "2")]
        hold_s: f64,
    },

    /// Replay a constant speed approach to the target marker, without driving
    #[structopt(name = "approach")]
    Approach {
        /// Starting distance from the marker in meters
        #[structopt(long, default_value = "2.5")]
        start_distance_m: f64,

        /// Approach speed in meters/second
        #[structopt(long, default_value = "0.5")]
        speed_ms: f64,

        /// Time between replayed frames in seconds
        #[structopt(long, default_value = "0.1")]
        step_s: f64,

        /// Number of frames to replay
        #[structopt(long, default_value = "20")]
        steps: u64,
    },
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opt = Opt::from_args();

    // ---- EARLY INITIALISATION ----

    let mut params = load_params(&opt.params)?;
    if let Some(n) = opt.max_cycles {
        params.exec.max_cycles = n;
    }
    params.validate()
        .wrap_err_with(|| format!("Invalid parameters in \"{}\"", opt.params))?;

    // Initialise session
    let sessions_dir = host::get_sw_root_or_cwd()
        .wrap_err("Failed to find the software root")?
        .join(&params.exec.sessions_dir);
    let session = Session::new_in(sessions_dir, "align_exec")
        .wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(opt.log_level, &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Alignment Executable\n");
    info!("Session directory: {:?}", session.session_root);
    info!("Parameters loaded from \"{}\"", opt.params);
    debug!("{:#?}", params);

    session.save("params.json", &params);

    // ---- RUN ----

    let table = Table::new();

    match opt.cmd {
        Command::Align {
            start_distance_m,
            start_bearing_deg,
            lose_target_at,
        } => run_align(
            &params,
            &session,
            &table,
            opt.realtime,
            start_distance_m,
            start_bearing_deg.to_radians(),
            lose_target_at,
        )?,
        Command::Face {
            heading,
            start_heading_deg,
            hold_s,
        } => run_face(&params, &table, opt.realtime, &heading, start_heading_deg, hold_s)?,
        Command::Approach {
            start_distance_m,
            speed_ms,
            step_s,
            steps,
        } => run_approach(&params, &table, start_distance_m, speed_ms, step_s, steps)?,
    }

    // ---- SHUTDOWN ----

    let snapshot = session
        .save_json("telemetry.json", &table.snapshot())
        .wrap_err("Failed to save the telemetry snapshot")?;
    info!("Telemetry snapshot saved to {:?}", snapshot);

    info!("End of execution");

    Ok(())
}

/// Load the parameters, either from a path as given or relative to the parameters directory.
fn load_params(path: &str) -> Result<AlignExecParams, Report> {
    let params: Result<AlignExecParams, _> = if Path::new(path).exists() {
        util::params::load_path(path)
    }
    else {
        util::params::load(path)
    };

    params.wrap_err_with(|| format!("Could not load the parameter file \"{}\"", path))
}

/// Closed loop alignment against the simulated vehicle.
fn run_align(
    params: &AlignExecParams,
    session: &Session,
    table: &Table,
    realtime: bool,
    start_distance_m: f64,
    start_bearing_rad: f64,
    lose_target_at: Option<u64>,
) -> Result<(), Report> {
    info!("Initialising modules...");

    let mut sim = VisionSim::new(params.sim.clone());
    sim.init(table);

    let mut vision = VisionMgr::new(params.vision.clone(), table)
        .wrap_err("Failed to initialise the VisionMgr")?;
    info!("VisionMgr init complete");

    let align_ctrl = AlignCtrl::new(params.align_ctrl.clone())
        .wrap_err("Failed to initialise AlignCtrl")?
        .with_telemetry(table);
    let target_id = align_ctrl.target().marker_id;
    info!("AlignCtrl init complete");

    let tuning = Tuning::new(table, align_ctrl.gains());
    tuning.init();

    let mut seq = DriveSeq::new(params.drive_seq.clone(), align_ctrl)
        .wrap_err("Failed to initialise the DriveSeq")?
        .with_telemetry(table);
    seq.init_archive(session)
        .wrap_err("Failed to initialise the DriveSeq archive")?;
    info!("DriveSeq init complete");

    let mut vehicle = SimVehicle::new(sim, target_id, start_distance_m, start_bearing_rad);

    info!("Module initialisation complete\n");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let mut ds = DataStore::default();
    let period_s = params.exec.cycle_period_s;

    seq.start();

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start(1.0 / period_s);

        if lose_target_at == Some(ds.num_cycles) {
            info!("Hiding the marker from the camera");
            vehicle.set_marker_in_view(false);
        }

        // ---- DATA INPUT ----

        tuning.update();
        vision.update();
        ds.target_visible = vision.is_visible(target_id);

        // ---- CONTROL ALGORITHM PROCESSING ----

        seq.step(&vision, &mut vehicle);

        ds.align_rpt = *seq.align_ctrl().report();
        ds.last_cmd = vehicle.current_cmd();
        ds.seq_state = seq.state();

        if ds.is_1_hz_cycle {
            info!(
                "t = {:.2} s: distance error {:.3} m, angle error {:.3} rad, cmd ({:.2} m/s, {:.2} rad/s)",
                ds.sim_time_s,
                ds.align_rpt.distance_error_m,
                ds.align_rpt.angle_error_rad,
                ds.last_cmd.forward,
                ds.last_cmd.rotational
            );
        }

        if ds.seq_state.is_finished() {
            break;
        }

        if ds.num_cycles >= params.exec.max_cycles {
            warn!("Cycle limit ({}) reached before alignment", params.exec.max_cycles);
            seq.cancel(&mut vehicle);
            break;
        }

        // ---- SIMULATION ----

        vehicle.advance(period_s);

        // ---- CYCLE MANAGEMENT ----

        wait_for_cycle_end(&mut ds, cycle_start_instant, period_s, realtime);
    }

    match seq.state() {
        SeqState::Completed(r) => info!(
            "Alignment completed ({:?}) at {:.3} m, {:.3} rad",
            r,
            vehicle.distance_m(),
            vehicle.bearing_rad()
        ),
        s => warn!("Alignment did not complete: {:?}", s),
    }

    Ok(())
}

/// Hold a named heading against the simulated vehicle.
fn run_face(
    params: &AlignExecParams,
    table: &Table,
    realtime: bool,
    heading: &str,
    start_heading_deg: f64,
    hold_s: f64,
) -> Result<(), Report> {
    let ctrl = HeadCtrl::from_name(params.head_ctrl.clone(), heading)
        .wrap_err("Failed to initialise HeadCtrl")?
        .with_telemetry(table);
    let mut hold = HeadHold::new(ctrl);

    // The vehicle only turns here, so it's placed in front of the target marker
    let mut sim = VisionSim::new(params.sim.clone());
    sim.init(table);
    let mut vehicle = SimVehicle::new(
        sim,
        params.align_ctrl.target.marker_id,
        params.align_ctrl.target.desired_distance_m,
        0.0,
    )
    .with_heading(start_heading_deg.to_radians());

    let mut ds = DataStore::default();
    let period_s = params.exec.cycle_period_s;
    let hold_cycles = ((hold_s / period_s).ceil() as u64).min(params.exec.max_cycles);

    hold.start();

    while ds.num_cycles < hold_cycles {
        let cycle_start_instant = Instant::now();
        ds.cycle_start(1.0 / period_s);

        let heading_rad = vehicle.heading_rad();
        hold.step(&heading_rad, &mut vehicle);

        if ds.is_1_hz_cycle {
            info!(
                "t = {:.2} s: heading {:.1} deg, error {:.3} rad",
                ds.sim_time_s,
                vehicle.heading_rad().to_degrees(),
                hold.ctrl().report().heading_error_rad
            );
        }

        vehicle.advance(period_s);

        wait_for_cycle_end(&mut ds, cycle_start_instant, period_s, realtime);
    }

    hold.cancel(&mut vehicle);

    info!(
        "Heading hold finished at {:.1} deg (target {:.1} deg)",
        vehicle.heading_rad().to_degrees(),
        hold.ctrl().target_rad().to_degrees()
    );

    Ok(())
}

/// Open loop replay of a constant speed approach, reporting what alignment control would demand.
fn run_approach(
    params: &AlignExecParams,
    table: &Table,
    start_distance_m: f64,
    speed_ms: f64,
    step_s: f64,
    steps: u64,
) -> Result<(), Report> {
    let mut sim = VisionSim::new(params.sim.clone());
    sim.init(table);

    let mut vision = VisionMgr::new(params.vision.clone(), table)
        .wrap_err("Failed to initialise the VisionMgr")?;
    let mut ctrl = AlignCtrl::new(params.align_ctrl.clone())
        .wrap_err("Failed to initialise AlignCtrl")?
        .with_telemetry(table);

    let target = *ctrl.target();

    for k in 1..=steps {
        let elapsed_s = k as f64 * step_s;

        let simulated = sim.step_approach(
            target.marker_id,
            start_distance_m,
            target.desired_distance_m,
            speed_ms,
            elapsed_s,
        );

        vision.update();
        let cmd = ctrl.tick(vision.observation(target.marker_id));

        info!(
            "t = {:.2} s: simulated {:?} m, measured {:?} m, forward {:.3}, aligned {}",
            elapsed_s,
            simulated,
            vision.distance_to(target.marker_id),
            cmd.forward,
            ctrl.is_aligned()
        );
    }

    sim.log_state();

    Ok(())
}

/// Sleep until the end of the cycle when running in real time, recording any overrun.
fn wait_for_cycle_end(ds: &mut DataStore, cycle_start_instant: Instant, period_s: f64, realtime: bool) {
    if !realtime {
        return;
    }

    let cycle_dur = Instant::now() - cycle_start_instant;

    // Get sleep duration
    match Duration::from_secs_f64(period_s).checked_sub(cycle_dur) {
        Some(d) => {
            ds.num_consec_cycle_overruns = 0;
            thread::sleep(d);
        }
        None => {
            warn!(
                "Cycle overran by {:.06} s",
                cycle_dur.as_secs_f64() - period_s
            );
            ds.num_consec_cycle_overruns += 1;
        }
    }
}
