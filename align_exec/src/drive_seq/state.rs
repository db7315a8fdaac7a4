//! Drive sequence state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, warn};
use serde::Serialize;

// Internal
use super::{DriveSeqError, DriveSeqParams, EndReason, SeqState};
use crate::{
    align_ctrl::AlignCtrl,
    vehicle::MotionInterface,
    vision::VisionMgr,
};
use comms_if::{
    table::Table,
    tc::drive::{DriveRequest, VelocityCmd},
};
use util::{
    archive::{ArchiveError, Archived, Archiver},
    maths::lin_map,
    session::{get_elapsed_seconds, Session},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Drives the robot into alignment with a marker.
pub struct DriveSeq {
    params: DriveSeqParams,

    align_ctrl: AlignCtrl,

    state: SeqState,

    telem: Option<Table>,

    report: DriveSeqReport,
    arch_report: Archiver,
}

/// Per-step report, archived as one CSV row per step.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize)]
pub struct DriveSeqReport {
    /// Units: seconds since the session epoch
    pub time_s: f64,

    /// Number of steps taken in the running state
    pub step: u64,

    pub target_visible: bool,

    /// Units: meters
    pub distance_error_m: f64,

    /// Units: radians
    pub angle_error_rad: f64,

    /// Normalised forward demand from alignment control
    pub forward_norm: f64,

    /// Normalised rotational demand from alignment control
    pub rotational_norm: f64,

    /// Units: meters/second
    pub velocity_x_ms: f64,

    /// Units: meters/second
    pub velocity_y_ms: f64,

    /// Units: radians/second
    pub omega_rads: f64,

    pub forward_damped: bool,

    pub aligned: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DriveSeq {
    pub fn new(params: DriveSeqParams, align_ctrl: AlignCtrl) -> Result<Self, DriveSeqError> {
        params.validate()?;

        Ok(Self {
            params,
            align_ctrl,
            state: SeqState::Idle,
            telem: None,
            report: DriveSeqReport::default(),
            arch_report: Archiver::default(),
        })
    }

    /// Publish telemetry into the given table on every step.
    pub fn with_telemetry(mut self, table: &Table) -> Self {
        self.telem = Some(table.sub_table(&self.params.telem_table));
        self
    }

    /// Archive the per-step report into the session.
    pub fn init_archive(&mut self, session: &Session) -> Result<(), ArchiveError> {
        self.arch_report = Archiver::from_path(session, "drive_seq/report.csv")?;
        Ok(())
    }

    /// Begin (or restart) the sequence. Has no effect if already running.
    pub fn start(&mut self) {
        if self.state == SeqState::Running {
            return;
        }

        info!(
            "Drive sequence started, aligning to marker {}",
            self.align_ctrl.target().marker_id
        );
        self.state = SeqState::Running;
        self.report = DriveSeqReport::default();
        self.publish_state();
    }

    /// Run one step of the sequence. Does nothing unless running.
    ///
    /// `vision` must already have been updated for this cycle.
    pub fn step<M: MotionInterface>(&mut self, vision: &VisionMgr, vehicle: &mut M) {
        if self.state != SeqState::Running {
            return;
        }

        let target_id = self.align_ctrl.target().marker_id;
        let cmd = self.align_ctrl.tick(vision.observation(target_id));
        let vel = self.scale(&cmd);

        vehicle.set_control(DriveRequest::RobotCentric(vel));

        // Build the report
        let ctrl_rpt = *self.align_ctrl.report();
        self.report = DriveSeqReport {
            time_s: get_elapsed_seconds(),
            step: self.report.step + 1,
            target_visible: ctrl_rpt.target_visible,
            distance_error_m: ctrl_rpt.distance_error_m,
            angle_error_rad: ctrl_rpt.angle_error_rad,
            forward_norm: cmd.forward,
            rotational_norm: cmd.rotational,
            velocity_x_ms: vel.forward,
            velocity_y_ms: vel.lateral,
            omega_rads: vel.rotational,
            forward_damped: ctrl_rpt.forward_damped,
            aligned: self.align_ctrl.is_aligned(),
        };

        self.publish_velocity(&vel);

        if self.arch_report.is_init() {
            if let Err(e) = self.write() {
                warn!("Could not archive the drive sequence report: {}", e);
            }
        }

        // Check for termination
        if !self.align_ctrl.is_target_visible() {
            self.finish(vehicle, SeqState::Interrupted(EndReason::TargetLost));
        }
        else if self.align_ctrl.is_aligned() {
            self.finish(vehicle, SeqState::Completed(EndReason::Aligned));
        }
    }

    /// Withdraw the sequence, stopping the vehicle. Does nothing unless running.
    pub fn cancel<M: MotionInterface>(&mut self, vehicle: &mut M) {
        if self.state == SeqState::Running {
            self.finish(vehicle, SeqState::Interrupted(EndReason::Cancelled));
        }
    }

    pub fn state(&self) -> SeqState {
        self.state
    }

    pub fn report(&self) -> &DriveSeqReport {
        &self.report
    }

    pub fn align_ctrl(&self) -> &AlignCtrl {
        &self.align_ctrl
    }

    // -----------------------------------------------------------------------
    // PRIVATE
    // -----------------------------------------------------------------------

    /// Convert a normalised command into physical speeds.
    fn scale(&self, cmd: &VelocityCmd) -> VelocityCmd {
        let v = self.params.max_speed_ms;
        let w = self.params.max_rate_rads;

        VelocityCmd::new(
            lin_map((-1.0, 1.0), (-v, v), cmd.forward),
            lin_map((-1.0, 1.0), (-v, v), cmd.lateral),
            lin_map((-1.0, 1.0), (-w, w), cmd.rotational),
        )
    }

    fn finish<M: MotionInterface>(&mut self, vehicle: &mut M, end: SeqState) {
        vehicle.set_control(DriveRequest::RobotCentric(VelocityCmd::ZERO));
        self.publish_velocity(&VelocityCmd::ZERO);

        self.state = end;
        self.publish_state();

        match end {
            SeqState::Completed(r) => info!(
                "Drive sequence completed ({:?}) after {} steps",
                r, self.report.step
            ),
            SeqState::Interrupted(r) => info!(
                "Drive sequence interrupted ({:?}) after {} steps",
                r, self.report.step
            ),
            s => debug!("Drive sequence finished in unexpected state {:?}", s),
        }
    }

    fn publish_velocity(&self, vel: &VelocityCmd) {
        if let Some(ref t) = self.telem {
            t.put_number("VelocityX", vel.forward);
            t.put_number("VelocityY", vel.lateral);
            t.put_number("OmegaRadPerSec", vel.rotational);
            t.put_bool("IsAligned", self.align_ctrl.is_aligned());
        }
    }

    fn publish_state(&self) {
        if let Some(ref t) = self.telem {
            t.put_string("State", format!("{:?}", self.state));
        }
    }
}

impl Archived for DriveSeq {
    fn write(&mut self) -> Result<(), ArchiveError> {
        self.arch_report.serialise(self.report)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
