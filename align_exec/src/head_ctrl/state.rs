//! Heading control module state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, warn};
use serde::Serialize;

// Internal
use super::{CanonicalHeading, HeadCtrlError, HeadCtrlParams};
use comms_if::{table::Table, tc::drive::VelocityCmd};
use util::{
    maths::{apply_min_magnitude, clamp, normalise_angle},
    module::State,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Heading control module state
#[derive(Debug)]
pub struct HeadCtrl {
    params: HeadCtrlParams,

    /// Heading to hold.
    ///
    /// Units: radians, in (-pi, pi]
    target_rad: f64,

    telem: Option<Table>,

    report: HeadStatusReport,
}

/// Status report for heading control processing.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize)]
pub struct HeadStatusReport {
    /// Units: radians
    pub heading_error_rad: f64,

    /// Units: radians/second
    pub rate_rads: f64,

    /// True if the error was inside the deadband, so no turn was demanded
    pub in_deadband: bool,

    /// True if the rate was raised to the minimum rate
    pub min_rate_applied: bool,

    /// True if the rate hit the maximum rate
    pub saturated: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for HeadCtrl {
    /// Current heading of the robot in radians
    type InputData = f64;
    type OutputData = VelocityCmd;
    type StatusReport = HeadStatusReport;
    type ProcError = HeadCtrlError;

    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        self.report = HeadStatusReport::default();

        let current_rad = *input_data;
        if !current_rad.is_finite() {
            self.publish();
            return Err(HeadCtrlError::NonFiniteHeading(current_rad));
        }

        let error = normalise_angle(self.target_rad - current_rad);
        self.report.heading_error_rad = error;

        let rate = if error.abs() > self.params.deadband_rad {
            let p_rate = self.params.gain * error;
            let rate = apply_min_magnitude(p_rate, self.params.min_rate_rads);
            self.report.min_rate_applied = rate != p_rate;
            rate
        }
        else {
            self.report.in_deadband = true;
            0.0
        };

        let max = self.params.max_rate_rads;
        let clamped = clamp(rate, -max, max);
        self.report.saturated = clamped != rate;
        self.report.rate_rads = clamped;

        self.publish();

        Ok((VelocityCmd::rotation_only(clamped), self.report))
    }
}

impl HeadCtrl {
    /// Create a controller holding an arbitrary heading in radians.
    pub fn new(params: HeadCtrlParams, target_rad: f64) -> Result<Self, HeadCtrlError> {
        params.validate()?;

        if !target_rad.is_finite() {
            return Err(HeadCtrlError::NonFiniteHeading(target_rad));
        }

        let target_rad = normalise_angle(target_rad);
        debug!("HeadCtrl holding {:.3} rad", target_rad);

        Ok(Self {
            params,
            target_rad,
            telem: None,
            report: HeadStatusReport::default(),
        })
    }

    /// Create a controller holding one of the canonical headings.
    pub fn facing(params: HeadCtrlParams, heading: CanonicalHeading) -> Result<Self, HeadCtrlError> {
        Self::new(params, heading.heading_rad())
    }

    /// Create a controller holding a canonical heading given by name.
    pub fn from_name(params: HeadCtrlParams, name: &str) -> Result<Self, HeadCtrlError> {
        Self::facing(params, name.parse()?)
    }

    /// Publish telemetry into the given table on every tick.
    pub fn with_telemetry(mut self, table: &Table) -> Self {
        self.telem = Some(table.sub_table(&self.params.telem_table));
        self
    }

    /// Compute the turn rate needed to hold the heading.
    ///
    /// The returned command only has a rotational component, in radians/second. A non-finite
    /// heading results in a zero command.
    pub fn tick(&mut self, current_heading_rad: f64) -> VelocityCmd {
        match self.proc(&current_heading_rad) {
            Ok((cmd, _)) => cmd,
            Err(e) => {
                warn!("{}", e);
                VelocityCmd::ZERO
            }
        }
    }

    /// Heading control holds until cancelled, so is never finished.
    pub fn is_finished(&self) -> bool {
        false
    }

    pub fn target_rad(&self) -> f64 {
        self.target_rad
    }

    pub fn report(&self) -> &HeadStatusReport {
        &self.report
    }

    fn publish(&self) {
        if let Some(ref t) = self.telem {
            t.put_number("Target (deg)", self.target_rad.to_degrees());
            t.put_number("Error (rad)", self.report.heading_error_rad);
            t.put_number("Rate (rad per s)", self.report.rate_rads);
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
