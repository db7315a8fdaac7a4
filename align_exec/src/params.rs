//! # Alignment Executable Parameters
//!
//! This module provides the parameters for the alignment executable, gathering those of each
//! module into a single file.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::{
    align_ctrl::{AlignCtrlError, AlignCtrlParams},
    drive_seq::{DriveSeqError, DriveSeqParams},
    head_ctrl::{HeadCtrlError, HeadCtrlParams},
    vision::{VisionError, VisionParams},
};
#[cfg(feature = "sim")]
use crate::sim::{SimError, SimParams};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// All parameters for the executable. Any missing table takes its defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignExecParams {
    pub exec: ExecParams,
    pub vision: VisionParams,
    pub align_ctrl: AlignCtrlParams,
    pub drive_seq: DriveSeqParams,
    pub head_ctrl: HeadCtrlParams,
    #[cfg(feature = "sim")]
    pub sim: SimParams,
}

/// Parameters of the executable's main loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecParams {
    /// Target period of one cycle.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// Number of cycles after which the run is stopped.
    pub max_cycles: u64,

    /// Directory, relative to the software root, sessions are created in.
    pub sessions_dir: String,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A parameter which would be rejected by the module it configures.
#[derive(Debug, thiserror::Error)]
pub enum ParamsError {
    #[error("Invalid exec parameter: {0}")]
    Exec(String),

    #[error(transparent)]
    Vision(#[from] VisionError),

    #[error(transparent)]
    AlignCtrl(#[from] AlignCtrlError),

    #[error(transparent)]
    DriveSeq(#[from] DriveSeqError),

    #[error(transparent)]
    HeadCtrl(#[from] HeadCtrlError),

    #[cfg(feature = "sim")]
    #[error(transparent)]
    Sim(#[from] SimError),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl AlignExecParams {
    /// Check every module's parameters, so that a bad file is rejected before anything starts.
    pub fn validate(&self) -> Result<(), ParamsError> {
        self.exec.validate()?;
        self.vision.validate()?;
        self.align_ctrl.validate()?;
        self.drive_seq.validate()?;
        self.head_ctrl.validate()?;
        #[cfg(feature = "sim")]
        self.sim.validate()?;

        Ok(())
    }
}

impl ExecParams {
    pub fn validate(&self) -> Result<(), ParamsError> {
        if !(self.cycle_period_s.is_finite() && self.cycle_period_s > 0.0) {
            return Err(ParamsError::Exec(format!(
                "cycle_period_s must be positive, found {}",
                self.cycle_period_s
            )));
        }

        if self.max_cycles == 0 {
            return Err(ParamsError::Exec(String::from("max_cycles must be at least 1")));
        }

        Ok(())
    }
}

impl Default for ExecParams {
    fn default() -> Self {
        Self {
            cycle_period_s: 0.02,
            max_cycles: 1500,
            sessions_dir: String::from("sessions"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_params_file() {
        let p: AlignExecParams = util::params::from_str(include_str!(
            "../../params/align_exec.toml"
        ))
        .unwrap();

        assert_eq!(p.exec.cycle_period_s, 0.02);
        assert_eq!(p.vision.sensor_name, "limelight");
        assert_eq!(p.align_ctrl.target.marker_id, 2);
        assert_eq!(p.align_ctrl.distance_gain, 2.0);
        assert_eq!(p.align_ctrl.angle_gain, 0.8);
        assert_eq!(p.drive_seq.max_speed_ms, 2.0);
        assert_eq!(p.head_ctrl.min_rate_rads, 1.5);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_partial_params() {
        let p: AlignExecParams = util::params::from_str(
            "[align_ctrl.target]\nmarker_id = 7\ndesired_distance_m = 0.8\n"
        )
        .unwrap();

        assert_eq!(p.align_ctrl.target.marker_id, 7);
        assert_eq!(p.align_ctrl.target.desired_distance_m, 0.8);
        assert_eq!(p.align_ctrl.target.distance_tolerance_m, 0.05);
        assert_eq!(p.exec.max_cycles, 1500);
    }

    #[test]
    fn test_bad_cycle_period_rejected() {
        for period in ["-0.02", "0.0"].iter() {
            let p: AlignExecParams = util::params::from_str(&format!(
                "[exec]\ncycle_period_s = {}\n",
                period
            ))
            .unwrap();

            assert!(
                matches!(p.validate(), Err(ParamsError::Exec(_))),
                "period {} accepted",
                period
            );
        }

        for period in [std::f64::NAN, std::f64::INFINITY].iter() {
            let exec = ExecParams {
                cycle_period_s: *period,
                ..Default::default()
            };
            assert!(exec.validate().is_err());
        }
    }

    #[test]
    fn test_zero_max_cycles_rejected() {
        let p: AlignExecParams = util::params::from_str("[exec]\nmax_cycles = 0\n").unwrap();
        assert!(matches!(p.validate(), Err(ParamsError::Exec(_))));
    }

    #[test]
    fn test_module_errors_reported() {
        let p: AlignExecParams =
            util::params::from_str("[drive_seq]\nmax_speed_ms = -2.0\n").unwrap();
        assert!(matches!(p.validate(), Err(ParamsError::DriveSeq(_))));

        #[cfg(feature = "sim")]
        {
            let p: AlignExecParams =
                util::params::from_str("[sim]\narea_at_1m_pct = -1.0\n").unwrap();
            assert!(matches!(p.validate(), Err(ParamsError::Sim(_))));
        }
    }
}
