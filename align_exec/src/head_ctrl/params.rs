//! Heading control parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::HeadCtrlError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for heading control
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadCtrlParams {
    /// Proportional gain.
    ///
    /// Units: (radians/second)/radian
    pub gain: f64,

    /// Minimum turn rate used outside the deadband.
    ///
    /// Units: radians/second
    pub min_rate_rads: f64,

    /// Heading error below which the robot stops turning.
    ///
    /// Units: radians
    pub deadband_rad: f64,

    /// Maximum turn rate.
    ///
    /// Units: radians/second
    pub max_rate_rads: f64,

    /// Name of the table the controller publishes its telemetry under.
    pub telem_table: String,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for HeadCtrlParams {
    fn default() -> Self {
        Self {
            gain: 3.0,
            min_rate_rads: 1.5,
            deadband_rad: 0.1,
            max_rate_rads: std::f64::consts::TAU,
            telem_table: String::from("Heading"),
        }
    }
}

impl HeadCtrlParams {
    pub fn validate(&self) -> Result<(), HeadCtrlError> {
        let checks = [
            ("gain", self.gain, self.gain.is_finite() && self.gain > 0.0),
            ("min_rate_rads", self.min_rate_rads, self.min_rate_rads >= 0.0),
            ("deadband_rad", self.deadband_rad, self.deadband_rad >= 0.0),
            ("max_rate_rads", self.max_rate_rads, self.max_rate_rads > 0.0),
        ];

        for (name, value, ok) in checks.iter() {
            if !ok || !value.is_finite() {
                return Err(HeadCtrlError::InvalidParams(format!(
                    "{} out of range, found {}",
                    name, value
                )));
            }
        }

        if self.min_rate_rads > self.max_rate_rads {
            return Err(HeadCtrlError::InvalidParams(format!(
                "min_rate_rads ({}) exceeds max_rate_rads ({})",
                self.min_rate_rads, self.max_rate_rads
            )));
        }

        Ok(())
    }
}
