//! Drive sequence parameters

use serde::{Deserialize, Serialize};

use super::DriveSeqError;

/// Parameters for the drive sequence
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveSeqParams {
    /// Speed corresponding to a normalised forward or lateral demand of 1.
    ///
    /// Units: meters/second
    pub max_speed_ms: f64,

    /// Turn rate corresponding to a normalised rotational demand of 1.
    ///
    /// Units: radians/second
    pub max_rate_rads: f64,

    /// Name of the table the sequence publishes its telemetry under.
    pub telem_table: String,
}

impl Default for DriveSeqParams {
    fn default() -> Self {
        Self {
            max_speed_ms: 2.0,
            max_rate_rads: std::f64::consts::TAU,
            telem_table: String::from("Drive"),
        }
    }
}

impl DriveSeqParams {
    pub fn validate(&self) -> Result<(), DriveSeqError> {
        if !(self.max_speed_ms.is_finite() && self.max_speed_ms > 0.0) {
            return Err(DriveSeqError::InvalidParams(format!(
                "max_speed_ms must be positive, found {}",
                self.max_speed_ms
            )));
        }

        if !(self.max_rate_rads.is_finite() && self.max_rate_rads > 0.0) {
            return Err(DriveSeqError::InvalidParams(format!(
                "max_rate_rads must be positive, found {}",
                self.max_rate_rads
            )));
        }

        Ok(())
    }
}
