//! Vision manager parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::VisionError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the vision manager.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionParams {
    /// Name of the sensor in the table, frames are read from `<sensor_name>/json`.
    pub sensor_name: String,

    /// Name of the table the manager publishes its telemetry under.
    pub telem_table: String,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for VisionParams {
    fn default() -> Self {
        Self {
            sensor_name: String::from("limelight"),
            telem_table: String::from("Vision"),
        }
    }
}

impl VisionParams {
    pub fn validate(&self) -> Result<(), VisionError> {
        if self.sensor_name.trim().is_empty() {
            return Err(VisionError::EmptySensorName);
        }

        Ok(())
    }
}
