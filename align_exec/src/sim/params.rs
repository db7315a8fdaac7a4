//! Simulation harness parameters

use serde::{Deserialize, Serialize};

use super::SimError;

/// Parameters for the vision simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimParams {
    /// Name of the simulated sensor, frames are published under `<sensor_name>/json`.
    pub sensor_name: String,

    /// Area a marker covers in the image when 1 m away, scaled by the inverse square of distance.
    ///
    /// Units: percent of the image
    pub area_at_1m_pct: f64,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            sensor_name: String::from("limelight"),
            area_at_1m_pct: 1.0,
        }
    }
}

impl SimParams {
    pub fn validate(&self) -> Result<(), SimError> {
        if self.sensor_name.trim().is_empty() {
            return Err(SimError::InvalidParams(String::from("sensor_name cannot be empty")));
        }

        if !(self.area_at_1m_pct.is_finite() && self.area_at_1m_pct > 0.0) {
            return Err(SimError::InvalidParams(format!(
                "area_at_1m_pct must be positive, found {}",
                self.area_at_1m_pct
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_validate() {
        assert!(SimParams::default().validate().is_ok());

        for area in [0.0, -1.0, std::f64::NAN, std::f64::INFINITY].iter() {
            let params = SimParams {
                area_at_1m_pct: *area,
                ..Default::default()
            };
            assert!(matches!(params.validate(), Err(SimError::InvalidParams(_))));
        }

        let params = SimParams {
            sensor_name: String::new(),
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }
}
