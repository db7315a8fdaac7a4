//! Alignment control parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
use super::AlignCtrlError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The position the robot shall be aligned to, relative to a marker.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetSpec {
    /// Identifier of the marker to align to.
    pub marker_id: i32,

    /// Distance from the marker, along the floor.
    ///
    /// Units: meters
    pub desired_distance_m: f64,

    /// Bearing of the robot from the marker.
    ///
    /// Units: radians
    pub desired_angle_rad: f64,

    /// Units: meters
    pub distance_tolerance_m: f64,

    /// Units: radians
    pub angle_tolerance_rad: f64,
}

/// Parameters for alignment control
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignCtrlParams {
    pub target: TargetSpec,

    /// Initial distance controller proportional gain.
    pub distance_gain: f64,

    /// Initial angle controller proportional gain.
    pub angle_gain: f64,

    /// Angle error above which the forward demand is damped.
    ///
    /// Units: radians
    pub misalign_threshold_rad: f64,

    /// Factor applied to the forward demand while damped.
    pub misalign_forward_scale: f64,

    /// Saturation limit of the normalised forward and rotational demands.
    pub max_output: f64,

    /// Name of the table the controller publishes its telemetry under.
    pub telem_table: String,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for TargetSpec {
    fn default() -> Self {
        Self {
            marker_id: 2,
            desired_distance_m: 1.5,
            desired_angle_rad: 0.0,
            distance_tolerance_m: 0.05,
            angle_tolerance_rad: 0.05,
        }
    }
}

impl TargetSpec {
    pub fn new(marker_id: i32, desired_distance_m: f64, desired_angle_rad: f64) -> Self {
        Self {
            marker_id,
            desired_distance_m,
            desired_angle_rad,
            ..Default::default()
        }
    }

    pub fn with_tolerances(mut self, distance_m: f64, angle_rad: f64) -> Self {
        self.distance_tolerance_m = distance_m;
        self.angle_tolerance_rad = angle_rad;
        self
    }
}

impl Default for AlignCtrlParams {
    fn default() -> Self {
        Self {
            target: TargetSpec::default(),
            distance_gain: 2.0,
            angle_gain: 0.8,
            misalign_threshold_rad: 0.785,
            misalign_forward_scale: 0.3,
            max_output: 1.0,
            telem_table: String::from("Align"),
        }
    }
}

impl AlignCtrlParams {
    /// Check the parameters are usable, rejecting non-positive tolerances and limits.
    pub fn validate(&self) -> Result<(), AlignCtrlError> {
        let positive = [
            ("target.distance_tolerance_m", self.target.distance_tolerance_m),
            ("target.angle_tolerance_rad", self.target.angle_tolerance_rad),
            ("misalign_threshold_rad", self.misalign_threshold_rad),
            ("max_output", self.max_output),
        ];

        for (name, value) in positive.iter() {
            if !(value.is_finite() && *value > 0.0) {
                return Err(AlignCtrlError::InvalidParams(format!(
                    "{} must be positive, found {}",
                    name, value
                )));
            }
        }

        if !(self.target.desired_distance_m.is_finite() && self.target.desired_distance_m >= 0.0) {
            return Err(AlignCtrlError::InvalidParams(format!(
                "target.desired_distance_m must be non-negative, found {}",
                self.target.desired_distance_m
            )));
        }

        if !self.target.desired_angle_rad.is_finite() {
            return Err(AlignCtrlError::InvalidParams(String::from(
                "target.desired_angle_rad must be finite"
            )));
        }

        if !(0.0..=1.0).contains(&self.misalign_forward_scale) {
            return Err(AlignCtrlError::InvalidParams(format!(
                "misalign_forward_scale must be in [0, 1], found {}",
                self.misalign_forward_scale
            )));
        }

        Ok(())
    }
}
