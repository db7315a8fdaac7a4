//! # Alignment control module
//!
//! Alignment control drives the robot to a fixed distance and bearing from a fiducial marker. It
//! uses a pair of proportional controllers operating on the distance error and the angle error
//! respectively.
//!
//! The distance error is the difference between the robot's distance from the marker along the
//! floor and the desired distance, so that a positive error means the robot is too far away and
//! must drive forwards. The angle error is the difference between the robot's bearing from the
//! marker and the desired bearing, wrapped into (-pi, pi]. The controllers output normalised
//! forward and rotational demands which are saturated into `[-1, 1]`. While the robot is badly
//! misaligned the forward demand is damped, so that it turns to face the marker before closing
//! the distance.
//!
//! Once both errors are within tolerance the robot is aligned and the controller demands zero
//! velocity. There is no hysteresis, a robot sitting on the tolerance boundary may flick between
//! aligned and not aligned.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod gains;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use gains::ControlGains;
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Potential errors that can occur during alignment control.
#[derive(Debug, thiserror::Error)]
pub enum AlignCtrlError {
    #[error("Invalid alignment control parameter: {0}")]
    InvalidParams(String),

    /// The controller was given an observation of a different marker. This is treated as the
    /// target being absent.
    #[error("Expected an observation of marker {expected} but got marker {found}")]
    WrongMarker { expected: i32, found: i32 },
}
