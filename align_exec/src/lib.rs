//! # Alignment library.
//!
//! This library allows other crates in the workspace to access items defined inside the
//! alignment crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Alignment control - drives the robot to a fixed position relative to a marker
pub mod align_ctrl;

/// Global data store for the executable
pub mod data_store;

/// Drive sequence - runs alignment control against the vehicle until aligned or lost
pub mod drive_seq;

/// Geometry - robot poses relative to markers
pub mod geom;

/// Heading control - turns the robot to face a direction in the field
pub mod head_ctrl;

/// Executable parameters
pub mod params;

/// Simulation - synthetic vision frames and a kinematic vehicle
#[cfg(feature = "sim")]
pub mod sim;

/// Operator tuning of the alignment gains
pub mod tuning;

/// Interfaces to the physical robot
pub mod vehicle;

/// Vision manager - provides fiducial observations from the camera
pub mod vision;
