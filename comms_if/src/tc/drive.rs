//! # Drive telecommands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A three axis velocity command for a holonomic base.
///
/// Whether the components are normalised (in `[-1, 1]`) or physical (m/s and rad/s) depends on
/// the producer. Control modules output normalised commands, the sequencers scale them before
/// sending them to the vehicle.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VelocityCmd {
    /// Speed along the robot's X+ (forwards) axis.
    pub forward: f64,

    /// Speed along the robot's Y+ (left) axis.
    pub lateral: f64,

    /// Turn rate about the robot's Z+ (upwards) axis.
    ///
    /// Follows the right hand rule, so positive rates turn the robot to the left.
    pub rotational: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A request sent to the vehicle's motion interface.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub enum DriveRequest {
    /// Velocities expressed in the robot's own frame.
    RobotCentric(VelocityCmd),

    /// Velocities expressed in the field frame.
    FieldCentric(VelocityCmd),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl VelocityCmd {
    /// The stop command.
    pub const ZERO: Self = Self {
        forward: 0.0,
        lateral: 0.0,
        rotational: 0.0,
    };

    pub fn new(forward: f64, lateral: f64, rotational: f64) -> Self {
        Self {
            forward,
            lateral,
            rotational,
        }
    }

    /// A turn on the spot.
    pub fn rotation_only(rotational: f64) -> Self {
        Self {
            rotational,
            ..Self::ZERO
        }
    }

    /// Returns true if every component is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.forward == 0.0 && self.lateral == 0.0 && self.rotational == 0.0
    }
}

impl DriveRequest {
    /// The velocity carried by the request, regardless of frame.
    pub fn cmd(&self) -> &VelocityCmd {
        match self {
            DriveRequest::RobotCentric(c) => c,
            DriveRequest::FieldCentric(c) => c,
        }
    }

    /// Returns true if the request is a stop.
    pub fn is_stop(&self) -> bool {
        self.cmd().is_zero()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_zero() {
        assert!(VelocityCmd::ZERO.is_zero());
        assert!(VelocityCmd::default().is_zero());
        assert!(!VelocityCmd::rotation_only(0.1).is_zero());
        assert!(DriveRequest::FieldCentric(VelocityCmd::ZERO).is_stop());
        assert_eq!(
            DriveRequest::RobotCentric(VelocityCmd::new(0.5, 0.0, 0.1)).cmd().forward,
            0.5
        );
    }
}
