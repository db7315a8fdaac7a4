//! # Geometry
//!
//! Pose of the robot relative to a fiducial, and the distance and bearing measurements derived
//! from it.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::{UnitQuaternion, Vector2, Vector3};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A 6 degree of freedom pose.
///
/// In this crate this is always the Robot Body (RB) frame expressed in a fiducial's frame, so
/// `position_m` is the robot's position with the fiducial at the origin.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose6 {
    /// Position in the target frame.
    ///
    /// Units: meters
    pub position_m: Vector3<f64>,

    /// Units: radians
    pub roll_rad: f64,

    /// Units: radians
    pub pitch_rad: f64,

    /// Units: radians
    pub yaw_rad: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Pose6 {
    pub fn new(x: f64, y: f64, z: f64, roll_rad: f64, pitch_rad: f64, yaw_rad: f64) -> Self {
        Self {
            position_m: Vector3::new(x, y, z),
            roll_rad,
            pitch_rad,
            yaw_rad,
        }
    }

    /// Build a pose from the sensor's `[x, y, z, roll, pitch, yaw]` array.
    pub fn from_array(a: &[f64; 6]) -> Self {
        Self::new(a[0], a[1], a[2], a[3], a[4], a[5])
    }

    /// Convert into the sensor's `[x, y, z, roll, pitch, yaw]` array.
    pub fn to_array(&self) -> [f64; 6] {
        [
            self.position_m.x,
            self.position_m.y,
            self.position_m.z,
            self.roll_rad,
            self.pitch_rad,
            self.yaw_rad,
        ]
    }

    /// Straight line distance to the origin.
    ///
    /// Units: meters
    pub fn distance(&self) -> f64 {
        self.position_m.norm()
    }

    /// Distance to the origin in the X/Y (floor) plane.
    ///
    /// Units: meters
    pub fn planar_distance(&self) -> f64 {
        Vector2::new(self.position_m.x, self.position_m.y).norm()
    }

    /// Signed angle of the position in the X/Y plane, measured from X+ towards Y+.
    ///
    /// Units: radians, in (-pi, pi]
    pub fn bearing(&self) -> f64 {
        self.position_m.y.atan2(self.position_m.x)
    }

    /// Attitude as a quaternion, built from the roll, pitch and yaw angles.
    pub fn attitude(&self) -> UnitQuaternion<f64> {
        UnitQuaternion::from_euler_angles(self.roll_rad, self.pitch_rad, self.yaw_rad)
    }

    /// Returns true if every component is finite.
    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_distances() {
        let p = Pose6::new(3.0, 4.0, 12.0, 0.0, 0.0, 0.0);

        assert!((p.distance() - 13.0).abs() < 1e-12);
        assert!((p.planar_distance() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_bearing() {
        assert_eq!(Pose6::new(2.0, 0.0, 0.0, 0.0, 0.0, 0.0).bearing(), 0.0);
        assert!((Pose6::new(0.0, 1.0, 0.0, 0.0, 0.0, 0.0).bearing() - FRAC_PI_2).abs() < 1e-12);
        assert!((Pose6::new(0.0, -1.0, 0.0, 0.0, 0.0, 0.0).bearing() + FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_array_and_attitude() {
        let a = [1.0, -0.5, 0.25, 0.0, 0.0, 0.3];
        let p = Pose6::from_array(&a);

        assert_eq!(p.to_array(), a);
        assert!((p.attitude().euler_angles().2 - 0.3).abs() < 1e-12);
        assert!(p.is_finite());
        assert!(!Pose6::new(f64::NAN, 0.0, 0.0, 0.0, 0.0, 0.0).is_finite());
    }
}
