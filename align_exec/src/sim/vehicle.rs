//! Simulated vehicle
//!
//! A purely kinematic robot used to close the loop in simulation. It tracks the robot's distance
//! and bearing from a single marker plus its own field heading, integrates the latest drive
//! request over each step, and republishes the result through the vision simulation. There is no
//! momentum and no actuator lag, requests take effect immediately.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;

use super::VisionSim;
use crate::vehicle::{MotionInterface, PoseSource};
use comms_if::tc::drive::{DriveRequest, VelocityCmd};
use util::maths::normalise_angle;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct SimVehicle {
    sim: VisionSim,

    marker_id: i32,

    /// Units: meters
    distance_m: f64,

    /// Units: meters
    lateral_offset_m: f64,

    /// Bearing of the robot from the marker
    ///
    /// Units: radians
    bearing_rad: f64,

    /// Heading of the robot in the field
    ///
    /// Units: radians
    heading_rad: f64,

    /// If false the vehicle is hidden from the camera
    marker_in_view: bool,

    /// Most recent request, held until replaced
    current: VelocityCmd,

    num_requests: usize,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimVehicle {
    /// Create a vehicle placed relative to a marker, publishing through the given (initialised)
    /// simulation.
    pub fn new(sim: VisionSim, marker_id: i32, distance_m: f64, bearing_rad: f64) -> Self {
        let mut v = Self {
            sim,
            marker_id,
            distance_m,
            lateral_offset_m: 0.0,
            bearing_rad: normalise_angle(bearing_rad),
            heading_rad: 0.0,
            marker_in_view: true,
            current: VelocityCmd::ZERO,
            num_requests: 0,
        };
        v.publish();
        v
    }

    /// Set the robot's initial field heading.
    pub fn with_heading(mut self, heading_rad: f64) -> Self {
        self.heading_rad = normalise_angle(heading_rad);
        self
    }

    /// Integrate the current request over `dt_s` seconds and republish the scene.
    pub fn advance(&mut self, dt_s: f64) {
        let c = self.current;

        self.distance_m = (self.distance_m - c.forward * dt_s).max(0.0);
        self.lateral_offset_m += c.lateral * dt_s;
        self.bearing_rad = normalise_angle(self.bearing_rad + c.rotational * dt_s);
        self.heading_rad = normalise_angle(self.heading_rad + c.rotational * dt_s);

        trace!(
            "SimVehicle: d = {:.3} m, b = {:.3} rad, h = {:.3} rad",
            self.distance_m,
            self.bearing_rad,
            self.heading_rad
        );

        self.publish();
    }

    /// Hide the marker from (or show it to) the simulated camera.
    pub fn set_marker_in_view(&mut self, in_view: bool) {
        self.marker_in_view = in_view;
        self.publish();
    }

    pub fn distance_m(&self) -> f64 {
        self.distance_m
    }

    pub fn bearing_rad(&self) -> f64 {
        self.bearing_rad
    }

    /// The velocity currently being applied.
    pub fn current_cmd(&self) -> VelocityCmd {
        self.current
    }

    /// Number of drive requests received.
    pub fn num_requests(&self) -> usize {
        self.num_requests
    }

    pub fn sim(&self) -> &VisionSim {
        &self.sim
    }

    fn publish(&mut self) {
        if self.marker_in_view {
            self.sim.set_marker_pose_from_polar(
                self.marker_id,
                self.distance_m,
                self.lateral_offset_m,
                self.bearing_rad.to_degrees(),
            );
        }
        else {
            self.sim.clear();
        }
    }
}

impl MotionInterface for SimVehicle {
    fn set_control(&mut self, request: DriveRequest) {
        self.current = *request.cmd();
        self.num_requests += 1;
    }
}

impl PoseSource for SimVehicle {
    fn heading_rad(&self) -> f64 {
        self.heading_rad
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::sim::SimParams;
    use crate::vision::{VisionMgr, VisionParams};
    use comms_if::table::Table;

    #[test]
    fn test_integration() {
        let table = Table::new();
        let mut sim = VisionSim::new(SimParams::default());
        sim.init(&table);
        let mut vision = VisionMgr::new(VisionParams::default(), &table).unwrap();

        let mut v = SimVehicle::new(sim, 2, 2.0, 0.0);
        vision.update();
        assert!((vision.distance_to(2).unwrap() - 2.0).abs() < 1e-9);

        v.set_control(DriveRequest::RobotCentric(VelocityCmd::new(1.0, 0.0, 0.5)));
        v.advance(0.1);
        vision.update();

        assert!((vision.horizontal_distance_to(2).unwrap() - 1.9).abs() < 1e-9);
        assert!((vision.bearing_to(2).unwrap() - 0.05).abs() < 1e-9);
        assert!((v.heading_rad() - 0.05).abs() < 1e-12);
        assert_eq!(v.num_requests(), 1);

        // Never drives through the marker
        v.advance(10.0);
        assert_eq!(v.distance_m(), 0.0);
    }

    #[test]
    fn test_marker_out_of_view() {
        let table = Table::new();
        let mut sim = VisionSim::new(SimParams::default());
        sim.init(&table);
        let mut vision = VisionMgr::new(VisionParams::default(), &table).unwrap();

        let mut v = SimVehicle::new(sim, 2, 2.0, 0.0);
        v.set_marker_in_view(false);
        vision.update();
        assert!(!vision.is_visible(2));

        v.set_marker_in_view(true);
        vision.update();
        assert!(vision.is_visible(2));
    }
}
