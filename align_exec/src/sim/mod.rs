//! # Vision simulation
//!
//! The vision simulation synthesises the frames a fiducial camera would publish, so that the
//! control pipeline can be developed and tested without the sensor or robot attached. It keeps a
//! scene of marker-relative robot poses and republishes a complete frame into the table every
//! time the scene changes.
//!
//! The simulation must be attached to a table with [`VisionSim::init`] before use. Until then
//! every call does nothing.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod vehicle;

pub use params::SimParams;
pub use vehicle::SimVehicle;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::collections::BTreeMap;

use log::{debug, info, warn};

use crate::geom::Pose6;
use comms_if::{
    eqpt::vision::{FiducialRecord, VisionFrame},
    table::Table,
};
use util::session::get_elapsed_seconds;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Distance below which the simulated marker area stops growing.
const MIN_AREA_DISTANCE_M: f64 = 0.1;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Simulated fiducial camera.
#[derive(Debug)]
pub struct VisionSim {
    params: SimParams,

    /// The table frames are published into, `None` until initialised
    table: Option<Table>,

    /// Robot pose relative to each simulated marker
    scene: BTreeMap<i32, Pose6>,

    target_valid: bool,

    uninit_warned: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("Invalid simulation parameter: {0}")]
    InvalidParams(String),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl VisionSim {
    pub fn new(params: SimParams) -> Self {
        Self {
            params,
            table: None,
            scene: BTreeMap::new(),
            target_valid: false,
            uninit_warned: false,
        }
    }

    /// Attach the simulation to a table. Calling this more than once has no effect.
    pub fn init(&mut self, table: &Table) {
        if self.table.is_some() {
            debug!("VisionSim already initialised");
            return;
        }

        self.table = Some(table.clone());
        info!("VisionSim initialised, publishing as \"{}\"", self.params.sensor_name);
    }

    pub fn is_init(&self) -> bool {
        self.table.is_some()
    }

    /// Place the robot relative to a marker.
    ///
    /// Units: meters for the position, degrees for the yaw
    pub fn set_marker_pose(&mut self, id: i32, x: f64, y: f64, z: f64, yaw_deg: f64) {
        if !self.check_init() {
            return;
        }

        let pose = Pose6::new(x, y, z, 0.0, 0.0, yaw_deg.to_radians());
        if !pose.is_finite() {
            warn!("Ignoring non-finite simulated pose for marker {}: {:?}", id, pose);
            return;
        }

        self.scene.insert(id, pose);
        self.target_valid = true;
        self.publish();
    }

    /// Place the robot relative to a marker using a distance, a sideways offset and an angle.
    ///
    /// Units: meters for the distance and offset, degrees for the angle
    pub fn set_marker_pose_from_polar(
        &mut self,
        id: i32,
        distance_m: f64,
        lateral_offset_m: f64,
        angle_deg: f64,
    ) {
        let angle_rad = angle_deg.to_radians();
        let x = distance_m * angle_rad.cos();
        let y = distance_m * angle_rad.sin() + lateral_offset_m;

        self.set_marker_pose(id, x, y, 0.0, angle_deg)
    }

    /// Place the robot relative to several markers, given as `(id, distance, offset, angle)`.
    pub fn set_multiple_markers(&mut self, markers: &[(i32, f64, f64, f64)]) {
        for (id, distance_m, lateral_offset_m, angle_deg) in markers.iter() {
            self.set_marker_pose_from_polar(*id, *distance_m, *lateral_offset_m, *angle_deg);
        }
    }

    /// Stop reporting a target. The scene is kept and is reported again after the next pose is
    /// set.
    pub fn clear(&mut self) {
        if !self.check_init() {
            return;
        }

        self.target_valid = false;
        self.publish();
        info!("Cleared simulated vision targets");
    }

    /// Remove every marker from the scene.
    pub fn reset(&mut self) {
        if !self.check_init() {
            return;
        }

        self.scene.clear();
        self.target_valid = false;
        self.publish();
    }

    /// Simulate driving straight at a marker at a constant speed, stopping at the target
    /// distance.
    ///
    /// Returns the simulated distance, or `None` if not initialised.
    pub fn step_approach(
        &mut self,
        id: i32,
        start_distance_m: f64,
        target_distance_m: f64,
        speed_ms: f64,
        elapsed_s: f64,
    ) -> Option<f64> {
        if !self.check_init() {
            return None;
        }

        let current_distance_m = (start_distance_m - speed_ms * elapsed_s).max(target_distance_m);
        self.set_marker_pose_from_polar(id, current_distance_m, 0.0, 0.0);

        Some(current_distance_m)
    }

    /// Get the simulated pose relative to a marker.
    pub fn simulated_pose(&self, id: i32) -> Option<Pose6> {
        if !self.is_init() {
            return None;
        }

        self.scene.get(&id).copied()
    }

    /// Print the simulation's state at debug level.
    pub fn log_state(&self) {
        debug!("---- Simulated vision state ----");
        debug!("    Initialised: {}", self.is_init());
        debug!("    Target valid: {}", self.target_valid);
        for (id, pose) in self.scene.iter() {
            debug!(
                "    Marker {}: x = {:.3} m, y = {:.3} m, yaw = {:.1} deg",
                id,
                pose.position_m.x,
                pose.position_m.y,
                pose.yaw_rad.to_degrees()
            );
        }
    }

    // -----------------------------------------------------------------------
    // PRIVATE
    // -----------------------------------------------------------------------

    fn check_init(&mut self) -> bool {
        if self.is_init() {
            return true;
        }

        if !self.uninit_warned {
            warn!("VisionSim used before init, call ignored");
            self.uninit_warned = true;
        }

        false
    }

    fn record(&self, id: i32, pose: &Pose6) -> FiducialRecord {
        let distance_m = pose.distance().max(MIN_AREA_DISTANCE_M);

        FiducialRecord {
            id,
            robot_pose_target_space: pose.to_array(),
            tx: pose.bearing().to_degrees(),
            ty: pose.position_m.z.atan2(pose.planar_distance()).to_degrees(),
            ta: self.params.area_at_1m_pct / (distance_m * distance_m),
        }
    }

    fn publish(&self) {
        let table = match self.table {
            Some(ref t) => t,
            None => return,
        };

        let fiducials = if self.target_valid {
            self.scene.iter().map(|(id, pose)| self.record(*id, pose)).collect()
        }
        else {
            Vec::new()
        };

        // Raw per-marker arrays, `[id, x, y, z, roll, pitch, yaw]`
        let sensor = table.sub_table(&self.params.sensor_name);
        for (id, pose) in self.scene.iter() {
            let mut raw = vec![*id as f64];
            raw.extend_from_slice(&pose.to_array());
            sensor.put_number_array(&format!("Fiducial_{}", id), &raw);
        }

        let frame = VisionFrame {
            valid: self.target_valid,
            timestamp_s: get_elapsed_seconds(),
            fiducials,
        };

        if let Err(e) = frame.publish(table, &self.params.sensor_name) {
            warn!("Could not publish simulated vision frame: {}", e);
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::vision::{VisionMgr, VisionParams};

    fn setup() -> (Table, VisionSim, VisionMgr) {
        let table = Table::new();
        let mut sim = VisionSim::new(SimParams::default());
        sim.init(&table);
        let vision = VisionMgr::new(VisionParams::default(), &table).unwrap();

        (table, sim, vision)
    }

    #[test]
    fn test_polar_round_trip() {
        let (_table, mut sim, mut vision) = setup();

        sim.set_marker_pose_from_polar(2, 2.0, 0.0, 0.0);
        vision.update();

        assert!(vision.has_target());
        assert!((vision.distance_to(2).unwrap() - 2.0).abs() < 1e-9);
        assert!(vision.bearing_to(2).unwrap().abs() < 1e-9);

        // Off axis
        sim.set_marker_pose_from_polar(2, 2.0, 0.0, 30.0);
        vision.update();
        assert!((vision.horizontal_distance_to(2).unwrap() - 2.0).abs() < 1e-9);
        assert!((vision.bearing_to(2).unwrap() - 30f64.to_radians()).abs() < 1e-9);
        assert!((vision.raw_offsets().unwrap().0 - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_approach_converges() {
        let (_table, mut sim, mut vision) = setup();

        let mut last = f64::INFINITY;
        for k in 1..=20 {
            let d = sim.step_approach(2, 2.5, 1.5, 0.5, k as f64 * 0.1).unwrap();
            vision.update();

            let measured = vision.distance_to(2).unwrap();
            assert!((measured - d).abs() < 1e-9);
            assert!(measured <= last + 1e-12);
            assert!(measured >= 1.5 - 1e-12);
            last = measured;
        }

        assert!((last - 1.5).abs() < 1e-9);

        // Never overshoots however long it runs
        assert_eq!(sim.step_approach(2, 2.5, 1.5, 0.5, 100.0), Some(1.5));
    }

    #[test]
    fn test_multiple_markers_and_clear() {
        let (table, mut sim, mut vision) = setup();

        sim.set_multiple_markers(&[(1, 1.0, 0.0, 0.0), (2, 2.0, 0.5, 10.0), (3, 3.0, 0.0, -10.0)]);
        vision.update();
        assert_eq!(vision.detected_count(), 3);
        assert_eq!(table.get_number_array("limelight/Fiducial_1").unwrap()[1], 1.0);

        sim.clear();
        vision.update();
        assert!(!vision.has_target());
        assert_eq!(table.get_bool("limelight/tv"), Some(false));
        // The scene survives a clear
        assert!(sim.simulated_pose(2).is_some());

        sim.set_marker_pose(4, 1.0, 0.0, 0.0, 0.0);
        vision.update();
        assert_eq!(vision.detected_count(), 4);
        assert_eq!(table.get_bool("limelight/tv"), Some(true));

        sim.reset();
        vision.update();
        assert_eq!(vision.detected_count(), 0);
        assert!(sim.simulated_pose(2).is_none());
    }

    #[test]
    fn test_simulated_pose() {
        let (_table, mut sim, _vision) = setup();

        sim.set_marker_pose(5, 1.0, -0.5, 0.2, 90.0);
        let pose = sim.simulated_pose(5).unwrap();

        assert_eq!(pose.position_m.x, 1.0);
        assert_eq!(pose.position_m.y, -0.5);
        assert!((pose.yaw_rad - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert!(sim.simulated_pose(6).is_none());
    }

    #[test]
    fn test_uninit_is_noop() {
        let table = Table::new();
        let mut sim = VisionSim::new(SimParams::default());

        sim.set_marker_pose(2, 1.0, 0.0, 0.0, 0.0);
        sim.clear();
        assert_eq!(sim.step_approach(2, 2.5, 1.5, 0.5, 0.1), None);
        assert_eq!(sim.simulated_pose(2), None);
        assert!(table.keys().is_empty());

        // Init twice keeps the first table
        let other = Table::new();
        sim.init(&table);
        sim.init(&other);
        sim.set_marker_pose(2, 1.0, 0.0, 0.0, 0.0);
        assert!(table.contains("limelight/json"));
        assert!(!other.contains("limelight/json"));
    }
}
