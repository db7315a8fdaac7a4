//! # Vision manager
//!
//! The vision manager turns the raw frames published by the fiducial camera into per-marker
//! observations that the control modules can query. It is the only module which reads the
//! sensor's entries in the table.
//!
//! Frames are read once per cycle by [`VisionMgr::update`] and cached, so that every query made
//! in the same cycle sees the same frame. Observations are only valid for the cycle they were read
//! in: a marker which isn't in the latest frame is not visible, regardless of earlier frames.
//!
//! A missing or malformed frame is treated as the sensor being disconnected, which for control
//! purposes is the same as there being no target. The manager never commands actuators and never
//! blocks.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
pub use params::VisionParams;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, trace, warn};

use crate::geom::Pose6;
use comms_if::{
    eqpt::vision::{FiducialRecord, FrameReadError, VisionFrame},
    table::Table,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A single fiducial seen in the latest frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MarkerObservation {
    /// Identifier of the fiducial.
    pub id: i32,

    /// Pose of the robot in the fiducial's frame.
    pub pose: Pose6,

    /// Horizontal offset from the crosshair.
    ///
    /// Units: degrees
    pub tx_deg: f64,

    /// Vertical offset from the crosshair.
    ///
    /// Units: degrees
    pub ty_deg: f64,

    /// Area of the fiducial in the image.
    ///
    /// Units: percent of the image
    pub area_fraction: f64,
}

/// Provides per-cycle fiducial observations from the vision sensor.
#[derive(Debug, Clone)]
pub struct VisionMgr {
    params: VisionParams,

    /// Table the sensor publishes into
    table: Table,

    /// Table the manager's own telemetry goes into
    telem: Table,

    /// Observations from the latest frame, in frame order, at most one per id.
    observations: Vec<MarkerObservation>,

    connected: bool,

    frame_valid: bool,

    /// Set once a disconnection has been reported, cleared on reconnection
    disconnect_reported: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    #[error("The vision sensor name cannot be empty")]
    EmptySensorName,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MarkerObservation {
    fn from_record(record: &FiducialRecord) -> Self {
        Self {
            id: record.id,
            pose: Pose6::from_array(&record.robot_pose_target_space),
            tx_deg: record.tx,
            ty_deg: record.ty,
            area_fraction: record.ta,
        }
    }

    fn is_finite(&self) -> bool {
        self.pose.is_finite()
            && self.tx_deg.is_finite()
            && self.ty_deg.is_finite()
            && self.area_fraction.is_finite()
    }
}

impl VisionMgr {
    /// Create a new manager reading the sensor's frames from the table.
    ///
    /// Nothing is visible until the first call to `update`.
    pub fn new(params: VisionParams, table: &Table) -> Result<Self, VisionError> {
        params.validate()?;

        Ok(Self {
            telem: table.sub_table(&params.telem_table),
            table: table.clone(),
            params,
            observations: Vec::new(),
            connected: false,
            frame_valid: false,
            disconnect_reported: false,
        })
    }

    /// Read the latest frame from the sensor.
    ///
    /// Must be called once at the start of each cycle, before any query.
    pub fn update(&mut self) {
        self.observations.clear();
        self.frame_valid = false;

        match VisionFrame::read(&self.table, &self.params.sensor_name) {
            Ok(frame) => {
                if !self.connected {
                    debug!("Vision sensor \"{}\" connected", self.params.sensor_name);
                }
                self.connected = true;
                self.disconnect_reported = false;
                self.load_frame(&frame);
            }
            Err(e) => {
                if !self.disconnect_reported {
                    match &e {
                        // Not having heard from the sensor yet isn't unusual at startup
                        FrameReadError::Missing(_) if !self.connected => debug!("{}", e),
                        _ => warn!("Vision sensor unavailable: {}", e),
                    }
                    self.disconnect_reported = true;
                }
                self.connected = false;
            }
        }

        self.publish();
    }

    /// True if the sensor produced a readable frame this cycle.
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// True if at least one marker was detected this cycle.
    pub fn has_target(&self) -> bool {
        self.frame_valid && !self.observations.is_empty()
    }

    /// Number of distinct markers detected this cycle.
    pub fn detected_count(&self) -> usize {
        self.observations.len()
    }

    /// Iterate over the markers detected this cycle.
    pub fn visible_markers(&self) -> impl Iterator<Item = &MarkerObservation> {
        self.observations.iter()
    }

    /// Get the observation of the given marker, if it was detected this cycle.
    pub fn observation(&self, id: i32) -> Option<&MarkerObservation> {
        self.observations.iter().find(|o| o.id == id)
    }

    pub fn is_visible(&self, id: i32) -> bool {
        self.observation(id).is_some()
    }

    /// Pose of the robot relative to the given marker.
    pub fn pose_relative_to(&self, id: i32) -> Option<Pose6> {
        self.observation(id).map(|o| o.pose)
    }

    /// Straight line distance to the given marker.
    ///
    /// Units: meters
    pub fn distance_to(&self, id: i32) -> Option<f64> {
        self.observation(id).map(|o| o.pose.distance())
    }

    /// Distance to the given marker along the floor.
    ///
    /// Units: meters
    pub fn horizontal_distance_to(&self, id: i32) -> Option<f64> {
        self.observation(id).map(|o| o.pose.planar_distance())
    }

    /// Signed bearing of the robot from the given marker.
    ///
    /// Units: radians
    pub fn bearing_to(&self, id: i32) -> Option<f64> {
        self.observation(id).map(|o| o.pose.bearing())
    }

    /// Crosshair offsets `(tx, ty, ta)` of the first marker in the frame.
    pub fn raw_offsets(&self) -> Option<(f64, f64, f64)> {
        self.observations
            .first()
            .map(|o| (o.tx_deg, o.ty_deg, o.area_fraction))
    }

    // -----------------------------------------------------------------------
    // PRIVATE
    // -----------------------------------------------------------------------

    fn load_frame(&mut self, frame: &VisionFrame) {
        self.frame_valid = frame.valid;

        if !frame.valid {
            return;
        }

        for record in frame.fiducials.iter() {
            let obs = MarkerObservation::from_record(record);

            if !obs.is_finite() {
                warn!("Dropping non-finite observation of marker {}", obs.id);
                continue;
            }

            if self.is_visible(obs.id) {
                warn!("Marker {} reported more than once in a frame, keeping the first", obs.id);
                continue;
            }

            self.observations.push(obs);
        }

        trace!(
            "Vision frame at {:.3} s: {} marker(s)",
            frame.timestamp_s,
            self.observations.len()
        );
    }

    fn publish(&self) {
        self.telem.put_bool("Connected", self.connected);
        self.telem.put_bool("Has Target", self.has_target());
        self.telem.put_number("Fiducials Detected", self.detected_count() as f64);
        self.telem.put_number(
            "First Tag ID",
            self.observations.first().map(|o| o.id as f64).unwrap_or(-1.0),
        );
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn record(id: i32, pose: [f64; 6]) -> FiducialRecord {
        FiducialRecord {
            id,
            robot_pose_target_space: pose,
            tx: 1.0,
            ty: -2.0,
            ta: 0.5,
        }
    }

    fn publish(table: &Table, valid: bool, fiducials: Vec<FiducialRecord>) {
        VisionFrame {
            valid,
            timestamp_s: 0.0,
            fiducials,
        }
        .publish(table, "limelight")
        .unwrap();
    }

    #[test]
    fn test_disconnected_before_first_frame() {
        let table = Table::new();
        let mut vision = VisionMgr::new(VisionParams::default(), &table).unwrap();

        vision.update();

        assert!(!vision.is_connected());
        assert!(!vision.has_target());
        assert_eq!(vision.visible_markers().count(), 0);
        assert_eq!(vision.distance_to(2), None);
        assert_eq!(table.get_bool("Vision/Connected"), Some(false));
    }

    #[test]
    fn test_queries() {
        let table = Table::new();
        let mut vision = VisionMgr::new(VisionParams::default(), &table).unwrap();

        publish(
            &table,
            true,
            vec![
                record(2, [3.0, 4.0, 12.0, 0.0, 0.0, 0.1]),
                record(5, [1.0, 1.0, 0.0, 0.0, 0.0, 0.0]),
            ],
        );
        vision.update();

        assert!(vision.is_connected());
        assert!(vision.has_target());
        assert_eq!(vision.detected_count(), 2);
        assert!(vision.is_visible(5));
        assert!(!vision.is_visible(3));

        assert!((vision.distance_to(2).unwrap() - 13.0).abs() < 1e-12);
        assert!((vision.horizontal_distance_to(2).unwrap() - 5.0).abs() < 1e-12);
        assert!((vision.bearing_to(5).unwrap() - std::f64::consts::FRAC_PI_4).abs() < 1e-12);
        assert_eq!(vision.pose_relative_to(2).unwrap().yaw_rad, 0.1);
        assert_eq!(vision.raw_offsets(), Some((1.0, -2.0, 0.5)));

        assert_eq!(table.get_number("Vision/Fiducials Detected"), Some(2.0));
        assert_eq!(table.get_number("Vision/First Tag ID"), Some(2.0));
    }

    #[test]
    fn test_observations_only_last_one_cycle() {
        let table = Table::new();
        let mut vision = VisionMgr::new(VisionParams::default(), &table).unwrap();

        publish(&table, true, vec![record(2, [1.5, 0.0, 0.0, 0.0, 0.0, 0.0])]);
        vision.update();
        assert!(vision.is_visible(2));

        publish(&table, true, vec![]);
        vision.update();
        assert!(vision.is_connected());
        assert!(!vision.is_visible(2));
        assert!(!vision.has_target());

        // Invalid frames carry no targets even if they list fiducials
        publish(&table, false, vec![record(2, [1.5, 0.0, 0.0, 0.0, 0.0, 0.0])]);
        vision.update();
        assert!(!vision.is_visible(2));
    }

    #[test]
    fn test_duplicates_keep_first() {
        let table = Table::new();
        let mut vision = VisionMgr::new(VisionParams::default(), &table).unwrap();

        publish(
            &table,
            true,
            vec![
                record(2, [1.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
                record(2, [9.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
            ],
        );
        vision.update();

        assert_eq!(vision.detected_count(), 1);
        assert_eq!(vision.distance_to(2), Some(1.0));
    }

    #[test]
    fn test_malformed_frame_is_disconnected() {
        let table = Table::new();
        let mut vision = VisionMgr::new(VisionParams::default(), &table).unwrap();

        publish(&table, true, vec![record(2, [1.0, 0.0, 0.0, 0.0, 0.0, 0.0])]);
        vision.update();
        assert!(vision.is_connected());

        table.put_string("limelight/json", "not json");
        vision.update();
        assert!(!vision.is_connected());
        assert!(!vision.has_target());
        assert!(!vision.is_visible(2));
    }

    #[test]
    fn test_empty_sensor_name_rejected() {
        let params = VisionParams {
            sensor_name: String::from("  "),
            ..Default::default()
        };

        assert!(matches!(
            VisionMgr::new(params, &Table::new()),
            Err(VisionError::EmptySensorName)
        ));
    }
}
