//! # Vision Equipment Communications Module
//!
//! Defines the frame a fiducial detecting camera publishes into the table each time it processes
//! an image.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::table::Table;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Key (below the sensor's name) of the serialised frame.
pub const FRAME_KEY: &str = "json";

/// Key (below the sensor's name) of the "target valid" flag.
pub const TARGET_VALID_KEY: &str = "tv";

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A single processed camera frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisionFrame {
    /// True if the sensor considers this frame to contain valid detections.
    pub valid: bool,

    /// Time at which the frame was captured.
    ///
    /// Units: seconds since the sensor's epoch
    #[serde(default)]
    pub timestamp_s: f64,

    /// All fiducials detected in the frame.
    #[serde(default)]
    pub fiducials: Vec<FiducialRecord>,
}

/// A single fiducial detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiducialRecord {
    /// Identifier encoded in the fiducial.
    pub id: i32,

    /// Pose of the robot in the fiducial's coordinate frame.
    ///
    /// Stored as `[x, y, z, roll, pitch, yaw]`.
    ///
    /// Units: meters for the translation, radians for the rotation
    pub robot_pose_target_space: [f64; 6],

    /// Horizontal offset of the fiducial from the crosshair.
    ///
    /// Units: degrees
    #[serde(default)]
    pub tx: f64,

    /// Vertical offset of the fiducial from the crosshair.
    ///
    /// Units: degrees
    #[serde(default)]
    pub ty: f64,

    /// Area of the fiducial in the image.
    ///
    /// Units: percent of the image
    #[serde(default)]
    pub ta: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors which can occur while reading a frame from the table.
#[derive(Debug, Error)]
pub enum FrameReadError {
    #[error("No frame has been published for sensor {0:?}")]
    Missing(String),

    #[error("The frame published for sensor {0:?} is not valid JSON: {1}")]
    Malformed(String, serde_json::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl VisionFrame {
    /// Publish this frame, and its target valid flag, under the sensor's name.
    pub fn publish(&self, table: &Table, sensor_name: &str) -> Result<(), serde_json::Error> {
        let json = serde_json::to_string(self)?;

        let sensor = table.sub_table(sensor_name);
        sensor.put_string(FRAME_KEY, json);
        sensor.put_bool(TARGET_VALID_KEY, self.valid);

        Ok(())
    }

    /// Read the latest frame published under the sensor's name.
    pub fn read(table: &Table, sensor_name: &str) -> Result<Self, FrameReadError> {
        let json = table
            .sub_table(sensor_name)
            .get_string(FRAME_KEY)
            .ok_or_else(|| FrameReadError::Missing(sensor_name.to_string()))?;

        serde_json::from_str(&json)
            .map_err(|e| FrameReadError::Malformed(sensor_name.to_string(), e))
    }

}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_publish_read() {
        let table = Table::new();

        let frame = VisionFrame {
            valid: true,
            timestamp_s: 1.25,
            fiducials: vec![FiducialRecord {
                id: 2,
                robot_pose_target_space: [1.5, 0.1, 0.0, 0.0, 0.0, 0.2],
                tx: 3.8,
                ty: 0.0,
                ta: 0.9,
            }],
        };

        frame.publish(&table, "limelight").unwrap();

        assert_eq!(table.get_bool("limelight/tv"), Some(true));
        assert_eq!(VisionFrame::read(&table, "limelight").unwrap(), frame);
    }

    #[test]
    fn test_read_errors() {
        let table = Table::new();

        assert!(matches!(
            VisionFrame::read(&table, "limelight"),
            Err(FrameReadError::Missing(_))
        ));

        // Pose arrays must carry all six components
        table.put_string(
            "limelight/json",
            r#"{"valid":true,"fiducials":[{"id":2,"robot_pose_target_space":[1.0,2.0]}]}"#,
        );
        assert!(matches!(
            VisionFrame::read(&table, "limelight"),
            Err(FrameReadError::Malformed(_, _))
        ));
    }

    #[test]
    fn test_optional_fields_default() {
        let table = Table::new();
        table.put_string(
            "cam/json",
            r#"{"valid":true,"fiducials":[{"id":7,"robot_pose_target_space":[1,2,3,0,0,0]}]}"#,
        );

        let frame = VisionFrame::read(&table, "cam").unwrap();
        assert_eq!(frame.timestamp_s, 0.0);
        assert_eq!(frame.fiducials[0].id, 7);
        assert_eq!(frame.fiducials[0].ta, 0.0);
    }
}
