//! # Vehicle interfaces
//!
//! The boundary between the control modules and the physical (or simulated) robot. Anything
//! which can accept drive requests and report its heading can be driven by the sequencers.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::tc::drive::DriveRequest;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Accepts velocity requests for the robot's base.
///
/// Implementors must accept repeated stop requests.
pub trait MotionInterface {
    fn set_control(&mut self, request: DriveRequest);
}

/// Reports the robot's own pose in the field.
pub trait PoseSource {
    /// Heading of the robot in the field frame.
    ///
    /// Units: radians
    fn heading_rad(&self) -> f64;
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

/// Record every request, used for tests and offline replay.
impl MotionInterface for Vec<DriveRequest> {
    fn set_control(&mut self, request: DriveRequest) {
        self.push(request)
    }
}

/// A fixed heading.
impl PoseSource for f64 {
    fn heading_rad(&self) -> f64 {
        *self
    }
}
