//! # Drive sequence module
//!
//! The drive sequence runs alignment control against the robot. Each step it ticks the alignment
//! controller with the latest observation of the target marker, scales the normalised command into
//! physical speeds and sends it to the vehicle as a robot-centric request.
//!
//! The sequence ends when the robot is aligned (`Completed(Aligned)`), when the target is no longer
//! visible (`Interrupted(TargetLost)`), or when it is cancelled (`Interrupted(Cancelled)`). Every
//! exit sends a stop request to the vehicle before leaving the running state.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use params::DriveSeqParams;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// State of a drive sequence.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SeqState {
    /// Not yet started
    Idle,

    Running,

    /// Finished having reached its goal
    Completed(EndReason),

    /// Finished early
    Interrupted(EndReason),
}

/// Why a sequence left the running state.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EndReason {
    Aligned,
    TargetLost,
    Cancelled,
}

/// Potential errors that can occur in the drive sequence.
#[derive(Debug, thiserror::Error)]
pub enum DriveSeqError {
    #[error("Invalid drive sequence parameter: {0}")]
    InvalidParams(String),
}

impl SeqState {
    /// True once the sequence has completed or been interrupted.
    pub fn is_finished(&self) -> bool {
        matches!(self, SeqState::Completed(_) | SeqState::Interrupted(_))
    }
}
