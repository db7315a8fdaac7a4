//! # Heading control module
//!
//! Heading control turns the robot on the spot to face, and keep facing, a fixed direction in the
//! field. A proportional controller acts on the heading error. Outside of a small deadband the
//! demanded rate is raised to a minimum, so that the robot always has enough authority to finish
//! the turn, and inside the deadband the robot stops turning.
//!
//! Heading control never finishes by itself, it holds the heading until cancelled.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod heading;
mod hold;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use heading::CanonicalHeading;
pub use hold::{HeadHold, HoldState};
pub use params::HeadCtrlParams;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Potential errors that can occur during heading control.
#[derive(Debug, thiserror::Error)]
pub enum HeadCtrlError {
    #[error(
        "Unknown heading name \"{0}\", expected one of forward, left, backward, right or operator"
    )]
    UnknownHeading(String),

    #[error("Invalid heading control parameter: {0}")]
    InvalidParams(String),

    #[error("Heading must be finite, found {0}")]
    NonFiniteHeading(f64),
}
