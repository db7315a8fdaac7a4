//! # Telecommand module
//!
//! Commands sent from the control modules to the vehicle's motion interface.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod drive;
