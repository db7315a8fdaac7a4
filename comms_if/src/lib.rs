//! # Communications interface crate.
//!
//! Provides all common communications interfaces for the software: the shared publication table,
//! the sensor frame schema and the motion requests sent to the vehicle.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod tc;

/// Frame definitions for equipment (like the vision sensor)
pub mod eqpt;

/// Shared key/value publication table
pub mod table;
