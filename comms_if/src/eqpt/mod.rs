//! # Equipment Interface
//!
//! This module defines the interface structures which are exchanged with equipment through the
//! publication table.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod vision;
