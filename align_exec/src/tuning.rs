//! # Operator tuning surface
//!
//! Publishes the alignment controller's gains into the table so that an operator can edit them
//! while the robot is running. Edits are copied back into the shared [`ControlGains`] on every
//! call to [`Tuning::update`], taking effect on the controller's next tick.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::sync::Arc;

use log::{debug, info};

use crate::align_ctrl::ControlGains;
use comms_if::table::Table;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Table the tunable values live under.
pub const TUNING_TABLE: &str = "Tuning/Align";

const DISTANCE_GAIN_KEY: &str = "Distance Gain";
const ANGLE_GAIN_KEY: &str = "Angle Gain";
const INIT_KEY: &str = "Initialized";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

pub struct Tuning {
    table: Table,
    gains: Arc<ControlGains>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Tuning {
    pub fn new(table: &Table, gains: Arc<ControlGains>) -> Self {
        Self {
            table: table.sub_table(TUNING_TABLE),
            gains,
        }
    }

    /// Publish the current gains as the starting values for the operator.
    pub fn init(&self) {
        self.table.put_number(DISTANCE_GAIN_KEY, self.gains.distance());
        self.table.put_number(ANGLE_GAIN_KEY, self.gains.angle());
        self.table.put_bool(INIT_KEY, true);

        info!(
            "Tuning initialised under \"{}\" (distance gain {}, angle gain {})",
            TUNING_TABLE,
            self.gains.distance(),
            self.gains.angle()
        );
    }

    /// Copy the operator's values into the controller's gains.
    ///
    /// Missing or non-numeric entries leave the gain unchanged.
    pub fn update(&self) {
        let distance = self.table.get_number_or(DISTANCE_GAIN_KEY, self.gains.distance());
        let angle = self.table.get_number_or(ANGLE_GAIN_KEY, self.gains.angle());

        if distance != self.gains.distance() || angle != self.gains.angle() {
            debug!("Tuning: gains set to distance {}, angle {}", distance, angle);
        }

        self.gains.set_distance(distance);
        self.gains.set_angle(angle);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::align_ctrl::{AlignCtrl, AlignCtrlParams};

    #[test]
    fn test_round_trip() {
        let table = Table::new();
        let ctrl = AlignCtrl::new(AlignCtrlParams::default()).unwrap();
        let tuning = Tuning::new(&table, ctrl.gains());

        tuning.init();
        assert_eq!(table.get_number("Tuning/Align/Distance Gain"), Some(2.0));
        assert_eq!(table.get_number("Tuning/Align/Angle Gain"), Some(0.8));
        assert_eq!(table.get_bool("Tuning/Align/Initialized"), Some(true));

        // Operator edit
        table.put_number("Tuning/Align/Distance Gain", 1.2);
        tuning.update();

        assert_eq!(ctrl.gains().distance(), 1.2);
        assert_eq!(ctrl.gains().angle(), 0.8);

        // Garbage keeps the previous value
        table.put_string("Tuning/Align/Angle Gain", "fast");
        tuning.update();
        assert_eq!(ctrl.gains().angle(), 0.8);
    }
}
