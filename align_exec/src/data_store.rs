//! # Data Store

use comms_if::tc::drive::VelocityCmd;

use crate::{align_ctrl::AlignStatusReport, drive_seq::SeqState};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Debug, Clone)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u64,

    /// True if this cycle falls on a 1Hz boundary
    pub is_1_hz_cycle: bool,

    /// Simulation elapsed time
    pub sim_time_s: f64,

    // Vision
    pub target_visible: bool,

    // Control outputs
    pub align_rpt: AlignStatusReport,
    pub last_cmd: VelocityCmd,
    pub seq_state: SeqState,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl Default for DataStore {
    fn default() -> Self {
        Self {
            num_cycles: 0,
            is_1_hz_cycle: false,
            sim_time_s: 0.0,
            target_visible: false,
            align_rpt: AlignStatusReport::default(),
            last_cmd: VelocityCmd::ZERO,
            seq_state: SeqState::Idle,
            num_consec_cycle_overruns: 0,
        }
    }
}

impl DataStore {
    /// Perform start of cycle actions.
    ///
    /// Clears the per-cycle data and advances the cycle counters.
    pub fn cycle_start(&mut self, cycle_frequency_hz: f64) {
        self.target_visible = false;
        self.last_cmd = VelocityCmd::ZERO;

        let cycles_per_second = cycle_frequency_hz.round().max(1.0) as u64;
        self.is_1_hz_cycle = self.num_cycles % cycles_per_second == 0;

        self.sim_time_s = self.num_cycles as f64 / cycle_frequency_hz;
        self.num_cycles += 1;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_cycle_start() {
        let mut ds = DataStore::default();

        ds.cycle_start(50.0);
        assert!(ds.is_1_hz_cycle);
        assert_eq!(ds.num_cycles, 1);

        for _ in 0..49 {
            ds.cycle_start(50.0);
            assert!(!ds.is_1_hz_cycle);
        }

        ds.cycle_start(50.0);
        assert!(ds.is_1_hz_cycle);
        assert!((ds.sim_time_s - 1.0).abs() < 1e-12);
    }
}
