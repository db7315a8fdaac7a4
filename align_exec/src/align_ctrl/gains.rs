//! Runtime adjustable controller gains

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::sync::atomic::{AtomicU64, Ordering};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The alignment controller's gains.
///
/// Shared behind an `Arc` between the controller, which reads them once per tick, and the tuning
/// surface, which may change them at any time. Each gain is stored as the bits of an `f64` in an
/// atomic, the last write wins and takes effect on the controller's next tick.
#[derive(Debug)]
pub struct ControlGains {
    distance: AtomicU64,
    angle: AtomicU64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ControlGains {
    pub fn new(distance: f64, angle: f64) -> Self {
        Self {
            distance: AtomicU64::new(distance.to_bits()),
            angle: AtomicU64::new(angle.to_bits()),
        }
    }

    /// Proportional gain on the distance error.
    pub fn distance(&self) -> f64 {
        f64::from_bits(self.distance.load(Ordering::Relaxed))
    }

    /// Proportional gain on the angle error.
    pub fn angle(&self) -> f64 {
        f64::from_bits(self.angle.load(Ordering::Relaxed))
    }

    /// Set the distance gain. The value is not validated.
    pub fn set_distance(&self, gain: f64) {
        self.distance.store(gain.to_bits(), Ordering::Relaxed)
    }

    /// Set the angle gain. The value is not validated.
    pub fn set_angle(&self, gain: f64) {
        self.angle.store(gain.to_bits(), Ordering::Relaxed)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_shared_gains() {
        let gains = Arc::new(ControlGains::new(2.0, 0.8));
        let writer = gains.clone();

        assert_eq!(gains.distance(), 2.0);
        assert_eq!(gains.angle(), 0.8);

        std::thread::spawn(move || {
            writer.set_distance(1.25);
            writer.set_angle(-0.5);
        })
        .join()
        .unwrap();

        assert_eq!(gains.distance(), 1.25);
        assert_eq!(gains.angle(), -0.5);
    }
}
