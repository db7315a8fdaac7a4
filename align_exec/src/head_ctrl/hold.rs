//! Heading hold sequence
//!
//! Wraps a [`HeadCtrl`] in a start/step/cancel lifecycle which sends its demands to the vehicle as
//! field-centric requests.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::info;

use super::HeadCtrl;
use crate::vehicle::{MotionInterface, PoseSource};
use comms_if::tc::drive::{DriveRequest, VelocityCmd};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct HeadHold {
    ctrl: HeadCtrl,
    state: HoldState,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum HoldState {
    Idle,
    Running,
    Cancelled,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl HeadHold {
    pub fn new(ctrl: HeadCtrl) -> Self {
        Self {
            ctrl,
            state: HoldState::Idle,
        }
    }

    pub fn start(&mut self) {
        if self.state != HoldState::Running {
            info!("Holding heading {:.1} deg", self.ctrl.target_rad().to_degrees());
            self.state = HoldState::Running;
        }
    }

    /// Run one tick of the hold. Does nothing unless running.
    pub fn step<P, M>(&mut self, pose: &P, vehicle: &mut M)
    where
        P: PoseSource,
        M: MotionInterface,
    {
        if self.state != HoldState::Running {
            return;
        }

        let cmd = self.ctrl.tick(pose.heading_rad());
        vehicle.set_control(DriveRequest::FieldCentric(cmd));
    }

    /// Stop holding, commanding the vehicle to stop turning.
    pub fn cancel<M: MotionInterface>(&mut self, vehicle: &mut M) {
        if self.state == HoldState::Running {
            vehicle.set_control(DriveRequest::FieldCentric(VelocityCmd::ZERO));
            self.state = HoldState::Cancelled;
            info!("Heading hold cancelled");
        }
    }

    pub fn state(&self) -> HoldState {
        self.state
    }

    pub fn ctrl(&self) -> &HeadCtrl {
        &self.ctrl
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::head_ctrl::{CanonicalHeading, HeadCtrlParams};

    #[test]
    fn test_lifecycle() {
        let ctrl = HeadCtrl::facing(HeadCtrlParams::default(), CanonicalHeading::Left).unwrap();
        let mut hold = HeadHold::new(ctrl);
        let mut sent: Vec<DriveRequest> = Vec::new();

        // Nothing before start
        hold.step(&0.0, &mut sent);
        assert!(sent.is_empty());

        hold.start();
        hold.step(&0.0, &mut sent);
        assert_eq!(sent.len(), 1);
        match sent[0] {
            DriveRequest::FieldCentric(c) => assert!(c.rotational > 0.0),
            r => panic!("expected a field centric request, got {:?}", r),
        }

        hold.cancel(&mut sent);
        assert_eq!(hold.state(), HoldState::Cancelled);
        assert_eq!(sent.last(), Some(&DriveRequest::FieldCentric(VelocityCmd::ZERO)));

        // Cancelled holds stay quiet
        hold.step(&0.0, &mut sent);
        hold.cancel(&mut sent);
        assert_eq!(sent.len(), 2);
    }
}
