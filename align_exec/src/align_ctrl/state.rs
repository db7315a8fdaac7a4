//! Alignment control module state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::sync::Arc;
use log::{debug, trace, warn};
use serde::Serialize;

// Internal
use super::{AlignCtrlError, AlignCtrlParams, ControlGains, TargetSpec};
use crate::vision::MarkerObservation;
use comms_if::{table::Table, tc::drive::VelocityCmd};
use util::{
    maths::{clamp, normalise_angle},
    module::State,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Alignment control module state
#[derive(Debug)]
pub struct AlignCtrl {
    params: AlignCtrlParams,

    gains: Arc<ControlGains>,

    /// Table to publish telemetry into, if any
    telem: Option<Table>,

    last_cmd: VelocityCmd,
    last_error: Option<AlignError>,
    report: AlignStatusReport,
}

/// Errors between the robot's current and desired position relative to the marker.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct AlignError {
    /// Current distance minus desired distance, positive when too far away.
    ///
    /// Units: meters
    pub distance_error_m: f64,

    /// Current bearing minus desired bearing.
    ///
    /// Units: radians, in (-pi, pi]
    pub angle_error_rad: f64,
}

/// Status report for alignment control processing.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize)]
pub struct AlignStatusReport {
    /// True if the target marker was observed this tick
    pub target_visible: bool,

    /// Units: meters
    pub current_distance_m: f64,

    /// Units: radians
    pub current_angle_rad: f64,

    /// Units: meters
    pub distance_error_m: f64,

    /// Units: radians
    pub angle_error_rad: f64,

    /// Normalised forward demand
    pub forward: f64,

    /// Normalised rotational demand
    pub rotational: f64,

    /// True if the forward demand was damped due to a large angle error
    pub forward_damped: bool,

    /// True if the forward demand hit the saturation limit
    pub forward_saturated: bool,

    /// True if the rotational demand hit the saturation limit
    pub rotational_saturated: bool,

    /// True if both errors are within tolerance
    pub aligned: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for AlignCtrl {
    type InputData = Option<MarkerObservation>;
    type OutputData = VelocityCmd;
    type StatusReport = AlignStatusReport;
    type ProcError = AlignCtrlError;

    /// Perform cyclic processing of alignment control.
    ///
    /// `None` means the target marker was not seen this cycle, which results in a zero command.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        // Clear the previous cycle, anything not computed this cycle is absent
        self.last_cmd = VelocityCmd::ZERO;
        self.last_error = None;
        self.report = AlignStatusReport::default();

        let obs = match input_data {
            Some(o) => o,
            None => {
                trace!("Alignment target {} not visible", self.params.target.marker_id);
                self.publish();
                return Ok((self.last_cmd, self.report));
            }
        };

        if obs.id != self.params.target.marker_id {
            self.publish();
            return Err(AlignCtrlError::WrongMarker {
                expected: self.params.target.marker_id,
                found: obs.id,
            });
        }

        let target = &self.params.target;

        // ---- ERRORS ----

        let current_distance_m = obs.pose.planar_distance();
        let current_angle_rad = obs.pose.bearing();

        let error = AlignError {
            distance_error_m: current_distance_m - target.desired_distance_m,
            angle_error_rad: normalise_angle(current_angle_rad - target.desired_angle_rad),
        };

        let aligned = error.distance_error_m.abs() <= target.distance_tolerance_m
            && error.angle_error_rad.abs() <= target.angle_tolerance_rad;

        self.report.target_visible = true;
        self.report.current_distance_m = current_distance_m;
        self.report.current_angle_rad = current_angle_rad;
        self.report.distance_error_m = error.distance_error_m;
        self.report.angle_error_rad = error.angle_error_rad;
        self.report.aligned = aligned;
        self.last_error = Some(error);

        // ---- DEMANDS ----

        // Once aligned hold position
        if !aligned {
            let max = self.params.max_output;

            let forward_raw = self.gains.distance() * error.distance_error_m;
            let mut forward = clamp(forward_raw, -max, max);
            self.report.forward_saturated = forward != forward_raw;

            // Turn to face the marker before closing the distance
            if error.angle_error_rad.abs() > self.params.misalign_threshold_rad {
                forward *= self.params.misalign_forward_scale;
                self.report.forward_damped = true;
            }

            let rotational_raw = -self.gains.angle() * error.angle_error_rad;
            let rotational = clamp(rotational_raw, -max, max);
            self.report.rotational_saturated = rotational != rotational_raw;

            self.last_cmd = VelocityCmd::new(forward, 0.0, rotational);
        }

        self.report.forward = self.last_cmd.forward;
        self.report.rotational = self.last_cmd.rotational;

        trace!(
            "AlignCtrl: err = ({:.3} m, {:.3} rad), cmd = ({:.3}, {:.3})",
            error.distance_error_m,
            error.angle_error_rad,
            self.last_cmd.forward,
            self.last_cmd.rotational
        );

        self.publish();

        Ok((self.last_cmd, self.report))
    }
}

impl AlignCtrl {
    /// Create a new controller with its own gains, initialised from the parameters.
    pub fn new(params: AlignCtrlParams) -> Result<Self, AlignCtrlError> {
        let gains = Arc::new(ControlGains::new(params.distance_gain, params.angle_gain));
        Self::with_gains(params, gains)
    }

    /// Create a new controller using gains shared with another owner (usually the tuning
    /// surface). The gains in the parameters are ignored.
    pub fn with_gains(
        params: AlignCtrlParams,
        gains: Arc<ControlGains>,
    ) -> Result<Self, AlignCtrlError> {
        params.validate()?;

        debug!(
            "AlignCtrl targeting marker {} at {:.3} m, {:.3} rad",
            params.target.marker_id,
            params.target.desired_distance_m,
            params.target.desired_angle_rad
        );

        Ok(Self {
            params,
            gains,
            telem: None,
            last_cmd: VelocityCmd::ZERO,
            last_error: None,
            report: AlignStatusReport::default(),
        })
    }

    /// Publish telemetry into the given table on every tick.
    pub fn with_telemetry(mut self, table: &Table) -> Self {
        self.telem = Some(table.sub_table(&self.params.telem_table));
        self
    }

    /// Compute the normalised velocity command for this tick.
    ///
    /// An observation of a marker other than the target is treated as the target being absent.
    pub fn tick(&mut self, obs: Option<&MarkerObservation>) -> VelocityCmd {
        match self.proc(&obs.copied()) {
            Ok((cmd, _)) => cmd,
            Err(e) => {
                warn!("{}", e);
                VelocityCmd::ZERO
            }
        }
    }

    /// True if the target was visible on the latest tick and both errors were within tolerance.
    pub fn is_aligned(&self) -> bool {
        self.report.target_visible && self.report.aligned
    }

    /// True if the target was visible on the latest tick.
    pub fn is_target_visible(&self) -> bool {
        self.report.target_visible
    }

    pub fn set_distance_gain(&self, gain: f64) {
        self.gains.set_distance(gain)
    }

    pub fn set_angle_gain(&self, gain: f64) {
        self.gains.set_angle(gain)
    }

    /// Handle to the controller's gains, for sharing with a tuning surface.
    pub fn gains(&self) -> Arc<ControlGains> {
        self.gains.clone()
    }

    pub fn target(&self) -> &TargetSpec {
        &self.params.target
    }

    /// Errors computed on the latest tick, `None` if the target was absent.
    pub fn last_error(&self) -> Option<AlignError> {
        self.last_error
    }

    pub fn last_cmd(&self) -> VelocityCmd {
        self.last_cmd
    }

    pub fn report(&self) -> &AlignStatusReport {
        &self.report
    }

    fn publish(&self) {
        let telem = match self.telem {
            Some(ref t) => t,
            None => return,
        };

        let r = &self.report;
        telem.put_bool("Tag Visible", r.target_visible);
        telem.put_number("Distance Error (m)", r.distance_error_m);
        telem.put_number("Angle Error (rad)", r.angle_error_rad);
        telem.put_number("Current Distance (m)", r.current_distance_m);
        telem.put_number("Current Angle (deg)", r.current_angle_rad.to_degrees());
        telem.put_number("Forward Speed", r.forward);
        telem.put_number("Rotation Speed", r.rotational);
        telem.put_bool("Is Aligned", self.is_aligned());
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::geom::Pose6;

    const EPS: f64 = 1e-9;

    /// Observation of a marker with the robot at the given planar distance and bearing.
    fn obs_at(id: i32, distance_m: f64, bearing_rad: f64) -> MarkerObservation {
        MarkerObservation {
            id,
            pose: Pose6::new(
                distance_m * bearing_rad.cos(),
                distance_m * bearing_rad.sin(),
                0.0,
                0.0,
                0.0,
                bearing_rad,
            ),
            tx_deg: bearing_rad.to_degrees(),
            ty_deg: 0.0,
            area_fraction: 1.0,
        }
    }

    fn ctrl() -> AlignCtrl {
        AlignCtrl::new(AlignCtrlParams::default()).unwrap()
    }

    #[test]
    fn test_too_far_drives_forward() {
        let mut c = ctrl();

        for d in [1.6, 1.8, 2.5, 5.0, 40.0].iter() {
            let cmd = c.tick(Some(&obs_at(2, *d, 0.0)));

            assert!(cmd.forward > 0.0, "distance {} gave forward {}", d, cmd.forward);
            assert!(cmd.forward <= 1.0);
            assert_eq!(cmd.lateral, 0.0);
        }

        // Too close reverses
        let cmd = c.tick(Some(&obs_at(2, 1.0, 0.0)));
        assert!((cmd.forward + 1.0).abs() < EPS);
    }

    #[test]
    fn test_proportional_and_saturated() {
        let mut c = ctrl();

        let cmd = c.tick(Some(&obs_at(2, 1.75, 0.0)));
        assert!((cmd.forward - 0.5).abs() < EPS);
        assert!(!c.report().forward_saturated);

        let cmd = c.tick(Some(&obs_at(2, 4.0, 0.0)));
        assert_eq!(cmd.forward, 1.0);
        assert!(c.report().forward_saturated);

        let cmd = c.tick(Some(&obs_at(2, 1.75, 0.5)));
        assert!((cmd.rotational + 0.4).abs() < EPS);
    }

    #[test]
    fn test_damping() {
        let mut c = ctrl();

        for angle in [0.8, 1.0, 2.0, -1.2, -3.0].iter() {
            for d in [1.6, 2.0, 3.0, 10.0].iter() {
                let cmd = c.tick(Some(&obs_at(2, *d, *angle)));
                let err = c.last_error().unwrap();

                assert!(c.report().forward_damped);
                assert!(
                    cmd.forward.abs() <= 0.3 * (2.0 * err.distance_error_m).abs() + EPS,
                    "angle {} distance {} forward {}",
                    angle,
                    d,
                    cmd.forward
                );
                assert!(cmd.forward.abs() <= 0.3 + EPS);
            }
        }

        // Just inside the threshold isn't damped
        c.tick(Some(&obs_at(2, 2.0, 0.78)));
        assert!(!c.report().forward_damped);
    }

    #[test]
    fn test_angle_error_normalised() {
        let params = AlignCtrlParams {
            target: TargetSpec::new(2, 1.5, 3.0),
            ..Default::default()
        };
        let mut c = AlignCtrl::new(params).unwrap();

        // Bearing of -3.0 is 0.283 rad past the desired 3.0 going through pi
        c.tick(Some(&obs_at(2, 1.5, -3.0)));
        let err = c.last_error().unwrap().angle_error_rad;

        assert!(err > -std::f64::consts::PI && err <= std::f64::consts::PI);
        assert!((err - (std::f64::consts::TAU - 6.0)).abs() < 1e-9);
    }

    #[test]
    fn test_aligned_gives_zero() {
        let params = AlignCtrlParams {
            target: TargetSpec::new(2, 1.5, 0.0).with_tolerances(0.05, 0.1),
            ..Default::default()
        };
        let mut c = AlignCtrl::new(params).unwrap();

        let cmd = c.tick(Some(&obs_at(2, 1.5, 0.0)));
        assert!(c.is_aligned());
        assert!(cmd.is_zero());

        let cmd = c.tick(Some(&obs_at(2, 1.54, -0.09)));
        assert!(c.is_aligned());
        assert!(cmd.is_zero());

        c.tick(Some(&obs_at(2, 1.56, 0.0)));
        assert!(!c.is_aligned());
    }

    #[test]
    fn test_absent_target() {
        let mut c = ctrl();

        let cmd = c.tick(Some(&obs_at(2, 3.0, 0.3)));
        assert!(!cmd.is_zero());

        let cmd = c.tick(None);
        assert_eq!(cmd, VelocityCmd::ZERO);
        assert!(!c.is_aligned());
        assert!(!c.is_target_visible());
        assert_eq!(c.last_error(), None);

        // Alignment doesn't persist through a dropout
        c.tick(Some(&obs_at(2, 1.5, 0.0)));
        assert!(c.is_aligned());
        c.tick(None);
        assert!(!c.is_aligned());
    }

    #[test]
    fn test_wrong_marker_treated_as_absent() {
        let mut c = ctrl();

        c.tick(Some(&obs_at(2, 1.5, 0.0)));
        assert!(c.is_aligned());

        let cmd = c.tick(Some(&obs_at(7, 3.0, 0.0)));
        assert!(cmd.is_zero());
        assert!(!c.is_aligned());

        assert!(matches!(
            c.proc(&Some(obs_at(7, 3.0, 0.0))),
            Err(AlignCtrlError::WrongMarker { expected: 2, found: 7 })
        ));
    }

    #[test]
    fn test_gain_changes_apply_next_tick() {
        let mut c = ctrl();
        let shared = c.gains();

        let cmd = c.tick(Some(&obs_at(2, 1.75, 0.0)));
        assert!((cmd.forward - 0.5).abs() < EPS);

        shared.set_distance(1.0);
        let cmd = c.tick(Some(&obs_at(2, 1.75, 0.0)));
        assert!((cmd.forward - 0.25).abs() < EPS);

        c.set_angle_gain(0.0);
        let cmd = c.tick(Some(&obs_at(2, 1.75, 0.5)));
        assert_eq!(cmd.rotational, 0.0);
    }

    #[test]
    fn test_telemetry() {
        let table = Table::new();
        let mut c = ctrl().with_telemetry(&table);

        c.tick(Some(&obs_at(2, 2.0, 0.0)));
        assert_eq!(table.get_bool("Align/Tag Visible"), Some(true));
        assert!((table.get_number("Align/Distance Error (m)").unwrap() - 0.5).abs() < EPS);
        assert_eq!(table.get_number("Align/Forward Speed"), Some(1.0));
        assert_eq!(table.get_bool("Align/Is Aligned"), Some(false));

        c.tick(None);
        assert_eq!(table.get_bool("Align/Tag Visible"), Some(false));
        assert_eq!(table.get_number("Align/Forward Speed"), Some(0.0));
    }

    #[test]
    fn test_invalid_params_rejected() {
        let params = AlignCtrlParams {
            target: TargetSpec::default().with_tolerances(0.0, 0.05),
            ..Default::default()
        };
        assert!(matches!(AlignCtrl::new(params), Err(AlignCtrlError::InvalidParams(_))));

        let params = AlignCtrlParams {
            max_output: -1.0,
            ..Default::default()
        };
        assert!(AlignCtrl::new(params).is_err());
    }
}
