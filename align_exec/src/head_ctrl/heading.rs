//! Named headings

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::{
    f64::consts::{FRAC_PI_2, PI},
    fmt,
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use super::HeadCtrlError;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The canonical directions in the field.
///
/// The field X+ axis points away from the operator's wall, towards the opposing wall.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CanonicalHeading {
    /// 0 degrees, towards the opposing wall
    Forward,

    /// 90 degrees, towards the left wall
    Left,

    /// 180 degrees, towards the operator's wall
    Backward,

    /// 270 degrees, towards the right wall
    Right,

    /// Facing the operator, the same as `Backward`
    Operator,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CanonicalHeading {
    pub const ALL: [CanonicalHeading; 5] = [
        CanonicalHeading::Forward,
        CanonicalHeading::Left,
        CanonicalHeading::Backward,
        CanonicalHeading::Right,
        CanonicalHeading::Operator,
    ];

    /// Nominal angle of the heading.
    ///
    /// Units: degrees, in [0, 360)
    pub fn heading_deg(&self) -> f64 {
        match self {
            CanonicalHeading::Forward => 0.0,
            CanonicalHeading::Left => 90.0,
            CanonicalHeading::Backward => 180.0,
            CanonicalHeading::Right => 270.0,
            CanonicalHeading::Operator => 180.0,
        }
    }

    /// Angle of the heading.
    ///
    /// Units: radians, in (-pi, pi]
    pub fn heading_rad(&self) -> f64 {
        match self {
            CanonicalHeading::Forward => 0.0,
            CanonicalHeading::Left => FRAC_PI_2,
            CanonicalHeading::Backward | CanonicalHeading::Operator => PI,
            CanonicalHeading::Right => -FRAC_PI_2,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CanonicalHeading::Forward => "forward",
            CanonicalHeading::Left => "left",
            CanonicalHeading::Backward => "backward",
            CanonicalHeading::Right => "right",
            CanonicalHeading::Operator => "operator",
        }
    }
}

impl FromStr for CanonicalHeading {
    type Err = HeadCtrlError;

    /// Parse a heading name, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();

        CanonicalHeading::ALL
            .iter()
            .find(|h| h.name() == lower)
            .copied()
            .ok_or_else(|| HeadCtrlError::UnknownHeading(s.to_string()))
    }
}

impl fmt::Display for CanonicalHeading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use util::maths::normalise_angle;

    #[test]
    fn test_parse() {
        assert_eq!("forward".parse::<CanonicalHeading>().unwrap(), CanonicalHeading::Forward);
        assert_eq!("LEFT".parse::<CanonicalHeading>().unwrap(), CanonicalHeading::Left);
        assert_eq!(" Operator ".parse::<CanonicalHeading>().unwrap(), CanonicalHeading::Operator);
        assert!(matches!(
            "sideways".parse::<CanonicalHeading>(),
            Err(HeadCtrlError::UnknownHeading(_))
        ));

        for h in CanonicalHeading::ALL.iter() {
            assert_eq!(h.to_string().parse::<CanonicalHeading>().unwrap(), *h);
        }
    }

    #[test]
    fn test_angles() {
        assert_eq!(CanonicalHeading::Forward.heading_rad(), 0.0);
        assert!((CanonicalHeading::Left.heading_rad() - FRAC_PI_2).abs() < 1e-12);
        assert!((CanonicalHeading::Backward.heading_rad() - PI).abs() < 1e-12);
        assert!((CanonicalHeading::Right.heading_rad() + FRAC_PI_2).abs() < 1e-12);
        assert_eq!(
            CanonicalHeading::Operator.heading_rad(),
            CanonicalHeading::Backward.heading_rad()
        );

        // Agrees with the nominal angles in degrees
        for h in CanonicalHeading::ALL.iter() {
            let from_deg = normalise_angle(h.heading_deg().to_radians());
            assert!((from_deg.sin() - h.heading_rad().sin()).abs() < 1e-12);
            assert!((from_deg.cos() - h.heading_rad().cos()).abs() < 1e-12);
        }
    }

    #[test]
    fn test_serde_names() {
        let h: CanonicalHeading = serde_json::from_str("\"right\"").unwrap();
        assert_eq!(h, CanonicalHeading::Right);
        assert!(serde_json::from_str::<CanonicalHeading>("\"up\"").is_err());
    }
}
