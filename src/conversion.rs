use std::fmt;
use std::str::FromStr;

use crate::constants::{Degree, Radian, RADEG, RADMIN, RADSEC};

/// Unit attached to an angular quantity.
///
/// Angular separations enter the crate with an explicit unit and are converted to
/// radians with [`AngleUnit::to_radians`] before any projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AngleUnit {
    Degree,
    ArcMinute,
    ArcSecond,
    Radian,
}

impl AngleUnit {
    /// Convert `value`, expressed in this unit, to radians.
    pub fn to_radians(self, value: f64) -> Radian {
        match self {
            AngleUnit::Degree => value * RADEG,
            AngleUnit::ArcMinute => value * RADMIN,
            AngleUnit::ArcSecond => value * RADSEC,
            AngleUnit::Radian => value,
        }
    }
}

impl fmt::Display for AngleUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AngleUnit::Degree => "deg",
            AngleUnit::ArcMinute => "arcmin",
            AngleUnit::ArcSecond => "arcsec",
            AngleUnit::Radian => "rad",
        };
        write!(f, "{s}")
    }
}

impl FromStr for AngleUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "deg" | "degree" | "degrees" => Ok(AngleUnit::Degree),
            "arcmin" | "arcminute" | "arcminutes" => Ok(AngleUnit::ArcMinute),
            "arcsec" | "arcsecond" | "arcseconds" => Ok(AngleUnit::ArcSecond),
            "rad" | "radian" | "radians" => Ok(AngleUnit::Radian),
            other => Err(format!("unknown angle unit: {other}")),
        }
    }
}

/// Round `value` to `decimals` decimal places.
///
/// Ties are resolved to the even neighbour, which is how the catalogs were rounded when
/// the parent redshift column of the member catalog was written.
///
/// Arguments
/// ---------
/// * `value`: the number to round
/// * `decimals`: number of decimals to keep (may be negative)
///
/// Return
/// ------
/// * the rounded value
pub fn round_to_decimals(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round_ties_even() / scale
}

/// Great-circle angular distance between two sky positions.
///
/// Uses the haversine form, which stays accurate for the arcsecond-scale separations
/// typical of centering offsets.
///
/// Arguments
/// ---------
/// * `ra1`, `dec1`: first position in degrees
/// * `ra2`, `dec2`: second position in degrees
///
/// Return
/// ------
/// * the separation in degrees, in `[0, 180]`
pub fn angular_separation(ra1: Degree, dec1: Degree, ra2: Degree, dec2: Degree) -> Degree {
    let (ra1, dec1, ra2, dec2) = (ra1 * RADEG, dec1 * RADEG, ra2 * RADEG, dec2 * RADEG);
    let sin_ddec = ((dec2 - dec1) / 2.0).sin();
    let sin_dra = ((ra2 - ra1) / 2.0).sin();
    let h = sin_ddec * sin_ddec + dec1.cos() * dec2.cos() * sin_dra * sin_dra;
    2.0 * h.sqrt().min(1.0).asin() / RADEG
}
