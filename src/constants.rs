//! # Constants and type definitions for clustercen
//!
//! This module centralizes the **physical constants**, **conversion factors**, and **common type
//! definitions** used throughout the `clustercen` library.
//!
//! ## Overview
//!
//! - Physical constants used by the cosmological distance provider
//! - Unit conversions (degrees ↔ radians, arcseconds ↔ radians)
//! - Core type aliases used across the crate
//! - The redshift rounding policy shared by the cluster and member catalogs
//!
//! These definitions are used by all main modules, including the catalog readers, the
//! membership index, the cosmology layer and the offset fit.

// -------------------------------------------------------------------------------------------------
// Physical constants and unit conversions
// -------------------------------------------------------------------------------------------------

/// Speed of light in km/s
pub const VLIGHT: f64 = 2.99792458e5;

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

/// Arcminutes → radians
pub const RADMIN: f64 = std::f64::consts::PI / 10800.0;

/// Arcseconds → radians
pub const RADSEC: f64 = std::f64::consts::PI / 648000.0;

// -------------------------------------------------------------------------------------------------
// Redshift rounding policy
// -------------------------------------------------------------------------------------------------

/// Number of decimals kept on the redshift used in the cluster join key.
pub const REDSHIFT_DECIMALS: i32 = 3;

/// Redshift nudge applied when a join key misses the identity map.
pub const REDSHIFT_NUDGE: f64 = 0.001;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Angle in radians
pub type Radian = f64;
/// Distance in megaparsecs
pub type Mpc = f64;
/// Hubble constant in km/s/Mpc
pub type KmPerSecPerMpc = f64;
/// Cosmological redshift
pub type Redshift = f64;
/// Membership probability in `[0, 1]`
pub type Probability = f64;

/// String identifier of a galaxy cluster (e.g. `"C19a1sW02869"`)
pub type ClusterId = String;

/// Sky position as `(ra, dec)` in degrees
pub type SkyPosition = (Degree, Degree);
