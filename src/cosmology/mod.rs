//! # Cosmological distances
//!
//! This module provides the cosmological-distance provider used to turn angles and redshift
//! differences into physical lengths.
//!
//! ## Public API
//!
//! ### [`crate::cosmology::CosmologyDistance`]
//! The provider interface: line-of-sight comoving distance, transverse comoving distance and
//! angular diameter distance, all in **Mpc**. The separation converters in
//! [`separation`] are generic over it, so another provider can be plugged in.
//!
//! ### [`crate::cosmology::Cosmology`]
//! A ΛCDM model without radiation, parametrized by `(H0, Om0, Ode0)`. The curvature density
//! is derived, `Ok0 = 1 - Om0 - Ode0`, and
//!
//! ```text
//! E(z)   = sqrt(Om0 (1+z)^3 + Ok0 (1+z)^2 + Ode0)
//! D_C(z) = c/H0 ∫_0^z dz' / E(z')
//! D_M(z) = D_C                                   (Ok0 = 0)
//!        = c/H0 / sqrt(Ok0)  sinh(sqrt(Ok0)  D_C H0/c)   (Ok0 > 0)
//!        = c/H0 / sqrt(-Ok0) sin (sqrt(-Ok0) D_C H0/c)   (Ok0 < 0)
//! D_A(z) = D_M(z) / (1+z)
//! ```
//!
//! The integral is evaluated with composite Simpson quadrature.
//!
//! ## Configuration
//!
//! ```rust
//! use clustercen::cosmology::{Cosmology, CosmologyDistance};
//!
//! let cosmo = Cosmology::builder()
//!     .h0(70.0)
//!     .om0(0.3)
//!     .ode0(0.7)
//!     .quadrature_intervals(2000)
//!     .build()
//!     .unwrap();
//!
//! let d_a = cosmo.angular_diameter_distance(0.193);
//! assert!((d_a - 661.8).abs() < 0.5);
//! ```
//!
//! ## See also
//! ------------
//! * [`separation::physical_separation`] – angle × `D_A(z)`.
//! * [`separation::line_of_sight_separation`] – proper distance between two redshifts.
use std::cmp::Ordering::{Equal, Greater};
use std::fmt;

use crate::{
    clustercen_errors::ClusterCenError,
    constants::{KmPerSecPerMpc, Mpc, Redshift, VLIGHT},
};

pub mod separation;

/// Curvature densities below this magnitude are treated as flat.
const FLAT_OK0: f64 = 1e-10;

/// Provider of cosmological distances, in Mpc.
pub trait CosmologyDistance {
    /// Line-of-sight comoving distance `D_C(z)`.
    fn comoving_distance(&self, z: Redshift) -> Mpc;

    /// Transverse comoving distance `D_M(z)`.
    fn transverse_comoving_distance(&self, z: Redshift) -> Mpc;

    /// Angular diameter distance `D_A(z) = D_M(z) / (1+z)`.
    fn angular_diameter_distance(&self, z: Redshift) -> Mpc {
        self.transverse_comoving_distance(z) / (1.0 + z)
    }
}

/// ΛCDM cosmology `(H0, Om0, Ode0)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Cosmology {
    /// Hubble constant in km/s/Mpc.
    pub h0: KmPerSecPerMpc,
    /// Matter density at z = 0.
    pub om0: f64,
    /// Dark energy density at z = 0.
    pub ode0: f64,
    /// Number of Simpson intervals used for `D_C` (even).
    pub quadrature_intervals: usize,
}

impl Default for Cosmology {
    fn default() -> Self {
        Cosmology {
            h0: 70.0,
            om0: 0.3,
            ode0: 0.7,
            quadrature_intervals: 1000,
        }
    }
}

impl Cosmology {
    /// Construct the default flat cosmology `(70, 0.3, 0.7)`.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> CosmologyBuilder {
        CosmologyBuilder::new()
    }

    /// Curvature density `1 - Om0 - Ode0`.
    pub fn ok0(&self) -> f64 {
        1.0 - self.om0 - self.ode0
    }

    /// Hubble distance `c / H0` in Mpc.
    pub fn hubble_distance(&self) -> Mpc {
        VLIGHT / self.h0
    }

    /// Dimensionless Hubble parameter `E(z) = H(z) / H0`.
    pub fn efunc(&self, z: Redshift) -> f64 {
        let zp1 = 1.0 + z;
        (self.om0 * zp1.powi(3) + self.ok0() * zp1.powi(2) + self.ode0).sqrt()
    }

    /// Composite Simpson integral of `1/E` over `[0, z]`.
    fn inv_efunc_integral(&self, z: Redshift) -> f64 {
        if z == 0.0 {
            return 0.0;
        }
        // Simpson needs an even number of intervals
        let n = (self.quadrature_intervals.max(2) + 1) & !1;
        let h = z / n as f64;

        let interior: f64 = (1..n)
            .map(|i| {
                let weight = if i % 2 == 1 { 4.0 } else { 2.0 };
                weight / self.efunc(i as f64 * h)
            })
            .sum();

        h / 3.0 * (1.0 / self.efunc(0.0) + interior + 1.0 / self.efunc(z))
    }
}

impl CosmologyDistance for Cosmology {
    fn comoving_distance(&self, z: Redshift) -> Mpc {
        self.hubble_distance() * self.inv_efunc_integral(z)
    }

    fn transverse_comoving_distance(&self, z: Redshift) -> Mpc {
        let d_c = self.comoving_distance(z);
        let ok0 = self.ok0();
        if ok0.abs() < FLAT_OK0 {
            return d_c;
        }

        let d_h = self.hubble_distance();
        let sqrt_ok = ok0.abs().sqrt();
        if ok0 > 0.0 {
            d_h / sqrt_ok * (sqrt_ok * d_c / d_h).sinh()
        } else {
            d_h / sqrt_ok * (sqrt_ok * d_c / d_h).sin()
        }
    }
}

impl fmt::Display for Cosmology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LambdaCDM(H0={:.2} km/s/Mpc, Om0={:.3}, Ode0={:.3}, Ok0={:.3})",
            self.h0,
            self.om0,
            self.ode0,
            self.ok0()
        )
    }
}

/// Builder for [`Cosmology`], with validation.
#[derive(Debug, Clone)]
pub struct CosmologyBuilder {
    params: Cosmology,
}

impl Default for CosmologyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CosmologyBuilder {
    pub fn new() -> Self {
        Self {
            params: Cosmology::default(),
        }
    }

    pub fn h0(mut self, v: KmPerSecPerMpc) -> Self {
        self.params.h0 = v;
        self
    }
    pub fn om0(mut self, v: f64) -> Self {
        self.params.om0 = v;
        self
    }
    pub fn ode0(mut self, v: f64) -> Self {
        self.params.ode0 = v;
        self
    }
    pub fn quadrature_intervals(mut self, v: usize) -> Self {
        self.params.quadrature_intervals = v;
        self
    }

    /// Return true iff x >= 0.0 and comparable (i.e., not NaN).
    #[inline]
    fn ge0(x: f64) -> bool {
        matches!(x.partial_cmp(&0.0), Some(Greater) | Some(Equal))
    }

    /// Finalize the builder.
    ///
    /// Validation rules
    /// -----------------
    /// * `h0 > 0` and finite.
    /// * `om0 >= 0`, `ode0 >= 0`, both finite.
    /// * `quadrature_intervals >= 2`.
    pub fn build(self) -> Result<Cosmology, ClusterCenError> {
        let p = &self.params;

        if !(p.h0.is_finite() && p.h0 > 0.0) {
            return Err(ClusterCenError::InvalidCosmology(
                "h0 must be a finite positive number".into(),
            ));
        }
        if !Self::ge0(p.om0) || !p.om0.is_finite() {
            return Err(ClusterCenError::InvalidCosmology(
                "om0 must be finite and >= 0".into(),
            ));
        }
        if !Self::ge0(p.ode0) || !p.ode0.is_finite() {
            return Err(ClusterCenError::InvalidCosmology(
                "ode0 must be finite and >= 0".into(),
            ));
        }
        if p.quadrature_intervals < 2 {
            return Err(ClusterCenError::InvalidCosmology(
                "quadrature_intervals must be >= 2".into(),
            ));
        }

        Ok(self.params)
    }
}

#[cfg(test)]
mod cosmology_test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_flat_distances() {
        let cosmo = Cosmology::default();
        assert_eq!(cosmo.ok0(), 0.0);
        assert_relative_eq!(cosmo.efunc(0.0), 1.0);
        assert_eq!(cosmo.comoving_distance(0.0), 0.0);

        assert_relative_eq!(cosmo.comoving_distance(1.0), 3303.83, max_relative = 1e-5);
        assert_relative_eq!(cosmo.comoving_distance(0.193), 789.513, max_relative = 1e-5);
        assert_relative_eq!(
            cosmo.angular_diameter_distance(0.193),
            661.788,
            max_relative = 1e-5
        );
        assert_eq!(
            cosmo.transverse_comoving_distance(1.0),
            cosmo.comoving_distance(1.0)
        );
    }

    #[test]
    fn test_open_cosmology() {
        let cosmo = Cosmology::builder().ode0(0.0).build().unwrap();
        assert_relative_eq!(cosmo.ok0(), 0.7);
        assert_relative_eq!(cosmo.comoving_distance(1.0), 2795.156, max_relative = 1e-5);
        assert_relative_eq!(
            cosmo.transverse_comoving_distance(1.0),
            2936.147,
            max_relative = 1e-5
        );
    }

    #[test]
    fn test_closed_cosmology() {
        let cosmo = Cosmology::builder().om0(0.5).build().unwrap();
        assert_relative_eq!(cosmo.comoving_distance(1.0), 3131.207, max_relative = 1e-5);
        assert_relative_eq!(
            cosmo.transverse_comoving_distance(1.0),
            3075.713,
            max_relative = 1e-5
        );
    }

    #[test]
    fn test_odd_interval_count_is_rounded_up() {
        let coarse = Cosmology::builder().quadrature_intervals(7).build().unwrap();
        assert_relative_eq!(
            coarse.comoving_distance(0.5),
            Cosmology::default().comoving_distance(0.5),
            max_relative = 1e-5
        );
    }

    #[test]
    fn test_builder_validation() {
        assert_eq!(
            Cosmology::builder().h0(0.0).build(),
            Err(ClusterCenError::InvalidCosmology(
                "h0 must be a finite positive number".into()
            ))
        );
        assert!(Cosmology::builder().om0(-0.1).build().is_err());
        assert!(Cosmology::builder().ode0(f64::NAN).build().is_err());
        assert!(Cosmology::builder().quadrature_intervals(1).build().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            Cosmology::default().to_string(),
            "LambdaCDM(H0=70.00 km/s/Mpc, Om0=0.300, Ode0=0.700, Ok0=0.000)"
        );
    }
}
