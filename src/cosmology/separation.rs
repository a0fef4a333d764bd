//! Projected and line-of-sight separations.
use crate::{
    constants::{Mpc, Redshift, SkyPosition},
    conversion::{angular_separation, AngleUnit},
};

use super::CosmologyDistance;

/// Projected physical separation of an angle at redshift `z`.
///
/// Arguments
/// -----------------
/// * `cosmo`: distance provider.
/// * `theta`: angular separation, expressed in `unit`.
/// * `unit`: unit of `theta`.
/// * `z`: redshift of the object.
///
/// Return
/// ----------
/// * `theta [rad] × D_A(z)` in Mpc.
pub fn physical_separation<C: CosmologyDistance + ?Sized>(
    cosmo: &C,
    theta: f64,
    unit: AngleUnit,
    z: Redshift,
) -> Mpc {
    unit.to_radians(theta) * cosmo.angular_diameter_distance(z)
}

/// Proper line-of-sight distance between `z1 < z2`, measured in the rest frame at `z1`.
///
/// `(D_C(z2) - D_C(z1)) / (1 + z1)`. The ordering of the redshifts is not checked: with
/// `z2 < z1` the result is negative.
pub fn line_of_sight_separation<C: CosmologyDistance + ?Sized>(
    cosmo: &C,
    z1: Redshift,
    z2: Redshift,
) -> Mpc {
    (cosmo.comoving_distance(z2) - cosmo.comoving_distance(z1)) / (1.0 + z1)
}

/// Projected offset between two center estimates of the same cluster.
///
/// Arguments
/// -----------------
/// * `cosmo`: distance provider.
/// * `center_a`, `center_b`: `(ra, dec)` in degrees.
/// * `z`: cluster redshift.
///
/// Return
/// ----------
/// * The offset in Mpc.
pub fn centering_offset<C: CosmologyDistance + ?Sized>(
    cosmo: &C,
    center_a: SkyPosition,
    center_b: SkyPosition,
    z: Redshift,
) -> Mpc {
    let theta = angular_separation(center_a.0, center_a.1, center_b.0, center_b.1);
    physical_separation(cosmo, theta, AngleUnit::Degree, z)
}

#[cfg(test)]
mod separation_test {
    use super::*;
    use crate::cosmology::Cosmology;
    use approx::assert_relative_eq;

    #[test]
    fn test_physical_separation() {
        let cosmo = Cosmology::builder()
            .h0(70.0)
            .om0(0.3)
            .ode0(0.7)
            .build()
            .unwrap();

        let sep = physical_separation(&cosmo, 24.0, AngleUnit::ArcSecond, 0.193);
        assert_relative_eq!(sep, 0.077, epsilon = 5e-4);

        let same = physical_separation(&cosmo, 0.4, AngleUnit::ArcMinute, 0.193);
        assert_relative_eq!(sep, same, max_relative = 1e-12);
    }

    #[test]
    fn test_line_of_sight_separation() {
        let cosmo = Cosmology::default();
        assert_relative_eq!(
            line_of_sight_separation(&cosmo, 0.193, 0.3),
            339.383,
            max_relative = 1e-5
        );
        assert!(line_of_sight_separation(&cosmo, 0.3, 0.193) < 0.0);
        assert_eq!(line_of_sight_separation(&cosmo, 0.2, 0.2), 0.0);
    }

    #[test]
    fn test_centering_offset() {
        let cosmo = Cosmology::default();
        let offset = centering_offset(&cosmo, (150.0, 0.0), (150.0, 24.0 / 3600.0), 0.193);
        assert_relative_eq!(
            offset,
            physical_separation(&cosmo, 24.0, AngleUnit::ArcSecond, 0.193),
            max_relative = 1e-9
        );
        assert_eq!(centering_offset(&cosmo, (1.0, 1.0), (1.0, 1.0), 0.5), 0.0);
    }
}
