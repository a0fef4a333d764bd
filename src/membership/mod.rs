//! # Cluster membership: identity map, row index and member extraction
//!
//! This module joins the **cluster catalog** to the **member catalog** and produces
//! per-cluster galaxy lists.
//!
//! ## Pipeline
//! -----------------
//! 1. [`identity::build_identity_map`] keys every cluster by its
//!    [`ClusterKey`] `(ra, dec, round3(z))` and maps it to the cluster identifier.
//! 2. [`index::build_membership_index`] scans the member catalog once, detects the
//!    contiguous run of rows belonging to each parent cluster and resolves the run to an
//!    identifier through the identity map (with a ±0.001 redshift tolerance).
//! 3. [`extract::extract_member_list`] slices one cluster's rows out of the member catalog,
//!    keeps the galaxies with `prob_min < p <= prob_max` and
//!    [`extract::write_member_list`] persists them as a two-column CSV artifact.
//!
//! The identity map and the index are immutable values built once and passed by reference.
//!
//! ## Example
//! -----------------
//! ```rust
//! use clustercen::catalog::{ClusterRecord, MemberRecord};
//! use clustercen::membership::{identity::build_identity_map, index::build_membership_index};
//! use clustercen::membership::extract::{extract_member_list, ProbabilityBounds};
//!
//! let clusters = vec![ClusterRecord::new("C1", 150.0, 2.0, 0.1931)];
//! let members = vec![MemberRecord {
//!     cluster_ra: 150.0, cluster_dec: 2.0, cluster_redshift: 0.193,
//!     ra: 150.01, dec: 2.01, probability: 0.8,
//! }];
//!
//! let identity = build_identity_map(&clusters);
//! let index = build_membership_index(&members, &identity).unwrap();
//! let bounds = ProbabilityBounds::new(0.1, 1.0).unwrap();
//! let list = extract_member_list(&index, &members, "C1", &bounds).unwrap();
//! assert_eq!(list, vec![(150.01, 2.01)]);
//! ```
use std::fmt;

use ordered_float::OrderedFloat;

use crate::{
    constants::{Degree, Redshift, REDSHIFT_DECIMALS},
    conversion::round_to_decimals,
};

pub mod extract;
pub mod identity;
pub mod index;

/// Join key between a cluster and its member rows.
///
/// Floats are wrapped in [`OrderedFloat`] so the key can be hashed. Equality is exact: the
/// key only matches when the member catalog reproduces the cluster's coordinates bit for bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClusterKey {
    ra: OrderedFloat<f64>,
    dec: OrderedFloat<f64>,
    redshift: OrderedFloat<f64>,
}

impl ClusterKey {
    /// Build a key from values used verbatim.
    pub fn new(ra: Degree, dec: Degree, redshift: Redshift) -> Self {
        ClusterKey {
            ra: OrderedFloat(ra),
            dec: OrderedFloat(dec),
            redshift: OrderedFloat(redshift),
        }
    }

    /// Build a key after rounding the redshift to [`REDSHIFT_DECIMALS`] decimals.
    pub fn rounded(ra: Degree, dec: Degree, redshift: Redshift) -> Self {
        ClusterKey::new(ra, dec, round_to_decimals(redshift, REDSHIFT_DECIMALS))
    }

    pub fn ra(&self) -> Degree {
        self.ra.0
    }

    pub fn dec(&self) -> Degree {
        self.dec.0
    }

    pub fn redshift(&self) -> Redshift {
        self.redshift.0
    }
}

impl fmt::Display for ClusterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(ra={}, dec={}, z={})",
            self.ra.0, self.dec.0, self.redshift.0
        )
    }
}

#[cfg(test)]
mod cluster_key_test {
    use super::*;

    #[test]
    fn test_rounded_key_matches_verbatim_key() {
        assert_eq!(
            ClusterKey::rounded(150.0, 2.0, 0.19312),
            ClusterKey::new(150.0, 2.0, 0.193)
        );
        assert_ne!(
            ClusterKey::new(150.0, 2.0, 0.19312),
            ClusterKey::new(150.0, 2.0, 0.193)
        );
    }

    #[test]
    fn test_key_display() {
        let key = ClusterKey::new(150.5, -2.25, 0.3);
        assert_eq!(key.to_string(), "(ra=150.5, dec=-2.25, z=0.3)");
        assert_eq!(key.ra(), 150.5);
        assert_eq!(key.dec(), -2.25);
        assert_eq!(key.redshift(), 0.3);
    }
}
