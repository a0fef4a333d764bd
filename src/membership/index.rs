//! # Membership index
//!
//! Maps each cluster identifier to the half-open row range `[low, high)` its members occupy
//! in the member catalog.
//!
//! ## Run detection
//! -----------------
//! The member catalog is expected to list each cluster's members contiguously. The builder
//! walks the rows once and groups consecutive rows whose parent `(ra, z)` are **exactly**
//! equal. Declination is not compared: two neighbouring clusters with the same right
//! ascension and redshift but different declinations fall into a single run.
//!
//! Each run is attributed through the [`IdentityMap`] using the `(ra, dec, z)` of its last
//! row. The member catalog's rounded redshift can drift from the cluster catalog's value, so
//! the lookup tries the candidate keys of [`candidate_keys`] in order:
//!
//! ```text
//! (ra, dec, z) → (ra, dec, round3(z + 0.001)) → (ra, dec, round3(z - 0.001))
//! ```
//!
//! A run that matches none of them aborts the build with
//! [`ClusterCenError::KeyResolution`].
//!
//! ## Guarantees
//! -----------------
//! * Ranges are emitted in row order and partition `[0, M)` without gaps or overlaps.
//! * With a contiguous catalog where every cluster has members, the number of entries
//!   equals the number of clusters.
use std::{collections::HashMap, ops::Range};

use itertools::Itertools;
use log::{debug, warn};
use ordered_float::OrderedFloat;

use super::{identity::IdentityMap, ClusterKey};
use crate::{
    catalog::MemberRecord,
    clustercen_errors::ClusterCenError,
    constants::{ClusterId, Degree, Redshift, REDSHIFT_DECIMALS, REDSHIFT_NUDGE},
    conversion::round_to_decimals,
};

/// Ordered `ClusterId → [low, high)` table over a member catalog.
#[derive(Debug, Clone, Default)]
pub struct MembershipIndex {
    entries: Vec<(ClusterId, Range<usize>)>,
    positions: HashMap<ClusterId, usize>,
}

impl MembershipIndex {
    fn push(&mut self, id: ClusterId, rows: Range<usize>) {
        let position = self.entries.len();
        if let Some(previous) = self.positions.insert(id.clone(), position) {
            warn!(
                "Cluster {id} owns two member runs ({:?} and {rows:?}); lookups return the later one",
                self.entries[previous].1
            );
        }
        self.entries.push((id, rows));
    }

    /// Row range of a cluster's members.
    pub fn get(&self, id: &str) -> Option<Range<usize>> {
        self.positions
            .get(id)
            .map(|&position| self.entries[position].1.clone())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    /// Number of runs in the index.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in row order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Range<usize>)> + '_ {
        self.entries
            .iter()
            .map(|(id, rows)| (id.as_str(), rows.clone()))
    }

    /// Cluster identifiers in row order.
    pub fn ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(id, _)| id.as_str())
    }

    /// Slice of `members` owned by cluster `id`.
    ///
    /// `members` must be the catalog the index was built on.
    ///
    /// Return
    /// ----------
    /// * The member rows, [`ClusterCenError::UnknownClusterId`] if `id` is not indexed, or
    ///   [`ClusterCenError::IndexOutOfCatalog`] if its range does not fit in `members`.
    pub fn members_of<'a>(
        &self,
        id: &str,
        members: &'a [MemberRecord],
    ) -> Result<&'a [MemberRecord], ClusterCenError> {
        let rows = self
            .get(id)
            .ok_or_else(|| ClusterCenError::UnknownClusterId(id.to_string()))?;
        let catalog_len = members.len();
        members
            .get(rows.clone())
            .ok_or_else(|| ClusterCenError::IndexOutOfCatalog {
                id: id.to_string(),
                rows,
                catalog_len,
            })
    }

    /// Check that the ranges cover `[0, n_rows)` contiguously, in order, without overlap.
    pub fn check_partition(&self, n_rows: usize) -> bool {
        let mut expected_low = 0;
        for (_, rows) in &self.entries {
            if rows.start != expected_low || rows.end <= rows.start {
                return false;
            }
            expected_low = rows.end;
        }
        expected_low == n_rows
    }
}

/// Ordered list of keys tried when attributing a member run to a cluster.
///
/// The first key uses the member catalog's redshift verbatim; the next two nudge it by
/// `+0.001` then `-0.001` and re-round to three decimals.
pub fn candidate_keys(ra: Degree, dec: Degree, redshift: Redshift) -> [ClusterKey; 3] {
    [
        ClusterKey::new(ra, dec, redshift),
        ClusterKey::new(
            ra,
            dec,
            round_to_decimals(redshift + REDSHIFT_NUDGE, REDSHIFT_DECIMALS),
        ),
        ClusterKey::new(
            ra,
            dec,
            round_to_decimals(redshift - REDSHIFT_NUDGE, REDSHIFT_DECIMALS),
        ),
    ]
}

/// Resolve a parent `(ra, dec, z)` to a cluster identifier, trying every candidate key.
pub fn resolve_cluster<'a>(
    identity: &'a IdentityMap,
    ra: Degree,
    dec: Degree,
    redshift: Redshift,
) -> Option<&'a ClusterId> {
    candidate_keys(ra, dec, redshift)
        .iter()
        .find_map(|key| identity.get(key))
}

/// Build the membership index of a member catalog.
///
/// Arguments
/// -----------------
/// * `members`: member catalog, rows of a cluster contiguous.
/// * `identity`: identity map of the cluster catalog.
///
/// Return
/// ----------
/// * The [`MembershipIndex`], or [`ClusterCenError::KeyResolution`] for the first run that
///   cannot be attributed to a cluster.
pub fn build_membership_index(
    members: &[MemberRecord],
    identity: &IdentityMap,
) -> Result<MembershipIndex, ClusterCenError> {
    let mut index = MembershipIndex::default();
    let mut low = 0;

    let runs = members
        .iter()
        .chunk_by(|m| (OrderedFloat(m.cluster_ra), OrderedFloat(m.cluster_redshift)));

    for (_, run) in &runs {
        let (len, last) = run.fold((0, None), |(n, _), m| (n + 1, Some(m)));
        let Some(last) = last else { continue };
        let high = low + len;

        let id = resolve_cluster(
            identity,
            last.cluster_ra,
            last.cluster_dec,
            last.cluster_redshift,
        )
        .ok_or(ClusterCenError::KeyResolution {
            first_row: low,
            last_row: high - 1,
            ra: last.cluster_ra,
            dec: last.cluster_dec,
            redshift: last.cluster_redshift,
        })?;

        index.push(id.clone(), low..high);
        low = high;
    }

    debug!(
        "Indexed {} member rows into {} cluster runs",
        members.len(),
        index.len()
    );
    Ok(index)
}

#[cfg(test)]
mod index_test {
    use super::*;
    use crate::{catalog::ClusterRecord, membership::identity::build_identity_map};

    fn member(ra: f64, dec: f64, z: f64, p: f64) -> MemberRecord {
        MemberRecord {
            cluster_ra: ra,
            cluster_dec: dec,
            cluster_redshift: z,
            ra: ra + 0.01,
            dec: dec + 0.01,
            probability: p,
        }
    }

    #[test]
    fn test_candidate_keys_order() {
        let keys = candidate_keys(1.0, 2.0, 0.193);
        assert_eq!(
            keys,
            [
                ClusterKey::new(1.0, 2.0, 0.193),
                ClusterKey::new(1.0, 2.0, 0.194),
                ClusterKey::new(1.0, 2.0, 0.192),
            ]
        );
    }

    #[test]
    fn test_build_index_runs() {
        let clusters = vec![
            ClusterRecord::new("A", 10.0, 1.0, 0.1),
            ClusterRecord::new("B", 20.0, 2.0, 0.2),
            ClusterRecord::new("C", 30.0, 3.0, 0.3),
        ];
        let members = vec![
            member(10.0, 1.0, 0.1, 0.5),
            member(10.0, 1.0, 0.1, 0.6),
            member(20.0, 2.0, 0.2, 0.1),
            member(30.0, 3.0, 0.3, 0.9),
            member(30.0, 3.0, 0.3, 0.8),
            member(30.0, 3.0, 0.3, 0.7),
        ];
        let identity = build_identity_map(&clusters);
        let index = build_membership_index(&members, &identity).unwrap();

        assert_eq!(index.len(), 3);
        assert_eq!(index.get("A"), Some(0..2));
        assert_eq!(index.get("B"), Some(2..3));
        assert_eq!(index.get("C"), Some(3..6));
        assert_eq!(index.ids().collect::<Vec<_>>(), vec!["A", "B", "C"]);
        assert!(index.check_partition(members.len()));
        assert_eq!(index.members_of("B", &members).unwrap().len(), 1);
    }

    #[test]
    fn test_redshift_nudge_fallback() {
        // cluster catalog rounds 0.19351 to 0.194, member catalog stored 0.193
        let clusters = vec![
            ClusterRecord::new("up", 10.0, 1.0, 0.19351),
            ClusterRecord::new("down", 20.0, 2.0, 0.4114),
        ];
        let members = vec![member(10.0, 1.0, 0.193, 0.5), member(20.0, 2.0, 0.412, 0.5)];
        let identity = build_identity_map(&clusters);
        let index = build_membership_index(&members, &identity).unwrap();

        assert_eq!(index.get("up"), Some(0..1));
        assert_eq!(index.get("down"), Some(1..2));
    }

    #[test]
    fn test_unresolved_run_is_an_error() {
        let clusters = vec![ClusterRecord::new("A", 10.0, 1.0, 0.1)];
        let members = vec![
            member(10.0, 1.0, 0.1, 0.5),
            member(10.0, 1.0, 0.105, 0.5),
            member(10.0, 1.0, 0.105, 0.5),
        ];
        let identity = build_identity_map(&clusters);
        let err = build_membership_index(&members, &identity).unwrap_err();

        assert_eq!(
            err,
            ClusterCenError::KeyResolution {
                first_row: 1,
                last_row: 2,
                ra: 10.0,
                dec: 1.0,
                redshift: 0.105,
            }
        );
    }

    #[test]
    fn test_declination_ignored_by_run_boundary() {
        // same ra and z, different dec: one run attributed through the last row
        let clusters = vec![
            ClusterRecord::new("north", 10.0, 5.0, 0.2),
            ClusterRecord::new("south", 10.0, -5.0, 0.2),
        ];
        let members = vec![member(10.0, 5.0, 0.2, 0.5), member(10.0, -5.0, 0.2, 0.5)];
        let identity = build_identity_map(&clusters);
        let index = build_membership_index(&members, &identity).unwrap();

        assert_eq!(index.len(), 1);
        assert_eq!(index.get("south"), Some(0..2));
        assert!(!index.contains("north"));
    }

    #[test]
    fn test_empty_member_catalog() {
        let identity = build_identity_map(&[ClusterRecord::new("A", 1.0, 1.0, 0.1)]);
        let index = build_membership_index(&[], &identity).unwrap();
        assert!(index.is_empty());
        assert!(index.check_partition(0));
    }

    #[test]
    fn test_check_partition_detects_gaps() {
        let mut index = MembershipIndex::default();
        index.push("A".into(), 0..2);
        index.push("B".into(), 3..4);
        assert!(!index.check_partition(4));
    }

    #[test]
    fn test_members_of_on_shorter_catalog() {
        let clusters = vec![
            ClusterRecord::new("A", 10.0, 1.0, 0.1),
            ClusterRecord::new("B", 20.0, 2.0, 0.2),
        ];
        let members = vec![
            member(10.0, 1.0, 0.1, 0.5),
            member(20.0, 2.0, 0.2, 0.1),
            member(20.0, 2.0, 0.2, 0.3),
        ];
        let identity = build_identity_map(&clusters);
        let index = build_membership_index(&members, &identity).unwrap();

        assert_eq!(index.members_of("A", &members[..1]).unwrap().len(), 1);
        assert_eq!(
            index.members_of("B", &members[..2]),
            Err(ClusterCenError::IndexOutOfCatalog {
                id: "B".into(),
                rows: 1..3,
                catalog_len: 2,
            })
        );
        assert_eq!(
            index.members_of("Z", &members),
            Err(ClusterCenError::UnknownClusterId("Z".into()))
        );
    }
}

