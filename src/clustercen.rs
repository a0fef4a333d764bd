//! # ClusterCen: catalogs, identity map and membership index
//!
//! [`ClusterCen`](crate::clustercen::ClusterCen) is the entry point of the member-list
//! workflow. It owns the two catalogs and builds, once, everything needed to answer
//! "which galaxies belong to cluster `id`":
//!
//! 1. **Cluster catalog** – one [`ClusterRecord`] per cluster, with its identifier.
//! 2. **Member catalog** – parent position plus member position and probability per row.
//! 3. **Identity map** – `(ra, dec, round3(z)) → id`, see
//!    [`build_identity_map`](crate::membership::identity::build_identity_map).
//! 4. **Membership index** – `id → row range` over the member catalog, see
//!    [`build_membership_index`](crate::membership::index::build_membership_index).
//!
//! All of them are immutable once built; queries only borrow.
//!
//! ## Typical usage
//!
//! ```rust, no_run
//! use camino::Utf8Path;
//! use clustercen::catalog::{ClusterColumns, IdSource, MemberColumns};
//! use clustercen::clustercen::ClusterCen;
//! use clustercen::membership::extract::ProbabilityBounds;
//!
//! let cc = ClusterCen::load(
//!     Utf8Path::new("data/clusters.txt"),
//!     IdSource::File(Utf8Path::new("data/cluster_ids.txt")),
//!     Utf8Path::new("data/members.txt"),
//!     &ClusterColumns::default(),
//!     &MemberColumns::default(),
//! )
//! .unwrap();
//!
//! let bounds = ProbabilityBounds::new(0.5, 1.0).unwrap();
//! let path = cc.write_members("RM-1", &bounds, Utf8Path::new("out")).unwrap();
//! println!("members written to {path}");
//! ```
//!
//! ## Errors
//!
//! - Loading fails on the first malformed catalog line, an ID count mismatch or a member run
//!   that cannot be attributed to any cluster.
//! - Per-cluster queries fail with
//!   [`UnknownClusterId`](crate::clustercen_errors::ClusterCenError::UnknownClusterId);
//!   [`write_all`](ClusterCen::write_all) isolates such failures per identifier.
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, warn};

use crate::{
    catalog::{
        read_cluster_catalog, read_member_catalog, ClusterCatalog, ClusterColumns, ClusterRecord,
        IdSource, MemberCatalog, MemberColumns, MemberRecord,
    },
    clustercen_errors::ClusterCenError,
    constants::ClusterId,
    membership::{
        extract::{extract_and_write, extract_member_list, MemberList, ProbabilityBounds},
        identity::{build_identity_map, IdentityMap},
        index::{build_membership_index, MembershipIndex},
    },
};

/// Outcome of [`ClusterCen::write_all`], in request order.
pub type BatchExtraction = Vec<(ClusterId, Result<Utf8PathBuf, ClusterCenError>)>;

#[derive(Debug, Clone)]
pub struct ClusterCen {
    clusters: ClusterCatalog,
    members: MemberCatalog,
    identity: IdentityMap,
    index: MembershipIndex,
}

impl ClusterCen {
    /// Read both catalogs and build the identity map and the membership index.
    ///
    /// Arguments
    /// -----------------
    /// * `cluster_path`: whitespace-delimited cluster catalog.
    /// * `ids`: where the cluster identifiers come from.
    /// * `member_path`: whitespace-delimited member catalog, rows grouped by cluster.
    /// * `cluster_columns`, `member_columns`: column layouts.
    pub fn load(
        cluster_path: &Utf8Path,
        ids: IdSource<'_>,
        member_path: &Utf8Path,
        cluster_columns: &ClusterColumns,
        member_columns: &MemberColumns,
    ) -> Result<Self, ClusterCenError> {
        let clusters = read_cluster_catalog(cluster_path, ids, cluster_columns)?;
        let members = read_member_catalog(member_path, member_columns)?;
        Self::from_catalogs(clusters, members)
    }

    /// Build from catalogs already in memory.
    pub fn from_catalogs(
        clusters: ClusterCatalog,
        members: MemberCatalog,
    ) -> Result<Self, ClusterCenError> {
        let identity = build_identity_map(&clusters);
        let index = build_membership_index(&members, &identity)?;
        debug!(
            "ClusterCen ready: {} clusters, {} indexed, {} member rows",
            clusters.len(),
            index.len(),
            members.len()
        );
        Ok(ClusterCen {
            clusters,
            members,
            identity,
            index,
        })
    }

    pub fn clusters(&self) -> &[ClusterRecord] {
        &self.clusters
    }

    pub fn member_rows(&self) -> &[MemberRecord] {
        &self.members
    }

    pub fn identity(&self) -> &IdentityMap {
        &self.identity
    }

    pub fn index(&self) -> &MembershipIndex {
        &self.index
    }

    /// Cluster record for `id`, first match in catalog order.
    pub fn cluster(&self, id: &str) -> Option<&ClusterRecord> {
        self.clusters.iter().find(|c| c.id == id)
    }

    /// Members of `id` whose probability lies in `bounds`.
    pub fn members(
        &self,
        id: &str,
        bounds: &ProbabilityBounds,
    ) -> Result<MemberList, ClusterCenError> {
        extract_member_list(&self.index, &self.members, id, bounds)
    }

    /// Write the member list of `id` under `out_dir`; nothing is written for an unknown id.
    pub fn write_members(
        &self,
        id: &str,
        bounds: &ProbabilityBounds,
        out_dir: &Utf8Path,
    ) -> Result<Utf8PathBuf, ClusterCenError> {
        extract_and_write(&self.index, &self.members, id, bounds, out_dir)
    }

    /// Write the member lists of several clusters.
    ///
    /// Every identifier is processed: a failure is logged and recorded in its slot of the
    /// result without stopping the batch.
    pub fn write_all<I, S>(
        &self,
        ids: I,
        bounds: &ProbabilityBounds,
        out_dir: &Utf8Path,
    ) -> BatchExtraction
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        ids.into_iter()
            .map(|id| {
                let id = id.as_ref();
                let outcome = self.write_members(id, bounds, out_dir);
                if let Err(err) = &outcome {
                    warn!("Skipping cluster {id}: {err}");
                }
                (id.to_string(), outcome)
            })
            .collect()
    }
}

#[cfg(test)]
mod clustercen_test {
    use super::*;

    fn member(cluster: (f64, f64, f64), ra: f64, probability: f64) -> MemberRecord {
        MemberRecord {
            cluster_ra: cluster.0,
            cluster_dec: cluster.1,
            cluster_redshift: cluster.2,
            ra,
            dec: 0.0,
            probability,
        }
    }

    fn sample() -> ClusterCen {
        let clusters = vec![
            ClusterRecord::new("A", 10.0, 1.0, 0.1234),
            ClusterRecord::new("B", 20.0, 2.0, 0.5),
        ];
        let a = (10.0, 1.0, 0.123);
        let b = (20.0, 2.0, 0.5);
        let members = vec![
            member(a, 10.1, 0.9),
            member(a, 10.2, 0.2),
            member(b, 20.1, 1.0),
        ];
        ClusterCen::from_catalogs(clusters, members).unwrap()
    }

    #[test]
    fn test_from_catalogs() {
        let cc = sample();
        assert_eq!(cc.index().len(), 2);
        assert_eq!(cc.identity().len(), 2);
        assert_eq!(cc.index().get("A"), Some(0..2));
        assert_eq!(cc.cluster("B").map(|c| c.redshift), Some(0.5));
        assert!(cc.cluster("C").is_none());
    }

    #[test]
    fn test_members() {
        let cc = sample();
        let bounds = ProbabilityBounds::new(0.5, 1.0).unwrap();
        assert_eq!(cc.members("A", &bounds).unwrap(), vec![(10.1, 0.0)]);
        assert_eq!(
            cc.members("C", &bounds),
            Err(ClusterCenError::UnknownClusterId("C".into()))
        );
    }

    #[test]
    fn test_write_all_isolates_failures() {
        let cc = sample();
        let dir = tempfile::tempdir().unwrap();
        let out = Utf8Path::from_path(dir.path()).unwrap();
        let bounds = ProbabilityBounds::default();

        let results = cc.write_all(["A", "missing", "B"], &bounds, out);
        let ids: Vec<&str> = results.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["A", "missing", "B"]);
        assert!(results[0].1.is_ok());
        assert_eq!(
            results[1].1,
            Err(ClusterCenError::UnknownClusterId("missing".into()))
        );
        assert!(results[2].1.as_ref().unwrap().exists());
    }
}
