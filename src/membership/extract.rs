//! # Member list extraction
//!
//! Filters one cluster's galaxies by membership probability and writes them to a
//! two-column CSV artifact.
//!
//! ## Probability window
//! -----------------
//! Members are kept when `prob_min < p <= prob_max` ([`ProbabilityBounds::contains`]): the
//! lower bound is exclusive, the upper bound inclusive. File order is preserved.
//!
//! ## Output artifact
//! -----------------
//! ```text
//! <out_dir>/<cluster_id>_pmin<prob_min>_pmax<prob_max>.csv
//!
//! ra, dec
//! 150.11,2.21
//! ...
//! ```
//!
//! Bounds are printed with two decimals in the file name (see [`member_list_path`]).
//! An unknown cluster identifier fails before anything touches the filesystem.
use std::io::{BufWriter, Write};

use camino::{Utf8Path, Utf8PathBuf};
use log::info;
use serde::Serialize;

use super::index::MembershipIndex;
use crate::{
    catalog::MemberRecord,
    clustercen_errors::ClusterCenError,
    constants::{Degree, Probability, SkyPosition},
};

/// Header line of the member list artifact.
pub const MEMBER_LIST_HEADER: &str = "ra, dec";

/// Ordered `(ra, dec)` positions of the selected members, in degrees.
pub type MemberList = Vec<SkyPosition>;

/// Probability window `(min, max]` applied to member rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbabilityBounds {
    min: Probability,
    max: Probability,
}

impl ProbabilityBounds {
    /// Build a window, rejecting non-finite bounds or `min > max`.
    pub fn new(min: Probability, max: Probability) -> Result<Self, ClusterCenError> {
        if !min.is_finite() || !max.is_finite() {
            return Err(ClusterCenError::InvalidProbabilityBounds(format!(
                "bounds must be finite, got ({min}, {max}]"
            )));
        }
        if min > max {
            return Err(ClusterCenError::InvalidProbabilityBounds(format!(
                "prob_min {min} is larger than prob_max {max}"
            )));
        }
        Ok(ProbabilityBounds { min, max })
    }

    pub fn min(&self) -> Probability {
        self.min
    }

    pub fn max(&self) -> Probability {
        self.max
    }

    /// `min < p <= max`
    pub fn contains(&self, p: Probability) -> bool {
        self.min < p && p <= self.max
    }
}

impl Default for ProbabilityBounds {
    /// Every member with a strictly positive probability.
    fn default() -> Self {
        ProbabilityBounds { min: 0.0, max: 1.0 }
    }
}

#[derive(Serialize)]
struct MemberRow {
    ra: Degree,
    dec: Degree,
}

/// Filter a slice of member rows by probability.
pub fn filter_members(members: &[MemberRecord], bounds: &ProbabilityBounds) -> MemberList {
    members
        .iter()
        .filter(|m| bounds.contains(m.probability))
        .map(|m| (m.ra, m.dec))
        .collect()
}

/// Extract the member list of one cluster.
///
/// Arguments
/// -----------------
/// * `index`: membership index built over `members`.
/// * `members`: the member catalog.
/// * `id`: the cluster identifier.
/// * `bounds`: probability window.
///
/// Return
/// ----------
/// * The `(ra, dec)` pairs in file order, or [`ClusterCenError::UnknownClusterId`].
pub fn extract_member_list(
    index: &MembershipIndex,
    members: &[MemberRecord],
    id: &str,
    bounds: &ProbabilityBounds,
) -> Result<MemberList, ClusterCenError> {
    let rows = index.members_of(id, members)?;
    Ok(filter_members(rows, bounds))
}

/// Deterministic artifact path for a cluster and a probability window.
///
/// Return
/// ----------
/// * The path under `out_dir`, or [`ClusterCenError::UnsafeClusterId`] when `id` is empty,
///   `.`/`..`, or contains a path separator or NUL, so the artifact always lands in `out_dir`.
pub fn member_list_path(
    out_dir: &Utf8Path,
    id: &str,
    bounds: &ProbabilityBounds,
) -> Result<Utf8PathBuf, ClusterCenError> {
    if id.is_empty() || id == "." || id == ".." || id.contains(['/', '\\', '\0']) {
        return Err(ClusterCenError::UnsafeClusterId(id.to_string()));
    }
    Ok(out_dir.join(format!(
        "{id}_pmin{:.2}_pmax{:.2}.csv",
        bounds.min(),
        bounds.max()
    )))
}

/// Write a member list to its artifact, creating `out_dir` if needed.
///
/// Return
/// ----------
/// * The path written.
pub fn write_member_list(
    out_dir: &Utf8Path,
    id: &str,
    bounds: &ProbabilityBounds,
    list: &[SkyPosition],
) -> Result<Utf8PathBuf, ClusterCenError> {
    let path = member_list_path(out_dir, id, bounds)?;
    std::fs::create_dir_all(out_dir)?;

    let mut file = BufWriter::new(std::fs::File::create(&path)?);
    writeln!(file, "{MEMBER_LIST_HEADER}")?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    for &(ra, dec) in list {
        writer.serialize(MemberRow { ra, dec })?;
    }
    writer.flush()?;

    info!("Wrote {} members of {id} to {path}", list.len());
    Ok(path)
}

/// Extract one cluster's member list and persist it.
///
/// Nothing is written when `id` is unknown.
pub fn extract_and_write(
    index: &MembershipIndex,
    members: &[MemberRecord],
    id: &str,
    bounds: &ProbabilityBounds,
    out_dir: &Utf8Path,
) -> Result<Utf8PathBuf, ClusterCenError> {
    let list = extract_member_list(index, members, id, bounds)?;
    write_member_list(out_dir, id, bounds, &list)
}
