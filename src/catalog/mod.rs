//! # Cluster and member catalogs
//!
//! This module defines the two flat tables the membership logic joins together and the
//! loaders that read them from whitespace-delimited text files.
//!
//! ## Data model
//! -----------------
//! - A [`ClusterRecord`] is one row of the **cluster catalog**: string identifier, center
//!   position and redshift at source precision.
//! - A [`MemberRecord`] is one row of the **member catalog**: the parent cluster's position and
//!   redshift (already rounded to three decimals), the galaxy's own position, and its
//!   membership probability.
//!
//! Member rows are grouped **contiguously by parent cluster** in file order. The membership
//! index relies on this; the loaders never reorder rows.
//!
//! ## Column layouts
//! -----------------
//! Column positions are configurable through [`ClusterColumns`] and [`MemberColumns`]. The
//! defaults match the CAMIRA text dumps:
//!
//! ```text
//! cluster catalog : ra dec z ...
//! member catalog  : ra_cl dec_cl - z_cl ra dec - prob ...
//! ```
//!
//! Cluster identifiers either sit in a column of the cluster catalog or in a separate file
//! holding one identifier per line, aligned with the catalog rows ([`IdSource`]).
//!
//! ## Error semantics
//! -----------------
//! Any column count or number format problem aborts the load with
//! [`ClusterCenError::MalformedCatalog`]. An ID file whose length differs from the catalog
//! yields [`ClusterCenError::IdCountMismatch`].
//!
//! ## Example
//! -----------------
//! ```rust,no_run
//! use camino::Utf8Path;
//! use clustercen::catalog::{read_cluster_catalog, read_member_catalog, ClusterColumns, IdSource, MemberColumns};
//!
//! let clusters = read_cluster_catalog(
//!     Utf8Path::new("camira_s19a_wide.dat"),
//!     IdSource::File(Utf8Path::new("camira_s19a_wide_id.dat")),
//!     &ClusterColumns::default(),
//! )?;
//! let members = read_member_catalog(
//!     Utf8Path::new("camira_s19a_wide_member.dat"),
//!     &MemberColumns::default(),
//! )?;
//! # Ok::<(), clustercen::clustercen_errors::ClusterCenError>(())
//! ```
pub(crate) mod reader;

use camino::Utf8Path;
use log::info;

use crate::{
    clustercen_errors::ClusterCenError,
    constants::{ClusterId, Degree, Probability, Redshift},
};
use reader::{data_lines, read_catalog_file};

/// One row of the cluster catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterRecord {
    pub id: ClusterId,
    pub ra: Degree,
    pub dec: Degree,
    pub redshift: Redshift,
}

impl ClusterRecord {
    pub fn new(id: impl Into<ClusterId>, ra: Degree, dec: Degree, redshift: Redshift) -> Self {
        ClusterRecord {
            id: id.into(),
            ra,
            dec,
            redshift,
        }
    }
}

/// One row of the member catalog.
///
/// `cluster_redshift` is stored rounded to three decimals by the catalog producer; it may
/// carry floating-point drift relative to the rounded value computed from the cluster
/// catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberRecord {
    pub cluster_ra: Degree,
    pub cluster_dec: Degree,
    pub cluster_redshift: Redshift,
    pub ra: Degree,
    pub dec: Degree,
    pub probability: Probability,
}

pub type ClusterCatalog = Vec<ClusterRecord>;
pub type MemberCatalog = Vec<MemberRecord>;

/// Column positions of the cluster catalog (0-based).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterColumns {
    pub ra: usize,
    pub dec: usize,
    pub redshift: usize,
}

impl Default for ClusterColumns {
    fn default() -> Self {
        ClusterColumns {
            ra: 0,
            dec: 1,
            redshift: 2,
        }
    }
}

impl ClusterColumns {
    fn width(&self) -> usize {
        self.ra.max(self.dec).max(self.redshift) + 1
    }
}

/// Column positions of the member catalog (0-based).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberColumns {
    pub cluster_ra: usize,
    pub cluster_dec: usize,
    pub cluster_redshift: usize,
    pub ra: usize,
    pub dec: usize,
    pub probability: usize,
}

impl Default for MemberColumns {
    fn default() -> Self {
        MemberColumns {
            cluster_ra: 0,
            cluster_dec: 1,
            cluster_redshift: 3,
            ra: 4,
            dec: 5,
            probability: 7,
        }
    }
}

impl MemberColumns {
    fn width(&self) -> usize {
        [
            self.cluster_ra,
            self.cluster_dec,
            self.cluster_redshift,
            self.ra,
            self.dec,
            self.probability,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
            + 1
    }
}

/// Where the cluster identifiers come from.
#[derive(Debug, Clone, Copy)]
pub enum IdSource<'a> {
    /// Identifier stored in the given column of the cluster catalog.
    Column(usize),
    /// Separate file with one identifier per line, aligned with the catalog rows.
    File(&'a Utf8Path),
    /// Identifiers already in memory, aligned with the catalog rows.
    List(&'a [ClusterId]),
}

/// Parse a cluster catalog already held in memory.
///
/// Arguments
/// -----------------
/// * `content`: the catalog text.
/// * `source`: name used in error messages (usually the file path).
/// * `ids`: identifier source; `IdSource::File` is read here.
/// * `columns`: column layout of the numeric fields.
///
/// Return
/// ----------
/// * The rows in file order, or the first [`ClusterCenError`] encountered.
pub fn parse_cluster_catalog(
    content: &str,
    source: &str,
    ids: IdSource<'_>,
    columns: &ClusterColumns,
) -> Result<ClusterCatalog, ClusterCenError> {
    let id_column = match ids {
        IdSource::Column(col) => Some(col),
        _ => None,
    };
    let width = columns.width().max(id_column.map_or(0, |c| c + 1));

    let mut records = Vec::new();
    let mut positional_ids = Vec::new();
    for line in data_lines(content, source) {
        line.require_fields(width)?;
        let ra = line.float(columns.ra)?;
        let dec = line.float(columns.dec)?;
        let redshift = line.float(columns.redshift)?;
        let id = match id_column {
            Some(col) => line.text(col)?.to_string(),
            None => String::new(),
        };
        records.push(ClusterRecord::new(id, ra, dec, redshift));
    }

    match ids {
        IdSource::Column(_) => return Ok(records),
        IdSource::File(path) => {
            let content = read_catalog_file(path)?;
            positional_ids.extend(
                content
                    .lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty() && !l.starts_with('#'))
                    .map(str::to_string),
            );
        }
        IdSource::List(list) => positional_ids.extend_from_slice(list),
    }

    if positional_ids.len() != records.len() {
        return Err(ClusterCenError::IdCountMismatch {
            ids: positional_ids.len(),
            rows: records.len(),
        });
    }
    for (record, id) in records.iter_mut().zip(positional_ids) {
        record.id = id;
    }
    Ok(records)
}

/// Read a cluster catalog from a whitespace-delimited file.
///
/// See [`parse_cluster_catalog`] for the parsing rules.
pub fn read_cluster_catalog(
    path: &Utf8Path,
    ids: IdSource<'_>,
    columns: &ClusterColumns,
) -> Result<ClusterCatalog, ClusterCenError> {
    let content = read_catalog_file(path)?;
    let catalog = parse_cluster_catalog(&content, path.as_str(), ids, columns)?;
    info!("Loaded {} clusters from {path}", catalog.len());
    Ok(catalog)
}

/// Parse a member catalog already held in memory.
///
/// Rows are kept in file order; the contiguity of each cluster's rows is not checked here
/// (see [`build_membership_index`](crate::membership::index::build_membership_index)).
pub fn parse_member_catalog(
    content: &str,
    source: &str,
    columns: &MemberColumns,
) -> Result<MemberCatalog, ClusterCenError> {
    let width = columns.width();
    data_lines(content, source)
        .map(|line| {
            line.require_fields(width)?;
            Ok(MemberRecord {
                cluster_ra: line.float(columns.cluster_ra)?,
                cluster_dec: line.float(columns.cluster_dec)?,
                cluster_redshift: line.float(columns.cluster_redshift)?,
                ra: line.float(columns.ra)?,
                dec: line.float(columns.dec)?,
                probability: line.float(columns.probability)?,
            })
        })
        .collect()
}

/// Read a member catalog from a whitespace-delimited file.
pub fn read_member_catalog(
    path: &Utf8Path,
    columns: &MemberColumns,
) -> Result<MemberCatalog, ClusterCenError> {
    let content = read_catalog_file(path)?;
    let catalog = parse_member_catalog(&content, path.as_str(), columns)?;
    info!("Loaded {} member rows from {path}", catalog.len());
    Ok(catalog)
}
