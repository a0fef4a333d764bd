//! # Whitespace-delimited catalog reader
//!
//! Line-level helpers shared by the cluster and member catalog loaders.
//!
//! The catalogs are plain text tables: one record per line, fields separated by any run of
//! whitespace, blank lines and lines starting with `#` ignored. Every failure carries the
//! source name and the 1-based line number and surfaces as
//! [`ClusterCenError::MalformedCatalog`]; no partial catalog is ever returned.
use camino::Utf8Path;

use crate::clustercen_errors::ClusterCenError;

/// One data line of a catalog, split into fields.
pub(crate) struct CatalogLine<'a> {
    pub(crate) source: &'a str,
    pub(crate) number: usize,
    pub(crate) fields: Vec<&'a str>,
}

impl<'a> CatalogLine<'a> {
    /// Fail unless the line has at least `n` fields.
    pub(crate) fn require_fields(&self, n: usize) -> Result<(), ClusterCenError> {
        if self.fields.len() < n {
            return Err(self.malformed(format!(
                "expected at least {n} columns, found {}",
                self.fields.len()
            )));
        }
        Ok(())
    }

    /// Parse column `col` as a float.
    pub(crate) fn float(&self, col: usize) -> Result<f64, ClusterCenError> {
        let raw = self
            .fields
            .get(col)
            .ok_or_else(|| self.malformed(format!("missing column {col}")))?;
        raw.parse::<f64>()
            .map_err(|_| self.malformed(format!("column {col}: invalid number '{raw}'")))
    }

    /// Column `col` as a raw string.
    pub(crate) fn text(&self, col: usize) -> Result<&'a str, ClusterCenError> {
        self.fields
            .get(col)
            .copied()
            .ok_or_else(|| self.malformed(format!("missing column {col}")))
    }

    pub(crate) fn malformed(&self, reason: String) -> ClusterCenError {
        ClusterCenError::MalformedCatalog {
            path: self.source.to_string(),
            line: self.number,
            reason,
        }
    }
}

/// Iterate over the data lines of `content`, skipping blanks and `#` comments.
///
/// Line numbers are 1-based and count every physical line, so they point at the right
/// place in the file even when comments are present.
pub(crate) fn data_lines<'a>(
    content: &'a str,
    source: &'a str,
) -> impl Iterator<Item = CatalogLine<'a>> + 'a {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(move |(idx, line)| CatalogLine {
            source,
            number: idx + 1,
            fields: line.split_whitespace().collect(),
        })
}

/// Read a whole catalog file into memory.
pub(crate) fn read_catalog_file(path: &Utf8Path) -> Result<String, ClusterCenError> {
    Ok(std::fs::read_to_string(path)?)
}
