//! # Centering offsets
//!
//! Tools to study the distribution of projected offsets between two center estimates of the
//! same clusters (e.g. optical center vs. X-ray peak):
//!
//! * [`read_offsets`] / [`parse_offsets`] – load `name offset_mpc` tables.
//! * [`OffsetHistogram`] – normalized density histogram of a sample.
//! * [`mixture`] – Rayleigh mixture density, optionally with a uniform-disc term.
//! * [`minimizer`] – bounded Nelder–Mead simplex.
//! * [`fit`] – maximum-likelihood fit of the mixture and the derived cutoff radius.
//! * [`classify`] – split offsets into [`Centering::WellCentered`] and
//!   [`Centering::Miscentered`].
//!
//! ## Example
//!
//! ```rust
//! use clustercen::offsets::{classify, parse_offsets, Centering};
//!
//! let offsets = parse_offsets("# name offset\nA 0.02\nB 0.35\n", "inline").unwrap();
//! assert_eq!(offsets[1].name, "B");
//! assert_eq!(classify(offsets[0].offset, 0.1), Centering::WellCentered);
//! assert_eq!(classify(offsets[1].offset, 0.1), Centering::Miscentered);
//! ```
use std::fmt;

use camino::Utf8Path;
use log::info;

use crate::{
    catalog::reader::{data_lines, read_catalog_file},
    clustercen_errors::ClusterCenError,
    constants::Mpc,
};

pub mod fit;
pub mod minimizer;
pub mod mixture;

/// Projected offset of one named object.
#[derive(Debug, Clone, PartialEq)]
pub struct CenteringOffset {
    pub name: String,
    pub offset: Mpc,
}

/// Parse `name offset_mpc` rows; extra columns are ignored.
pub fn parse_offsets(content: &str, source: &str) -> Result<Vec<CenteringOffset>, ClusterCenError> {
    data_lines(content, source)
        .map(|line| {
            line.require_fields(2)?;
            Ok(CenteringOffset {
                name: line.text(0)?.to_string(),
                offset: line.float(1)?,
            })
        })
        .collect()
}

/// Read an offset table from a whitespace-delimited file.
pub fn read_offsets(path: &Utf8Path) -> Result<Vec<CenteringOffset>, ClusterCenError> {
    let content = read_catalog_file(path)?;
    let offsets = parse_offsets(&content, path.as_str())?;
    info!("Loaded {} centering offsets from {path}", offsets.len());
    Ok(offsets)
}

/// Centering class of an offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Centering {
    WellCentered,
    Miscentered,
}

impl fmt::Display for Centering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Centering::WellCentered => write!(f, "well-centered"),
            Centering::Miscentered => write!(f, "miscentered"),
        }
    }
}

/// `offset <= cutoff` is well centered.
pub fn classify(offset: Mpc, cutoff: Mpc) -> Centering {
    if offset <= cutoff {
        Centering::WellCentered
    } else {
        Centering::Miscentered
    }
}

/// Classify every offset of a sample against `cutoff`, keeping the input order.
pub fn classify_offsets(offsets: &[CenteringOffset], cutoff: Mpc) -> Vec<(&str, Centering)> {
    offsets
        .iter()
        .map(|o| (o.name.as_str(), classify(o.offset, cutoff)))
        .collect()
}

/// Density histogram of an offset sample on `[0, r_max]`.
///
/// Densities are normalized by the total sample size, overflow included, so that
/// `Σ density · width + overflow / n = 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct OffsetHistogram {
    /// `n_bins + 1` bin edges, in Mpc.
    pub edges: Vec<Mpc>,
    pub counts: Vec<usize>,
    /// Probability density per bin, in 1/Mpc.
    pub density: Vec<f64>,
    /// Number of offsets above `r_max`.
    pub overflow: usize,
}

impl OffsetHistogram {
    /// Build the histogram; `r_max` defaults to the largest offset.
    ///
    /// Return
    /// ----------
    /// * [`ClusterCenError::InvalidHistogram`] for an empty sample, `n_bins == 0`, a
    ///   non-positive range or a non-finite offset.
    pub fn new(
        offsets: &[Mpc],
        n_bins: usize,
        r_max: Option<Mpc>,
    ) -> Result<Self, ClusterCenError> {
        if offsets.is_empty() {
            return Err(ClusterCenError::InvalidHistogram("empty offset sample".into()));
        }
        if n_bins == 0 {
            return Err(ClusterCenError::InvalidHistogram(
                "n_bins must be >= 1".into(),
            ));
        }
        if offsets.iter().any(|r| !r.is_finite()) {
            return Err(ClusterCenError::InvalidHistogram(
                "offsets must be finite".into(),
            ));
        }

        let r_max = r_max.unwrap_or_else(|| offsets.iter().copied().fold(0.0, f64::max));
        if !(r_max > 0.0 && r_max.is_finite()) {
            return Err(ClusterCenError::InvalidHistogram(format!(
                "histogram range must be positive, got r_max = {r_max}"
            )));
        }

        let width = r_max / n_bins as f64;
        let mut counts = vec![0usize; n_bins];
        let mut overflow = 0;
        for &r in offsets {
            if r > r_max {
                overflow += 1;
            } else {
                // r == r_max belongs to the last bin
                let bin = ((r.max(0.0) / width) as usize).min(n_bins - 1);
                counts[bin] += 1;
            }
        }

        let norm = offsets.len() as f64 * width;
        Ok(OffsetHistogram {
            edges: (0..=n_bins).map(|i| i as f64 * width).collect(),
            density: counts.iter().map(|&c| c as f64 / norm).collect(),
            counts,
            overflow,
        })
    }

    pub fn n_bins(&self) -> usize {
        self.counts.len()
    }

    /// Bin centers, in Mpc.
    pub fn centers(&self) -> Vec<Mpc> {
        self.edges
            .windows(2)
            .map(|w| 0.5 * (w[0] + w[1]))
            .collect()
    }
}

#[cfg(test)]
mod offsets_test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_offsets() {
        let content = "# name offset_mpc\nRM-1 0.012 extra\n\nRM-2 1.5\n";
        let offsets = parse_offsets(content, "offsets.txt").unwrap();
        assert_eq!(
            offsets,
            vec![
                CenteringOffset {
                    name: "RM-1".into(),
                    offset: 0.012
                },
                CenteringOffset {
                    name: "RM-2".into(),
                    offset: 1.5
                },
            ]
        );

        assert_eq!(
            parse_offsets("A\nB x\n", "offsets.txt"),
            Err(ClusterCenError::MalformedCatalog {
                path: "offsets.txt".into(),
                line: 1,
                reason: "expected at least 2 columns, found 1".into()
            })
        );
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify(0.1, 0.1), Centering::WellCentered);
        assert_eq!(classify(0.1000001, 0.1), Centering::Miscentered);
        assert_eq!(Centering::Miscentered.to_string(), "miscentered");

        let sample = vec![
            CenteringOffset {
                name: "a".into(),
                offset: 0.01,
            },
            CenteringOffset {
                name: "b".into(),
                offset: 0.5,
            },
        ];
        assert_eq!(
            classify_offsets(&sample, 0.2),
            vec![("a", Centering::WellCentered), ("b", Centering::Miscentered)]
        );
    }

    #[test]
    fn test_histogram() {
        let hist = OffsetHistogram::new(&[0.0, 0.1, 0.25, 0.5, 0.9], 2, Some(0.5)).unwrap();
        assert_eq!(hist.edges, vec![0.0, 0.25, 0.5]);
        assert_eq!(hist.counts, vec![2, 2]);
        assert_eq!(hist.overflow, 1);
        assert_relative_eq!(hist.density[0], 2.0 / (5.0 * 0.25));
        assert_eq!(hist.centers(), vec![0.125, 0.375]);

        let total: f64 = hist.density.iter().map(|d| d * 0.25).sum::<f64>()
            + hist.overflow as f64 / 5.0;
        assert_relative_eq!(total, 1.0);
    }

    #[test]
    fn test_histogram_default_range() {
        let hist = OffsetHistogram::new(&[0.2, 0.4, 0.8], 4, None).unwrap();
        assert_eq!(hist.n_bins(), 4);
        assert_eq!(hist.overflow, 0);
        assert_eq!(hist.counts, vec![0, 1, 1, 1]);
    }

    #[test]
    fn test_histogram_errors() {
        assert!(matches!(
            OffsetHistogram::new(&[], 10, None),
            Err(ClusterCenError::InvalidHistogram(_))
        ));
        assert!(matches!(
            OffsetHistogram::new(&[0.1], 0, None),
            Err(ClusterCenError::InvalidHistogram(_))
        ));
        assert!(matches!(
            OffsetHistogram::new(&[0.0, 0.0], 3, None),
            Err(ClusterCenError::InvalidHistogram(_))
        ));
    }
}
