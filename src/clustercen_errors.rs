use std::ops::Range;

use thiserror::Error;

use crate::constants::{Degree, Redshift};

#[derive(Error, Debug)]
pub enum ClusterCenError {
    #[error(
        "Unable to attribute member rows {first_row}..={last_row} to a cluster: no match for \
         (ra={ra}, dec={dec}, z={redshift}) even after the redshift nudge"
    )]
    KeyResolution {
        first_row: usize,
        last_row: usize,
        ra: Degree,
        dec: Degree,
        redshift: Redshift,
    },

    #[error("Unknown cluster id: {0}")]
    UnknownClusterId(String),

    #[error(
        "Member rows {rows:?} of cluster {id} exceed the member catalog ({catalog_len} rows); \
         was the index built on another catalog?"
    )]
    IndexOutOfCatalog {
        id: String,
        rows: Range<usize>,
        catalog_len: usize,
    },

    #[error("Cluster id {0:?} cannot be used as a file name")]
    UnsafeClusterId(String),

    #[error("Malformed catalog {path} at line {line}: {reason}")]
    MalformedCatalog {
        path: String,
        line: usize,
        reason: String,
    },

    #[error("Cluster id file holds {ids} ids but the cluster catalog holds {rows} rows")]
    IdCountMismatch { ids: usize, rows: usize },

    #[error("Invalid probability bounds: {0}")]
    InvalidProbabilityBounds(String),

    #[error("Invalid cosmology: {0}")]
    InvalidCosmology(String),

    #[error("Invalid fit parameter: {0}")]
    InvalidFitParameter(String),

    #[error("Invalid offset sample: {0}")]
    InvalidOffsetSample(String),

    #[error("Invalid histogram: {0}")]
    InvalidHistogram(String),

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV writer error: {0}")]
    CsvError(#[from] csv::Error),
}

impl PartialEq for ClusterCenError {
    fn eq(&self, other: &Self) -> bool {
        use ClusterCenError::*;
        match (self, other) {
            (
                KeyResolution {
                    first_row: fa,
                    last_row: la,
                    ra: ra_a,
                    dec: dec_a,
                    redshift: z_a,
                },
                KeyResolution {
                    first_row: fb,
                    last_row: lb,
                    ra: ra_b,
                    dec: dec_b,
                    redshift: z_b,
                },
            ) => fa == fb && la == lb && ra_a == ra_b && dec_a == dec_b && z_a == z_b,
            (UnknownClusterId(a), UnknownClusterId(b)) => a == b,
            (
                IndexOutOfCatalog {
                    id: ia,
                    rows: ra,
                    catalog_len: la,
                },
                IndexOutOfCatalog {
                    id: ib,
                    rows: rb,
                    catalog_len: lb,
                },
            ) => ia == ib && ra == rb && la == lb,
            (UnsafeClusterId(a), UnsafeClusterId(b)) => a == b,
            (
                MalformedCatalog {
                    path: pa,
                    line: la,
                    reason: ra,
                },
                MalformedCatalog {
                    path: pb,
                    line: lb,
                    reason: rb,
                },
            ) => pa == pb && la == lb && ra == rb,
            (IdCountMismatch { ids: ia, rows: ra }, IdCountMismatch { ids: ib, rows: rb }) => {
                ia == ib && ra == rb
            }
            (InvalidProbabilityBounds(a), InvalidProbabilityBounds(b)) => a == b,
            (InvalidCosmology(a), InvalidCosmology(b)) => a == b,
            (InvalidFitParameter(a), InvalidFitParameter(b)) => a == b,
            (InvalidOffsetSample(a), InvalidOffsetSample(b)) => a == b,
            (InvalidHistogram(a), InvalidHistogram(b)) => a == b,

            // not comparable: same variant is enough
            (IoError(_), IoError(_)) => true,
            (CsvError(_), CsvError(_)) => true,

            _ => false,
        }
    }
}
