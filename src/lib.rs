//! # clustercen
//!
//! Galaxy-cluster member lists and centering-offset analysis.
//!
//! * [`catalog`] – whitespace-delimited cluster and member catalogs.
//! * [`membership`] – cluster keys, the identity map, the membership index and member-list
//!   extraction to CSV.
//! * [`cosmology`] – ΛCDM distances and physical separations.
//! * [`offsets`] – centering offsets, Rayleigh mixture fit and classification.
//! * [`clustercen`] – the [`ClusterCen`](crate::clustercen::ClusterCen) façade tying the
//!   catalogs, the identity map and the index together.
pub mod catalog;
pub mod clustercen;
pub mod clustercen_errors;
pub mod constants;
pub mod conversion;
pub mod cosmology;
pub mod membership;
pub mod offsets;

pub use clustercen::{BatchExtraction, ClusterCen};
pub use clustercen_errors::ClusterCenError;
pub use cosmology::{Cosmology, CosmologyDistance};
pub use membership::{extract::ProbabilityBounds, ClusterKey};
