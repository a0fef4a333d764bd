//! # Cluster-identity map
//!
//! Maps each [`ClusterKey`] `(ra, dec, round3(z))` of the cluster catalog to the cluster
//! identifier.
//!
//! ## Collisions
//! -----------------
//! Keys are assumed unique across the catalog but this is not enforced. When two clusters
//! share a key, the **later row wins**: its identifier replaces the earlier one. Every such
//! replacement is logged with `warn!` and recorded in [`IdentityMap::collisions`] so callers
//! can decide whether the catalog is usable.
use std::collections::HashMap;

use log::warn;

use super::ClusterKey;
use crate::{catalog::ClusterRecord, constants::ClusterId};

/// A key collision observed while building an [`IdentityMap`].
#[derive(Debug, Clone, PartialEq)]
pub struct KeyCollision {
    pub key: ClusterKey,
    /// Identifier that was overwritten.
    pub replaced: ClusterId,
    /// Identifier that now owns the key.
    pub kept: ClusterId,
}

/// Immutable `ClusterKey → ClusterId` lookup table.
#[derive(Debug, Clone, Default)]
pub struct IdentityMap {
    ids: HashMap<ClusterKey, ClusterId>,
    collisions: Vec<KeyCollision>,
}

impl IdentityMap {
    pub fn get(&self, key: &ClusterKey) -> Option<&ClusterId> {
        self.ids.get(key)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Collisions in catalog order; empty when every key was unique.
    pub fn collisions(&self) -> &[KeyCollision] {
        &self.collisions
    }
}

/// Build the identity map of a cluster catalog.
///
/// Arguments
/// -----------------
/// * `clusters`: the cluster catalog, in file order.
///
/// Return
/// ----------
/// * An [`IdentityMap`] with one entry per distinct key. Duplicate keys resolve to the
///   last cluster carrying them.
pub fn build_identity_map(clusters: &[ClusterRecord]) -> IdentityMap {
    let mut map = IdentityMap::default();
    for cluster in clusters {
        let key = ClusterKey::rounded(cluster.ra, cluster.dec, cluster.redshift);
        if let Some(replaced) = map.ids.insert(key, cluster.id.clone()) {
            warn!(
                "Cluster key {key} shared by {replaced} and {}: keeping {}",
                cluster.id, cluster.id
            );
            map.collisions.push(KeyCollision {
                key,
                replaced,
                kept: cluster.id.clone(),
            });
        }
    }
    map
}
