//! Manifest-diff reconciliation
//!
//! Decides, once per activation, which resident cache entries survive an
//! upgrade. A key survives only if the new build ships it with the exact
//! fingerprint the old build had; everything else is evicted. Keys the new
//! build tracks but the cache does not hold are misses and are fetched
//! lazily, never evicted.

use crate::manifest::{ResourceKey, ResourceManifest};
use std::collections::BTreeSet;

/// Outcome of diffing the resident cache against a manifest pair
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    /// Keys safe to keep serving from the content store
    pub retain: BTreeSet<ResourceKey>,
    /// Keys that must be deleted before any staged entry is merged
    pub evict: BTreeSet<ResourceKey>,
}

impl ReconcilePlan {
    pub fn is_noop(&self) -> bool {
        self.evict.is_empty()
    }
}

/// Compute the retention/eviction plan for one activation.
///
/// With no previous manifest (first install, or recovery from a corrupt
/// record) the entire resident set is discarded and the store is rebuilt
/// from staging. Otherwise each resident key is retained iff the current
/// manifest tracks it with an unchanged fingerprint.
pub fn reconcile(
    current: &ResourceManifest,
    previous: Option<&ResourceManifest>,
    main_keys: &[ResourceKey],
) -> ReconcilePlan {
    let Some(previous) = previous else {
        return ReconcilePlan {
            retain: BTreeSet::new(),
            evict: main_keys.iter().cloned().collect(),
        };
    };

    let mut plan = ReconcilePlan::default();
    for key in main_keys {
        let unchanged = matches!(
            (current.get(key), previous.get(key)),
            (Some(cur), Some(prev)) if cur == prev
        );
        if unchanged {
            plan.retain.insert(key.clone());
        } else {
            plan.evict.insert(key.clone());
        }
    }
    plan
}
