//! Canonicalizes and deduplicates k-subsets so each unique monument set
//! yields exactly one result, however many anchors enumerated it.

use guardian_afk_utils::{PackedHashMap, avalanche, pack_xz, remap_zero_key};

use crate::types::Group;

/// Folds a group's canonical (already sorted) member list through a
/// splitmix64-class avalanche mixer, producing the dedup key. Two groups
/// with the same members in any enumeration order produce the same key,
/// since [`Group::new`] sorts members before this is ever called.
#[must_use]
pub fn canonical_key(group: &Group) -> u64 {
    let mut acc = 0_u64;
    for &(x, z) in &group.centers {
        #[allow(clippy::cast_sign_loss)]
        let packed = pack_xz(x, z) as u64;
        acc = avalanche(acc ^ packed);
    }
    remap_zero_key(acc)
}

/// First-seen-wins deduplication over an open-addressed table keyed by
/// [`canonical_key`]. Subsequent insertions of an already-seen group are
/// no-ops, matching the specification's dedup contract exactly.
pub struct GroupDeduper {
    map: PackedHashMap<Group>,
}

impl GroupDeduper {
    #[must_use]
    pub fn with_capacity(capacity_hint: usize) -> Self {
        Self {
            map: PackedHashMap::with_capacity(capacity_hint),
        }
    }

    /// Inserts `group` if its canonical key hasn't been seen before.
    /// Returns `true` if this call was the first sighting.
    pub fn insert(&mut self, group: Group) -> bool {
        let key = canonical_key(&group);
        self.map.insert_if_absent(key, group)
    }

    /// Number of distinct groups retained.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Drains the deduplicated groups in unspecified order; the
    /// orchestrator's final sort makes output order deterministic.
    pub fn into_groups(self) -> impl Iterator<Item = Group> {
        self.map.into_values()
    }
}
