//! Shared primitives for the guardian-afk workspace: the game-compatible
//! PRNG, integer-exact math, and the packed-key hash table used by the
//! pruning and deduplication stages.

pub mod math;
pub mod packed;
pub mod random;

pub use math::{avalanche, isqrt, region_floor_div};
pub use packed::{PackedHashMap, pack_xz, remap_zero_key, unpack_xz};
pub use random::MonumentRandom;
