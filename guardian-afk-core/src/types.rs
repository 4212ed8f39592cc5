//! The data model shared across every pipeline stage.

use smallvec::SmallVec;

use crate::config::{CHUNK_SIZE_BLOCKS, Config};

/// A candidate monument start chunk, immutable once emitted.
///
/// At most one candidate exists per region; the block-space center is a
/// pure function of the chunk coordinates and the configured
/// `center_offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonumentCandidate {
    /// Start chunk X.
    pub chunk_x: i32,
    /// Start chunk Z.
    pub chunk_z: i32,
}

impl MonumentCandidate {
    /// The block-space center, `chunk*16 + center_offset`.
    #[must_use]
    pub fn center(&self, config: &Config) -> (i32, i32) {
        (
            self.chunk_x * CHUNK_SIZE_BLOCKS + config.center_offset,
            self.chunk_z * CHUNK_SIZE_BLOCKS + config.center_offset,
        )
    }
}

/// A canonical k-element group (k in 2..=4) of monument candidates.
///
/// Membership order is not meaningful; equality and the dedup key both
/// depend only on the lexicographically sorted `(centerX, centerZ)` tuple,
/// never on candidate insertion order.
#[derive(Debug, Clone)]
pub struct Group {
    /// Monument centers, sorted lexicographically by `(x, z)`.
    pub centers: SmallVec<[(i32, i32); 4]>,
}

impl Group {
    /// Builds a canonical group from member centers, sorting them.
    #[must_use]
    pub fn new(mut centers: SmallVec<[(i32, i32); 4]>) -> Self {
        centers.sort_unstable();
        Self { centers }
    }

    /// Group size `k`.
    #[must_use]
    pub fn len(&self) -> usize {
        self.centers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.centers.is_empty()
    }

    /// The centroid of member centers, truncated toward zero like the rest
    /// of the pipeline's integer block-coordinate arithmetic.
    #[must_use]
    pub fn centroid(&self) -> (i64, i64) {
        let n = self.centers.len() as i64;
        let sum_x: i64 = self.centers.iter().map(|&(x, _)| i64::from(x)).sum();
        let sum_z: i64 = self.centers.iter().map(|&(_, z)| i64::from(z)).sum();
        (sum_x / n, sum_z / n)
    }
}

/// Per-monument coverage contribution alongside the group total.
#[derive(Debug, Clone)]
pub struct CoverageScore {
    /// Total spawnable-block count across every monument in the group.
    pub total: i64,
    /// Per-monument sub-scores, same order as the owning [`Group::centers`].
    pub per_monument: SmallVec<[i64; 4]>,
}

/// A terminal AFK point result: where to stand, and what it's worth.
#[derive(Debug, Clone)]
pub struct AfkPoint {
    /// The group this point was optimized for.
    pub group: Group,
    /// Stand position. `y` is always [`crate::config::AFK_Y`].
    pub x: i64,
    /// See [`AfkPoint::x`].
    pub y: i32,
    /// See [`AfkPoint::x`].
    pub z: i64,
    /// Coverage achieved at `(x, y, z)`.
    pub coverage: CoverageScore,
}

impl AfkPoint {
    /// The derived "place a block here to stand on" coordinate: `y - 1`.
    #[must_use]
    pub fn place_block_y(&self) -> i32 {
        self.y - 1
    }

    /// Euclidean distance from the world origin, used as a sort tiebreak.
    #[must_use]
    pub fn distance_from_origin(&self) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let (x, z) = (self.x as f64, self.z as f64);
        (x * x + z * z).sqrt()
    }
}
