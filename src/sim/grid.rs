//! Grid occupancy
//!
//! Tracks every cell claimed by a trail. Cells pack to `y * size + x` and are
//! stored in a fixed bitset, so membership checks never allocate.

use fixedbitset::FixedBitSet;
use glam::IVec2;

/// Square occupancy grid with O(1) claim/lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occupancy {
    size: u32,
    bits: FixedBitSet,
    claimed: usize,
}

impl Occupancy {
    pub fn new(size: u32) -> Self {
        Self {
            size,
            bits: FixedBitSet::with_capacity(size as usize * size as usize),
            claimed: 0,
        }
    }

    /// Side length of the grid
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Number of claimed cells
    pub fn len(&self) -> usize {
        self.claimed
    }

    pub fn is_empty(&self) -> bool {
        self.claimed == 0
    }

    #[inline]
    pub fn in_bounds(&self, cell: IVec2) -> bool {
        let size = self.size as i32;
        cell.x >= 0 && cell.y >= 0 && cell.x < size && cell.y < size
    }

    /// Packed key for an in-bounds cell
    #[inline]
    pub fn key(&self, cell: IVec2) -> Option<usize> {
        self.in_bounds(cell)
            .then(|| cell.y as usize * self.size as usize + cell.x as usize)
    }

    #[inline]
    pub fn is_occupied(&self, cell: IVec2) -> bool {
        match self.key(cell) {
            Some(key) => self.bits.contains(key),
            None => false,
        }
    }

    /// Out of bounds or occupied
    #[inline]
    pub fn is_blocked(&self, cell: IVec2) -> bool {
        !self.in_bounds(cell) || self.is_occupied(cell)
    }

    /// Claim a cell. Out-of-bounds cells are ignored. Returns true if newly claimed.
    pub fn claim(&mut self, cell: IVec2) -> bool {
        let Some(key) = self.key(cell) else {
            return false;
        };
        if self.bits.put(key) {
            return false;
        }
        self.claimed += 1;
        true
    }

    /// Release every cell (only on reset)
    pub fn clear(&mut self) {
        self.bits.clear();
        self.claimed = 0;
    }
}
