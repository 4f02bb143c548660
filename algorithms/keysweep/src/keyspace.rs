//! Keyspace Partitioning
//!
//! Maps lane indices onto candidate keys.
//!
//! Convention: a key is read as a little-endian 64-bit word and the unknown
//! region is its low `bits` bits. For 16 unknown bits that is key bytes 0
//! and 1. Lane `i` explores the candidate whose unknown region holds `i`,
//! so lanes `0..2^bits` cover the region exactly once.

use crate::types::{Key, SearchError};

/// Widest supported unknown region (lane counts must fit in `u64`).
pub const MAX_UNKNOWN_BITS: u32 = 63;

// =============================================================================
// KEYSPACE
// =============================================================================

/// The set of candidate values for the unknown key region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Keyspace {
    bits: u32,
}

impl Keyspace {
    /// Create a keyspace over the low `bits` bits of the key.
    ///
    /// # Errors
    /// Returns `SearchError::KeyspaceTooWide` if `bits > MAX_UNKNOWN_BITS`.
    pub const fn new(bits: u32) -> Result<Self, SearchError> {
        if bits > MAX_UNKNOWN_BITS {
            return Err(SearchError::KeyspaceTooWide { bits });
        }
        Ok(Self { bits })
    }

    /// Width of the unknown region in bits.
    pub const fn bits(&self) -> u32 {
        self.bits
    }

    /// Number of lanes needed to cover the keyspace.
    pub const fn lanes(&self) -> u64 {
        1u64 << self.bits
    }

    /// Bit mask of the unknown region within the key word.
    pub const fn mask(&self) -> u64 {
        self.lanes() - 1
    }

    /// Candidate key explored by `lane`: the prefix with its unknown
    /// region overwritten by the lane index.
    #[inline]
    pub const fn candidate(&self, prefix: &Key, lane: u64) -> Key {
        let word = u64::from_le_bytes(*prefix);
        ((word & !self.mask()) | (lane & self.mask())).to_le_bytes()
    }

    /// Lane index that explores `key`.
    pub const fn lane_of(&self, key: &Key) -> u64 {
        u64::from_le_bytes(*key) & self.mask()
    }

    /// `key` with its unknown region zeroed.
    pub const fn clear(&self, key: &Key) -> Key {
        (u64::from_le_bytes(*key) & !self.mask()).to_le_bytes()
    }

    /// Whether the unknown region of `prefix` is all zero.
    pub const fn is_cleared(&self, prefix: &Key) -> bool {
        u64::from_le_bytes(*prefix) & self.mask() == 0
    }

    /// Whether `key` is one of the candidates derived from `prefix`.
    pub const fn contains(&self, prefix: &Key, key: &Key) -> bool {
        let mask = !self.mask();
        u64::from_le_bytes(*prefix) & mask == u64::from_le_bytes(*key) & mask
    }
}
