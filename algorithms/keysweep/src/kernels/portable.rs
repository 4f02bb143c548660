//! Portable lane kernel.
//!
//! Each lane derives its candidate key, encrypts the known plaintext and
//! publishes the candidate when the ciphertext matches the target. Lanes
//! share nothing except the result slot.

use core::ops::Range;
use core::sync::atomic::{AtomicU64, Ordering};

use crate::keyspace::Keyspace;
use crate::oracle::BlockCipherOracle;
use crate::types::{Block, Key};

// =============================================================================
// LANE INPUTS
// =============================================================================

/// Read-only inputs shared by every lane of one dispatch.
#[derive(Debug, Clone, Copy)]
pub struct LaneInputs {
    /// Key with its unknown region zeroed.
    pub known_prefix: Key,
    /// Known plaintext.
    pub plaintext: Block,
    /// Ciphertext to match.
    pub target: Block,
}

// =============================================================================
// RESULT SLOT
// =============================================================================

/// Shared slot a matching lane writes its key into.
///
/// Writes are unconditional stores: when several lanes match, the last
/// physical store wins and which one that is stays unspecified.
#[derive(Debug)]
pub struct ResultSlot(AtomicU64);

impl ResultSlot {
    /// Slot holding `initial` until a lane publishes.
    pub const fn new(initial: &Key) -> Self {
        Self(AtomicU64::new(u64::from_ne_bytes(*initial)))
    }

    /// Overwrite the slot with `key`.
    #[inline]
    pub fn publish(&self, key: &Key) {
        self.0.store(u64::from_ne_bytes(*key), Ordering::Relaxed);
    }

    /// Current slot contents.
    pub fn load(&self) -> Key {
        self.0.load(Ordering::Relaxed).to_ne_bytes()
    }
}

// =============================================================================
// KERNEL
// =============================================================================

/// Test one lane. Returns the candidate key when it reproduces the target.
#[inline]
pub fn search_lane<O: BlockCipherOracle>(
    oracle: &O,
    keyspace: &Keyspace,
    inputs: &LaneInputs,
    lane: u64,
) -> Option<Key> {
    let candidate = keyspace.candidate(&inputs.known_prefix, lane);
    let ciphertext = oracle.encrypt(&candidate, &inputs.plaintext);
    (ciphertext == inputs.target).then_some(candidate)
}

/// Run a contiguous range of lanes (one work group) against `slot`.
pub fn run_group<O: BlockCipherOracle>(
    oracle: &O,
    keyspace: &Keyspace,
    inputs: &LaneInputs,
    lanes: Range<u64>,
    slot: &ResultSlot,
) {
    for lane in lanes {
        if let Some(key) = search_lane(oracle, keyspace, inputs, lane) {
            slot.publish(&key);
        }
    }
}
