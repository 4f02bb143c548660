//! Block Cipher Oracle
//!
//! The encryption primitive every lane evaluates. Treated as a pure function
//! of `(key, plaintext)`.

use des::cipher::generic_array::GenericArray;
use des::cipher::{BlockEncrypt, KeyInit};
use rand::prelude::*;
use rand::rngs::StdRng;

use crate::types::{Block, Key};

// =============================================================================
// ORACLE INTERFACE
// =============================================================================

/// Single-block cipher used by the search.
pub trait BlockCipherOracle: Sync {
    /// Expanded key material produced by [`Self::schedule`].
    type Schedule;

    /// Entry point of the device kernel implementing this cipher, if one
    /// exists. The `OpenCL` backend launches this entry point; only the DES
    /// kernel is embedded, other entry points need a kernel path.
    ///
    /// Oracles without one only run on the portable backend.
    const DEVICE_KERNEL: Option<&'static str>;

    /// Expand `key` into its round schedule.
    fn schedule(&self, key: &Key) -> Self::Schedule;

    /// Encrypt one block under an expanded schedule.
    fn encrypt_block(&self, plaintext: &Block, schedule: &Self::Schedule) -> Block;

    /// Canonical form of `key` (bits the cipher ignores fixed up).
    fn normalize_key(&self, key: &Key) -> Key;

    /// Schedule `key` and encrypt `plaintext` with it.
    #[inline]
    fn encrypt(&self, key: &Key, plaintext: &Block) -> Block {
        self.encrypt_block(plaintext, &self.schedule(key))
    }
}

// =============================================================================
// DES
// =============================================================================

/// DES (FIPS 46-3) backed by the `RustCrypto` `des` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct Des;

impl BlockCipherOracle for Des {
    type Schedule = des::Des;

    const DEVICE_KERNEL: Option<&'static str> = Some(crate::kernels::source::DES_ENTRY);

    fn schedule(&self, key: &Key) -> des::Des {
        des::Des::new(GenericArray::from_slice(key))
    }

    fn encrypt_block(&self, plaintext: &Block, schedule: &des::Des) -> Block {
        let mut block = GenericArray::clone_from_slice(plaintext);
        schedule.encrypt_block(&mut block);
        let mut out = [0u8; 8];
        out.copy_from_slice(&block);
        out
    }

    fn normalize_key(&self, key: &Key) -> Key {
        set_odd_parity(key)
    }
}

/// Set the low bit of every byte so each byte has odd parity.
///
/// DES ignores these bits when building its schedule, so keys differing
/// only in parity are equivalent.
#[must_use]
pub fn set_odd_parity(key: &Key) -> Key {
    key.map(|byte| {
        let high = byte & 0xFE;
        high | u8::from(high.count_ones() % 2 == 0)
    })
}

/// Random DES key with odd parity.
#[must_use]
pub fn random_key(rng: &mut StdRng) -> Key {
    let mut key = [0u8; 8];
    rng.fill(&mut key[..]);
    set_odd_parity(&key)
}

/// Random plaintext block.
#[must_use]
pub fn random_block(rng: &mut StdRng) -> Block {
    let mut block = [0u8; 8];
    rng.fill(&mut block[..]);
    block
}
