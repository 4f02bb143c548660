//! Self-Test Harness
//!
//! Recovers a freshly generated random key end to end: the true ciphertext
//! comes from the oracle, the unknown region of the key is zeroed, and the
//! search must find it again (modulo bits the cipher ignores).

use core::fmt;
use std::time::{Duration, Instant};

use rand::prelude::*;
use rand::rngs::StdRng;
use subtle::ConstantTimeEq;

use crate::keyspace::Keyspace;
use crate::oracle::{random_block, BlockCipherOracle};
use crate::search::Searcher;
use crate::types::{Block, Key, SearchError, SearchRequest, KEY_SIZE};

/// Unknown region width of a default self-test (2^16 lanes).
pub const DEFAULT_UNKNOWN_BITS: u32 = 16;

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Parameters of one self-test round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelfTest {
    /// Width of the region the search must recover.
    pub unknown_bits: u32,
    /// Fixture seed (`None` = fresh entropy).
    pub seed: Option<u64>,
}

impl Default for SelfTest {
    fn default() -> Self {
        Self {
            unknown_bits: DEFAULT_UNKNOWN_BITS,
            seed: None,
        }
    }
}

impl SelfTest {
    /// Reproducible self-test over `unknown_bits` bits.
    pub const fn seeded(unknown_bits: u32, seed: u64) -> Self {
        Self {
            unknown_bits,
            seed: Some(seed),
        }
    }

    /// Generate fixtures, run the search and check the recovered key.
    ///
    /// A search that finds nothing is a failed report, not an error.
    ///
    /// # Errors
    /// Any [`SearchError`] raised by the search itself.
    pub fn run<O: BlockCipherOracle>(
        &self,
        searcher: &Searcher<O>,
    ) -> Result<SelfTestReport, SearchError> {
        let keyspace = Keyspace::new(self.unknown_bits)?;
        let seed = self.seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);
        let oracle = searcher.oracle();

        let mut raw = [0u8; KEY_SIZE];
        rng.fill(&mut raw[..]);
        let original = oracle.normalize_key(&raw);
        let plaintext = random_block(&mut rng);
        let target = oracle.encrypt(&original, &plaintext);

        tracing::debug!(seed, bits = self.unknown_bits, "self-test fixtures ready");

        let request = SearchRequest::new(
            keyspace.clear(&original),
            plaintext,
            target,
            self.unknown_bits,
        );
        let start = Instant::now();
        let recovered = searcher.search(&request)?;
        let elapsed = start.elapsed();

        let normalized = recovered.map(|key| oracle.normalize_key(&key));
        let passed = normalized.is_some_and(|key| bool::from(key[..].ct_eq(&original[..])));

        let report = SelfTestReport {
            seed,
            original,
            plaintext,
            recovered,
            normalized,
            passed,
            lanes: keyspace.lanes(),
            elapsed,
        };
        tracing::info!(
            seed,
            passed,
            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
            "self-test finished"
        );
        Ok(report)
    }
}

// =============================================================================
// REPORT
// =============================================================================

/// Outcome of one self-test round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelfTestReport {
    /// Seed the fixtures were drawn from.
    pub seed: u64,
    /// Key the ciphertext was produced with (normalized).
    pub original: Key,
    /// Plaintext block.
    pub plaintext: Block,
    /// Key reported by the search, as written by the matching lane.
    pub recovered: Option<Key>,
    /// `recovered` after normalization.
    pub normalized: Option<Key>,
    /// Whether the normalized key equals `original`.
    pub passed: bool,
    /// Lanes dispatched.
    pub lanes: u64,
    /// Wall time of the search.
    pub elapsed: Duration,
}

impl SelfTestReport {
    /// `Success` or `Fail`.
    pub const fn verdict(&self) -> &'static str {
        if self.passed {
            "Success"
        } else {
            "Fail"
        }
    }

    /// Lanes tested per second.
    #[allow(clippy::cast_precision_loss)]
    pub fn keys_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.lanes as f64 / secs
        } else {
            0.0
        }
    }
}

impl fmt::Display for SelfTestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verdict())
    }
}
