//! # Keysweep
//!
//! Exhaustive, massively parallel recovery of the unknown low bits of a DES
//! key from one known plaintext/ciphertext pair. One lane per candidate,
//! dispatched in a single batch to an `OpenCL` device or the host CPU.

//! # Usage
//! ```rust
//! use keysweep::{BlockCipherOracle, Des, Keyspace, SearchConfig, SearchRequest, Searcher};
//!
//! // 1. A key with 12 unknown bits
//! let key = [0x13, 0x34, 0x57, 0x79, 0x9B, 0xBC, 0xDF, 0xF1];
//! let plaintext = [0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF];
//! let target = Des.encrypt(&key, &plaintext);
//! let prefix = Keyspace::new(12)?.clear(&key);
//!
//! // 2. Search (backend picked automatically)
//! let searcher = Searcher::new(SearchConfig::default());
//! let found = searcher.search(&SearchRequest::new(prefix, plaintext, target, 12))?;
//!
//! // 3. DES ignores parity bits: compare normalized keys
//! assert_eq!(found.map(|k| Des.normalize_key(&k)), Some(key));
//! # Ok::<(), keysweep::SearchError>(())
//! ```

// =============================================================================
// MODULES
// =============================================================================

pub mod config;
pub mod engine;
#[doc(hidden)]
pub mod kernels; // Public for test/bench use only
pub mod keyspace;
pub mod oracle;
mod search;
pub mod selftest;
pub(crate) mod types;

// =============================================================================
// EXPORTS
// =============================================================================

pub use config::SearchConfig;
pub use engine::dispatcher::{Backend, BackendPreference};
pub use keyspace::{Keyspace, MAX_UNKNOWN_BITS};
pub use oracle::{BlockCipherOracle, Des};
pub use search::{search, Searcher};
pub use selftest::{SelfTest, SelfTestReport};
pub use types::{Block, Key, SearchError, SearchRequest, BLOCK_SIZE, KEY_SIZE, NOT_FOUND};

/// Returns the name of the compute backend a default search uses.
#[must_use]
pub fn active_backend() -> &'static str {
    engine::active_backend_name()
}
