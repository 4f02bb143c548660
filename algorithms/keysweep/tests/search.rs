//! Search Tests
//!
//! End-to-end recovery, boundary widths, input validation, and the
//! multiple-match behaviour of the result slot.

#![allow(clippy::pedantic, clippy::nursery)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use keysweep::{
    BackendPreference, Block, BlockCipherOracle, Des, Key, Keyspace, SearchConfig, SearchError,
    SearchRequest, Searcher,
};

const PLAINTEXT: Block = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];

fn portable_config() -> SearchConfig {
    SearchConfig {
        backend: BackendPreference::Portable,
        ..SearchConfig::default()
    }
}

fn des_searcher() -> Searcher {
    Searcher::new(portable_config())
}

// =============================================================================
// TOY ORACLES
// =============================================================================

/// Ignores the low nibble of the key: 16 candidates match per 8-bit region.
#[derive(Debug, Default)]
struct LowNibbleBlind;

impl BlockCipherOracle for LowNibbleBlind {
    type Schedule = u64;
    const DEVICE_KERNEL: Option<&'static str> = None;

    fn schedule(&self, key: &Key) -> u64 {
        u64::from_le_bytes(*key) & !0xF
    }

    fn encrypt_block(&self, plaintext: &Block, schedule: &u64) -> Block {
        (u64::from_le_bytes(*plaintext) ^ schedule).to_le_bytes()
    }

    fn normalize_key(&self, key: &Key) -> Key {
        (u64::from_le_bytes(*key) & !0xF).to_le_bytes()
    }
}

/// XOR "cipher": only the exact key reproduces a ciphertext.
#[derive(Debug, Default)]
struct Xor;

impl BlockCipherOracle for Xor {
    type Schedule = Key;
    const DEVICE_KERNEL: Option<&'static str> = None;

    fn schedule(&self, key: &Key) -> Key {
        *key
    }

    fn encrypt_block(&self, plaintext: &Block, schedule: &Key) -> Block {
        core::array::from_fn(|i| plaintext[i] ^ schedule[i])
    }

    fn normalize_key(&self, key: &Key) -> Key {
        *key
    }
}

// =============================================================================
// END TO END
// =============================================================================

#[test]
fn test_recovers_low_two_bytes() {
    let key: Key = [0x00, 0x00, 0x57, 0x79, 0x9B, 0xBC, 0xDF, 0xF1];
    let target = Des.encrypt(&key, &PLAINTEXT);
    let prefix = Keyspace::new(16).unwrap().clear(&key);

    let found = keysweep::search(&prefix, &PLAINTEXT, &target, 16)
        .unwrap()
        .expect("Key must be found");

    // Parity bits (LSB of each byte) are unconstrained: any parity variant
    // of the true key may win the result slot.
    assert_eq!(found[0] & 0xFE, 0x00);
    assert_eq!(found[1] & 0xFE, 0x00);
    assert_eq!(found[2..], prefix[2..], "Known bytes must be preserved");
    assert_eq!(Des.encrypt(&found, &PLAINTEXT), target);
}

#[test]
fn test_recovers_normalized_key() {
    let key: Key = [0x13, 0x34, 0x57, 0x79, 0x9B, 0xBC, 0xDF, 0xF1];
    let target = Des.encrypt(&key, &PLAINTEXT);

    for bits in [1, 7, 8, 13] {
        let prefix = Keyspace::new(bits).unwrap().clear(&key);
        let request = SearchRequest::new(prefix, PLAINTEXT, target, bits);
        let found = des_searcher().search(&request).unwrap();
        assert_eq!(
            found.map(|k| Des.normalize_key(&k)),
            Some(key),
            "Recovery failed for {bits} bits"
        );
    }
}

#[test]
fn test_corrupted_target_is_not_found() {
    let key: Key = [0x00, 0x00, 0x57, 0x79, 0x9B, 0xBC, 0xDF, 0xF1];
    let mut target = Des.encrypt(&key, &PLAINTEXT);
    target[7] ^= 0x80;

    let request = SearchRequest::new(key, PLAINTEXT, target, 16);
    assert_eq!(des_searcher().search(&request).unwrap(), None);
}

#[test]
fn test_key_outside_region_is_not_found() {
    let key: Key = [0x13, 0x34, 0x57, 0x79, 0x9B, 0xBC, 0xDF, 0xF1];
    let target = Des.encrypt(&key, &PLAINTEXT);

    // Byte 2 is wrong and lies above the 8-bit region.
    let mut prefix = Keyspace::new(8).unwrap().clear(&key);
    prefix[2] ^= 0x10;
    let request = SearchRequest::new(prefix, PLAINTEXT, target, 8);
    assert_eq!(des_searcher().search(&request).unwrap(), None);
}

// =============================================================================
// BOUNDARY
// =============================================================================

#[test]
fn test_single_lane_search() {
    let key: Key = [0x13, 0x34, 0x57, 0x79, 0x9B, 0xBC, 0xDF, 0xF1];
    let target = Des.encrypt(&key, &PLAINTEXT);

    let hit = SearchRequest::new(key, PLAINTEXT, target, 0);
    assert_eq!(des_searcher().search(&hit).unwrap(), Some(key));

    let miss = SearchRequest::new(key, PLAINTEXT, PLAINTEXT, 0);
    assert_eq!(des_searcher().search(&miss).unwrap(), None);
}

#[test]
fn test_zero_key_is_reported() {
    // The zero key is the only match, so the slot keeps its initial value.
    let target = Xor.encrypt(&[0u8; 8], &PLAINTEXT);
    let searcher = Searcher::with_oracle(Xor, portable_config());

    let request = SearchRequest::new([0u8; 8], PLAINTEXT, target, 12);
    assert_eq!(searcher.search(&request).unwrap(), Some([0u8; 8]));

    let miss = SearchRequest::new([0u8; 8], PLAINTEXT, [0xEE; 8], 12);
    assert_eq!(searcher.search(&miss).unwrap(), None);
}

#[test]
fn test_group_size_does_not_change_result() {
    let key: Key = [0x13, 0x34, 0x57, 0x79, 0x9B, 0xBC, 0xDF, 0xF1];
    let target = Des.encrypt(&key, &PLAINTEXT);
    let prefix = Keyspace::new(10).unwrap().clear(&key);

    for group_size in [1, 3, 64, 256, 4096] {
        let config = SearchConfig {
            group_size,
            threads: 2,
            ..portable_config()
        };
        let request = SearchRequest::new(prefix, PLAINTEXT, target, 10);
        let found = Searcher::new(config).search(&request).unwrap();
        assert_eq!(found.map(|k| Des.normalize_key(&k)), Some(key));
    }
}

// =============================================================================
// MULTIPLE MATCHES
// =============================================================================

#[test]
fn test_multiple_matches_last_write_wins() {
    let key: Key = [0x35, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
    let target = LowNibbleBlind.encrypt(&key, &PLAINTEXT);
    let searcher = Searcher::with_oracle(LowNibbleBlind, portable_config());

    let request = SearchRequest::new([0u8; 8], PLAINTEXT, target, 8);
    let found = searcher.search(&request).unwrap().expect("A match must be reported");

    // Which of the 16 writers lands is unspecified; it must be one of them.
    assert_eq!(found[0] & 0xF0, 0x30);
    assert_eq!(found[1..], [0u8; 7]);
    assert_eq!(LowNibbleBlind.encrypt(&found, &PLAINTEXT), target);
}

// =============================================================================
// VALIDATION
// =============================================================================

#[test]
fn test_dispatch_too_wide() {
    let config = SearchConfig {
        max_portable_lanes: 1 << 10,
        ..portable_config()
    };
    let request = SearchRequest::new([0u8; 8], PLAINTEXT, PLAINTEXT, 11);
    let err = Searcher::new(config).search(&request).unwrap_err();
    assert!(matches!(
        err,
        SearchError::DispatchTooWide {
            lanes: 2048,
            max: 1024
        }
    ));
}

#[test]
fn test_keyspace_too_wide() {
    let request = SearchRequest::new([0u8; 8], PLAINTEXT, PLAINTEXT, 64);
    let err = des_searcher().search(&request).unwrap_err();
    assert!(matches!(err, SearchError::KeyspaceTooWide { bits: 64 }));
    assert!(err.to_string().contains("64"));
}

#[test]
fn test_prefix_not_cleared() {
    let prefix: Key = [0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x80];
    let request = SearchRequest::new(prefix, PLAINTEXT, PLAINTEXT, 8);
    assert!(matches!(
        des_searcher().search(&request),
        Err(SearchError::PrefixNotCleared)
    ));
}

#[cfg(not(feature = "opencl"))]
#[test]
fn test_opencl_unavailable_without_feature() {
    let config = SearchConfig {
        backend: BackendPreference::OpenCl,
        ..SearchConfig::default()
    };
    let request = SearchRequest::new([0u8; 8], PLAINTEXT, PLAINTEXT, 4);
    assert!(matches!(
        Searcher::new(config).search(&request),
        Err(SearchError::BackendUnavailable { backend: "opencl" })
    ));
}

#[test]
fn test_oracle_without_device_kernel_runs_portable() {
    let config = SearchConfig {
        backend: BackendPreference::Auto,
        ..SearchConfig::default()
    };
    let searcher = Searcher::with_oracle(Xor, config);
    assert_eq!(searcher.backend().unwrap(), keysweep::Backend::Portable);
}
