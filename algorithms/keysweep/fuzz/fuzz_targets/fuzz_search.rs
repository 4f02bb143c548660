#![no_main]

use libfuzzer_sys::fuzz_target;
use keysweep::{
    BackendPreference, BlockCipherOracle, Des, Keyspace, SearchConfig, SearchError, SearchRequest,
    Searcher,
};

fuzz_target!(|data: &[u8]| {
    // =============================================================================
    // PREPARATION
    // =============================================================================

    if data.len() < 17 {
        return;
    }
    let mut key = [0u8; 8];
    let mut plaintext = [0u8; 8];
    key.copy_from_slice(&data[0..8]);
    plaintext.copy_from_slice(&data[8..16]);
    let bits = u32::from(data[16] % 10);

    let searcher = Searcher::new(SearchConfig {
        backend: BackendPreference::Portable,
        threads: 1,
        ..SearchConfig::default()
    });
    let keyspace = Keyspace::new(bits).unwrap();
    let target = Des.encrypt(&key, &plaintext);

    // =============================================================================
    // 1. RECOVERY
    // =============================================================================

    let request = SearchRequest::new(keyspace.clear(&key), plaintext, target, bits);
    let found = searcher.search(&request).unwrap();
    assert_eq!(
        found.map(|k| Des.normalize_key(&k)),
        Some(Des.normalize_key(&key)),
        "Exhaustive search missed the key"
    );

    // =============================================================================
    // 2. UNCLEARED PREFIX
    // =============================================================================

    if bits > 0 && !keyspace.is_cleared(&key) {
        let dirty = SearchRequest::new(key, plaintext, target, bits);
        assert!(matches!(
            searcher.search(&dirty),
            Err(SearchError::PrefixNotCleared)
        ));
    }
});
