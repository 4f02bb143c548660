use bolero::check;
use keysweep::{
    BackendPreference, BlockCipherOracle, Des, Keyspace, SearchConfig, SearchRequest, Searcher,
};

#[test]
fn fuzz_search_recovers_key() {
    let searcher = Searcher::new(SearchConfig {
        backend: BackendPreference::Portable,
        threads: 1,
        ..SearchConfig::default()
    });

    check!()
        .with_type::<([u8; 8], [u8; 8], u8)>()
        .for_each(|(key, plaintext, bits)| {
            // Small regions keep each case cheap.
            let bits = u32::from(*bits % 7);
            let key = Des.normalize_key(key);
            let target = Des.encrypt(&key, plaintext);
            let prefix = Keyspace::new(bits).unwrap().clear(&key);

            let found = searcher
                .search(&SearchRequest::new(prefix, *plaintext, target, bits))
                .unwrap();

            // =============================================================================
            // VERIFICATION
            // =============================================================================

            let found = found.expect("Exhaustive search must find the key");
            assert_eq!(Des.normalize_key(&found), key);
            assert_eq!(Des.encrypt(&found, plaintext), target);
        });
}
