use bolero::check;
use keysweep::{Keyspace, MAX_UNKNOWN_BITS};

#[test]
fn fuzz_candidate_mapping() {
    check!()
        .with_type::<([u8; 8], u64, u8)>()
        .for_each(|(key, lane, bits)| {
            let bits = u32::from(*bits) % (MAX_UNKNOWN_BITS + 1);
            let keyspace = Keyspace::new(bits).unwrap();
            let prefix = keyspace.clear(key);
            let candidate = keyspace.candidate(&prefix, *lane);

            // Known bits are untouched, unknown bits carry the lane index.
            assert!(keyspace.is_cleared(&prefix));
            assert!(keyspace.contains(&prefix, &candidate));
            assert!(keyspace.contains(&prefix, key));
            assert_eq!(keyspace.clear(&candidate), prefix);
            assert_eq!(keyspace.lane_of(&candidate), lane & keyspace.mask());

            // The true key is explored by exactly its own lane.
            assert_eq!(keyspace.candidate(&prefix, keyspace.lane_of(key)), *key);
        });
}
