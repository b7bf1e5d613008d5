// tests/property/listing_test.rs

//! Property-based tests for directory listings and name lookup

use ftserve::core::directory::{Lookup, find_entry, format_listing, list_entries};
use proptest::prelude::*;
use std::collections::BTreeSet;

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 50,
        ..ProptestConfig::default()
    })]

    #[test]
    fn test_listing_contains_every_entry_once(
        names in prop::collection::btree_set("[a-zA-Z0-9_][a-zA-Z0-9_.-]{0,20}", 0..20)
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let dir = tempfile::TempDir::new().unwrap();
            for name in &names {
                std::fs::write(dir.path().join(name), name.as_bytes()).unwrap();
            }

            let entries = list_entries(dir.path()).await.unwrap();
            let expected: Vec<String> = names.iter().cloned().collect();
            assert_eq!(entries, expected);

            let listing = format_listing(&entries);
            let expected_listing: String = names.iter().map(|n| format!("[{n}] ")).collect();
            assert_eq!(listing, expected_listing);
        });
    }

    #[test]
    fn test_lookup_matches_only_existing_names(
        names in prop::collection::btree_set("[a-z]{1,8}(\\.[a-z]{1,3})?", 1..10),
        probe in "[a-z]{1,8}(\\.[a-z]{1,3})?"
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let dir = tempfile::TempDir::new().unwrap();
            for name in &names {
                std::fs::write(dir.path().join(name), b"x").unwrap();
            }

            let names: BTreeSet<String> = names;
            let lookup = find_entry(dir.path(), &probe).await.unwrap();
            if names.contains(&probe) {
                assert!(matches!(lookup, Lookup::File { len: 1, .. }));
            } else {
                assert_eq!(lookup, Lookup::Missing);
            }
        });
    }
}
