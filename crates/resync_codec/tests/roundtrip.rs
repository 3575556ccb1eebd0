//! Encode/decode properties of the sitemap codec.

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;
use resync_codec::{
    decode_inventory, encode_inventory, encode_inventory_at, parse_document, CodecError,
    EncodedInventory, SitemapConfig, SitemapDocument,
};
use resync_core::{Inventory, Resource};

fn lastmod_strategy() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..4_000_000_000).prop_map(|secs| Utc.timestamp_opt(secs, 0).unwrap())
}

fn resource_strategy() -> impl Strategy<Value = Resource> {
    (
        prop::string::string_regex("[a-z0-9_/.-]{1,24}").expect("Invalid regex"),
        prop::option::of(lastmod_strategy()),
        prop::option::of(any::<u64>()),
        prop::option::of(prop::string::string_regex("[0-9a-f]{32}").expect("Invalid regex")),
    )
        .prop_map(|(path, lastmod, size, md5)| {
            let mut resource = Resource::new(format!("http://example.org/{path}")).unwrap();
            if let Some(lastmod) = lastmod {
                resource = resource.with_lastmod(lastmod);
            }
            if let Some(size) = size {
                resource = resource.with_size(size);
            }
            if let Some(md5) = md5 {
                resource = resource.with_md5(md5);
            }
            resource
        })
}

fn single(encoded: EncodedInventory) -> Vec<u8> {
    match encoded {
        EncodedInventory::Single(bytes) => bytes,
        EncodedInventory::Multi { .. } => panic!("expected a single document"),
    }
}

fn assert_same(left: &Inventory, right: &Inventory) {
    assert_eq!(left.len(), right.len());
    for (a, b) in left.iter().zip(right.iter()) {
        assert!(a.same_fields(b), "{a:?} != {b:?}");
    }
}

proptest! {
    #[test]
    fn accepted_uris_survive_a_round_trip(
        path in prop::string::string_regex("[ \t\na-z/.-]{1,16}").expect("Invalid regex"),
    ) {
        let uri = format!("http://example.org/{path}");
        match Resource::new(uri.as_str()) {
            Ok(resource) => {
                prop_assert!(!uri.chars().any(char::is_whitespace));
                let inventory: Inventory = std::iter::once(resource).collect();
                let bytes = single(
                    encode_inventory(&inventory, &SitemapConfig::default(), "s.xml").unwrap(),
                );
                let decoded = decode_inventory(&bytes).unwrap();
                prop_assert_eq!(decoded.uris().collect::<Vec<_>>(), vec![uri.as_str()]);
            }
            Err(_) => prop_assert!(uri.chars().any(char::is_whitespace)),
        }
    }

    #[test]
    fn inventory_round_trips(
        resources in prop::collection::vec(resource_strategy(), 0..40),
        pretty in any::<bool>(),
    ) {
        let inventory: Inventory = resources.into_iter().collect();
        let config = SitemapConfig::new().pretty(pretty);
        let bytes = single(encode_inventory(&inventory, &config, "sitemap.xml").unwrap());

        let decoded = decode_inventory(&bytes).unwrap();
        assert_same(&inventory, &decoded);
    }

    #[test]
    fn entries_are_emitted_in_uri_order(
        resources in prop::collection::vec(resource_strategy(), 1..40),
    ) {
        // Insert in reverse to make sure order does not follow insertion
        let inventory: Inventory = resources.into_iter().rev().collect();
        let bytes =
            single(encode_inventory(&inventory, &SitemapConfig::default(), "s.xml").unwrap());
        let xml = String::from_utf8(bytes).unwrap();

        let locs: Vec<&str> = xml
            .split("<loc>")
            .skip(1)
            .filter_map(|s| s.split("</loc>").next())
            .collect();
        let mut sorted = locs.clone();
        sorted.sort_unstable();
        prop_assert_eq!(locs, sorted);
    }

    #[test]
    fn split_children_partition_inventory(
        resources in prop::collection::vec(resource_strategy(), 1..60),
        cap in 1usize..8,
    ) {
        let inventory: Inventory = resources.into_iter().collect();
        let config = SitemapConfig::new().max_entries(cap).allow_multi_file(true);

        match encode_inventory(&inventory, &config, "sitemap.xml").unwrap() {
            EncodedInventory::Single(_) => prop_assert!(inventory.len() <= cap),
            EncodedInventory::Multi { children, .. } => {
                prop_assert!(inventory.len() > cap);
                prop_assert_eq!(children.len(), inventory.len().div_ceil(cap));

                let mut merged = Inventory::new();
                for child in &children {
                    prop_assert!(child.entries <= cap);
                    merged.merge(decode_inventory(&child.bytes).unwrap());
                }
                assert_same(&inventory, &merged);
            }
        }
    }
}

#[test]
fn cap_plus_one_gives_two_children_and_an_index() {
    let cap = 4;
    let inventory: Inventory = (0..=cap)
        .map(|i| Resource::new(format!("http://example.org/t/{i}")).unwrap())
        .collect();
    let config = SitemapConfig::new()
        .max_entries(cap)
        .allow_multi_file(true)
        .with_mapping("/srv/sitemaps", "http://example.org/sitemaps");
    let now = Utc.with_ymd_and_hms(2012, 3, 14, 21, 46, 4).unwrap();

    let encoded =
        encode_inventory_at(&inventory, &config, "/srv/sitemaps/sitemap.xml", now).unwrap();
    let EncodedInventory::Multi {
        index, children, ..
    } = encoded
    else {
        panic!("expected multi-file output");
    };

    let counts: Vec<usize> = children.iter().map(|c| c.entries).collect();
    assert_eq!(counts, vec![cap, 1]);

    // The index decodes as an index and is refused as a leaf
    let SitemapDocument::Index(parsed) = parse_document(&index).unwrap() else {
        panic!("expected index");
    };
    assert_eq!(parsed.len(), 2);
    assert!(parsed.entries().iter().all(|e| e.lastmod == now));
    assert!(matches!(
        decode_inventory(&index),
        Err(CodecError::UnexpectedIndex(_))
    ));
}
