//! End-to-end lookups through the factory, providers and aggregator

mod common;

use common::{LookupHarness, TIMEDATE_URL};
use decronym_core::cache::{CacheStore, cache_path_for};
use decronym_core::{
    Aggregator, Outcome, ProviderDescriptor, ProviderKind, ProviderStatus, Record,
};
use decronym_test_utils::{DefinitionFileBuilder, fixtures, record, tagged_record};
use proptest::prelude::*;

#[tokio::test]
async fn test_local_file_is_case_insensitive() {
    let harness = LookupHarness::new();
    let path = DefinitionFileBuilder::new()
        .define("DMA", "Direct Memory Access")
        .write_to(harness.dir.path(), "defs.json");
    let provider = harness.provider(ProviderKind::JsonFile, &path.display().to_string());

    for key in ["dma", "DMA", "Dma"] {
        let records = provider.find_exact(key).await;
        assert_eq!(records.len(), 1, "lookup of {key}");
        assert_eq!(records[0].full(), "Direct Memory Access");
        assert_eq!(records[0].acronym(), "DMA");
    }
}

#[tokio::test]
async fn test_batch_keeps_registration_order() {
    let harness = LookupHarness::new();
    let first = DefinitionFileBuilder::new()
        .define("API", "Application Programming Interface")
        .write_to(harness.dir.path(), "first.json");
    let second = DefinitionFileBuilder::new()
        .define("API", "Academic Performance Index")
        .write_to(harness.dir.path(), "second.json");

    let providers = harness.factory().from_descriptors([
        ProviderDescriptor::new(ProviderKind::JsonFile, first.display().to_string()),
        ProviderDescriptor::new(ProviderKind::JsonFile, second.display().to_string()),
    ]);
    let mut aggregator = Aggregator::new(providers);
    aggregator.request(&["API"]).await;

    let fulls: Vec<_> = aggregator.matches("API").iter().map(Record::full).collect();
    assert_eq!(
        fulls,
        vec!["Application Programming Interface", "Academic Performance Index"]
    );
}

#[tokio::test]
async fn test_tag_filter_moves_one_record() {
    let harness = LookupHarness::new();
    let first = DefinitionFileBuilder::new()
        .define_with("API", "Application Programming Interface", "", &["deprecated"])
        .write_to(harness.dir.path(), "first.json");
    let second = DefinitionFileBuilder::new()
        .define("API", "Academic Performance Index")
        .write_to(harness.dir.path(), "second.json");

    let providers = harness.factory().from_descriptors([
        ProviderDescriptor::new(ProviderKind::JsonFile, first.display().to_string()),
        ProviderDescriptor::new(ProviderKind::JsonFile, second.display().to_string()),
    ]);
    let mut aggregator = Aggregator::new(providers);
    aggregator.request(&["API"]).await;
    // Records sharing no tag with the filter move, so the untagged one goes
    aggregator.filter_by_tags(&["deprecated"]);

    assert_eq!(aggregator.matches("API").len(), 1);
    assert_eq!(aggregator.matches("API")[0].full(), "Application Programming Interface");
    assert_eq!(aggregator.filtered("API").len(), 1);
    assert_eq!(aggregator.filtered("API")[0].full(), "Academic Performance Index");
}

#[tokio::test]
async fn test_suggestions_come_from_cache_only() {
    let harness = LookupHarness::new();
    let mut seeded = CacheStore::new(cache_path_for(&harness.cache_dir(), TIMEDATE_URL));
    seeded.add([
        record("XYY", "Somewhere Standard Time"),
        record("XZZ", "Elsewhere Daylight Time"),
    ]);
    assert!(seeded.save().unwrap());

    let provider = harness.provider(ProviderKind::TimeDate, TIMEDATE_URL);

    assert!(provider.find_exact("XYZ").await.is_empty());
    let calls = harness.transport.get_count();
    assert_eq!(calls, 1);

    let suggestions = provider.find_similar("XYZ").await;
    assert_eq!(suggestions, vec!["XYY", "XZZ"]);
    assert_eq!(harness.transport.get_count(), calls);
    assert_eq!(harness.transport.head_count(), 0);
}

#[tokio::test]
async fn test_not_found_outcome_lists_suggestions() {
    let harness = LookupHarness::new();
    let mut seeded = CacheStore::new(cache_path_for(&harness.cache_dir(), TIMEDATE_URL));
    seeded.add([record("XYY", "Somewhere Standard Time"), record("XZZ", "Elsewhere Time")]);
    seeded.save().unwrap();

    let mut aggregator = Aggregator::new(harness.factory().from_descriptors([
        ProviderDescriptor::new(ProviderKind::TimeDate, TIMEDATE_URL),
    ]));
    aggregator.request(&["XYZ"]).await;

    match aggregator.outcome("XYZ") {
        Outcome::NotFound { suggestions } => assert_eq!(suggestions, ["XYY", "XZZ"]),
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(harness.transport.get_count(), 1);
}

#[tokio::test]
async fn test_second_batch_is_served_from_disk_cache() {
    let harness = LookupHarness::new();
    harness.transport.respond_ok(
        &format!("{TIMEDATE_URL}cet"),
        &fixtures::timezone_page("Central European Time"),
    );

    let descriptor = ProviderDescriptor::new(ProviderKind::TimeDate, TIMEDATE_URL);
    let mut aggregator = Aggregator::new(harness.factory().from_descriptors([descriptor.clone()]));
    aggregator.request(&["CET"]).await;
    assert_eq!(aggregator.matches("CET").len(), 1);

    // A new session reads the flushed cache file instead of the network
    let mut aggregator = Aggregator::new(harness.factory().from_descriptors([descriptor]));
    aggregator.request(&["cet"]).await;
    assert_eq!(aggregator.matches("cet")[0].full(), "Central European Time");
    assert_eq!(harness.transport.calls_to(&format!("{TIMEDATE_URL}cet")), 1);
}

#[tokio::test]
async fn test_directory_tree_merges_files() {
    let harness = LookupHarness::new();
    let root = harness.dir.path().join("defs");
    DefinitionFileBuilder::new()
        .with_meta_tag("hardware")
        .define("DMA", "Direct Memory Access")
        .write_to(&root, "a.json");
    DefinitionFileBuilder::new()
        .define("DMA", "Dimethylamine")
        .write_to(&root, "chem/b.json");
    std::fs::write(root.join("broken.json"), "{ not json").unwrap();
    std::fs::write(root.join("notes.txt"), "DMA is fun").unwrap();

    let provider = harness.provider(ProviderKind::JsonPath, &root.display().to_string());
    let records = provider.find_exact("dma").await;

    assert_eq!(records.len(), 2);
    assert!(records.iter().any(|r| r.tags().contains("hardware")));
}

#[tokio::test]
async fn test_disabled_provider_returns_nothing() {
    let harness = LookupHarness::new();
    let path = DefinitionFileBuilder::new()
        .define("DMA", "Direct Memory Access")
        .write_to(harness.dir.path(), "defs.json");

    let providers = harness.factory().from_descriptors([ProviderDescriptor::new(
        ProviderKind::JsonFile,
        path.display().to_string(),
    )
    .with_enabled(false)]);
    assert_eq!(providers.len(), 1);

    let mut aggregator = Aggregator::new(providers);
    aggregator.request(&["DMA"]).await;
    assert!(matches!(
        aggregator.outcome("DMA"),
        Outcome::NotFound { suggestions } if suggestions.is_empty()
    ));
}

#[tokio::test]
async fn test_missing_local_file_is_invalid() {
    let harness = LookupHarness::new();
    let provider = harness.provider(ProviderKind::JsonFile, "/nonexistent/defs.json");

    assert!(provider.find("DMA", true, true).await.is_empty());
    assert_eq!(provider.status(), ProviderStatus::Invalid);
}

fn arb_record() -> impl Strategy<Value = Record> {
    (
        "[A-Z]{2,4}",
        "[A-Za-z ]{1,12}[a-z]",
        prop::collection::vec(prop::sample::select(vec!["web", "old", "med", "hw"]), 0..3),
    )
        .prop_map(|(acronym, full, tags)| tagged_record(&acronym, &full, &tags))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_tag_filter_partitions_matches(
        records in prop::collection::vec(arb_record(), 0..12),
        tags in prop::collection::vec(prop::sample::select(vec!["web", "old", "med", "hw"]), 0..3),
    ) {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let harness = LookupHarness::new();

        let builder = records.iter().fold(DefinitionFileBuilder::new(), |b, r| {
            let tags: Vec<&str> = r.tags().iter().map(String::as_str).collect();
            b.define_with("KEY", r.full(), "", &tags)
        });
        let path = builder.write_to(harness.dir.path(), "defs.json");

        let mut aggregator = Aggregator::new(harness.factory().from_descriptors([
            ProviderDescriptor::new(ProviderKind::JsonFile, path.display().to_string()),
        ]));
        runtime.block_on(aggregator.request(&["KEY"]));
        let before: Vec<Record> = aggregator.matches("KEY").to_vec();

        aggregator.filter_by_tags(&tags);
        let kept = aggregator.matches("KEY");
        let moved = aggregator.filtered("KEY");

        prop_assert_eq!(kept.len() + moved.len(), before.len());
        if tags.is_empty() {
            prop_assert!(moved.is_empty());
        } else {
            prop_assert!(kept.iter().all(|r| r.has_any_tag(&tags)));
            prop_assert!(moved.iter().all(|r| !r.has_any_tag(&tags)));
        }
        prop_assert!(before.iter().all(|r| kept.contains(r) || moved.contains(r)));
    }
}
