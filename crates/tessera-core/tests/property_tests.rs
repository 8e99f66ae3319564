//! # Property-Based Tests
//!
//! Order independence and completeness of reconstruction.

use proptest::collection::vec;
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use tessera_core::{MemorySource, Navigator, Record, Storage};

/// Sorted `(concepts, triples)` signature per instance label.
type Signature = BTreeMap<String, (Vec<String>, Vec<String>)>;

fn signature(storage: &Storage) -> Signature {
    storage
        .instances()
        .map(|instance| {
            let mut concepts: Vec<String> = instance
                .concepts()
                .iter()
                .map(|c| format!("{}:{}:{}", c.label(), c.is_from_instance(), c.score()))
                .collect();
            concepts.sort();
            let mut triples: Vec<String> = instance
                .triples()
                .iter()
                .map(|t| format!("{:?}", t))
                .collect();
            triples.sort();
            (instance.label().to_string(), (concepts, triples))
        })
        .collect()
}

/// A record over a small label alphabet so labels collide often.
fn arb_record() -> impl Strategy<Value = Record> {
    let label = prop::sample::select(vec!["a", "b", "c", "d"]);
    let kind = prop::sample::select(vec!["concept", "relation", "metadata", "other"]);
    (label, kind, 0u32..100, any::<bool>(), prop::sample::select(vec!["x", "y", "z"])).prop_map(
        |(subject, kind, score, from_instance, object)| {
            Record::new()
                .with("subject", subject)
                .with("record_type", kind)
                .with("predicate", "rel")
                .with("object", object)
                .with("is_from_instance", from_instance.to_string())
                .with("concept_score", format!("0.{:02}", score))
        },
    )
}

fn reconstruct(records: Vec<Record>) -> Storage {
    Navigator::new(MemorySource::new().with_collection("s", records))
        .retrieve_storage("s")
        .expect("retrieve")
        .expect("storage")
}

proptest! {
    /// Any permutation of the same records yields the same instances with
    /// the same annotation multisets.
    #[test]
    fn reconstruction_is_order_independent(
        (records, shuffled) in vec(arb_record(), 0..40).prop_flat_map(|records| {
            let shuffled = Just(records.clone()).prop_shuffle();
            (Just(records), shuffled)
        })
    ) {
        let original = reconstruct(records);
        let permuted = reconstruct(shuffled);
        prop_assert_eq!(signature(&original), signature(&permuted));
    }

    /// An instance exists iff some non-metadata record names it as subject.
    #[test]
    fn instances_are_exactly_non_metadata_subjects(records in vec(arb_record(), 0..40)) {
        let expected: BTreeSet<String> = records
            .iter()
            .filter(|r| r.get("record_type") != Some("metadata"))
            .filter_map(|r| r.get("subject").map(str::to_string))
            .collect();

        let storage = reconstruct(records);
        let actual: BTreeSet<String> = storage.labels().map(str::to_string).collect();
        prop_assert_eq!(actual, expected);
    }

    /// Concept and triple counts equal the number of matching records.
    #[test]
    fn annotation_counts_match_records(records in vec(arb_record(), 0..40)) {
        let concepts = records.iter().filter(|r| r.get("record_type") == Some("concept")).count();
        let relations = records.iter().filter(|r| r.get("record_type") == Some("relation")).count();

        let storage = reconstruct(records);
        let got_concepts: usize = storage.instances().map(|i| i.concepts().len()).sum();
        let got_triples: usize = storage.instances().map(|i| i.triples().len()).sum();
        prop_assert_eq!(got_concepts, concepts);
        prop_assert_eq!(got_triples, relations);
    }

    /// `retrieve_storages` returns exactly one storage per listed name.
    #[test]
    fn one_storage_per_listed_name(names in prop::collection::btree_set("[a-z]{1,8}", 0..8)) {
        let mut source = MemorySource::new();
        for name in &names {
            source.push(name, Record::new().with("subject", "x").with("record_type", "relation"));
        }
        let navigator = Navigator::new(source);

        let listed: BTreeSet<String> = navigator.list_storage_names().expect("list").into_iter().collect();
        let storages = navigator.retrieve_storages().expect("storages");
        let retrieved: BTreeSet<String> = storages.iter().map(|s| s.name().to_string()).collect();

        prop_assert_eq!(storages.len(), listed.len());
        prop_assert_eq!(retrieved, listed);
    }
}
