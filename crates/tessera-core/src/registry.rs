//! # Instance Registry & Storage Aggregation
//!
//! One reconstruction pass over one storage:
//!
//! 1. Classify the record
//! 2. Metadata: hand it to the metadata hook, resolve nothing
//! 3. Otherwise resolve (or create) the instance named by the subject field
//! 4. Concept/Relation: append the built fragment; Unknown: append nothing
//! 5. Stamp the owning storage name on the instance
//!
//! The registry is owned by the pass and dropped with it. Every record that
//! shares a label lands on the same `Instance`, whatever the arrival order.

use crate::builder::EntityBuilder;
use crate::classifier::Classifier;
use crate::hook::MetadataHook;
use crate::schema::Schema;
use crate::{FormatError, Instance, Record, RecordKind, Storage, TesseraError};
use std::collections::BTreeMap;

// =============================================================================
// INSTANCE REGISTRY
// =============================================================================

/// Per-pass map from instance label to its single `Instance`.
#[derive(Debug, Default)]
pub struct InstanceRegistry {
    instances: BTreeMap<String, Instance>,
}

impl InstanceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the instance for `label`, creating an empty one on first use.
    pub fn resolve(&mut self, label: &str) -> &mut Instance {
        self.instances
            .entry(label.to_string())
            .or_insert_with(|| Instance::new(label))
    }

    #[must_use]
    pub fn get(&self, label: &str) -> Option<&Instance> {
        self.instances.get(label)
    }

    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        self.instances.contains_key(label)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Consume the registry, yielding instances in label order.
    pub fn into_instances(self) -> impl Iterator<Item = Instance> {
        self.instances.into_values()
    }
}

// =============================================================================
// STORAGE AGGREGATOR
// =============================================================================

/// Record counts per kind observed during one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassCounts {
    pub concepts: usize,
    pub relations: usize,
    pub metadata: usize,
    pub unknown: usize,
}

impl PassCounts {
    fn count(&mut self, kind: RecordKind) {
        let slot = match kind {
            RecordKind::Concept => &mut self.concepts,
            RecordKind::Relation => &mut self.relations,
            RecordKind::Metadata => &mut self.metadata,
            RecordKind::Unknown => &mut self.unknown,
        };
        *slot = slot.saturating_add(1);
    }

    /// Total records seen.
    #[must_use]
    pub fn total(&self) -> usize {
        self.concepts
            .saturating_add(self.relations)
            .saturating_add(self.metadata)
            .saturating_add(self.unknown)
    }
}

/// Drives one reconstruction pass and produces the final `Storage`.
pub struct StorageAggregator<'a> {
    storage_name: String,
    registry: InstanceRegistry,
    schema: &'a Schema,
    hook: &'a dyn MetadataHook,
    counts: PassCounts,
}

impl<'a> StorageAggregator<'a> {
    /// Start a pass over `storage_name` with the given (usually fresh)
    /// registry.
    pub fn new(
        storage_name: impl Into<String>,
        registry: InstanceRegistry,
        schema: &'a Schema,
        hook: &'a dyn MetadataHook,
    ) -> Self {
        Self {
            storage_name: storage_name.into(),
            registry,
            schema,
            hook,
            counts: PassCounts::default(),
        }
    }

    /// Fold one record into the pass.
    ///
    /// Returns the kind the record was classified as.
    ///
    /// # Errors
    /// `TesseraError::MalformedRecord` if a non-metadata record has no
    /// subject, or a concept record has an unparseable flag or score.
    pub fn absorb(&mut self, record: &Record) -> Result<RecordKind, TesseraError> {
        let kind = Classifier::classify(record, self.schema);
        self.counts.count(kind);

        if kind == RecordKind::Metadata {
            self.hook.on_metadata(&self.storage_name, record);
            return Ok(kind);
        }

        let subject_field = &self.schema.fields.subject;
        let Some(label) = record.get(subject_field) else {
            return Err(self.malformed(
                None,
                FormatError::MissingField {
                    field: subject_field.clone(),
                },
            ));
        };

        let fragment = EntityBuilder::build(kind, record, self.schema)
            .map_err(|source| self.malformed(Some(label), source))?;

        let instance = self.registry.resolve(label);
        if let Some(fragment) = fragment {
            instance.attach(fragment);
        }
        instance.set_storage_name(&self.storage_name);

        Ok(kind)
    }

    /// Record counts so far.
    #[must_use]
    pub fn counts(&self) -> PassCounts {
        self.counts
    }

    /// Close the pass and collect every resolved instance into a `Storage`.
    #[must_use]
    pub fn finish(self) -> Storage {
        let mut storage = Storage::new(self.storage_name);
        for instance in self.registry.into_instances() {
            storage.add_instance(instance);
        }
        storage
    }

    fn malformed(&self, subject: Option<&str>, source: FormatError) -> TesseraError {
        TesseraError::MalformedRecord {
            storage: self.storage_name.clone(),
            subject: subject.map(str::to_string),
            source,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hook::IgnoreMetadata;

    fn start<'a>(name: &str, schema: &'a Schema) -> StorageAggregator<'a> {
        StorageAggregator::new(name, InstanceRegistry::new(), schema, &IgnoreMetadata)
    }

    fn relation(subject: &str, predicate: &str, object: &str) -> Record {
        Record::new()
            .with("subject", subject)
            .with("record_type", "relation")
            .with("predicate", predicate)
            .with("object", object)
    }

    #[test]
    fn resolve_returns_same_instance() {
        let mut registry = InstanceRegistry::new();
        registry.resolve("alice").add_triple(crate::Triple::default());
        registry.resolve("alice").add_triple(crate::Triple::default());

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("alice").map(|i| i.triples().len()), Some(2));
    }

    #[test]
    fn metadata_resolves_nothing() {
        let schema = Schema::default();
        let mut pass = start("s", &schema);

        let kind = pass
            .absorb(&Record::new().with("subject", "meta").with("record_type", "metadata"))
            .expect("absorb");

        assert_eq!(kind, RecordKind::Metadata);
        assert!(pass.finish().is_empty());
    }

    #[test]
    fn metadata_without_subject_is_fine() {
        let schema = Schema::default();
        let mut pass = start("s", &schema);
        assert!(pass.absorb(&Record::new().with("record_type", "metadata")).is_ok());
    }

    #[test]
    fn unknown_kind_still_creates_instance() {
        let schema = Schema::default();
        let mut pass = start("s", &schema);

        pass.absorb(&Record::new().with("subject", "ghost").with("record_type", "other"))
            .expect("absorb");

        let storage = pass.finish();
        let ghost = storage.instance("ghost").expect("ghost instance");
        assert!(ghost.concepts().is_empty());
        assert!(ghost.triples().is_empty());
        assert_eq!(ghost.storage_name(), Some("s"));
    }

    #[test]
    fn records_merge_by_label() {
        let schema = Schema::default();
        let mut pass = start("people", &schema);

        pass.absorb(&relation("alice", "knows", "bob")).expect("absorb");
        pass.absorb(&relation("bob", "knows", "alice")).expect("absorb");
        pass.absorb(&relation("alice", "likes", "carol")).expect("absorb");

        assert_eq!(pass.counts().relations, 3);
        let storage = pass.finish();
        assert_eq!(storage.len(), 2);
        assert_eq!(storage.instance("alice").map(|i| i.triples().len()), Some(2));
        assert_eq!(storage.instance("bob").map(|i| i.triples().len()), Some(1));
    }

    #[test]
    fn missing_subject_is_malformed() {
        let schema = Schema::default();
        let mut pass = start("people", &schema);

        let err = pass
            .absorb(&Record::new().with("record_type", "relation"))
            .expect_err("no subject");
        assert!(matches!(
            err,
            TesseraError::MalformedRecord { ref storage, subject: None, ref source }
                if storage == "people" && source.field() == "subject"
        ));
    }

    #[test]
    fn bad_concept_names_subject() {
        let schema = Schema::default();
        let mut pass = start("people", &schema);
        let record = Record::new()
            .with("subject", "alice")
            .with("record_type", "concept")
            .with("object", "Person")
            .with("is_from_instance", "false")
            .with("concept_score", "abc");

        let err = pass.absorb(&record).expect_err("bad score");
        assert!(matches!(
            err,
            TesseraError::MalformedRecord { subject: Some(ref s), .. } if s == "alice"
        ));
    }

    #[test]
    fn hook_receives_metadata_records() {
        let schema = Schema::default();
        let seen = std::sync::atomic::AtomicUsize::new(0);
        let hook = |storage: &str, _: &Record| {
            assert_eq!(storage, "s");
            seen.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        };
        let mut pass = StorageAggregator::new("s", InstanceRegistry::new(), &schema, &hook);

        pass.absorb(&Record::new().with("record_type", "metadata")).expect("absorb");
        pass.absorb(&relation("a", "p", "b")).expect("absorb");
        pass.absorb(&Record::new().with("record_type", "metadata")).expect("absorb");

        assert_eq!(seen.load(std::sync::atomic::Ordering::SeqCst), 2);
        assert_eq!(pass.counts().total(), 3);
    }
}
