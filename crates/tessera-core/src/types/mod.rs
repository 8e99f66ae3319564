//! # Core Type Definitions
//!
//! This module contains all core types for Tessera reconstruction:
//! - Raw input (`Record`) and its classification (`RecordKind`)
//! - Annotations (`Concept`, `Triple`) and the `Fragment` that carries one
//! - Reconstructed entities (`Instance`, `Storage`)
//! - Error types (`FormatError`, `TesseraError`)
//!
//! ## Ordering Guarantees
//!
//! Instances inside a `Storage` and fields inside a `Record` are kept in
//! `BTreeMap`s, so iteration order is by key and never depends on the order
//! in which the source delivered records.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

// =============================================================================
// RECORD
// =============================================================================

/// A flat, field-keyed unit delivered by a record source.
///
/// Every field value is a string; numeric and boolean fields are carried in
/// their textual form and parsed by the entity builder.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Record {
    fields: BTreeMap<String, String>,
}

impl Record {
    /// Create an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field insertion.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Set a field, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Read a field by name.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Iterate over `(name, value)` pairs in name order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when the record carries no fields at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

// =============================================================================
// RECORD KIND
// =============================================================================

/// How a record is interpreted, selected by its record-type field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    /// Associates a concept with the subject instance.
    Concept,
    /// A relational edge whose subject is the instance.
    Relation,
    /// Collection-level metadata; never resolves an instance.
    Metadata,
    /// Any other tag value. Resolves the instance without annotating it.
    Unknown,
}

// =============================================================================
// CONCEPT
// =============================================================================

/// A categorical annotation attached to an instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Concept {
    label: String,
    from_instance: bool,
    score: f64,
    processed_label: Option<String>,
}

impl Concept {
    /// Create a concept with a zero score and no processed label.
    #[must_use]
    pub fn new(label: impl Into<String>, from_instance: bool) -> Self {
        Self {
            label: label.into(),
            from_instance,
            score: 0.0,
            processed_label: None,
        }
    }

    /// Builder-style score assignment.
    #[must_use]
    pub fn with_score(mut self, score: f64) -> Self {
        self.score = score;
        self
    }

    /// The raw concept label as found in the record.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether the concept was derived from another instance rather than
    /// being a literal or external concept.
    #[must_use]
    pub fn is_from_instance(&self) -> bool {
        self.from_instance
    }

    /// Confidence score.
    #[must_use]
    pub fn score(&self) -> f64 {
        self.score
    }

    /// The normalized label, once set.
    #[must_use]
    pub fn processed_label(&self) -> Option<&str> {
        self.processed_label.as_deref()
    }

    /// Set the normalized label. This is the only mutation allowed after
    /// construction.
    pub fn update_processed_label(&mut self, processed: Option<String>) {
        self.processed_label = processed;
    }
}

// =============================================================================
// TRIPLE
// =============================================================================

/// A directed relational edge. Each part is absent when the source record
/// omitted the corresponding field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Triple {
    pub subject: Option<String>,
    pub normalized_subject: Option<String>,
    pub predicate: Option<String>,
    pub object: Option<String>,
    pub normalized_object: Option<String>,
}

impl Triple {
    /// Create a triple from its five parts.
    #[must_use]
    pub fn new(
        subject: Option<String>,
        normalized_subject: Option<String>,
        predicate: Option<String>,
        object: Option<String>,
        normalized_object: Option<String>,
    ) -> Self {
        Self {
            subject,
            normalized_subject,
            predicate,
            object,
            normalized_object,
        }
    }
}

// =============================================================================
// FRAGMENT
// =============================================================================

/// The typed value one classified record contributes to its instance.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    Concept(Concept),
    Triple(Triple),
}

// =============================================================================
// INSTANCE
// =============================================================================

/// A uniquely labelled entity within a storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    label: String,
    storage_name: Option<String>,
    concepts: Vec<Concept>,
    triples: Vec<Triple>,
}

impl Instance {
    /// Create an instance with no annotations and no owning storage yet.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            storage_name: None,
            concepts: Vec::new(),
            triples: Vec::new(),
        }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Name of the owning storage, once a record has been attached.
    #[must_use]
    pub fn storage_name(&self) -> Option<&str> {
        self.storage_name.as_deref()
    }

    /// Assign the owning storage. The first assignment wins; repeating it is
    /// a no-op.
    pub fn set_storage_name(&mut self, name: &str) {
        if self.storage_name.is_none() {
            self.storage_name = Some(name.to_string());
        }
    }

    /// Concepts in arrival order.
    #[must_use]
    pub fn concepts(&self) -> &[Concept] {
        &self.concepts
    }

    /// Relational triples in arrival order.
    #[must_use]
    pub fn triples(&self) -> &[Triple] {
        &self.triples
    }

    /// Concepts whose derived-from-instance flag is set.
    pub fn concepts_from_instances(&self) -> impl Iterator<Item = &Concept> {
        self.concepts.iter().filter(|c| c.is_from_instance())
    }

    pub fn add_concept(&mut self, concept: Concept) {
        self.concepts.push(concept);
    }

    pub fn add_triple(&mut self, triple: Triple) {
        self.triples.push(triple);
    }

    /// Append a fragment to the matching sequence.
    pub fn attach(&mut self, fragment: Fragment) {
        match fragment {
            Fragment::Concept(concept) => self.add_concept(concept),
            Fragment::Triple(triple) => self.add_triple(triple),
        }
    }
}

// =============================================================================
// STORAGE
// =============================================================================

/// A named collection of reconstructed instances, keyed by label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Storage {
    name: String,
    instances: BTreeMap<String, Instance>,
}

impl Storage {
    /// Create an empty storage.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instances: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Insert an instance unless one with the same label is already present.
    ///
    /// Returns `true` when the instance was inserted.
    pub fn add_instance(&mut self, instance: Instance) -> bool {
        if self.instances.contains_key(instance.label()) {
            return false;
        }
        self.instances.insert(instance.label().to_string(), instance);
        true
    }

    #[must_use]
    pub fn instance(&self, label: &str) -> Option<&Instance> {
        self.instances.get(label)
    }

    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        self.instances.contains_key(label)
    }

    /// Instances in label order.
    pub fn instances(&self) -> impl Iterator<Item = &Instance> {
        self.instances.values()
    }

    /// Instance labels in order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.instances.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// A field of a single record could not be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// A required field is absent.
    #[error("missing field '{field}'")]
    MissingField { field: String },

    /// The field is not `true` or `false` (case-insensitive).
    #[error("field '{field}' is not a boolean: {value:?}")]
    InvalidBoolean { field: String, value: String },

    /// The field is not a finite floating-point number.
    #[error("field '{field}' is not a finite number: {value:?}")]
    InvalidNumber { field: String, value: String },
}

impl FormatError {
    /// Name of the offending field.
    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            Self::MissingField { field }
            | Self::InvalidBoolean { field, .. }
            | Self::InvalidNumber { field, .. } => field,
        }
    }
}

/// Errors that can occur in Tessera.
///
/// - Not-found is never an error; lookups return `Ok(None)`
/// - The CORE never panics; all errors are recoverable
#[derive(Debug, Error)]
pub enum TesseraError {
    /// A record in a reconstruction pass is malformed. The pass is aborted.
    #[error("Malformed record in storage '{storage}' (subject {subject:?}): {source}")]
    MalformedRecord {
        storage: String,
        subject: Option<String>,
        #[source]
        source: FormatError,
    },

    /// A record was rejected before being loaded into a source.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// The schema configuration is unusable.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A serialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A deserialization error occurred.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    /// An I/O or storage engine error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

// =============================================================================
// TESTS
// =============================================================================
