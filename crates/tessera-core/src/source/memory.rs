//! In-memory record source.

use super::{RecordSource, RecordStream};
use crate::{Record, TesseraError};
use std::collections::BTreeMap;

/// Collections held in memory. Records keep their insertion order;
/// collections are listed by name.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    collections: BTreeMap<String, Vec<Record>>,
}

impl MemorySource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style collection registration. Replaces an existing
    /// collection of the same name.
    #[must_use]
    pub fn with_collection(mut self, name: impl Into<String>, records: Vec<Record>) -> Self {
        self.collections.insert(name.into(), records);
        self
    }

    /// Append a record, creating the collection if needed.
    pub fn push(&mut self, collection: &str, record: Record) {
        self.collections
            .entry(collection.to_string())
            .or_default()
            .push(record);
    }

    /// Number of records in a collection, if it exists.
    #[must_use]
    pub fn record_count(&self, collection: &str) -> Option<usize> {
        self.collections.get(collection).map(Vec::len)
    }
}

impl RecordSource for MemorySource {
    fn list_collections(&self) -> Result<Vec<String>, TesseraError> {
        Ok(self.collections.keys().cloned().collect())
    }

    fn scan(&self, collection: &str) -> Result<Option<RecordStream<'_>>, TesseraError> {
        Ok(self.collections.get(collection).map(|records| {
            Box::new(records.iter().cloned().map(Ok)) as RecordStream<'_>
        }))
    }
}
