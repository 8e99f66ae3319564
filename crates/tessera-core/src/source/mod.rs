//! # Record Sources
//!
//! Where records come from. A source exposes named collections, each an
//! ordered stream of flat records.
//!
//! - `MemorySource`: ordered in-memory collections
//! - `RedbSource`: disk-backed collections in a redb database
//!
//! Sources only read during reconstruction. Loading raw records into a
//! source is a separate, validated operation (`RedbSource::ingest_batch`).

mod memory;
mod redb_source;

pub use memory::MemorySource;
pub use redb_source::RedbSource;

use crate::primitives::{MAX_COLLECTION_NAME_LENGTH, MAX_FIELD_NAME_LENGTH, MAX_FIELD_VALUE_LENGTH};
use crate::{Record, TesseraError};

/// A lazy, fallible sequence of records from one collection.
pub type RecordStream<'a> = Box<dyn Iterator<Item = Result<Record, TesseraError>> + 'a>;

/// The contract every record source fulfils.
///
/// Missing collections are not errors: `scan` returns `Ok(None)` and
/// `find_first` returns `Ok(None)`.
pub trait RecordSource: Send + Sync {
    /// Names of all collections.
    fn list_collections(&self) -> Result<Vec<String>, TesseraError>;

    /// Stream every record of a collection in source order.
    fn scan(&self, collection: &str) -> Result<Option<RecordStream<'_>>, TesseraError>;

    /// First record (in source order) whose `field` equals `value`.
    fn find_first(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Option<Record>, TesseraError> {
        let Some(records) = self.scan(collection)? else {
            return Ok(None);
        };
        for record in records {
            let record = record?;
            if record.get(field) == Some(value) {
                return Ok(Some(record));
            }
        }
        Ok(None)
    }
}

impl<S: RecordSource + ?Sized> RecordSource for Box<S> {
    fn list_collections(&self) -> Result<Vec<String>, TesseraError> {
        (**self).list_collections()
    }

    fn scan(&self, collection: &str) -> Result<Option<RecordStream<'_>>, TesseraError> {
        (**self).scan(collection)
    }

    fn find_first(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Option<Record>, TesseraError> {
        (**self).find_first(collection, field, value)
    }
}

impl<S: RecordSource + ?Sized> RecordSource for &S {
    fn list_collections(&self) -> Result<Vec<String>, TesseraError> {
        (**self).list_collections()
    }

    fn scan(&self, collection: &str) -> Result<Option<RecordStream<'_>>, TesseraError> {
        (**self).scan(collection)
    }

    fn find_first(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Option<Record>, TesseraError> {
        (**self).find_first(collection, field, value)
    }
}

// =============================================================================
// VALIDATION
// =============================================================================

/// Validate a collection name before creating or writing to it.
pub fn validate_collection_name(name: &str) -> Result<(), TesseraError> {
    if name.is_empty() {
        return Err(TesseraError::InvalidRecord(
            "collection name is empty".to_string(),
        ));
    }
    if name.len() > MAX_COLLECTION_NAME_LENGTH {
        return Err(TesseraError::InvalidRecord(format!(
            "collection name length {} exceeds maximum {} bytes",
            name.len(),
            MAX_COLLECTION_NAME_LENGTH
        )));
    }
    Ok(())
}

/// Validate a record before it is loaded into a source.
///
/// A record is valid if:
/// - It has at least one field
/// - Every field name is non-empty and within length limits
/// - Every value is within length limits (empty values are allowed)
pub fn validate_record(record: &Record) -> Result<(), TesseraError> {
    if record.is_empty() {
        return Err(TesseraError::InvalidRecord("record has no fields".to_string()));
    }

    for (name, value) in record.fields() {
        if name.is_empty() {
            return Err(TesseraError::InvalidRecord("empty field name".to_string()));
        }
        if name.len() > MAX_FIELD_NAME_LENGTH {
            return Err(TesseraError::InvalidRecord(format!(
                "field name length {} exceeds maximum {} bytes",
                name.len(),
                MAX_FIELD_NAME_LENGTH
            )));
        }
        if value.len() > MAX_FIELD_VALUE_LENGTH {
            return Err(TesseraError::InvalidRecord(format!(
                "value of field '{}' exceeds maximum {} bytes",
                name, MAX_FIELD_VALUE_LENGTH
            )));
        }
    }

    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_empty_record() {
        assert!(validate_record(&Record::new()).is_err());
    }

    #[test]
    fn validate_rejects_empty_field_name() {
        assert!(validate_record(&Record::new().with("", "x")).is_err());
    }

    #[test]
    fn validate_rejects_oversized_value() {
        let value = "x".repeat(MAX_FIELD_VALUE_LENGTH + 1);
        assert!(validate_record(&Record::new().with("subject", value)).is_err());
    }

    #[test]
    fn validate_accepts_empty_value() {
        assert!(validate_record(&Record::new().with("normalized_object", "")).is_ok());
    }

    #[test]
    fn collection_name_limits() {
        assert!(validate_collection_name("people").is_ok());
        assert!(validate_collection_name("").is_err());
        assert!(validate_collection_name(&"c".repeat(MAX_COLLECTION_NAME_LENGTH + 1)).is_err());
    }

    #[test]
    fn boxed_source_delegates() {
        let source: Box<dyn RecordSource> = Box::new(
            MemorySource::new().with_collection("people", vec![Record::new().with("subject", "a")]),
        );
        assert_eq!(source.list_collections().expect("list"), vec!["people"]);
        assert!(source.find_first("people", "subject", "a").expect("find").is_some());
    }

    #[test]
    fn borrowed_source_delegates() {
        fn names(source: impl RecordSource) -> Vec<String> {
            source.list_collections().expect("list")
        }

        let source = MemorySource::new().with_collection("people", Vec::new());
        assert_eq!(names(&source), vec!["people"]);
        assert_eq!(source.record_count("people"), Some(0));
    }
}
