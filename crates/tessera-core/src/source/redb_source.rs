//! # redb-backed Record Source
//!
//! A disk-backed record store using the redb embedded database.
//!
//! Each collection is one redb table:
//! - key: `u64` arrival sequence, starting at `FIRST_RECORD_KEY`
//! - value: postcard-encoded `Record`
//!
//! Scans iterate in key order, which is the order records were ingested.

use super::{RecordSource, RecordStream, validate_collection_name, validate_record};
use crate::primitives::{FIRST_RECORD_KEY, MAX_BATCH_LENGTH};
use crate::{Record, TesseraError};
use redb::{
    Database, Range, ReadOnlyTable, ReadableDatabase, ReadableTable, ReadableTableMetadata,
    TableDefinition, TableError, TableHandle,
};
use std::path::Path;

/// Table definition for a named collection.
fn collection_table(name: &str) -> TableDefinition<'_, u64, &'static [u8]> {
    TableDefinition::new(name)
}

fn io_error(e: impl std::fmt::Display) -> TesseraError {
    TesseraError::IoError(e.to_string())
}

fn decode(bytes: &[u8]) -> Result<Record, TesseraError> {
    postcard::from_bytes(bytes).map_err(|e| TesseraError::DeserializationError(e.to_string()))
}

/// Records of one collection, decoded one at a time in key order.
///
/// Owns the table so its read transaction stays open until the stream is
/// dropped.
struct CollectionStream {
    _table: ReadOnlyTable<u64, &'static [u8]>,
    entries: Range<'static, u64, &'static [u8]>,
}

impl Iterator for CollectionStream {
    type Item = Result<Record, TesseraError>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.entries.next()?;
        Some(
            entry
                .map_err(io_error)
                .and_then(|(_, value)| decode(value.value())),
        )
    }
}

/// A record source persisted in a redb database file.
pub struct RedbSource {
    db: Database,
}

impl std::fmt::Debug for RedbSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbSource").finish_non_exhaustive()
    }
}

impl RedbSource {
    /// Open or create a record database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TesseraError> {
        let db = Database::create(path.as_ref()).map_err(io_error)?;
        Ok(Self { db })
    }

    /// Compact the database file.
    pub fn compact(&mut self) -> Result<(), TesseraError> {
        self.db.compact().map_err(io_error)?;
        Ok(())
    }

    /// Number of collections.
    pub fn collection_count(&self) -> Result<usize, TesseraError> {
        Ok(self.list_collections()?.len())
    }

    /// Number of records in a collection, or `None` if it does not exist.
    pub fn record_count(&self, collection: &str) -> Result<Option<u64>, TesseraError> {
        match self.open_collection(collection)? {
            Some(table) => Ok(Some(table.len().map_err(io_error)?)),
            None => Ok(None),
        }
    }

    /// Append one bounded batch of records to a collection.
    ///
    /// # Errors
    ///
    /// Returns `TesseraError::InvalidRecord` if the batch exceeds
    /// `MAX_BATCH_LENGTH`, plus everything `ingest_all` rejects.
    pub fn ingest_batch(
        &self,
        collection: &str,
        records: &[Record],
    ) -> Result<usize, TesseraError> {
        if records.len() > MAX_BATCH_LENGTH {
            return Err(TesseraError::InvalidRecord(format!(
                "batch of {} records exceeds maximum {}",
                records.len(),
                MAX_BATCH_LENGTH
            )));
        }
        self.ingest_all(collection, records)
    }

    /// Append any number of records to a collection in a single ACID
    /// transaction.
    ///
    /// The collection is created if it does not exist. New records are
    /// keyed after the collection's current last record, so arrival order
    /// is preserved across calls. Inserts are written in chunks of
    /// `MAX_BATCH_LENGTH` inside the one transaction.
    ///
    /// # Errors
    ///
    /// Returns `TesseraError::InvalidRecord` if:
    /// - The collection name is empty or too long
    /// - Any record is invalid (every record is validated before the
    ///   transaction opens, so a bad input writes nothing)
    pub fn ingest_all(&self, collection: &str, records: &[Record]) -> Result<usize, TesseraError> {
        validate_collection_name(collection)?;
        if records.is_empty() {
            return Ok(0);
        }
        for (index, record) in records.iter().enumerate() {
            validate_record(record).map_err(|e| match e {
                TesseraError::InvalidRecord(msg) => {
                    TesseraError::InvalidRecord(format!("record {}: {}", index, msg))
                }
                other => other,
            })?;
        }

        let write_txn = self.db.begin_write().map_err(io_error)?;
        {
            let mut table = write_txn
                .open_table(collection_table(collection))
                .map_err(io_error)?;

            let mut key = table
                .last()
                .map_err(io_error)?
                .map_or(FIRST_RECORD_KEY, |(k, _)| k.value().saturating_add(1));

            for chunk in records.chunks(MAX_BATCH_LENGTH) {
                for record in chunk {
                    let bytes = postcard::to_allocvec(record)
                        .map_err(|e| TesseraError::SerializationError(e.to_string()))?;
                    table.insert(key, bytes.as_slice()).map_err(io_error)?;
                    key = key.saturating_add(1);
                }
                tracing::trace!(collection, chunk = chunk.len(), "chunk staged");
            }
        }
        write_txn.commit().map_err(io_error)?;

        tracing::debug!(collection, count = records.len(), "records ingested");
        Ok(records.len())
    }

    fn open_collection(
        &self,
        collection: &str,
    ) -> Result<Option<ReadOnlyTable<u64, &'static [u8]>>, TesseraError> {
        let read_txn = self.db.begin_read().map_err(io_error)?;
        match read_txn.open_table(collection_table(collection)) {
            Ok(table) => Ok(Some(table)),
            Err(TableError::TableDoesNotExist(_)) => Ok(None),
            Err(e) => Err(io_error(e)),
        }
    }
}

impl RecordSource for RedbSource {
    fn list_collections(&self) -> Result<Vec<String>, TesseraError> {
        let read_txn = self.db.begin_read().map_err(io_error)?;
        let mut names: Vec<String> = read_txn
            .list_tables()
            .map_err(io_error)?
            .map(|handle| handle.name().to_string())
            .collect();
        names.sort();
        Ok(names)
    }

    fn scan(&self, collection: &str) -> Result<Option<RecordStream<'_>>, TesseraError> {
        let Some(table) = self.open_collection(collection)? else {
            return Ok(None);
        };
        let entries = table.range::<u64>(..).map_err(io_error)?;
        Ok(Some(Box::new(CollectionStream {
            _table: table,
            entries,
        })))
    }

    fn find_first(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Option<Record>, TesseraError> {
        let Some(table) = self.open_collection(collection)? else {
            return Ok(None);
        };
        for entry in table.range::<u64>(..).map_err(io_error)? {
            let (_, bytes) = entry.map_err(io_error)?;
            let record = decode(bytes.value())?;
            if record.get(field) == Some(value) {
                return Ok(Some(record));
            }
        }
        Ok(None)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn open_temp() -> (RedbSource, tempfile::TempDir) {
        let dir = tempdir().expect("tempdir");
        let source = RedbSource::open(dir.path().join("records.redb")).expect("open");
        (source, dir)
    }

    #[test]
    fn empty_database_has_no_collections() {
        let (source, _dir) = open_temp();
        assert!(source.list_collections().expect("list").is_empty());
        assert!(source.scan("people").expect("scan").is_none());
        assert_eq!(source.record_count("people").expect("count"), None);
    }

    #[test]
    fn ingest_then_scan_in_order() {
        let (source, _dir) = open_temp();
        source
            .ingest_batch("people", &[Record::new().with("n", "0"), Record::new().with("n", "1")])
            .expect("first batch");
        source
            .ingest_batch("people", &[Record::new().with("n", "2")])
            .expect("second batch");

        let order: Vec<_> = source
            .scan("people")
            .expect("scan")
            .expect("collection")
            .map(|r| r.expect("decode").get("n").map(str::to_string))
            .collect();
        assert_eq!(
            order,
            vec![Some("0".to_string()), Some("1".to_string()), Some("2".to_string())]
        );
        assert_eq!(source.record_count("people").expect("count"), Some(3));
    }

    #[test]
    fn invalid_batch_writes_nothing() {
        let (source, _dir) = open_temp();
        let result = source.ingest_batch(
            "people",
            &[Record::new().with("subject", "alice"), Record::new()],
        );
        assert!(matches!(result, Err(TesseraError::InvalidRecord(_))));
        assert!(source.list_collections().expect("list").is_empty());
    }

    #[test]
    fn collections_listed_by_name() {
        let (source, _dir) = open_temp();
        source
            .ingest_batch("zoo", &[Record::new().with("subject", "z")])
            .expect("ingest");
        source
            .ingest_batch("atlas", &[Record::new().with("subject", "a")])
            .expect("ingest");

        assert_eq!(
            source.list_collections().expect("list"),
            vec!["atlas".to_string(), "zoo".to_string()]
        );
        assert_eq!(source.collection_count().expect("count"), 2);
    }

    #[test]
    fn data_survives_reopen() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("records.redb");
        {
            let source = RedbSource::open(&path).expect("open");
            source
                .ingest_batch("people", &[Record::new().with("subject", "alice")])
                .expect("ingest");
        }

        let source = RedbSource::open(&path).expect("reopen");
        let found = source
            .find_first("people", "subject", "alice")
            .expect("find");
        assert!(found.is_some());
    }

    fn append_corrupt_row(source: &RedbSource, collection: &str, key: u64) {
        let write_txn = source.db.begin_write().expect("begin write");
        {
            let mut table = write_txn
                .open_table(collection_table(collection))
                .expect("open table");
            table
                .insert(key, &[0xFF_u8, 0xFF, 0xFF][..])
                .expect("insert");
        }
        write_txn.commit().expect("commit");
    }

    #[test]
    fn scan_decodes_rows_one_at_a_time() {
        let (source, _dir) = open_temp();
        source
            .ingest_batch("people", &[Record::new().with("subject", "alice")])
            .expect("ingest");
        append_corrupt_row(&source, "people", 1);

        let mut stream = source.scan("people").expect("scan").expect("collection");
        let first = stream.next().expect("first row").expect("decode");
        assert_eq!(first.get("subject"), Some("alice"));
        assert!(matches!(
            stream.next(),
            Some(Err(TesseraError::DeserializationError(_)))
        ));
        assert!(stream.next().is_none());
    }

    #[test]
    fn find_first_stops_at_match() {
        let (source, _dir) = open_temp();
        source
            .ingest_batch(
                "people",
                &[
                    Record::new().with("subject", "alice").with("n", "0"),
                    Record::new().with("subject", "alice").with("n", "1"),
                ],
            )
            .expect("ingest");
        append_corrupt_row(&source, "people", 2);

        let found = source
            .find_first("people", "subject", "alice")
            .expect("rows after the match are never read")
            .expect("match");
        assert_eq!(found.get("n"), Some("0"));
        assert!(source.find_first("people", "subject", "carol").is_err());
        assert!(
            source
                .find_first("nowhere", "subject", "alice")
                .expect("find")
                .is_none()
        );
    }

    #[test]
    fn oversized_batch_rejected() {
        let (source, _dir) = open_temp();
        let records = vec![Record::new().with("subject", "a"); MAX_BATCH_LENGTH + 1];
        assert!(matches!(
            source.ingest_batch("people", &records),
            Err(TesseraError::InvalidRecord(_))
        ));
        assert_eq!(
            source.ingest_all("people", &records).expect("ingest all"),
            MAX_BATCH_LENGTH + 1
        );
        assert_eq!(
            source.record_count("people").expect("count"),
            Some((MAX_BATCH_LENGTH + 1) as u64)
        );
    }

    #[test]
    fn ingest_all_is_all_or_nothing() {
        let (source, _dir) = open_temp();
        let mut records = vec![Record::new().with("subject", "a"); MAX_BATCH_LENGTH + 5];
        records.push(Record::new());

        let result = source.ingest_all("people", &records);

        let message = match result {
            Err(TesseraError::InvalidRecord(message)) => message,
            other => format!("{:?}", other),
        };
        assert!(message.starts_with(&format!("record {}", MAX_BATCH_LENGTH + 5)));
        assert_eq!(source.record_count("people").expect("count"), None);
    }
}
