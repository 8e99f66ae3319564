//! # Navigator
//!
//! Top-level façade over a record source.
//!
//! - `list_storage_names`: the source's collection names, unchanged
//! - `retrieve_storages` / `retrieve_storage`: full reconstruction passes,
//!   one fresh `InstanceRegistry` per storage
//! - `retrieve_instance`: a single-record view built from the FIRST record
//!   whose subject matches. It does not merge further records with the same
//!   label; use `retrieve_storage` for the merged instance.

use crate::builder::EntityBuilder;
use crate::classifier::Classifier;
use crate::hook::{IgnoreMetadata, MetadataHook};
use crate::registry::{InstanceRegistry, StorageAggregator};
use crate::schema::Schema;
use crate::source::{RecordSource, RecordStream};
use crate::{Instance, Storage, TesseraError};

/// Reconstructs storages and instances from a record source.
pub struct Navigator<S> {
    source: S,
    schema: Schema,
    hook: Box<dyn MetadataHook>,
}

impl<S> std::fmt::Debug for Navigator<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Navigator")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

impl<S: RecordSource> Navigator<S> {
    /// Create a navigator with the default schema and a metadata hook that
    /// ignores metadata.
    #[must_use]
    pub fn new(source: S) -> Self {
        Self {
            source,
            schema: Schema::default(),
            hook: Box::new(IgnoreMetadata),
        }
    }

    /// Create a navigator with a custom schema.
    ///
    /// # Errors
    /// `TesseraError::ConfigError` if the schema is invalid.
    pub fn with_schema(source: S, schema: Schema) -> Result<Self, TesseraError> {
        schema.validate()?;
        Ok(Self {
            source,
            schema,
            hook: Box::new(IgnoreMetadata),
        })
    }

    /// Replace the metadata hook.
    #[must_use]
    pub fn with_hook(mut self, hook: impl MetadataHook + 'static) -> Self {
        self.hook = Box::new(hook);
        self
    }

    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Names of all storages known to the source.
    pub fn list_storage_names(&self) -> Result<Vec<String>, TesseraError> {
        self.source.list_collections()
    }

    /// Reconstruct every storage. Exactly one `Storage` per listed name.
    pub fn retrieve_storages(&self) -> Result<Vec<Storage>, TesseraError> {
        let names = self.list_storage_names()?;
        let mut storages = Vec::with_capacity(names.len());
        for name in names {
            let storage = match self.source.scan(&name)? {
                Some(records) => self.reconstruct(&name, records)?,
                // Listed but gone by the time it was scanned.
                None => Storage::new(name),
            };
            storages.push(storage);
        }
        Ok(storages)
    }

    /// Reconstruct one storage, or `Ok(None)` if the source has no such
    /// collection.
    pub fn retrieve_storage(&self, name: &str) -> Result<Option<Storage>, TesseraError> {
        match self.source.scan(name)? {
            Some(records) => self.reconstruct(name, records).map(Some),
            None => Ok(None),
        }
    }

    /// Build a standalone instance from the first record whose subject is
    /// `label`. Returns `Ok(None)` when no record matches.
    pub fn retrieve_instance(
        &self,
        label: &str,
        storage: &str,
    ) -> Result<Option<Instance>, TesseraError> {
        let Some(record) = self
            .source
            .find_first(storage, &self.schema.fields.subject, label)?
        else {
            return Ok(None);
        };

        let kind = Classifier::classify(&record, &self.schema);
        let fragment = EntityBuilder::build(kind, &record, &self.schema).map_err(|source| {
            TesseraError::MalformedRecord {
                storage: storage.to_string(),
                subject: Some(label.to_string()),
                source,
            }
        })?;

        let mut instance = Instance::new(label);
        if let Some(fragment) = fragment {
            instance.attach(fragment);
        }
        instance.set_storage_name(storage);
        Ok(Some(instance))
    }

    fn reconstruct(&self, name: &str, records: RecordStream<'_>) -> Result<Storage, TesseraError> {
        tracing::debug!(storage = name, "retrieving instances");

        let mut pass =
            StorageAggregator::new(name, InstanceRegistry::new(), &self.schema, self.hook.as_ref());
        for record in records {
            pass.absorb(&record?)?;
        }

        let counts = pass.counts();
        let storage = pass.finish();
        tracing::debug!(
            storage = name,
            records = counts.total(),
            metadata = counts.metadata,
            unknown = counts.unknown,
            instances = storage.len(),
            "storage reconstructed"
        );
        Ok(storage)
    }
}

// =============================================================================
// TESTS
// =============================================================================
