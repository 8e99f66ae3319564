//! # Record Classifier
//!
//! Maps a record's record-type field onto a [`RecordKind`].
//!
//! Classification is total: any tag that is not one of the three configured
//! values, including a missing tag, is `Unknown`.

use crate::schema::Schema;
use crate::{Record, RecordKind};

/// Stateless record classifier.
pub struct Classifier;

impl Classifier {
    /// Classify a raw tag value.
    #[must_use]
    pub fn classify_tag(tag: Option<&str>, schema: &Schema) -> RecordKind {
        match tag {
            Some(t) if t == schema.tags.concept => RecordKind::Concept,
            Some(t) if t == schema.tags.relation => RecordKind::Relation,
            Some(t) if t == schema.tags.metadata => RecordKind::Metadata,
            _ => RecordKind::Unknown,
        }
    }

    /// Classify a record by its record-type field.
    #[must_use]
    pub fn classify(record: &Record, schema: &Schema) -> RecordKind {
        Self::classify_tag(record.get(&schema.fields.record_type), schema)
    }
}
