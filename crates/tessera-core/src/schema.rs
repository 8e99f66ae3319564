//! # Record Schema
//!
//! Field names and record-type tag values consumed during reconstruction.
//!
//! The exact strings depend on how the source collections were produced, so
//! they are configuration rather than primitives. The app layer loads a
//! `Schema` from TOML; every key is optional and falls back to the defaults
//! below.
//!
//! ```toml
//! [fields]
//! subject = "subject"
//! concept_score = "score"
//!
//! [tags]
//! concept = "concept_of_instance"
//! ```

use crate::TesseraError;
use serde::{Deserialize, Serialize};

/// Names of the record fields read by the entity builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldNames {
    pub subject: String,
    pub object: String,
    pub predicate: String,
    pub normalized_subject: String,
    pub normalized_object: String,
    pub record_type: String,
    pub is_from_instance: String,
    pub concept_score: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            subject: "subject".to_string(),
            object: "object".to_string(),
            predicate: "predicate".to_string(),
            normalized_subject: "normalized_subject".to_string(),
            normalized_object: "normalized_object".to_string(),
            record_type: "record_type".to_string(),
            is_from_instance: "is_from_instance".to_string(),
            concept_score: "concept_score".to_string(),
        }
    }
}

impl FieldNames {
    fn named(&self) -> [(&'static str, &str); 8] {
        [
            ("subject", &self.subject),
            ("object", &self.object),
            ("predicate", &self.predicate),
            ("normalized_subject", &self.normalized_subject),
            ("normalized_object", &self.normalized_object),
            ("record_type", &self.record_type),
            ("is_from_instance", &self.is_from_instance),
            ("concept_score", &self.concept_score),
        ]
    }
}

/// Values of the record-type field that select a record kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordTags {
    pub concept: String,
    pub relation: String,
    pub metadata: String,
}

impl Default for RecordTags {
    fn default() -> Self {
        Self {
            concept: "concept".to_string(),
            relation: "relation".to_string(),
            metadata: "metadata".to_string(),
        }
    }
}

/// Complete schema for one record source.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Schema {
    pub fields: FieldNames,
    pub tags: RecordTags,
}

impl Schema {
    /// Check that the schema can classify and read records unambiguously.
    ///
    /// Rejects empty field names, empty tags, and tags that collide.
    pub fn validate(&self) -> Result<(), TesseraError> {
        for (key, name) in self.fields.named() {
            if name.is_empty() {
                return Err(TesseraError::ConfigError(format!(
                    "field name for '{}' is empty",
                    key
                )));
            }
        }

        let tags = [
            ("concept", &self.tags.concept),
            ("relation", &self.tags.relation),
            ("metadata", &self.tags.metadata),
        ];
        for (key, tag) in tags {
            if tag.is_empty() {
                return Err(TesseraError::ConfigError(format!(
                    "record tag for '{}' is empty",
                    key
                )));
            }
        }
        if self.tags.concept == self.tags.relation
            || self.tags.concept == self.tags.metadata
            || self.tags.relation == self.tags.metadata
        {
            return Err(TesseraError::ConfigError(
                "record tags must be distinct".to_string(),
            ));
        }

        Ok(())
    }
}
