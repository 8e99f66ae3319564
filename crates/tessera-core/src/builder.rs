//! # Entity Builder
//!
//! Converts one classified record into one typed value.
//!
//! - Concept records yield a [`Concept`]; the derived flag and score are
//!   parsed strictly and never coerced to a default
//! - Relation records yield a [`Triple`]; absent fields stay absent
//! - Metadata and unknown records yield nothing

use crate::primitives::{FALSE_TOKEN, TRUE_TOKEN};
use crate::schema::Schema;
use crate::{Concept, FormatError, Fragment, Record, RecordKind, Triple};

/// Stateless record-to-entity converter.
pub struct EntityBuilder;

impl EntityBuilder {
    /// Build the fragment a record of the given kind contributes.
    ///
    /// Returns `Ok(None)` for `Metadata` and `Unknown`.
    pub fn build(
        kind: RecordKind,
        record: &Record,
        schema: &Schema,
    ) -> Result<Option<Fragment>, FormatError> {
        match kind {
            RecordKind::Concept => Ok(Some(Fragment::Concept(Self::concept(record, schema)?))),
            RecordKind::Relation => Ok(Some(Fragment::Triple(Self::triple(record, schema)))),
            RecordKind::Metadata | RecordKind::Unknown => Ok(None),
        }
    }

    /// Build a concept from a concept record.
    ///
    /// # Errors
    /// - `MissingField` if the object, derived flag or score is absent
    /// - `InvalidBoolean` if the derived flag is not `true`/`false`
    /// - `InvalidNumber` if the score is not a finite number
    pub fn concept(record: &Record, schema: &Schema) -> Result<Concept, FormatError> {
        let fields = &schema.fields;

        let label = required(record, &fields.object)?;
        let from_instance = parse_bool(
            &fields.is_from_instance,
            required(record, &fields.is_from_instance)?,
        )?;
        let score = parse_score(
            &fields.concept_score,
            required(record, &fields.concept_score)?,
        )?;

        let mut concept = Concept::new(label, from_instance).with_score(score);
        concept.update_processed_label(optional(record, &fields.normalized_object));
        Ok(concept)
    }

    /// Build a triple from a relation record. Never fails.
    #[must_use]
    pub fn triple(record: &Record, schema: &Schema) -> Triple {
        let fields = &schema.fields;
        Triple::new(
            optional(record, &fields.subject),
            optional(record, &fields.normalized_subject),
            optional(record, &fields.predicate),
            optional(record, &fields.object),
            optional(record, &fields.normalized_object),
        )
    }
}

fn optional(record: &Record, field: &str) -> Option<String> {
    record.get(field).map(str::to_string)
}

fn required<'a>(record: &'a Record, field: &str) -> Result<&'a str, FormatError> {
    record.get(field).ok_or_else(|| FormatError::MissingField {
        field: field.to_string(),
    })
}

fn parse_bool(field: &str, raw: &str) -> Result<bool, FormatError> {
    let token = raw.trim();
    if token.eq_ignore_ascii_case(TRUE_TOKEN) {
        Ok(true)
    } else if token.eq_ignore_ascii_case(FALSE_TOKEN) {
        Ok(false)
    } else {
        Err(FormatError::InvalidBoolean {
            field: field.to_string(),
            value: raw.to_string(),
        })
    }
}

fn parse_score(field: &str, raw: &str) -> Result<f64, FormatError> {
    let invalid = || FormatError::InvalidNumber {
        field: field.to_string(),
        value: raw.to_string(),
    };
    let score: f64 = raw.trim().parse().map_err(|_| invalid())?;
    if score.is_finite() {
        Ok(score)
    } else {
        Err(invalid())
    }
}

// =============================================================================
// TESTS
// =============================================================================
