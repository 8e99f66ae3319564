//! # Storage Summary
//!
//! Counts describing a reconstructed storage. Used for status output.

use crate::Storage;
use serde::{Deserialize, Serialize};

/// Aggregate counts for one storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSummary {
    pub name: String,
    pub instance_count: usize,
    pub concept_count: usize,
    pub derived_concept_count: usize,
    pub triple_count: usize,
    /// Instances with neither concepts nor triples: subjects seen only on
    /// unknown-type records.
    pub bare_instance_count: usize,
}

impl StorageSummary {
    /// Compute the summary of a storage.
    #[must_use]
    pub fn from_storage(storage: &Storage) -> Self {
        let mut summary = Self {
            name: storage.name().to_string(),
            instance_count: storage.len(),
            ..Self::default()
        };
        for instance in storage.instances() {
            summary.concept_count = summary
                .concept_count
                .saturating_add(instance.concepts().len());
            summary.derived_concept_count = summary
                .derived_concept_count
                .saturating_add(instance.concepts_from_instances().count());
            summary.triple_count = summary.triple_count.saturating_add(instance.triples().len());
            if instance.concepts().is_empty() && instance.triples().is_empty() {
                summary.bare_instance_count = summary.bare_instance_count.saturating_add(1);
            }
        }
        summary
    }
}
