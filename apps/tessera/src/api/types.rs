//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.

use serde::{Deserialize, Serialize};
use tessera_core::{Concept, Instance, Storage, StorageSummary, Triple};

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// STATUS RESPONSE
// =============================================================================

/// Summary of every storage in the source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub success: bool,
    pub storage_count: usize,
    pub instance_count: usize,
    pub concept_count: usize,
    pub triple_count: usize,
    pub storages: Vec<StorageSummary>,
    pub error: Option<String>,
}

impl StatusResponse {
    /// Build a status response from per-storage summaries.
    #[must_use]
    pub fn from_summaries(storages: Vec<StorageSummary>) -> Self {
        let sum = |f: fn(&StorageSummary) -> usize| {
            storages
                .iter()
                .map(f)
                .fold(0usize, usize::saturating_add)
        };
        Self {
            success: true,
            storage_count: storages.len(),
            instance_count: sum(|s| s.instance_count),
            concept_count: sum(|s| s.concept_count),
            triple_count: sum(|s| s.triple_count),
            storages,
            error: None,
        }
    }

    /// Create an error response.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            storage_count: 0,
            instance_count: 0,
            concept_count: 0,
            triple_count: 0,
            storages: Vec::new(),
            error: Some(message.into()),
        }
    }
}

// =============================================================================
// ENTITY JSON
// =============================================================================

/// JSON representation of a concept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptJson {
    pub label: String,
    pub from_instance: bool,
    pub score: f64,
    pub processed_label: Option<String>,
}

impl From<&Concept> for ConceptJson {
    fn from(concept: &Concept) -> Self {
        Self {
            label: concept.label().to_string(),
            from_instance: concept.is_from_instance(),
            score: concept.score(),
            processed_label: concept.processed_label().map(str::to_string),
        }
    }
}

/// JSON representation of a relational triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripleJson {
    pub subject: Option<String>,
    pub normalized_subject: Option<String>,
    pub predicate: Option<String>,
    pub object: Option<String>,
    pub normalized_object: Option<String>,
}

impl From<&Triple> for TripleJson {
    fn from(triple: &Triple) -> Self {
        Self {
            subject: triple.subject.clone(),
            normalized_subject: triple.normalized_subject.clone(),
            predicate: triple.predicate.clone(),
            object: triple.object.clone(),
            normalized_object: triple.normalized_object.clone(),
        }
    }
}

/// JSON representation of an instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceJson {
    pub label: String,
    pub storage: Option<String>,
    pub concepts: Vec<ConceptJson>,
    pub triples: Vec<TripleJson>,
}

impl From<&Instance> for InstanceJson {
    fn from(instance: &Instance) -> Self {
        Self {
            label: instance.label().to_string(),
            storage: instance.storage_name().map(str::to_string),
            concepts: instance.concepts().iter().map(ConceptJson::from).collect(),
            triples: instance.triples().iter().map(TripleJson::from).collect(),
        }
    }
}

/// JSON representation of a storage. Instances are ordered by label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageJson {
    pub name: String,
    pub instances: Vec<InstanceJson>,
}

impl From<&Storage> for StorageJson {
    fn from(storage: &Storage) -> Self {
        Self {
            name: storage.name().to_string(),
            instances: storage.instances().map(InstanceJson::from).collect(),
        }
    }
}

// =============================================================================
// STORAGE RESPONSES
// =============================================================================

/// Storage name listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageListResponse {
    pub success: bool,
    pub storages: Vec<String>,
    pub error: Option<String>,
}

impl StorageListResponse {
    #[must_use]
    pub fn success(storages: Vec<String>) -> Self {
        Self {
            success: true,
            storages,
            error: None,
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            storages: Vec::new(),
            error: Some(message.into()),
        }
    }
}

/// A single reconstructed storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageResponse {
    pub success: bool,
    pub storage: Option<StorageJson>,
    pub error: Option<String>,
}

impl StorageResponse {
    #[must_use]
    pub fn success(storage: &Storage) -> Self {
        Self {
            success: true,
            storage: Some(StorageJson::from(storage)),
            error: None,
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            storage: None,
            error: Some(message.into()),
        }
    }
}

/// A single-record instance view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceResponse {
    pub success: bool,
    pub instance: Option<InstanceJson>,
    pub error: Option<String>,
}

impl InstanceResponse {
    #[must_use]
    pub fn success(instance: &Instance) -> Self {
        Self {
            success: true,
            instance: Some(InstanceJson::from(instance)),
            error: None,
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            instance: None,
            error: Some(message.into()),
        }
    }
}
