//! # tessera-core
//!
//! The instance reconstruction engine for Tessera - THE LOGIC.
//!
//! Source collections hold flat subject-predicate-object records. Each record
//! carries a record-type tag saying whether it attaches a concept to its
//! subject, states a relational edge, or is collection metadata. This crate
//! groups records by collection ("storage"), folds every record that shares
//! a subject label into one `Instance`, and attaches the typed annotations.
//!
//! ## Pipeline
//!
//! ```text
//! RecordSource ──► Classifier ──► EntityBuilder ──► InstanceRegistry ──► Storage
//!                      │
//!                      └─ Metadata ──► MetadataHook
//! ```
//!
//! ## Architectural Constraints
//!
//! - Read-only: nothing is ever written back to a source during reconstruction
//! - Sequential: one pass per storage, one registry per pass
//! - Has NO async, NO network dependencies (pure Rust)

// =============================================================================
// MODULES
// =============================================================================

pub mod builder;
pub mod classifier;
pub mod hook;
pub mod navigator;
pub mod primitives;
pub mod registry;
pub mod schema;
pub mod source;
pub mod summary;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    Concept, FormatError, Fragment, Instance, Record, RecordKind, Storage, TesseraError, Triple,
};

// =============================================================================
// RE-EXPORTS: Reconstruction
// =============================================================================

pub use builder::EntityBuilder;
pub use classifier::Classifier;
pub use hook::{IgnoreMetadata, MetadataHook};
pub use navigator::Navigator;
pub use registry::{InstanceRegistry, PassCounts, StorageAggregator};
pub use schema::{FieldNames, RecordTags, Schema};
pub use summary::StorageSummary;

// =============================================================================
// RE-EXPORTS: Sources
// =============================================================================

pub use source::{MemorySource, RecordSource, RecordStream, RedbSource};
