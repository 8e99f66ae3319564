//! # Primitives
//!
//! Hardcoded runtime constants for the Tessera CORE.
//!
//! These are compiled into the binary and are immutable at runtime. The
//! record schema (field names and tag values) is NOT a primitive; it is
//! configuration, see [`crate::schema`].

/// Token accepted (case-insensitively) as boolean true.
pub const TRUE_TOKEN: &str = "true";

/// Token accepted (case-insensitively) as boolean false.
pub const FALSE_TOKEN: &str = "false";

/// First sequence key assigned to a record in a fresh collection.
///
/// Record keys define arrival order inside a persistent source.
pub const FIRST_RECORD_KEY: u64 = 0;

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum length for field names.
///
/// Records with longer field names are rejected on ingest.
pub const MAX_FIELD_NAME_LENGTH: usize = 256;

/// Maximum length for field values (64KB).
///
/// Records with longer values are rejected on ingest.
pub const MAX_FIELD_VALUE_LENGTH: usize = 65536;

/// Maximum number of records in a single ingest batch.
pub const MAX_BATCH_LENGTH: usize = 10000;

/// Maximum length of a collection name.
pub const MAX_COLLECTION_NAME_LENGTH: usize = 128;
