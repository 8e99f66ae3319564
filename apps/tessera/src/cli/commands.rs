//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::api::{self, InstanceJson, StatusResponse, StorageJson};
use crate::config::{ApiConfig, load_schema};
use std::path::{Path, PathBuf};
use tessera_core::{
    Instance, Navigator, Record, RecordSource, RedbSource, Storage, StorageSummary, TesseraError,
};

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum file size for ingestion (100 MB).
///
/// This prevents memory exhaustion from malicious or accidental large files.
const MAX_INGEST_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), TesseraError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| TesseraError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(TesseraError::InvalidRecord(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Resolve an input path to a canonical regular file.
///
/// Canonicalization resolves "..", symlinks, and validates existence.
fn validate_file_path(path: &Path) -> Result<PathBuf, TesseraError> {
    let canonical = path.canonicalize().map_err(|e| {
        TesseraError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(TesseraError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

// =============================================================================
// SHARED HELPERS
// =============================================================================

/// Open the record database and wrap it in a navigator with the configured
/// schema.
pub fn open_navigator(
    db_path: &Path,
    schema_path: Option<&Path>,
) -> Result<Navigator<RedbSource>, TesseraError> {
    let schema = load_schema(schema_path)?;
    let source = RedbSource::open(db_path)?;
    Navigator::with_schema(source, schema)
}

/// Parse a JSON array of flat objects into records.
///
/// Strings are kept as-is, numbers and booleans are stringified, nulls are
/// dropped. Nested arrays or objects are rejected.
pub fn records_from_json(text: &str) -> Result<Vec<Record>, TesseraError> {
    let rows: Vec<serde_json::Map<String, serde_json::Value>> = serde_json::from_str(text)
        .map_err(|e| TesseraError::DeserializationError(format!("Invalid JSON: {}", e)))?;

    rows.into_iter()
        .enumerate()
        .map(|(index, row)| {
            let mut record = Record::new();
            for (key, value) in row {
                match value {
                    serde_json::Value::Null => {}
                    serde_json::Value::String(s) => record.insert(key, s),
                    serde_json::Value::Bool(b) => record.insert(key, b.to_string()),
                    serde_json::Value::Number(n) => record.insert(key, n.to_string()),
                    serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
                        return Err(TesseraError::InvalidRecord(format!(
                            "record {}: field '{}' is not a scalar",
                            index, key
                        )));
                    }
                }
            }
            Ok(record)
        })
        .collect()
}

fn print_json<T: serde::Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_default()
    );
}

fn print_instance(instance: &Instance) {
    println!("{}", instance.label());
    for concept in instance.concepts() {
        println!(
            "  concept  {} (score {}, from instance: {})",
            concept.label(),
            concept.score(),
            concept.is_from_instance()
        );
    }
    for triple in instance.triples() {
        println!(
            "  triple   {} -[{}]-> {}",
            triple.subject.as_deref().unwrap_or("?"),
            triple.predicate.as_deref().unwrap_or("?"),
            triple.object.as_deref().unwrap_or("?")
        );
    }
}

fn print_storage(storage: &Storage) {
    println!("Storage: {}", storage.name());
    println!("Instances: {}", storage.len());
    println!();
    for instance in storage.instances() {
        print_instance(instance);
    }
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(
    db_path: &Path,
    schema_path: Option<&Path>,
    host: &str,
    port: u16,
) -> Result<(), TesseraError> {
    let schema = load_schema(schema_path)?;
    let api_config = ApiConfig::from_env()?;
    let source: Box<dyn RecordSource> = Box::new(RedbSource::open(db_path)?);
    let navigator = Navigator::with_schema(source, schema)?;

    println!("Tessera Instance Navigator Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:       {}", host);
    println!("  Port:       {}", port);
    println!("  Database:   {:?}", db_path);
    println!(
        "  Auth:       {}",
        if api_config.api_key.is_some() { "Bearer key" } else { "off" }
    );
    match api_config.rate_limit {
        0 => println!("  Rate limit: off"),
        rate => println!("  Rate limit: {} req/s", rate),
    }
    println!();
    println!("Endpoints:");
    println!("  GET /storages                          - List storages");
    println!("  GET /storages/{{name}}                   - Reconstruct a storage");
    println!("  GET /storages/{{name}}/instances/{{label}} - Single-record instance view");
    println!("  GET /status                            - Storage summaries");
    println!("  GET /health                            - Health check");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let addr = format!("{}:{}", host, port);
    api::run_server(&addr, navigator, &api_config).await
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Summarize every storage.
pub fn cmd_status(
    db_path: &Path,
    schema_path: Option<&Path>,
    json_mode: bool,
) -> Result<(), TesseraError> {
    let navigator = open_navigator(db_path, schema_path)?;
    let summaries: Vec<StorageSummary> = navigator
        .retrieve_storages()?
        .iter()
        .map(StorageSummary::from_storage)
        .collect();
    let status = StatusResponse::from_summaries(summaries);

    if json_mode {
        print_json(&status);
        return Ok(());
    }

    println!("Tessera Status");
    println!("==============");
    println!("Database:  {:?}", db_path);
    println!();
    println!("Storages:  {}", status.storage_count);
    println!("Instances: {}", status.instance_count);
    println!("Concepts:  {}", status.concept_count);
    println!("Triples:   {}", status.triple_count);
    for summary in &status.storages {
        println!();
        println!("  {}", summary.name);
        println!("    instances: {}", summary.instance_count);
        println!(
            "    concepts:  {} ({} from instances)",
            summary.concept_count, summary.derived_concept_count
        );
        println!("    triples:   {}", summary.triple_count);
        if summary.bare_instance_count > 0 {
            println!("    bare:      {} (no concepts or triples)", summary.bare_instance_count);
        }
    }

    Ok(())
}

// =============================================================================
// STORAGE COMMANDS
// =============================================================================

/// List storage names.
pub fn cmd_storages(
    db_path: &Path,
    schema_path: Option<&Path>,
    json_mode: bool,
) -> Result<(), TesseraError> {
    let navigator = open_navigator(db_path, schema_path)?;
    let names = navigator.list_storage_names()?;

    if json_mode {
        print_json(&serde_json::json!({ "storages": names }));
    } else {
        for name in names {
            println!("{}", name);
        }
    }
    Ok(())
}

/// Reconstruct and print one storage.
pub fn cmd_storage(
    db_path: &Path,
    schema_path: Option<&Path>,
    json_mode: bool,
    name: &str,
) -> Result<(), TesseraError> {
    let navigator = open_navigator(db_path, schema_path)?;

    let Some(storage) = navigator.retrieve_storage(name)? else {
        if json_mode {
            print_json(&serde_json::json!({ "storage": null, "name": name }));
        } else {
            println!("Storage not found: {}", name);
        }
        return Ok(());
    };

    if json_mode {
        print_json(&StorageJson::from(&storage));
    } else {
        print_storage(&storage);
    }
    Ok(())
}

/// Print the single-record view of one instance.
pub fn cmd_instance(
    db_path: &Path,
    schema_path: Option<&Path>,
    json_mode: bool,
    label: &str,
    storage: &str,
) -> Result<(), TesseraError> {
    let navigator = open_navigator(db_path, schema_path)?;

    match navigator.retrieve_instance(label, storage)? {
        Some(instance) if json_mode => print_json(&InstanceJson::from(&instance)),
        Some(instance) => print_instance(&instance),
        None if json_mode => print_json(&serde_json::json!({ "instance": null })),
        None => println!("Instance not found: {} in {}", label, storage),
    }
    Ok(())
}

// =============================================================================
// INGEST COMMAND
// =============================================================================

/// Load raw records from a JSON file into a collection.
///
/// The whole file is written in one transaction: one bad record leaves the
/// collection untouched.
pub fn cmd_ingest(
    db_path: &Path,
    json_mode: bool,
    collection: &str,
    file: &Path,
) -> Result<(), TesseraError> {
    let file = validate_file_path(file)?;
    validate_file_size(&file, MAX_INGEST_FILE_SIZE)?;

    let content = std::fs::read_to_string(&file)
        .map_err(|e| TesseraError::IoError(format!("Cannot read '{}': {}", file.display(), e)))?;
    let records = records_from_json(&content)?;

    let source = RedbSource::open(db_path)?;
    let ingested = source.ingest_all(collection, &records)?;
    tracing::info!(collection, ingested, "ingest complete");

    if json_mode {
        print_json(&serde_json::json!({
            "collection": collection,
            "ingested": ingested
        }));
    } else {
        println!("Ingested {} records into '{}'", ingested, collection);
    }
    Ok(())
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Initialize a new empty database.
pub fn cmd_init(db_path: &Path, force: bool) -> Result<(), TesseraError> {
    if db_path.exists() {
        if !force {
            return Err(TesseraError::IoError(format!(
                "Database {:?} already exists. Use --force to overwrite.",
                db_path
            )));
        }
        std::fs::remove_file(db_path)
            .map_err(|e| TesseraError::IoError(format!("Cannot remove database: {}", e)))?;
    }

    RedbSource::open(db_path)?;
    println!("Initialized empty database at {:?}", db_path);
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
