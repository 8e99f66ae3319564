//! # Metadata Hook
//!
//! Extension point invoked once per metadata record during a reconstruction
//! pass. Metadata records never resolve an instance; whatever a hook does
//! with them happens outside the instance graph.
//!
//! Hooks cannot fail. Any closure `Fn(&str, &Record)` is a hook.

use crate::Record;

/// Strategy for handling metadata records.
pub trait MetadataHook: Send + Sync {
    /// Called with the storage name and the metadata record.
    fn on_metadata(&self, storage: &str, record: &Record);
}

/// The default hook: records nothing, touches nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct IgnoreMetadata;

impl MetadataHook for IgnoreMetadata {
    fn on_metadata(&self, storage: &str, record: &Record) {
        tracing::trace!(storage, fields = record.len(), "metadata record skipped");
    }
}

impl<F> MetadataHook for F
where
    F: Fn(&str, &Record) + Send + Sync,
{
    fn on_metadata(&self, storage: &str, record: &Record) {
        self(storage, record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn closure_is_a_hook() {
        let seen = Mutex::new(Vec::new());
        let hook = |storage: &str, record: &Record| {
            if let Ok(mut seen) = seen.lock() {
                seen.push((storage.to_string(), record.get("note").map(str::to_string)));
            }
        };

        hook.on_metadata("people", &Record::new().with("note", "v1"));

        let seen = seen.into_inner().expect("lock");
        assert_eq!(seen, vec![("people".to_string(), Some("v1".to_string()))]);
    }

    #[test]
    fn ignore_accepts_any_record() {
        IgnoreMetadata.on_metadata("", &Record::new());
        IgnoreMetadata.on_metadata("s", &Record::new().with("x", "y"));
    }
}
