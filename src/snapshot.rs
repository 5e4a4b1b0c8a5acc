//! Persistable session state.
//!
//! The host may destroy and later recreate the controller at any point
//! (process death, permission dialogs, rotation). Everything needed to
//! resume is captured here and restored by pure deserialization, never
//! re-derived from environment state.

use std::collections::BTreeMap;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::models::{PickerMode, SourceFile};

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

/// String-keyed bundle of opaque per-provider payloads
///
/// Providers serialize whatever they need to resume (pending output paths,
/// registered request codes) under a key of their choosing. The controller
/// never looks inside.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateBundle(BTreeMap<String, serde_json::Value>);

impl StateBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a serializable payload under `key`. A payload that fails to
    /// serialize is dropped with a warning instead of aborting the save.
    pub fn put<T: Serialize>(&mut self, key: &str, value: &T) {
        match serde_json::to_value(value) {
            Ok(v) => {
                self.0.insert(key.to_string(), v);
            }
            Err(e) => log::warn!("Failed to serialize state for key {}: {}", key, e),
        }
    }

    /// Fetch and deserialize the payload stored under `key`
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.0.get(key)?;
        match serde_json::from_value(value.clone()) {
            Ok(v) => Some(v),
            Err(e) => {
                log::warn!("Failed to deserialize state for key {}: {}", key, e);
                None
            }
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Everything the controller persists across a host-triggered interruption:
/// the selected mode, the owned source-file reference, and each provider's
/// opaque payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerSnapshot {
    pub version: u32,
    pub mode: PickerMode,
    pub source_file: Option<SourceFile>,
    /// Capture time in milliseconds since the epoch
    pub saved_at: i64,
    /// Per-provider payloads, filled via the provider save hooks
    pub providers: StateBundle,
}

impl ControllerSnapshot {
    pub fn new(mode: PickerMode, source_file: Option<SourceFile>, providers: StateBundle) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            mode,
            source_file,
            saved_at: Utc::now().timestamp_millis(),
            providers,
        }
    }

    /// True when this snapshot was written by a compatible format version
    pub fn is_compatible(&self) -> bool {
        self.version == SNAPSHOT_VERSION
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FileProvenance;
    use std::path::PathBuf;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct PendingCapture {
        output: PathBuf,
        request_code: u32,
    }

    #[test]
    fn test_bundle_typed_roundtrip() {
        let mut bundle = StateBundle::new();
        let pending = PendingCapture {
            output: PathBuf::from("/tmp/pending.jpg"),
            request_code: 4281,
        };
        bundle.put("camera", &pending);

        assert!(bundle.contains("camera"));
        assert_eq!(bundle.get::<PendingCapture>("camera"), Some(pending));
        assert_eq!(bundle.get::<PendingCapture>("crop"), None);
    }

    #[test]
    fn test_bundle_type_mismatch_is_none() {
        let mut bundle = StateBundle::new();
        bundle.put("camera", &"just a string");
        assert_eq!(bundle.get::<PendingCapture>("camera"), None);
    }

    #[test]
    fn test_snapshot_json_roundtrip() {
        let mut providers = StateBundle::new();
        providers.put("crop", &PathBuf::from("/tmp/crop-pending.jpg"));

        let snapshot = ControllerSnapshot::new(
            PickerMode::Camera,
            Some(SourceFile::new(
                PathBuf::from("/tmp/capture.jpg"),
                FileProvenance::Camera,
            )),
            providers,
        );

        let json = serde_json::to_string(&snapshot).unwrap();
        let restored: ControllerSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, snapshot);
        assert!(restored.is_compatible());
    }

    #[test]
    fn test_version_mismatch_is_incompatible() {
        let snapshot = ControllerSnapshot {
            version: SNAPSHOT_VERSION + 1,
            mode: PickerMode::Gallery,
            source_file: None,
            saved_at: 0,
            providers: StateBundle::new(),
        };
        assert!(!snapshot.is_compatible());
    }
}
