//! Wire-format manifest records as delivered by the tracking backend.
//!
//! These mirror the protobuf `ArtifactManifest` message. Every field follows proto3
//! semantics: absent means zero value, so an unset string is `""` and an unset list
//! is empty. The records also deserialize from proto3-style JSON (camelCase keys,
//! every key optional), which is how wire messages are handed to the CLI.

use crate::manifest::ManifestError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct ArtifactManifestRecord {
    pub version: i32,
    pub storage_policy: String,
    /// Accepted for completeness; conversion does not mirror it.
    pub storage_policy_config: Vec<StoragePolicyConfigItem>,
    pub contents: Vec<ManifestEntryRecord>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct ManifestEntryRecord {
    pub path: String,
    pub digest: String,
    pub birth_artifact_id: String,
    #[serde(rename = "ref")]
    pub reference: String,
    pub size: i64,
    pub local_path: String,
    pub extra: Vec<ExtraItem>,
}

/// One `extra` key with its value carried as JSON text.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct ExtraItem {
    pub key: String,
    pub value_json: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct StoragePolicyConfigItem {
    pub key: String,
    pub value_json: String,
}

impl ArtifactManifestRecord {
    pub fn from_json_str(input: &str) -> Result<Self, ManifestError> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }
}

impl ExtraItem {
    pub fn new(key: impl Into<String>, value_json: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value_json: value_json.into(),
        }
    }
}
