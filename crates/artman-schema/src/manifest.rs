use crate::types::EntryDigest;
use crate::wire::{ArtifactManifestRecord, ManifestEntryRecord};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Storage layout written into every manifest converted from wire format.
pub const STORAGE_LAYOUT_V2: &str = "V2";

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse manifest: {0}")]
    Json(#[from] serde_json::Error),
    #[error("manifest entry '{path}': extra '{key}' is not valid JSON: {source}")]
    ExtraDecode {
        path: String,
        key: String,
        source: serde_json::Error,
    },
    #[error("duplicate path in manifest: {0}")]
    DuplicatePath(String),
    #[error("path not contained in artifact: {0}")]
    EntryNotFound(String),
}

/// How [`Manifest::from_wire_with`] treats a path that appears more than once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicatePaths {
    /// A later entry replaces an earlier one with the same path.
    #[default]
    LastWins,
    /// Fail with [`ManifestError::DuplicatePath`].
    Reject,
}

/// An artifact manifest: versioning, storage-policy metadata, and the file entries
/// keyed by artifact-relative path.
///
/// The serde encoding of this type is the manifest file format. Missing top-level
/// keys decode to their zero values.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    #[serde(default)]
    pub version: i32,
    #[serde(default)]
    pub storage_policy: String,
    #[serde(default)]
    pub storage_policy_config: StoragePolicyConfig,
    #[serde(default, deserialize_with = "null_as_default")]
    pub contents: BTreeMap<String, ManifestEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StoragePolicyConfig {
    #[serde(default)]
    pub storage_layout: String,
}

/// One tracked file or external reference within an artifact version.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ManifestEntry {
    pub digest: EntryDigest,
    /// Artifact version that first introduced this digest. Encoded as `null` when absent.
    #[serde(rename = "birthArtifactID", default)]
    pub birth_artifact_id: Option<String>,
    /// External reference URI, present only for reference entries.
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    pub size: i64,
    #[serde(
        default,
        skip_serializing_if = "Map::is_empty",
        deserialize_with = "null_as_default"
    )]
    pub extra: Map<String, Value>,
    /// Process-local file location. Never part of the manifest file.
    #[serde(skip)]
    pub local_path: Option<String>,
    /// Resolved download location. Never part of the manifest file.
    #[serde(skip)]
    pub download_url: Option<String>,
}

impl ManifestEntry {
    pub fn new(digest: impl Into<EntryDigest>, size: i64) -> Self {
        Self {
            digest: digest.into(),
            size,
            ..Self::default()
        }
    }

    pub fn is_reference(&self) -> bool {
        self.reference.is_some()
    }

    fn from_record(record: &ManifestEntryRecord) -> Result<Self, ManifestError> {
        let mut extra = Map::new();
        for item in &record.extra {
            let value: Value = serde_json::from_str(&item.value_json).map_err(|source| {
                ManifestError::ExtraDecode {
                    path: record.path.clone(),
                    key: item.key.clone(),
                    source,
                }
            })?;
            extra.insert(item.key.clone(), value);
        }

        Ok(Self {
            digest: EntryDigest::new(record.digest.as_str()),
            birth_artifact_id: none_if_empty(&record.birth_artifact_id),
            reference: none_if_empty(&record.reference),
            size: record.size,
            extra,
            local_path: none_if_empty(&record.local_path),
            download_url: None,
        })
    }
}

impl Manifest {
    /// Create an empty manifest using the V2 storage layout.
    pub fn new(version: i32, storage_policy: impl Into<String>) -> Self {
        Self {
            version,
            storage_policy: storage_policy.into(),
            storage_policy_config: StoragePolicyConfig {
                storage_layout: STORAGE_LAYOUT_V2.to_owned(),
            },
            contents: BTreeMap::new(),
        }
    }

    /// Build a manifest from a wire-format record. Later entries replace earlier
    /// entries that share a path.
    pub fn from_wire(record: &ArtifactManifestRecord) -> Result<Self, ManifestError> {
        Self::from_wire_with(record, DuplicatePaths::LastWins)
    }

    pub fn from_wire_with(
        record: &ArtifactManifestRecord,
        duplicates: DuplicatePaths,
    ) -> Result<Self, ManifestError> {
        let mut manifest = Self::new(record.version, record.storage_policy.as_str());

        for entry in &record.contents {
            let converted = ManifestEntry::from_record(entry)?;
            if manifest.contents.contains_key(&entry.path) {
                if duplicates == DuplicatePaths::Reject {
                    return Err(ManifestError::DuplicatePath(entry.path.clone()));
                }
                debug!("manifest path {} listed again, keeping the later entry", entry.path);
            }
            manifest.contents.insert(entry.path.clone(), converted);
        }

        Ok(manifest)
    }

    /// Look up the entry for an artifact-relative path. The path must match a key
    /// exactly; no normalization is applied.
    pub fn entry_for_path(&self, path: &str) -> Result<&ManifestEntry, ManifestError> {
        self.contents
            .get(path)
            .ok_or_else(|| ManifestError::EntryNotFound(path.to_owned()))
    }

    /// Compact JSON encoding, the exact bytes of a manifest file.
    pub fn to_json_vec(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, ManifestError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn from_json_str(input: &str) -> Result<Self, ManifestError> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let bytes = fs::read(path)?;
        Self::from_slice(&bytes)
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    /// Sum of all entry sizes in bytes, clamped to the `i64` range.
    pub fn total_size(&self) -> i64 {
        self.contents
            .values()
            .fold(0i64, |total, e| total.saturating_add(e.size))
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.contents.keys().map(String::as_str)
    }
}

fn none_if_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_owned())
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::{ExtraItem, StoragePolicyConfigItem};

    fn entry(path: &str, digest: &str, size: i64) -> ManifestEntryRecord {
        ManifestEntryRecord {
            path: path.to_owned(),
            digest: digest.to_owned(),
            size,
            ..ManifestEntryRecord::default()
        }
    }

    fn record(contents: Vec<ManifestEntryRecord>) -> ArtifactManifestRecord {
        ArtifactManifestRecord {
            version: 1,
            storage_policy: "wandb-storage-policy-v1".to_owned(),
            storage_policy_config: Vec::new(),
            contents,
        }
    }

    #[test]
    fn converts_plain_entry_with_absent_optionals() {
        let manifest = Manifest::from_wire(&record(vec![entry("model.pt", "abc123", 1024)]))
            .expect("should convert");
        let e = &manifest.contents["model.pt"];
        assert_eq!(e.digest, "abc123");
        assert_eq!(e.size, 1024);
        assert_eq!(e.birth_artifact_id, None);
        assert_eq!(e.reference, None);
        assert_eq!(e.local_path, None);
        assert!(e.extra.is_empty());
        assert_eq!(manifest.version, 1);
        assert_eq!(manifest.storage_policy, "wandb-storage-policy-v1");
    }

    #[test]
    fn keeps_non_empty_optionals() {
        let mut e = entry("data/train.csv", "d1", 7);
        e.birth_artifact_id = "art-1".to_owned();
        e.reference = "s3://bucket/train.csv".to_owned();
        e.local_path = "/staging/train.csv".to_owned();
        let manifest = Manifest::from_wire(&record(vec![e])).unwrap();
        let got = manifest.entry_for_path("data/train.csv").unwrap();
        assert_eq!(got.birth_artifact_id.as_deref(), Some("art-1"));
        assert_eq!(got.reference.as_deref(), Some("s3://bucket/train.csv"));
        assert_eq!(got.local_path.as_deref(), Some("/staging/train.csv"));
        assert!(got.is_reference());
        assert_eq!(got.download_url, None);
    }

    #[test]
    fn decodes_extra_values_as_json() {
        let mut e = entry("a.bin", "d", 0);
        e.extra = vec![
            ExtraItem::new("etag", "\"abc\""),
            ExtraItem::new("parts", "[1, 2, 3]"),
            ExtraItem::new("meta", r#"{"nested": true}"#),
        ];
        let manifest = Manifest::from_wire(&record(vec![e])).unwrap();
        let extra = &manifest.contents["a.bin"].extra;
        assert_eq!(extra["etag"], Value::from("abc"));
        assert_eq!(extra["parts"], serde_json::json!([1, 2, 3]));
        assert_eq!(extra["meta"]["nested"], Value::Bool(true));
    }

    #[test]
    fn malformed_extra_fails_whole_conversion() {
        let mut bad = entry("b.bin", "d2", 2);
        bad.extra = vec![ExtraItem::new("etag", "{not json")];
        let result = Manifest::from_wire(&record(vec![entry("a.bin", "d1", 1), bad]));
        match result {
            Err(ManifestError::ExtraDecode { path, key, .. }) => {
                assert_eq!(path, "b.bin");
                assert_eq!(key, "etag");
            }
            other => panic!("expected ExtraDecode, got {other:?}"),
        }
    }

    #[test]
    fn storage_layout_is_always_v2() {
        let mut rec = record(vec![]);
        rec.storage_policy_config = vec![StoragePolicyConfigItem {
            key: "storageLayout".to_owned(),
            value_json: "\"V1\"".to_owned(),
        }];
        let manifest = Manifest::from_wire(&rec).unwrap();
        assert_eq!(manifest.storage_policy_config.storage_layout, STORAGE_LAYOUT_V2);
        assert!(manifest.is_empty());
    }

    #[test]
    fn duplicate_paths_last_wins_by_default() {
        let manifest = Manifest::from_wire(&record(vec![
            entry("x", "first", 1),
            entry("y", "other", 5),
            entry("x", "second", 2),
        ]))
        .unwrap();
        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest.contents["x"].digest, "second");
        assert_eq!(manifest.contents["x"].size, 2);
    }

    #[test]
    fn duplicate_paths_rejected_on_request() {
        let result = Manifest::from_wire_with(
            &record(vec![entry("x", "first", 1), entry("x", "second", 2)]),
            DuplicatePaths::Reject,
        );
        assert!(matches!(result, Err(ManifestError::DuplicatePath(p)) if p == "x"));
    }

    #[test]
    fn lookup_is_exact_match() {
        let manifest =
            Manifest::from_wire(&record(vec![entry("dir/file.txt", "d", 3)])).unwrap();
        assert_eq!(manifest.entry_for_path("dir/file.txt").unwrap().size, 3);
        for miss in ["./dir/file.txt", "DIR/file.txt", "dir\\file.txt", "dir/../dir/file.txt"] {
            let err = manifest.entry_for_path(miss).unwrap_err();
            assert!(matches!(err, ManifestError::EntryNotFound(ref p) if p == miss));
            assert!(err.to_string().contains(miss));
        }
    }

    #[test]
    fn serialization_omits_absent_and_local_fields() {
        let mut e = entry("model.pt", "abc123", 1024);
        e.local_path = "/tmp/model.pt".to_owned();
        let manifest = Manifest::from_wire(&record(vec![e])).unwrap();
        let value: Value = serde_json::from_slice(&manifest.to_json_vec().unwrap()).unwrap();
        let encoded = &value["contents"]["model.pt"];
        assert_eq!(encoded["birthArtifactID"], Value::Null);
        assert!(encoded.as_object().unwrap().contains_key("birthArtifactID"));
        assert!(encoded.get("ref").is_none());
        assert!(encoded.get("extra").is_none());
        assert!(encoded.get("localPath").is_none());
        assert!(encoded.get("downloadURL").is_none());
        assert_eq!(value["storagePolicyConfig"]["storageLayout"], "V2");
    }

    #[test]
    fn field_order_follows_schema() {
        let mut manifest = Manifest::new(1, "policy");
        let mut e = ManifestEntry::new("d", 4);
        e.reference = Some("file:///x".to_owned());
        e.extra.insert("k".to_owned(), Value::from(1));
        manifest.contents.insert("p".to_owned(), e);
        let text = String::from_utf8(manifest.to_json_vec().unwrap()).unwrap();
        assert_eq!(
            text,
            r#"{"version":1,"storagePolicy":"policy","storagePolicyConfig":{"storageLayout":"V2"},"contents":{"p":{"digest":"d","birthArtifactID":null,"ref":"file:///x","size":4,"extra":{"k":1}}}}"#
        );
    }

    #[test]
    fn decodes_manifest_file_format() {
        let input = r#"{"version":1,"storagePolicy":"v2","storagePolicyConfig":{"storageLayout":"V2"},"contents":{}}"#;
        let manifest = Manifest::from_json_str(input).unwrap();
        assert_eq!(manifest.version, 1);
        assert!(manifest.contents.is_empty());
    }

    #[test]
    fn decode_tolerates_null_extra_and_contents() {
        let manifest = Manifest::from_json_str(r#"{"version":2,"contents":null}"#).unwrap();
        assert!(manifest.is_empty());

        let manifest = Manifest::from_json_str(
            r#"{"version":2,"storagePolicy":"p","contents":{"a":{"digest":"d","birthArtifactID":"b","size":1,"extra":null}}}"#,
        )
        .unwrap();
        let e = manifest.entry_for_path("a").unwrap();
        assert!(e.extra.is_empty());
        assert_eq!(e.birth_artifact_id.as_deref(), Some("b"));
    }

    #[test]
    fn decode_ignores_local_only_fields() {
        let manifest = Manifest::from_json_str(
            r#"{"version":1,"contents":{"a":{"digest":"d","size":1,"localPath":"/x","downloadURL":"http://y"}}}"#,
        )
        .unwrap();
        let e = manifest.entry_for_path("a").unwrap();
        assert_eq!(e.local_path, None);
        assert_eq!(e.download_url, None);
    }

    #[test]
    fn total_size_saturates_instead_of_overflowing() {
        let manifest = Manifest::from_json_str(
            r#"{"version":1,"contents":{"a":{"digest":"d","size":9223372036854775807},"b":{"digest":"e","size":1}}}"#,
        )
        .unwrap();
        assert_eq!(manifest.total_size(), i64::MAX);

        let mut negative = Manifest::new(1, "p");
        negative
            .contents
            .insert("a".to_owned(), ManifestEntry::new("d", i64::MIN));
        negative
            .contents
            .insert("b".to_owned(), ManifestEntry::new("e", -1));
        assert_eq!(negative.total_size(), i64::MIN);
    }

    #[test]
    fn roundtrip_drops_only_local_fields() {
        let mut e = entry("a", "d1", 10);
        e.birth_artifact_id = "born".to_owned();
        e.local_path = "/local/a".to_owned();
        e.extra = vec![ExtraItem::new("etag", "\"e\"")];
        let manifest = Manifest::from_wire(&record(vec![e, entry("b", "d2", 20)])).unwrap();

        let back = Manifest::from_slice(&manifest.to_json_vec().unwrap()).unwrap();
        let mut expected = manifest.clone();
        for entry in expected.contents.values_mut() {
            entry.local_path = None;
            entry.download_url = None;
        }
        assert_eq!(back, expected);
        assert_eq!(back.total_size(), 30);
        assert_eq!(back.paths().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
