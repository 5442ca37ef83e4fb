use crate::digest::b64_md5;
use crate::StoreError;
use artman_schema::{Manifest, ManifestDigest};
use std::fs;
use std::path::Path;

/// Read and decode a manifest file.
pub fn read_manifest_file(path: &Path) -> Result<Manifest, StoreError> {
    let data = fs::read(path)?;
    serde_json::from_slice(&data).map_err(StoreError::Decode)
}

/// Read a manifest file, checking its bytes against `expected` before decoding.
pub fn verify_manifest_file(
    path: &Path,
    expected: &ManifestDigest,
) -> Result<Manifest, StoreError> {
    let data = fs::read(path)?;

    let actual = b64_md5(&data);
    if actual != *expected {
        return Err(StoreError::IntegrityFailure {
            path: path.display().to_string(),
            expected: expected.to_string(),
            actual: actual.into_inner(),
        });
    }

    serde_json::from_slice(&data).map_err(StoreError::Decode)
}
