//! Manifest file persistence and digest verification for Artman.
//!
//! This crate turns an in-memory [`Manifest`](artman_schema::Manifest) into a
//! uniquely named manifest file ready for upload ([`ManifestWriter`]), computes the
//! base64 MD5 digest that identifies the file's bytes ([`b64_md5`]), and reads
//! written files back with optional digest verification ([`verify_manifest_file`]).

pub mod digest;
pub mod verify;
pub mod writer;

pub use digest::b64_md5;
pub use verify::{read_manifest_file, verify_manifest_file};
pub use writer::{write_to_file, ManifestWriter, WrittenManifest, TEMP_FILE_PREFIX};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode manifest: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to decode manifest file: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("integrity check failed for '{path}': expected {expected}, got {actual}")]
    IntegrityFailure {
        path: String,
        expected: String,
        actual: String,
    },
}
