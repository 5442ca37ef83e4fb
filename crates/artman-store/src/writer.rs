use crate::digest::b64_md5;
use crate::StoreError;
use artman_schema::{Manifest, ManifestDigest};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const TEMP_FILE_PREFIX: &str = "tmpfile-";

/// A manifest file left on disk by [`ManifestWriter::write`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenManifest {
    pub path: PathBuf,
    /// Base64 MD5 of the file's exact bytes.
    pub digest: ManifestDigest,
    pub size: u64,
}

/// Writes manifests to uniquely named files in a directory.
///
/// Each call creates a fresh file, so concurrent writers never share a path.
/// Files are left in place for the caller to upload and remove.
#[derive(Debug, Clone)]
pub struct ManifestWriter {
    dir: PathBuf,
}

impl Default for ManifestWriter {
    fn default() -> Self {
        Self::new(std::env::temp_dir())
    }
}

impl ManifestWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Serialize `manifest` and write it to a new file.
    ///
    /// If the write fails the partially written file is removed before the error
    /// is returned.
    pub fn write(&self, manifest: &Manifest) -> Result<WrittenManifest, StoreError> {
        let data = manifest.to_json_vec().map_err(StoreError::Encode)?;
        let path = self.persist(&data, |file, data| file.write_all(data))?;

        let digest = b64_md5(&data);
        debug!(
            "wrote manifest {} ({} bytes, {} entries, md5 {digest})",
            path.display(),
            data.len(),
            manifest.len()
        );

        Ok(WrittenManifest {
            path,
            digest,
            size: data.len() as u64,
        })
    }

    /// Create a fresh file, hand it to `fill`, then sync and keep it. The file is
    /// deleted if any step fails.
    fn persist<F>(&self, data: &[u8], fill: F) -> Result<PathBuf, StoreError>
    where
        F: FnOnce(&mut File, &[u8]) -> io::Result<()>,
    {
        let mut tmp = tempfile::Builder::new()
            .prefix(TEMP_FILE_PREFIX)
            .suffix(".json")
            .tempfile_in(&self.dir)?;
        fill(tmp.as_file_mut(), data)?;
        tmp.as_file().sync_all()?;
        let (_file, path) = tmp.keep().map_err(|e| StoreError::Io(e.error))?;
        Ok(path)
    }
}

/// Write `manifest` to a new file in the system temp directory.
pub fn write_to_file(manifest: &Manifest) -> Result<WrittenManifest, StoreError> {
    ManifestWriter::default().write(manifest)
}
