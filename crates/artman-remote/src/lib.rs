//! Fetching published artifact manifests for Artman.
//!
//! This crate provides [`ManifestLoader`], which downloads a manifest file with a
//! single unauthenticated GET and decodes it, and [`LoaderConfig`], the JSON
//! configuration for the loader's timeout and decode compatibility settings.

pub mod config;
pub mod loader;

pub use config::LoaderConfig;
pub use loader::{load_manifest_from_url, ManifestLoader};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("request to get manifest from {url} failed with status code: {status}")]
    Status { status: u16, url: String },
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("error reading response body: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to decode manifest: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("remote config error: {0}")]
    Config(String),
}

impl RemoteError {
    /// HTTP status code for [`RemoteError::Status`], `None` otherwise.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
