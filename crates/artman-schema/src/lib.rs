//! Artifact manifest model, wire-format conversion, and entry lookup for Artman.
//!
//! This crate defines the schema layer: the in-memory [`Manifest`] and its
//! [`ManifestEntry`] records, the wire-format records delivered by the backend
//! ([`ArtifactManifestRecord`]), conversion from wire format
//! ([`Manifest::from_wire`]), and path lookup ([`Manifest::entry_for_path`]).
//! The JSON encoding of [`Manifest`] is the manifest file format.

pub mod manifest;
pub mod types;
pub mod wire;

pub use manifest::{
    DuplicatePaths, Manifest, ManifestEntry, ManifestError, StoragePolicyConfig,
    STORAGE_LAYOUT_V2,
};
pub use types::{EntryDigest, ManifestDigest};
pub use wire::{ArtifactManifestRecord, ExtraItem, ManifestEntryRecord, StoragePolicyConfigItem};
