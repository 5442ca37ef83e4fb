use super::{json_pretty, EXIT_SUCCESS};
use artman_schema::{ArtifactManifestRecord, DuplicatePaths, Manifest};
use artman_store::ManifestWriter;
use std::path::Path;

pub fn run(
    wire: &Path,
    out_dir: Option<&Path>,
    reject_duplicates: bool,
    json: bool,
) -> Result<u8, String> {
    let record =
        ArtifactManifestRecord::from_json_file(wire).map_err(|e| format!("manifest error: {e}"))?;
    let duplicates = if reject_duplicates {
        DuplicatePaths::Reject
    } else {
        DuplicatePaths::LastWins
    };
    let manifest =
        Manifest::from_wire_with(&record, duplicates).map_err(|e| format!("manifest error: {e}"))?;

    let writer = out_dir.map_or_else(ManifestWriter::default, ManifestWriter::new);
    let written = writer
        .write(&manifest)
        .map_err(|e| format!("store error: {e}"))?;

    if json {
        let payload = serde_json::json!({
            "path": written.path,
            "digest": written.digest,
            "size": written.size,
            "entries": manifest.len(),
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!("wrote {}", written.path.display());
        println!("digest:      {}", written.digest);
        println!("entries:     {}", manifest.len());
        println!("total size:  {}", manifest.total_size());
    }
    Ok(EXIT_SUCCESS)
}
