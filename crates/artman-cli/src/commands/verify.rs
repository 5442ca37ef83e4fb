use super::{json_pretty, store_error_message, EXIT_SUCCESS};
use artman_schema::ManifestDigest;
use std::path::Path;

pub fn run(manifest_path: &Path, digest: &str, json: bool) -> Result<u8, String> {
    let expected = ManifestDigest::new(digest);
    let manifest = artman_store::verify_manifest_file(manifest_path, &expected)
        .map_err(|e| store_error_message(&e))?;

    if json {
        let payload = serde_json::json!({
            "path": manifest_path,
            "digest": expected,
            "verified": true,
            "entries": manifest.len(),
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!(
            "verified {} ({} entries)",
            manifest_path.display(),
            manifest.len()
        );
    }
    Ok(EXIT_SUCCESS)
}
