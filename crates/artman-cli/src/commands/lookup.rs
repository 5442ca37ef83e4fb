use super::{entry_json, json_pretty, print_entry, store_error_message, EXIT_SUCCESS};
use std::path::Path;

pub fn run(manifest_path: &Path, path: &str, json: bool) -> Result<u8, String> {
    let manifest =
        artman_store::read_manifest_file(manifest_path).map_err(|e| store_error_message(&e))?;
    let entry = manifest
        .entry_for_path(path)
        .map_err(|e| format!("manifest error: {e}"))?;

    if json {
        println!("{}", json_pretty(&entry_json(path, entry))?);
    } else {
        print_entry(path, entry);
    }
    Ok(EXIT_SUCCESS)
}
