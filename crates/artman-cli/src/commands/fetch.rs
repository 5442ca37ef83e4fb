use super::{
    entry_json, json_pretty, loader_config, print_entry, spin_fail, spin_ok, spinner,
    EXIT_SUCCESS,
};
use artman_remote::ManifestLoader;

pub fn run(
    url: &str,
    entry: Option<&str>,
    lenient: bool,
    timeout: Option<u64>,
    json: bool,
) -> Result<u8, String> {
    let loader = ManifestLoader::new(loader_config(lenient, timeout)?);

    let pb = spinner("fetching manifest…");
    let manifest = loader.load(url).map_err(|e| {
        spin_fail(&pb, "fetch failed");
        format!("remote error: {e}")
    })?;
    spin_ok(&pb, "fetch complete");

    if let Some(path) = entry {
        let found = manifest
            .entry_for_path(path)
            .map_err(|e| format!("manifest error: {e}"))?;
        if json {
            println!("{}", json_pretty(&entry_json(path, found))?);
        } else {
            print_entry(path, found);
        }
        return Ok(EXIT_SUCCESS);
    }

    if json {
        let payload = serde_json::json!({
            "url": url,
            "version": manifest.version,
            "storagePolicy": manifest.storage_policy,
            "storageLayout": manifest.storage_policy_config.storage_layout,
            "entries": manifest.len(),
            "totalSize": manifest.total_size(),
            "paths": manifest.paths().collect::<Vec<_>>(),
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!("version:        {}", manifest.version);
        println!("storage policy: {}", manifest.storage_policy);
        println!(
            "storage layout: {}",
            manifest.storage_policy_config.storage_layout
        );
        println!("entries:        {}", manifest.len());
        println!("total size:     {}", manifest.total_size());
        for path in manifest.paths() {
            println!("  {path}");
        }
    }
    Ok(EXIT_SUCCESS)
}
