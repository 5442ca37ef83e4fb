pub mod convert;
pub mod fetch;
pub mod lookup;
pub mod verify;

use artman_remote::LoaderConfig;
use artman_schema::ManifestEntry;
use artman_store::StoreError;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_MANIFEST_ERROR: u8 = 2;
pub const EXIT_STORE_ERROR: u8 = 3;
pub const EXIT_REMOTE_ERROR: u8 = 4;

pub fn json_pretty(value: &impl serde::Serialize) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("JSON serialization failed: {e}"))
}

pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .expect("valid template")
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(msg.to_owned());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

pub fn spin_ok(pb: &ProgressBar, msg: &str) {
    pb.set_style(ProgressStyle::with_template("{msg}").expect("valid template"));
    pb.finish_with_message(format!("✓ {msg}"));
}

pub fn spin_fail(pb: &ProgressBar, msg: &str) {
    pb.set_style(ProgressStyle::with_template("{msg}").expect("valid template"));
    pb.finish_with_message(format!("✗ {msg}"));
}

pub fn entry_kind(entry: &ManifestEntry) -> &'static str {
    if entry.is_reference() {
        "reference"
    } else {
        "file"
    }
}

pub fn colorize_kind(kind: &str) -> String {
    use console::Style;
    match kind {
        "file" => Style::new().green().apply_to(kind).to_string(),
        "reference" => Style::new().cyan().apply_to(kind).to_string(),
        other => other.to_owned(),
    }
}

/// JSON view of an entry, keyed the way the manifest file keys it.
pub fn entry_json(path: &str, entry: &ManifestEntry) -> serde_json::Value {
    serde_json::json!({
        "path": path,
        "kind": entry_kind(entry),
        "digest": entry.digest,
        "birthArtifactID": entry.birth_artifact_id,
        "ref": entry.reference,
        "size": entry.size,
        "extra": entry.extra,
    })
}

pub fn print_entry(path: &str, entry: &ManifestEntry) {
    println!("path:        {path}");
    println!("kind:        {}", colorize_kind(entry_kind(entry)));
    println!("digest:      {}", entry.digest);
    println!("size:        {}", entry.size);
    println!(
        "birth:       {}",
        entry.birth_artifact_id.as_deref().unwrap_or("(none)")
    );
    if let Some(reference) = &entry.reference {
        println!("ref:         {reference}");
    }
    for (key, value) in &entry.extra {
        println!("extra.{key}: {value}");
    }
}

/// Store failures keep the `store error:` prefix, except a file that reads fine but
/// does not decode, which is a manifest problem.
pub fn store_error_message(err: &StoreError) -> String {
    match err {
        StoreError::Decode(_) => format!("manifest error: {err}"),
        _ => format!("store error: {err}"),
    }
}

/// Loader settings from the config file when present, with command-line flags on top.
pub fn loader_config(lenient: bool, timeout: Option<u64>) -> Result<LoaderConfig, String> {
    let config = LoaderConfig::load_default().map_err(|e| format!("remote error: {e}"))?;
    Ok(apply_loader_flags(config, lenient, timeout))
}

/// Command-line flags win over file settings; unset flags leave them alone.
pub fn apply_loader_flags(
    mut config: LoaderConfig,
    lenient: bool,
    timeout: Option<u64>,
) -> LoaderConfig {
    if lenient {
        config.lenient_decode = true;
    }
    if let Some(secs) = timeout {
        config.timeout_secs = Some(secs);
    }
    config
}
