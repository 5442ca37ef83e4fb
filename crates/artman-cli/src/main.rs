mod commands;

use clap::{Parser, Subcommand};
use commands::{EXIT_FAILURE, EXIT_MANIFEST_ERROR, EXIT_REMOTE_ERROR, EXIT_STORE_ERROR};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "artman",
    version,
    about = "Convert, write, verify, and fetch artifact manifests"
)]
struct Cli {
    /// Output results as structured JSON.
    #[arg(long, default_value_t = false, global = true)]
    json: bool,

    /// Enable verbose (debug) logging output.
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    /// Enable trace-level logging (more detailed than --verbose).
    #[arg(long, default_value_t = false, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Convert a wire-format manifest (proto JSON) and write the manifest file.
    Convert {
        /// Path to the wire-format JSON record.
        wire: PathBuf,
        /// Directory for the manifest file (defaults to the system temp directory).
        #[arg(long)]
        out_dir: Option<PathBuf>,
        /// Fail if a path appears more than once instead of keeping the last entry.
        #[arg(long, default_value_t = false)]
        reject_duplicates: bool,
    },
    /// Show the entry for an artifact-relative path in a manifest file.
    Lookup {
        /// Path to the manifest JSON file.
        manifest: PathBuf,
        /// Artifact-relative path, matched exactly.
        path: String,
    },
    /// Fetch a published manifest from a URL.
    Fetch {
        /// Manifest URL.
        url: String,
        /// Show only the entry for this artifact-relative path.
        #[arg(long)]
        entry: Option<String>,
        /// Accept an undecodable body as an empty manifest.
        #[arg(long, default_value_t = false)]
        lenient: bool,
        /// Request timeout in seconds.
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Check a manifest file against its base64 MD5 digest.
    Verify {
        /// Path to the manifest JSON file.
        manifest: PathBuf,
        /// Expected base64 MD5 digest.
        digest: String,
    },
}

fn main() -> ExitCode {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let msg = info.to_string();
        if msg.contains("Broken pipe")
            || msg.contains("broken pipe")
            || msg.contains("os error 32")
            || msg.contains("failed printing to stdout")
        {
            std::process::exit(0);
        }
        default_hook(info);
    }));

    let cli = Cli::parse();

    let default_level = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("ARTMAN_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let json_output = cli.json;

    let result = match cli.command {
        Commands::Convert {
            wire,
            out_dir,
            reject_duplicates,
        } => commands::convert::run(&wire, out_dir.as_deref(), reject_duplicates, json_output),
        Commands::Lookup { manifest, path } => {
            commands::lookup::run(&manifest, &path, json_output)
        }
        Commands::Fetch {
            url,
            entry,
            lenient,
            timeout,
        } => commands::fetch::run(&url, entry.as_deref(), lenient, timeout, json_output),
        Commands::Verify { manifest, digest } => {
            commands::verify::run(&manifest, &digest, json_output)
        }
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(msg) => {
            eprintln!("error: {msg}");
            ExitCode::from(exit_code_for(&msg))
        }
    }
}

fn exit_code_for(msg: &str) -> u8 {
    if msg.starts_with("manifest error:") {
        EXIT_MANIFEST_ERROR
    } else if msg.starts_with("store error:") {
        EXIT_STORE_ERROR
    } else if msg.starts_with("remote error:") {
        EXIT_REMOTE_ERROR
    } else {
        EXIT_FAILURE
    }
}
