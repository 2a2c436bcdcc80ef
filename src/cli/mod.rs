//! Command-line interface
//!
//! `serve` runs the HTTP endpoint; `predict` runs one table through the same
//! pipeline locally and prints the response body.

use clap::{Parser, Subcommand};
use colored::*;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::cache::ModelCache;
use crate::model::FileModelLoader;
use crate::server::{parse_methods, pipeline, run_server, Diagnostic, ServerConfig};

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn ok(s: &str) -> ColoredString { s.truecolor(100, 210, 120) }
fn fail(s: &str) -> ColoredString { s.truecolor(230, 100, 100) }

// Progress goes to stderr so stdout stays pure JSON.
fn step_run(msg: &str) {
    eprint!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    eprintln!("{} {}", ok("done"), dim(detail));
}

fn step_failed(detail: &str) {
    eprintln!("{} {}", fail("failed"), dim(detail));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "tabular-serve")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Serve predictions for a pre-trained model over table JSON")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the prediction server
    Serve {
        /// Bind address (default: API_HOST or 0.0.0.0)
        #[arg(long)]
        host: Option<String>,

        /// Port (default: API_PORT or 8080)
        #[arg(short, long)]
        port: Option<u16>,

        /// Directory relative model URIs are resolved against
        #[arg(long)]
        model_root: Option<PathBuf>,

        /// Seconds a loaded model stays cached
        #[arg(long)]
        cache_ttl_secs: Option<u64>,

        /// Only answer these methods, e.g. `--allow-method POST`
        #[arg(long = "allow-method", value_name = "METHOD")]
        allow_methods: Vec<String>,

        /// Answer failures with 4xx/5xx status codes instead of 200
        #[arg(long)]
        error_status_codes: bool,
    },

    /// Run one table through a model and print the response
    Predict {
        /// Table JSON file (pandas orient="table")
        #[arg(short, long)]
        data: PathBuf,

        /// Model URI
        #[arg(short, long)]
        model_uri: String,

        /// Column to write predictions to
        #[arg(short, long)]
        target: String,

        /// Write the response here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

pub async fn cmd_serve(
    host: Option<String>,
    port: Option<u16>,
    model_root: Option<PathBuf>,
    cache_ttl_secs: Option<u64>,
    allow_methods: &[String],
    error_status_codes: bool,
) -> anyhow::Result<()> {
    let mut config = ServerConfig::default();
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }
    if let Some(root) = model_root {
        config = config.with_model_root(root.to_string_lossy());
    }
    if let Some(ttl) = cache_ttl_secs {
        config = config.with_cache_ttl(ttl);
    }
    if !allow_methods.is_empty() {
        config = config.with_allowed_methods(parse_methods(&allow_methods.join(",")));
    }
    if error_status_codes {
        config = config.with_error_status_codes(true);
    }

    run_server(config).await
}

pub fn cmd_predict(
    data_path: &Path,
    model_uri: &str,
    target: &str,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    step_run("Reading table");
    let text = std::fs::read_to_string(data_path)?;
    let data: Value = serde_json::from_str(&text)?;
    let rows = data["data"].as_array().map_or(0, Vec::len);
    step_done(&format!("{} rows", rows));

    let config = ServerConfig::default();
    let loader = match config.model_root {
        Some(ref root) => FileModelLoader::new().with_root(root),
        None => FileModelLoader::new(),
    };
    let cache = ModelCache::new(Arc::new(loader), Duration::from_secs(config.cache_ttl_secs));

    let request = json!({
        "model_uri": model_uri,
        "target": target,
        "data": data,
    });
    let body = serde_json::to_vec(&request)?;

    step_run("Predicting");
    let start = Instant::now();
    let (response, failure) = match pipeline::run_predict(&cache, &body) {
        Ok(table) => {
            step_done(&format!("{:.1}ms", start.elapsed().as_secs_f64() * 1000.0));
            (table, None)
        }
        Err(err) => {
            step_failed(err.kind());
            let kind = err.kind();
            (Diagnostic::from_error(err, false).body(), Some(kind))
        }
    };

    let rendered = serde_json::to_string_pretty(&response)?;
    match output {
        Some(path) => {
            std::fs::write(path, rendered)?;
            eprintln!("  {} {}", ok("✓"), format!("Response written to {}", path.display()));
        }
        None => println!("{}", rendered),
    }

    match failure {
        Some(kind) => anyhow::bail!("prediction failed ({})", kind),
        None => Ok(()),
    }
}
