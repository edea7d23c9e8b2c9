//! Map reconciliation CLI
//!
//! Loads a local and a remote map from JSON files (the editor's record
//! shape: `{"factors": [...], "links": [...]}`), then either diffs or
//! merges the remote map into the local one and prints the result.
//!
//! ## Configuration
//!
//! Environment variables:
//! - `RUST_LOG`: Log level filter (default: info)
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin reconcile --features cli -- diff local.json remote.json
//! cargo run --bin reconcile --features cli -- merge local.json remote.json merged.json
//! ```

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use reconcile_kernel::{
    CapturingEventLog, GraphStore, InMemoryGraphStore, Reconciler, RemoteSnapshot,
    UuidIdGenerator,
};

/// Initialize the tracing subscriber from `RUST_LOG`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "reconcile=info".into());
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn load_snapshot(path: &Path) -> Result<RemoteSnapshot, String> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    serde_json::from_slice(&bytes).map_err(|e| format!("cannot parse {}: {e}", path.display()))
}

async fn run() -> Result<(), String> {
    let args: Vec<String> = std::env::args().collect();
    let (command, local_path, remote_path, out_path) = match args.as_slice() {
        [_, cmd, local, remote] if cmd == "diff" => (cmd.as_str(), local, remote, None),
        [_, cmd, local, remote, out] if cmd == "merge" => {
            (cmd.as_str(), local, remote, Some(out))
        }
        _ => {
            return Err(
                "usage: reconcile diff <local.json> <remote.json>\n\
                 \x20      reconcile merge <local.json> <remote.json> <out.json>"
                    .to_string(),
            )
        }
    };

    let local = load_snapshot(Path::new(local_path)).await?;
    let remote = load_snapshot(Path::new(remote_path)).await?;

    let store = InMemoryGraphStore::from_graph(local.factors, local.links)
        .map_err(|e| format!("local map is not well formed: {e}"))?;
    let events = Arc::new(CapturingEventLog::new());
    let engine = Reconciler::new(Arc::new(store), Arc::new(UuidIdGenerator), events.clone());

    match command {
        "diff" => {
            let report = engine.diff(&remote).await.map_err(|e| e.to_string())?;
            for entry in report.iter() {
                println!("{entry}");
            }
            info!(discrepancies = report.len(), "diff complete");
        }
        "merge" => {
            let report = engine.merge(&remote).await.map_err(|e| e.to_string())?;
            for entry in events.entries() {
                println!("{}: {}", entry.category, entry.message);
            }
            info!(
                factors_added = report.factors_added,
                factors_cloned = report.factors_cloned,
                links_added = report.links_added,
                links_bridged = report.links_bridged,
                "merge complete"
            );

            let merged = RemoteSnapshot {
                factors: engine.store().factors().await.map_err(|e| e.to_string())?,
                links: engine.store().links().await.map_err(|e| e.to_string())?,
            };
            let json =
                serde_json::to_string_pretty(&merged).map_err(|e| e.to_string())?;
            let out = out_path.expect("merge requires an output path");
            tokio::fs::write(out, json)
                .await
                .map_err(|e| format!("cannot write {out}: {e}"))?;
        }
        _ => unreachable!(),
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("{msg}");
            ExitCode::FAILURE
        }
    }
}
