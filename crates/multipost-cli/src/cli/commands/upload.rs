//! `multipost upload <FILE>...` – upload files through the HTTP upload plugin.

use anyhow::{Context, Result};
use multipost_core::config::MultipostConfig;
use multipost_core::file::UploadFile;
use multipost_core::host::{UploadCore, UploadEvent};
use multipost_core::plugin::HttpUpload;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use crate::cli::UploadArgs;

const PROGRESS_INTERVAL_MS: u128 = 500;

pub async fn run_upload(cfg: &MultipostConfig, args: &UploadArgs) -> Result<()> {
    let core = Arc::new(UploadCore::new());
    let per_file = args.file_options();
    let mut names = HashMap::new();

    for (index, path) in args.files.iter().enumerate() {
        let data = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("file-{}", index + 1));
        let id = (index + 1).to_string();
        let mut file = UploadFile::local(id.clone(), name.clone(), data).with_options(per_file.clone());
        for (key, value) in &args.meta {
            file = file.with_meta(key.clone(), meta_value(value));
        }
        names.insert(id, name);
        core.add_file(file);
    }

    let plugin = Arc::new(HttpUpload::with_curl(
        cfg.upload.clone(),
        cfg.transport.clone(),
    ));
    plugin.install(core.as_ref());

    let mut events = core.subscribe();
    let labels = names.clone();
    let printer = tokio::spawn(async move {
        let mut last_print: HashMap<String, Instant> = HashMap::new();
        while let Some(event) = events.recv().await {
            let label = labels
                .get(event.file_id())
                .map(String::as_str)
                .unwrap_or("?");
            match &event {
                UploadEvent::Started { .. } => println!("  {}: started", label),
                UploadEvent::Progress { file_id, progress } => {
                    let now = Instant::now();
                    let due = last_print
                        .get(file_id)
                        .map(|t| now.duration_since(*t).as_millis() >= PROGRESS_INTERVAL_MS)
                        .unwrap_or(true);
                    if due || progress.is_complete() {
                        println!(
                            "  {}: {:.1}% ({} / {} bytes)",
                            label,
                            progress.fraction() * 100.0,
                            progress.bytes_uploaded,
                            progress.bytes_total
                        );
                        last_print.insert(file_id.clone(), now);
                    }
                }
                UploadEvent::Success { .. } | UploadEvent::Error { .. } => {}
            }
        }
    });

    let outcomes = core.run().await;
    plugin.uninstall(core.as_ref());
    // Dropping the host closes the event channel and lets the printer finish.
    drop(core);
    let _ = printer.await;

    let mut failed = 0usize;
    for outcome in &outcomes {
        let label = names
            .get(&outcome.file_id)
            .map(String::as_str)
            .unwrap_or(&outcome.file_id);
        match &outcome.result {
            Ok(response) => match &response.url {
                Some(url) => println!("ok    {} -> {}", label, url),
                None => println!("ok    {} (HTTP {})", label, response.status),
            },
            Err(e) => {
                failed += 1;
                println!("error {}: {}", label, e);
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} upload(s) failed", failed, outcomes.len());
    }
    tracing::info!("uploaded {} file(s)", outcomes.len());
    Ok(())
}

/// `--meta` values that parse as JSON (numbers, booleans, ...) keep their type.
fn meta_value(raw: &str) -> serde_json::Value {
    serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.to_string()))
}
