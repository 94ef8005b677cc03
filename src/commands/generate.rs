//! Publish every post, once or on every change

use anyhow::{Context, Result};
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode, DebounceEventResult};
use std::sync::mpsc::channel;
use std::time::{Duration, Instant};

use crate::pipeline::{Pipeline, RunSummary};
use crate::publish::PublishOutcome;
use crate::{Site, CONFIG_FILE};

/// Run the pipeline over the whole site
pub fn run(site: &Site) -> Result<RunSummary> {
    let start = Instant::now();

    let mut pipeline = Pipeline::new(site)?;
    let summary = pipeline.run_all()?;

    tracing::info!(
        "Published {} posts ({} created, {} updated, {} unchanged) in {:.2}s",
        summary.published.len(),
        summary.count(PublishOutcome::Created),
        summary.count(PublishOutcome::Updated),
        summary.count(PublishOutcome::Unchanged),
        start.elapsed().as_secs_f64()
    );
    if !summary.pruned.is_empty() {
        tracing::info!("Removed output of {} posts no longer published", summary.pruned.len());
    }
    for (id, error) in &summary.failures {
        tracing::error!("{}: {}", id, error);
    }

    Ok(summary)
}

/// Watch the source tree and config, republishing after each burst of changes
pub fn watch(site: &Site) -> Result<()> {
    let (tx, rx) = channel::<DebounceEventResult>();
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    debouncer
        .watcher()
        .watch(&site.source_dir, RecursiveMode::Recursive)
        .with_context(|| format!("Failed to watch {:?}", site.source_dir))?;

    let config_path = site.base_dir.join(CONFIG_FILE);
    if config_path.exists() {
        debouncer
            .watcher()
            .watch(&config_path, RecursiveMode::NonRecursive)?;
    }

    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    for result in rx {
        match result {
            Ok(events) => {
                tracing::info!("{} file(s) changed, republishing...", events.len());
                for event in &events {
                    tracing::debug!("Changed: {:?}", event.path);
                }

                // The config may have changed too
                let current = match Site::new(&site.base_dir) {
                    Ok(current) => current,
                    Err(e) => {
                        tracing::error!("Failed to reload site: {:#}", e);
                        continue;
                    }
                };
                if let Err(e) = run(&current) {
                    tracing::error!("Generation failed: {:#}", e);
                }
            }
            Err(e) => tracing::error!("Watch error: {}", e),
        }
    }

    Ok(())
}
