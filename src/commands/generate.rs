//! Generate the sitemap and data files

use anyhow::Result;
use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebounceEventResult};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};

use crate::generator::{Generator, PublishedContent};
use crate::{Site, CONFIG_FILE};

/// Load every collection and write the output files
pub async fn run(site: &Site) -> Result<()> {
    let start = std::time::Instant::now();

    let content = PublishedContent::load(site).await?;
    for (kind, items) in content.iter() {
        tracing::info!("Loaded {} published {}", items.len(), kind);
    }

    Generator::new(site).generate(&content)?;

    let duration = start.elapsed();
    tracing::info!(
        "Generated {} items in {:.2}s",
        content.total(),
        duration.as_secs_f64()
    );

    Ok(())
}

/// Watch the content directory and config file, regenerating on change.
/// Each successful rebuild is announced on `reload_tx` when given.
pub async fn watch(site: &Site, reload_tx: Option<broadcast::Sender<()>>) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();

    // Debounce events to avoid multiple rapid rebuilds
    let mut debouncer = new_debouncer(Duration::from_millis(500), move |res: DebounceEventResult| {
        let _ = tx.send(res);
    })?;

    if site.content_dir.exists() {
        debouncer
            .watcher()
            .watch(&site.content_dir, RecursiveMode::Recursive)?;
        tracing::debug!("Watching: {:?}", site.content_dir);
    }

    let config_path = site.base_dir.join(CONFIG_FILE);
    if config_path.exists() {
        debouncer
            .watcher()
            .watch(&config_path, RecursiveMode::NonRecursive)?;
        tracing::debug!("Watching: {:?}", config_path);
    }

    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    while let Some(result) = rx.recv().await {
        match result {
            Ok(events) => {
                let changed: Vec<_> = events
                    .iter()
                    .filter(|e| {
                        let path_str = e.path.to_string_lossy();
                        !path_str.contains(".git")
                            && !path_str.contains(".DS_Store")
                            && !path_str.ends_with('~')
                    })
                    .collect();

                if changed.is_empty() {
                    continue;
                }

                for event in &changed {
                    tracing::info!("File changed: {}", event.path.display());
                }

                // Reload the config so edits to it take effect
                let rebuilt = match Site::new(&site.base_dir) {
                    Ok(fresh) => run(&fresh).await,
                    Err(e) => Err(e),
                };

                match rebuilt {
                    Ok(()) => {
                        if let Some(tx) = &reload_tx {
                            let _ = tx.send(());
                        }
                    }
                    Err(e) => tracing::error!("Generation failed: {}", e),
                }
            }
            Err(e) => tracing::error!("Watch error: {:?}", e),
        }
    }

    Ok(())
}
