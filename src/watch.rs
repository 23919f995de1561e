//! Rebuild-on-change.
//!
//! Watches the parent directories of the input files rather than the files
//! themselves, since editors often save by replacing the file.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use notify::{Event, EventKind, RecursiveMode, Watcher};
use thiserror::Error;
use tracing::{info, warn};

/// Quiet period after a change before rebuilding.
pub const DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Error, Debug)]
pub enum WatchError {
    #[error("File watcher failed: {0}")]
    Notify(#[from] notify::Error),

    #[error("Cannot watch '{}': {}", .path.display(), .source)]
    Path {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Calls `rebuild` after every burst of changes to `paths`.
///
/// Blocks until the watcher shuts down. Errors from `rebuild` are the
/// callback's business; watching continues regardless.
pub fn watch<F>(paths: &[PathBuf], debounce: Duration, mut rebuild: F) -> Result<(), WatchError>
where
    F: FnMut(),
{
    let targets = canonical_targets(paths)?;
    let (tx, rx) = mpsc::channel::<notify::Result<Event>>();
    let mut watcher = notify::recommended_watcher(tx)?;

    let dirs: BTreeSet<&Path> = targets.iter().filter_map(|p| p.parent()).collect();
    for dir in dirs {
        watcher.watch(dir, RecursiveMode::NonRecursive)?;
    }
    info!("Watching {} file(s) for changes...", targets.len());

    while let Ok(event) = rx.recv() {
        match event {
            Ok(event) if is_relevant(&event, &targets) => {
                thread::sleep(debounce);
                // Collapse the burst of events an editor save produces
                while rx.try_recv().is_ok() {}
                info!("Recompiling...");
                rebuild();
            }
            Ok(_) => {}
            Err(e) => warn!("watch error: {}", e),
        }
    }
    Ok(())
}

fn canonical_targets(paths: &[PathBuf]) -> Result<Vec<PathBuf>, WatchError> {
    paths
        .iter()
        .map(|path| {
            path.canonicalize().map_err(|source| WatchError::Path {
                path: path.clone(),
                source,
            })
        })
        .collect()
}

/// Whether `event` changes the content of one of `targets`.
pub fn is_relevant(event: &Event, targets: &[PathBuf]) -> bool {
    let content_change = matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    );
    content_change
        && event.paths.iter().any(|path| {
            targets.iter().any(|t| t == path)
                || path
                    .canonicalize()
                    .map(|c| targets.contains(&c))
                    .unwrap_or(false)
        })
}
