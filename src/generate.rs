//! Asset generation: walking an instruction set and producing files.
//!
//! This is the only stage that invokes compositors and touches the
//! destination filesystem. Entries within one instruction set share no
//! mutable state, so they are generated in parallel with rayon; the
//! exists-check → produce → write sequence for one path is a single logical
//! step per entry (two entries targeting the same path would be a caller
//! configuration error, not a race this module arbitrates).
//!
//! Override policy: when the target path exists and overwrite is disabled,
//! the entry's deferred producer is never invoked — no compositor work is
//! wasted — and the skip is reported. Failures are isolated per entry;
//! [`OnError`] decides whether the first failure fails the run or the run
//! continues and reports every failure.

use crate::compositor::Compositor;
use crate::config::AssetConfig;
use crate::entry::AssetKind;
use crate::instructions::InstructionSet;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("{kind} {url} (from {}): {message}", source_image.display())]
    Asset {
        kind: AssetKind,
        url: String,
        source_image: PathBuf,
        message: String,
    },
}

/// Destination filesystem collaborator.
///
/// `Sync` because entries are written from rayon worker threads.
pub trait AssetStore: Sync {
    fn exists(&self, path: &Path) -> bool;
    fn write(&self, path: &Path, bytes: &[u8]) -> std::io::Result<()>;
}

/// Writes to the real filesystem, creating parent directories as needed.
pub struct DiskStore;

impl AssetStore for DiskStore {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, bytes)
    }
}

/// What to do when one entry fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OnError {
    /// Fail the run with the first failure (remaining entries in the same
    /// parallel wave still finish).
    #[default]
    Abort,
    /// Record the failure and keep generating the other entries.
    Continue,
}

#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Regenerate assets whose target path already exists.
    pub overwrite: bool,
    pub on_error: OnError,
}

impl GenerateOptions {
    pub fn from_config(config: &AssetConfig) -> Self {
        Self {
            overwrite: config.generate.overwrite,
            on_error: if config.generate.continue_on_error {
                OnError::Continue
            } else {
                OnError::Abort
            },
        }
    }
}

/// Progress event, sent per entry as it settles.
#[derive(Debug, Clone)]
pub enum GenerateEvent {
    Written {
        kind: AssetKind,
        name: String,
    },
    Skipped {
        kind: AssetKind,
        name: String,
    },
    Failed {
        kind: AssetKind,
        name: String,
        message: String,
    },
}

/// One settled asset in the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRecord {
    pub kind: AssetKind,
    pub name: String,
    pub path: PathBuf,
}

/// A failed asset with enough context to be actionable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedAsset {
    pub kind: AssetKind,
    pub url: String,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct GenerateReport {
    pub written: Vec<AssetRecord>,
    pub skipped: Vec<AssetRecord>,
    pub failed: Vec<FailedAsset>,
}

impl GenerateReport {
    pub fn total(&self) -> usize {
        self.written.len() + self.skipped.len() + self.failed.len()
    }
}

enum Outcome {
    Written(AssetRecord),
    Skipped(AssetRecord),
    Failed(FailedAsset),
}

/// Generate every asset of one instruction set into `out_dir`.
///
/// Entries run concurrently. `progress` receives one event per entry; a
/// dropped receiver is ignored.
pub fn generate(
    set: &InstructionSet,
    compositor: &impl Compositor,
    store: &impl AssetStore,
    out_dir: &Path,
    options: &GenerateOptions,
    progress: Option<Sender<GenerateEvent>>,
) -> Result<GenerateReport, GenerateError> {
    let entries: Vec<_> = set.iter().collect();

    let outcomes: Vec<Outcome> = entries
        .par_iter()
        .map(|entry| {
            let path = out_dir.join(&entry.name);
            let record = AssetRecord {
                kind: entry.kind,
                name: entry.name.clone(),
                path: path.clone(),
            };
            if !options.overwrite && store.exists(&path) {
                return Outcome::Skipped(record);
            }
            let written = entry
                .image
                .produce(compositor)
                .map_err(|e| e.to_string())
                .and_then(|bytes| store.write(&path, &bytes).map_err(|e| e.to_string()));
            match written {
                Ok(()) => Outcome::Written(record),
                Err(message) => Outcome::Failed(FailedAsset {
                    kind: entry.kind,
                    url: entry.url.clone(),
                    message,
                }),
            }
        })
        .collect();

    let mut report = GenerateReport::default();
    for outcome in outcomes {
        match outcome {
            Outcome::Written(record) => {
                if let Some(tx) = &progress {
                    let _ = tx.send(GenerateEvent::Written {
                        kind: record.kind,
                        name: record.name.clone(),
                    });
                }
                report.written.push(record);
            }
            Outcome::Skipped(record) => {
                if let Some(tx) = &progress {
                    let _ = tx.send(GenerateEvent::Skipped {
                        kind: record.kind,
                        name: record.name.clone(),
                    });
                }
                report.skipped.push(record);
            }
            Outcome::Failed(failed) => {
                if let Some(tx) = &progress {
                    let _ = tx.send(GenerateEvent::Failed {
                        kind: failed.kind,
                        name: failed.url.clone(),
                        message: failed.message.clone(),
                    });
                }
                report.failed.push(failed);
            }
        }
    }

    if options.on_error == OnError::Abort
        && let Some(first) = report.failed.first()
    {
        return Err(GenerateError::Asset {
            kind: first.kind,
            url: first.url.clone(),
            source_image: set.source.clone(),
            message: first.message.clone(),
        });
    }

    Ok(report)
}
