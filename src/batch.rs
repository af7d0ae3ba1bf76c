use crate::command;
use crate::convert::convert_file;
use crate::error::{Error, Result};
use crate::options::SharedOptions;
use crate::runner::CommandRunner;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc;
use std::thread::JoinHandle;

#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    Converted(PathBuf),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum BatchEvent {
    Started {
        index: usize,
        total: usize,
        path: PathBuf,
    },
    Finished {
        index: usize,
        total: usize,
        path: PathBuf,
        outcome: FileOutcome,
    },
    Done(BatchSummary),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedFile {
    pub path: PathBuf,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub converted: Vec<PathBuf>,
    pub failed: Vec<FailedFile>,
    /// Gifs written more than once because two inputs share a stem.
    pub overwritten: Vec<PathBuf>,
}

impl BatchSummary {
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

pub fn progress_percent(done: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    done as f64 / total as f64 * 100.0
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or(path.as_os_str())
        .to_string_lossy()
        .into_owned()
}

pub fn converting_status(path: &Path, index: usize, total: usize) -> String {
    format!("converting {} ({}/{})", display_name(path), index + 1, total)
}

pub fn done_status(total: usize) -> String {
    format!("done ({total}/{total})")
}

/// Converts `files` one after another, reporting through `on_event`.
/// Options are re-read before every file.
pub fn run_batch(
    files: &[PathBuf],
    options: &SharedOptions,
    runner: &dyn CommandRunner,
    threads: usize,
    mut on_event: impl FnMut(BatchEvent),
) -> BatchSummary {
    let total = files.len();
    let mut summary = BatchSummary {
        total,
        ..Default::default()
    };

    for (index, path) in files.iter().enumerate() {
        tracing::info!("{}", converting_status(path, index, total));
        on_event(BatchEvent::Started {
            index,
            total,
            path: path.clone(),
        });

        let current = options.current();
        let planned = command::gif_output_path(path, &current);
        if summary.converted.contains(&planned) {
            tracing::warn!(
                output = %planned.display(),
                input = %path.display(),
                "output already written earlier in this batch, it will be overwritten"
            );
        }

        let outcome = match convert_file(runner, path, &current, threads) {
            Ok(output) => {
                tracing::info!(output = %output.display(), "converted {}", display_name(path));
                summary.succeeded += 1;
                if summary.converted.contains(&output) && !summary.overwritten.contains(&output) {
                    summary.overwritten.push(output.clone());
                }
                summary.converted.push(output.clone());
                FileOutcome::Converted(output)
            }
            Err(error) => {
                tracing::error!(input = %path.display(), %error, "conversion failed");
                summary.failed.push(FailedFile {
                    path: path.clone(),
                    error: error.to_string(),
                });
                FileOutcome::Failed(error.to_string())
            }
        };

        tracing::debug!(
            percent = progress_percent(index + 1, total),
            "batch progress"
        );
        on_event(BatchEvent::Finished {
            index,
            total,
            path: path.clone(),
            outcome,
        });
    }

    tracing::info!(
        succeeded = summary.succeeded,
        failed = summary.failed.len(),
        "{}",
        done_status(total)
    );
    on_event(BatchEvent::Done(summary.clone()));
    summary
}

pub struct BatchWorker;

impl BatchWorker {
    /// Starts the single background thread that works through `files`.
    pub fn spawn(
        files: Vec<PathBuf>,
        options: SharedOptions,
        runner: Arc<dyn CommandRunner>,
        threads: usize,
    ) -> Result<BatchHandle> {
        if files.is_empty() {
            return Err(Error::NoInputs);
        }

        let (sender, receiver) = mpsc::channel();

        let thread = std::thread::Builder::new()
            .name("vid2gif-worker".into())
            .spawn(move || {
                run_batch(&files, &options, runner.as_ref(), threads, |event| {
                    let _ = sender.send(event);
                })
            })?;

        Ok(BatchHandle { receiver, thread })
    }
}

pub struct BatchHandle {
    receiver: mpsc::Receiver<BatchEvent>,
    thread: JoinHandle<BatchSummary>,
}

impl BatchHandle {
    /// Blocks for each event until the worker hangs up.
    pub fn events(&self) -> impl Iterator<Item = BatchEvent> + '_ {
        self.receiver.iter()
    }

    pub fn try_next(&self) -> Option<BatchEvent> {
        self.receiver.try_recv().ok()
    }

    pub fn join(self) -> Result<BatchSummary> {
        self.thread.join().map_err(|_| Error::WorkerPanicked)
    }
}
