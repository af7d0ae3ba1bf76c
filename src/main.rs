mod cli;

use clap::Parser;
use cli::Cli;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Arc;
use vid2gif::batch::{self, BatchEvent, FileOutcome};
use vid2gif::command::worker_threads;
use vid2gif::error::{Error, Result};
use vid2gif::{BatchHandle, BatchWorker, FfmpegRunner, JobList, SharedOptions, logging};

const ERROR_LOG: &str = "error.log";

fn progress_bar(total: usize) -> ProgressBar {
    let bar = ProgressBar::new(total as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░"),
    );
    bar
}

fn write_error_log(log_path: &Path, error: &Error) {
    let contents = format!("Error: {error}\n");
    if let Err(write_error) = std::fs::write(log_path, contents) {
        tracing::warn!(%write_error, path = %log_path.display(), "could not write error log");
    }
}

/// Everything up to and including spawning the worker.
fn start_batch(args: &Cli) -> Result<BatchHandle> {
    let options = args.convert_options()?;
    options.validate()?;

    let runner = match &args.ffmpeg_dir {
        Some(directory) => FfmpegRunner::with_bundled_dir(directory)?,
        None => FfmpegRunner::new(),
    };
    runner.ensure_available()?;

    let mut jobs = JobList::new();
    for skipped in jobs.accept_dropped(args.inputs.iter().cloned())? {
        tracing::warn!(path = %skipped.display(), "skipping file that is not a supported video");
    }

    let threads = worker_threads(num_cpus::get());
    tracing::info!(files = jobs.len(), threads, "starting conversion");

    BatchWorker::spawn(
        jobs.snapshot(),
        SharedOptions::new(options),
        Arc::new(runner),
        threads,
    )
}

/// Returns whether every file converted. Startup failures are also written to `error_log`.
fn run(args: &Cli, error_log: &Path) -> Result<bool> {
    let handle = start_batch(args).inspect_err(|error| write_error_log(error_log, error))?;

    let bar = progress_bar(0);
    for event in handle.events() {
        match event {
            BatchEvent::Started { index, total, path } => {
                bar.set_length(total as u64);
                bar.set_message(batch::converting_status(&path, index, total));
            }
            BatchEvent::Finished {
                path,
                outcome: FileOutcome::Failed(message),
                ..
            } => {
                bar.println(format!("failed: {}: {message}", path.display()));
                bar.inc(1);
            }
            BatchEvent::Finished { .. } => bar.inc(1),
            BatchEvent::Done(summary) => {
                bar.finish_with_message(batch::done_status(summary.total));
            }
        }
    }

    let summary = handle.join()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        eprintln!(
            "converted {} of {} file(s), {} failed",
            summary.succeeded,
            summary.total,
            summary.failed.len()
        );
        for path in &summary.converted {
            eprintln!("  {}", path.display());
        }
        for path in &summary.overwritten {
            eprintln!("warning: {} was written more than once", path.display());
        }
    }

    Ok(summary.all_succeeded())
}

fn main() {
    let args = Cli::parse();
    logging::init(args.verbose);

    match run(&args, Path::new(ERROR_LOG)) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(error) => {
            eprintln!("error: {error}");
            std::process::exit(1);
        }
    }
}
