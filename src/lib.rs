pub mod batch;
pub mod command;
pub mod convert;
pub mod error;
pub mod jobs;
pub mod logging;
pub mod options;
pub mod probe;
pub mod runner;

pub use batch::{BatchEvent, BatchHandle, BatchSummary, BatchWorker, FileOutcome};
pub use convert::convert_file;
pub use error::{Error, Pass, Result};
pub use jobs::JobList;
pub use options::{ConvertOptions, Height, OutputMode, Quality, SharedOptions, SizeMode};
pub use runner::{CommandRunner, FfmpegRunner};
