use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

/// Which of the two ffmpeg invocations a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Palette,
    Encode,
}

impl std::fmt::Display for Pass {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Pass::Palette => formatter.write_str("palette generation"),
            Pass::Encode => formatter.write_str("gif encode"),
        }
    }
}

#[derive(thiserror::Error)]
pub enum Error {
    #[error(
        "ffmpeg not found in PATH: install it from https://ffmpeg.org or point --ffmpeg-dir at a bundled copy"
    )]
    FfmpegNotFound,

    #[error("ffprobe not found in PATH: install it from https://ffmpeg.org")]
    FfprobeNotFound,

    #[error("input file does not exist: {0}")]
    InputNotFound(PathBuf),

    #[error("no input files selected")]
    NoInputs,

    #[error("no video files among the given paths (supported: mp4, avi, mov, mkv)")]
    NoVideoFiles,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unknown quality tier {0:?} (expected high, medium or low)")]
    InvalidQuality(String),

    #[error("invalid height {0:?} (expected a pixel count or \"auto\")")]
    InvalidHeight(String),

    #[error("output directory does not exist: {0}")]
    OutputDirMissing(PathBuf),

    #[error("ffmpeg {pass} failed: {stderr}")]
    FfmpegFailed { pass: Pass, stderr: String },

    #[error("conversion worker thread panicked")]
    WorkerPanicked,

    #[error("ffprobe failed: {0}")]
    ProbeFailed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl std::fmt::Debug for Error {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{self}")
    }
}
