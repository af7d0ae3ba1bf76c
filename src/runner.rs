use crate::command::FfmpegCommand;
use crate::error::{Error, Pass, Result};
use crate::probe::{self, VideoInfo};
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;

const STDERR_TAIL_LINES: usize = 20;

/// Executes the external tools a conversion needs.
pub trait CommandRunner: Send + Sync {
    fn run(&self, pass: Pass, command: &FfmpegCommand) -> Result<()>;

    fn probe(&self, input: &Path) -> Result<VideoInfo>;
}

/// Spawns the real `ffmpeg`/`ffprobe` binaries.
#[derive(Debug, Clone, Default)]
pub struct FfmpegRunner {
    search_path: Option<OsString>,
}

impl FfmpegRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks in `directory` before the inherited `PATH`.
    pub fn with_bundled_dir(directory: &Path) -> Result<Self> {
        let mut entries: Vec<PathBuf> = vec![directory.to_path_buf()];
        if let Some(inherited) = std::env::var_os("PATH") {
            entries.extend(std::env::split_paths(&inherited));
        }
        let joined = std::env::join_paths(entries)
            .map_err(|error| Error::InvalidInput(format!("bad ffmpeg directory: {error}")))?;
        Ok(Self {
            search_path: Some(joined),
        })
    }

    fn locate(&self, binary: &str) -> Option<PathBuf> {
        match &self.search_path {
            Some(search_path) => {
                let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
                which::which_in(binary, Some(search_path), cwd).ok()
            }
            None => which::which(binary).ok(),
        }
    }

    /// Fails with install guidance when ffmpeg cannot be found.
    pub fn ensure_available(&self) -> Result<PathBuf> {
        let ffmpeg = self.locate("ffmpeg").ok_or(Error::FfmpegNotFound)?;
        tracing::debug!(path = %ffmpeg.display(), "found ffmpeg");
        if self.locate("ffprobe").is_none() {
            tracing::warn!("ffprobe not found, inputs will not be inspected before conversion");
        }
        Ok(ffmpeg)
    }

    fn command(&self, program: &str) -> Command {
        let resolved = self
            .locate(program)
            .map(PathBuf::into_os_string)
            .unwrap_or_else(|| OsString::from(program));
        let mut command = Command::new(resolved);
        if let Some(search_path) = &self.search_path {
            command.env("PATH", search_path);
        }
        command
    }
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().filter(|line| !line.trim().is_empty()).collect();
    let skip = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[skip..].join("\n")
}

impl CommandRunner for FfmpegRunner {
    fn run(&self, pass: Pass, command: &FfmpegCommand) -> Result<()> {
        tracing::debug!(%pass, command = %command.display_line(), "running ffmpeg");

        let output = self
            .command(&command.program)
            .args(&command.args)
            .output()
            .map_err(|error| match error.kind() {
                ErrorKind::NotFound => Error::FfmpegNotFound,
                _ => Error::Io(error),
            })?;

        if !output.status.success() {
            let mut stderr = stderr_tail(&output.stderr);
            if stderr.is_empty() {
                stderr = format!("exited with {}", output.status);
            }
            return Err(Error::FfmpegFailed { pass, stderr });
        }

        Ok(())
    }

    fn probe(&self, input: &Path) -> Result<VideoInfo> {
        probe::probe_with(self.command("ffprobe"), input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stderr_tail_keeps_last_lines() {
        let mut raw = String::new();
        for index in 0..30 {
            raw.push_str(&format!("line {index}\n"));
        }
        let tail = stderr_tail(raw.as_bytes());
        assert_eq!(tail.lines().count(), STDERR_TAIL_LINES);
        assert!(tail.starts_with("line 10"));
        assert!(tail.ends_with("line 29"));
    }

    #[test]
    fn stderr_tail_drops_blank_lines() {
        let tail = stderr_tail(b"\n\nInvalid data found\n\n");
        assert_eq!(tail, "Invalid data found");
    }

    #[test]
    fn bundled_dir_comes_first_in_search_path() {
        let runner = FfmpegRunner::with_bundled_dir(Path::new("/opt/bundled/ffmpeg")).unwrap();
        let search_path = runner.search_path.unwrap();
        let first = std::env::split_paths(&search_path).next().unwrap();
        assert_eq!(first, PathBuf::from("/opt/bundled/ffmpeg"));
    }

    #[test]
    fn empty_search_path_reports_missing_ffmpeg() {
        let runner = FfmpegRunner {
            search_path: Some(OsString::from("/nonexistent/vid2gif/bin")),
        };
        assert!(matches!(
            runner.ensure_available(),
            Err(Error::FfmpegNotFound)
        ));
    }
}
