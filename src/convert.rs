use crate::command::{self, ConversionPlan};
use crate::error::{Error, Pass, Result};
use crate::options::ConvertOptions;
use crate::runner::CommandRunner;
use std::path::{Path, PathBuf};

/// Removes the intermediate palette however the conversion ends.
struct PaletteGuard {
    path: PathBuf,
}

impl Drop for PaletteGuard {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "removed palette"),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {}
            Err(error) => tracing::warn!(
                path = %self.path.display(),
                %error,
                "could not remove temporary palette"
            ),
        }
    }
}

fn check_start_within_input(
    runner: &dyn CommandRunner,
    input: &Path,
    options: &ConvertOptions,
) -> Result<()> {
    match runner.probe(input) {
        Ok(info) => {
            tracing::info!(
                "input: {}x{}, {:.1}fps, {:.1}s",
                info.width,
                info.height,
                info.framerate,
                info.duration_secs
            );
            let start = command::trim_seconds(options.start_time);
            if start > 0.0 && start >= info.duration_secs {
                return Err(Error::InvalidInput(format!(
                    "start time {:.3}s is past the end of the video ({:.3}s)",
                    options.start_time, info.duration_secs
                )));
            }
            Ok(())
        }
        Err(error) => {
            tracing::warn!(%error, "could not inspect input, converting anyway");
            Ok(())
        }
    }
}

/// Converts one video into `<output dir>/<stem>.gif` with a palette pass and an encode pass.
pub fn convert_file(
    runner: &dyn CommandRunner,
    input: &Path,
    options: &ConvertOptions,
    threads: usize,
) -> Result<PathBuf> {
    options.validate()?;

    if !input.is_file() {
        return Err(Error::InputNotFound(input.to_path_buf()));
    }

    check_start_within_input(runner, input, options)?;

    let output = command::gif_output_path(input, options);
    let palette = command::palette_path(input, options);
    let ConversionPlan {
        palette: palette_command,
        encode: encode_command,
    } = command::build_plan(input, &output, &palette, options, threads);

    // Only a palette pass that actually ran can have written the palette file.
    let palette_run = runner.run(Pass::Palette, &palette_command);
    let _guard = match &palette_run {
        Ok(()) | Err(Error::FfmpegFailed { .. }) => Some(PaletteGuard { path: palette }),
        Err(_) => None,
    };
    palette_run?;
    runner.run(Pass::Encode, &encode_command)?;

    Ok(output)
}
