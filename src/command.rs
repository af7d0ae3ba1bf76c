use crate::options::{ConvertOptions, Quality, SizeMode};
use std::path::{Path, PathBuf};

pub const PALETTE_FILE_NAME: &str = "palette.png";
const MAX_THREADS: usize = 8;

/// Palette statistics and dithering used for one quality tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityPreset {
    pub stats_mode: &'static str,
    pub max_colors: u32,
    pub dither: &'static str,
}

const HIGH: QualityPreset = QualityPreset {
    stats_mode: "full",
    max_colors: 256,
    dither: "sierra2_4a",
};

const MEDIUM: QualityPreset = QualityPreset {
    stats_mode: "diff",
    max_colors: 256,
    dither: "bayer:bayer_scale=3",
};

const LOW: QualityPreset = QualityPreset {
    stats_mode: "diff",
    max_colors: 128,
    dither: "bayer:bayer_scale=5",
};

impl Quality {
    pub fn preset(self) -> QualityPreset {
        match self {
            Quality::High => HIGH,
            Quality::Medium => MEDIUM,
            Quality::Low => LOW,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FfmpegCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl FfmpegCommand {
    fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
        }
    }

    fn arg(&mut self, value: impl Into<String>) -> &mut Self {
        self.args.push(value.into());
        self
    }

    fn path(&mut self, value: &Path) -> &mut Self {
        self.args.push(value.to_string_lossy().into_owned());
        self
    }

    /// Shell-like rendering for logs.
    pub fn display_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            if arg.contains(' ') || arg.contains(';') {
                line.push('"');
                line.push_str(arg);
                line.push('"');
            } else {
                line.push_str(arg);
            }
        }
        line
    }
}

/// The two invocations that turn one video into one gif.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionPlan {
    pub palette: FfmpegCommand,
    pub encode: FfmpegCommand,
}

/// Leaves one core to the rest of the system, capped at eight.
pub fn worker_threads(cpu_count: usize) -> usize {
    cpu_count.saturating_sub(1).clamp(1, MAX_THREADS)
}

pub fn gif_output_path(input: &Path, options: &ConvertOptions) -> PathBuf {
    let stem = input.file_stem().unwrap_or(input.as_os_str());
    let mut name = stem.to_os_string();
    name.push(".gif");
    options.output_dir(input).join(name)
}

pub fn palette_path(input: &Path, options: &ConvertOptions) -> PathBuf {
    options.output_dir(input).join(PALETTE_FILE_NAME)
}

/// A trim point as ffmpeg will see it, rounded to the millisecond.
pub fn trim_seconds(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

fn seconds(value: f64) -> String {
    format!("{:.3}", trim_seconds(value))
}

/// Trim, frame-rate and scale steps shared by both passes.
pub fn filter_chain(options: &ConvertOptions) -> String {
    let mut steps: Vec<String> = Vec::new();

    if options.is_trimmed() {
        let mut trim_params: Vec<String> = Vec::new();
        if options.start_time > 0.0 {
            trim_params.push(format!("start={}", seconds(options.start_time)));
        }
        if let Some(duration) = options.duration {
            trim_params.push(format!("duration={}", seconds(duration)));
        }
        steps.push(format!("trim={}", trim_params.join(":")));
        steps.push("setpts=PTS-STARTPTS".to_string());
    }

    steps.push(format!("fps={}", options.fps));

    if let SizeMode::Custom { width, height } = options.size {
        steps.push(format!(
            "scale={width}:{height}:flags=lanczos",
            height = height.filter_value()
        ));
    }

    steps.join(",")
}

pub fn palettegen_filter(options: &ConvertOptions) -> String {
    let preset = options.quality.preset();
    format!(
        "{chain},palettegen=stats_mode={stats}:max_colors={colors}",
        chain = filter_chain(options),
        stats = preset.stats_mode,
        colors = preset.max_colors,
    )
}

pub fn paletteuse_filter(options: &ConvertOptions) -> String {
    format!(
        "[0:v]{chain}[x];[x][1:v]paletteuse=dither={dither}",
        chain = filter_chain(options),
        dither = options.quality.preset().dither,
    )
}

pub fn build_plan(
    input: &Path,
    output: &Path,
    palette: &Path,
    options: &ConvertOptions,
    threads: usize,
) -> ConversionPlan {
    let thread_arg = threads.to_string();

    let mut palette_command = FfmpegCommand::new("ffmpeg");
    palette_command
        .arg("-hide_banner")
        .arg("-loglevel")
        .arg("error")
        .arg("-y")
        .arg("-threads")
        .arg(thread_arg.as_str())
        .arg("-i")
        .path(input)
        .arg("-vf")
        .arg(palettegen_filter(options))
        .arg("-frames:v")
        .arg("1")
        .arg("-update")
        .arg("1")
        .path(palette);

    let mut encode_command = FfmpegCommand::new("ffmpeg");
    encode_command
        .arg("-hide_banner")
        .arg("-loglevel")
        .arg("error")
        .arg("-y")
        .arg("-threads")
        .arg(thread_arg.as_str())
        .arg("-i")
        .path(input)
        .arg("-i")
        .path(palette)
        .arg("-filter_complex")
        .arg(paletteuse_filter(options))
        .arg("-loop")
        .arg("0")
        .path(output);

    ConversionPlan {
        palette: palette_command,
        encode: encode_command,
    }
}
