use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;
use vid2gif::error::{Error, Result};
use vid2gif::options::DEFAULT_WIDTH;
use vid2gif::{ConvertOptions, Height, OutputMode, Quality, SizeMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SizeArg {
    Original,
    Custom,
}

#[derive(Parser)]
#[command(
    name = "vid2gif",
    version,
    about = "Convert videos to palette-optimized animated GIFs"
)]
pub struct Cli {
    #[arg(required = true, help = "Video files to convert (mp4, avi, mov, mkv)")]
    pub inputs: Vec<PathBuf>,

    #[arg(
        long,
        value_enum,
        help = "Keep the original size or scale (implied custom when --width is set)"
    )]
    pub size: Option<SizeArg>,

    #[arg(long, help = "Custom width in pixels")]
    pub width: Option<u32>,

    #[arg(long, default_value = "auto", help = "Custom height in pixels, or auto")]
    pub height: Height,

    #[arg(long, default_value = "10", help = "Frames per second of the gif")]
    pub fps: u32,

    #[arg(
        long,
        default_value = "0",
        allow_negative_numbers = true,
        help = "Start time in seconds"
    )]
    pub start: f64,

    #[arg(
        long,
        allow_negative_numbers = true,
        help = "Duration in seconds (whole video when omitted)"
    )]
    pub duration: Option<f64>,

    #[arg(long, default_value = "medium", help = "Quality tier: high, medium or low")]
    pub quality: Quality,

    #[arg(
        short,
        long,
        env = "VID2GIF_OUTPUT_DIR",
        help = "Write gifs here instead of next to each video"
    )]
    pub output_dir: Option<PathBuf>,

    #[arg(
        long,
        env = "VID2GIF_FFMPEG_DIR",
        help = "Directory holding bundled ffmpeg/ffprobe binaries"
    )]
    pub ffmpeg_dir: Option<PathBuf>,

    #[arg(long, help = "Print the batch summary as JSON on stdout")]
    pub json: bool,

    #[arg(short, long, action = ArgAction::Count, help = "More log output (-vv for ffmpeg command lines)")]
    pub verbose: u8,
}

impl Cli {
    pub fn convert_options(&self) -> Result<ConvertOptions> {
        let size = match (self.size, self.width) {
            (Some(SizeArg::Original), Some(_)) => {
                return Err(Error::InvalidInput(
                    "--width cannot be combined with --size original".into(),
                ));
            }
            (Some(SizeArg::Original), None) => SizeMode::Original,
            (None, None) if self.height == Height::Auto => SizeMode::Original,
            (_, width) => SizeMode::Custom {
                width: width.unwrap_or(DEFAULT_WIDTH),
                height: self.height,
            },
        };

        let output = match &self.output_dir {
            Some(directory) => OutputMode::Directory(directory.clone()),
            None => OutputMode::SameAsInput,
        };

        Ok(ConvertOptions {
            size,
            fps: self.fps,
            start_time: self.start,
            duration: self.duration,
            quality: self.quality,
            output,
        })
    }
}
