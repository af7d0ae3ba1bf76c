use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock};

pub const DEFAULT_FPS: u32 = 10;
pub const DEFAULT_WIDTH: u32 = 480;
/// Trim points are passed to ffmpeg with millisecond precision.
pub const MIN_DURATION_SECS: f64 = 0.001;

/// Target height for a custom scale. `Auto` keeps the aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Height {
    #[default]
    Auto,
    Pixels(u32),
}

impl Height {
    /// Value handed to the `scale` filter.
    pub fn filter_value(self) -> i64 {
        match self {
            Height::Auto => -1,
            Height::Pixels(pixels) => i64::from(pixels),
        }
    }
}

impl FromStr for Height {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("auto") {
            return Ok(Height::Auto);
        }
        trimmed
            .parse::<u32>()
            .map(Height::Pixels)
            .map_err(|_| Error::InvalidHeight(raw.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizeMode {
    #[default]
    Original,
    Custom { width: u32, height: Height },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Quality {
    High,
    #[default]
    Medium,
    Low,
}

impl Quality {
    pub fn as_str(self) -> &'static str {
        match self {
            Quality::High => "high",
            Quality::Medium => "medium",
            Quality::Low => "low",
        }
    }
}

impl FromStr for Quality {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Quality::High),
            "medium" => Ok(Quality::Medium),
            "low" => Ok(Quality::Low),
            _ => Err(Error::InvalidQuality(raw.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OutputMode {
    #[default]
    SameAsInput,
    Directory(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConvertOptions {
    pub size: SizeMode,
    pub fps: u32,
    pub start_time: f64,
    pub duration: Option<f64>,
    pub quality: Quality,
    pub output: OutputMode,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            size: SizeMode::Original,
            fps: DEFAULT_FPS,
            start_time: 0.0,
            duration: None,
            quality: Quality::Medium,
            output: OutputMode::SameAsInput,
        }
    }
}

impl ConvertOptions {
    /// Rejects option sets ffmpeg would choke on. Runs before any process is spawned.
    pub fn validate(&self) -> Result<()> {
        if self.fps == 0 {
            return Err(Error::InvalidInput("fps must be positive".into()));
        }

        if !self.start_time.is_finite() || self.start_time < 0.0 {
            return Err(Error::InvalidInput(
                "start time must be zero or positive".into(),
            ));
        }

        if let Some(duration) = self.duration
            && (!duration.is_finite() || duration <= 0.0)
        {
            return Err(Error::InvalidInput("duration must be positive".into()));
        }

        if let Some(duration) = self.duration
            && duration < MIN_DURATION_SECS
        {
            return Err(Error::InvalidInput(format!(
                "duration must be at least {MIN_DURATION_SECS}s"
            )));
        }

        if let SizeMode::Custom { width, height } = self.size {
            if width == 0 {
                return Err(Error::InvalidInput("width must be positive".into()));
            }
            if height == Height::Pixels(0) {
                return Err(Error::InvalidInput("height must be positive".into()));
            }
        }

        if let OutputMode::Directory(directory) = &self.output {
            if directory.as_os_str().is_empty() {
                return Err(Error::InvalidInput("no output directory chosen".into()));
            }
            if !directory.is_dir() {
                return Err(Error::OutputDirMissing(directory.clone()));
            }
        }

        Ok(())
    }

    pub fn is_trimmed(&self) -> bool {
        self.start_time > 0.0 || self.duration.is_some()
    }

    /// Directory the gif and its palette are written to for `input`.
    pub fn output_dir(&self, input: &Path) -> PathBuf {
        match &self.output {
            OutputMode::Directory(directory) => directory.clone(),
            OutputMode::SameAsInput => match input.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            },
        }
    }
}

/// Options read by the batch worker at the start of every file.
#[derive(Debug, Clone, Default)]
pub struct SharedOptions {
    inner: Arc<RwLock<ConvertOptions>>,
}

impl SharedOptions {
    pub fn new(options: ConvertOptions) -> Self {
        Self {
            inner: Arc::new(RwLock::new(options)),
        }
    }

    pub fn current(&self) -> ConvertOptions {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn update(&self, edit: impl FnOnce(&mut ConvertOptions)) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        edit(&mut guard);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(ConvertOptions::default().validate().is_ok());
    }

    #[test]
    fn zero_fps_is_rejected() {
        let options = ConvertOptions {
            fps: 0,
            ..Default::default()
        };
        assert!(matches!(options.validate(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn negative_start_is_rejected() {
        let options = ConvertOptions {
            start_time: -0.5,
            ..Default::default()
        };
        assert!(matches!(options.validate(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn nan_start_is_rejected() {
        let options = ConvertOptions {
            start_time: f64::NAN,
            ..Default::default()
        };
        assert!(options.validate().is_err());
    }

    #[test]
    fn zero_and_negative_duration_are_rejected() {
        for duration in [0.0, -2.0] {
            let options = ConvertOptions {
                duration: Some(duration),
                ..Default::default()
            };
            assert!(matches!(options.validate(), Err(Error::InvalidInput(_))));
        }
    }

    #[test]
    fn sub_millisecond_duration_is_rejected() {
        for duration in [0.0004, 0.0009] {
            let options = ConvertOptions {
                duration: Some(duration),
                ..Default::default()
            };
            assert!(matches!(options.validate(), Err(Error::InvalidInput(_))));
        }
    }

    #[test]
    fn one_millisecond_duration_is_accepted() {
        let options = ConvertOptions {
            duration: Some(MIN_DURATION_SECS),
            ..Default::default()
        };
        assert!(options.validate().is_ok());
    }

    #[test]
    fn zero_custom_width_is_rejected() {
        let options = ConvertOptions {
            size: SizeMode::Custom {
                width: 0,
                height: Height::Auto,
            },
            ..Default::default()
        };
        assert!(matches!(options.validate(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn zero_custom_height_is_rejected() {
        let options = ConvertOptions {
            size: SizeMode::Custom {
                width: 320,
                height: Height::Pixels(0),
            },
            ..Default::default()
        };
        assert!(matches!(options.validate(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn custom_size_with_auto_height_is_valid() {
        let options = ConvertOptions {
            size: SizeMode::Custom {
                width: 320,
                height: Height::Auto,
            },
            ..Default::default()
        };
        assert!(options.validate().is_ok());
    }

    #[test]
    fn missing_output_directory_is_rejected() {
        let options = ConvertOptions {
            output: OutputMode::Directory(PathBuf::from("/definitely/not/a/real/dir")),
            ..Default::default()
        };
        assert!(matches!(
            options.validate(),
            Err(Error::OutputDirMissing(_))
        ));
    }

    #[test]
    fn empty_output_directory_is_rejected() {
        let options = ConvertOptions {
            output: OutputMode::Directory(PathBuf::new()),
            ..Default::default()
        };
        assert!(matches!(options.validate(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn quality_parses_known_tiers_case_insensitively() {
        assert_eq!("high".parse::<Quality>().unwrap(), Quality::High);
        assert_eq!("Medium".parse::<Quality>().unwrap(), Quality::Medium);
        assert_eq!(" LOW ".parse::<Quality>().unwrap(), Quality::Low);
    }

    #[test]
    fn unknown_quality_fails_instead_of_defaulting() {
        let result = "ultra".parse::<Quality>();
        assert!(matches!(result, Err(Error::InvalidQuality(tier)) if tier == "ultra"));
    }

    #[test]
    fn height_parses_auto_and_pixels() {
        assert_eq!("auto".parse::<Height>().unwrap(), Height::Auto);
        assert_eq!("".parse::<Height>().unwrap(), Height::Auto);
        assert_eq!("270".parse::<Height>().unwrap(), Height::Pixels(270));
        assert!(matches!(
            "-5".parse::<Height>(),
            Err(Error::InvalidHeight(_))
        ));
    }

    #[test]
    fn auto_height_maps_to_minus_one() {
        assert_eq!(Height::Auto.filter_value(), -1);
        assert_eq!(Height::Pixels(200).filter_value(), 200);
    }

    #[test]
    fn output_dir_follows_input_parent() {
        let options = ConvertOptions::default();
        assert_eq!(
            options.output_dir(Path::new("/videos/clip.mp4")),
            PathBuf::from("/videos")
        );
        assert_eq!(options.output_dir(Path::new("clip.mp4")), PathBuf::from("."));
    }

    #[test]
    fn output_dir_uses_chosen_directory() {
        let options = ConvertOptions {
            output: OutputMode::Directory(PathBuf::from("/gifs")),
            ..Default::default()
        };
        assert_eq!(
            options.output_dir(Path::new("/videos/clip.mp4")),
            PathBuf::from("/gifs")
        );
    }

    #[test]
    fn shared_options_updates_are_visible() {
        let shared = SharedOptions::new(ConvertOptions::default());
        let reader = shared.clone();
        shared.update(|options| options.fps = 24);
        assert_eq!(reader.current().fps, 24);
    }
}
