use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::process::Command;

#[derive(Debug, Clone, PartialEq)]
pub struct VideoInfo {
    pub width: u32,
    pub height: u32,
    pub duration_secs: f64,
    pub framerate: f64,
}

#[derive(Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<StreamInfo>,
    format: FormatInfo,
}

#[derive(Deserialize)]
struct StreamInfo {
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
}

#[derive(Deserialize)]
struct FormatInfo {
    duration: Option<String>,
}

fn parse_frame_rate(raw: &str) -> Option<f64> {
    if let Some((numerator, denominator)) = raw.split_once('/') {
        let numerator: f64 = numerator.parse().ok()?;
        let denominator: f64 = denominator.parse().ok()?;
        return (denominator > 0.0).then(|| numerator / denominator);
    }
    raw.parse().ok()
}

fn parse_probe_output(stdout: &[u8]) -> Result<VideoInfo> {
    let parsed: FfprobeOutput = serde_json::from_slice(stdout)?;

    let stream = parsed
        .streams
        .first()
        .ok_or_else(|| Error::ProbeFailed("no video stream found".into()))?;

    let width = stream
        .width
        .ok_or_else(|| Error::ProbeFailed("missing width".into()))?;

    let height = stream
        .height
        .ok_or_else(|| Error::ProbeFailed("missing height".into()))?;

    let framerate = stream
        .r_frame_rate
        .as_deref()
        .and_then(parse_frame_rate)
        .unwrap_or(30.0);

    let duration_secs = parsed
        .format
        .duration
        .as_deref()
        .and_then(|duration| duration.parse::<f64>().ok())
        .ok_or_else(|| Error::ProbeFailed("missing duration".into()))?;

    Ok(VideoInfo {
        width,
        height,
        duration_secs,
        framerate,
    })
}

/// Runs an `ffprobe` command (already pointed at the right binary) against `path`.
pub fn probe_with(mut command: Command, path: &Path) -> Result<VideoInfo> {
    let output = command
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height,r_frame_rate",
            "-show_entries",
            "format=duration",
        ])
        .arg(path)
        .output()
        .map_err(|_| Error::FfprobeNotFound)?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::ProbeFailed(stderr.into_owned()));
    }

    parse_probe_output(&output.stdout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_integer_fraction() {
        let result = parse_frame_rate("25/1").unwrap();
        assert!((result - 25.0).abs() < 0.001);
    }

    #[test]
    fn parse_ntsc_fraction() {
        let result = parse_frame_rate("30000/1001").unwrap();
        assert!((result - 29.97).abs() < 0.01);
    }

    #[test]
    fn parse_plain_float() {
        let result = parse_frame_rate("23.976").unwrap();
        assert!((result - 23.976).abs() < 0.001);
    }

    #[test]
    fn parse_zero_denominator_is_none() {
        assert!(parse_frame_rate("30/0").is_none());
    }

    #[test]
    fn parse_garbage_is_none() {
        assert!(parse_frame_rate("").is_none());
        assert!(parse_frame_rate("abc/1").is_none());
        assert!(parse_frame_rate("30/abc").is_none());
    }

    #[test]
    fn probe_output_is_parsed() {
        let json = br#"{
            "streams": [{"width": 640, "height": 360, "r_frame_rate": "24/1"}],
            "format": {"duration": "5.000000"}
        }"#;
        let info = parse_probe_output(json).unwrap();
        assert_eq!(info.width, 640);
        assert_eq!(info.height, 360);
        assert!((info.framerate - 24.0).abs() < 0.001);
        assert!((info.duration_secs - 5.0).abs() < 0.001);
    }

    #[test]
    fn missing_frame_rate_defaults_to_thirty() {
        let json = br#"{
            "streams": [{"width": 320, "height": 240}],
            "format": {"duration": "1.5"}
        }"#;
        let info = parse_probe_output(json).unwrap();
        assert!((info.framerate - 30.0).abs() < 0.001);
    }

    #[test]
    fn audio_only_input_has_no_video_stream() {
        let json = br#"{"streams": [], "format": {"duration": "12.0"}}"#;
        assert!(matches!(
            parse_probe_output(json),
            Err(Error::ProbeFailed(_))
        ));
    }

    #[test]
    fn missing_duration_is_a_probe_failure() {
        let json = br#"{"streams": [{"width": 1, "height": 1}], "format": {}}"#;
        assert!(matches!(
            parse_probe_output(json),
            Err(Error::ProbeFailed(_))
        ));
    }
}
