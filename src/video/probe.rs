use std::path::Path;
use std::process::{Command, Stdio};

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{ExtractError, Result};

/// Video stream properties reported by ffprobe
#[derive(Debug, Clone, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub duration: Option<f64>,
    pub codec: String,
    /// Frame count declared by the container, when it records one
    pub frame_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    avg_frame_rate: Option<String>,
    r_frame_rate: Option<String>,
    duration: Option<String>,
    nb_frames: Option<String>,
    nb_read_frames: Option<String>,
}

/// Check whether a command line tool can be launched
pub fn check_tool_available(tool: &str) -> bool {
    Command::new(tool)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Thin wrapper over the `ffprobe` binary
#[derive(Debug, Clone)]
pub struct VideoProbe {
    ffprobe: String,
}

impl VideoProbe {
    pub fn new<S: Into<String>>(ffprobe: S) -> Self {
        Self { ffprobe: ffprobe.into() }
    }

    /// Read the first video stream's properties
    ///
    /// Any failure to open the file or find a video stream is reported as
    /// [`ExtractError::OpenFailed`].
    pub fn probe<P: AsRef<Path>>(&self, path: P) -> Result<VideoMetadata> {
        let path = path.as_ref();
        let open_failed = |reason: String| ExtractError::OpenFailed {
            path: path.display().to_string(),
            reason,
        };

        if !path.is_file() {
            return Err(open_failed("file does not exist".to_string()).into());
        }

        let stream = self.first_video_stream(path, &[
            "-show_entries",
            "stream=codec_name,width,height,avg_frame_rate,r_frame_rate,duration,nb_frames",
        ])?;

        let (width, height) = match (stream.width, stream.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
            _ => return Err(open_failed("video stream has no dimensions".to_string()).into()),
        };

        let fps = stream.avg_frame_rate.as_deref()
            .and_then(parse_frame_rate)
            .or_else(|| stream.r_frame_rate.as_deref().and_then(parse_frame_rate))
            .unwrap_or(30.0);

        let metadata = VideoMetadata {
            width,
            height,
            fps,
            duration: stream.duration.as_deref().and_then(|d| d.parse().ok()),
            codec: stream.codec_name.unwrap_or_else(|| "unknown".to_string()),
            frame_count: stream.nb_frames.as_deref().and_then(|n| n.parse().ok()),
        };

        info!(
            "Video metadata: {}x{} @ {:.2}fps, codec {}",
            metadata.width, metadata.height, metadata.fps, metadata.codec
        );
        Ok(metadata)
    }

    /// Decode the whole video stream and count its frames
    pub fn count_frames<P: AsRef<Path>>(&self, path: P) -> Result<u64> {
        let path = path.as_ref();
        let stream = self.first_video_stream(path, &[
            "-count_frames",
            "-show_entries",
            "stream=nb_read_frames",
        ])?;

        stream.nb_read_frames.as_deref()
            .and_then(|n| n.parse().ok())
            .ok_or_else(|| ExtractError::DecodeFailed {
                reason: format!("ffprobe could not count frames in {}", path.display()),
            }.into())
    }

    fn first_video_stream(&self, path: &Path, entries: &[&str]) -> Result<ProbeStream> {
        let open_failed = |reason: String| ExtractError::OpenFailed {
            path: path.display().to_string(),
            reason,
        };

        let mut cmd = Command::new(&self.ffprobe);
        cmd.args(["-v", "error", "-select_streams", "v:0"])
            .args(entries)
            .args(["-of", "json"])
            .arg(path);
        debug!("Running {:?}", cmd);

        let output = cmd.output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ExtractError::ToolUnavailable { tool: self.ffprobe.clone() }
            } else {
                open_failed(format!("ffprobe could not be started: {}", e))
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(open_failed(stderr.trim().to_string()).into());
        }

        let parsed: ProbeOutput = serde_json::from_slice(&output.stdout)
            .map_err(|e| open_failed(format!("invalid ffprobe output: {}", e)))?;

        parsed.streams.into_iter().next()
            .ok_or_else(|| open_failed("no video stream".to_string()).into())
    }
}

impl Default for VideoProbe {
    fn default() -> Self {
        Self::new("ffprobe")
    }
}

/// Parse an ffprobe rational such as `30000/1001`
fn parse_frame_rate(rate: &str) -> Option<f64> {
    let (num, den) = match rate.split_once('/') {
        Some((num, den)) => (num.parse::<f64>().ok()?, den.parse::<f64>().ok()?),
        None => (rate.parse::<f64>().ok()?, 1.0),
    };

    if den == 0.0 || num <= 0.0 {
        return None;
    }
    Some(num / den)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use tempfile::tempdir;

    #[test]
    fn test_parse_frame_rate() {
        assert_eq!(parse_frame_rate("30/1"), Some(30.0));
        assert_eq!(parse_frame_rate("25"), Some(25.0));
        assert!((parse_frame_rate("30000/1001").unwrap() - 29.97).abs() < 0.01);
        assert_eq!(parse_frame_rate("0/0"), None);
        assert_eq!(parse_frame_rate("garbage"), None);
    }

    #[test]
    fn test_probe_output_parses() {
        let json = r#"{
            "programs": [],
            "streams": [{
                "codec_name": "mpeg4",
                "width": 64,
                "height": 48,
                "r_frame_rate": "30/1",
                "avg_frame_rate": "30/1",
                "duration": "0.333333",
                "nb_frames": "10"
            }]
        }"#;

        let parsed: ProbeOutput = serde_json::from_str(json).unwrap();
        let stream = &parsed.streams[0];
        assert_eq!(stream.width, Some(64));
        assert_eq!(stream.nb_frames.as_deref(), Some("10"));
    }

    #[test]
    fn test_missing_file_is_open_failure() {
        let dir = tempdir().unwrap();
        let result = VideoProbe::default().probe(dir.path().join("missing.mp4"));

        assert!(matches!(
            result,
            Err(PipelineError::Extract(ExtractError::OpenFailed { .. }))
        ));
    }
}
