use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use tracing::{debug, info, warn};

use crate::config::{ComposeConfig, ToolsConfig};
use crate::error::{ComposeError, PipelineError, Result};
use crate::video::extractor::{drain_stderr, join_stderr};
use crate::video::frames::{self, display_name};
use crate::video::types::Frame;

/// Represents an encoded video output
#[derive(Debug, Clone)]
pub struct EncodedVideo {
    pub path: PathBuf,
    pub frame_count: usize,
    pub resolution: (u32, u32),
    pub fps: u32,
    /// Nominal duration, `frame_count / fps`
    pub duration: f64,
    pub file_size: u64,
}

/// Encodes a directory of frame images into a single video
///
/// The first image (in file name order) fixes the output resolution. Frames
/// are streamed as raw `rgb24` into an `ffmpeg` subprocess.
pub struct VideoComposer {
    ffmpeg: String,
    config: ComposeConfig,
}

impl VideoComposer {
    pub fn new(tools: &ToolsConfig, config: ComposeConfig) -> Self {
        Self {
            ffmpeg: tools.ffmpeg.clone(),
            config,
        }
    }

    /// Encode every image in `frame_dir` into `output` at `fps`
    ///
    /// An empty or missing frame directory is [`ComposeError::NoFrames`].
    pub fn compose<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        frame_dir: P,
        output: Q,
        fps: u32,
    ) -> Result<EncodedVideo> {
        let frame_dir = frame_dir.as_ref();
        let output = output.as_ref();

        let frame_paths = frames::list_frame_images(frame_dir)?;
        let first_path = frame_paths.first().ok_or_else(|| ComposeError::NoFrames {
            path: frame_dir.display().to_string(),
        })?;

        if fps == 0 {
            return Err(ComposeError::EncodingFailed {
                reason: "frame rate must be at least 1".to_string(),
            }.into());
        }

        let first_frame = read_frame(first_path)?;
        let (width, height) = first_frame.dimensions();
        info!("Composing {} frames at {}x{}, {} fps", frame_paths.len(), width, height, fps);

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut child = self.spawn_encoder(width, height, fps, output)?;
        let stderr_handle = drain_stderr(&mut child);

        // stdin is closed when the writer drops, which lets ffmpeg finish
        let written = match self.write_frames(&mut child, first_frame, &frame_paths[1..]) {
            Ok(written) => written,
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(with_encoder_output(e, &join_stderr(stderr_handle)));
            }
        };

        let status = child.wait()?;
        let stderr = join_stderr(stderr_handle);

        if !status.success() {
            return Err(ComposeError::EncodingFailed {
                reason: format!("ffmpeg exited with {}: {}", status, stderr.trim()),
            }.into());
        }

        let file_size = std::fs::metadata(output)?.len();
        let encoded = EncodedVideo {
            path: output.to_path_buf(),
            frame_count: written,
            resolution: (width, height),
            fps,
            duration: written as f64 / fps as f64,
            file_size,
        };

        info!(
            "Video saved as {} ({:.1}s, {:.1} KB)",
            output.display(),
            encoded.duration,
            file_size as f64 / 1024.0
        );
        Ok(encoded)
    }

    fn encoder_args(&self, width: u32, height: u32, fps: u32) -> Vec<String> {
        let mut args: Vec<String> = [
            "-y", "-v", "error",
            "-f", "rawvideo",
            "-pix_fmt", "rgb24",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        args.extend([
            "-s".to_string(), format!("{}x{}", width, height),
            "-r".to_string(), fps.to_string(),
            "-i".to_string(), "-".to_string(),
            "-an".to_string(),
            "-c:v".to_string(), self.config.codec.clone(),
        ]);

        if !self.config.fourcc.is_empty() {
            args.extend(["-vtag".to_string(), self.config.fourcc.clone()]);
        }

        args.extend([
            "-q:v".to_string(), self.config.quality.to_string(),
            "-pix_fmt".to_string(), self.config.pixel_format.clone(),
        ]);
        args
    }

    fn spawn_encoder(&self, width: u32, height: u32, fps: u32, output: &Path) -> Result<Child> {
        let mut cmd = Command::new(&self.ffmpeg);
        cmd.args(self.encoder_args(width, height, fps))
            .arg(output)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        debug!("Running {:?}", cmd);

        cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ComposeError::ToolUnavailable { tool: self.ffmpeg.clone() }.into()
            } else {
                ComposeError::EncodingFailed {
                    reason: format!("Failed to spawn ffmpeg: {}", e),
                }.into()
            }
        })
    }

    fn write_frames(&self, child: &mut Child, first_frame: Frame, rest: &[PathBuf]) -> Result<usize> {
        let stdin = child.stdin.take().ok_or_else(|| ComposeError::EncodingFailed {
            reason: "ffmpeg stdin was not captured".to_string(),
        })?;
        let mut writer = BufWriter::new(stdin);
        let (width, height) = first_frame.dimensions();

        write_raw(&mut writer, &first_frame)?;
        let mut written = 1;

        for path in rest {
            let mut frame = read_frame(path)?;

            if frame.dimensions() != (width, height) {
                if !self.config.resize_mismatched {
                    return Err(ComposeError::DimensionMismatch {
                        path: path.display().to_string(),
                        width,
                        height,
                        actual_width: frame.width(),
                        actual_height: frame.height(),
                    }.into());
                }
                warn!(
                    "Resizing {} from {}x{} to {}x{}",
                    display_name(path),
                    frame.width(),
                    frame.height(),
                    width,
                    height
                );
                frame = frame.resized(width, height);
            }

            write_raw(&mut writer, &frame)?;
            written += 1;
        }

        writer.flush().map_err(encoder_pipe_error)?;
        Ok(written)
    }
}

fn read_frame(path: &Path) -> Result<Frame> {
    Frame::open(path).map_err(|e| ComposeError::FrameReadFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    }.into())
}

fn write_raw<W: Write>(writer: &mut W, frame: &Frame) -> Result<()> {
    writer.write_all(frame.as_rgb_bytes()).map_err(encoder_pipe_error)
}

fn encoder_pipe_error(e: std::io::Error) -> PipelineError {
    ComposeError::EncodingFailed {
        reason: format!("ffmpeg stopped accepting frames: {}", e),
    }.into()
}

/// Attach whatever ffmpeg printed to an encoding failure
///
/// A broken pipe only says that ffmpeg went away; its stderr says why.
fn with_encoder_output(error: PipelineError, stderr: &str) -> PipelineError {
    let stderr = stderr.trim();
    match error {
        PipelineError::Compose(ComposeError::EncodingFailed { reason }) if !stderr.is_empty() => {
            ComposeError::EncodingFailed {
                reason: format!("{}: {}", reason, stderr),
            }
            .into()
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn composer() -> VideoComposer {
        VideoComposer::new(&ToolsConfig::default(), ComposeConfig::default())
    }

    #[test]
    fn test_empty_directory_is_explicit_failure() {
        let dir = tempdir().unwrap();
        let frames_dir = dir.path().join("frames_styled");
        std::fs::create_dir(&frames_dir).unwrap();
        std::fs::write(frames_dir.join("readme.txt"), b"not a frame").unwrap();

        let result = composer().compose(&frames_dir, dir.path().join("out.mp4"), 30);

        assert!(matches!(
            result,
            Err(PipelineError::Compose(ComposeError::NoFrames { .. }))
        ));
        assert!(!dir.path().join("out.mp4").exists());
    }

    #[test]
    fn test_missing_directory_is_explicit_failure() {
        let dir = tempdir().unwrap();
        let result = composer().compose(dir.path().join("nowhere"), dir.path().join("out.mp4"), 30);

        assert!(matches!(
            result,
            Err(PipelineError::Compose(ComposeError::NoFrames { .. }))
        ));
    }

    #[test]
    fn test_encoder_args_use_mp4v_tag() {
        let args = composer().encoder_args(64, 48, 24);
        let joined = args.join(" ");

        assert!(joined.contains("-s 64x48"));
        assert!(joined.contains("-r 24"));
        assert!(joined.contains("-c:v mpeg4"));
        assert!(joined.contains("-vtag mp4v"));
    }

    #[test]
    fn test_empty_fourcc_omits_tag() {
        let config = ComposeConfig {
            codec: "libx264".to_string(),
            fourcc: String::new(),
            ..ComposeConfig::default()
        };
        let args = VideoComposer::new(&ToolsConfig::default(), config).encoder_args(64, 48, 30);
        assert!(!args.iter().any(|a| a == "-vtag"));
    }

    #[cfg(unix)]
    mod stub_encoder {
        use super::*;
        use std::os::unix::fs::PermissionsExt;

        /// Executable stand-in for ffmpeg running `body`
        fn stub_ffmpeg(dir: &Path, body: &str) -> ToolsConfig {
            let script = dir.join("fake-ffmpeg");
            std::fs::write(&script, format!("#!/bin/sh\n{}", body)).unwrap();
            std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

            ToolsConfig {
                ffmpeg: script.display().to_string(),
                ..ToolsConfig::default()
            }
        }

        #[test]
        fn test_every_frame_is_piped_to_the_encoder() {
            let dir = tempdir().unwrap();
            let byte_count = dir.path().join("bytes");
            // Count stdin, then create the output file named by the last argument
            let tools = stub_ffmpeg(
                dir.path(),
                &format!(
                    "for last; do :; done\nwc -c > '{}'\n: > \"$last\"\n",
                    byte_count.display()
                ),
            );

            let frames_dir = dir.path().join("frames_styled");
            std::fs::create_dir(&frames_dir).unwrap();
            Frame::new_filled(8, 4, [10, 20, 30]).save(frames_dir.join("frame_0000.png")).unwrap();
            Frame::new_filled(8, 4, [40, 50, 60]).save(frames_dir.join("frame_0001.png")).unwrap();
            Frame::new_filled(16, 8, [70, 80, 90]).save(frames_dir.join("frame_0002.png")).unwrap();

            let output = dir.path().join("out.mp4");
            let encoded = VideoComposer::new(&tools, ComposeConfig::default())
                .compose(&frames_dir, &output, 30)
                .unwrap();

            assert_eq!(encoded.frame_count, 3);
            assert_eq!(encoded.resolution, (8, 4));
            assert_eq!(encoded.path, output);
            assert!((encoded.duration - 0.1).abs() < 1e-9);

            let piped: usize = std::fs::read_to_string(&byte_count)
                .unwrap()
                .trim()
                .parse()
                .unwrap();
            assert_eq!(piped, 3 * 8 * 4 * 3);
        }

        #[test]
        fn test_encoder_stderr_is_reported() {
            let dir = tempdir().unwrap();
            let tools = stub_ffmpeg(dir.path(), "echo 'Unknown encoder mpeg4' >&2\nexit 1\n");

            // Larger than a pipe buffer, so writing usually hits a closed pipe
            let frames_dir = dir.path().join("frames_styled");
            std::fs::create_dir(&frames_dir).unwrap();
            for i in 0..3 {
                Frame::new_filled(256, 256, [i * 40, 0, 0])
                    .save(frames_dir.join(frames::frame_file_name(i as usize)))
                    .unwrap();
            }

            let result = VideoComposer::new(&tools, ComposeConfig::default())
                .compose(&frames_dir, dir.path().join("out.mp4"), 30);

            match result {
                Err(PipelineError::Compose(ComposeError::EncodingFailed { reason })) => {
                    assert!(reason.contains("Unknown encoder mpeg4"), "reason was: {}", reason);
                }
                other => panic!("expected EncodingFailed, got {:?}", other),
            }
        }
    }
}
