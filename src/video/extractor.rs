use std::ffi::OsString;
use std::io::{BufReader, Read};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread::JoinHandle;

use tracing::{debug, info, warn};

use crate::config::{ExtractConfig, ToolsConfig};
use crate::error::{ExtractError, Result};
use crate::video::frames;
use crate::video::probe::VideoProbe;
use crate::video::types::Frame;

/// Splits a video into one JPEG image per decoded frame
///
/// Frames are decoded by an `ffmpeg` subprocess and streamed back as raw
/// `rgb24` bytes, then written as `frame_0000.jpg`, `frame_0001.jpg`, ...
pub struct FrameExtractor {
    ffmpeg: String,
    probe: VideoProbe,
    config: ExtractConfig,
}

impl FrameExtractor {
    pub fn new(tools: &ToolsConfig, config: ExtractConfig) -> Self {
        Self {
            ffmpeg: tools.ffmpeg.clone(),
            probe: VideoProbe::new(tools.ffprobe.clone()),
            config,
        }
    }

    /// Extract every frame of `video` into `output_dir`
    ///
    /// Returns the number of frames written. A video that cannot be opened is
    /// an [`ExtractError::OpenFailed`] error, never a silent zero.
    pub fn extract<P: AsRef<Path>, Q: AsRef<Path>>(&self, video: P, output_dir: Q) -> Result<usize> {
        let video = video.as_ref();
        let output_dir = output_dir.as_ref();

        let metadata = self.probe.probe(video)?;

        std::fs::create_dir_all(output_dir)?;
        if self.config.clear_existing {
            frames::clear_frame_images(output_dir)?;
        }

        let mut child = self.spawn_decoder(video)?;
        let stderr_handle = drain_stderr(&mut child);

        let result = match child.stdout.take() {
            Some(stdout) => self.write_frames(stdout, metadata.width, metadata.height, output_dir),
            None => Err(ExtractError::DecodeFailed {
                reason: "ffmpeg stdout was not captured".to_string(),
            }.into()),
        };

        let count = match result {
            Ok(count) => count,
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(e);
            }
        };

        let status = child.wait()?;
        let stderr = join_stderr(stderr_handle);

        if !status.success() {
            return Err(ExtractError::DecodeFailed {
                reason: format!(
                    "ffmpeg exited with {} after {} frames: {}",
                    status, count, stderr.trim()
                ),
            }.into());
        }

        if count == 0 {
            warn!("No frames decoded from {:?}", video);
        }

        info!("Extracted {} frames from {}", count, video.display());
        Ok(count)
    }

    /// Decoder arguments; every decoded frame is emitted exactly once
    fn decoder_args(&self, video: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-v", "error", "-nostdin", "-noautorotate", "-i"]
            .into_iter()
            .map(OsString::from)
            .collect();
        args.push(video.as_os_str().to_os_string());

        // One output frame per decoded frame, even for variable frame rate input
        args.extend(
            [
                "-map", "0:v:0",
                "-fps_mode", "passthrough",
                "-f", "rawvideo",
                "-pix_fmt", "rgb24",
                "-",
            ]
            .into_iter()
            .map(OsString::from),
        );
        args
    }

    fn spawn_decoder(&self, video: &Path) -> Result<Child> {
        let mut cmd = Command::new(&self.ffmpeg);
        cmd.args(self.decoder_args(video))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        debug!("Running {:?}", cmd);

        cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ExtractError::ToolUnavailable { tool: self.ffmpeg.clone() }.into()
            } else {
                ExtractError::DecodeFailed {
                    reason: format!("Failed to spawn ffmpeg: {}", e),
                }.into()
            }
        })
    }

    fn write_frames<R: Read>(&self, stdout: R, width: u32, height: u32, output_dir: &Path) -> Result<usize> {
        let frame_len = width as usize * height as usize * 3;
        let mut reader = BufReader::with_capacity(frame_len.max(8192), stdout);
        let mut count = 0usize;

        loop {
            let mut buffer = vec![0u8; frame_len];
            let filled = read_full(&mut reader, &mut buffer)?;

            if filled == 0 {
                break;
            }
            if filled < frame_len {
                warn!("Discarding truncated trailing frame ({} of {} bytes)", filled, frame_len);
                break;
            }

            let frame = Frame::from_rgb_bytes(width, height, buffer)
                .ok_or_else(|| ExtractError::DecodeFailed {
                    reason: format!("frame {} has the wrong size for {}x{}", count, width, height),
                })?;

            let frame_path = output_dir.join(frames::frame_file_name(count));
            frame.save_jpeg(&frame_path, self.config.jpeg_quality)
                .map_err(|e| ExtractError::FrameWriteFailed {
                    path: frame_path.display().to_string(),
                    reason: e.to_string(),
                })?;

            debug!("Wrote {}", frame_path.display());
            count += 1;
        }

        Ok(count)
    }
}

/// Read until `buffer` is full or the stream ends; returns bytes read
fn read_full<R: Read>(reader: &mut R, buffer: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buffer.len() {
        match reader.read(&mut buffer[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Collect a child's stderr on a background thread so the pipe never fills up
pub(crate) fn drain_stderr(child: &mut Child) -> Option<JoinHandle<String>> {
    child.stderr.take().map(|mut stderr| {
        std::thread::spawn(move || {
            let mut output = String::new();
            let _ = stderr.read_to_string(&mut output);
            output
        })
    })
}

/// Wait for the stderr collector; empty when nothing was captured
pub(crate) fn join_stderr(handle: Option<JoinHandle<String>>) -> String {
    handle
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default()
}
