use std::path::{Path, PathBuf};

use crate::config::LayoutConfig;
use crate::error::{ConfigError, Result};

/// The four user-supplied inputs of a run
#[derive(Debug, Clone)]
pub struct SessionInputs {
    /// Source video
    pub video: PathBuf,
    /// Model artifact handed to the style transfer program
    pub model: PathBuf,
    /// Style transfer program or script
    pub style_program: PathBuf,
    /// Output frame rate
    pub fps: u32,
}

/// Everything one pipeline run needs, fixed before the first stage starts
///
/// Built once the CLI arguments are parsed or every GUI dialog has been
/// answered, then passed by reference to the pipeline. There are no setters.
#[derive(Debug, Clone)]
pub struct Session {
    video: PathBuf,
    model: PathBuf,
    style_program: PathBuf,
    fps: u32,
    output_video: PathBuf,
    frames_original: PathBuf,
    frames_styled: PathBuf,
}

impl Session {
    /// Intermediates under `work_dir`, video written to `output_video`
    ///
    /// This is the command line layout: frames go next to wherever the tool
    /// is run from and the output path is given explicitly.
    pub fn with_work_dir<P: Into<PathBuf>>(
        inputs: SessionInputs,
        output_video: P,
        work_dir: &Path,
        layout: &LayoutConfig,
    ) -> Result<Self> {
        Self::build(
            inputs,
            output_video.into(),
            work_dir.join(&layout.original_dir),
            work_dir.join(&layout.styled_dir),
        )
    }

    /// Intermediates and the output video all inside `output_dir`
    ///
    /// This is the file picker layout.
    pub fn in_output_dir(inputs: SessionInputs, output_dir: &Path, layout: &LayoutConfig) -> Result<Self> {
        Self::build(
            inputs,
            output_dir.join(&layout.output_file),
            output_dir.join(&layout.original_dir),
            output_dir.join(&layout.styled_dir),
        )
    }

    fn build(
        inputs: SessionInputs,
        output_video: PathBuf,
        frames_original: PathBuf,
        frames_styled: PathBuf,
    ) -> Result<Self> {
        if inputs.fps == 0 {
            return Err(ConfigError::InvalidValue {
                key: "fps".to_string(),
                value: inputs.fps.to_string(),
            }.into());
        }

        Ok(Self {
            video: inputs.video,
            model: inputs.model,
            style_program: inputs.style_program,
            fps: inputs.fps,
            output_video,
            frames_original,
            frames_styled,
        })
    }

    pub fn video(&self) -> &Path {
        &self.video
    }

    pub fn model(&self) -> &Path {
        &self.model
    }

    pub fn style_program(&self) -> &Path {
        &self.style_program
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn output_video(&self) -> &Path {
        &self.output_video
    }

    pub fn frames_original(&self) -> &Path {
        &self.frames_original
    }

    pub fn frames_styled(&self) -> &Path {
        &self.frames_styled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(fps: u32) -> SessionInputs {
        SessionInputs {
            video: PathBuf::from("clip.mp4"),
            model: PathBuf::from("mosaic.pth"),
            style_program: PathBuf::from("style_transfer.py"),
            fps,
        }
    }

    #[test]
    fn test_cli_layout_uses_work_dir() {
        let session = Session::with_work_dir(
            inputs(30),
            "out/final.mp4",
            Path::new("/tmp/run"),
            &LayoutConfig::default(),
        ).unwrap();

        assert_eq!(session.frames_original(), Path::new("/tmp/run/frames_original"));
        assert_eq!(session.frames_styled(), Path::new("/tmp/run/frames_styled"));
        assert_eq!(session.output_video(), Path::new("out/final.mp4"));
    }

    #[test]
    fn test_picker_layout_nests_everything() {
        let session = Session::in_output_dir(
            inputs(30),
            Path::new("/videos/out"),
            &LayoutConfig::default(),
        ).unwrap();

        assert_eq!(session.output_video(), Path::new("/videos/out/styled_output.mp4"));
        assert_eq!(session.frames_original(), Path::new("/videos/out/frames_original"));
        assert_eq!(session.frames_styled(), Path::new("/videos/out/frames_styled"));
    }

    #[test]
    fn test_zero_fps_rejected() {
        let result = Session::in_output_dir(inputs(0), Path::new("out"), &LayoutConfig::default());
        assert!(result.is_err());
    }
}
