//! # stylize-video
//!
//! Apply a neural style-transfer model to a video, one frame at a time.
//!
//! The work happens in three strictly sequential stages that hand off through
//! the filesystem:
//!
//! 1. [`FrameExtractor`](video::FrameExtractor) decodes the source video into
//!    `frame_0000.jpg`, `frame_0001.jpg`, ...
//! 2. [`StyleApplier`](styles::StyleApplier) runs an external style transfer
//!    program on every frame:
//!    `<program> eval --content-image <in> --output-image <out> --model <model> --cuda <0|1>`
//! 3. [`VideoComposer`](video::VideoComposer) encodes the styled frames back
//!    into a video.
//!
//! Decoding and encoding are delegated to `ffmpeg`/`ffprobe`; the model is an
//! opaque file that is only ever passed along to the style transfer program.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use stylize_video::{Config, Session, SessionInputs, StyleTransferPipeline};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let config = Config::default();
//! let session = Session::with_work_dir(
//!     SessionInputs {
//!         video: "input.mp4".into(),
//!         model: "models/candy.pth".into(),
//!         style_program: "style_transfer.py".into(),
//!         fps: 30,
//!     },
//!     "styled.mp4",
//!     Path::new("."),
//!     &config.layout,
//! )?;
//!
//! let report = StyleTransferPipeline::new(config).run(&session).await?;
//! println!("{} frames -> {:?}", report.video.frame_count, report.video.path);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`video`] - Frame extraction, frame directory conventions, composition
//! - [`styles`] - The style transfer seam and its backends
//! - [`pipeline`] - Session and stage orchestration
//! - [`config`] - Configuration management

pub mod config;
pub mod error;
#[cfg(feature = "gui")]
pub mod gui;
pub mod logging;
pub mod pipeline;
pub mod styles;
pub mod video;

// Re-export commonly used types for convenience
pub use crate::{
    config::Config,
    error::{PipelineError, Result},
    pipeline::{PipelineReport, PipelineStage, Session, SessionInputs, StyleTransferPipeline},
    styles::{StyleApplier, StyleTransfer},
    video::{FrameExtractor, VideoComposer},
};
