//! # Video Module
//!
//! Frame extraction, frame directory conventions and video composition.
//! Decoding and encoding are delegated to the ffmpeg command line tools.

pub mod composer;
pub mod extractor;
pub mod frames;
pub mod probe;
pub mod types;

pub use composer::{EncodedVideo, VideoComposer};
pub use extractor::FrameExtractor;
pub use frames::{frame_file_name, list_frame_images};
pub use probe::{check_tool_available, VideoMetadata, VideoProbe};
pub use types::Frame;
