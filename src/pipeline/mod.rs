//! # Pipeline
//!
//! Wires frame extraction, style transfer and video composition into a
//! single linear run driven by an immutable [`Session`].

pub mod engine;
pub mod session;
pub mod stage;

pub use engine::{PipelineReport, StageObserver, StyleTransferPipeline};
pub use session::{Session, SessionInputs};
pub use stage::PipelineStage;
