//! # Style Transfer
//!
//! The [`StyleTransfer`] trait is the seam between the pipeline and whatever
//! produces styled frames. The real model is an external program driven by
//! [`ExternalStyleTransfer`]; [`PassthroughStyle`] copies frames for dry runs.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use stylize_video::styles::{ExternalStyleTransfer, StyleApplier};
//!
//! # fn main() -> stylize_video::Result<()> {
//! let styler = ExternalStyleTransfer::new("./stylize", "models/candy.pth");
//! let styled = StyleApplier::new(Arc::new(styler))
//!     .apply("frames_original", "frames_styled")?;
//! println!("Styled {} frames", styled);
//! # Ok(())
//! # }
//! ```

pub mod applier;
pub mod external;
pub mod passthrough;
pub mod traits;

pub use applier::StyleApplier;
pub use external::ExternalStyleTransfer;
pub use passthrough::PassthroughStyle;
pub use traits::StyleTransfer;
