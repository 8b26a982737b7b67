use std::path::Path;

use crate::error::Result;

/// Core trait for anything that can turn one content frame into one styled frame
///
/// Implementations receive image file paths rather than decoded pixels: the
/// real model runs out of process and reads and writes files itself.
pub trait StyleTransfer: Send + Sync {
    /// Returns the unique name of this style transfer backend
    fn name(&self) -> &str;

    /// Check that everything the backend needs is in place
    ///
    /// Called once before the first frame, so a missing program or model
    /// fails the stage before any work is done.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Style the image at `content` and write the result to `output`
    ///
    /// Returns an error if the frame could not be styled or no output was
    /// written.
    fn stylize(&self, content: &Path, output: &Path) -> Result<()>;
}
