use std::path::Path;

use crate::error::{Result, StyleError};
use crate::styles::traits::StyleTransfer;
use crate::video::frames::display_name;

/// Copies frames unchanged
///
/// Used for dry runs that exercise extraction and composition without a model.
#[derive(Debug, Clone, Default)]
pub struct PassthroughStyle;

impl PassthroughStyle {
    pub fn new() -> Self {
        Self
    }
}

impl StyleTransfer for PassthroughStyle {
    fn name(&self) -> &str {
        "passthrough"
    }

    fn stylize(&self, content: &Path, output: &Path) -> Result<()> {
        std::fs::copy(content, output).map_err(|e| StyleError::SpawnFailed {
            frame: display_name(content),
            reason: e.to_string(),
        })?;
        Ok(())
    }
}
