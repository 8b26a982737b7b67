use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::error::{Result, StyleError};
use crate::styles::traits::StyleTransfer;
use crate::video::frames::{self, display_name};

/// Styles every image in a frame directory into an output directory
///
/// Frames are visited in file name order and each styled image keeps its
/// input file name, so order survives into the output directory even when
/// several frames are in flight at once.
pub struct StyleApplier {
    styler: Arc<dyn StyleTransfer>,
    jobs: usize,
    clear_existing: bool,
}

impl StyleApplier {
    pub fn new(styler: Arc<dyn StyleTransfer>) -> Self {
        Self {
            styler,
            jobs: 1,
            clear_existing: true,
        }
    }

    /// Number of concurrent invocations (1 = strictly sequential)
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Remove styled frames from an earlier run before starting
    pub fn with_clear_existing(mut self, clear_existing: bool) -> Self {
        self.clear_existing = clear_existing;
        self
    }

    /// Style every frame image in `input_dir` into `output_dir`
    ///
    /// Returns the number of frames styled. The first failing frame stops the
    /// stage.
    pub fn apply<P: AsRef<Path>, Q: AsRef<Path>>(&self, input_dir: P, output_dir: Q) -> Result<usize> {
        let input_dir = input_dir.as_ref();
        let output_dir = output_dir.as_ref();

        self.styler.validate()?;

        std::fs::create_dir_all(output_dir)?;
        if self.clear_existing {
            frames::clear_frame_images(output_dir)?;
        }

        let frame_paths = frames::list_frame_images(input_dir)?;
        if frame_paths.is_empty() {
            warn!("No frame images found in {:?}", input_dir);
            return Ok(0);
        }

        info!(
            "Styling {} frames with {} backend ({} job{})",
            frame_paths.len(),
            self.styler.name(),
            self.jobs,
            if self.jobs == 1 { "" } else { "s" }
        );

        if self.jobs == 1 {
            for path in &frame_paths {
                self.stylize_one(path, output_dir)?;
            }
        } else {
            self.apply_parallel(&frame_paths, output_dir)?;
        }

        Ok(frame_paths.len())
    }

    fn apply_parallel(&self, frame_paths: &[PathBuf], output_dir: &Path) -> Result<()> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .thread_name(|i| format!("stylize-{}", i))
            .build()
            .map_err(|e| StyleError::WorkerPool { reason: e.to_string() })?;

        pool.install(|| {
            frame_paths
                .par_iter()
                .try_for_each(|path| self.stylize_one(path, output_dir))
        })
    }

    fn stylize_one(&self, content: &Path, output_dir: &Path) -> Result<()> {
        let name = display_name(content);
        let output = output_dir.join(&name);

        debug!("Styling {} -> {}", content.display(), output.display());
        self.styler.stylize(content, &output)?;

        info!("Styled: {}", name);
        Ok(())
    }
}
