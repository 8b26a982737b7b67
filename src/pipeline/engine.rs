use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task;
use tracing::{debug, info, warn};

use crate::{
    config::Config,
    error::{ExtractError, PipelineError, Result},
    pipeline::{session::Session, stage::PipelineStage},
    styles::{ExternalStyleTransfer, StyleApplier, StyleTransfer},
    video::{check_tool_available, EncodedVideo, FrameExtractor, VideoComposer},
};

/// Callback invoked on every stage transition
pub type StageObserver = Arc<dyn Fn(PipelineStage) + Send + Sync>;

/// Summary of a completed run
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub frames_extracted: usize,
    pub frames_styled: usize,
    pub video: EncodedVideo,
    pub elapsed: Duration,
}

/// Orchestrates one extract → style → compose run
///
/// The engine follows a clear pipeline:
/// 1. Frame Extraction - Decode the source video into `frame_%04d.jpg` files
/// 2. Style Transfer - Run the style transfer backend on every frame
/// 3. Video Composition - Encode the styled frames into the output video
///
/// Each stage runs to completion on the blocking thread pool before the next
/// one starts. The filesystem is the only hand-off between stages.
pub struct StyleTransferPipeline {
    config: Config,
    styler: Option<Arc<dyn StyleTransfer>>,
    observer: Option<StageObserver>,
}

impl StyleTransferPipeline {
    /// Create a pipeline that drives the session's external style program
    pub fn new(config: Config) -> Self {
        Self {
            config,
            styler: None,
            observer: None,
        }
    }

    /// Use a specific style transfer backend instead of the session's program
    pub fn with_styler(mut self, styler: Arc<dyn StyleTransfer>) -> Self {
        self.styler = Some(styler);
        self
    }

    /// Get notified of each stage transition
    pub fn with_stage_observer(mut self, observer: StageObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Main entry point - runs all three stages in order
    pub async fn run(&self, session: &Session) -> Result<PipelineReport> {
        let started = Instant::now();
        let mut stage = PipelineStage::Idle;

        info!("🎬 Starting style transfer run");
        info!("   Video: {:?}", session.video());
        info!("   Model: {:?}", session.model());
        info!("   Output: {:?}", session.output_video());

        let styler = self.styler_for(session);
        styler.validate()?;
        self.check_tools()?;

        // Stage 1: Frame Extraction
        stage = self.advance(stage);
        let frames_extracted = self.extract_frames(session).await?;

        // Stage 2: Style Transfer
        stage = self.advance(stage);
        let frames_styled = self.style_frames(session, styler).await?;

        if frames_styled != frames_extracted {
            warn!("Extracted {} frames but styled {}", frames_extracted, frames_styled);
        }

        // Stage 3: Video Composition
        stage = self.advance(stage);
        let video = self.compose_video(session).await?;

        stage = self.advance(stage);
        debug_assert!(stage.is_terminal());

        let report = PipelineReport {
            frames_extracted,
            frames_styled,
            video,
            elapsed: started.elapsed(),
        };

        info!(
            "🎉 Process completed in {:.1}s! Output saved to: {:?}",
            report.elapsed.as_secs_f64(),
            report.video.path
        );
        Ok(report)
    }

    fn styler_for(&self, session: &Session) -> Arc<dyn StyleTransfer> {
        match &self.styler {
            Some(styler) => styler.clone(),
            None => Arc::new(ExternalStyleTransfer::from_config(
                session.style_program(),
                session.model(),
                &self.config.style,
            )),
        }
    }

    fn check_tools(&self) -> Result<()> {
        for tool in [&self.config.tools.ffmpeg, &self.config.tools.ffprobe] {
            if !check_tool_available(tool) {
                return Err(ExtractError::ToolUnavailable { tool: tool.clone() }.into());
            }
        }
        Ok(())
    }

    fn advance(&self, stage: PipelineStage) -> PipelineStage {
        let next = stage.next().unwrap_or(stage);
        debug!("Stage {} -> {}", stage, next);
        if let Some(observer) = &self.observer {
            observer(next);
        }
        next
    }

    async fn extract_frames(&self, session: &Session) -> Result<usize> {
        info!("📼 Step 1: Extracting frames...");

        let extractor = FrameExtractor::new(&self.config.tools, self.config.extract.clone());
        let video = session.video().to_path_buf();
        let frames_dir = session.frames_original().to_path_buf();

        let count = run_blocking(PipelineStage::Extracting, move || {
            extractor.extract(&video, &frames_dir)
        }).await?;

        info!("   ✅ Extracted {} frames into {:?}", count, session.frames_original());
        Ok(count)
    }

    async fn style_frames(&self, session: &Session, styler: Arc<dyn StyleTransfer>) -> Result<usize> {
        info!("🎨 Step 2: Applying {} style transfer...", styler.name());

        let applier = StyleApplier::new(styler)
            .with_jobs(self.config.style.effective_jobs())
            .with_clear_existing(self.config.style.clear_existing);
        let input_dir = session.frames_original().to_path_buf();
        let output_dir = session.frames_styled().to_path_buf();

        let count = run_blocking(PipelineStage::Styling, move || {
            applier.apply(&input_dir, &output_dir)
        }).await?;

        info!("   ✅ Styled {} frames into {:?}", count, session.frames_styled());
        Ok(count)
    }

    async fn compose_video(&self, session: &Session) -> Result<EncodedVideo> {
        info!("🎞️  Step 3: Composing output video...");

        let composer = VideoComposer::new(&self.config.tools, self.config.compose.clone());
        let frames_dir = session.frames_styled().to_path_buf();
        let output = session.output_video().to_path_buf();
        let fps = session.fps();

        let video = run_blocking(PipelineStage::Composing, move || {
            composer.compose(&frames_dir, &output, fps)
        }).await?;

        info!("   ✅ Output generation complete:");
        info!("      Frame count: {}", video.frame_count);
        info!("      Duration: {:.2}s", video.duration);
        info!("      File size: {:.1} MB", video.file_size as f64 / 1024.0 / 1024.0);
        Ok(video)
    }
}

/// Run a blocking stage on tokio's blocking pool and wait for it
async fn run_blocking<T, F>(stage: PipelineStage, work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    task::spawn_blocking(work)
        .await
        .map_err(|e| PipelineError::generic(format!("{} stage aborted: {}", stage, e)))?
}
