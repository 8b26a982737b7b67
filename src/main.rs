use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use stylize_video::{
    config::Config,
    logging::init_logging,
    pipeline::{Session, SessionInputs, StyleTransferPipeline},
    styles::{ExternalStyleTransfer, PassthroughStyle},
};

#[derive(Parser)]
#[command(
    name = "stylize-video",
    version,
    about = "Apply style transfer to a video",
    long_about = "Splits a video into frames, runs an external neural style transfer program on every frame, and encodes the styled frames back into a video."
)]
struct Cli {
    /// Input video file path
    #[arg(long)]
    video: PathBuf,

    /// Output video file path
    #[arg(long)]
    output: PathBuf,

    /// Path to the style model (e.g. a .pth file)
    #[arg(long)]
    model: PathBuf,

    /// Frames per second for the output video
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Path to the style transfer program or script
    #[arg(long = "style-transfer", default_value = "style_transfer.py")]
    style_transfer: PathBuf,

    /// Interpreter to launch the style transfer program with (overrides auto-detection)
    #[arg(long)]
    interpreter: Option<String>,

    /// Ask the style transfer program to run on the GPU
    #[arg(long)]
    cuda: bool,

    /// Concurrent style transfer invocations (0 = one per CPU)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Directory that receives the intermediate frame directories
    #[arg(long)]
    work_dir: Option<PathBuf>,

    /// Copy frames instead of styling them (checks extraction and encoding)
    #[arg(long)]
    passthrough: bool,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    info!("Starting stylize-video v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(cli).await {
        match e.downcast_ref::<stylize_video::PipelineError>() {
            Some(pipeline_error) => error!("{}", pipeline_error.user_message()),
            None => error!("{:#}", e),
        }
        std::process::exit(1);
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    // Load configuration
    let mut config = match &cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(config_path)?
        }
        None => Config::default(),
    };

    if cli.cuda {
        config.style.cuda = true;
    }
    if let Some(jobs) = cli.jobs {
        config.style.jobs = jobs;
    }

    let work_dir = match cli.work_dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    let session = Session::with_work_dir(
        SessionInputs {
            video: cli.video,
            model: cli.model,
            style_program: cli.style_transfer,
            fps: cli.fps,
        },
        cli.output,
        &work_dir,
        &config.layout,
    )?;

    let mut pipeline = StyleTransferPipeline::new(config.clone());
    if cli.passthrough {
        info!("Passthrough mode: frames are copied, not styled");
        pipeline = pipeline.with_styler(Arc::new(PassthroughStyle::new()));
    } else if let Some(interpreter) = cli.interpreter {
        let styler = ExternalStyleTransfer::new(session.style_program(), session.model())
            .with_interpreter(Some(interpreter).filter(|i| !i.is_empty()))
            .with_cuda(config.style.cuda);
        pipeline = pipeline.with_styler(Arc::new(styler));
    }

    let report = pipeline.run(&session).await?;

    info!(
        "Extracted {} frames, styled {}, wrote {} frames to {:?}",
        report.frames_extracted, report.frames_styled, report.video.frame_count, report.video.path
    );
    Ok(())
}
