// File-picker front end: the same pipeline, inputs gathered with native dialogs

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use stylize_video::{
    config::Config,
    gui,
    logging::init_logging,
    pipeline::StyleTransferPipeline,
};

#[derive(Parser)]
#[command(name = "stylize-video-gui", version, about = "Style transfer video processor with file dialogs")]
struct GuiArgs {
    /// Path to the style transfer program or script
    #[arg(long = "style-transfer", default_value = "style_transfer.py")]
    style_transfer: PathBuf,

    /// Frames per second for the output video
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = GuiArgs::parse();
    init_logging(args.verbose);

    let config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    let runtime = tokio::runtime::Runtime::new()?;

    // Each pass is one Idle → ... → Done run; cancelling a dialog returns to Idle
    while gui::confirm_start() {
        let session = match gui::prompt_session(&config.layout, &args.style_transfer, args.fps)? {
            Some(session) => session,
            None => continue,
        };

        let pipeline = StyleTransferPipeline::new(config.clone());
        match runtime.block_on(pipeline.run(&session)) {
            Ok(report) => gui::show_completed(&report),
            Err(e) => {
                error!("{}", e);
                gui::show_error(&e);
            }
        }
    }

    info!("Exiting");
    Ok(())
}
