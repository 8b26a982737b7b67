//! Native dialog front end.
//!
//! Gathers the run inputs with three sequential file dialogs. Cancelling any
//! of them abandons the selection before anything touches the filesystem.

use std::path::{Path, PathBuf};

use rfd::{FileDialog, MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};
use tracing::info;

use crate::config::LayoutConfig;
use crate::error::{PipelineError, Result};
use crate::pipeline::{PipelineReport, Session, SessionInputs};

pub const WINDOW_TITLE: &str = "Style Transfer Video Processor";

/// Paths picked in the three dialogs
#[derive(Debug, Clone)]
pub struct DialogSelections {
    pub video: PathBuf,
    pub output_dir: PathBuf,
    pub model: PathBuf,
}

/// Ask whether to start a run; `false` means the user wants to quit
pub fn confirm_start() -> bool {
    let result = MessageDialog::new()
        .set_title(WINDOW_TITLE)
        .set_description("Select Files & Process Video?")
        .set_level(MessageLevel::Info)
        .set_buttons(MessageButtons::OkCancel)
        .show();

    matches!(result, MessageDialogResult::Ok)
}

/// Run the video, output folder and model dialogs in order
///
/// Returns `None` as soon as one is cancelled.
pub fn pick_selections() -> Option<DialogSelections> {
    let video = FileDialog::new()
        .set_title("Select Input Video")
        .add_filter("MP4 files", &["mp4"])
        .add_filter("All Files", &["*"])
        .pick_file()?;

    let output_dir = FileDialog::new()
        .set_title("Select Output Folder")
        .pick_folder()?;

    let model = FileDialog::new()
        .set_title("Select Style Transfer Model")
        .add_filter("PyTorch Model", &["pth"])
        .add_filter("All Files", &["*"])
        .pick_file()?;

    Some(DialogSelections { video, output_dir, model })
}

/// Collect a complete [`Session`] from the dialogs
///
/// `Ok(None)` means a dialog was cancelled.
pub fn prompt_session(layout: &LayoutConfig, style_program: &Path, fps: u32) -> Result<Option<Session>> {
    let selections = match pick_selections() {
        Some(selections) => selections,
        None => {
            info!("Selection cancelled");
            return Ok(None);
        }
    };

    let session = Session::in_output_dir(
        SessionInputs {
            video: selections.video,
            model: selections.model,
            style_program: style_program.to_path_buf(),
            fps,
        },
        &selections.output_dir,
        layout,
    )?;
    Ok(Some(session))
}

pub fn show_completed(report: &PipelineReport) {
    MessageDialog::new()
        .set_title(WINDOW_TITLE)
        .set_description(format!(
            "Process completed!\n\n{} frames written to\n{}",
            report.video.frame_count,
            report.video.path.display()
        ))
        .set_level(MessageLevel::Info)
        .set_buttons(MessageButtons::Ok)
        .show();
}

pub fn show_error(error: &PipelineError) {
    MessageDialog::new()
        .set_title(WINDOW_TITLE)
        .set_description(error.user_message())
        .set_level(MessageLevel::Error)
        .set_buttons(MessageButtons::Ok)
        .show();
}
