use thiserror::Error;

/// Main error type for the stylize-video library
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Frame extraction error: {0}")]
    Extract(#[from] ExtractError),

    #[error("Style transfer error: {0}")]
    Style(#[from] StyleError),

    #[error("Video composition error: {0}")]
    Compose(#[from] ComposeError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Generic error: {0}")]
    Generic(String),
}

/// Errors raised while splitting a video into frame images
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Failed to open video file: {path} ({reason})")]
    OpenFailed { path: String, reason: String },

    #[error("Video decoding failed: {reason}")]
    DecodeFailed { reason: String },

    #[error("Failed to write frame image: {path} ({reason})")]
    FrameWriteFailed { path: String, reason: String },

    #[error("Required tool not available: {tool}")]
    ToolUnavailable { tool: String },
}

/// Errors raised while running the external style-transfer program
#[derive(Error, Debug)]
pub enum StyleError {
    #[error("Style transfer program not found: {path}")]
    ProgramNotFound { path: String },

    #[error("Model file not found: {path}")]
    ModelNotFound { path: String },

    #[error("Failed to launch style transfer for {frame}: {reason}")]
    SpawnFailed { frame: String, reason: String },

    #[error("Style transfer failed for {frame} (exit code {code:?}): {stderr}")]
    TransferFailed {
        frame: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Style transfer produced no output for {frame}: {path}")]
    MissingOutput { frame: String, path: String },

    #[error("Worker pool setup failed: {reason}")]
    WorkerPool { reason: String },
}

/// Errors raised while encoding frame images back into a video
#[derive(Error, Debug)]
pub enum ComposeError {
    #[error("No frame images found in directory: {path}")]
    NoFrames { path: String },

    #[error("Failed to read frame image: {path} ({reason})")]
    FrameReadFailed { path: String, reason: String },

    #[error("Frame {path} is {actual_width}x{actual_height}, expected {width}x{height}")]
    DimensionMismatch {
        path: String,
        width: u32,
        height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    #[error("Video encoding failed: {reason}")]
    EncodingFailed { reason: String },

    #[error("Required tool not available: {tool}")]
    ToolUnavailable { tool: String },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path} ({reason})")]
    ParseFailed { path: String, reason: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Convenience type alias for Results using PipelineError
pub type Result<T> = std::result::Result<T, PipelineError>;

impl PipelineError {
    /// Create a generic error with a custom message
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic(message.into())
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Extract(ExtractError::OpenFailed { path, .. }) => {
                format!("Could not open video file '{}'. Please check the file exists and is a readable video.", path)
            }
            Self::Extract(ExtractError::ToolUnavailable { tool })
            | Self::Compose(ComposeError::ToolUnavailable { tool }) => {
                format!("'{}' was not found. Please install FFmpeg and make sure it is on your PATH.", tool)
            }
            Self::Style(StyleError::ProgramNotFound { path }) => {
                format!("Style transfer program '{}' not found. Pass its location with --style-transfer.", path)
            }
            Self::Style(StyleError::ModelNotFound { path }) => {
                format!("Model file '{}' not found.", path)
            }
            Self::Compose(ComposeError::NoFrames { path }) => {
                format!("No frames to encode in '{}'. Did the style transfer step produce any output?", path)
            }
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_errors_convert() {
        let err: PipelineError = ComposeError::NoFrames {
            path: "frames_styled".to_string(),
        }
        .into();

        assert!(matches!(err, PipelineError::Compose(ComposeError::NoFrames { .. })));
        assert!(err.user_message().contains("frames_styled"));
    }

    #[test]
    fn test_transfer_failure_message_names_frame() {
        let err = StyleError::TransferFailed {
            frame: "frame_0003.jpg".to_string(),
            code: Some(2),
            stderr: "CUDA not available".to_string(),
        };

        let message = err.to_string();
        assert!(message.contains("frame_0003.jpg"));
        assert!(message.contains("CUDA not available"));
    }
}
