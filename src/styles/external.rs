use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::config::StyleConfig;
use crate::error::{Result, StyleError};
use crate::styles::traits::StyleTransfer;
use crate::video::frames::display_name;

/// Lines of stderr kept in a failure report
const STDERR_TAIL_LINES: usize = 10;

/// Runs an external style transfer program once per frame
///
/// The program is invoked as
/// `<program> eval --content-image <in> --output-image <out> --model <model> --cuda <0|1>`,
/// optionally through an interpreter (`python style_transfer.py eval ...`).
#[derive(Debug, Clone)]
pub struct ExternalStyleTransfer {
    program: PathBuf,
    interpreter: Option<String>,
    model: PathBuf,
    cuda: bool,
}

impl ExternalStyleTransfer {
    pub fn new<P: Into<PathBuf>, M: Into<PathBuf>>(program: P, model: M) -> Self {
        Self {
            program: program.into(),
            interpreter: None,
            model: model.into(),
            cuda: false,
        }
    }

    /// Build from configuration; `.py` programs get the configured interpreter
    pub fn from_config<P: Into<PathBuf>, M: Into<PathBuf>>(program: P, model: M, config: &StyleConfig) -> Self {
        let program = program.into();
        let interpreter = config.interpreter_for(&program);
        Self::new(program, model)
            .with_interpreter(interpreter)
            .with_cuda(config.cuda)
    }

    pub fn with_interpreter(mut self, interpreter: Option<String>) -> Self {
        self.interpreter = interpreter;
        self
    }

    pub fn with_cuda(mut self, cuda: bool) -> Self {
        self.cuda = cuda;
        self
    }

    /// Build the command for one frame without running it
    pub fn command(&self, content: &Path, output: &Path) -> Command {
        let mut cmd = match &self.interpreter {
            Some(interpreter) => {
                let mut cmd = Command::new(interpreter);
                cmd.arg(&self.program);
                cmd
            }
            None => Command::new(&self.program),
        };

        cmd.arg("eval")
            .arg("--content-image").arg(content)
            .arg("--output-image").arg(output)
            .arg("--model").arg(&self.model)
            .arg("--cuda").arg(if self.cuda { "1" } else { "0" });
        cmd
    }

    /// Whether the program must exist as a file rather than be found on PATH
    fn program_is_path(&self) -> bool {
        self.interpreter.is_some()
            || self.program.is_absolute()
            || self.program.components().count() > 1
    }
}

impl StyleTransfer for ExternalStyleTransfer {
    fn name(&self) -> &str {
        "external"
    }

    fn validate(&self) -> Result<()> {
        if self.program_is_path() && !self.program.is_file() {
            return Err(StyleError::ProgramNotFound {
                path: self.program.display().to_string(),
            }.into());
        }

        if !self.model.is_file() {
            return Err(StyleError::ModelNotFound {
                path: self.model.display().to_string(),
            }.into());
        }

        Ok(())
    }

    fn stylize(&self, content: &Path, output: &Path) -> Result<()> {
        let frame = display_name(content);
        let mut cmd = self.command(content, output);
        debug!("Running {:?}", cmd);

        let result = cmd.output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                let missing = self.interpreter.clone()
                    .unwrap_or_else(|| self.program.display().to_string());
                StyleError::ProgramNotFound { path: missing }
            } else {
                StyleError::SpawnFailed {
                    frame: frame.clone(),
                    reason: e.to_string(),
                }
            }
        })?;

        let stdout = String::from_utf8_lossy(&result.stdout);
        if !stdout.trim().is_empty() {
            debug!("{}: {}", frame, stdout.trim());
        }

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(StyleError::TransferFailed {
                frame,
                code: result.status.code(),
                stderr: stderr_tail(&stderr),
            }.into());
        }

        if !output.is_file() {
            return Err(StyleError::MissingOutput {
                frame,
                path: output.display().to_string(),
            }.into());
        }

        Ok(())
    }
}

fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.trim_end().lines().collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use std::ffi::OsStr;
    use tempfile::tempdir;

    #[test]
    fn test_command_follows_eval_protocol() {
        let styler = ExternalStyleTransfer::new("style_transfer.py", "candy.pth")
            .with_interpreter(Some("python".to_string()))
            .with_cuda(true);

        let cmd = styler.command(Path::new("in/frame_0000.jpg"), Path::new("out/frame_0000.jpg"));
        let args: Vec<&OsStr> = cmd.get_args().collect();

        assert_eq!(cmd.get_program(), "python");
        assert_eq!(
            args,
            vec![
                "style_transfer.py", "eval",
                "--content-image", "in/frame_0000.jpg",
                "--output-image", "out/frame_0000.jpg",
                "--model", "candy.pth",
                "--cuda", "1",
            ]
        );
    }

    #[test]
    fn test_binary_runs_without_interpreter() {
        let styler = ExternalStyleTransfer::from_config("stylize-bin", "m.pth", &StyleConfig::default());
        let cmd = styler.command(Path::new("a.jpg"), Path::new("b.jpg"));

        assert_eq!(cmd.get_program(), "stylize-bin");
        assert_eq!(cmd.get_args().last(), Some(OsStr::new("0")));
    }

    #[test]
    fn test_validate_reports_missing_script_and_model() {
        let dir = tempdir().unwrap();
        let model = dir.path().join("model.pth");

        let styler = ExternalStyleTransfer::from_config(
            dir.path().join("style_transfer.py"),
            &model,
            &StyleConfig::default(),
        );
        assert!(matches!(
            styler.validate(),
            Err(PipelineError::Style(StyleError::ProgramNotFound { .. }))
        ));

        let script = dir.path().join("style_transfer.py");
        std::fs::write(&script, "").unwrap();
        let styler = ExternalStyleTransfer::from_config(&script, &model, &StyleConfig::default());
        assert!(matches!(
            styler.validate(),
            Err(PipelineError::Style(StyleError::ModelNotFound { .. }))
        ));

        std::fs::write(&model, "weights").unwrap();
        assert!(styler.validate().is_ok());
    }

    #[test]
    fn test_stderr_tail_keeps_last_lines() {
        let stderr: String = (0..25).map(|i| format!("line {}\n", i)).collect();
        let tail = stderr_tail(&stderr);

        assert_eq!(tail.lines().count(), STDERR_TAIL_LINES);
        assert!(tail.ends_with("line 24"));
    }

    #[cfg(unix)]
    mod subprocess {
        use super::*;

        fn stub(dir: &Path, body: &str) -> ExternalStyleTransfer {
            let script = dir.join("stub.sh");
            std::fs::write(&script, body).unwrap();
            let model = dir.join("model.pth");
            std::fs::write(&model, "weights").unwrap();

            ExternalStyleTransfer::new(script, model).with_interpreter(Some("sh".to_string()))
        }

        #[test]
        fn test_successful_invocation_writes_output() {
            let dir = tempdir().unwrap();
            // $3 is the content image, $5 the output image
            let styler = stub(dir.path(), "cp \"$3\" \"$5\"\n");

            let content = dir.path().join("frame_0000.jpg");
            std::fs::write(&content, b"pixels").unwrap();
            let output = dir.path().join("styled.jpg");

            styler.stylize(&content, &output).unwrap();
            assert_eq!(std::fs::read(&output).unwrap(), b"pixels");
        }

        #[test]
        fn test_nonzero_exit_is_reported() {
            let dir = tempdir().unwrap();
            let styler = stub(dir.path(), "echo 'out of memory' >&2\nexit 3\n");

            let content = dir.path().join("frame_0007.jpg");
            std::fs::write(&content, b"pixels").unwrap();

            match styler.stylize(&content, &dir.path().join("out.jpg")) {
                Err(PipelineError::Style(StyleError::TransferFailed { frame, code, stderr })) => {
                    assert_eq!(frame, "frame_0007.jpg");
                    assert_eq!(code, Some(3));
                    assert_eq!(stderr, "out of memory");
                }
                other => panic!("expected TransferFailed, got {:?}", other),
            }
        }

        #[test]
        fn test_success_without_output_is_reported() {
            let dir = tempdir().unwrap();
            let styler = stub(dir.path(), "exit 0\n");

            let content = dir.path().join("frame_0000.jpg");
            std::fs::write(&content, b"pixels").unwrap();

            assert!(matches!(
                styler.stylize(&content, &dir.path().join("out.jpg")),
                Err(PipelineError::Style(StyleError::MissingOutput { .. }))
            ));
        }
    }
}
