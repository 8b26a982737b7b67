use std::path::Path;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Main configuration for stylize-video
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// External tool locations
    pub tools: ToolsConfig,

    /// Frame extraction settings
    pub extract: ExtractConfig,

    /// Style transfer settings
    pub style: StyleConfig,

    /// Video composition settings
    pub compose: ComposeConfig,

    /// Intermediate directory and output naming
    pub layout: LayoutConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound { path: path.display().to_string() })?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::ParseFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidValue {
                key: "config".to_string(),
                value: e.to_string()
            })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.tools.validate()?;
        self.extract.validate()?;
        self.compose.validate()?;
        self.layout.validate()?;
        Ok(())
    }
}

/// Locations of the ffmpeg command line tools
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub ffmpeg: String,
    pub ffprobe: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg: "ffmpeg".to_string(),
            ffprobe: "ffprobe".to_string(),
        }
    }
}

impl ToolsConfig {
    fn validate(&self) -> Result<()> {
        for (key, value) in [("tools.ffmpeg", &self.ffmpeg), ("tools.ffprobe", &self.ffprobe)] {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: value.clone(),
                }.into());
            }
        }
        Ok(())
    }
}

/// Frame extraction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// JPEG quality for extracted frames (1-100)
    pub jpeg_quality: u8,

    /// Remove frame images left over from an earlier run before extracting
    pub clear_existing: bool,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: 95,
            clear_existing: true,
        }
    }
}

impl ExtractConfig {
    fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ConfigError::InvalidValue {
                key: "extract.jpeg_quality".to_string(),
                value: self.jpeg_quality.to_string()
            }.into());
        }
        Ok(())
    }
}

/// Style transfer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    /// Interpreter used to launch `.py` style transfer scripts
    pub interpreter: String,

    /// Pass `--cuda 1` to the style transfer program
    pub cuda: bool,

    /// Concurrent style transfer invocations (0 = one per CPU)
    pub jobs: usize,

    /// Remove styled images left over from an earlier run before styling
    pub clear_existing: bool,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            interpreter: "python".to_string(),
            cuda: false,
            jobs: 1,
            clear_existing: true,
        }
    }
}

impl StyleConfig {
    /// Number of worker threads to use for style transfer
    pub fn effective_jobs(&self) -> usize {
        match self.jobs {
            0 => num_cpus::get(),
            n => n,
        }
    }

    /// Interpreter to launch `program` with, if any
    ///
    /// Python scripts are run through the configured interpreter; anything
    /// else is executed directly.
    pub fn interpreter_for(&self, program: &Path) -> Option<String> {
        let is_script = program
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("py"))
            .unwrap_or(false);

        if is_script && !self.interpreter.is_empty() {
            Some(self.interpreter.clone())
        } else {
            None
        }
    }
}

/// Video composition configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposeConfig {
    /// ffmpeg encoder name
    pub codec: String,

    /// Four character code written into the container
    pub fourcc: String,

    /// Output pixel format
    pub pixel_format: String,

    /// ffmpeg `-q:v` quantizer (1 = best, 31 = worst)
    pub quality: u8,

    /// Resize frames that differ from the first frame instead of failing
    pub resize_mismatched: bool,
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            codec: "mpeg4".to_string(),
            fourcc: "mp4v".to_string(),
            pixel_format: "yuv420p".to_string(),
            quality: 2,
            resize_mismatched: true,
        }
    }
}

impl ComposeConfig {
    fn validate(&self) -> Result<()> {
        if self.codec.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "compose.codec".to_string(),
                value: self.codec.clone()
            }.into());
        }

        if !self.fourcc.is_empty() && self.fourcc.len() != 4 {
            return Err(ConfigError::InvalidValue {
                key: "compose.fourcc".to_string(),
                value: self.fourcc.clone()
            }.into());
        }

        if !(1..=31).contains(&self.quality) {
            return Err(ConfigError::InvalidValue {
                key: "compose.quality".to_string(),
                value: self.quality.to_string()
            }.into());
        }

        Ok(())
    }
}

/// Names of the intermediate directories and the GUI output file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub original_dir: String,
    pub styled_dir: String,
    pub output_file: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            original_dir: "frames_original".to_string(),
            styled_dir: "frames_styled".to_string(),
            output_file: "styled_output.mp4".to_string(),
        }
    }
}

impl LayoutConfig {
    fn validate(&self) -> Result<()> {
        if self.original_dir == self.styled_dir {
            return Err(ConfigError::InvalidValue {
                key: "layout.styled_dir".to_string(),
                value: self.styled_dir.clone()
            }.into());
        }

        for (key, value) in [
            ("layout.original_dir", &self.original_dir),
            ("layout.styled_dir", &self.styled_dir),
            ("layout.output_file", &self.output_file),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: value.clone(),
                }.into());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test_config.toml");

        let mut original_config = Config::default();
        original_config.style.jobs = 4;
        original_config.compose.quality = 5;

        original_config.save_to_file(&file_path).unwrap();
        let loaded_config = Config::from_file(&file_path).unwrap();

        assert_eq!(loaded_config.style.jobs, 4);
        assert_eq!(loaded_config.compose.quality, 5);
        assert_eq!(loaded_config.layout.original_dir, "frames_original");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("partial.toml");
        std::fs::write(&file_path, "[style]\ncuda = true\n").unwrap();

        let config = Config::from_file(&file_path).unwrap();
        assert!(config.style.cuda);
        assert_eq!(config.style.jobs, 1);
        assert_eq!(config.compose.codec, "mpeg4");
    }

    #[test]
    fn test_missing_config_file() {
        let dir = tempdir().unwrap();
        let result = Config::from_file(dir.path().join("nope.toml"));
        assert!(matches!(
            result,
            Err(crate::error::PipelineError::Config(ConfigError::FileNotFound { .. }))
        ));
    }

    #[test]
    fn test_invalid_jpeg_quality() {
        let mut config = Config::default();
        config.extract.jpeg_quality = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_quantizer() {
        let mut config = Config::default();
        config.compose.quality = 40;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_layout_dirs_must_differ() {
        let mut config = Config::default();
        config.layout.styled_dir = config.layout.original_dir.clone();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_interpreter_only_for_python_scripts() {
        let style = StyleConfig::default();
        assert_eq!(
            style.interpreter_for(Path::new("style_transfer.py")),
            Some("python".to_string())
        );
        assert_eq!(style.interpreter_for(Path::new("/usr/local/bin/stylize")), None);
    }

    #[test]
    fn test_zero_jobs_means_all_cpus() {
        let style = StyleConfig { jobs: 0, ..StyleConfig::default() };
        assert_eq!(style.effective_jobs(), num_cpus::get());
    }
}
