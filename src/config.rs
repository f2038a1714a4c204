use serde::{Deserialize, Serialize};
use std::path::Path;
use crate::error::{Result, MediaTapError};

fn default_binary_path() -> String {
    "ffmpeg".to_string()
}

fn default_audio_params() -> Vec<String> {
    vec!["-c:a".to_string(), "copy".to_string()]
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub media: MediaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Path to ffmpeg binary
    #[serde(default = "default_binary_path")]
    pub binary_path: String,
    /// Encoder options for the extracted audio track, passed to ffmpeg verbatim
    /// Common options: ["-c:a", "copy"], ["-c:a", "flac"], ["-c:a", "libopus", "-b:a", "128k"]
    #[serde(default = "default_audio_params")]
    pub audio_params: Vec<String>,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            binary_path: default_binary_path(),
            audio_params: default_audio_params(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| MediaTapError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| MediaTapError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| MediaTapError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| MediaTapError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}
