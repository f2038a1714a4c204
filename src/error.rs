use thiserror::Error;

#[derive(Error, Debug)]
pub enum MediaTapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// The external tool could not be launched at all
    #[error("Media tool unavailable ({tool}): {source}")]
    ToolUnavailable {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read media tool output: {0}")]
    StreamRead(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Background task failed: {0}")]
    Task(String),
}

impl MediaTapError {
    /// True when the failure means the media tool itself is missing or not executable
    pub fn is_tool_unavailable(&self) -> bool {
        matches!(self, MediaTapError::ToolUnavailable { .. })
    }
}

pub type Result<T> = std::result::Result<T, MediaTapError>;
