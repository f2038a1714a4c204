use std::path::Path;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{Result, MediaTapError};
use super::commands::MediaCommandBuilder;
use super::stream::MergedLineReader;

/// Raw diagnostic lines captured from a frame type probe, in emission order
#[derive(Debug, Clone, Default, Serialize)]
pub struct FrameTypeSequence {
    pub lines: Vec<String>,
    /// `None` when the tool was terminated by a signal
    pub exit_code: Option<i32>,
}

impl FrameTypeSequence {
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Whether the tool exited cleanly. Lines are returned either way.
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs ffmpeg with the `showinfo` filter and captures its debug output
#[derive(Debug, Clone)]
pub struct FrameTypeProbe {
    command_builder: MediaCommandBuilder,
}

impl FrameTypeProbe {
    pub fn new(command_builder: MediaCommandBuilder) -> Self {
        Self { command_builder }
    }

    /// Blocks until the tool has exited and its output stream is closed
    pub fn probe<P: AsRef<Path>>(&self, source: P) -> Result<FrameTypeSequence> {
        let source = source.as_ref();
        if !source.exists() {
            return Err(MediaTapError::FileNotFound(source.display().to_string()));
        }

        info!("Probing frame types of {}", source.display());

        let command = self.command_builder.frame_type_probe(source);
        let output = MergedLineReader::new(command.spawn_merged()?).read_to_end()?;

        let sequence = FrameTypeSequence {
            lines: output.lines,
            exit_code: output.status.code(),
        };

        if !sequence.success() {
            warn!(
                "{} exited with {}; keeping {} captured lines",
                command.binary_path,
                output.status,
                sequence.len()
            );
        }

        info!("Captured {} diagnostic lines", sequence.len());
        Ok(sequence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_source() {
        let probe = FrameTypeProbe::new(MediaCommandBuilder::new("ffmpeg"));
        let err = probe.probe("/nonexistent/input.mkv").unwrap_err();
        assert!(matches!(err, MediaTapError::FileNotFound(_)));
    }

    #[test]
    fn test_missing_tool() {
        let source = tempfile::NamedTempFile::new().unwrap();
        let probe = FrameTypeProbe::new(MediaCommandBuilder::new("/nonexistent/ffmpeg"));
        let err = probe.probe(source.path()).unwrap_err();
        assert!(err.is_tool_unavailable());
    }

    #[test]
    fn test_success_flag() {
        let ok = FrameTypeSequence { lines: vec![], exit_code: Some(0) };
        let failed = FrameTypeSequence { lines: vec!["x".into()], exit_code: Some(1) };
        let killed = FrameTypeSequence { lines: vec![], exit_code: None };
        assert!(ok.success());
        assert!(!failed.success());
        assert!(!killed.success());
        assert_eq!(failed.len(), 1);
    }
}
