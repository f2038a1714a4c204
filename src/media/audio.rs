use std::path::{Path, PathBuf};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Result, MediaTapError};
use super::commands::MediaCommandBuilder;

/// Name of the extracted track inside the working directory
pub const AUDIO_FILE_NAME: &str = "audio.mkv";

/// Decides whether a source carries an audio stream
#[cfg_attr(test, mockall::automock)]
pub trait AudioPresenceProbe: Send + Sync {
    fn has_audio(&self, source: &Path) -> Result<bool>;
}

/// With `-loglevel error`, a copy-only audio pass over zero seconds prints
/// nothing when an audio stream exists. Any output means it does not.
pub fn silent_copy_indicates_audio(captured: &[u8]) -> bool {
    captured.is_empty()
}

/// Presence check through a zero-duration `-c:a copy` dry run
#[derive(Debug, Clone)]
pub struct CopyDryRunProbe {
    command_builder: MediaCommandBuilder,
}

impl CopyDryRunProbe {
    pub fn new(command_builder: MediaCommandBuilder) -> Self {
        Self { command_builder }
    }
}

impl AudioPresenceProbe for CopyDryRunProbe {
    fn has_audio(&self, source: &Path) -> Result<bool> {
        let output = self.command_builder.audio_presence_check(source).capture_merged()?;
        let present = silent_copy_indicates_audio(&output.bytes);
        debug!(
            "Audio presence check captured {} bytes (exit {:?}): present={}",
            output.bytes.len(),
            output.exit_code(),
            present
        );
        Ok(present)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AudioOutcome {
    /// Source has no audio stream; nothing was written
    NoAudioStream,
    /// Extraction ran. The exit code is reported, not checked.
    Extracted {
        path: PathBuf,
        exit_code: Option<i32>,
    },
}

impl AudioOutcome {
    pub fn audio_path(&self) -> Option<&Path> {
        match self {
            AudioOutcome::NoAudioStream => None,
            AudioOutcome::Extracted { path, .. } => Some(path),
        }
    }
}

/// Isolates the audio track of a source into `<work_dir>/audio.mkv`
pub struct AudioExtractor {
    command_builder: MediaCommandBuilder,
    presence: Box<dyn AudioPresenceProbe>,
}

impl AudioExtractor {
    pub fn new(command_builder: MediaCommandBuilder) -> Self {
        let presence = Box::new(CopyDryRunProbe::new(command_builder.clone()));
        Self {
            command_builder,
            presence,
        }
    }

    /// Replace the presence heuristic, e.g. with a stream inventory query
    pub fn with_presence_probe(mut self, presence: Box<dyn AudioPresenceProbe>) -> Self {
        self.presence = presence;
        self
    }

    pub fn output_path(work_dir: &Path) -> PathBuf {
        work_dir.join(AUDIO_FILE_NAME)
    }

    /// Extract (and optionally re-encode) the audio track. Blocks until both
    /// subprocesses have finished.
    ///
    /// Preconditions, checked before any subprocess runs: the source exists
    /// and the working directory is an existing directory. Either failing is
    /// `FileNotFound`, never a silent `NoAudioStream`.
    pub fn extract<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        source: P,
        work_dir: Q,
        audio_params: &[String],
    ) -> Result<AudioOutcome> {
        let source = source.as_ref();
        let work_dir = work_dir.as_ref();

        if !source.exists() {
            return Err(MediaTapError::FileNotFound(source.display().to_string()));
        }
        if !work_dir.is_dir() {
            return Err(MediaTapError::FileNotFound(format!(
                "working directory {}",
                work_dir.display()
            )));
        }

        info!("Audio processing");
        info!("Params: {}", audio_params.join(" "));

        if !self.presence.has_audio(source)? {
            info!("No audio stream in {}, skipping extraction", source.display());
            return Ok(AudioOutcome::NoAudioStream);
        }

        let audio_path = Self::output_path(work_dir);
        let output = self
            .command_builder
            .extract_audio(source, &audio_path, audio_params)
            .capture_merged()?;

        if !output.bytes.is_empty() {
            warn!("Audio extraction reported: {}", output.text().trim());
        }
        if !output.status.success() {
            warn!("Audio extraction exited with {}", output.status);
        }

        info!("Audio written to {}", audio_path.display());
        Ok(AudioOutcome::Extracted {
            path: audio_path,
            exit_code: output.exit_code(),
        })
    }
}
