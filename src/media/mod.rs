// Media tool integration
//
// - Commands: command builders and merged-output execution
// - Stream: line reader over a child's merged stdout/stderr
// - Probe: frame type probe (raw showinfo diagnostics)
// - Audio: audio presence check and extraction
// - Processor: async facade over the blocking components

pub mod audio;
pub mod commands;
pub mod probe;
pub mod processor;
pub mod stream;

use async_trait::async_trait;
use std::path::Path;

pub use audio::*;
pub use commands::*;
pub use probe::*;
pub use processor::*;
pub use stream::*;

use crate::config::MediaConfig;
use crate::error::Result;

/// Main trait for media processing operations
#[async_trait]
pub trait MediaProcessorTrait: Send + Sync {
    /// Capture the per-frame diagnostic lines of a source
    async fn probe_frame_types(&self, source: &Path) -> Result<FrameTypeSequence>;

    /// Extract the audio track of a source into `<work_dir>/audio.mkv`
    async fn extract_audio(
        &self,
        source: &Path,
        work_dir: &Path,
        audio_params: &[String],
    ) -> Result<AudioOutcome>;

    /// Check if media processor is available
    fn check_availability(&self) -> Result<()>;

    /// Get media processor version information
    async fn get_version_info(&self) -> Result<String>;
}

/// Factory for creating media processor instances
pub struct MediaProcessorFactory;

impl MediaProcessorFactory {
    /// Create the default media processor implementation (FFmpeg-based)
    pub fn create_processor(config: MediaConfig) -> Box<dyn MediaProcessorTrait> {
        Box::new(processor::MediaProcessorImpl::new(config))
    }
}
