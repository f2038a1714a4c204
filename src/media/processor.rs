use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::MediaConfig;
use crate::error::{Result, MediaTapError};
use super::{
    AudioExtractor, AudioOutcome, FrameTypeProbe, FrameTypeSequence, MediaCommandBuilder,
    MediaProcessorTrait,
};

/// Concrete implementation of media processor (FFmpeg-based)
pub struct MediaProcessorImpl {
    config: MediaConfig,
    command_builder: MediaCommandBuilder,
    probe: Arc<FrameTypeProbe>,
    extractor: Arc<AudioExtractor>,
}

impl MediaProcessorImpl {
    /// Create a new media processor implementation
    pub fn new(config: MediaConfig) -> Self {
        let command_builder = MediaCommandBuilder::new(&config.binary_path);
        let probe = Arc::new(FrameTypeProbe::new(command_builder.clone()));
        let extractor = Arc::new(AudioExtractor::new(command_builder.clone()));

        Self {
            config,
            command_builder,
            probe,
            extractor,
        }
    }

    /// Use a preconfigured extractor (custom presence probe)
    pub fn with_extractor(mut self, extractor: AudioExtractor) -> Self {
        self.extractor = Arc::new(extractor);
        self
    }

    pub fn config(&self) -> &MediaConfig {
        &self.config
    }
}

/// Run a blocking subprocess call off the async executor
async fn run_blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| MediaTapError::Task(format!("Media task panicked or was cancelled: {}", e)))?
}

#[async_trait]
impl MediaProcessorTrait for MediaProcessorImpl {
    async fn probe_frame_types(&self, source: &Path) -> Result<FrameTypeSequence> {
        let probe = Arc::clone(&self.probe);
        let source = source.to_path_buf();
        run_blocking(move || probe.probe(&source)).await
    }

    async fn extract_audio(
        &self,
        source: &Path,
        work_dir: &Path,
        audio_params: &[String],
    ) -> Result<AudioOutcome> {
        let extractor = Arc::clone(&self.extractor);
        let source = source.to_path_buf();
        let work_dir = work_dir.to_path_buf();
        let audio_params = audio_params.to_vec();
        run_blocking(move || extractor.extract(&source, &work_dir, &audio_params)).await
    }

    /// Check if media processor is available
    fn check_availability(&self) -> Result<()> {
        let output = self.command_builder.version_check().capture_merged()?;

        if output.status.success() {
            info!("Media processor is available");
            Ok(())
        } else {
            Err(MediaTapError::Config(format!(
                "{} -version exited with {}",
                self.config.binary_path, output.status
            )))
        }
    }

    /// Get media processor version information
    async fn get_version_info(&self) -> Result<String> {
        debug!("Getting media processor version information");

        let command = self.command_builder.version_check();
        let output = run_blocking(move || command.capture_merged()).await?;

        if output.status.success() {
            let version_info = output.text();
            // Extract the first line which typically contains the version
            let first_line = version_info.lines().next().unwrap_or("Unknown version");
            Ok(first_line.to_string())
        } else {
            Err(MediaTapError::Config(format!(
                "Media processor version check failed: {}",
                output.text().trim()
            )))
        }
    }
}
