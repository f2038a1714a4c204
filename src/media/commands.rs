use std::io::{self, PipeReader, Read};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use tracing::debug;

use crate::error::{Result, MediaTapError};

/// Abstract media processing command representation
#[derive(Debug, Clone)]
pub struct MediaCommand {
    pub binary_path: String,
    pub args: Vec<String>,
    pub description: String,
}

/// Everything a finished command wrote to its merged stdout/stderr
#[derive(Debug)]
pub struct CapturedOutput {
    pub bytes: Vec<u8>,
    pub status: ExitStatus,
}

impl CapturedOutput {
    /// Exit code, `None` when the process was terminated by a signal
    pub fn exit_code(&self) -> Option<i32> {
        self.status.code()
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// A running child whose stdout and stderr share one pipe
pub struct MergedChild {
    pub child: Child,
    pub output: PipeReader,
}

impl MediaCommand {
    /// Create a new media processing command
    pub fn new<S1: Into<String>, S2: Into<String>>(binary_path: S1, description: S2) -> Self {
        Self {
            binary_path: binary_path.into(),
            args: Vec::new(),
            description: description.into(),
        }
    }

    /// Add an argument
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(|s| s.into()));
        self
    }

    /// Add input file
    pub fn input<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg("-i").arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Add output file
    pub fn output<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Discard output into the null muxer
    pub fn null_output(self) -> Self {
        self.format("null").arg("-")
    }

    /// Force overwrite output
    pub fn overwrite(self) -> Self {
        self.arg("-y")
    }

    pub fn hide_banner(self) -> Self {
        self.arg("-hide_banner")
    }

    pub fn log_level<S: Into<String>>(self, level: S) -> Self {
        self.arg("-loglevel").arg(level)
    }

    /// Seek to a position (seconds) before the following input
    pub fn seek<S: Into<String>>(self, position: S) -> Self {
        self.arg("-ss").arg(position)
    }

    /// Limit processed duration (seconds)
    pub fn duration<S: Into<String>>(self, duration: S) -> Self {
        self.arg("-t").arg(duration)
    }

    /// Force container format
    pub fn format<S: Into<String>>(self, format: S) -> Self {
        self.arg("-f").arg(format)
    }

    /// Set audio codec
    pub fn audio_codec<S: Into<String>>(self, codec: S) -> Self {
        self.arg("-c:a").arg(codec)
    }

    /// Copy audio stream
    pub fn copy_audio(self) -> Self {
        self.audio_codec("copy")
    }

    /// Disable video
    pub fn no_video(self) -> Self {
        self.arg("-vn")
    }

    /// Disable data streams
    pub fn no_data(self) -> Self {
        self.arg("-dn")
    }

    /// Drop all container level metadata
    pub fn strip_metadata(self) -> Self {
        self.arg("-map_metadata").arg("-1")
    }

    /// Add video filter
    pub fn video_filter<S: Into<String>>(self, filter: S) -> Self {
        self.arg("-vf").arg(filter)
    }

    fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.binary_path);
        cmd.args(&self.args);
        cmd
    }

    fn unavailable(&self, source: io::Error) -> MediaTapError {
        MediaTapError::ToolUnavailable {
            tool: self.binary_path.clone(),
            source,
        }
    }

    /// Spawn the command with stdout and stderr redirected into a single pipe
    pub fn spawn_merged(&self) -> Result<MergedChild> {
        debug!("Executing media processing command: {} {:?}", self.binary_path, self.args);
        debug!("Description: {}", self.description);

        let (reader, writer) = io::pipe()?;
        let stderr_writer = writer.try_clone()?;

        // The Command owns the parent's copies of the write end; it must be
        // dropped before reading or the pipe never reports end of stream.
        let child = {
            let mut cmd = self.to_command();
            cmd.stdin(Stdio::null())
                .stdout(writer)
                .stderr(stderr_writer);
            cmd.spawn().map_err(|e| self.unavailable(e))?
        };

        Ok(MergedChild { child, output: reader })
    }

    /// Run to completion, capturing the merged output bytes.
    /// A nonzero exit is reported through the returned status, not as an error.
    pub fn capture_merged(&self) -> Result<CapturedOutput> {
        let MergedChild { mut child, mut output } = self.spawn_merged()?;

        let mut bytes = Vec::new();
        if let Err(e) = output.read_to_end(&mut bytes) {
            let _ = child.kill();
            let _ = child.wait();
            return Err(MediaTapError::StreamRead(format!(
                "{}: {}",
                self.description, e
            )));
        }
        drop(output);

        let status = child.wait()?;
        debug!("{} exited with {} ({} bytes of output)", self.description, status, bytes.len());

        Ok(CapturedOutput { bytes, status })
    }

    /// Full command line, for logging
    pub fn command_line(&self) -> String {
        std::iter::once(self.binary_path.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Builder for the fixed ffmpeg invocations used by this crate
#[derive(Debug, Clone)]
pub struct MediaCommandBuilder {
    binary_path: String,
}

impl MediaCommandBuilder {
    /// Create a new command builder
    pub fn new<S: Into<String>>(binary_path: S) -> Self {
        Self {
            binary_path: binary_path.into(),
        }
    }

    pub fn binary_path(&self) -> &str {
        &self.binary_path
    }

    /// `<tool> -hide_banner -i <input> -vf showinfo -f null -loglevel debug -`
    pub fn frame_type_probe<P: AsRef<Path>>(&self, input_path: P) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "Frame type probe")
            .hide_banner()
            .input(input_path)
            .video_filter("showinfo")
            .format("null")
            .log_level("debug")
            .arg("-")
    }

    /// `<tool> -y -hide_banner -loglevel error -ss 0 -i <input> -t 0 -vn -c:a copy -f null -`
    pub fn audio_presence_check<P: AsRef<Path>>(&self, input_path: P) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "Audio presence check")
            .overwrite()
            .hide_banner()
            .log_level("error")
            .seek("0")
            .input(input_path)
            .duration("0")
            .no_video()
            .copy_audio()
            .null_output()
    }

    /// `<tool> -y -hide_banner -loglevel error -i <input> -map_metadata -1 -dn -vn <params...> <output>`
    pub fn extract_audio<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_path: P,
        audio_path: Q,
        audio_params: &[String],
    ) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "Audio extraction")
            .overwrite()
            .hide_banner()
            .log_level("error")
            .input(input_path)
            .strip_metadata()
            .no_data()
            .no_video()
            .args(audio_params.iter().cloned())
            .output(audio_path)
    }

    /// Build version check command
    pub fn version_check(&self) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "Version check")
            .arg("-version")
    }
}
