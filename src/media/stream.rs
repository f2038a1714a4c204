// Line-oriented consumption of a child's merged output stream.
//
// An empty line alone does not mean the stream is over: a still-running
// process may legitimately print blank lines. The reader consults the
// child's exit status whenever it sees one.

use std::io::{BufRead, BufReader};
use std::process::{Child, ExitStatus};
use tracing::{debug, trace};

use crate::error::{Result, MediaTapError};
use super::commands::MergedChild;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// Process alive, every line is kept
    Reading,
    /// Process exited or stream closed; flush what is still buffered
    Draining,
    /// Child reaped
    Closed,
}

/// Lines read from a merged stream, plus how the process ended
#[derive(Debug)]
pub struct StreamOutput {
    pub lines: Vec<String>,
    pub status: ExitStatus,
}

pub struct MergedLineReader<R> {
    child: Child,
    reader: BufReader<R>,
    state: StreamState,
    lines: Vec<String>,
}

impl MergedLineReader<std::io::PipeReader> {
    pub fn new(merged: MergedChild) -> Self {
        Self::from_parts(merged.child, merged.output)
    }
}

impl<R: std::io::Read> MergedLineReader<R> {
    pub fn from_parts(child: Child, output: R) -> Self {
        Self {
            child,
            reader: BufReader::new(output),
            state: StreamState::Reading,
            lines: Vec::new(),
        }
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Consume the stream until the child has exited and the pipe is closed
    pub fn read_to_end(mut self) -> Result<StreamOutput> {
        let mut buf = Vec::new();

        loop {
            match self.state {
                StreamState::Reading | StreamState::Draining => {
                    buf.clear();
                    let read = match self.reader.read_until(b'\n', &mut buf) {
                        Ok(n) => n,
                        Err(e) => return Err(self.abort(format!("read failed: {}", e))),
                    };

                    if read == 0 {
                        if self.state == StreamState::Reading {
                            debug!("Output stream closed after {} lines", self.lines.len());
                        }
                        self.state = StreamState::Draining;
                        let status = self.child.wait()?;
                        self.state = StreamState::Closed;
                        return Ok(StreamOutput {
                            lines: self.lines,
                            status,
                        });
                    }

                    let line = match std::str::from_utf8(&buf) {
                        Ok(text) => text.trim().to_string(),
                        Err(e) => return Err(self.abort(format!("output is not valid UTF-8: {}", e))),
                    };

                    if !line.is_empty() {
                        self.lines.push(line);
                        continue;
                    }

                    if self.state == StreamState::Reading {
                        if self.child.try_wait()?.is_some() {
                            trace!("Empty line after process exit, draining");
                            self.state = StreamState::Draining;
                        } else {
                            self.lines.push(line);
                        }
                    }
                }
                StreamState::Closed => unreachable!("closed reader is consumed"),
            }
        }
    }

    fn abort(&mut self, reason: String) -> MediaTapError {
        let _ = self.child.kill();
        let _ = self.child.wait();
        self.state = StreamState::Closed;
        MediaTapError::StreamRead(reason)
    }
}
