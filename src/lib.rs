//! Mediatap - ffmpeg frame type probing and audio extraction
//!
//! Wraps two ffmpeg invocations: a `showinfo` debug pass that captures one
//! diagnostic line per frame, and an audio pass that isolates the audio track
//! of a source when it has one.

pub mod cli;
pub mod config;
pub mod error;
pub mod frame_types;
pub mod logging;
pub mod media;
