//! Frame classification from `showinfo` diagnostic lines.
//!
//! The probe hands back ffmpeg's debug log untouched. Lines written by the
//! `showinfo` filter look like:
//!
//! ```text
//! [Parsed_showinfo_0 @ 0x5581] n:   1 pts:   1001 pts_time:0.0417 ... i:P iskey:0 type:P checksum:...
//! ```
//!
//! Everything else in the log is skipped.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FrameType {
    I,
    P,
    B,
    Other(String),
}

impl FrameType {
    fn parse(value: &str) -> Self {
        match value {
            "I" => FrameType::I,
            "P" => FrameType::P,
            "B" => FrameType::B,
            other => FrameType::Other(other.to_string()),
        }
    }
}

impl fmt::Display for FrameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameType::I => write!(f, "I"),
            FrameType::P => write!(f, "P"),
            FrameType::B => write!(f, "B"),
            FrameType::Other(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameInfo {
    pub index: u64,
    pub key: bool,
    pub frame_type: FrameType,
    pub pts_time: Option<f64>,
}

/// Split `key:value` tokens. ffmpeg pads some numbers, so `n:   0` arrives
/// as the tokens `n:` and `0`.
fn fields(line: &str) -> Vec<(&str, &str)> {
    let mut out = Vec::new();
    let mut tokens = line.split_whitespace().peekable();

    while let Some(token) = tokens.next() {
        let Some((key, value)) = token.split_once(':') else {
            continue;
        };
        if value.is_empty() {
            if let Some(next) = tokens.peek() {
                if !next.contains(':') {
                    out.push((key, *next));
                    tokens.next();
                    continue;
                }
            }
        }
        out.push((key, value));
    }

    out
}

/// Parse one `showinfo` frame line, `None` for any other log line
pub fn parse_showinfo_line(line: &str) -> Option<FrameInfo> {
    if !line.contains("showinfo") {
        return None;
    }

    let mut index = None;
    let mut key = None;
    let mut frame_type = None;
    let mut pts_time = None;

    for (name, value) in fields(line) {
        match name {
            "n" => index = value.parse::<u64>().ok(),
            "iskey" => key = Some(value == "1"),
            "type" => frame_type = Some(FrameType::parse(value)),
            "pts_time" => pts_time = value.parse::<f64>().ok(),
            _ => {}
        }
    }

    Some(FrameInfo {
        index: index?,
        key: key?,
        frame_type: frame_type?,
        pts_time,
    })
}

/// Frame records in the order they appear in the log
pub fn classify<S: AsRef<str>>(lines: &[S]) -> Vec<FrameInfo> {
    lines
        .iter()
        .filter_map(|line| parse_showinfo_line(line.as_ref()))
        .collect()
}

/// Indices of key frames
pub fn keyframes(frames: &[FrameInfo]) -> Vec<u64> {
    frames.iter().filter(|f| f.key).map(|f| f.index).collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FrameTypeSummary {
    pub total: usize,
    pub keyframes: usize,
    pub i_frames: usize,
    pub p_frames: usize,
    pub b_frames: usize,
    pub other: usize,
}

impl FrameTypeSummary {
    pub fn from_frames(frames: &[FrameInfo]) -> Self {
        let mut summary = Self {
            total: frames.len(),
            ..Self::default()
        };
        for frame in frames {
            if frame.key {
                summary.keyframes += 1;
            }
            match frame.frame_type {
                FrameType::I => summary.i_frames += 1,
                FrameType::P => summary.p_frames += 1,
                FrameType::B => summary.b_frames += 1,
                FrameType::Other(_) => summary.other += 1,
            }
        }
        summary
    }
}
