use super::ControlSource;
use crate::control::RawControlReading;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to read replay script: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("replay script has no keyframes")]
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    pub time_s: f32,
    pub left: Option<f32>,
    pub right: Option<f32>,
}

/// Timed control keyframes: `<seconds> <left|-> <right|->` per line, `#` comments.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayScript {
    frames: Vec<Keyframe>,
}

impl ReplayScript {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ReplayError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn parse(input: &str) -> Result<Self, ReplayError> {
        let mut frames = Vec::new();
        for (idx, raw) in input.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            let fields = line.split_whitespace().collect::<Vec<_>>();
            let [t, l, r] = fields[..] else {
                return Err(ReplayError::Parse {
                    line: line_no,
                    message: format!("expected `<seconds> <left> <right>`, got {} fields", fields.len()),
                });
            };
            let time_s = t.parse::<f32>().ok().filter(|v| v.is_finite() && *v >= 0.0).ok_or_else(|| {
                ReplayError::Parse {
                    line: line_no,
                    message: format!("bad timestamp `{t}`"),
                }
            })?;
            frames.push(Keyframe {
                time_s,
                left: parse_channel(l, line_no)?,
                right: parse_channel(r, line_no)?,
            });
        }
        if frames.is_empty() {
            return Err(ReplayError::Empty);
        }
        frames.sort_by(|a, b| a.time_s.total_cmp(&b.time_s));
        Ok(Self { frames })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn span_s(&self) -> f32 {
        self.frames.last().map_or(0.0, |f| f.time_s)
    }

    /// Channels present on both sides interpolate linearly; otherwise the
    /// earlier keyframe holds.
    pub fn sample(&self, t: f32) -> RawControlReading {
        let Some(first) = self.frames.first() else {
            return RawControlReading::NONE;
        };
        let after = self.frames.partition_point(|f| f.time_s <= t);
        if after == 0 {
            return RawControlReading {
                left: first.left,
                right: first.right,
            };
        }
        let a = self.frames[after - 1];
        let Some(b) = self.frames.get(after) else {
            return RawControlReading {
                left: a.left,
                right: a.right,
            };
        };
        let span = b.time_s - a.time_s;
        let frac = if span > 0.0 { (t - a.time_s) / span } else { 0.0 };
        RawControlReading {
            left: blend(a.left, b.left, frac),
            right: blend(a.right, b.right, frac),
        }
    }
}

fn parse_channel(raw: &str, line: usize) -> Result<Option<f32>, ReplayError> {
    if raw == "-" {
        return Ok(None);
    }
    raw.parse::<f32>()
        .ok()
        .filter(|v| (0.0..=1.0).contains(v))
        .map(Some)
        .ok_or_else(|| ReplayError::Parse {
            line,
            message: format!("channel value `{raw}` must be `-` or within [0, 1]"),
        })
}

fn blend(a: Option<f32>, b: Option<f32>, frac: f32) -> Option<f32> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x + (y - x) * frac),
        (v, _) => v,
    }
}

pub struct ReplaySource {
    script: ReplayScript,
    looping: bool,
}

impl ReplaySource {
    pub fn new(script: ReplayScript, looping: bool) -> Self {
        Self { script, looping }
    }
}

impl ControlSource for ReplaySource {
    fn label(&self) -> &'static str {
        "replay"
    }

    fn read(&mut self, elapsed: f64) -> RawControlReading {
        let span = f64::from(self.script.span_s());
        let t = if self.looping && span > 0.0 {
            elapsed.rem_euclid(span)
        } else {
            elapsed
        };
        self.script.sample(t as f32)
    }
}
