//! Navigation scripts: comma-separated guide operations.
//!
//! `next,next,prev,goto:3,skip`

use std::fmt;
use std::str::FromStr;

use wayfinder::{AnchorResolver, HighlightSurface, TourEvent, TourGuide};

use crate::error::{DemoError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptOp {
    Next,
    Previous,
    /// Jump to a zero-based step index.
    GoTo(usize),
    Stop,
    Skip,
    /// Re-resolve anchors without navigating.
    Refresh,
}

impl ScriptOp {
    /// Apply to `guide`, returning the transition it produced.
    pub fn apply<R, S>(self, guide: &mut TourGuide<R, S>) -> Option<TourEvent>
    where
        R: AnchorResolver,
        S: HighlightSurface,
    {
        match self {
            Self::Next => guide.next(),
            Self::Previous => guide.previous(),
            Self::GoTo(index) => guide.go_to_step(index),
            Self::Stop => guide.stop(),
            Self::Skip => guide.skip(),
            Self::Refresh => {
                guide.refresh();
                None
            }
        }
    }
}

impl fmt::Display for ScriptOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Next => f.write_str("next"),
            Self::Previous => f.write_str("prev"),
            Self::GoTo(index) => write!(f, "goto:{index}"),
            Self::Stop => f.write_str("stop"),
            Self::Skip => f.write_str("skip"),
            Self::Refresh => f.write_str("refresh"),
        }
    }
}

impl FromStr for ScriptOp {
    type Err = DemoError;

    fn from_str(s: &str) -> Result<Self> {
        let op = s.trim().to_ascii_lowercase();
        if let Some(index) = op.strip_prefix("goto:") {
            return index
                .parse()
                .map(Self::GoTo)
                .map_err(|_| DemoError::invalid(format!("bad step index in {s:?}")));
        }
        match op.as_str() {
            "next" => Ok(Self::Next),
            "prev" | "previous" => Ok(Self::Previous),
            "stop" => Ok(Self::Stop),
            "skip" => Ok(Self::Skip),
            "refresh" => Ok(Self::Refresh),
            _ => Err(DemoError::invalid(format!(
                "unknown script op {s:?} (expected next, prev, goto:N, stop, skip, refresh)"
            ))),
        }
    }
}

/// Parse a comma-separated script. Empty segments are ignored.
pub fn parse_script(script: &str) -> Result<Vec<ScriptOp>> {
    script
        .split(',')
        .filter(|part| !part.trim().is_empty())
        .map(str::parse)
        .collect()
}
