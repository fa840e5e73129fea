//! Core animation types.
//!
//! - `TimelineId`: unique identifier for a timeline
//! - `ScaleAxis`: the single transform axis a bar animates
//! - `TimelineState`: playback state of a timeline

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Unique identifier for a timeline instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimelineId(pub u64);

impl TimelineId {
    /// Generate a new unique timeline ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for TimelineId {
    fn default() -> Self {
        Self::new()
    }
}

/// Transform axis a bar collapses along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScaleAxis {
    #[serde(rename = "scaleX")]
    X,
    #[serde(rename = "scaleY")]
    Y,
}

impl ScaleAxis {
    /// Name of the transform function, `scaleX` or `scaleY`.
    pub fn property(&self) -> &'static str {
        match self {
            Self::X => "scaleX",
            Self::Y => "scaleY",
        }
    }

    /// CSS `transform` value for a scale along this axis.
    pub fn transform(&self, value: f64) -> String {
        format!("{}({})", self.property(), value)
    }
}

impl fmt::Display for ScaleAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.property())
    }
}

/// Playback state of a timeline.
///
/// Timelines only move forward: `Paused -> Playing -> Finished`, with
/// `Killed` reachable from any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineState {
    /// Built but not yet played.
    Paused,
    /// Advancing with each frame.
    Playing,
    /// Every tween has reached its end value.
    Finished,
    /// Stopped by its owner; progress is discarded.
    Killed,
}

impl Default for TimelineState {
    fn default() -> Self {
        Self::Paused
    }
}
