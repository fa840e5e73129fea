//! Timeline animation for covering bars.
//!
//! This module provides:
//! - **Easing functions**: CSS timing functions and power curves
//! - **Timelines**: paused-until-played sequences of scale tweens
//! - **Animator**: the engine seam the reveal drives, plus the bundled
//!   [`TimelineEngine`]
//! - **Events**: lifecycle notifications drained after each frame
//!
//! # Architecture
//!
//! ```text
//! TimelineEngine (Animator)
//!   └── Timelines by id
//!         └── Tweens (target bar, axis, 1 -> 0, position)
//! ```

pub mod easing;
pub mod engine;
pub mod events;
pub mod timeline;
pub mod types;

pub use easing::{EaseMode, EasingFunction};
pub use engine::{Animator, TimelineEngine};
pub use events::{EventQueue, TimelineEvent};
pub use timeline::{Timeline, Tween};
pub use types::{ScaleAxis, TimelineId, TimelineState};
