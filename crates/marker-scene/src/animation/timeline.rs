//! Timelines of scale tweens.
//!
//! A `Timeline` is an ordered list of `Tween`s, each placed at an absolute
//! start position in seconds. Timelines are created paused, play forward
//! once and cannot be restarted.
//!
//! ```
//! use marker_dom::Document;
//! use marker_scene::animation::{EasingFunction, ScaleAxis, Timeline, Tween};
//!
//! let mut doc = Document::new();
//! let bar = doc.create_element("div");
//!
//! let mut timeline = Timeline::new();
//! timeline.to(Tween::collapse(bar, ScaleAxis::X, 0.6, EasingFunction::default()), 0.1);
//! assert!((timeline.duration() - 0.7).abs() < 1e-9);
//! assert!(timeline.play());
//! assert!(!timeline.play());
//! ```

use marker_dom::ElementId;

use super::easing::EasingFunction;
use super::types::{ScaleAxis, TimelineId, TimelineState};

/// One property tween on one element.
#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    pub target: ElementId,
    pub axis: ScaleAxis,
    pub from: f64,
    pub to: f64,
    /// Duration in seconds.
    pub duration: f64,
    pub ease: EasingFunction,
    /// Start time within the timeline, in seconds. Set by [`Timeline::to`].
    pub position: f64,
}

impl Tween {
    /// Scale from fully covering (1) to fully collapsed (0).
    pub fn collapse(target: ElementId, axis: ScaleAxis, duration: f64, ease: EasingFunction) -> Self {
        Self {
            target,
            axis,
            from: 1.0,
            to: 0.0,
            duration,
            ease,
            position: 0.0,
        }
    }

    pub fn end(&self) -> f64 {
        self.position + self.duration
    }

    /// Value of the tweened property at timeline time `time`.
    pub fn value_at(&self, time: f64) -> f64 {
        let progress = if self.duration <= 0.0 {
            if time >= self.position { 1.0 } else { 0.0 }
        } else {
            ((time - self.position) / self.duration).clamp(0.0, 1.0)
        };
        let eased = f64::from(self.ease.evaluate(progress as f32));
        self.from + (self.to - self.from) * eased
    }
}

/// Ordered collection of tweens with a single playhead.
#[derive(Debug, Clone)]
pub struct Timeline {
    pub id: TimelineId,
    tweens: Vec<Tween>,
    state: TimelineState,
    time: f64,
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Timeline {
    /// Create an empty, paused timeline.
    pub fn new() -> Self {
        Self {
            id: TimelineId::new(),
            tweens: Vec::new(),
            state: TimelineState::Paused,
            time: 0.0,
        }
    }

    /// Schedule `tween` to start at `position` seconds.
    ///
    /// Negative positions are clamped to zero.
    pub fn to(&mut self, mut tween: Tween, position: f64) -> &mut Self {
        tween.position = position.max(0.0);
        self.tweens.push(tween);
        self
    }

    pub fn tweens(&self) -> &[Tween] {
        &self.tweens
    }

    pub fn state(&self) -> TimelineState {
        self.state
    }

    /// Current playhead in seconds.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Total length: the latest tween end.
    pub fn duration(&self) -> f64 {
        self.tweens.iter().map(Tween::end).fold(0.0, f64::max)
    }

    pub fn is_active(&self) -> bool {
        self.state == TimelineState::Playing
    }

    /// Start playback. Only a paused timeline can start; returns whether it did.
    pub fn play(&mut self) -> bool {
        if self.state != TimelineState::Paused {
            return false;
        }
        self.state = TimelineState::Playing;
        true
    }

    /// Stop immediately and discard progress.
    pub fn kill(&mut self) {
        self.state = TimelineState::Killed;
    }

    /// Move the playhead forward. Returns `true` while the timeline is still
    /// playing afterwards.
    pub fn advance(&mut self, delta_seconds: f64) -> bool {
        if self.state != TimelineState::Playing {
            return false;
        }
        self.time += delta_seconds.max(0.0);
        if self.time >= self.duration() {
            self.time = self.duration();
            self.state = TimelineState::Finished;
        }
        self.state == TimelineState::Playing
    }

    /// Current value of every tween, in schedule order.
    pub fn sample(&self) -> impl Iterator<Item = (ElementId, ScaleAxis, f64)> + '_ {
        self.tweens
            .iter()
            .map(|tween| (tween.target, tween.axis, tween.value_at(self.time)))
    }
}
