//! Animation engine seam.
//!
//! The reveal never touches timelines directly; it goes through the
//! [`Animator`] trait so hosts can swap in their own engine. The bundled
//! [`TimelineEngine`] keeps timelines in a map, advances the playing ones on
//! every frame and writes the sampled scale into each target's inline
//! `transform`.

use std::collections::HashMap;

use marker_dom::{Document, ElementId};
use tracing::trace;

use super::events::{EventQueue, TimelineEvent};
use super::timeline::Timeline;
use super::types::{TimelineId, TimelineState};

/// Animation engine used by the reveal.
pub trait Animator {
    /// Apply inline style properties immediately.
    fn set(&mut self, doc: &mut Document, target: ElementId, props: &[(&str, &str)]);

    /// Show or hide an element through both `opacity` and `visibility`, so a
    /// fully transparent element also stops receiving pointer events.
    fn set_auto_alpha(&mut self, doc: &mut Document, target: ElementId, visible: bool) {
        if visible {
            self.set(doc, target, &[("opacity", "1"), ("visibility", "inherit")]);
        } else {
            self.set(doc, target, &[("opacity", "0"), ("visibility", "hidden")]);
        }
    }

    /// Take ownership of a paused timeline.
    fn create_timeline(&mut self, timeline: Timeline) -> TimelineId;

    fn timeline(&self, id: TimelineId) -> Option<&Timeline>;

    /// Start a paused timeline. Returns `false` for unknown, playing,
    /// finished or killed timelines.
    fn play(&mut self, id: TimelineId) -> bool;

    /// Stop and forget a timeline. Returns whether it was known.
    fn kill(&mut self, id: TimelineId) -> bool;

    /// Move every playing timeline forward by `delta_ms`.
    fn advance(&mut self, doc: &mut Document, delta_ms: f64);

    /// Number of timelines the engine still owns.
    fn live_timelines(&self) -> usize;

    /// Take every lifecycle event recorded since the last drain.
    fn drain_events(&mut self) -> Vec<TimelineEvent>;

    /// Number of events waiting to be drained.
    fn pending_events(&self) -> usize;
}

/// Default in-process [`Animator`].
#[derive(Debug, Default)]
pub struct TimelineEngine {
    timelines: HashMap<TimelineId, Timeline>,
    event_queue: EventQueue,
}

impl TimelineEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any timeline is currently playing.
    pub fn has_active_timelines(&self) -> bool {
        self.timelines.values().any(Timeline::is_active)
    }
}

impl Animator for TimelineEngine {
    fn set(&mut self, doc: &mut Document, target: ElementId, props: &[(&str, &str)]) {
        for (property, value) in props {
            doc.set_style(target, property, *value);
        }
    }

    fn create_timeline(&mut self, timeline: Timeline) -> TimelineId {
        let id = timeline.id;
        trace!(timeline = id.0, tweens = timeline.tweens().len(), "timeline created");
        self.timelines.insert(id, timeline);
        id
    }

    fn timeline(&self, id: TimelineId) -> Option<&Timeline> {
        self.timelines.get(&id)
    }

    fn play(&mut self, id: TimelineId) -> bool {
        let Some(timeline) = self.timelines.get_mut(&id) else {
            return false;
        };
        if !timeline.play() {
            return false;
        }
        self.event_queue.push(TimelineEvent::Played { timeline: id });
        true
    }

    fn kill(&mut self, id: TimelineId) -> bool {
        let Some(mut timeline) = self.timelines.remove(&id) else {
            return false;
        };
        timeline.kill();
        self.event_queue.push(TimelineEvent::Killed { timeline: id });
        true
    }

    fn advance(&mut self, doc: &mut Document, delta_ms: f64) {
        let delta_seconds = delta_ms.max(0.0) / 1000.0;
        for (id, timeline) in self.timelines.iter_mut() {
            if !timeline.is_active() {
                continue;
            }
            timeline.advance(delta_seconds);
            for (target, axis, value) in timeline.sample() {
                doc.set_style(target, "transform", axis.transform(value));
            }
            if timeline.state() == TimelineState::Finished {
                self.event_queue
                    .push(TimelineEvent::Completed { timeline: *id });
            }
        }
    }

    fn live_timelines(&self) -> usize {
        self.timelines.len()
    }

    fn drain_events(&mut self) -> Vec<TimelineEvent> {
        self.event_queue.drain().collect()
    }

    fn pending_events(&self) -> usize {
        self.event_queue.len()
    }
}

static_assertions::assert_impl_all!(TimelineEngine: Send);
