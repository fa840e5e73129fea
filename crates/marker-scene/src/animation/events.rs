//! Timeline lifecycle events.
//!
//! The engine records an event whenever a timeline starts playing, reaches
//! its end or is killed. Hosts drain the queue after each frame.
//!
//! # Usage
//!
//! ```
//! use marker_dom::Document;
//! use marker_scene::animation::{Animator, Timeline, TimelineEngine, TimelineEvent};
//!
//! let mut doc = Document::new();
//! let mut engine = TimelineEngine::new();
//! let id = engine.create_timeline(Timeline::new());
//! engine.play(id);
//! engine.advance(&mut doc, 16.0);
//!
//! let events = engine.drain_events();
//! assert_eq!(
//!     events,
//!     vec![TimelineEvent::Played { timeline: id }, TimelineEvent::Completed { timeline: id }]
//! );
//! ```

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::types::TimelineId;

/// Event emitted when a timeline changes state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimelineEvent {
    /// The timeline left the paused state.
    Played { timeline: TimelineId },
    /// Every tween reached its end value.
    Completed { timeline: TimelineId },
    /// The timeline was killed before or after finishing.
    Killed { timeline: TimelineId },
}

impl TimelineEvent {
    pub fn timeline(&self) -> TimelineId {
        match self {
            Self::Played { timeline } | Self::Completed { timeline } | Self::Killed { timeline } => {
                *timeline
            }
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// Queue for collecting timeline events during update cycles.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<TimelineEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: TimelineEvent) {
        self.events.push_back(event);
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn pop(&mut self) -> Option<TimelineEvent> {
        self.events.pop_front()
    }

    /// Drain all events from the queue, returning an iterator.
    pub fn drain(&mut self) -> impl Iterator<Item = TimelineEvent> + '_ {
        self.events.drain(..)
    }

    /// Events concerning one timeline, oldest first.
    pub fn events_for(&self, timeline: TimelineId) -> Vec<&TimelineEvent> {
        self.events
            .iter()
            .filter(|e| e.timeline() == timeline)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_accessors() {
        let event = TimelineEvent::Completed {
            timeline: TimelineId(7),
        };
        assert_eq!(event.timeline(), TimelineId(7));
        assert!(event.is_completed());
        assert!(!TimelineEvent::Killed {
            timeline: TimelineId(7)
        }
        .is_completed());
    }

    #[test]
    fn test_queue_order_and_filter() {
        let mut queue = EventQueue::new();
        queue.push(TimelineEvent::Played {
            timeline: TimelineId(1),
        });
        queue.push(TimelineEvent::Played {
            timeline: TimelineId(2),
        });
        queue.push(TimelineEvent::Killed {
            timeline: TimelineId(1),
        });

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.events_for(TimelineId(1)).len(), 2);
        assert_eq!(
            queue.pop(),
            Some(TimelineEvent::Played {
                timeline: TimelineId(1)
            })
        );
        assert_eq!(queue.drain().count(), 2);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_serializes_with_type_tag() {
        let json = serde_json::to_string(&TimelineEvent::Played {
            timeline: TimelineId(3),
        })
        .unwrap();
        assert_eq!(json, r#"{"type":"played","timeline":3}"#);
    }
}
