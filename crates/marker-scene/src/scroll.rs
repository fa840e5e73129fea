//! One-shot scroll bindings.
//!
//! A binding watches a trigger element and fires its callback the first
//! time the element's anchor line passes the viewport's anchor line, e.g.
//! `"top 90%"` fires once the element's top edge is at or above the line 90%
//! down the viewport. Either edge may carry a relative pixel offset, as in
//! `"top bottom-=100px"`. Bindings fire at most once; cancelling is
//! idempotent and also releases the record of a fired binding.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use marker_dom::{Document, ElementId};
use tracing::{debug, trace};

use crate::animation::Animator;

/// A position along an element or the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Anchor {
    Top,
    Center,
    Bottom,
    /// Percentage of the height, measured from the top.
    Percent(f64),
    /// Pixel offset from the top.
    Pixels(f64),
}

impl Anchor {
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        match token {
            "top" => return Some(Self::Top),
            "center" => return Some(Self::Center),
            "bottom" => return Some(Self::Bottom),
            _ => {}
        }
        if let Some(pct) = token.strip_suffix('%') {
            return pct
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(Self::Percent);
        }
        let px = token.strip_suffix("px").unwrap_or(token);
        px.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Self::Pixels)
    }

    /// Distance from the top edge of a box of height `size`.
    pub fn offset(&self, size: f64) -> f64 {
        match self {
            Self::Top => 0.0,
            Self::Center => size / 2.0,
            Self::Bottom => size,
            Self::Percent(p) => size * p / 100.0,
            Self::Pixels(px) => *px,
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Top => f.write_str("top"),
            Self::Center => f.write_str("center"),
            Self::Bottom => f.write_str("bottom"),
            Self::Percent(p) => write!(f, "{p}%"),
            Self::Pixels(px) => write!(f, "{px}px"),
        }
    }
}

/// An anchor shifted by a relative pixel offset, written `bottom-=100px` or
/// `top+=50`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub anchor: Anchor,
    pub offset: f64,
}

impl Edge {
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        let Some(split) = token.find("+=").or_else(|| token.find("-=")) else {
            return Anchor::parse(token).map(Self::from);
        };
        let (base, relative) = (&token[..split], &token[split + 2..]);
        if base.is_empty() {
            return None;
        }
        let anchor = Anchor::parse(base)?;
        let magnitude = relative
            .strip_suffix("px")
            .unwrap_or(relative)
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())?;
        let offset = if token[split..].starts_with('-') {
            -magnitude
        } else {
            magnitude
        };
        Some(Self { anchor, offset })
    }

    /// Distance from the top edge of a box of height `size`.
    pub fn position(&self, size: f64) -> f64 {
        self.anchor.offset(size) + self.offset
    }
}

impl From<Anchor> for Edge {
    fn from(anchor: Anchor) -> Self {
        Self {
            anchor,
            offset: 0.0,
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.anchor)?;
        if self.offset > 0.0 {
            write!(f, "+={}px", self.offset)?;
        } else if self.offset < 0.0 {
            write!(f, "-={}px", -self.offset)?;
        }
        Ok(())
    }
}

/// `<element-edge> <viewport-edge>` threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollStart {
    pub element: Edge,
    pub viewport: Edge,
}

impl Default for ScrollStart {
    fn default() -> Self {
        Self {
            element: Anchor::Top.into(),
            viewport: Anchor::Percent(90.0).into(),
        }
    }
}

impl ScrollStart {
    /// Parse exactly two whitespace-separated edges.
    pub fn parse(spec: &str) -> Option<Self> {
        let mut parts = spec.split_whitespace();
        let element = Edge::parse(parts.next()?)?;
        let viewport = Edge::parse(parts.next()?)?;
        if parts.next().is_some() {
            return None;
        }
        Some(Self { element, viewport })
    }

    /// Whether an element occupying `rect_top..rect_top + rect_height` has
    /// crossed the threshold in `viewport`.
    pub fn is_crossed(&self, rect_top: f64, rect_height: f64, viewport: Viewport) -> bool {
        let element_line = rect_top + self.element.position(rect_height);
        let viewport_line = viewport.scroll_top + self.viewport.position(viewport.height);
        element_line <= viewport_line
    }
}

impl fmt::Display for ScrollStart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.element, self.viewport)
    }
}

/// Visible window of the page in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub scroll_top: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(scroll_top: f64, height: f64) -> Self {
        Self { scroll_top, height }
    }
}

/// Identifier of a scroll binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingId(pub u64);

impl BindingId {
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for BindingId {
    fn default() -> Self {
        Self::new()
    }
}

/// Callback run when a binding fires.
pub type EnterCallback = Box<dyn FnOnce(&mut dyn Animator)>;

/// Scroll-visibility observer used by the reveal.
pub trait ScrollObserver {
    /// Register a one-shot binding on `trigger`.
    fn subscribe(
        &mut self,
        trigger: ElementId,
        start: ScrollStart,
        on_enter: EnterCallback,
    ) -> BindingId;

    /// Drop a binding before it fires, or forget one that already fired.
    /// Returns whether it was still live.
    fn cancel(&mut self, id: BindingId) -> bool;

    /// Whether the binding is registered and has not fired.
    fn is_live(&self, id: BindingId) -> bool;

    fn has_fired(&self, id: BindingId) -> bool;

    /// Fire every live binding whose threshold is crossed in `viewport`.
    /// Returns the number of bindings fired.
    fn update(&mut self, doc: &Document, viewport: Viewport, animator: &mut dyn Animator)
    -> usize;

    fn live_bindings(&self) -> usize;
}

struct Binding {
    trigger: ElementId,
    start: ScrollStart,
    on_enter: EnterCallback,
}

/// Default [`ScrollObserver`] driven by explicit viewport updates.
#[derive(Default)]
pub struct ScrollTracker {
    bindings: BTreeMap<BindingId, Binding>,
    fired: HashSet<BindingId>,
}

impl fmt::Debug for ScrollTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollTracker")
            .field("live", &self.bindings.len())
            .field("fired", &self.fired.len())
            .finish()
    }
}

impl ScrollTracker {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScrollObserver for ScrollTracker {
    fn subscribe(
        &mut self,
        trigger: ElementId,
        start: ScrollStart,
        on_enter: EnterCallback,
    ) -> BindingId {
        let id = BindingId::new();
        debug!(binding = id.0, %trigger, %start, "scroll binding created");
        self.bindings.insert(
            id,
            Binding {
                trigger,
                start,
                on_enter,
            },
        );
        id
    }

    fn cancel(&mut self, id: BindingId) -> bool {
        self.fired.remove(&id);
        self.bindings.remove(&id).is_some()
    }

    fn is_live(&self, id: BindingId) -> bool {
        self.bindings.contains_key(&id)
    }

    fn has_fired(&self, id: BindingId) -> bool {
        self.fired.contains(&id)
    }

    fn update(
        &mut self,
        doc: &Document,
        viewport: Viewport,
        animator: &mut dyn Animator,
    ) -> usize {
        let crossed: Vec<BindingId> = self
            .bindings
            .iter()
            .filter(|(_, binding)| {
                if !doc.is_connected(binding.trigger) {
                    return false;
                }
                doc.rect(binding.trigger).is_some_and(|rect| {
                    binding.start.is_crossed(rect.y, rect.height, viewport)
                })
            })
            .map(|(id, _)| *id)
            .collect();

        for id in &crossed {
            if let Some(binding) = self.bindings.remove(id) {
                trace!(binding = id.0, trigger = %binding.trigger, "scroll binding fired");
                self.fired.insert(*id);
                (binding.on_enter)(animator);
            }
        }
        crossed.len()
    }

    fn live_bindings(&self) -> usize {
        self.bindings.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::TimelineEngine;
    use marker_dom::Rect;
    use std::cell::Cell;
    use std::rc::Rc;

    fn counter() -> (Rc<Cell<u32>>, EnterCallback) {
        let count = Rc::new(Cell::new(0));
        let seen = Rc::clone(&count);
        (count, Box::new(move |_: &mut dyn Animator| seen.set(seen.get() + 1)))
    }

    fn placed(doc: &mut Document, y: f64) -> ElementId {
        let el = doc.create_element("p");
        doc.append_child(doc.body(), el);
        doc.set_rect(el, Rect::new(0.0, y, 600.0, 40.0));
        el
    }

    #[test]
    fn parses_position_specs() {
        assert_eq!(ScrollStart::parse("top 90%"), Some(ScrollStart::default()));
        assert_eq!(
            ScrollStart::parse("center  bottom"),
            Some(ScrollStart {
                element: Anchor::Center.into(),
                viewport: Anchor::Bottom.into()
            })
        );
        assert_eq!(
            ScrollStart::parse("20px 100"),
            Some(ScrollStart {
                element: Anchor::Pixels(20.0).into(),
                viewport: Anchor::Pixels(100.0).into()
            })
        );
        assert_eq!(ScrollStart::parse("top"), None);
        assert_eq!(ScrollStart::parse("middle 50%"), None);
        assert_eq!(ScrollStart::parse("top 50% extra"), None);
        assert_eq!(ScrollStart::default().to_string(), "top 90%");
    }

    #[test]
    fn parses_relative_offsets() {
        let start = ScrollStart::parse("top bottom-=100px").unwrap();
        assert_eq!(start.element, Edge::from(Anchor::Top));
        assert_eq!(
            start.viewport,
            Edge {
                anchor: Anchor::Bottom,
                offset: -100.0
            }
        );
        assert_eq!(start.to_string(), "top bottom-=100px");

        let start = ScrollStart::parse("top+=50 80%").unwrap();
        assert_eq!(
            start.element,
            Edge {
                anchor: Anchor::Top,
                offset: 50.0
            }
        );
        assert_eq!(start.viewport, Edge::from(Anchor::Percent(80.0)));

        assert_eq!(ScrollStart::parse("+=50 80%"), None);
        assert_eq!(ScrollStart::parse("top bottom-=far"), None);
    }

    #[test]
    fn relative_offsets_shift_the_threshold() {
        let start = ScrollStart::parse("top bottom-=100px").unwrap();
        // viewport line at 0 + 1000 - 100
        assert!(!start.is_crossed(950.0, 40.0, Viewport::new(0.0, 1000.0)));
        assert!(start.is_crossed(900.0, 40.0, Viewport::new(0.0, 1000.0)));

        let start = ScrollStart::parse("top+=50 top").unwrap();
        assert!(!start.is_crossed(0.0, 40.0, Viewport::new(49.0, 1000.0)));
        assert!(start.is_crossed(0.0, 40.0, Viewport::new(50.0, 1000.0)));
    }

    #[test]
    fn fires_once_when_threshold_crossed() {
        let mut doc = Document::new();
        let el = placed(&mut doc, 1000.0);
        let mut engine = TimelineEngine::new();
        let mut tracker = ScrollTracker::new();
        let (count, callback) = counter();
        let id = tracker.subscribe(el, ScrollStart::default(), callback);

        // viewport line at 0 + 900
        assert_eq!(tracker.update(&doc, Viewport::new(0.0, 1000.0), &mut engine), 0);
        assert!(tracker.is_live(id));

        // viewport line at 200 + 900 >= 1000
        assert_eq!(tracker.update(&doc, Viewport::new(200.0, 1000.0), &mut engine), 1);
        assert_eq!(count.get(), 1);
        assert!(!tracker.is_live(id));
        assert!(tracker.has_fired(id));

        // leaving and re-entering never fires again
        tracker.update(&doc, Viewport::new(0.0, 1000.0), &mut engine);
        tracker.update(&doc, Viewport::new(500.0, 1000.0), &mut engine);
        assert_eq!(count.get(), 1);
        assert!(!tracker.cancel(id), "cancel after firing is a no-op");
    }

    #[test]
    fn cancelled_bindings_never_fire() {
        let mut doc = Document::new();
        let el = placed(&mut doc, 0.0);
        let mut engine = TimelineEngine::new();
        let mut tracker = ScrollTracker::new();
        let (count, callback) = counter();
        let id = tracker.subscribe(el, ScrollStart::default(), callback);

        assert!(tracker.cancel(id));
        assert!(!tracker.cancel(id));
        tracker.update(&doc, Viewport::new(0.0, 1000.0), &mut engine);
        assert_eq!(count.get(), 0);
        assert_eq!(tracker.live_bindings(), 0);
    }

    #[test]
    fn cancelling_fired_bindings_releases_them() {
        let mut doc = Document::new();
        let el = placed(&mut doc, 0.0);
        let mut engine = TimelineEngine::new();
        let mut tracker = ScrollTracker::new();

        for _ in 0..50 {
            let (_, callback) = counter();
            let id = tracker.subscribe(el, ScrollStart::default(), callback);
            assert_eq!(tracker.update(&doc, Viewport::new(0.0, 1000.0), &mut engine), 1);
            assert!(tracker.has_fired(id));

            assert!(!tracker.cancel(id));
            assert!(!tracker.has_fired(id));
        }
        assert!(tracker.fired.is_empty());
        assert_eq!(tracker.live_bindings(), 0);
    }

    #[test]
    fn detached_or_unplaced_triggers_wait() {
        let mut doc = Document::new();
        let unplaced = doc.create_element("p");
        doc.append_child(doc.body(), unplaced);
        let detached = placed(&mut doc, 0.0);
        doc.remove(detached);

        let mut engine = TimelineEngine::new();
        let mut tracker = ScrollTracker::new();
        let (count, a) = counter();
        let b: EnterCallback = {
            let count = Rc::clone(&count);
            Box::new(move |_: &mut dyn Animator| count.set(count.get() + 1))
        };
        tracker.subscribe(unplaced, ScrollStart::default(), a);
        tracker.subscribe(detached, ScrollStart::default(), b);

        assert_eq!(tracker.update(&doc, Viewport::new(0.0, 1000.0), &mut engine), 0);
        assert_eq!(count.get(), 0);
        assert_eq!(tracker.live_bindings(), 2);
    }
}
