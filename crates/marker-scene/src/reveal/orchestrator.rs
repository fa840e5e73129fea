use std::collections::HashMap;

use marker_config::MarkerConfig;
use marker_dom::{Document, ElementId};
use serde::Serialize;
use tracing::{debug, trace};

use super::bar::BarFactory;
use super::config::{ConfigResolver, RevealConfig};
use crate::animation::{Animator, Timeline, TimelineEngine, TimelineEvent, TimelineId, Tween};
use crate::scroll::{BindingId, ScrollObserver, ScrollTracker, Viewport};
use crate::splitter::{ColumnSplitter, LineSplitter, Segmentation, SplitHandle};

/// External services the reveal drives.
pub struct Collaborators {
    pub splitter: Box<dyn LineSplitter>,
    pub animator: Box<dyn Animator>,
    pub scroll: Box<dyn ScrollObserver>,
}

impl Collaborators {
    pub fn new(
        splitter: Box<dyn LineSplitter>,
        animator: Box<dyn Animator>,
        scroll: Box<dyn ScrollObserver>,
    ) -> Self {
        Self {
            splitter,
            animator,
            scroll,
        }
    }

    /// Column splitter, timeline engine and scroll tracker from this crate.
    pub fn bundled(columns: usize) -> Self {
        Self::new(
            Box::new(ColumnSplitter::new(columns)),
            Box::new(TimelineEngine::new()),
            Box::new(ScrollTracker::new()),
        )
    }
}

/// Where a target is in its build cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetPhase {
    /// No instance.
    Empty,
    /// Split requested, waiting for the segmentation.
    Building,
    /// Bars, timeline and scroll binding exist.
    Built,
}

/// Everything created by one segmentation.
#[derive(Debug, Clone, PartialEq)]
pub struct Build {
    pub timeline: TimelineId,
    pub binding: BindingId,
    pub lines: Vec<ElementId>,
    pub bars: Vec<ElementId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RevealInstance {
    pub split: SplitHandle,
    pub config: RevealConfig,
    pub build: Option<Build>,
}

impl RevealInstance {
    pub fn phase(&self) -> TargetPhase {
        if self.build.is_some() {
            TargetPhase::Built
        } else {
            TargetPhase::Building
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RevealMode {
    Animated,
    /// Targets are shown as-is and nothing is built.
    ReducedMotion,
}

/// Drives the highlight reveal for every target in a document.
///
/// Instances are keyed by element id; elements never point back at their
/// instance. Hosts call [`Reveal::frame`] once per frame after startup.
pub struct Reveal {
    pub(crate) resolver: ConfigResolver,
    pub(crate) bars: BarFactory,
    pub(crate) collaborators: Collaborators,
    pub(crate) instances: HashMap<ElementId, RevealInstance>,
    pub(crate) mode: RevealMode,
}

impl std::fmt::Debug for Reveal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reveal")
            .field("mode", &self.mode)
            .field("instances", &self.instances.len())
            .finish()
    }
}

impl Reveal {
    pub fn new(config: MarkerConfig, collaborators: Collaborators) -> Self {
        let bars = BarFactory::new(config.markup.bar_class.clone());
        Self {
            resolver: ConfigResolver::new(config),
            bars,
            collaborators,
            instances: HashMap::new(),
            mode: RevealMode::Animated,
        }
    }

    pub fn mode(&self) -> RevealMode {
        self.mode
    }

    pub fn config(&self) -> &MarkerConfig {
        self.resolver.config()
    }

    /// Connected elements carrying the presence directive, in document order.
    pub fn targets(&self, doc: &Document) -> Vec<ElementId> {
        doc.elements_with_attribute(&self.config().markup.presence_attribute)
    }

    /// Tear down everything and request a fresh build for every target.
    ///
    /// Safe to call repeatedly: each target ends up with exactly one
    /// instance.
    pub fn initialize(&mut self, doc: &mut Document) -> usize {
        if self.mode == RevealMode::ReducedMotion {
            return self.show_all(doc);
        }
        self.cleanup_all(doc);
        let targets = self.targets(doc);
        for target in &targets {
            self.request(doc, *target);
        }
        debug!(targets = targets.len(), "reveal initialized");
        targets.len()
    }

    /// Hide `target` and ask the splitter to segment it. The build happens
    /// when the segmentation is reported.
    pub fn request(&mut self, doc: &mut Document, target: ElementId) {
        if self.mode == RevealMode::ReducedMotion {
            return;
        }
        self.cleanup(doc, target);

        let config = self.resolver.resolve(doc, target);
        self.collaborators
            .animator
            .set_auto_alpha(doc, target, false);
        let line_class = &self.resolver.config().markup.line_class;
        let split = self.collaborators.splitter.split(target, line_class);
        debug!(
            %target,
            split = split.0,
            direction = %config.direction,
            color = %config.color,
            "split requested"
        );
        self.instances.insert(
            target,
            RevealInstance {
                split,
                config,
                build: None,
            },
        );
    }

    /// Advance one frame: drop instances of removed elements, build from
    /// new segmentations, fire crossed scroll bindings, then advance the
    /// animation engine.
    ///
    /// Returns the timeline events recorded during the frame, including
    /// kills from teardowns since the previous frame.
    pub fn frame(
        &mut self,
        doc: &mut Document,
        viewport: Viewport,
        delta_ms: f64,
    ) -> Vec<TimelineEvent> {
        if self.mode == RevealMode::ReducedMotion {
            return Vec::new();
        }
        self.prune_detached(doc);
        for segmentation in self.collaborators.splitter.poll(doc) {
            self.handle_segmentation(doc, segmentation);
        }
        let Collaborators {
            animator, scroll, ..
        } = &mut self.collaborators;
        let fired = scroll.update(doc, viewport, animator.as_mut());
        if fired > 0 {
            trace!(fired, scroll_top = viewport.scroll_top, "scroll bindings fired");
        }
        animator.advance(doc, delta_ms);
        animator.drain_events()
    }

    /// Rebuild a target from a (re)segmentation. Stale handles are ignored.
    pub fn handle_segmentation(&mut self, doc: &mut Document, segmentation: Segmentation) -> bool {
        let Segmentation {
            handle,
            target,
            lines,
        } = segmentation;
        let Self {
            instances,
            collaborators,
            bars,
            ..
        } = self;
        let Some(instance) = instances.get_mut(&target) else {
            trace!(%target, split = handle.0, "segmentation for unknown target");
            return false;
        };
        if instance.split != handle {
            trace!(%target, split = handle.0, "stale segmentation");
            return false;
        }

        // A re-split keeps the split itself and replaces the build.
        if let Some(previous) = instance.build.take() {
            teardown_build(doc, target, previous, collaborators, bars);
        }

        let config = &instance.config;
        let count = lines.len();
        let mut timeline = Timeline::new();
        let mut created = Vec::with_capacity(count);
        for (index, line) in lines.iter().enumerate() {
            collaborators.animator.set(
                doc,
                *line,
                &[("position", "relative"), ("overflow", "hidden")],
            );
            let bar = bars.create(doc, &config.color, config.transform_origin, config.scale_axis);
            doc.append_child(*line, bar);
            timeline.to(
                Tween::collapse(bar, config.scale_axis, config.bar_duration, config.bar_ease),
                config.line_offset(index, count),
            );
            created.push(bar);
        }
        let timeline = collaborators.animator.create_timeline(timeline);

        collaborators.animator.set_auto_alpha(doc, target, true);

        let binding = collaborators.scroll.subscribe(
            target,
            config.scroll_start,
            Box::new(move |animator: &mut dyn Animator| {
                animator.play(timeline);
            }),
        );
        debug!(%target, lines = count, timeline = timeline.0, binding = binding.0, "reveal built");

        instance.build = Some(Build {
            timeline,
            binding,
            lines,
            bars: created,
        });
        true
    }

    /// Clean up instances whose element is no longer in the document.
    pub fn prune_detached(&mut self, doc: &mut Document) -> usize {
        let detached: Vec<ElementId> = self
            .instances
            .keys()
            .filter(|id| !doc.is_connected(**id))
            .copied()
            .collect();
        for target in &detached {
            trace!(%target, "pruning detached target");
            self.cleanup(doc, *target);
        }
        detached.len()
    }

    pub fn phase(&self, target: ElementId) -> TargetPhase {
        self.instances
            .get(&target)
            .map_or(TargetPhase::Empty, RevealInstance::phase)
    }

    pub fn instance(&self, target: ElementId) -> Option<&RevealInstance> {
        self.instances.get(&target)
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    pub fn animator(&self) -> &dyn Animator {
        self.collaborators.animator.as_ref()
    }

    pub fn scroll(&self) -> &dyn ScrollObserver {
        self.collaborators.scroll.as_ref()
    }

    pub fn splitter(&self) -> &dyn LineSplitter {
        self.collaborators.splitter.as_ref()
    }

    pub fn splitter_mut(&mut self) -> &mut dyn LineSplitter {
        self.collaborators.splitter.as_mut()
    }
}

/// Kill the timeline, cancel the binding and remove the bars of a build.
pub(crate) fn teardown_build(
    doc: &mut Document,
    target: ElementId,
    build: Build,
    collaborators: &mut Collaborators,
    bars: &BarFactory,
) {
    collaborators.animator.kill(build.timeline);
    collaborators.scroll.cancel(build.binding);
    for bar in &build.bars {
        doc.remove(*bar);
    }
    bars.remove_all(doc, target);
}
