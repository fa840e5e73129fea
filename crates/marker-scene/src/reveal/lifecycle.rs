use marker_dom::{Document, ElementId};
use tracing::debug;

use super::orchestrator::{Reveal, teardown_build};

impl Reveal {
    /// Fully tear down the instance of `target`: kill its timeline, cancel
    /// its scroll binding, revert the split and remove every bar under it.
    ///
    /// Returns `false` (and does nothing) when the target has no instance.
    pub fn cleanup(&mut self, doc: &mut Document, target: ElementId) -> bool {
        let Some(instance) = self.instances.remove(&target) else {
            return false;
        };
        if let Some(build) = instance.build {
            teardown_build(doc, target, build, &mut self.collaborators, &self.bars);
        }
        self.collaborators.splitter.revert(doc, instance.split);
        let stray = self.bars.remove_all(doc, target);
        debug!(%target, stray_bars = stray, "reveal cleaned up");
        true
    }

    /// Tear down every instance. Returns how many there were.
    pub fn cleanup_all(&mut self, doc: &mut Document) -> usize {
        let targets: Vec<ElementId> = self.instances.keys().copied().collect();
        for target in &targets {
            self.cleanup(doc, *target);
        }
        targets.len()
    }
}
