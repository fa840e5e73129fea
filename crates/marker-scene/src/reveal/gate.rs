use marker_dom::Document;
use serde::Serialize;
use tracing::info;

use super::orchestrator::{Reveal, RevealMode};

/// User motion preference, read once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionPreference {
    #[default]
    Full,
    Reduced,
}

impl MotionPreference {
    pub fn from_reduced(reduced: bool) -> Self {
        if reduced { Self::Reduced } else { Self::Full }
    }
}

impl Reveal {
    /// Start the reveal under `preference`.
    ///
    /// With reduced motion every target is made visible and nothing else
    /// happens, now or on later frames. Otherwise this is
    /// [`initialize`](Reveal::initialize). Returns the number of targets.
    pub fn start(&mut self, doc: &mut Document, preference: MotionPreference) -> usize {
        match preference {
            MotionPreference::Reduced => {
                self.cleanup_all(doc);
                self.mode = RevealMode::ReducedMotion;
                let shown = self.show_all(doc);
                info!(targets = shown, "reduced motion, targets shown without animation");
                shown
            }
            MotionPreference::Full => {
                self.mode = RevealMode::Animated;
                self.initialize(doc)
            }
        }
    }

    pub(crate) fn show_all(&mut self, doc: &mut Document) -> usize {
        let targets = self.targets(doc);
        for target in &targets {
            self.collaborators
                .animator
                .set_auto_alpha(doc, *target, true);
        }
        targets.len()
    }
}
