use marker_dom::{Document, ElementId};

use crate::animation::ScaleAxis;

/// Builds the covering bars placed inside each line wrapper.
#[derive(Debug, Clone)]
pub struct BarFactory {
    class: String,
}

impl Default for BarFactory {
    fn default() -> Self {
        Self::new("highlight-marker-bar")
    }
}

impl BarFactory {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
        }
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    /// Create a detached bar that fully covers its container.
    pub fn create(
        &self,
        doc: &mut Document,
        color: &str,
        origin: &str,
        axis: ScaleAxis,
    ) -> ElementId {
        let bar = doc.create_element("div");
        doc.add_class(bar, &self.class);
        doc.set_style(bar, "background-color", color);
        doc.set_style(bar, "transform-origin", origin);
        doc.set_style(bar, "transform", axis.transform(1.0));
        doc.set_style(bar, "position", "absolute");
        doc.set_style(bar, "inset", "0");
        doc.set_style(bar, "pointer-events", "none");
        bar
    }

    /// Remove every bar under `scope`. Returns how many were removed.
    pub fn remove_all(&self, doc: &mut Document, scope: ElementId) -> usize {
        let bars = doc.elements_with_class(scope, &self.class);
        for bar in &bars {
            doc.remove(*bar);
        }
        bars.len()
    }
}
