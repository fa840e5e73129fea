//! Line segmentation of target elements.
//!
//! A [`LineSplitter`] replaces an element's content with one wrapper element
//! per visual line and reports each (re)segmentation through [`poll`]. A
//! segmentation may recur for the same handle, e.g. after the available
//! width changes, and every report carries the complete new set of lines.
//!
//! [`poll`]: LineSplitter::poll

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use marker_dom::{Document, ElementId};
use marker_text::{collapse_whitespace, wrap_text};
use tracing::{debug, trace};

/// Handle of one split request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SplitHandle(pub u64);

impl SplitHandle {
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for SplitHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Completion notice for one segmentation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segmentation {
    pub handle: SplitHandle,
    pub target: ElementId,
    /// Line wrappers in visual order.
    pub lines: Vec<ElementId>,
}

/// Line-splitting service used by the reveal.
pub trait LineSplitter {
    /// Request that `target` be split into lines whose wrappers carry
    /// `lines_class`. The segmentation is reported by a later [`poll`].
    ///
    /// [`poll`]: LineSplitter::poll
    fn split(&mut self, target: ElementId, lines_class: &str) -> SplitHandle;

    /// Perform pending (re)segmentations and report them.
    fn poll(&mut self, doc: &mut Document) -> Vec<Segmentation>;

    /// Restore the original content and forget the handle. Returns whether
    /// the handle was known.
    fn revert(&mut self, doc: &mut Document, handle: SplitHandle) -> bool;

    /// Schedule every active split for re-segmentation, e.g. after a
    /// layout change.
    fn invalidate(&mut self);

    /// Number of handles not yet reverted.
    fn active_splits(&self) -> usize;
}

struct Registration {
    target: ElementId,
    lines_class: String,
    /// Original children, saved on the first segmentation.
    original: Option<Vec<ElementId>>,
    lines: Vec<ElementId>,
    pending: bool,
}

/// [`LineSplitter`] that wraps text at a fixed column width.
///
/// Inline markup inside a target is flattened into plain text lines while
/// split; [`revert`](LineSplitter::revert) puts the original nodes back.
#[derive(Default)]
pub struct ColumnSplitter {
    columns: usize,
    registrations: BTreeMap<SplitHandle, Registration>,
}

impl std::fmt::Debug for ColumnSplitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColumnSplitter")
            .field("columns", &self.columns)
            .field("active", &self.registrations.len())
            .finish()
    }
}

impl ColumnSplitter {
    pub fn new(columns: usize) -> Self {
        Self {
            columns: columns.max(1),
            registrations: BTreeMap::new(),
        }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Change the wrap width. Every split element is segmented again on the
    /// next poll.
    pub fn set_columns(&mut self, columns: usize) {
        let columns = columns.max(1);
        if columns == self.columns {
            return;
        }
        self.columns = columns;
        self.invalidate();
    }

    /// Lines currently produced for `handle`.
    pub fn lines(&self, handle: SplitHandle) -> Option<&[ElementId]> {
        self.registrations
            .get(&handle)
            .map(|r| r.lines.as_slice())
    }

    fn segment(&self, doc: &mut Document, registration: &mut Registration) {
        for line in registration.lines.drain(..) {
            doc.remove(line);
        }
        let original = match &registration.original {
            Some(saved) => saved.clone(),
            None => {
                let saved = doc.take_children(registration.target);
                registration.original = Some(saved.clone());
                saved
            }
        };

        let text: String = original.iter().map(|node| doc.text_content(*node)).collect();
        let text = collapse_whitespace(&text);
        for wrapped in wrap_text(&text, self.columns) {
            let line = doc.create_element("div");
            doc.add_class(line, &registration.lines_class);
            doc.append_text(line, &wrapped.text);
            doc.append_child(registration.target, line);
            registration.lines.push(line);
        }
    }
}

impl LineSplitter for ColumnSplitter {
    fn split(&mut self, target: ElementId, lines_class: &str) -> SplitHandle {
        let handle = SplitHandle::new();
        trace!(split = handle.0, %target, "split requested");
        self.registrations.insert(
            handle,
            Registration {
                target,
                lines_class: lines_class.to_string(),
                original: None,
                lines: Vec::new(),
                pending: true,
            },
        );
        handle
    }

    fn poll(&mut self, doc: &mut Document) -> Vec<Segmentation> {
        let pending: Vec<SplitHandle> = self
            .registrations
            .iter()
            .filter(|(_, r)| r.pending && doc.is_connected(r.target))
            .map(|(handle, _)| *handle)
            .collect();

        let mut done = Vec::with_capacity(pending.len());
        for handle in pending {
            let Some(mut registration) = self.registrations.remove(&handle) else {
                continue;
            };
            self.segment(doc, &mut registration);
            registration.pending = false;
            debug!(
                split = handle.0,
                target = %registration.target,
                lines = registration.lines.len(),
                columns = self.columns,
                "segmented"
            );
            done.push(Segmentation {
                handle,
                target: registration.target,
                lines: registration.lines.clone(),
            });
            self.registrations.insert(handle, registration);
        }
        done
    }

    fn revert(&mut self, doc: &mut Document, handle: SplitHandle) -> bool {
        let Some(registration) = self.registrations.remove(&handle) else {
            return false;
        };
        for line in registration.lines {
            doc.remove(line);
        }
        if let Some(original) = registration.original {
            for node in original {
                doc.append_child(registration.target, node);
            }
        }
        trace!(split = handle.0, "split reverted");
        true
    }

    fn invalidate(&mut self) {
        for registration in self.registrations.values_mut() {
            registration.pending = true;
        }
    }

    fn active_splits(&self) -> usize {
        self.registrations.len()
    }
}
