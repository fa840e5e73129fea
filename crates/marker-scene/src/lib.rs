//! marker-scene: the highlight marker reveal runtime.
//!
//! Blocks of text marked with `data-highlight-marker-reveal` are split into
//! lines, each line is covered by a bar, and the bars collapse in a staggered
//! timeline the first time the block scrolls into view.
//!
//! The runtime talks to three collaborators through traits so hosts can
//! supply their own:
//! - [`LineSplitter`] segments elements into line wrappers
//! - [`Animator`] sets styles and plays timelines
//! - [`ScrollObserver`] fires one-shot bindings on scroll
//!
//! [`Bootstrap`] waits for the host to be ready and then hands back a
//! [`Reveal`], which the host drives with [`Reveal::frame`].

pub mod animation;
pub mod bootstrap;
pub mod reveal;
pub mod scroll;
pub mod splitter;

pub use animation::{Animator, EasingFunction, ScaleAxis, Timeline, TimelineEngine, TimelineState};
pub use bootstrap::{Bootstrap, BootstrapError, BootstrapHost, BootstrapPhase, BootstrapStatus};
pub use reveal::{
    BarFactory, Collaborators, ConfigResolver, Direction, MotionPreference, Reveal, RevealConfig,
    RevealMode, StaggerStart, TargetPhase,
};
pub use scroll::{Anchor, BindingId, Edge, ScrollObserver, ScrollStart, ScrollTracker, Viewport};
pub use splitter::{ColumnSplitter, LineSplitter, Segmentation, SplitHandle};
