//! Highlight reveal: directive resolution, bar creation, per-target build
//! orchestration, teardown and the reduced-motion gate.
//!
//! ```text
//! Reveal::start
//!   ├── reduced motion -> show every target, stay inert
//!   └── initialize -> cleanup_all -> request(target)*
//!
//! Reveal::frame
//!   ├── prune_detached
//!   ├── splitter.poll -> handle_segmentation -> bars + timeline + binding
//!   ├── scroll.update -> timeline.play
//!   └── animator.advance
//! ```

mod bar;
mod config;
mod gate;
mod lifecycle;
mod orchestrator;

pub use bar::BarFactory;
pub use config::{
    ConfigResolver, DEFAULT_BAR_DURATION, DEFAULT_STAGGER_MS, Direction, RevealConfig,
    StaggerStart, parse_stagger_ms, resolve_color,
};
pub use gate::MotionPreference;
pub use orchestrator::{
    Build, Collaborators, Reveal, RevealInstance, RevealMode, TargetPhase,
};
