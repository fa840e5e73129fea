//! Startup gate.
//!
//! The reveal can only start once the document is parsed, fonts are loaded
//! (line breaks depend on them) and the host can supply the collaborators.
//! [`Bootstrap::poll`] checks those conditions in that order at a fixed
//! interval and gives up with [`BootstrapError::DependenciesUnavailable`]
//! once the configured timeout has elapsed.

use std::fmt;

use marker_config::MarkerConfig;
use marker_dom::Document;
use serde::Serialize;
use tracing::{info, trace, warn};

use crate::reveal::{Collaborators, MotionPreference, Reveal};

/// Environment the reveal starts in.
pub trait BootstrapHost {
    fn document_ready(&self) -> bool;

    fn fonts_ready(&self) -> bool;

    /// Queried once, when every other condition holds.
    fn prefers_reduced_motion(&self) -> bool;

    /// Hand over the collaborators, or `None` while they are unavailable.
    fn collaborators(&mut self) -> Option<Collaborators>;
}

/// Readiness condition the gate is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BootstrapPhase {
    Document,
    Fonts,
    Collaborators,
}

impl fmt::Display for BootstrapPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Document => "document",
            Self::Fonts => "fonts",
            Self::Collaborators => "collaborators",
        })
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BootstrapError {
    #[error("reveal dependencies unavailable: {phase} not ready after {waited_ms} ms")]
    DependenciesUnavailable {
        phase: BootstrapPhase,
        waited_ms: u64,
    },
}

pub enum BootstrapStatus {
    /// Still waiting on the given condition.
    Waiting(BootstrapPhase),
    /// Started on this poll. Returned exactly once.
    Ready(Box<Reveal>),
    /// Started on an earlier poll.
    Finished,
}

impl fmt::Debug for BootstrapStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting(phase) => f.debug_tuple("Waiting").field(phase).finish(),
            Self::Ready(reveal) => f.debug_tuple("Ready").field(reveal).finish(),
            Self::Finished => f.write_str("Finished"),
        }
    }
}

#[derive(Debug)]
enum GateState {
    Waiting(BootstrapPhase),
    Started,
    Failed(BootstrapError),
}

/// Bounded readiness wait that starts the reveal exactly once.
#[derive(Debug)]
pub struct Bootstrap {
    config: MarkerConfig,
    elapsed_ms: f64,
    since_check_ms: Option<f64>,
    state: GateState,
}

impl Bootstrap {
    pub fn new(config: MarkerConfig) -> Self {
        Self {
            config,
            elapsed_ms: 0.0,
            since_check_ms: None,
            state: GateState::Waiting(BootstrapPhase::Document),
        }
    }

    /// Total time spent waiting, in milliseconds.
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    /// Account for `delta_ms` of elapsed time and, when a check is due,
    /// test readiness.
    ///
    /// The first poll checks immediately; later checks happen every
    /// `poll_interval_ms`. After a timeout the same error is returned on
    /// every poll.
    pub fn poll(
        &mut self,
        host: &mut dyn BootstrapHost,
        doc: &mut Document,
        delta_ms: f64,
    ) -> Result<BootstrapStatus, BootstrapError> {
        let waiting = match &self.state {
            GateState::Started => return Ok(BootstrapStatus::Finished),
            GateState::Failed(error) => return Err(error.clone()),
            GateState::Waiting(phase) => *phase,
        };

        let delta_ms = if delta_ms.is_finite() { delta_ms.max(0.0) } else { 0.0 };
        self.elapsed_ms += delta_ms;
        let timeout_ms = self.config.bootstrap.timeout_ms as f64;
        let interval_ms = self.config.bootstrap.poll_interval_ms as f64;

        let due = match self.since_check_ms.as_mut() {
            None => true,
            Some(since) => {
                *since += delta_ms;
                *since >= interval_ms || self.elapsed_ms >= timeout_ms
            }
        };
        if !due {
            return Ok(BootstrapStatus::Waiting(waiting));
        }
        self.since_check_ms = Some(0.0);

        let phase = if !host.document_ready() {
            BootstrapPhase::Document
        } else if !host.fonts_ready() {
            BootstrapPhase::Fonts
        } else {
            match host.collaborators() {
                Some(collaborators) => return Ok(self.start(host, doc, collaborators)),
                None => BootstrapPhase::Collaborators,
            }
        };

        if self.elapsed_ms >= timeout_ms {
            let error = BootstrapError::DependenciesUnavailable {
                phase,
                waited_ms: self.elapsed_ms as u64,
            };
            warn!(%error, "giving up on reveal bootstrap");
            self.state = GateState::Failed(error.clone());
            return Err(error);
        }

        trace!(%phase, elapsed_ms = self.elapsed_ms, "bootstrap waiting");
        self.state = GateState::Waiting(phase);
        Ok(BootstrapStatus::Waiting(phase))
    }

    fn start(
        &mut self,
        host: &dyn BootstrapHost,
        doc: &mut Document,
        collaborators: Collaborators,
    ) -> BootstrapStatus {
        let reduced = self
            .config
            .bootstrap
            .reduced_motion
            .unwrap_or_else(|| host.prefers_reduced_motion());
        let preference = MotionPreference::from_reduced(reduced);

        let mut reveal = Reveal::new(self.config.clone(), collaborators);
        let targets = reveal.start(doc, preference);
        info!(
            targets,
            ?preference,
            elapsed_ms = self.elapsed_ms,
            "highlight reveal started"
        );
        self.state = GateState::Started;
        BootstrapStatus::Ready(Box::new(reveal))
    }
}
