use std::fmt;

use marker_dom::{Document, ElementId};
use marker_scene::animation::{TimelineEvent, TimelineState};
use marker_scene::{Direction, Reveal, RevealMode, TargetPhase};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Report {
    pub mode: Option<RevealMode>,
    pub frames: usize,
    pub scroll_top: f64,
    pub timelines_played: usize,
    pub timelines_completed: usize,
    pub timelines_killed: usize,
    pub targets: Vec<TargetReport>,
}

#[derive(Debug, Serialize)]
pub struct TargetReport {
    pub index: usize,
    pub tag: String,
    pub text: String,
    #[serde(skip)]
    id: ElementId,
    pub phase: Option<TargetPhase>,
    pub direction: Option<Direction>,
    pub color: Option<String>,
    pub lines: usize,
    pub bars: usize,
    pub timeline: Option<TimelineState>,
    pub binding_fired: bool,
    pub opacity: Option<String>,
}

impl Report {
    /// Snapshot the targets before the reveal touches them.
    pub fn new(doc: &Document, targets: &[ElementId]) -> Self {
        let targets = targets
            .iter()
            .enumerate()
            .map(|(index, id)| TargetReport {
                index,
                tag: doc.tag(*id).unwrap_or_default().to_string(),
                text: marker_text::collapse_whitespace(&doc.text_content(*id)),
                id: *id,
                phase: None,
                direction: None,
                color: None,
                lines: 0,
                bars: 0,
                timeline: None,
                binding_fired: false,
                opacity: None,
            })
            .collect();
        Self {
            mode: None,
            frames: 0,
            scroll_top: 0.0,
            timelines_played: 0,
            timelines_completed: 0,
            timelines_killed: 0,
            targets,
        }
    }

    /// Tally the timeline events drained from one frame.
    pub fn record_events(&mut self, events: &[TimelineEvent]) {
        for event in events {
            match event {
                TimelineEvent::Played { .. } => self.timelines_played += 1,
                TimelineEvent::Completed { .. } => self.timelines_completed += 1,
                TimelineEvent::Killed { .. } => self.timelines_killed += 1,
            }
        }
    }

    pub fn finish(&mut self, doc: &Document, reveal: &Reveal, frames: usize, scroll_top: f64) {
        let config = reveal.config();
        self.mode = Some(reveal.mode());
        self.frames = frames;
        self.scroll_top = scroll_top;
        for target in &mut self.targets {
            target.phase = Some(reveal.phase(target.id));
            target.lines = doc
                .elements_with_class(target.id, &config.markup.line_class)
                .len();
            target.bars = doc
                .elements_with_class(target.id, &config.markup.bar_class)
                .len();
            target.opacity = doc.style(target.id, "opacity").map(str::to_string);
            let Some(instance) = reveal.instance(target.id) else {
                continue;
            };
            target.direction = Some(instance.config.direction);
            target.color = Some(instance.config.color.clone());
            if let Some(build) = &instance.build {
                target.timeline = reveal
                    .animator()
                    .timeline(build.timeline)
                    .map(|t| t.state());
                target.binding_fired = reveal.scroll().has_fired(build.binding);
            }
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "mode: {:?}  frames: {}  scroll_top: {}",
            self.mode, self.frames, self.scroll_top
        )?;
        writeln!(
            f,
            "timelines: played={} completed={} killed={}",
            self.timelines_played, self.timelines_completed, self.timelines_killed
        )?;
        for t in &self.targets {
            writeln!(
                f,
                "#{} <{}> {:?} lines={} bars={} timeline={:?} fired={} color={}",
                t.index,
                t.tag,
                t.phase,
                t.lines,
                t.bars,
                t.timeline,
                t.binding_fired,
                t.color.as_deref().unwrap_or("-"),
            )?;
            writeln!(f, "    {}", t.text)?;
        }
        Ok(())
    }
}
