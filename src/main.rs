use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use marker_config::MarkerConfig;
use marker_dom::{Document, ElementId, Rect, document_from_file};
use marker_scene::{
    Bootstrap, BootstrapHost, BootstrapStatus, Collaborators, Reveal, Viewport,
};
use tracing::{debug, info};
use tracing_subscriber::prelude::*;

mod report;

use report::Report;

/// Headless run of the highlight marker reveal over an HTML page.
#[derive(Parser, Debug)]
#[command(name = "marker", version, about)]
struct Cli {
    /// HTML page to load
    page: PathBuf,

    /// Configuration file (defaults to ./marker.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Wrap width used to split text into lines
    #[arg(long, default_value_t = 40)]
    columns: usize,

    /// Viewport height in pixels
    #[arg(long, default_value_t = 800.0)]
    viewport_height: f64,

    /// Height of one text line in pixels
    #[arg(long, default_value_t = 24.0)]
    line_height: f64,

    /// Force the reduced-motion preference
    #[arg(long)]
    reduced_motion: bool,

    /// Scroll distance per simulated frame in pixels
    #[arg(long, default_value_t = 120.0)]
    scroll_step: f64,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

/// Simulated frame length.
const FRAME_MS: f64 = 16.0;
/// Vertical gap between laid-out targets, in viewport heights.
const TARGET_GAP: f64 = 0.5;

/// Host that is ready immediately and hands out the bundled collaborators.
struct HeadlessHost {
    columns: usize,
}

impl BootstrapHost for HeadlessHost {
    fn document_ready(&self) -> bool {
        true
    }

    fn fonts_ready(&self) -> bool {
        true
    }

    fn prefers_reduced_motion(&self) -> bool {
        false
    }

    fn collaborators(&mut self) -> Option<Collaborators> {
        Some(Collaborators::bundled(self.columns))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut config = match &cli.config {
        Some(path) => {
            let mut config = MarkerConfig::load_from_file(path)
                .with_context(|| format!("loading {}", path.display()))?;
            config.merge_with_env();
            config
        }
        None => MarkerConfig::load(),
    };
    if cli.reduced_motion {
        config.bootstrap.reduced_motion = Some(true);
    }

    let mut doc = document_from_file(&cli.page)?;
    let presence = config.markup.presence_attribute.clone();
    let targets = doc.elements_with_attribute(&presence);
    let page_height = layout_targets(&mut doc, &targets, &cli);
    info!(targets = targets.len(), page_height, "page loaded");

    let mut report = Report::new(&doc, &targets);
    let mut reveal = bootstrap(config, &cli, &mut doc)?;

    let max_scroll = (page_height - cli.viewport_height).max(0.0);
    let step = cli.scroll_step.max(1.0);
    let mut scroll_top = 0.0;
    let mut frames = 0usize;
    loop {
        let viewport = Viewport::new(scroll_top, cli.viewport_height);
        report.record_events(&reveal.frame(&mut doc, viewport, FRAME_MS));
        frames += 1;
        if scroll_top >= max_scroll {
            break;
        }
        scroll_top = (scroll_top + step).min(max_scroll);
    }

    // let the last timelines run out
    let settle_frames = (settle_ms(&reveal, &targets) / FRAME_MS).ceil() as usize;
    for _ in 0..settle_frames {
        let viewport = Viewport::new(scroll_top, cli.viewport_height);
        report.record_events(&reveal.frame(&mut doc, viewport, FRAME_MS));
        frames += 1;
    }
    debug!(frames, scroll_top, "simulation finished");

    report.finish(&doc, &reveal, frames, scroll_top);
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{report}");
    }
    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt};
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// Stack targets vertically, each as tall as its wrapped text. Returns the
/// page height.
fn layout_targets(doc: &mut Document, targets: &[ElementId], cli: &Cli) -> f64 {
    let gap = cli.viewport_height * TARGET_GAP;
    let width = cli.columns as f64 * cli.line_height / 2.0;
    let mut y = gap;
    for target in targets {
        let text = marker_text::collapse_whitespace(&doc.text_content(*target));
        let lines = marker_text::wrap_text(&text, cli.columns).len().max(1);
        let height = lines as f64 * cli.line_height;
        doc.set_rect(*target, Rect::new(0.0, y, width, height));
        y += height + gap;
    }
    y
}

fn bootstrap(config: MarkerConfig, cli: &Cli, doc: &mut Document) -> Result<Reveal> {
    let mut host = HeadlessHost {
        columns: cli.columns,
    };
    let mut gate = Bootstrap::new(config);
    let mut delta = 0.0;
    loop {
        match gate.poll(&mut host, doc, delta)? {
            BootstrapStatus::Ready(reveal) => return Ok(*reveal),
            BootstrapStatus::Waiting(phase) => debug!(%phase, "waiting"),
            BootstrapStatus::Finished => bail!("bootstrap finished without a reveal"),
        }
        delta = FRAME_MS;
    }
}

/// Longest remaining timeline duration among the targets, in milliseconds.
fn settle_ms(reveal: &Reveal, targets: &[ElementId]) -> f64 {
    targets
        .iter()
        .filter_map(|t| reveal.instance(*t)?.build.as_ref())
        .filter_map(|b| reveal.animator().timeline(b.timeline))
        .map(|t| (t.duration() - t.time()).max(0.0) * 1000.0)
        .fold(0.0, f64::max)
}
