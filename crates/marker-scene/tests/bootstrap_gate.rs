use anyhow::{Context, Result, bail};
use marker_config::MarkerConfig;
use marker_dom::{Document, document_from_html};
use marker_scene::{
    Bootstrap, BootstrapError, BootstrapHost, BootstrapPhase, BootstrapStatus, Collaborators,
    Reveal, RevealMode, TargetPhase, Viewport,
};

/// Host whose fonts finish loading after a number of checks.
struct PageHost {
    font_checks_left: std::cell::Cell<u32>,
    reduced: bool,
    collaborators_ready: bool,
}

impl PageHost {
    fn new(font_checks: u32) -> Self {
        Self {
            font_checks_left: std::cell::Cell::new(font_checks),
            reduced: false,
            collaborators_ready: true,
        }
    }
}

impl BootstrapHost for PageHost {
    fn document_ready(&self) -> bool {
        true
    }

    fn fonts_ready(&self) -> bool {
        let left = self.font_checks_left.get();
        if left == 0 {
            return true;
        }
        self.font_checks_left.set(left - 1);
        false
    }

    fn prefers_reduced_motion(&self) -> bool {
        self.reduced
    }

    fn collaborators(&mut self) -> Option<Collaborators> {
        self.collaborators_ready
            .then(|| Collaborators::bundled(40))
    }
}

fn page() -> Result<Document> {
    Ok(document_from_html(
        r#"<html><body>
            <h2 data-highlight-marker-reveal>Heading</h2>
            <p data-highlight-marker-reveal data-marker-theme="white">Body copy</p>
        </body></html>"#,
    )?)
}

fn run_until_ready(gate: &mut Bootstrap, host: &mut PageHost, doc: &mut Document) -> Result<Reveal> {
    for _ in 0..1000 {
        match gate.poll(host, doc, 16.0)? {
            BootstrapStatus::Ready(reveal) => return Ok(*reveal),
            BootstrapStatus::Waiting(_) => continue,
            BootstrapStatus::Finished => bail!("finished without handing out the reveal"),
        }
    }
    bail!("bootstrap never resolved")
}

#[test]
fn starts_after_fonts_load() -> Result<()> {
    let mut doc = page()?;
    let mut host = PageHost::new(3);
    let mut gate = Bootstrap::new(MarkerConfig::default());

    assert!(matches!(
        gate.poll(&mut host, &mut doc, 0.0)?,
        BootstrapStatus::Waiting(BootstrapPhase::Fonts)
    ));

    let mut reveal = run_until_ready(&mut gate, &mut host, &mut doc)?;
    assert_eq!(reveal.mode(), RevealMode::Animated);
    assert!(matches!(
        gate.poll(&mut host, &mut doc, 16.0)?,
        BootstrapStatus::Finished
    ));

    let targets = reveal.targets(&doc);
    assert_eq!(targets.len(), 2);
    for target in &targets {
        assert_eq!(reveal.phase(*target), TargetPhase::Building);
    }

    reveal.frame(&mut doc, Viewport::new(0.0, 800.0), 16.0);
    for target in &targets {
        assert_eq!(reveal.phase(*target), TargetPhase::Built);
    }
    let white = targets[1];
    let bar = reveal
        .instance(white)
        .and_then(|i| i.build.as_ref())
        .and_then(|b| b.bars.first().copied())
        .context("no bar built")?;
    assert_eq!(doc.style(bar, "background-color"), Some("#FFFFFF"));
    Ok(())
}

#[test]
fn reduced_motion_host_gets_an_inert_reveal() -> Result<()> {
    let mut doc = page()?;
    let mut host = PageHost::new(0);
    host.reduced = true;
    let mut gate = Bootstrap::new(MarkerConfig::default());

    let mut reveal = run_until_ready(&mut gate, &mut host, &mut doc)?;
    assert_eq!(reveal.mode(), RevealMode::ReducedMotion);
    reveal.frame(&mut doc, Viewport::new(0.0, 800.0), 16.0);

    for target in reveal.targets(&doc) {
        assert_eq!(doc.style(target, "opacity"), Some("1"));
        assert_eq!(reveal.phase(target), TargetPhase::Empty);
    }
    assert!(doc.elements_with_class(doc.body(), "highlight-marker-bar").is_empty());
    Ok(())
}

#[test]
fn missing_collaborators_time_out() -> Result<()> {
    let mut doc = page()?;
    let mut host = PageHost::new(0);
    host.collaborators_ready = false;
    let mut config = MarkerConfig::default();
    config.bootstrap.timeout_ms = 500;
    let mut gate = Bootstrap::new(config);

    let error = loop {
        match gate.poll(&mut host, &mut doc, 50.0) {
            Ok(BootstrapStatus::Waiting(_)) => continue,
            Ok(other) => bail!("unexpected status {other:?}"),
            Err(error) => break error,
        }
    };
    assert_eq!(
        error,
        BootstrapError::DependenciesUnavailable {
            phase: BootstrapPhase::Collaborators,
            waited_ms: 500,
        }
    );
    // targets were never touched
    for target in doc.elements_with_attribute("data-highlight-marker-reveal") {
        assert_eq!(doc.style(target, "opacity"), None);
    }
    Ok(())
}
