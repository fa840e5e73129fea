use std::fs;

use anyhow::Result;
use marker_dom::{Rect, document_from_file, document_from_html};

#[test]
fn loads_document_from_file() -> Result<()> {
    let temp = tempfile::tempdir()?;
    let path = temp.path().join("page.html");
    fs::write(
        &path,
        r#"<html><body>
            <p data-highlight-marker-reveal data-marker-direction="up">First block</p>
            <p>Not a target</p>
            <p data-highlight-marker-reveal>Second block</p>
        </body></html>"#,
    )?;

    let doc = document_from_file(&path)?;
    let targets = doc.elements_with_attribute("data-highlight-marker-reveal");
    assert_eq!(targets.len(), 2);
    assert_eq!(doc.text_content(targets[0]), "First block");
    assert_eq!(doc.attribute(targets[0], "data-marker-direction"), Some("up"));
    assert_eq!(doc.text_content(targets[1]), "Second block");
    Ok(())
}

#[test]
fn missing_file_reports_path() {
    let err = document_from_file(std::path::Path::new("/definitely/not/here.html"))
        .expect_err("missing file should fail");
    assert!(format!("{err:#}").contains("here.html"));
}

#[test]
fn geometry_round_trips_through_elements() -> Result<()> {
    let mut doc = document_from_html("<p id=a>text</p>")?;
    let p = doc.children(doc.body())[0];
    assert_eq!(doc.rect(p), None);
    doc.set_rect(p, Rect::new(0.0, 120.0, 640.0, 48.0));
    assert_eq!(doc.rect(p).map(|r| r.bottom()), Some(168.0));
    Ok(())
}
