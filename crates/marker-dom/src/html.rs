//! HTML loading via `scraper`.

use std::path::Path;

use anyhow::{Context, Result};
use ego_tree::{NodeMut, NodeRef, Tree};
use scraper::Html;
use tracing::debug;

use crate::css;
use crate::document::{Document, DocumentError, Element, Node};

/// Parse an HTML page into a [`Document`].
///
/// Comments, doctypes and processing instructions are dropped; element
/// attributes are kept verbatim except `style`, which is split into inline
/// declarations.
pub fn document_from_html(html: &str) -> Result<Document, DocumentError> {
    let parsed = Html::parse_document(html);
    let mut tree = Tree::new(Node::Document);
    for child in parsed.tree.root().children() {
        let mut root = tree.root_mut();
        copy_node(child, &mut root);
    }
    let doc = Document::from_tree(tree)?;
    debug!(bytes = html.len(), "parsed html document");
    Ok(doc)
}

pub fn document_from_file(path: &Path) -> Result<Document> {
    let html = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read HTML file '{}'", path.display()))?;
    document_from_html(&html).with_context(|| format!("failed to load '{}'", path.display()))
}

fn copy_node(source: NodeRef<'_, scraper::Node>, parent: &mut NodeMut<'_, Node>) {
    match source.value() {
        scraper::Node::Element(el) => {
            let mut element = Element::new(el.name());
            for (name, value) in el.attrs() {
                if name == "style" {
                    element.style.extend(css::parse_declarations(value));
                } else {
                    element.attributes.insert(name.to_string(), value.to_string());
                }
            }
            let mut node = parent.append(Node::Element(element));
            for child in source.children() {
                copy_node(child, &mut node);
            }
        }
        scraper::Node::Text(text) => {
            let text: &str = text;
            parent.append(Node::Text(text.to_string()));
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_targets_styles_and_root_properties() {
        let doc = document_from_html(
            r#"<!doctype html>
            <html style="--inline-accent: gold">
              <head><style>:root { --brand-color: #0af; }</style></head>
              <body>
                <!-- ignored -->
                <h2 data-highlight-marker-reveal data-marker-theme="--brand-color"
                    style="Opacity: 0.5">Hello <em>world</em></h2>
              </body>
            </html>"#,
        )
        .unwrap();

        let targets = doc.elements_with_attribute("data-highlight-marker-reveal");
        assert_eq!(targets.len(), 1);
        let h2 = targets[0];
        assert_eq!(doc.tag(h2), Some("h2"));
        assert_eq!(doc.attribute(h2, "data-marker-theme"), Some("--brand-color"));
        assert_eq!(doc.attribute(h2, "data-highlight-marker-reveal"), Some(""));
        assert_eq!(doc.style(h2, "opacity"), Some("0.5"));
        assert_eq!(doc.text_content(h2), "Hello world");
        assert_eq!(doc.root_property("--brand-color"), Some("#0af"));
        assert_eq!(doc.root_property("--inline-accent"), Some("gold"));
    }

    #[test]
    fn fragments_get_wrapped_in_html_and_body() {
        let doc = document_from_html("<p data-highlight-marker-reveal>Plain</p>").unwrap();
        let targets = doc.elements_with_attribute("data-highlight-marker-reveal");
        assert_eq!(targets.len(), 1);
        assert_eq!(doc.parent(targets[0]), Some(doc.body()));
    }
}
