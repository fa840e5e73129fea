use std::collections::{BTreeMap, HashMap};
use std::fmt;

use ego_tree::{NodeId, NodeRef, Tree};

use crate::css;

/// Identifies a node in a [`Document`].
///
/// Ids are plain handles: holding one does not keep the node attached, and a
/// removed node's id stays valid for lookups but reports
/// [`Document::is_connected`] as `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(NodeId);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

/// Axis-aligned box in page coordinates (pixels, y grows downwards).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    /// Inline style declarations, kept apart from the `style` attribute.
    pub style: BTreeMap<String, String>,
    /// Layout box supplied by the host, if any.
    pub rect: Option<Rect>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            ..Self::default()
        }
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attributes
            .get("class")
            .map(String::as_str)
            .unwrap_or_default()
            .split_ascii_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("document has no <html> element")]
    MissingRoot,
    #[error("document has no <body> element")]
    MissingBody,
}

/// Mutable page model: element tree plus the custom properties declared on
/// the document root.
#[derive(Debug, Clone)]
pub struct Document {
    tree: Tree<Node>,
    html: NodeId,
    body: NodeId,
    root_properties: HashMap<String, String>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty `<html><body></body></html>` document.
    pub fn new() -> Self {
        let mut tree = Tree::new(Node::Document);
        let mut root = tree.root_mut();
        let mut html = root.append(Node::Element(Element::new("html")));
        let html_id = html.id();
        html.append(Node::Element(Element::new("head")));
        let body = html.append(Node::Element(Element::new("body"))).id();
        Self {
            tree,
            html: html_id,
            body,
            root_properties: HashMap::new(),
        }
    }

    pub(crate) fn from_tree(tree: Tree<Node>) -> Result<Self, DocumentError> {
        let html = tree
            .root()
            .children()
            .find(|n| matches!(n.value(), Node::Element(e) if e.tag == "html"))
            .ok_or(DocumentError::MissingRoot)?;
        let body = html
            .children()
            .find(|n| matches!(n.value(), Node::Element(e) if e.tag == "body"))
            .ok_or(DocumentError::MissingBody)?;
        let (html, body) = (html.id(), body.id());

        let mut doc = Self {
            tree,
            html,
            body,
            root_properties: HashMap::new(),
        };
        doc.collect_root_properties();
        Ok(doc)
    }

    fn collect_root_properties(&mut self) {
        let mut vars = HashMap::new();
        let styles: Vec<NodeId> = self
            .tree
            .root()
            .descendants()
            .filter(|n| matches!(n.value(), Node::Element(e) if e.tag == "style"))
            .map(|n| n.id())
            .collect();
        for id in styles {
            vars.extend(css::collect_root_custom_properties(
                &self.text_content(ElementId(id)),
            ));
        }
        if let Some(Node::Element(html)) = self.tree.get(self.html).map(|n| n.value()) {
            for (name, value) in &html.style {
                if name.starts_with("--") {
                    vars.insert(name.clone(), value.clone());
                }
            }
        }
        self.root_properties = vars;
    }

    pub fn html(&self) -> ElementId {
        ElementId(self.html)
    }

    pub fn body(&self) -> ElementId {
        ElementId(self.body)
    }

    // ------------------------------------------------------------------
    // Root custom properties
    // ------------------------------------------------------------------

    /// Computed value of a custom property on the document root.
    ///
    /// Blank values count as unset.
    pub fn root_property(&self, name: &str) -> Option<&str> {
        self.root_properties
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn set_root_property(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.root_properties.insert(name.into(), value.into());
    }

    // ------------------------------------------------------------------
    // Tree structure
    // ------------------------------------------------------------------

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> ElementId {
        ElementId(self.tree.orphan(Node::Element(Element::new(tag))).id())
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> ElementId {
        ElementId(self.tree.orphan(Node::Text(text.into())).id())
    }

    /// Append `child` as the last child of `parent`, detaching it from any
    /// previous parent first.
    pub fn append_child(&mut self, parent: ElementId, child: ElementId) {
        if parent == child {
            return;
        }
        if let Some(mut node) = self.tree.get_mut(parent.0) {
            node.append_id(child.0);
        }
    }

    pub fn append_text(&mut self, parent: ElementId, text: &str) -> ElementId {
        let id = self.create_text(text);
        self.append_child(parent, id);
        id
    }

    /// Detach a node (and its subtree) from the document.
    pub fn remove(&mut self, id: ElementId) {
        if let Some(mut node) = self.tree.get_mut(id.0) {
            node.detach();
        }
    }

    /// Detach and return every child of `parent`, in order.
    pub fn take_children(&mut self, parent: ElementId) -> Vec<ElementId> {
        let children = self.children(parent);
        for child in &children {
            self.remove(*child);
        }
        children
    }

    pub fn children(&self, id: ElementId) -> Vec<ElementId> {
        self.tree
            .get(id.0)
            .map(|n| n.children().map(|c| ElementId(c.id())).collect())
            .unwrap_or_default()
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.tree
            .get(id.0)
            .and_then(|n| n.parent())
            .map(|p| ElementId(p.id()))
    }

    /// Whether the node is reachable from the document root.
    pub fn is_connected(&self, id: ElementId) -> bool {
        let Some(node) = self.tree.get(id.0) else {
            return false;
        };
        let root = self.tree.root().id();
        node.id() == root || node.ancestors().any(|a| a.id() == root)
    }

    pub fn node(&self, id: ElementId) -> Option<&Node> {
        self.tree.get(id.0).map(|n| n.value())
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        match self.node(id)? {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }

    fn with_element_mut<R>(
        &mut self,
        id: ElementId,
        f: impl FnOnce(&mut Element) -> R,
    ) -> Option<R> {
        let mut node = self.tree.get_mut(id.0)?;
        match node.value() {
            Node::Element(e) => Some(f(e)),
            _ => None,
        }
    }

    /// Concatenated text of the node and its descendants.
    pub fn text_content(&self, id: ElementId) -> String {
        let Some(node) = self.tree.get(id.0) else {
            return String::new();
        };
        node.descendants()
            .filter_map(|n| match n.value() {
                Node::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Connected elements carrying `name`, in document order.
    pub fn elements_with_attribute(&self, name: &str) -> Vec<ElementId> {
        self.collect_elements(self.tree.root(), |e| e.attributes.contains_key(name))
    }

    /// Elements with `class` inside `scope` (excluding `scope` itself).
    pub fn elements_with_class(&self, scope: ElementId, class: &str) -> Vec<ElementId> {
        let Some(node) = self.tree.get(scope.0) else {
            return Vec::new();
        };
        self.collect_elements(node, |e| e.has_class(class))
            .into_iter()
            .filter(|id| *id != scope)
            .collect()
    }

    fn collect_elements(
        &self,
        from: NodeRef<'_, Node>,
        predicate: impl Fn(&Element) -> bool,
    ) -> Vec<ElementId> {
        from.descendants()
            .filter(|n| matches!(n.value(), Node::Element(e) if predicate(e)))
            .map(|n| ElementId(n.id()))
            .collect()
    }

    // ------------------------------------------------------------------
    // Attributes, classes, style, geometry
    // ------------------------------------------------------------------

    pub fn tag(&self, id: ElementId) -> Option<&str> {
        self.element(id).map(|e| e.tag.as_str())
    }

    pub fn attribute(&self, id: ElementId, name: &str) -> Option<&str> {
        self.element(id)?.attributes.get(name).map(String::as_str)
    }

    pub fn has_class(&self, id: ElementId, class: &str) -> bool {
        self.element(id).is_some_and(|e| e.has_class(class))
    }

    pub fn add_class(&mut self, id: ElementId, class: &str) {
        if self.has_class(id, class) {
            return;
        }
        self.with_element_mut(id, |e| {
            let joined = match e.attributes.get("class") {
                Some(existing) if !existing.trim().is_empty() => {
                    format!("{} {class}", existing.trim())
                }
                _ => class.to_string(),
            };
            e.attributes.insert("class".to_string(), joined);
        });
    }

    pub fn style(&self, id: ElementId, property: &str) -> Option<&str> {
        self.element(id)?.style.get(property).map(String::as_str)
    }

    pub fn set_style(&mut self, id: ElementId, property: &str, value: impl Into<String>) {
        let value = value.into();
        self.with_element_mut(id, |e| e.style.insert(property.to_string(), value));
    }

    pub fn rect(&self, id: ElementId) -> Option<Rect> {
        self.element(id)?.rect
    }

    pub fn set_rect(&mut self, id: ElementId, rect: Rect) {
        self.with_element_mut(id, |e| e.rect = Some(rect));
    }

    // ------------------------------------------------------------------
    // Serialization
    // ------------------------------------------------------------------

    /// Serialize a node and its subtree as HTML.
    pub fn outer_html(&self, id: ElementId) -> String {
        let mut out = String::new();
        if let Some(node) = self.tree.get(id.0) {
            write_node(node, &mut out);
        }
        out
    }
}

const VOID_TAGS: &[&str] = &["br", "hr", "img", "input", "meta", "link"];

fn write_node(node: NodeRef<'_, Node>, out: &mut String) {
    match node.value() {
        Node::Document => {
            for child in node.children() {
                write_node(child, out);
            }
        }
        Node::Text(text) => out.push_str(&escape(text)),
        Node::Element(e) => {
            out.push('<');
            out.push_str(&e.tag);
            for (name, value) in &e.attributes {
                if name == "style" {
                    continue;
                }
                out.push_str(&format!(" {name}=\"{}\"", escape(value)));
            }
            if !e.style.is_empty() {
                let style = css::serialize_declarations(
                    e.style.iter().map(|(k, v)| (k.as_str(), v.as_str())),
                );
                out.push_str(&format!(" style=\"{}\"", escape(&style)));
            }
            out.push('>');
            if VOID_TAGS.contains(&e.tag.as_str()) {
                return;
            }
            for child in node.children() {
                write_node(child, out);
            }
            out.push_str(&format!("</{}>", e.tag));
        }
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
