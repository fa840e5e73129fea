//! In-memory document model for the highlight marker reveal.
//!
//! A [`Document`] is a mutable element tree stored in an `ego_tree` arena.
//! Elements are addressed by [`ElementId`], which never keeps anything alive:
//! removing an element detaches it, and [`Document::is_connected`] tells callers
//! whether an id still refers to something on the page.

pub mod css;
pub mod document;
pub mod html;

pub use document::{Document, DocumentError, Element, ElementId, Node, Rect};
pub use html::{document_from_file, document_from_html};
