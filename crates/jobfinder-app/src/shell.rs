//! The static page skeleton the chrome and the router mount into.

use jobfinder_core::markup::{self, Node};
use jobfinder_core::{Document, ElementId, Result};

pub const NAVBAR_ANCHOR: &str = "#navbar-component";
pub const THEME_TOGGLE_ANCHOR: &str = "#theme-toggle-component";
pub const PAGE_CONTENT: &str = "#page-content";

pub fn shell() -> Node {
    Node::fragment([
        Node::element("header")
            .class("app-header")
            .child(markup::div().id("navbar-component"))
            .child(markup::div().id("theme-toggle-component").class("fixed top-4 right-4")),
        Node::element("main")
            .id("page-content")
            .class("page-transition"),
    ])
}

pub struct Anchors {
    pub navbar: ElementId,
    pub theme_toggle: ElementId,
    pub content: ElementId,
}

/// Installs the skeleton unless a host document already provides one, then
/// resolves the three anchors.
pub fn install(doc: &Document) -> Result<Anchors> {
    if doc.get_element_by_id("page-content").is_none() {
        doc.append_content(doc.body(), &shell());
    }
    doc.set_title("JobFinder - AI-Powered Career Platform");
    Ok(Anchors {
        navbar: doc.require(NAVBAR_ANCHOR)?,
        theme_toggle: doc.require(THEME_TOGGLE_ANCHOR)?,
        content: doc.require(PAGE_CONTENT)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_is_idempotent() {
        let doc = Document::new();
        let first = install(&doc).unwrap();
        let second = install(&doc).unwrap();
        assert_eq!(first.content, second.content);
        assert_eq!(doc.query_selector_all("main").unwrap().len(), 1);
    }
}
