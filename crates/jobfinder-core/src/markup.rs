//! Markup trees produced by component templates.
//!
//! A template returns a [`Node`]; the component writes it into its root
//! element wholesale on every render. Event handlers are plain closures
//! attached to nodes, so nothing is looked up by name at dispatch time.

use smallvec::SmallVec;
use std::fmt::{self, Write as _};
use std::rc::Rc;

pub type Handler = Rc<dyn Fn()>;

#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Element {
        tag: String,
        id: Option<String>,
        classes: SmallVec<[String; 4]>,
        attrs: Vec<(String, String)>,
    },
    Text(String),
    /// Children without a wrapping element.
    Fragment,
}

#[derive(Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub children: Vec<Node>,
    pub listeners: Vec<(String, Handler)>,
}

const VOID_TAGS: &[&str] = &["br", "hr", "img", "input", "meta", "link"];

impl Node {
    pub fn element(tag: impl Into<String>) -> Self {
        Node {
            kind: NodeKind::Element {
                tag: tag.into(),
                id: None,
                classes: SmallVec::new(),
                attrs: Vec::new(),
            },
            children: Vec::new(),
            listeners: Vec::new(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Node {
            kind: NodeKind::Text(text.into()),
            children: Vec::new(),
            listeners: Vec::new(),
        }
    }

    pub fn fragment(children: impl IntoIterator<Item = Node>) -> Self {
        Node {
            kind: NodeKind::Fragment,
            children: children.into_iter().collect(),
            listeners: Vec::new(),
        }
    }

    pub fn empty() -> Self {
        Self::fragment([])
    }

    pub fn id(mut self, value: impl Into<String>) -> Self {
        if let NodeKind::Element { id, .. } = &mut self.kind {
            *id = Some(value.into());
        }
        self
    }

    /// Adds one or more whitespace separated classes.
    pub fn class(mut self, value: &str) -> Self {
        if let NodeKind::Element { classes, .. } = &mut self.kind {
            for c in value.split_whitespace() {
                if !classes.iter().any(|existing| existing == c) {
                    classes.push(c.to_string());
                }
            }
        }
        self
    }

    pub fn class_if(self, cond: bool, value: &str) -> Self {
        if cond { self.class(value) } else { self }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let NodeKind::Element { attrs, .. } = &mut self.kind {
            let name = name.into();
            let value = value.into();
            match attrs.iter_mut().find(|(n, _)| *n == name) {
                Some(slot) => slot.1 = value,
                None => attrs.push((name, value)),
            }
        }
        self
    }

    pub fn child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, kids: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(kids);
        self
    }

    pub fn on(mut self, event: impl Into<String>, handler: Handler) -> Self {
        self.listeners.push((event.into(), handler));
        self
    }

    pub fn on_click(self, handler: Handler) -> Self {
        self.on("click", handler)
    }

    pub fn tag(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        match &self.kind {
            NodeKind::Text(t) => escape_into(out, t),
            NodeKind::Fragment => {
                for c in &self.children {
                    c.write_html(out);
                }
            }
            NodeKind::Element {
                tag,
                id,
                classes,
                attrs,
            } => {
                write_open_tag(out, tag, id.as_deref(), classes, attrs);
                if VOID_TAGS.contains(&tag.as_str()) {
                    return;
                }
                for c in &self.children {
                    c.write_html(out);
                }
                let _ = write!(out, "</{tag}>");
            }
        }
    }
}

pub(crate) fn write_open_tag(
    out: &mut String,
    tag: &str,
    id: Option<&str>,
    classes: &[String],
    attrs: &[(String, String)],
) {
    out.push('<');
    out.push_str(tag);
    if let Some(id) = id {
        out.push_str(" id=\"");
        escape_into(out, id);
        out.push('"');
    }
    if !classes.is_empty() {
        out.push_str(" class=\"");
        escape_into(out, &classes.join(" "));
        out.push('"');
    }
    for (name, value) in attrs {
        let _ = write!(out, " {name}=\"");
        escape_into(out, value);
        out.push('"');
    }
    out.push('>');
}

pub(crate) fn escape_into(out: &mut String, s: &str) {
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("kind", &self.kind)
            .field("children", &self.children)
            .field(
                "listeners",
                &self.listeners.iter().map(|(e, _)| e.as_str()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::text(s)
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::text(s)
    }
}

pub fn text(s: impl Into<String>) -> Node {
    Node::text(s)
}

pub fn div() -> Node {
    Node::element("div")
}

pub fn span() -> Node {
    Node::element("span")
}

pub fn p() -> Node {
    Node::element("p")
}

pub fn h1() -> Node {
    Node::element("h1")
}

pub fn h2() -> Node {
    Node::element("h2")
}

pub fn h3() -> Node {
    Node::element("h3")
}

pub fn section() -> Node {
    Node::element("section")
}

pub fn nav() -> Node {
    Node::element("nav")
}

pub fn button() -> Node {
    Node::element("button")
}

pub fn icon(name: &str) -> Node {
    Node::element("i").attr("data-lucide", name)
}

pub fn a(href: impl Into<String>) -> Node {
    Node::element("a").attr("href", href)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialises_nested_markup() {
        let n = div()
            .id("hero")
            .class("card  p-4")
            .class("card")
            .child(h1().child(text("Jobs & more")))
            .child(a("#/jobs").class("navbar-item").child(text("Jobs")));
        assert_eq!(
            n.to_html(),
            "<div id=\"hero\" class=\"card p-4\"><h1>Jobs &amp; more</h1>\
             <a class=\"navbar-item\" href=\"#/jobs\">Jobs</a></div>"
        );
    }

    #[test]
    fn fragments_and_void_tags() {
        let n = Node::fragment([text("a"), Node::element("br"), text("b")]);
        assert_eq!(n.to_html(), "a<br>b");
    }

    #[test]
    fn attr_overwrites_same_name() {
        let n = div().attr("style", "width: 1%").attr("style", "width: 2%");
        assert_eq!(n.to_html(), "<div style=\"width: 2%\"></div>");
    }
}
