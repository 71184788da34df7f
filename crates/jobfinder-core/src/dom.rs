//! In-process document model.
//!
//! Elements live in a slot arena; removing a subtree invalidates its ids, so
//! late writes from a detached component land on a stale key and are
//! dropped instead of touching whatever replaced it.

use std::cell::RefCell;
use std::fmt::Write as _;

use slotmap::{SlotMap, new_key_type};
use smallvec::SmallVec;

use crate::error::{Error, Result};
use crate::markup::{Handler, Node, NodeKind, escape_into, write_open_tag};

new_key_type! {
    pub struct ElementId;
}

#[derive(Clone)]
enum Child {
    Element(ElementId),
    Text(String),
}

struct ElementData {
    tag: String,
    id: Option<String>,
    classes: SmallVec<[String; 4]>,
    attrs: Vec<(String, String)>,
    children: Vec<Child>,
    parent: Option<ElementId>,
    listeners: Vec<(String, Handler)>,
    /// Runs when the element is freed.
    owner: Option<Box<dyn FnOnce()>>,
}

type Released = Vec<Box<dyn FnOnce()>>;

impl ElementData {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            id: None,
            classes: SmallVec::new(),
            attrs: Vec::new(),
            children: Vec::new(),
            parent: None,
            listeners: Vec::new(),
            owner: None,
        }
    }
}

pub struct Document {
    nodes: RefCell<SlotMap<ElementId, ElementData>>,
    root: ElementId,
    body: ElementId,
    title: RefCell<String>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(ElementData::new("html"));
        let body = nodes.insert(ElementData::new("body"));
        nodes[body].parent = Some(root);
        nodes[root].children.push(Child::Element(body));
        Self {
            nodes: RefCell::new(nodes),
            root,
            body,
            title: RefCell::new(String::new()),
        }
    }

    /// The `<html>` element.
    pub fn document_element(&self) -> ElementId {
        self.root
    }

    pub fn body(&self) -> ElementId {
        self.body
    }

    pub fn title(&self) -> String {
        self.title.borrow().clone()
    }

    pub fn set_title(&self, title: impl Into<String>) {
        *self.title.borrow_mut() = title.into();
    }

    pub fn create_element(&self, tag: &str) -> ElementId {
        self.nodes.borrow_mut().insert(ElementData::new(tag))
    }

    /// Whether `el` still refers to a live element (attached or not).
    pub fn exists(&self, el: ElementId) -> bool {
        self.nodes.borrow().contains_key(el)
    }

    pub fn element_count(&self) -> usize {
        self.nodes.borrow().len()
    }

    /// Whether `el` is reachable from the document element.
    pub fn is_connected(&self, el: ElementId) -> bool {
        let nodes = self.nodes.borrow();
        let mut cur = Some(el);
        while let Some(id) = cur {
            if id == self.root {
                return true;
            }
            cur = nodes.get(id).and_then(|n| n.parent);
        }
        false
    }

    pub fn parent(&self, el: ElementId) -> Option<ElementId> {
        self.nodes.borrow().get(el).and_then(|n| n.parent)
    }

    pub fn children(&self, el: ElementId) -> Vec<ElementId> {
        self.nodes
            .borrow()
            .get(el)
            .map(|n| {
                n.children
                    .iter()
                    .filter_map(|c| match c {
                        Child::Element(id) => Some(*id),
                        Child::Text(_) => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Moves `child` under `parent`. Refuses stale ids and moves that would
    /// create a cycle.
    pub fn append_child(&self, parent: ElementId, child: ElementId) -> bool {
        let mut nodes = self.nodes.borrow_mut();
        if !nodes.contains_key(parent) || !nodes.contains_key(child) {
            return false;
        }
        let mut cur = Some(parent);
        while let Some(id) = cur {
            if id == child {
                log::warn!("append_child: refusing to append an element into its own subtree");
                return false;
            }
            cur = nodes.get(id).and_then(|n| n.parent);
        }
        detach_in(&mut nodes, child);
        nodes[child].parent = Some(parent);
        nodes[parent].children.push(Child::Element(child));
        true
    }

    /// Unlinks `el` from its parent; the element stays alive.
    pub fn detach(&self, el: ElementId) {
        detach_in(&mut self.nodes.borrow_mut(), el);
    }

    /// Detaches `el` and frees it together with its whole subtree.
    pub fn remove(&self, el: ElementId) {
        let mut released = Released::new();
        {
            let mut nodes = self.nodes.borrow_mut();
            detach_in(&mut nodes, el);
            free_subtree(&mut nodes, el, &mut released);
        }
        run_released(released);
    }

    /// Removes every child of `el`.
    pub fn clear(&self, el: ElementId) {
        let mut released = Released::new();
        clear_in(&mut self.nodes.borrow_mut(), el, &mut released);
        run_released(released);
    }

    /// Replaces the content of `el` with `node`. The previous subtree is
    /// freed, there is no diffing. Returns `false` for a stale `el`.
    pub fn set_content(&self, el: ElementId, node: &Node) -> bool {
        let mut released = Released::new();
        {
            let mut nodes = self.nodes.borrow_mut();
            if !nodes.contains_key(el) {
                return false;
            }
            clear_in(&mut nodes, el, &mut released);
            build_into(&mut nodes, el, node);
        }
        run_released(released);
        true
    }

    /// Hands `el` a callback to run when it is freed, whether through
    /// [`Document::remove`] or because an ancestor's content was replaced.
    /// The element keeps whatever the callback captures alive until then.
    pub fn set_owner(&self, el: ElementId, on_free: impl FnOnce() + 'static) -> bool {
        match self.nodes.borrow_mut().get_mut(el) {
            Some(n) => {
                n.owner = Some(Box::new(on_free));
                true
            }
            None => false,
        }
    }

    /// Appends `node` after the existing content of `el`.
    pub fn append_content(&self, el: ElementId, node: &Node) -> bool {
        let mut nodes = self.nodes.borrow_mut();
        if !nodes.contains_key(el) {
            return false;
        }
        build_into(&mut nodes, el, node);
        true
    }

    pub fn tag(&self, el: ElementId) -> Option<String> {
        self.nodes.borrow().get(el).map(|n| n.tag.clone())
    }

    pub fn element_id(&self, el: ElementId) -> Option<String> {
        self.nodes.borrow().get(el).and_then(|n| n.id.clone())
    }

    pub fn set_element_id(&self, el: ElementId, id: impl Into<String>) {
        if let Some(n) = self.nodes.borrow_mut().get_mut(el) {
            n.id = Some(id.into());
        }
    }

    pub fn attr(&self, el: ElementId, name: &str) -> Option<String> {
        self.nodes.borrow().get(el).and_then(|n| {
            n.attrs
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone())
        })
    }

    pub fn set_attr(&self, el: ElementId, name: &str, value: impl Into<String>) {
        if let Some(n) = self.nodes.borrow_mut().get_mut(el) {
            let value = value.into();
            match n.attrs.iter_mut().find(|(k, _)| k == name) {
                Some(slot) => slot.1 = value,
                None => n.attrs.push((name.to_string(), value)),
            }
        }
    }

    pub fn remove_attr(&self, el: ElementId, name: &str) {
        if let Some(n) = self.nodes.borrow_mut().get_mut(el) {
            n.attrs.retain(|(k, _)| k != name);
        }
    }

    pub fn has_class(&self, el: ElementId, class: &str) -> bool {
        self.nodes
            .borrow()
            .get(el)
            .is_some_and(|n| n.classes.iter().any(|c| c == class))
    }

    pub fn class_list(&self, el: ElementId) -> Vec<String> {
        self.nodes
            .borrow()
            .get(el)
            .map(|n| n.classes.to_vec())
            .unwrap_or_default()
    }

    pub fn add_class(&self, el: ElementId, class: &str) {
        if let Some(n) = self.nodes.borrow_mut().get_mut(el)
            && !n.classes.iter().any(|c| c == class)
        {
            n.classes.push(class.to_string());
        }
    }

    pub fn remove_class(&self, el: ElementId, class: &str) {
        if let Some(n) = self.nodes.borrow_mut().get_mut(el) {
            n.classes.retain(|c| c != class);
        }
    }

    /// `classList.toggle(class, force)`. Returns whether the class is present
    /// afterwards.
    pub fn toggle_class(&self, el: ElementId, class: &str, force: Option<bool>) -> bool {
        let present = self.has_class(el, class);
        let want = force.unwrap_or(!present);
        if want {
            self.add_class(el, class);
        } else {
            self.remove_class(el, class);
        }
        want && self.exists(el)
    }

    pub fn add_listener(&self, el: ElementId, event: &str, handler: Handler) {
        if let Some(n) = self.nodes.borrow_mut().get_mut(el) {
            n.listeners.push((event.to_string(), handler));
        }
    }

    /// Fires `event` on `el` and bubbles it up through the ancestors.
    /// Handlers run after the document borrow is released, so they may
    /// re-render freely. Returns how many handlers ran.
    pub fn dispatch(&self, el: ElementId, event: &str) -> usize {
        let handlers: Vec<Handler> = {
            let nodes = self.nodes.borrow();
            let mut out = Vec::new();
            let mut cur = Some(el);
            while let Some(id) = cur {
                let Some(n) = nodes.get(id) else { break };
                out.extend(
                    n.listeners
                        .iter()
                        .filter(|(e, _)| e == event)
                        .map(|(_, h)| h.clone()),
                );
                cur = n.parent;
            }
            out
        };
        for h in &handlers {
            h();
        }
        handlers.len()
    }

    pub fn click(&self, el: ElementId) -> usize {
        self.dispatch(el, "click")
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<ElementId> {
        let nodes = self.nodes.borrow();
        find_first(&nodes, self.root, &|n| n.id.as_deref() == Some(id))
    }

    /// First connected element matching a compound selector
    /// (`tag`, `#id`, `.class`, `[attr]`, `[attr="value"]`, combined).
    pub fn query_selector(&self, selector: &str) -> Result<Option<ElementId>> {
        self.query_selector_within(self.root, selector)
    }

    /// Like [`Document::query_selector`], but a miss is an error.
    pub fn require(&self, selector: &str) -> Result<ElementId> {
        self.query_selector(selector)?
            .ok_or_else(|| Error::MissingTarget(selector.to_string()))
    }

    pub fn query_selector_within(
        &self,
        scope: ElementId,
        selector: &str,
    ) -> Result<Option<ElementId>> {
        let sel = Selector::parse(selector)?;
        let nodes = self.nodes.borrow();
        if !nodes.contains_key(scope) {
            return Ok(None);
        }
        Ok(find_first(&nodes, scope, &|n| sel.matches(n)))
    }

    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<ElementId>> {
        self.query_selector_all_within(self.root, selector)
    }

    /// Every match in `scope`'s subtree, `scope` included, connected or not.
    pub fn query_selector_all_within(
        &self,
        scope: ElementId,
        selector: &str,
    ) -> Result<Vec<ElementId>> {
        let sel = Selector::parse(selector)?;
        let nodes = self.nodes.borrow();
        let mut out = Vec::new();
        if nodes.contains_key(scope) {
            collect_all(&nodes, scope, &|n| sel.matches(n), &mut out);
        }
        Ok(out)
    }

    pub fn text_content(&self, el: ElementId) -> String {
        let nodes = self.nodes.borrow();
        let mut out = String::new();
        write_text(&nodes, el, &mut out);
        out
    }

    pub fn inner_html(&self, el: ElementId) -> String {
        let nodes = self.nodes.borrow();
        let mut out = String::new();
        if let Some(n) = nodes.get(el) {
            for c in &n.children {
                write_child(&nodes, c, &mut out);
            }
        }
        out
    }

    pub fn outer_html(&self, el: ElementId) -> String {
        let nodes = self.nodes.borrow();
        let mut out = String::new();
        write_element(&nodes, el, &mut out);
        out
    }
}

fn detach_in(nodes: &mut SlotMap<ElementId, ElementData>, el: ElementId) {
    let Some(parent) = nodes.get_mut(el).and_then(|n| n.parent.take()) else {
        return;
    };
    if let Some(p) = nodes.get_mut(parent) {
        p.children
            .retain(|c| !matches!(c, Child::Element(id) if *id == el));
    }
}

fn clear_in(nodes: &mut SlotMap<ElementId, ElementData>, el: ElementId, released: &mut Released) {
    let Some(n) = nodes.get_mut(el) else { return };
    let old = std::mem::take(&mut n.children);
    for c in old {
        if let Child::Element(id) = c {
            free_subtree(nodes, id, released);
        }
    }
}

fn free_subtree(nodes: &mut SlotMap<ElementId, ElementData>, el: ElementId, released: &mut Released) {
    if let Some(n) = nodes.remove(el) {
        released.extend(n.owner);
        for c in n.children {
            if let Child::Element(id) = c {
                free_subtree(nodes, id, released);
            }
        }
    }
}

/// Owner callbacks run once the arena is no longer borrowed, so they may
/// touch the document themselves.
fn run_released(released: Released) {
    for on_free in released {
        on_free();
    }
}

fn build_into(nodes: &mut SlotMap<ElementId, ElementData>, parent: ElementId, node: &Node) {
    match &node.kind {
        NodeKind::Text(t) => nodes[parent].children.push(Child::Text(t.clone())),
        NodeKind::Fragment => {
            for c in &node.children {
                build_into(nodes, parent, c);
            }
        }
        NodeKind::Element {
            tag,
            id,
            classes,
            attrs,
        } => {
            let el = nodes.insert(ElementData {
                tag: tag.clone(),
                id: id.clone(),
                classes: classes.clone(),
                attrs: attrs.clone(),
                children: Vec::new(),
                parent: Some(parent),
                listeners: node.listeners.clone(),
                owner: None,
            });
            nodes[parent].children.push(Child::Element(el));
            for c in &node.children {
                build_into(nodes, el, c);
            }
        }
    }
}

fn find_first(
    nodes: &SlotMap<ElementId, ElementData>,
    from: ElementId,
    pred: &dyn Fn(&ElementData) -> bool,
) -> Option<ElementId> {
    let n = nodes.get(from)?;
    if pred(n) {
        return Some(from);
    }
    n.children.iter().find_map(|c| match c {
        Child::Element(id) => find_first(nodes, *id, pred),
        Child::Text(_) => None,
    })
}

fn collect_all(
    nodes: &SlotMap<ElementId, ElementData>,
    from: ElementId,
    pred: &dyn Fn(&ElementData) -> bool,
    out: &mut Vec<ElementId>,
) {
    let Some(n) = nodes.get(from) else { return };
    if pred(n) {
        out.push(from);
    }
    for c in &n.children {
        if let Child::Element(id) = c {
            collect_all(nodes, *id, pred, out);
        }
    }
}

fn write_text(nodes: &SlotMap<ElementId, ElementData>, el: ElementId, out: &mut String) {
    let Some(n) = nodes.get(el) else { return };
    for c in &n.children {
        match c {
            Child::Text(t) => out.push_str(t),
            Child::Element(id) => write_text(nodes, *id, out),
        }
    }
}

fn write_child(nodes: &SlotMap<ElementId, ElementData>, c: &Child, out: &mut String) {
    match c {
        Child::Text(t) => escape_into(out, t),
        Child::Element(id) => write_element(nodes, *id, out),
    }
}

fn write_element(nodes: &SlotMap<ElementId, ElementData>, el: ElementId, out: &mut String) {
    let Some(n) = nodes.get(el) else { return };
    write_open_tag(out, &n.tag, n.id.as_deref(), &n.classes, &n.attrs);
    for c in &n.children {
        write_child(nodes, c, out);
    }
    let _ = write!(out, "</{}>", n.tag);
}

#[derive(Debug, Default, PartialEq)]
struct Selector {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, Option<String>)>,
}

impl Selector {
    fn parse(input: &str) -> Result<Self> {
        let invalid = || Error::InvalidSelector(input.to_string());
        let s = input.trim();
        if s.is_empty() {
            return Err(invalid());
        }
        let mut sel = Selector::default();
        let mut chars = s.chars().peekable();

        let ident = |chars: &mut std::iter::Peekable<std::str::Chars<'_>>| {
            let mut out = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_alphanumeric() || c == '-' || c == '_' {
                    out.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            out
        };

        if chars.peek() == Some(&'*') {
            chars.next();
        } else {
            let tag = ident(&mut chars);
            if !tag.is_empty() {
                sel.tag = Some(tag.to_ascii_lowercase());
            }
        }

        while let Some(c) = chars.next() {
            match c {
                '#' => {
                    let id = ident(&mut chars);
                    if id.is_empty() {
                        return Err(invalid());
                    }
                    sel.id = Some(id);
                }
                '.' => {
                    let class = ident(&mut chars);
                    if class.is_empty() {
                        return Err(invalid());
                    }
                    sel.classes.push(class);
                }
                '[' => {
                    let mut body = String::new();
                    let mut closed = false;
                    for c in chars.by_ref() {
                        if c == ']' {
                            closed = true;
                            break;
                        }
                        body.push(c);
                    }
                    if !closed {
                        return Err(invalid());
                    }
                    let (name, value) = match body.split_once('=') {
                        Some((n, v)) => {
                            let v = v.trim().trim_matches(|c| c == '"' || c == '\'');
                            (n.trim().to_string(), Some(v.to_string()))
                        }
                        None => (body.trim().to_string(), None),
                    };
                    if name.is_empty() {
                        return Err(invalid());
                    }
                    sel.attrs.push((name, value));
                }
                _ => return Err(invalid()),
            }
        }
        Ok(sel)
    }

    fn matches(&self, n: &ElementData) -> bool {
        if let Some(tag) = &self.tag
            && !n.tag.eq_ignore_ascii_case(tag)
        {
            return false;
        }
        if let Some(id) = &self.id
            && n.id.as_deref() != Some(id.as_str())
        {
            return false;
        }
        if !self
            .classes
            .iter()
            .all(|c| n.classes.iter().any(|have| have == c))
        {
            return false;
        }
        self.attrs.iter().all(|(name, value)| {
            let have = if name == "id" {
                n.id.clone()
            } else {
                n.attrs
                    .iter()
                    .find(|(k, _)| k == name)
                    .map(|(_, v)| v.clone())
            };
            match (have, value) {
                (Some(h), Some(v)) => h == *v,
                (Some(_), None) => true,
                (None, _) => false,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::{a, button, div, text};
    use std::cell::Cell;
    use std::rc::Rc;

    fn shell(doc: &Document) -> ElementId {
        let main = doc.create_element("main");
        doc.set_element_id(main, "page-content");
        doc.append_child(doc.body(), main);
        main
    }

    #[test]
    fn set_content_replaces_and_frees_subtree() {
        let doc = Document::new();
        let main = shell(&doc);
        doc.set_content(main, &div().id("a").child(div().class("inner")));
        let old = doc.get_element_by_id("a").unwrap();
        let before = doc.element_count();

        doc.set_content(main, &div().id("b"));
        assert!(!doc.exists(old));
        assert_eq!(doc.element_count(), before - 1);
        assert!(doc.get_element_by_id("a").is_none());
        assert_eq!(doc.inner_html(main), "<div id=\"b\"></div>");
    }

    #[test]
    fn selectors() {
        let doc = Document::new();
        let main = shell(&doc);
        doc.set_content(
            main,
            &div()
                .class("card wide")
                .child(a("#/jobs").class("navbar-item").child(text("Jobs"))),
        );
        assert_eq!(
            doc.query_selector("#page-content").unwrap(),
            Some(main)
        );
        let link = doc.query_selector("a.navbar-item").unwrap().unwrap();
        assert_eq!(doc.attr(link, "href").as_deref(), Some("#/jobs"));
        assert!(doc.query_selector("div.card.wide").unwrap().is_some());
        assert!(doc.query_selector("div.card.narrow").unwrap().is_none());
        assert!(doc.query_selector("[href='#/jobs']").unwrap().is_some());
        assert!(doc.query_selector("#missing").unwrap().is_none());
        assert!(matches!(
            doc.query_selector("div > p"),
            Err(Error::InvalidSelector(_))
        ));
        assert_eq!(doc.query_selector_all("div").unwrap().len(), 1);
    }

    #[test]
    fn detached_elements_are_not_found() {
        let doc = Document::new();
        let loose = doc.create_element("div");
        doc.set_element_id(loose, "loose");
        assert!(doc.get_element_by_id("loose").is_none());
        assert!(!doc.is_connected(loose));
        doc.append_child(doc.body(), loose);
        assert!(doc.is_connected(loose));
    }

    #[test]
    fn click_bubbles_to_ancestor_handlers() {
        let doc = Document::new();
        let main = shell(&doc);
        let hits = Rc::new(Cell::new(0));
        let h = {
            let hits = hits.clone();
            Rc::new(move || hits.set(hits.get() + 1)) as Handler
        };
        doc.set_content(
            main,
            &button().on_click(h).child(div().id("label").child(text("Go"))),
        );
        let label = doc.get_element_by_id("label").unwrap();
        assert_eq!(doc.click(label), 1);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn cannot_append_into_own_subtree() {
        let doc = Document::new();
        let outer = doc.create_element("div");
        let inner = doc.create_element("div");
        assert!(doc.append_child(outer, inner));
        assert!(!doc.append_child(inner, outer));
    }

    #[test]
    fn toggle_class_with_force() {
        let doc = Document::new();
        let root = doc.document_element();
        assert!(doc.toggle_class(root, "dark", Some(true)));
        assert!(doc.toggle_class(root, "dark", Some(true)));
        assert!(!doc.toggle_class(root, "dark", None));
        assert!(doc.class_list(root).is_empty());
    }
}
