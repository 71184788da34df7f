//! Component factory.
//!
//! A [`Component`] is a descriptor: template, data factory, methods and
//! lifecycle hooks. [`Component::render`] turns it into an [`Instance`]
//! mounted into a container.
//!
//! Rendering is whole-subtree replacement: every write through the instance's
//! data bag ([`Instance::update`], [`Instance::set_data`]) runs the template
//! again and swaps the root element's content wholesale. There is no diffing;
//! one write is exactly one render.
//!
//! ```rust
//! use jobfinder_core::*;
//!
//! #[derive(Default)]
//! struct Counter {
//!     n: u32,
//! }
//!
//! let rt = Runtime::headless();
//! let counter = Component::<Counter>::new("counter")
//!     .template(|d, m, _| {
//!         markup::button()
//!             .on_click(m.bind("inc"))
//!             .child(markup::text(format!("{}", d.n)))
//!     })
//!     .method("inc", |inst, _| inst.update(|d| d.n += 1));
//!
//! let inst = counter.render(&rt, rt.document.body(), ());
//! inst.call("inc");
//! assert_eq!(inst.with_data(|d| d.n), 1);
//! assert_eq!(inst.render_count(), 2);
//! ```

use std::cell::{Cell, Ref, RefCell};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::{Rc, Weak};

use serde_json::Value;
use web_time::Duration;

use crate::dom::ElementId;
use crate::markup::{Handler, Node};
use crate::store::{State, Store};
use crate::{CleanupId, Dispose, Runtime, Scope, Signal};

/// Where to mount: an element or a selector resolved against the document.
#[derive(Clone, Debug, PartialEq)]
pub enum Target {
    Element(ElementId),
    Selector(String),
}

impl From<ElementId> for Target {
    fn from(el: ElementId) -> Self {
        Target::Element(el)
    }
}

impl From<&str> for Target {
    fn from(sel: &str) -> Self {
        Target::Selector(sel.to_string())
    }
}

impl From<String> for Target {
    fn from(sel: String) -> Self {
        Target::Selector(sel)
    }
}

type TemplateFn<D, P> = Rc<dyn Fn(&D, &Methods, &P) -> Node>;
type MethodFn<D, P> = Rc<dyn Fn(&Instance<D, P>, &Value)>;
type HookFn<D, P> = Rc<dyn Fn(&Instance<D, P>)>;
type MountedFn<D, P> = Rc<dyn Fn(&Instance<D, P>) -> Vec<Dispose>>;

pub enum Template<D, P> {
    /// Used verbatim on every render.
    Static(Node),
    Render(TemplateFn<D, P>),
}

impl<D, P> Clone for Template<D, P> {
    fn clone(&self) -> Self {
        match self {
            Template::Static(n) => Template::Static(n.clone()),
            Template::Render(f) => Template::Render(f.clone()),
        }
    }
}

struct Spec<D: 'static, P: 'static> {
    name: String,
    template: Template<D, P>,
    data: Rc<dyn Fn(&P) -> D>,
    methods: Vec<(String, MethodFn<D, P>)>,
    mounted: Option<MountedFn<D, P>>,
    after_render: Option<HookFn<D, P>>,
    fallback: Option<Rc<dyn Fn(&str) -> Node>>,
}

impl<D: 'static, P: 'static> Clone for Spec<D, P> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            template: self.template.clone(),
            data: self.data.clone(),
            methods: self.methods.clone(),
            mounted: self.mounted.clone(),
            after_render: self.after_render.clone(),
            fallback: self.fallback.clone(),
        }
    }
}

pub struct Component<D: 'static, P: 'static = ()> {
    spec: Rc<Spec<D, P>>,
}

impl<D: 'static, P: 'static> Clone for Component<D, P> {
    fn clone(&self) -> Self {
        Self {
            spec: self.spec.clone(),
        }
    }
}

impl<D: Default + 'static, P: 'static> Component<D, P> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            spec: Rc::new(Spec {
                name: name.into(),
                template: Template::Static(Node::empty()),
                data: Rc::new(|_| D::default()),
                methods: Vec::new(),
                mounted: None,
                after_render: None,
                fallback: None,
            }),
        }
    }
}

impl<D: 'static, P: 'static> Component<D, P> {
    fn spec_mut(&mut self) -> &mut Spec<D, P> {
        Rc::make_mut(&mut self.spec)
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn template(mut self, f: impl Fn(&D, &Methods, &P) -> Node + 'static) -> Self {
        self.spec_mut().template = Template::Render(Rc::new(f));
        self
    }

    pub fn static_template(mut self, node: Node) -> Self {
        self.spec_mut().template = Template::Static(node);
        self
    }

    pub fn data(mut self, f: impl Fn() -> D + 'static) -> Self {
        self.spec_mut().data = Rc::new(move |_| f());
        self
    }

    /// Data factory that can look at the props the instance is mounted with.
    pub fn data_from_props(mut self, f: impl Fn(&P) -> D + 'static) -> Self {
        self.spec_mut().data = Rc::new(f);
        self
    }

    pub fn method(
        mut self,
        name: impl Into<String>,
        f: impl Fn(&Instance<D, P>, &Value) + 'static,
    ) -> Self {
        let name = name.into();
        let spec = self.spec_mut();
        spec.methods.retain(|(n, _)| *n != name);
        spec.methods.push((name, Rc::new(f)));
        self
    }

    /// Runs once after the first render and mount. The returned cleanups run
    /// when the instance is disposed.
    pub fn mounted(mut self, f: impl Fn(&Instance<D, P>) -> Vec<Dispose> + 'static) -> Self {
        self.spec_mut().mounted = Some(Rc::new(f));
        self
    }

    /// Runs after every render; the place to mount nested widgets into the
    /// freshly rendered markup.
    pub fn after_render(mut self, f: impl Fn(&Instance<D, P>) + 'static) -> Self {
        self.spec_mut().after_render = Some(Rc::new(f));
        self
    }

    /// Markup to show when the template panics. Without one the panic
    /// propagates out of the render.
    pub fn fallback(mut self, f: impl Fn(&str) -> Node + 'static) -> Self {
        self.spec_mut().fallback = Some(Rc::new(f));
        self
    }

    /// Instantiates, renders, mounts into `target` and runs `mounted`.
    ///
    /// A target that resolves to nothing leaves the instance detached; this
    /// is not an error.
    pub fn render(&self, runtime: &Runtime, target: impl Into<Target>, props: P) -> Instance<D, P> {
        let doc = &runtime.document;
        let root = doc.create_element("div");
        doc.set_attr(root, "data-component", self.spec.name.as_str());
        let data = (self.spec.data)(&props);
        let spec = self.spec.clone();

        let inner = Rc::new_cyclic(|weak: &Weak<InstanceInner<D, P>>| InstanceInner {
            methods: Methods::bind_all(&spec, weak),
            spec,
            runtime: runtime.clone(),
            root,
            data: RefCell::new(data),
            props,
            scope: Scope::new(),
            render_scope: RefCell::new(Scope::new()),
            renders: Cell::new(0),
            disposed: Cell::new(false),
        });
        let instance = Instance { inner };
        doc.set_owner(root, {
            let owner = instance.clone();
            move || owner.dispose()
        });
        instance.render_now();

        match resolve_target(runtime, &target.into()) {
            Some(container) => {
                doc.append_child(container, root);
            }
            None => log::debug!("{}: mount target missing, left detached", self.spec.name),
        }

        if let Some(mounted) = self.spec.mounted.clone() {
            for d in mounted(&instance) {
                instance.own(d);
            }
        }
        instance
    }
}

fn resolve_target(runtime: &Runtime, target: &Target) -> Option<ElementId> {
    match target {
        Target::Element(el) => runtime.document.exists(*el).then_some(*el),
        Target::Selector(sel) => match runtime.document.query_selector(sel) {
            Ok(found) => found,
            Err(e) => {
                log::warn!("{e}");
                None
            }
        },
    }
}

/// Methods bound to one instance, handed to the template so it can attach
/// them to markup as closures.
#[derive(Clone, Default)]
pub struct Methods {
    table: Rc<Vec<(String, Rc<dyn Fn(&Value)>)>>,
}

impl Methods {
    fn bind_all<D: 'static, P: 'static>(
        spec: &Spec<D, P>,
        weak: &Weak<InstanceInner<D, P>>,
    ) -> Self {
        let table = spec
            .methods
            .iter()
            .map(|(name, f)| {
                let f = f.clone();
                let weak = weak.clone();
                let bound: Rc<dyn Fn(&Value)> = Rc::new(move |arg: &Value| {
                    if let Some(inner) = weak.upgrade() {
                        let inst = Instance { inner };
                        if !inst.is_disposed() {
                            f(&inst, arg);
                        }
                    }
                });
                (name.clone(), bound)
            })
            .collect();
        Self {
            table: Rc::new(table),
        }
    }

    fn lookup(&self, name: &str) -> Option<Rc<dyn Fn(&Value)>> {
        self.table
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, f)| f.clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.table.iter().map(|(n, _)| n.as_str())
    }

    /// Invokes a method. Returns `false` for an unknown name.
    pub fn call(&self, name: &str, arg: &Value) -> bool {
        match self.lookup(name) {
            Some(f) => {
                f(arg);
                true
            }
            None => {
                log::warn!("no method named `{name}`");
                false
            }
        }
    }

    pub fn bind(&self, name: &str) -> Handler {
        self.bind_with(name, Value::Null)
    }

    /// A handler that calls `name` with a fixed argument.
    pub fn bind_with(&self, name: &str, arg: impl Into<Value>) -> Handler {
        let arg = arg.into();
        match self.lookup(name) {
            Some(f) => Rc::new(move || f(&arg)),
            None => {
                log::warn!("binding unknown method `{name}`");
                Rc::new(|| {})
            }
        }
    }
}

struct InstanceInner<D: 'static, P: 'static> {
    spec: Rc<Spec<D, P>>,
    runtime: Runtime,
    root: ElementId,
    data: RefCell<D>,
    props: P,
    methods: Methods,
    scope: Scope,
    /// Owns whatever the last render pass mounted; replaced on every render.
    render_scope: RefCell<Scope>,
    renders: Cell<u64>,
    disposed: Cell<bool>,
}

/// A mounted component. Cloning shares the instance.
pub struct Instance<D: 'static, P: 'static = ()> {
    inner: Rc<InstanceInner<D, P>>,
}

impl<D: 'static, P: 'static> Clone for Instance<D, P> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<D: 'static, P: 'static> Instance<D, P> {
    pub fn name(&self) -> &str {
        &self.inner.spec.name
    }

    pub fn runtime(&self) -> &Runtime {
        &self.inner.runtime
    }

    pub fn root(&self) -> ElementId {
        self.inner.root
    }

    pub fn props(&self) -> &P {
        &self.inner.props
    }

    pub fn methods(&self) -> &Methods {
        &self.inner.methods
    }

    pub fn call(&self, name: &str) -> bool {
        self.inner.methods.call(name, &Value::Null)
    }

    pub fn call_with(&self, name: &str, arg: impl Into<Value>) -> bool {
        self.inner.methods.call(name, &arg.into())
    }

    pub fn data(&self) -> Ref<'_, D> {
        self.inner.data.borrow()
    }

    pub fn with_data<R>(&self, f: impl FnOnce(&D) -> R) -> R {
        f(&self.inner.data.borrow())
    }

    /// Writes through the data bag: mutate, then render once. Ignored after
    /// dispose.
    pub fn update(&self, f: impl FnOnce(&mut D)) {
        if self.is_disposed() {
            log::debug!("{}: write after dispose ignored", self.name());
            return;
        }
        f(&mut self.inner.data.borrow_mut());
        self.render_now();
    }

    pub fn set_data(&self, data: D) {
        self.update(|d| *d = data);
    }

    /// Renders again without touching data.
    pub fn refresh(&self) {
        self.render_now();
    }

    pub fn render_count(&self) -> u64 {
        self.inner.renders.get()
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }

    pub fn is_attached(&self) -> bool {
        self.inner.runtime.document.is_connected(self.inner.root)
    }

    pub fn inner_html(&self) -> String {
        self.inner.runtime.document.inner_html(self.inner.root)
    }

    pub fn outer_html(&self) -> String {
        self.inner.runtime.document.outer_html(self.inner.root)
    }

    /// Ties `d` to this instance's lifetime.
    pub fn own(&self, d: Dispose) {
        self.inner.scope.own(d);
    }

    /// Cleanups currently tied to this instance.
    pub fn pending_cleanups(&self) -> usize {
        self.inner.scope.pending()
    }

    /// Owns `cancel` until it runs. The returned handle cancels and lets go of
    /// the scope entry; so does [`Self::release`] on the shared slot.
    fn track(&self, cancel: Dispose, entry: Rc<Cell<Option<CleanupId>>>) -> Dispose {
        entry.set(Some(self.inner.scope.own(cancel.clone())));
        let weak = Rc::downgrade(&self.inner);
        Dispose::new(move || {
            cancel.run();
            if let Some(inner) = weak.upgrade() {
                Instance { inner }.release(&entry);
            }
        })
    }

    fn release(&self, entry: &Cell<Option<CleanupId>>) {
        if let Some(id) = entry.take() {
            self.inner.scope.release(id);
        }
    }

    /// One-shot timer owned by this instance. Once it fires it no longer
    /// holds a place in the instance's cleanups.
    pub fn set_timeout(&self, delay: Duration, f: impl FnOnce(&Self) + 'static) -> Dispose {
        let weak = Rc::downgrade(&self.inner);
        let entry: Rc<Cell<Option<CleanupId>>> = Rc::default();
        let ev = self.inner.runtime.event_loop.clone();
        let id = ev.set_timeout(delay, {
            let entry = entry.clone();
            move || {
                let Some(inner) = weak.upgrade() else { return };
                let inst = Instance { inner };
                inst.release(&entry);
                if !inst.is_disposed() {
                    f(&inst);
                }
            }
        });
        self.track(ev.cancel_handle(id), entry)
    }

    pub fn set_interval(&self, period: Duration, mut f: impl FnMut(&Self) + 'static) -> Dispose {
        let weak = Rc::downgrade(&self.inner);
        let ev = self.inner.runtime.event_loop.clone();
        let id = ev.set_interval(period, move || {
            if let Some(inner) = weak.upgrade() {
                let inst = Instance { inner };
                if !inst.is_disposed() {
                    f(&inst);
                }
            }
        });
        self.track(ev.cancel_handle(id), Rc::default())
    }

    /// Store subscription that lives as long as the instance.
    pub fn subscribe<S: State>(
        &self,
        store: &Store<S>,
        f: impl Fn(&Self, &S) + 'static,
    ) -> Dispose {
        let weak = Rc::downgrade(&self.inner);
        let d = store.subscribe(move |state| {
            if let Some(inner) = weak.upgrade() {
                let inst = Instance { inner };
                if !inst.is_disposed() {
                    f(&inst, state);
                }
            }
        });
        self.track(d, Rc::default())
    }

    pub fn watch<T: Clone + 'static>(
        &self,
        signal: &Signal<T>,
        f: impl Fn(&Self, &T) + 'static,
    ) -> Dispose {
        let weak = Rc::downgrade(&self.inner);
        let d = signal.watch(move |v| {
            if let Some(inner) = weak.upgrade() {
                let inst = Instance { inner };
                if !inst.is_disposed() {
                    f(&inst, v);
                }
            }
        });
        self.track(d, Rc::default())
    }

    /// Mounts a nested widget inside this instance's markup. Selectors are
    /// resolved within this instance only. The widget is disposed before the
    /// next render pass and when this instance goes away.
    pub fn mount_child<D2: 'static, P2: 'static>(
        &self,
        component: &Component<D2, P2>,
        target: impl Into<Target>,
        props: P2,
    ) -> Option<Instance<D2, P2>> {
        let doc = &self.inner.runtime.document;
        let container = match target.into() {
            Target::Element(el) => el,
            Target::Selector(sel) => match doc.query_selector_within(self.inner.root, &sel) {
                Ok(Some(el)) => el,
                Ok(None) => {
                    log::debug!("{}: no `{sel}` to mount {} into", self.name(), component.name());
                    return None;
                }
                Err(e) => {
                    log::warn!("{}: {e}", self.name());
                    return None;
                }
            },
        };
        let child = component.render(&self.inner.runtime, container, props);
        let owned = child.clone();
        self.inner
            .render_scope
            .borrow()
            .add_disposer(move || owned.dispose());
        Some(child)
    }

    /// Cancels every timer and subscription this instance registered,
    /// disposes nested widgets and frees the root element.
    pub fn dispose(&self) {
        if self.inner.disposed.replace(true) {
            return;
        }
        log::debug!("dispose {}", self.name());
        let render_scope = self.inner.render_scope.borrow().clone();
        render_scope.dispose();
        self.inner.scope.dispose();
        self.inner.runtime.document.remove(self.inner.root);
    }

    fn render_now(&self) {
        if self.is_disposed() {
            return;
        }
        let previous = self.inner.render_scope.replace(Scope::new());
        previous.dispose();

        let node = self.build_markup();
        if !self.inner.runtime.document.set_content(self.inner.root, &node) {
            log::debug!("{}: root element is gone, render dropped", self.name());
            return;
        }
        self.inner.renders.set(self.inner.renders.get() + 1);
        log::trace!("render {} #{}", self.name(), self.inner.renders.get());

        if let Some(hook) = self.inner.spec.after_render.clone() {
            hook(self);
        }
    }

    fn build_markup(&self) -> Node {
        let spec = &self.inner.spec;
        let f = match &spec.template {
            Template::Static(node) => return node.clone(),
            Template::Render(f) => f.clone(),
        };
        let data = self.inner.data.borrow();
        let props = &self.inner.props;
        let methods = &self.inner.methods;
        let Some(fallback) = spec.fallback.clone() else {
            return f(&data, methods, props);
        };
        match catch_unwind(AssertUnwindSafe(|| f(&data, methods, props))) {
            Ok(node) => node,
            Err(err) => {
                let message = if let Some(s) = err.downcast_ref::<String>() {
                    s.clone()
                } else if let Some(s) = err.downcast_ref::<&str>() {
                    s.to_string()
                } else {
                    "unknown panic".to_string()
                };
                log::error!("{}: template failed: {message}", spec.name);
                fallback(&message)
            }
        }
    }
}

/// Object-safe view of a mounted instance, used by the router.
pub trait Mounted {
    fn name(&self) -> &str;
    fn root(&self) -> ElementId;
    fn render_count(&self) -> u64;
    fn refresh(&self);
    fn dispose(&self);
    fn is_disposed(&self) -> bool;
}

impl<D: 'static, P: 'static> Mounted for Instance<D, P> {
    fn name(&self) -> &str {
        Instance::name(self)
    }

    fn root(&self) -> ElementId {
        Instance::root(self)
    }

    fn render_count(&self) -> u64 {
        Instance::render_count(self)
    }

    fn refresh(&self) {
        Instance::refresh(self)
    }

    fn dispose(&self) {
        Instance::dispose(self)
    }

    fn is_disposed(&self) -> bool {
        Instance::is_disposed(self)
    }
}

/// Something the router can mount with default props.
pub trait Page {
    fn name(&self) -> &str;
    fn mount(&self, runtime: &Runtime, target: Target) -> Rc<dyn Mounted>;
}

impl<D: 'static, P: Default + 'static> Page for Component<D, P> {
    fn name(&self) -> &str {
        Component::name(self)
    }

    fn mount(&self, runtime: &Runtime, target: Target) -> Rc<dyn Mounted> {
        Rc::new(self.render(runtime, target, P::default()))
    }
}
