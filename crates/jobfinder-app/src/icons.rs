use jobfinder_core::{Document, ElementId, Instance};

const READY: &str = "icon";

/// Turns `data-lucide` placeholders into styled icons. Already hydrated
/// placeholders are left alone; returns how many were new.
pub fn hydrate_icons(doc: &Document) -> usize {
    hydrate_within(doc, doc.document_element())
}

/// [`hydrate_icons`] limited to `scope`'s subtree, which need not be
/// connected yet.
pub fn hydrate_within(doc: &Document, scope: ElementId) -> usize {
    let placeholders = match doc.query_selector_all_within(scope, "[data-lucide]") {
        Ok(found) => found,
        Err(e) => {
            log::warn!("icon hydration: {e}");
            return 0;
        }
    };
    let mut hydrated = 0;
    for el in placeholders {
        if doc.has_class(el, READY) {
            continue;
        }
        let Some(name) = doc.attr(el, "data-lucide") else {
            continue;
        };
        doc.add_class(el, READY);
        doc.add_class(el, &format!("icon-{name}"));
        doc.set_attr(el, "aria-hidden", "true");
        hydrated += 1;
    }
    if hydrated > 0 {
        log::trace!("hydrated {hydrated} icon(s)");
    }
    hydrated
}

/// `after_render` hook for components whose markup carries icons. Runs
/// before the first mount, so it works on the instance's own subtree.
pub fn hydrate_after_render<D: 'static, P: 'static>(inst: &Instance<D, P>) {
    hydrate_within(&inst.runtime().document, inst.root());
}
