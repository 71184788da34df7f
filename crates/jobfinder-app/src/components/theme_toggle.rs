use jobfinder_core::Component;
use jobfinder_core::markup;

use crate::AppContext;
use crate::icons;

/// Light/dark switch. Re-renders whenever the theme changes, whoever
/// changed it.
pub fn theme_toggle(ctx: &AppContext) -> Component<()> {
    let theme = ctx.theme.clone();
    let toggler = ctx.theme.clone();
    let watched = ctx.theme.clone();

    Component::<()>::new("theme-toggle")
        .template(move |_, m, _| {
            let dark = theme.is_dark();
            markup::button()
                .class("theme-toggle btn btn-ghost rounded-full p-2")
                .attr("aria-pressed", dark.to_string())
                .attr("title", format!("Switch to {} mode", theme.theme().toggled()))
                .on_click(m.bind("toggleTheme"))
                .child(
                    markup::div().class("theme-toggle-track relative w-10 h-5 rounded-full").child(
                        markup::div()
                            .class("theme-toggle-knob absolute left-0 top-0 w-5 h-5 rounded-full")
                            .class(if dark { "translate-x-5" } else { "translate-x-0" })
                            .child(markup::icon(if dark { "moon" } else { "sun" })),
                    ),
                )
        })
        .method("toggleTheme", move |_, _| {
            let now = toggler.toggle();
            log::debug!("theme toggled to {now}");
        })
        .after_render(icons::hydrate_after_render)
        .mounted(move |inst| vec![inst.watch(watched.signal(), |inst, _| inst.refresh())])
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobfinder_core::{THEME_KEY, Theme};

    #[test]
    fn clicking_toggles_and_rerenders_once() {
        let ctx = AppContext::headless();
        ctx.theme.init();
        let doc = ctx.runtime.document.clone();
        let toggle = theme_toggle(&ctx).render(&ctx.runtime, doc.body(), ());
        assert!(doc.query_selector(".icon-moon").unwrap().is_some());

        let button = doc.query_selector(".theme-toggle").unwrap().unwrap();
        doc.click(button);

        assert_eq!(ctx.theme.theme(), Theme::Light);
        assert_eq!(toggle.render_count(), 2);
        assert!(doc.query_selector(".icon-sun").unwrap().is_some());
        assert_eq!(ctx.runtime.preferences.get(THEME_KEY).as_deref(), Some("light"));
    }

    #[test]
    fn follows_external_theme_changes() {
        let ctx = AppContext::headless();
        ctx.theme.init();
        let doc = ctx.runtime.document.clone();
        let toggle = theme_toggle(&ctx).render(&ctx.runtime, doc.body(), ());
        ctx.runtime.color_scheme.set(Theme::Light);
        assert_eq!(toggle.render_count(), 2);
        assert!(doc.query_selector(".theme-toggle-knob.translate-x-0").unwrap().is_some());
    }
}
