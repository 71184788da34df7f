//! Wellness monitor widget: connection handshake, then a slow random walk
//! of the vitals.

use jobfinder_core::markup::{self, Node};
use jobfinder_core::{Component, Instance};
use web_time::Duration;

use crate::icons;

pub const PROBE_DELAY: Duration = Duration::from_millis(1500);
pub const CONNECT_DELAY: Duration = Duration::from_millis(2000);
pub const MONITOR_PERIOD: Duration = Duration::from_millis(5000);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vitals {
    pub stress_level: f64,
    pub heart_rate: f64,
    pub focus: f64,
    pub energy: f64,
}

impl Default for Vitals {
    fn default() -> Self {
        Self {
            stress_level: 42.0,
            heart_rate: 75.0,
            focus: 68.0,
            energy: 55.0,
        }
    }
}

impl Vitals {
    /// One monitoring step. `unit` yields samples in `[0, 1)`.
    pub fn step(&mut self, unit: &mut impl FnMut() -> f64) {
        let mut walk = |v: f64, spread: f64, lo: f64, hi: f64| {
            (v + unit() * spread - spread / 2.0).clamp(lo, hi)
        };
        self.stress_level = walk(self.stress_level, 10.0, 30.0, 80.0);
        self.heart_rate = walk(self.heart_rate, 6.0, 60.0, 100.0);
        self.focus = walk(self.focus, 10.0, 40.0, 90.0);
        self.energy = walk(self.energy, 8.0, 30.0, 90.0);
    }
}

#[derive(Clone, Debug, Default)]
pub struct WellnessProps {
    pub hide_title: bool,
    pub hide_card: bool,
    /// Skip the handshake and start monitoring right away.
    pub force_connected: bool,
    pub vitals: Option<Vitals>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WellnessData {
    pub is_connected: bool,
    pub connecting: bool,
    pub monitoring: bool,
    pub vitals: Vitals,
}

/// A sample in `[0, 1)` from the OS generator; the midpoint if it is
/// unavailable, which leaves the vitals where they are.
pub fn random_unit() -> f64 {
    match getrandom::u64() {
        Ok(bits) => (bits >> 11) as f64 / (1u64 << 53) as f64,
        Err(e) => {
            log::debug!("no randomness available: {e}");
            0.5
        }
    }
}

pub fn stress_color(value: f64) -> &'static str {
    if value < 30.0 {
        "bg-green-500"
    } else if value < 60.0 {
        "bg-yellow-500"
    } else {
        "bg-red-500"
    }
}

fn frame(props: &WellnessProps, title: &str, body: Node) -> Node {
    let mut card = markup::div().class("wellness-overview");
    if !props.hide_card {
        card = card.class("card p-4");
    }
    if !props.hide_title {
        card = card.child(
            markup::h3()
                .class("text-lg font-semibold mb-4")
                .child(markup::text(title)),
        );
    }
    card.child(body)
}

fn meter(label: &str, value: f64, unit: &str, bar: Node) -> Node {
    markup::div()
        .class("wellness-metric")
        .attr("data-metric", label.to_ascii_lowercase().replace(' ', "-"))
        .child(
            markup::div()
                .class("flex justify-between mb-1")
                .child(markup::span().class("text-sm font-medium").child(markup::text(label)))
                .child(
                    markup::span()
                        .class("metric-value text-sm font-medium")
                        .child(markup::text(format!("{}{unit}", value.round()))),
                ),
        )
        .child(bar)
}

fn bar(value: f64, color: &str) -> Node {
    markup::div().class("meter relative h-2 rounded-full overflow-hidden").child(
        markup::div()
            .class("meter-fill absolute top-0 left-0 h-full rounded-full")
            .class(color)
            .attr("style", format!("width: {}%", value.round())),
    )
}

fn heart_beats(rate: f64) -> Node {
    let beats = (rate / 10.0).floor() as usize;
    markup::div().class("flex gap-1").children((0..beats).map(|i| {
        markup::div()
            .class("beat h-4 w-1 bg-red-500 rounded-full animate-pulse")
            .attr("style", format!("animation-delay: {:.1}s", i as f64 * 0.1))
    }))
}

fn render(d: &WellnessData, m: &jobfinder_core::Methods, props: &WellnessProps) -> Node {
    let connected = d.is_connected || props.force_connected;
    if d.connecting && !connected {
        return frame(
            props,
            "Wellness Monitoring",
            markup::div()
                .class("wellness-connecting flex flex-col items-center p-6 text-center")
                .child(markup::div().class("spinner animate-spin rounded-full h-8 w-8"))
                .child(
                    markup::p()
                        .class("text-muted-foreground")
                        .child(markup::text("Connecting to wellness monitor...")),
                ),
        );
    }
    if !connected {
        return frame(
            props,
            "Wellness Monitoring",
            markup::div()
                .class("wellness-disconnected flex flex-col items-center p-6 text-center")
                .child(markup::icon("heart-off"))
                .child(
                    markup::p()
                        .class("text-muted-foreground mb-4")
                        .child(markup::text("No wellness monitor connected")),
                )
                .child(
                    markup::button()
                        .class("connect btn btn-outline")
                        .on_click(m.bind("connect"))
                        .child(markup::text("Connect Monitor")),
                ),
        );
    }
    let v = &d.vitals;
    frame(
        props,
        "Your Wellness Overview",
        markup::div()
            .class("wellness-metrics space-y-4")
            .child(meter(
                "Stress Level",
                v.stress_level,
                "%",
                bar(v.stress_level, stress_color(v.stress_level)),
            ))
            .child(meter("Heart Rate", v.heart_rate, " bpm", heart_beats(v.heart_rate)))
            .child(meter("Focus", v.focus, "%", bar(v.focus, "bg-blue-500")))
            .child(meter("Energy", v.energy, "%", bar(v.energy, "bg-yellow-500"))),
    )
}

fn start_monitoring(inst: &Instance<WellnessData, WellnessProps>) {
    if inst.with_data(|d| d.monitoring) {
        return;
    }
    inst.update(|d| d.monitoring = true);
    inst.set_interval(MONITOR_PERIOD, |inst| {
        inst.update(|d| d.vitals.step(&mut random_unit));
    });
}

pub fn wellness_overview() -> Component<WellnessData, WellnessProps> {
    Component::<WellnessData, WellnessProps>::new("wellness-overview")
        .data_from_props(|p: &WellnessProps| WellnessData {
            is_connected: p.force_connected,
            connecting: !p.force_connected,
            monitoring: false,
            vitals: p.vitals.unwrap_or_default(),
        })
        .template(render)
        .method("connect", |inst, _| {
            inst.update(|d| d.connecting = true);
            inst.set_timeout(CONNECT_DELAY, |inst| {
                inst.update(|d| {
                    d.is_connected = true;
                    d.connecting = false;
                });
                start_monitoring(inst);
            });
        })
        .after_render(icons::hydrate_after_render)
        .mounted(|inst| {
            if inst.props().force_connected {
                start_monitoring(inst);
            } else {
                inst.set_timeout(PROBE_DELAY, |inst| inst.update(|d| d.connecting = false));
            }
            Vec::new()
        })
}

impl Default for WellnessData {
    fn default() -> Self {
        Self {
            is_connected: false,
            connecting: true,
            monitoring: false,
            vitals: Vitals::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobfinder_core::Runtime;

    fn metric(rt: &Runtime, name: &str) -> String {
        let el = rt
            .document
            .query_selector(&format!(r#"[data-metric="{name}"]"#))
            .unwrap()
            .unwrap();
        rt.document.text_content(el)
    }

    #[test]
    fn handshake_then_manual_connect() {
        let rt = Runtime::headless();
        let w = wellness_overview().render(&rt, rt.document.body(), WellnessProps::default());
        assert!(rt.document.query_selector(".wellness-connecting").unwrap().is_some());

        rt.event_loop.advance(PROBE_DELAY);
        assert!(rt.document.query_selector(".wellness-disconnected").unwrap().is_some());

        let connect = rt.document.query_selector(".connect").unwrap().unwrap();
        rt.document.click(connect);
        assert!(rt.document.query_selector(".wellness-connecting").unwrap().is_some());

        rt.event_loop.advance(CONNECT_DELAY);
        assert!(w.with_data(|d| d.is_connected && d.monitoring));
        assert!(metric(&rt, "stress-level").contains("42%"));
        assert_eq!(rt.event_loop.pending_timers(), 1);
    }

    #[test]
    fn forced_connection_monitors_immediately() {
        let rt = Runtime::headless();
        let props = WellnessProps {
            hide_title: true,
            hide_card: true,
            force_connected: true,
            vitals: Some(Vitals {
                heart_rate: 90.0,
                ..Vitals::default()
            }),
        };
        let w = wellness_overview().render(&rt, rt.document.body(), props);
        assert!(rt.document.query_selector("h3").unwrap().is_none());
        assert!(metric(&rt, "heart-rate").contains("90 bpm"));
        assert_eq!(rt.document.query_selector_all(".beat").unwrap().len(), 9);

        let before = w.render_count();
        rt.event_loop.advance(MONITOR_PERIOD * 3);
        assert_eq!(w.render_count(), before + 3);

        w.dispose();
        assert_eq!(rt.event_loop.pending_timers(), 0);
    }

    #[test]
    fn vitals_stay_in_bounds() {
        let mut v = Vitals::default();
        let mut high = || 0.999;
        for _ in 0..100 {
            v.step(&mut high);
        }
        assert_eq!(v.stress_level, 80.0);
        assert_eq!(v.heart_rate, 100.0);
        let mut low = || 0.0;
        for _ in 0..100 {
            v.step(&mut low);
        }
        assert_eq!(v.focus, 40.0);
        assert_eq!(v.energy, 30.0);
    }

    #[test]
    fn stress_bands() {
        assert_eq!(stress_color(10.0), "bg-green-500");
        assert_eq!(stress_color(45.0), "bg-yellow-500");
        assert_eq!(stress_color(75.0), "bg-red-500");
    }
}
