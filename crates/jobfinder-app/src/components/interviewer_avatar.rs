use jobfinder_core::markup::{self, Node};
use jobfinder_core::{Component, Instance};
use web_time::{Duration, SystemTime, UNIX_EPOCH};

use super::wellness_overview::{WellnessProps, random_unit, wellness_overview};
use crate::icons;

pub const CLOCK_PERIOD: Duration = Duration::from_secs(60);
pub const BACKDROP_PERIOD: Duration = Duration::from_secs(30);

const BACKDROPS: [&str; 3] = [
    "linear-gradient(to right, #e6e9f0 0%, #eef1f5 100%)",
    "linear-gradient(to right, #d7d2cc 0%, #304352 100%)",
    "linear-gradient(to top, #accbee 0%, #e7f0fd 100%)",
];

#[derive(Clone, Debug)]
pub struct AvatarProps {
    pub speaking: bool,
    pub size: u32,
    pub show_wellness_data: bool,
}

impl Default for AvatarProps {
    fn default() -> Self {
        Self {
            speaking: false,
            size: 400,
            show_wellness_data: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Mood {
    #[default]
    Listening,
    Thinking,
    Speaking,
}

impl Mood {
    pub fn as_str(self) -> &'static str {
        match self {
            Mood::Listening => "listening",
            Mood::Thinking => "thinking",
            Mood::Speaking => "speaking",
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct AvatarData {
    pub current_time: String,
    pub mood: Mood,
    pub backdrop: usize,
}

/// `HH:MM` for a number of seconds since midnight.
pub fn format_clock(secs: u64) -> String {
    let minutes = (secs / 60) % (24 * 60);
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

fn wall_clock() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    format_clock(secs)
}

fn header(time: &str) -> Node {
    markup::div()
        .class("avatar-header absolute top-0 left-0 right-0 flex justify-between items-center z-10")
        .child(
            markup::div()
                .class("flex items-center space-x-2")
                .child(markup::icon("video"))
                .child(markup::span().class("text-xs font-medium").child(markup::text("Interview in progress"))),
        )
        .child(
            markup::div()
                .class("flex items-center space-x-3")
                .child(markup::icon("clock"))
                .child(markup::span().class("avatar-clock text-xs").child(markup::text(time))),
        )
}

fn render(d: &AvatarData, _: &jobfinder_core::Methods, props: &AvatarProps) -> Node {
    let mut root = markup::div()
        .class("interviewer-avatar relative")
        .attr("data-mood", d.mood.as_str())
        .attr("style", format!("width: {0}px; height: {0}px; margin: 0 auto;", props.size));

    if props.show_wellness_data {
        root = root.child(
            markup::div().class("absolute top-0 left-0 w-full z-30").child(
                markup::div()
                    .class("wellness-panel rounded-md mb-2")
                    .child(
                        markup::div()
                            .class("wellness-header")
                            .child(markup::icon("heart-pulse"))
                            .child(
                                markup::h3()
                                    .class("text-base font-semibold text-white")
                                    .child(markup::text("Your Wellness Overview")),
                            ),
                    )
                    .child(markup::div().class("wellness-slot p-3 rounded-b-md")),
            ),
        );
    }

    let stage = markup::div()
        .class("avatar-stage rounded-lg overflow-hidden shadow-lg")
        .attr(
            "style",
            format!("width: 100%; height: 100%; background: {};", BACKDROPS[d.backdrop % BACKDROPS.len()]),
        )
        .child(header(&d.current_time))
        .child(markup::div().class("avatar-canvas w-full h-full"))
        .child(
            markup::div()
                .class("avatar-mic absolute bottom-3 left-3 rounded-full p-2 z-10")
                .child(markup::icon(if props.speaking { "mic" } else { "mic-off" })),
        )
        .child(
            markup::div()
                .class("avatar-badge absolute bottom-3 right-3 rounded-full text-xs font-medium z-10")
                .child(markup::text("AI Interviewer")),
        );
    root = root.child(stage);

    if props.speaking {
        root = root.child(
            markup::div().class("speaking-indicator absolute bottom-2 left-0 right-0 flex justify-center z-20").child(
                markup::div()
                    .class("px-3 py-1 rounded-full text-xs font-medium animate-pulse")
                    .child(markup::span().class("w-2 h-2 bg-white rounded-full animate-pulse"))
                    .child(markup::text("Speaking...")),
            ),
        );
    }
    root
}

fn mount_wellness(inst: &Instance<AvatarData, AvatarProps>) {
    icons::hydrate_after_render(inst);
    if !inst.props().show_wellness_data {
        return;
    }
    let props = WellnessProps {
        hide_title: true,
        hide_card: true,
        force_connected: true,
        vitals: None,
    };
    inst.mount_child(&wellness_overview(), ".wellness-slot", props);
}

/// The interviewer's video tile. With `show_wellness_data` it carries a
/// live wellness panel, rebuilt on every render.
pub fn interviewer_avatar() -> Component<AvatarData, AvatarProps> {
    Component::<AvatarData, AvatarProps>::new("interviewer-avatar")
        .data_from_props(|p: &AvatarProps| AvatarData {
            current_time: wall_clock(),
            mood: if p.speaking {
                Mood::Speaking
            } else if random_unit() > 0.7 {
                Mood::Thinking
            } else {
                Mood::Listening
            },
            backdrop: 0,
        })
        .template(render)
        .method("updateTime", |inst, _| inst.update(|d| d.current_time = wall_clock()))
        .after_render(mount_wellness)
        .mounted(|inst| {
            inst.set_interval(CLOCK_PERIOD, |inst| {
                inst.call("updateTime");
            });
            inst.set_interval(BACKDROP_PERIOD, |inst| {
                inst.update(|d| d.backdrop = (d.backdrop + 1) % BACKDROPS.len())
            });
            Vec::new()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobfinder_core::Runtime;

    #[test]
    fn clock_label() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(9 * 3600 + 5 * 60 + 59), "09:05");
        assert_eq!(format_clock(86_400 + 23 * 3600), "23:00");
    }

    #[test]
    fn speaking_avatar_shows_indicator() {
        let rt = Runtime::headless();
        let props = AvatarProps {
            speaking: true,
            ..AvatarProps::default()
        };
        let avatar = interviewer_avatar().render(&rt, rt.document.body(), props);
        assert_eq!(avatar.with_data(|d| d.mood), Mood::Speaking);
        assert!(rt.document.query_selector(".speaking-indicator").unwrap().is_some());
        assert!(rt.document.query_selector(".icon-mic").unwrap().is_some());
        assert!(rt.document.query_selector(".wellness-slot").unwrap().is_none());
    }

    #[test]
    fn wellness_panel_is_rebuilt_per_render() {
        let rt = Runtime::headless();
        let props = AvatarProps {
            show_wellness_data: true,
            ..AvatarProps::default()
        };
        let avatar = interviewer_avatar().render(&rt, rt.document.body(), props);
        let panels = || rt.document.query_selector_all(".wellness-overview").unwrap().len();
        assert_eq!(panels(), 1);
        // avatar clock + backdrop + wellness monitor
        assert_eq!(rt.event_loop.pending_timers(), 3);

        rt.event_loop.advance(BACKDROP_PERIOD);
        assert_eq!(avatar.with_data(|d| d.backdrop), 1);
        assert_eq!(panels(), 1);
        assert_eq!(rt.event_loop.pending_timers(), 3);

        avatar.dispose();
        assert_eq!(panels(), 0);
        assert_eq!(rt.event_loop.pending_timers(), 0);
    }
}
