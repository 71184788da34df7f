//! Chrome and widgets shared by several pages.

pub mod interviewer_avatar;
pub mod nav_bar;
pub mod theme_toggle;
pub mod wellness_overview;

pub use interviewer_avatar::{AvatarProps, interviewer_avatar};
pub use nav_bar::nav_bar;
pub use theme_toggle::theme_toggle;
pub use wellness_overview::{Vitals, WellnessProps, wellness_overview};
