//! Global application state.

use jobfinder_core::State;
use serde::{Deserialize, Serialize};

pub const INTERVIEWING: &str = "interviewing";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub email: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub user: Option<User>,
    pub is_authenticated: bool,
    /// The routed path, or `"interviewing"` while a practice interview runs.
    pub current_page: String,
    pub is_interviewing: bool,
    pub interview_difficulty: String,
    pub interview_industry: String,
    pub show_wellness_data: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            user: None,
            is_authenticated: false,
            current_page: "landing".into(),
            is_interviewing: false,
            interview_difficulty: "medium".into(),
            interview_industry: "general".into(),
            show_wellness_data: false,
        }
    }
}

impl AppState {
    pub fn in_interview(&self) -> bool {
        self.is_interviewing && self.current_page == INTERVIEWING
    }
}

/// A partial [`AppState`]: only the fields that are `Some` are written.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppStatePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<Option<User>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_authenticated: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_page: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_interviewing: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interview_difficulty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interview_industry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_wellness_data: Option<bool>,
}

impl AppStatePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user(mut self, user: Option<User>) -> Self {
        self.user = Some(user);
        self
    }

    pub fn is_authenticated(mut self, v: bool) -> Self {
        self.is_authenticated = Some(v);
        self
    }

    pub fn current_page(mut self, page: impl Into<String>) -> Self {
        self.current_page = Some(page.into());
        self
    }

    pub fn is_interviewing(mut self, v: bool) -> Self {
        self.is_interviewing = Some(v);
        self
    }

    pub fn interview_difficulty(mut self, v: impl Into<String>) -> Self {
        self.interview_difficulty = Some(v.into());
        self
    }

    pub fn interview_industry(mut self, v: impl Into<String>) -> Self {
        self.interview_industry = Some(v.into());
        self
    }

    pub fn show_wellness_data(mut self, v: bool) -> Self {
        self.show_wellness_data = Some(v);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl State for AppState {
    type Patch = AppStatePatch;

    fn apply(&mut self, patch: AppStatePatch) {
        if let Some(v) = patch.user {
            self.user = v;
        }
        if let Some(v) = patch.is_authenticated {
            self.is_authenticated = v;
        }
        if let Some(v) = patch.current_page {
            self.current_page = v;
        }
        if let Some(v) = patch.is_interviewing {
            self.is_interviewing = v;
        }
        if let Some(v) = patch.interview_difficulty {
            self.interview_difficulty = v;
        }
        if let Some(v) = patch.interview_industry {
            self.interview_industry = v;
        }
        if let Some(v) = patch.show_wellness_data {
            self.show_wellness_data = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobfinder_core::Store;
    use serde_json::json;

    #[test]
    fn starting_an_interview_touches_only_its_fields() {
        let store = Store::new(AppState::default());
        store.set_state(
            AppStatePatch::new()
                .is_interviewing(true)
                .current_page(INTERVIEWING),
        );
        let s = store.get_state();
        assert_eq!(
            *s,
            AppState {
                current_page: INTERVIEWING.into(),
                is_interviewing: true,
                ..AppState::default()
            }
        );
        assert!(s.in_interview());
    }

    #[test]
    fn wire_form_is_camel_case() {
        let v = serde_json::to_value(AppState::default()).unwrap();
        assert_eq!(
            v,
            json!({
                "user": null,
                "isAuthenticated": false,
                "currentPage": "landing",
                "isInterviewing": false,
                "interviewDifficulty": "medium",
                "interviewIndustry": "general",
                "showWellnessData": false,
            })
        );
    }

    #[test]
    fn patch_from_partial_json() {
        let patch: AppStatePatch =
            serde_json::from_value(json!({"showWellnessData": true})).unwrap();
        assert_eq!(patch, AppStatePatch::new().show_wellness_data(true));
        assert!(AppStatePatch::new().is_empty());
    }

    #[test]
    fn clearing_the_user_is_distinct_from_leaving_it() {
        let mut state = AppState {
            user: Some(User {
                name: "Ada".into(),
                email: "ada@example.com".into(),
            }),
            ..AppState::default()
        };
        state.apply(AppStatePatch::new().is_authenticated(true));
        assert!(state.user.is_some());
        state.apply(AppStatePatch::new().user(None));
        assert!(state.user.is_none());
    }
}
