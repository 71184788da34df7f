use std::rc::Rc;

use jobfinder_core::{FilePreferences, PreferenceStore, Runtime, Store, ThemeManager};
use jobfinder_navigation::Location;

use crate::api::{JobService, MockJobService};
use crate::config::AppConfig;
use crate::state::{AppState, AppStatePatch};

/// Everything a component may reach for, passed down explicitly instead of
/// living in globals.
#[derive(Clone)]
pub struct AppContext {
    pub runtime: Runtime,
    pub store: Store<AppState>,
    pub theme: Rc<ThemeManager>,
    pub location: Location,
    pub jobs: Rc<dyn JobService>,
    pub config: Rc<AppConfig>,
}

impl AppContext {
    pub fn new(runtime: Runtime, config: AppConfig) -> Self {
        Self {
            store: Store::new(AppState::default()),
            theme: ThemeManager::new(&runtime),
            location: Location::new(&runtime),
            jobs: Rc::new(MockJobService::new()),
            config: Rc::new(config),
            runtime,
        }
    }

    /// Headless runtime with in-memory preferences and default config.
    pub fn headless() -> Self {
        Self::new(Runtime::headless(), AppConfig::default())
    }

    /// Builds the runtime the config asks for: file preferences when a path
    /// is configured.
    pub fn from_config(config: AppConfig) -> jobfinder_core::Result<Self> {
        let runtime = match &config.preferences_path {
            Some(path) => {
                let prefs: Rc<dyn PreferenceStore> = Rc::new(FilePreferences::open(path)?);
                Runtime::with_preferences(prefs)
            }
            None => Runtime::headless(),
        };
        Ok(Self::new(runtime, config))
    }

    pub fn with_jobs(mut self, jobs: Rc<dyn JobService>) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn state(&self) -> Rc<AppState> {
        self.store.get_state()
    }

    pub fn set_state(&self, patch: AppStatePatch) {
        self.store.set_state(patch);
    }

    /// Hash navigation, what `href="#/path"` links and buttons do.
    pub fn navigate(&self, path: &str) {
        self.location.set_hash(path);
    }
}
