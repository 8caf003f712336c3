use crate::api::ApiClient;
use crate::config::ConsoleOptions;
use crate::monitor::ConnectionMonitor;
use crate::notify::Notifier;
use crate::platform::{Platform, Scheduler, Surface, TimerHandle};
use crate::shortcuts::{Shortcut, ShortcutHooks};
use crate::storage::LocalStore;
use crate::types::{Severity, UserPreferences};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, info, warn};

pub const WELCOME_MESSAGE: &str = "Web interface loaded";
pub const REFRESHED_MESSAGE: &str = "Dashboard refreshed";

/// One page's worth of console state: the notification slot, the poll, the
/// registered shortcut handlers and the loaded preferences.
pub struct Console {
    options: Rc<ConsoleOptions>,
    surface: Rc<dyn Surface>,
    scheduler: Rc<dyn Scheduler>,
    notifier: Notifier,
    api: ApiClient,
    monitor: ConnectionMonitor,
    store: LocalStore,
    hooks: RefCell<ShortcutHooks>,
    preferences: RefCell<UserPreferences>,
    welcome: RefCell<Option<TimerHandle>>,
}

impl Console {
    pub fn new(platform: Platform, options: ConsoleOptions) -> Self {
        let options = Rc::new(options);
        let notifier = Notifier::new(
            platform.surface.clone(),
            platform.scheduler.clone(),
            options.fade_ms,
        );
        let api = ApiClient::new(platform.transport.clone(), notifier.clone(), options.clone());
        let monitor = ConnectionMonitor::new(
            platform.transport.clone(),
            platform.scheduler.clone(),
            platform.surface.clone(),
            notifier.clone(),
            options.clone(),
        );

        Self {
            options,
            surface: platform.surface,
            scheduler: platform.scheduler,
            notifier,
            api,
            monitor,
            store: LocalStore::new(platform.store),
            hooks: RefCell::default(),
            preferences: RefCell::default(),
            welcome: RefCell::new(None),
        }
    }

    pub fn start(&self) {
        info!("touch panel web interface loaded");

        if !self.surface.ensure_container() {
            warn!("could not create message container");
        }

        let prefs = self.store.load_user_preferences();
        debug!(?prefs, "user preferences loaded");
        *self.preferences.borrow_mut() = prefs;

        self.monitor.start_connection_monitoring();

        let notifier = self.notifier.clone();
        let duration = self.options.welcome_duration_ms;
        let handle = self.scheduler.timeout(
            self.options.welcome_delay_ms,
            Box::new(move || notifier.success(WELCOME_MESSAGE, duration)),
        );
        *self.welcome.borrow_mut() = Some(handle);
    }

    pub fn stop(&self) {
        self.monitor.stop_connection_monitoring();
        self.welcome.borrow_mut().take();
        self.notifier.clear_messages();
        debug!("console stopped");
    }

    pub fn handle_shortcut(&self, shortcut: Shortcut) {
        debug!(%shortcut, "shortcut pressed");
        match shortcut {
            Shortcut::Dismiss => self.notifier.clear_messages(),
            Shortcut::Refresh => {
                let ran = self.run_hook(shortcut);
                if ran {
                    self.notifier.info(REFRESHED_MESSAGE, self.options.message_duration_ms);
                }
            }
            Shortcut::Save => {
                self.run_hook(shortcut);
            }
        }
    }

    fn run_hook(&self, shortcut: Shortcut) -> bool {
        // released before the call so a handler may register others
        let handler = self.hooks.borrow().handler(shortcut);
        match handler {
            Some(handler) => {
                handler();
                true
            }
            None => false,
        }
    }

    pub fn on_refresh(&self, handler: impl Fn() + 'static) {
        self.hooks.borrow_mut().on_refresh(handler);
    }

    pub fn on_save(&self, handler: impl Fn() + 'static) {
        self.hooks.borrow_mut().on_save(handler);
    }

    pub fn show_message(&self, message: &str, severity: Severity, duration_ms: Option<u32>) {
        let duration = duration_ms.unwrap_or(self.options.message_duration_ms);
        self.notifier.show_message(message, severity, duration);
    }

    pub fn clear_messages(&self) {
        self.notifier.clear_messages();
    }

    pub fn preferences(&self) -> UserPreferences {
        self.preferences.borrow().clone()
    }

    pub fn save_preferences(&self, prefs: UserPreferences) -> bool {
        let saved = self.store.save_user_preferences(&prefs);
        *self.preferences.borrow_mut() = prefs;
        saved
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn monitor(&self) -> &ConnectionMonitor {
        &self.monitor
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }
}

impl Drop for Console {
    fn drop(&mut self) {
        self.stop();
    }
}
