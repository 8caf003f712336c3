use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Shortcut {
    /// Ctrl+R
    Refresh,
    /// Ctrl+S
    Save,
    /// Escape
    Dismiss,
}

impl Shortcut {
    pub fn from_key(ctrl: bool, key: &str) -> Option<Self> {
        match (ctrl, key) {
            (true, "r") => Some(Shortcut::Refresh),
            (true, "s") => Some(Shortcut::Save),
            (_, "Escape") => Some(Shortcut::Dismiss),
            _ => None,
        }
    }

    /// Whether the browser's own binding for the combination must be suppressed.
    pub fn prevents_default(&self) -> bool {
        matches!(self, Shortcut::Refresh | Shortcut::Save)
    }
}

impl fmt::Display for Shortcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shortcut::Refresh => write!(f, "refresh"),
            Shortcut::Save => write!(f, "save"),
            Shortcut::Dismiss => write!(f, "dismiss"),
        }
    }
}

impl FromStr for Shortcut {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "refresh" => Ok(Shortcut::Refresh),
            "save" => Ok(Shortcut::Save),
            "dismiss" => Ok(Shortcut::Dismiss),
            other => Err(format!("unknown shortcut {other:?}")),
        }
    }
}

/// Page-provided actions for the shortcuts. Only registered ones run.
#[derive(Default)]
pub struct ShortcutHooks {
    refresh: Option<Rc<dyn Fn()>>,
    save: Option<Rc<dyn Fn()>>,
}

impl ShortcutHooks {
    pub fn on_refresh(&mut self, handler: impl Fn() + 'static) {
        self.refresh = Some(Rc::new(handler));
    }

    pub fn on_save(&mut self, handler: impl Fn() + 'static) {
        self.save = Some(Rc::new(handler));
    }

    pub fn handler(&self, shortcut: Shortcut) -> Option<Rc<dyn Fn()>> {
        match shortcut {
            Shortcut::Refresh => self.refresh.clone(),
            Shortcut::Save => self.save.clone(),
            Shortcut::Dismiss => None,
        }
    }
}
