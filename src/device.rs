//! Terminal and machine capabilities, detected once at startup
//!
//! The profile decides whether spinners animate and how fast they tick.
//! It is computed in `main` and handed down through the command context.

use std::borrow::Cow;
use std::io::IsTerminal;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Rough capability tier, from available parallelism
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    Low,
    Standard,
    High,
}

/// What the current process can render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceProfile {
    /// stderr is a terminal
    pub interactive: bool,
    /// Running under a CI system
    pub ci: bool,
    /// Terminal cannot handle cursor movement (`TERM=dumb`)
    pub dumb_terminal: bool,
    /// Colors allowed (`NO_COLOR` unset)
    pub color: bool,
    pub cores: usize,
}

/// Spinner parameters derived from a [`DeviceProfile`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationSettings {
    pub enabled: bool,
    pub tick: Duration,
}

impl DeviceProfile {
    /// Inspect the real environment.
    pub fn detect() -> Self {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self::from_parts(|key| std::env::var(key).ok(), std::io::stderr().is_terminal(), cores)
    }

    /// Build a profile from explicit inputs.
    pub fn from_parts(env: impl Fn(&str) -> Option<String>, stderr_tty: bool, cores: usize) -> Self {
        let set = |key: &str| env(key).is_some_and(|v| !v.is_empty());

        Self {
            interactive: stderr_tty,
            ci: set("CI"),
            dumb_terminal: env("TERM").is_some_and(|t| t == "dumb"),
            color: !set("NO_COLOR"),
            cores: cores.max(1),
        }
    }

    pub fn class(&self) -> DeviceClass {
        match self.cores {
            0..=2 => DeviceClass::Low,
            3..=8 => DeviceClass::Standard,
            _ => DeviceClass::High,
        }
    }

    /// Spinner settings. `allowed` is the user's `animations` preference.
    pub fn animation(&self, allowed: bool) -> AnimationSettings {
        if !(allowed && self.interactive && !self.ci && !self.dumb_terminal) {
            return AnimationSettings::disabled();
        }

        let tick = match self.class() {
            DeviceClass::Low => Duration::from_millis(200),
            DeviceClass::Standard => Duration::from_millis(100),
            DeviceClass::High => Duration::from_millis(80),
        };

        AnimationSettings {
            enabled: true,
            tick,
        }
    }
}

impl AnimationSettings {
    /// No animation at all
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            tick: Duration::from_millis(100),
        }
    }

    /// A steady-ticking spinner on stderr, or a hidden bar when disabled.
    pub fn spinner(&self, message: impl Into<Cow<'static, str>>) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }

        let style = ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());

        let bar = ProgressBar::new_spinner();
        bar.set_style(style);
        bar.set_message(message);
        bar.enable_steady_tick(self.tick);
        bar
    }
}
