//! Live on/off switch for handler call tracing.
//!
//! The [`VerbosityGate`] holds the current [`TraceLevel`] in a single atomic
//! word. Every wrapped call reads it; only the control operations write it.
//! A gate is created once at start-up (always OFF) and shared through `Arc`.

use std::{
    fmt,
    str::FromStr,
    sync::atomic::{AtomicBool, Ordering},
};

use serde::Serialize;

/// Trace verbosity for the handler layer.
///
/// `Info` suppresses entry/exit records, `Debug` emits them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TraceLevel {
    #[default]
    Info,
    Debug,
}

impl TraceLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            TraceLevel::Info => "INFO",
            TraceLevel::Debug => "DEBUG",
        }
    }

    #[inline]
    pub fn is_active(self) -> bool {
        matches!(self, TraceLevel::Debug)
    }
}

impl fmt::Display for TraceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a textual level is not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLevel(pub String);

impl fmt::Display for UnknownLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown trace level `{}`", self.0)
    }
}

impl std::error::Error for UnknownLevel {}

impl FromStr for TraceLevel {
    type Err = UnknownLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" | "on" | "enabled" | "enable" | "true" => Ok(TraceLevel::Debug),
            "info" | "off" | "disabled" | "disable" | "false" => Ok(TraceLevel::Info),
            _ => Err(UnknownLevel(s.to_string())),
        }
    }
}

/// Shared cell holding the current trace level.
#[derive(Debug, Default)]
pub struct VerbosityGate {
    enabled: AtomicBool,
}

impl VerbosityGate {
    /// Creates a gate in the OFF state.
    pub fn new() -> Self {
        Self {
            enabled: AtomicBool::new(false),
        }
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    /// Hot-path check performed by every wrapped call.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    pub fn level(&self) -> TraceLevel {
        if self.is_enabled() {
            TraceLevel::Debug
        } else {
            TraceLevel::Info
        }
    }

    pub fn set_level(&self, level: TraceLevel) {
        self.set_enabled(level.is_active());
    }

    /// Name of the current level, as shown by the management surface.
    pub fn status_text(&self) -> &'static str {
        self.level().as_str()
    }
}
