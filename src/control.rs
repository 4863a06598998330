//! Operator controls for call tracing.
//!
//! [`TraceControl`] is the management surface over a [`VerbosityGate`].
//! Transports call its three operations; [`TraceControl::mount`] exposes them
//! as HTTP admin routes:
//!
//! | Route                       | Effect                          |
//! |-----------------------------|---------------------------------|
//! | `GET  {prefix}`             | current status                  |
//! | `POST {prefix}/enable`      | tracing on                      |
//! | `POST {prefix}/disable`     | tracing off                     |
//! | `PUT  {prefix}/{level}`     | set by name, ignored if unknown |
//!
//! Every route answers `200` with `{"status":"<LEVEL>"}`.

use std::sync::Arc;

use anyhow::Result;
use http::Method;
use serde::Serialize;

use crate::{
    gate::{TraceLevel, VerbosityGate},
    params::PathParams,
    responder::Json,
    router::Router,
    types::Request,
};

pub const DEFAULT_ADMIN_PREFIX: &str = "/admin/tracing";

#[derive(Clone, Debug)]
pub struct TraceControl {
    gate: Arc<VerbosityGate>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct StatusBody {
    pub status: &'static str,
}

impl TraceControl {
    pub fn new(gate: Arc<VerbosityGate>) -> Self {
        Self { gate }
    }

    pub fn enable_tracing(&self) {
        self.gate.set_enabled(true);
        tracing::info!(status = self.get_status(), "handler call tracing enabled");
    }

    pub fn disable_tracing(&self) {
        self.gate.set_enabled(false);
        tracing::info!(status = self.get_status(), "handler call tracing disabled");
    }

    pub fn get_status(&self) -> &'static str {
        self.gate.status_text()
    }

    /// Sets the level named by `input`; unknown names change nothing.
    ///
    /// Returns the status after the call.
    pub fn apply(&self, input: &str) -> &'static str {
        match input.parse::<TraceLevel>() {
            Ok(TraceLevel::Debug) => self.enable_tracing(),
            Ok(TraceLevel::Info) => self.disable_tracing(),
            Err(err) => tracing::warn!(status = self.get_status(), "ignored tracing control: {err}"),
        }
        self.get_status()
    }

    fn status(&self) -> Json<StatusBody> {
        Json(StatusBody {
            status: self.get_status(),
        })
    }

    /// Registers the admin routes under `prefix`. They are never traced.
    pub fn mount(&self, router: &mut Router, prefix: &str) -> Result<()> {
        let prefix = prefix.trim_end_matches('/');
        let root = if prefix.is_empty() { "/" } else { prefix };

        let control = self.clone();
        router.route_untraced(Method::GET, root, move |_req: Request| {
            let control = control.clone();
            async move { control.status() }
        })?;

        let control = self.clone();
        router.route_untraced(Method::POST, &format!("{prefix}/enable"), move |_req: Request| {
            let control = control.clone();
            async move {
                control.enable_tracing();
                control.status()
            }
        })?;

        let control = self.clone();
        router.route_untraced(Method::POST, &format!("{prefix}/disable"), move |_req: Request| {
            let control = control.clone();
            async move {
                control.disable_tracing();
                control.status()
            }
        })?;

        let control = self.clone();
        router.route_untraced(Method::PUT, &format!("{prefix}/{{level}}"), move |req: Request| {
            let control = control.clone();
            let level = req
                .extensions()
                .get::<PathParams>()
                .and_then(|p| p.get("level"))
                .unwrap_or_default()
                .to_owned();
            async move {
                control.apply(&level);
                control.status()
            }
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn control() -> TraceControl {
        TraceControl::new(Arc::new(VerbosityGate::new()))
    }

    #[test]
    fn defaults_to_info() {
        assert_eq!(control().get_status(), "INFO");
    }

    #[test]
    fn enable_twice_stays_on() {
        let control = control();
        control.enable_tracing();
        assert_eq!(control.get_status(), "DEBUG");
        control.enable_tracing();
        assert_eq!(control.get_status(), "DEBUG");
    }

    #[test]
    fn disable_turns_off() {
        let control = control();
        control.enable_tracing();
        control.disable_tracing();
        assert_eq!(control.get_status(), "INFO");
    }

    #[test]
    fn apply_ignores_unknown_levels() {
        let control = control();
        assert_eq!(control.apply("debug"), "DEBUG");
        assert_eq!(control.apply("loud"), "DEBUG");
        assert_eq!(control.apply(""), "DEBUG");
        assert_eq!(control.apply("INFO"), "INFO");
    }

    #[test]
    fn shares_the_gate() {
        let gate = Arc::new(VerbosityGate::new());
        let control = TraceControl::new(gate.clone());
        control.enable_tracing();
        assert!(gate.is_enabled());
    }
}
