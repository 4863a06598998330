//! Selective entry/exit call tracing for an HTTP handler layer.
//!
//! Handlers are registered on a [`Router`](router::Router) together with the
//! static [`CallSite`](descriptor::CallSite) they implement. An
//! [`EligibilityRule`](rule::EligibilityRule) picks the sites worth tracing
//! once, at registration; the picked handlers are wrapped by a
//! [`CallInterceptor`](interceptor::CallInterceptor) that logs an entry and an
//! exit record per call while the shared
//! [`VerbosityGate`](gate::VerbosityGate) is on, and costs a single atomic
//! load while it is off. [`TraceControl`](control::TraceControl) flips the
//! gate at runtime.

pub mod body;
pub mod config;
pub mod control;
pub mod descriptor;
pub mod error;
pub mod gate;
pub mod handler;
pub mod interceptor;
pub mod middleware;
pub mod params;
pub mod render;
pub mod responder;
pub mod router;
pub mod rule;
pub mod server;
pub mod tracing;
pub mod types;

pub use server::{serve, serve_with_shutdown};
