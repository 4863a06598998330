//! Entry/exit records around wrapped calls.
//!
//! [`CallInterceptor`] brackets a call with two hooks. Each hook first checks
//! the [`VerbosityGate`]; when tracing is off that check is all it does. When
//! on, the call is rendered and handed to a [`TraceSink`]. Whatever goes wrong
//! on the diagnostic path is reported on [`FALLBACK_TARGET`] and dropped; the
//! wrapped call's own result, error or panic passes through untouched.

use std::{
    fmt,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
    thread,
};

use crate::{
    descriptor::CallDescriptor,
    error::TraceError,
    gate::VerbosityGate,
    render::render_call,
};

/// Logger target for entry/exit records.
pub const TRACE_TARGET: &str = "request_tracing";
/// Logger target for failures swallowed by the interceptor.
pub const FALLBACK_TARGET: &str = "request_tracing::fallback";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Entry,
    Exit,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Entry => "entry",
            Phase::Exit => "exit",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One rendered diagnostic record.
#[derive(Debug)]
pub struct TraceRecord<'a> {
    pub phase: Phase,
    /// Identity of the thread running the call.
    pub thread: &'a str,
    /// Short signature of the call site, `Type.method(..)`.
    pub signature: &'a str,
    /// Output of [`render`](crate::render::render).
    pub message: &'a str,
}

impl TraceRecord<'_> {
    /// Full log line, e.g. `Call entry(Thread[main,ThreadId(1)]) @ Item (Item.get(1))`.
    pub fn line(&self) -> String {
        format!("Call {}({}) @ {}", self.phase, self.thread, self.message)
    }
}

/// Destination of trace records.
pub trait TraceSink: Send + Sync + 'static {
    fn emit(&self, record: &TraceRecord<'_>) -> Result<(), TraceError>;
}

/// Emits records as `DEBUG` events on [`TRACE_TARGET`].
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl TraceSink for TracingSink {
    fn emit(&self, record: &TraceRecord<'_>) -> Result<(), TraceError> {
        tracing::debug!(
            target: TRACE_TARGET,
            phase = record.phase.as_str(),
            thread = record.thread,
            signature = record.signature,
            "{}",
            record.line()
        );
        Ok(())
    }
}

#[derive(Clone)]
pub struct CallInterceptor {
    gate: Arc<VerbosityGate>,
    sink: Arc<dyn TraceSink>,
}

impl fmt::Debug for CallInterceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallInterceptor")
            .field("gate", &self.gate)
            .finish_non_exhaustive()
    }
}

impl CallInterceptor {
    /// Interceptor writing to [`TracingSink`].
    pub fn new(gate: Arc<VerbosityGate>) -> Self {
        Self::with_sink(gate, TracingSink)
    }

    pub fn with_sink(gate: Arc<VerbosityGate>, sink: impl TraceSink) -> Self {
        Self {
            gate,
            sink: Arc::new(sink),
        }
    }

    pub fn gate(&self) -> &Arc<VerbosityGate> {
        &self.gate
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.gate.is_enabled()
    }

    #[inline]
    pub fn on_entry(&self, call: &CallDescriptor<'_>) {
        if self.gate.is_enabled() {
            self.emit(Phase::Entry, call);
        }
    }

    #[inline]
    pub fn on_exit(&self, call: &CallDescriptor<'_>) {
        if self.gate.is_enabled() {
            self.emit(Phase::Exit, call);
        }
    }

    /// Runs `body` between the entry and exit hooks and returns its result.
    ///
    /// The exit hook also runs if `body` unwinds; the panic then continues.
    /// For a body that produces a future, the bracket covers producing it,
    /// not driving it.
    pub fn intercept<R>(&self, call: &CallDescriptor<'_>, body: impl FnOnce() -> R) -> R {
        self.on_entry(call);
        let _exit = ExitGuard {
            interceptor: self,
            call,
        };
        body()
    }

    #[cold]
    fn emit(&self, phase: Phase, call: &CallDescriptor<'_>) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let thread = thread_label();
            let signature = call.site.short_form();
            let message = render_call(call);
            self.sink.emit(&TraceRecord {
                phase,
                thread: &thread,
                signature: &signature,
                message: &message,
            })
        }));

        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                tracing::warn!(target: FALLBACK_TARGET, phase = phase.as_str(), "dropped trace record: {err}");
            }
            Err(_) => {
                tracing::warn!(target: FALLBACK_TARGET, phase = phase.as_str(), "trace record panicked");
            }
        }
    }
}

struct ExitGuard<'a, 'b> {
    interceptor: &'a CallInterceptor,
    call: &'a CallDescriptor<'b>,
}

impl Drop for ExitGuard<'_, '_> {
    fn drop(&mut self) {
        self.interceptor.on_exit(self.call);
    }
}

/// `Thread[<name>,ThreadId(<n>)]` for the current thread.
pub fn thread_label() -> String {
    let current = thread::current();
    format!(
        "Thread[{},{:?}]",
        current.name().unwrap_or("unnamed"),
        current.id()
    )
}
