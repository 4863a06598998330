//! Registration-time wrapping of handlers.
//!
//! [`Instrumentation`] pairs an [`EligibilityRule`] with a [`CallInterceptor`].
//! The router hands every handler it registers to [`Instrumentation::instrument`];
//! the rule is evaluated once, there, and only matching handlers come back
//! wrapped in [`Traced`].

use std::{fmt::Display, sync::Arc};

use crate::{
    descriptor::{CallDescriptor, CallSite},
    handler::{BoxHandler, Handler},
    interceptor::CallInterceptor,
    params::PathParams,
    rule::EligibilityRule,
    types::{BoxResponseFuture, Request},
};

/// Display target of a handler, typically the controller instance.
pub type SharedTarget = Arc<dyn Display + Send + Sync>;

#[derive(Clone, Debug)]
pub struct Instrumentation {
    rule: Arc<EligibilityRule>,
    interceptor: CallInterceptor,
}

impl Instrumentation {
    pub fn new(rule: EligibilityRule, interceptor: CallInterceptor) -> Self {
        Self {
            rule: Arc::new(rule),
            interceptor,
        }
    }

    /// Wraps `handler` if `site` is eligible. The flag tells whether it was.
    pub fn instrument(
        &self,
        site: CallSite,
        target: SharedTarget,
        handler: BoxHandler,
    ) -> (BoxHandler, bool) {
        let traced = self.rule.matches(&site);
        tracing::debug!(
            component = site.component(),
            method = site.method(),
            traced,
            "registered handler"
        );

        if !traced {
            return (handler, false);
        }

        let wrapped = Traced {
            site,
            target,
            interceptor: self.interceptor.clone(),
            inner: handler,
        };
        (BoxHandler::new(wrapped), true)
    }
}

/// Handler decorator emitting entry/exit records around the dispatch of `inner`.
///
/// The site's declared arity bounds the rendered arguments. Path captures fill
/// the slots in pattern order; the first slot left over takes the raw query
/// string, and any further slots render as `null`.
pub struct Traced {
    site: CallSite,
    target: SharedTarget,
    interceptor: CallInterceptor,
    inner: BoxHandler,
}

impl Handler for Traced {
    fn call(&self, req: Request) -> BoxResponseFuture {
        if !self.interceptor.is_enabled() {
            return self.inner.call(req);
        }

        let captured = capture_args(&req, self.site.param_count());
        let args: Vec<Option<&dyn Display>> = captured
            .iter()
            .map(|arg| arg.as_ref().map(|s| s as &dyn Display))
            .collect();
        let call = CallDescriptor::new(&self.site, &*self.target, &args);

        self.interceptor.intercept(&call, || self.inner.call(req))
    }
}

fn capture_args(req: &Request, arity: usize) -> Vec<Option<String>> {
    let mut args: Vec<Option<String>> = req
        .extensions()
        .get::<PathParams>()
        .map(|p| p.values().take(arity).map(|v| Some(v.to_owned())).collect())
        .unwrap_or_default();
    if args.len() < arity {
        args.push(req.uri().query().map(str::to_owned));
    }
    args.resize(arity, None);
    args
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parking_lot::Mutex;

    use super::*;
    use crate::{
        body::ServiceBody,
        error::TraceError,
        gate::VerbosityGate,
        interceptor::{TraceRecord, TraceSink},
        rule::DEFAULT_ERROR_COMPONENT,
    };

    #[derive(Clone, Default)]
    struct Collect(Arc<Mutex<Vec<String>>>);

    impl TraceSink for Collect {
        fn emit(&self, record: &TraceRecord<'_>) -> Result<(), TraceError> {
            self.0.lock().push(record.message.to_string());
            Ok(())
        }
    }

    fn instrumentation() -> (Instrumentation, Collect) {
        let gate = Arc::new(VerbosityGate::new());
        gate.set_enabled(true);
        let sink = Collect::default();
        let interceptor = CallInterceptor::with_sink(gate, sink.clone());
        (Instrumentation::new(EligibilityRule::default(), interceptor), sink)
    }

    fn target() -> SharedTarget {
        Arc::new("ItemController@77aa")
    }

    #[test]
    fn ineligible_sites_are_left_alone() {
        let (instr, _) = instrumentation();
        let handler = BoxHandler::new(|_req: Request| async { "ok" });

        let (_, traced) = instr.instrument(CallSite::new(DEFAULT_ERROR_COMPONENT, "error"), target(), handler);
        assert!(!traced);
    }

    #[tokio::test]
    async fn query_fills_the_slot_after_path_params() {
        let (instr, sink) = instrumentation();
        let site = CallSite::new("service::controller::v1_0::ItemController", "get_item").params(2);
        let (handler, traced) =
            instr.instrument(site, target(), BoxHandler::new(|_req: Request| async { "ok" }));
        assert!(traced);

        let mut req = http::Request::builder()
            .uri("/v1/items/42?expand=true")
            .body(ServiceBody::empty())
            .unwrap();
        req.extensions_mut()
            .insert(PathParams(vec![("id".into(), "42".into())]));
        handler.call(req).await;

        let lines = sink.0.lock().clone();
        assert_eq!(
            lines,
            [
                "ItemController (ItemController.get_item(42,expand=true))",
                "ItemController (ItemController.get_item(42,expand=true))",
            ]
        );
    }

    async fn dispatch(handler: &BoxHandler, uri: &str, params: PathParams) {
        let mut req = http::Request::builder()
            .uri(uri)
            .body(ServiceBody::empty())
            .unwrap();
        req.extensions_mut().insert(params);
        handler.call(req).await;
    }

    #[tokio::test]
    async fn arity_bounds_the_rendered_arguments() {
        let (instr, sink) = instrumentation();
        let site = CallSite::new("service::controller::v1_0::ItemController", "get_item").params(1);
        let (handler, _) =
            instr.instrument(site, target(), BoxHandler::new(|_req: Request| async { "ok" }));

        dispatch(&handler, "/v1/items/42?expand=true", PathParams(vec![("id".into(), "42".into())])).await;

        assert_eq!(
            sink.0.lock()[0],
            "ItemController (ItemController.get_item(42))"
        );
    }

    #[tokio::test]
    async fn zero_arity_renders_empty_parentheses() {
        let (instr, sink) = instrumentation();
        let site = CallSite::new("service::controller::v1_0::ItemController", "list");
        let (handler, _) =
            instr.instrument(site, target(), BoxHandler::new(|_req: Request| async { "ok" }));

        dispatch(&handler, "/v1/items?page=2", PathParams::default()).await;

        assert_eq!(
            sink.0.lock().clone(),
            [
                "ItemController (ItemController.list())",
                "ItemController (ItemController.list())",
            ]
        );
    }

    #[tokio::test]
    async fn missing_query_renders_null_in_its_slot() {
        let (instr, sink) = instrumentation();
        let site = CallSite::new("service::controller::v1_0::ItemController", "search").params(3);
        let (handler, _) =
            instr.instrument(site, target(), BoxHandler::new(|_req: Request| async { "ok" }));

        dispatch(&handler, "/v1/search/all", PathParams(vec![("scope".into(), "all".into())])).await;

        assert_eq!(
            sink.0.lock()[0],
            "ItemController (ItemController.search(all,null,null))"
        );
    }

    #[tokio::test]
    async fn records_are_emitted_before_the_future_runs() {
        let (instr, sink) = instrumentation();
        let polled = Arc::new(AtomicUsize::new(0));
        let seen_at_poll = Arc::new(AtomicUsize::new(usize::MAX));

        let handler = {
            let polled = polled.clone();
            let seen_at_poll = seen_at_poll.clone();
            let sink = sink.clone();
            move |_req: Request| {
                let polled = polled.clone();
                let seen_at_poll = seen_at_poll.clone();
                let sink = sink.clone();
                async move {
                    seen_at_poll.store(sink.0.lock().len(), Ordering::SeqCst);
                    polled.fetch_add(1, Ordering::SeqCst);
                    "done"
                }
            }
        };
        let site = CallSite::new("service::controller::v1_0::rule::RuleController", "evaluate");
        let (handler, _) = instr.instrument(site, target(), BoxHandler::new(handler));

        let fut = handler.call(Request::new(ServiceBody::empty()));
        assert_eq!(sink.0.lock().len(), 2);
        assert_eq!(polled.load(Ordering::SeqCst), 0);

        fut.await;
        assert_eq!(polled.load(Ordering::SeqCst), 1);
        assert_eq!(seen_at_poll.load(Ordering::SeqCst), 2);
    }
}
