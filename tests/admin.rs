use std::sync::Arc;

use calltrace::{
    body::ServiceBody,
    control::{DEFAULT_ADMIN_PREFIX, TraceControl},
    descriptor::CallSite,
    error::TraceError,
    gate::VerbosityGate,
    interceptor::{CallInterceptor, TraceRecord, TraceSink},
    middleware::Instrumentation,
    router::Router,
    rule::EligibilityRule,
    types::Request,
};
use http::{Method, StatusCode, header};
use http_body_util::BodyExt;
use parking_lot::Mutex;
use serde_json::{Value, json};

#[derive(Clone, Default)]
struct Count(Arc<Mutex<usize>>);

impl TraceSink for Count {
    fn emit(&self, _record: &TraceRecord<'_>) -> Result<(), TraceError> {
        *self.0.lock() += 1;
        Ok(())
    }
}

fn setup(prefix: &str) -> (Router, Count, Arc<VerbosityGate>) {
    let gate = Arc::new(VerbosityGate::new());
    let sink = Count::default();
    // Roots cover the control module too; admin routes must stay untraced anyway.
    let rule = EligibilityRule::builder()
        .include("service::controller::v1_0")
        .include("calltrace::control")
        .build();
    let interceptor = CallInterceptor::with_sink(gate.clone(), sink.clone());
    let mut router = Router::with_instrumentation(Instrumentation::new(rule, interceptor));

    router
        .route(
            Method::GET,
            "/v1/ping",
            CallSite::new("service::controller::v1_0::PingController", "ping"),
            "PingController@1",
            |_req: Request| async { "pong" },
        )
        .unwrap();
    TraceControl::new(gate.clone()).mount(&mut router, prefix).unwrap();

    (router, sink, gate)
}

async fn call(router: &Router, method: Method, uri: &str) -> (StatusCode, Value) {
    let req = http::Request::builder()
        .method(method)
        .uri(uri)
        .body(ServiceBody::empty())
        .unwrap();
    let res = router.dispatch(req).await;
    let status = res.status();
    assert_eq!(
        res.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/json"
    );
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn status_defaults_to_info() {
    let (router, _, _) = setup(DEFAULT_ADMIN_PREFIX);

    let (status, body) = call(&router, Method::GET, "/admin/tracing").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "INFO" }));
}

#[tokio::test]
async fn enable_is_idempotent() {
    let (router, _, gate) = setup(DEFAULT_ADMIN_PREFIX);

    for _ in 0..2 {
        let (status, body) = call(&router, Method::POST, "/admin/tracing/enable").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "DEBUG" }));
        let (_, body) = call(&router, Method::GET, "/admin/tracing").await;
        assert_eq!(body, json!({ "status": "DEBUG" }));
    }
    assert!(gate.is_enabled());

    let (_, body) = call(&router, Method::POST, "/admin/tracing/disable").await;
    assert_eq!(body, json!({ "status": "INFO" }));
    assert!(!gate.is_enabled());
}

#[tokio::test]
async fn put_sets_level_by_name_and_ignores_garbage() {
    let (router, _, _) = setup(DEFAULT_ADMIN_PREFIX);

    let (_, body) = call(&router, Method::PUT, "/admin/tracing/debug").await;
    assert_eq!(body, json!({ "status": "DEBUG" }));

    let (status, body) = call(&router, Method::PUT, "/admin/tracing/shouting").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "DEBUG" }));

    let (_, body) = call(&router, Method::PUT, "/admin/tracing/OFF").await;
    assert_eq!(body, json!({ "status": "INFO" }));
}

#[tokio::test]
async fn admin_routes_are_never_traced() {
    let (router, sink, _) = setup(DEFAULT_ADMIN_PREFIX);

    call(&router, Method::POST, "/admin/tracing/enable").await;
    call(&router, Method::GET, "/admin/tracing").await;
    assert_eq!(*sink.0.lock(), 0);

    let req = http::Request::builder()
        .uri("/v1/ping")
        .body(ServiceBody::empty())
        .unwrap();
    assert_eq!(router.dispatch(req).await.status(), StatusCode::OK);
    assert_eq!(*sink.0.lock(), 2);
}

#[tokio::test]
async fn custom_prefix_with_trailing_slash() {
    let (router, _, _) = setup("/ops/trace/");

    let (_, body) = call(&router, Method::POST, "/ops/trace/enable").await;
    assert_eq!(body, json!({ "status": "DEBUG" }));
    let (_, body) = call(&router, Method::GET, "/ops/trace").await;
    assert_eq!(body, json!({ "status": "DEBUG" }));
}
