use std::{fmt, sync::Arc};

use anyhow::{Context, Result};
use calltrace::{
    config::Config,
    control::TraceControl,
    descriptor::CallSite,
    gate::VerbosityGate,
    interceptor::CallInterceptor,
    middleware::Instrumentation,
    params::Params,
    responder::{Json, Responder},
    router::Router,
    types::Request,
};
use http::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

const ITEM_CONTROLLER: &str = "service::controller::v1_0::ItemController";
const RULE_CONTROLLER: &str = "service::controller::v1_0::rule::RuleController";
const ERROR_CONTROLLER: &str = "service::controller::v1_0::AppErrorController";

/// Display target for a controller, rendered `<path>@<id>` like an object identity.
#[derive(Clone, Copy)]
struct Controller {
    path: &'static str,
    id: u32,
}

impl fmt::Display for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:08x}", self.path, self.id)
    }
}

#[derive(Deserialize)]
struct ItemPath {
    id: u64,
}

#[derive(Deserialize)]
struct RulePath {
    rule_id: u64,
    subject: String,
}

#[derive(Serialize)]
struct Item {
    id: u64,
    name: String,
}

#[derive(Serialize)]
struct Verdict {
    rule_id: u64,
    subject: String,
    allowed: bool,
}

async fn get_item(req: Request) -> impl Responder {
    match Params::<ItemPath>::from_request(&req) {
        Ok(Params(path)) => Json(Item {
            id: path.id,
            name: format!("item-{}", path.id),
        })
        .into_response(),
        Err(err) => (StatusCode::BAD_REQUEST, err).into_response(),
    }
}

async fn evaluate_rule(req: Request) -> impl Responder {
    match Params::<RulePath>::from_request(&req) {
        Ok(Params(path)) => Json(Verdict {
            allowed: path.rule_id % 2 == 0,
            rule_id: path.rule_id,
            subject: path.subject,
        })
        .into_response(),
        Err(err) => (StatusCode::BAD_REQUEST, err).into_response(),
    }
}

async fn report_error(_req: Request) -> impl Responder {
    (StatusCode::INTERNAL_SERVER_ERROR, "something went wrong")
}

#[tokio::main]
async fn main() -> Result<()> {
    calltrace::tracing::init_tracing();

    let config = Config::from_env().context("failed to read CALLTRACE_* configuration")?;
    let gate = Arc::new(VerbosityGate::new());
    let instrumentation = Instrumentation::new(config.rule(), CallInterceptor::new(gate.clone()));
    let mut router = Router::with_instrumentation(instrumentation);

    router.route(
        Method::GET,
        "/v1/items/{id}",
        CallSite::new(ITEM_CONTROLLER, "get_item").params(1),
        Controller {
            path: ITEM_CONTROLLER,
            id: 0x1b6d_3586,
        },
        get_item,
    )?;
    router.route(
        Method::GET,
        "/v1/rules/{rule_id}/evaluate/{subject}",
        CallSite::new(RULE_CONTROLLER, "evaluate").params(2),
        Controller {
            path: RULE_CONTROLLER,
            id: 0x4554_617c,
        },
        evaluate_rule,
    )?;
    router.route(
        Method::GET,
        "/v1/error",
        CallSite::new(ERROR_CONTROLLER, "error"),
        Controller {
            path: ERROR_CONTROLLER,
            id: 0x74a1_4482,
        },
        report_error,
    )?;

    TraceControl::new(gate).mount(&mut router, &config.admin_prefix)?;

    let listener = TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("cannot bind {}", config.bind))?;

    calltrace::serve_with_shutdown(listener, router, async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    })
    .await
}
