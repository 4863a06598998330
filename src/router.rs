//! Route table and request dispatch.
//!
//! Routes are registered with the static [`CallSite`] of their handler and the
//! controller instance used as display target. When the router carries an
//! [`Instrumentation`], eligibility is decided at registration and the stored
//! handler is already wrapped; dispatch does no per-request rule evaluation.

use std::{collections::HashMap, fmt::Display, sync::Arc};

use anyhow::{Context, Result};
use http::{Method, StatusCode};

use crate::{
    descriptor::CallSite,
    handler::{BoxHandler, Handler},
    middleware::Instrumentation,
    params::PathParams,
    responder::Responder,
    types::{Request, Response},
};

struct Route {
    handler: BoxHandler,
    traced: bool,
}

#[derive(Default)]
pub struct Router {
    routes: HashMap<Method, matchit::Router<Arc<Route>>>,
    instrumentation: Option<Instrumentation>,
}

impl Router {
    /// Router without call tracing.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_instrumentation(instrumentation: Instrumentation) -> Self {
        Self {
            routes: HashMap::new(),
            instrumentation: Some(instrumentation),
        }
    }

    /// Registers `handler` for `method` and `path` (`{name}` segments capture).
    ///
    /// Returns whether the handler was wrapped for tracing.
    pub fn route<T, H>(
        &mut self,
        method: Method,
        path: &str,
        site: CallSite,
        target: T,
        handler: H,
    ) -> Result<bool>
    where
        T: Display + Send + Sync + 'static,
        H: Handler,
    {
        let handler = BoxHandler::new(handler);
        let (handler, traced) = match &self.instrumentation {
            Some(instr) => instr.instrument(site, Arc::new(target), handler),
            None => (handler, false),
        };
        self.insert(method, path, Route { handler, traced })?;
        Ok(traced)
    }

    /// Registers a handler that is never traced, whatever the rule says.
    pub fn route_untraced<H>(&mut self, method: Method, path: &str, handler: H) -> Result<()>
    where
        H: Handler,
    {
        let route = Route {
            handler: BoxHandler::new(handler),
            traced: false,
        };
        self.insert(method, path, route)
    }

    fn insert(&mut self, method: Method, path: &str, route: Route) -> Result<()> {
        self.routes
            .entry(method.clone())
            .or_insert_with(matchit::Router::new)
            .insert(path, Arc::new(route))
            .with_context(|| format!("cannot register {method} {path}"))
    }

    /// Whether the route serving `method` and `path` is traced. `None` if no route matches.
    pub fn is_traced(&self, method: &Method, path: &str) -> Option<bool> {
        let table = self.routes.get(method)?;
        table.at(path).ok().map(|m| m.value.traced)
    }

    pub async fn dispatch(&self, mut req: Request) -> Response {
        let Some(table) = self.routes.get(req.method()) else {
            return StatusCode::NOT_FOUND.into_response();
        };

        let (route, params) = match table.at(req.uri().path()) {
            Ok(matched) => {
                let params = matched
                    .params
                    .iter()
                    .map(|(k, v)| (k.to_owned(), v.to_owned()))
                    .collect();
                (matched.value.clone(), PathParams(params))
            }
            Err(_) => return StatusCode::NOT_FOUND.into_response(),
        };

        req.extensions_mut().insert(params);
        route.handler.call(req).await
    }
}
