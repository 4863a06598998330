//! HTTP server loop.
//!
//! Accepts TCP connections, serves each on its own tokio task with hyper's
//! HTTP/1.1 connection builder, and dispatches every request through the
//! [`Router`].

use std::{convert::Infallible, future::Future, sync::Arc};

use anyhow::Result;
use hyper::{Request, body::Incoming, server::conn::http1, service::service_fn};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;

use crate::{body::ServiceBody, router::Router};

/// Serves `router` on `listener` until accepting fails.
pub async fn serve(listener: TcpListener, router: Router) -> Result<()> {
    serve_with_shutdown(listener, router, std::future::pending()).await
}

/// Serves `router` until `shutdown` resolves. Connections already accepted
/// are left to finish on their own tasks.
pub async fn serve_with_shutdown<F>(listener: TcpListener, router: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()>,
{
    let router = Arc::new(router);
    tracing::info!("listening on {}", listener.local_addr()?);

    tokio::pin!(shutdown);
    loop {
        let (stream, addr) = tokio::select! {
            accepted = listener.accept() => accepted?,
            _ = &mut shutdown => {
                tracing::info!("shutting down");
                return Ok(());
            }
        };
        let io = TokioIo::new(stream);
        let router = router.clone();

        tokio::spawn(async move {
            let svc = service_fn(move |req: Request<Incoming>| {
                let router = router.clone();
                async move {
                    let mut req = req.map(ServiceBody::new);
                    req.extensions_mut().insert(addr);
                    Ok::<_, Infallible>(router.dispatch(req).await)
                }
            });

            let mut http = http1::Builder::new();
            http.keep_alive(true);

            if let Err(err) = http.serve_connection(io, svc).await {
                tracing::error!(%addr, "error serving connection: {err}");
            }
        });
    }
}
