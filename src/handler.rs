use std::{future::Future, sync::Arc};

use crate::{
    responder::Responder,
    types::{BoxResponseFuture, Request},
};

/// A request handler.
///
/// `call` is the synchronous dispatch: it returns the future that will
/// produce the response without driving it.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, req: Request) -> BoxResponseFuture;
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: Responder + Send + 'static,
{
    fn call(&self, req: Request) -> BoxResponseFuture {
        let fut = (self)(req);
        Box::pin(async move { fut.await.into_response() })
    }
}

/// Type-erased, cheaply clonable handler.
#[derive(Clone)]
pub struct BoxHandler(Arc<dyn Handler>);

impl BoxHandler {
    pub fn new<H>(handler: H) -> Self
    where
        H: Handler,
    {
        Self(Arc::new(handler))
    }

    #[inline]
    pub fn call(&self, req: Request) -> BoxResponseFuture {
        self.0.call(req)
    }
}
