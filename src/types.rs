use bytes::Bytes;
use futures_util::future::BoxFuture;
use http_body_util::combinators::UnsyncBoxBody;

use crate::body::ServiceBody;

pub type BoxBody = UnsyncBoxBody<Bytes, BoxError>;
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub type Request = http::Request<ServiceBody>;
pub type Response = http::Response<ServiceBody>;

/// The asynchronous handle a handler hands back from its synchronous dispatch.
pub type BoxResponseFuture = BoxFuture<'static, Response>;
