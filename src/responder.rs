//! Conversion of handler return values into HTTP responses.
//!
//! Handlers registered on the [`Router`](crate::router::Router) may return any
//! type implementing [`Responder`]. The admin routes answer with [`Json`].

use std::{convert::Infallible, fmt::Display};

use http::{HeaderValue, StatusCode, header};
use serde::Serialize;

use crate::{body::ServiceBody, types::Response};

/// Trait for converting types into HTTP responses.
pub trait Responder {
    fn into_response(self) -> Response;
}

impl Responder for Response {
    fn into_response(self) -> Response {
        self
    }
}

impl Responder for &'static str {
    fn into_response(self) -> Response {
        Response::new(ServiceBody::from(self))
    }
}

impl Responder for String {
    fn into_response(self) -> Response {
        Response::new(ServiceBody::from(self))
    }
}

impl Responder for () {
    fn into_response(self) -> Response {
        Response::new(ServiceBody::empty())
    }
}

impl Responder for StatusCode {
    fn into_response(self) -> Response {
        let mut res = Response::new(ServiceBody::empty());
        *res.status_mut() = self;
        res
    }
}

impl Responder for Infallible {
    fn into_response(self) -> Response {
        match self {}
    }
}

impl<R> Responder for (StatusCode, R)
where
    R: Display,
{
    fn into_response(self) -> Response {
        let (status, body) = self;
        let mut res = Response::new(ServiceBody::from(body.to_string()));
        *res.status_mut() = status;
        res
    }
}

/// JSON response body serialized with `serde_json`.
pub struct Json<T>(pub T);

impl<T> Responder for Json<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        match serde_json::to_vec(&self.0) {
            Ok(buf) => {
                let mut res = Response::new(ServiceBody::from(buf));
                res.headers_mut().insert(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                );
                res
            }
            Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn json_sets_content_type_and_body() {
        let res = Json(json!({ "status": "INFO" })).into_response();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let body = res.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], br#"{"status":"INFO"}"#);
    }

    #[test]
    fn status_tuple_keeps_status() {
        let res = (StatusCode::NOT_FOUND, "missing").into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
