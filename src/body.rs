//! Request and response body type used by every route, traced or not.
use std::{
    pin::Pin,
    task::{Context, Poll},
};

use bytes::Bytes;

use http_body::{Body, Frame, SizeHint};
use http_body_util::{BodyExt, Empty, Full};

use crate::types::{BoxBody, BoxError};

/// Wrapper around a boxed HTTP body.
///
/// Incoming hyper bodies are wrapped with [`ServiceBody::new`] before dispatch so
/// handlers never see the transport type.
pub struct ServiceBody(BoxBody);

impl ServiceBody {
    /// Wraps any body yielding `Bytes` frames.
    pub fn new<B>(body: B) -> Self
    where
        B: Body<Data = Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
    {
        Self(body.map_err(|e| e.into()).boxed_unsync())
    }

    pub fn empty() -> Self {
        Self::new(Empty::new())
    }
}

impl Default for ServiceBody {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<()> for ServiceBody {
    fn from(_: ()) -> Self {
        Self::empty()
    }
}

macro_rules! body_from_impl {
    ($ty:ty) => {
        impl From<$ty> for ServiceBody {
            fn from(buf: $ty) -> Self {
                Self::new(Full::from(buf))
            }
        }
    };
}

body_from_impl!(String);
body_from_impl!(&'static str);
body_from_impl!(Bytes);
body_from_impl!(Vec<u8>);

impl Body for ServiceBody {
    type Data = Bytes;
    type Error = BoxError;

    #[inline]
    fn poll_frame(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        Pin::new(&mut self.0).poll_frame(cx)
    }

    #[inline]
    fn size_hint(&self) -> SizeHint {
        self.0.size_hint()
    }

    #[inline]
    fn is_end_stream(&self) -> bool {
        self.0.is_end_stream()
    }
}
