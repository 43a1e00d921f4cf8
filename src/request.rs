//! Incoming HTTP request type.

use std::collections::HashMap;
use std::net::SocketAddr;

use bytes::Bytes;
use http_body_util::BodyExt;
use http_body_util::combinators::UnsyncBoxBody;

use crate::error::{BoxError, Error};
use crate::method::Method;

/// A request body that has not been read yet.
///
/// Wraps whatever body type the connection produced so handlers only ever
/// see one type.
pub struct Body(UnsyncBoxBody<Bytes, BoxError>);

impl Body {
    pub(crate) fn new<B>(body: B) -> Self
    where
        B: hyper::body::Body<Data = Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
    {
        Self(body.map_err(Into::into).boxed_unsync())
    }

    /// The next chunk of data, or `None` once the body is finished.
    /// Trailers are skipped.
    pub async fn chunk(&mut self) -> Result<Option<Bytes>, Error> {
        while let Some(frame) = self.0.frame().await {
            if let Ok(data) = frame.map_err(Error::Body)?.into_data() {
                return Ok(Some(data));
            }
        }
        Ok(None)
    }
}

/// An incoming HTTP request, with its route parameters attached.
pub struct Request {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) host: Option<String>,
    pub(crate) body: Option<Body>,
    pub(crate) params: HashMap<String, String>,
    pub(crate) remote_addr: SocketAddr,
}

impl Request {
    pub(crate) fn new(
        method: Method,
        parts: http::request::Parts,
        body: Body,
        params: HashMap<String, String>,
        remote_addr: SocketAddr,
    ) -> Self {
        // HTTP/2 carries the host in the `:authority` pseudo-header, which
        // hyper surfaces through the URI rather than the header map.
        let host = parts
            .headers
            .get(http::header::HOST)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
            .or_else(|| parts.uri.authority().map(|a| a.as_str().to_owned()));

        Self {
            method,
            path: parts.uri.path().to_owned(),
            host,
            body: Some(body),
            params,
            remote_addr,
        }
    }

    pub fn method(&self) -> Method { self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn remote_addr(&self) -> SocketAddr { self.remote_addr }

    /// The host the client addressed, or `""` when it sent none.
    pub fn host(&self) -> &str { self.host.as_deref().unwrap_or_default() }

    /// Takes the body out of the request. Returns `None` once taken.
    pub fn take_body(&mut self) -> Option<Body> {
        self.body.take()
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}
