//! Outgoing HTTP response type and the [`IntoResponse`] conversion trait.
//!
//! Build a [`Response`] in your handler and return it. The server converts it
//! into a hyper response once the handler finishes; nothing is written to the
//! wire before that, so a handler can still change its mind about the status.
//! A streamed body is only polled after the status line is out, so its
//! failures can be logged but no longer change the status.

use std::fmt;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Full};
use hyper::body::Frame;
use tokio::io::{AsyncRead, ReadBuf};

use crate::error::{BoxError, Error};
use crate::status::Status;

/// Size of each chunk read from a streamed body.
const CHUNK: usize = 16 * 1024;

// ── ContentType ───────────────────────────────────────────────────────────────

/// Content-type values for use with [`ResponseBuilder::bytes`].
pub enum ContentType {
    Html,  // text/html; charset=utf-8
    Plain, // text/plain
    Text,  // text/plain; charset=utf-8
}

impl ContentType {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Html  => "text/html; charset=utf-8",
            Self::Plain => "text/plain",
            Self::Text  => "text/plain; charset=utf-8",
        }
    }
}

// ── Response ─────────────────────────────────────────────────────────────────

/// An outgoing HTTP response.
///
/// ```rust
/// use pasted::{ContentType, Response, Status};
///
/// Response::text("hello");
/// Response::status(Status::NotFound);
///
/// Response::builder()
///     .status(Status::Found)
///     .header("location", "example.com/id/42")
///     .text("see example.com/id/42\n");
///
/// Response::builder().bytes(ContentType::Plain, b"raw".to_vec());
/// Response::builder().stream(ContentType::Plain, &b"streamed"[..]);
/// ```
pub struct Response {
    pub(crate) body: UnsyncBoxBody<Bytes, BoxError>,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) status: u16,
}

impl Response {
    /// `200 OK` — `text/plain; charset=utf-8`.
    pub fn text(body: impl Into<String>) -> Self {
        Self::builder().text(body)
    }

    /// `200 OK` — `text/html; charset=utf-8`.
    pub fn html(body: impl Into<String>) -> Self {
        let body: String = body.into();
        Self::builder().bytes(ContentType::Html, body)
    }

    /// Response with no body.
    pub fn status(code: Status) -> Self {
        Self { body: full(Bytes::new()), headers: Vec::new(), status: code.into() }
    }

    /// Builder for responses that need a custom status or extra headers.
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder { headers: Vec::new(), status: Status::Ok.into() }
    }

    pub fn status_code(&self) -> u16 { self.status }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Reads the whole body, streamed or not, into memory.
    pub async fn into_bytes(self) -> Result<Bytes, Error> {
        let collected = self.body.collect().await.map_err(Error::Body)?;
        Ok(collected.to_bytes())
    }

    pub(crate) fn into_inner(self) -> http::Response<UnsyncBoxBody<Bytes, BoxError>> {
        let mut builder = http::Response::builder().status(self.status);
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        match builder.body(self.body) {
            Ok(res) => res,
            Err(e) => {
                // Only reachable with a header a handler built from bad input.
                tracing::error!("invalid response: {e}");
                let mut res = http::Response::new(full(Bytes::new()));
                *res.status_mut() = http::StatusCode::INTERNAL_SERVER_ERROR;
                res
            }
        }
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

fn full(body: Bytes) -> UnsyncBoxBody<Bytes, BoxError> {
    Full::new(body).map_err(|never| match never {}).boxed_unsync()
}

// ── ResponseBuilder ───────────────────────────────────────────────────────────

/// Fluent builder for [`Response`].
///
/// Obtain via [`Response::builder()`]. Defaults to `Status::Ok` (200).
/// Terminated by a typed body method.
pub struct ResponseBuilder {
    headers: Vec<(String, String)>,
    status: u16,
}

impl ResponseBuilder {
    pub fn status(mut self, code: Status) -> Self {
        self.status = code.into();
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    /// Terminate with a plain-text body (`text/plain; charset=utf-8`).
    pub fn text(self, body: impl Into<String>) -> Response {
        let body: String = body.into();
        self.finish(ContentType::Text.as_str(), full(Bytes::from(body)))
    }

    /// Terminate with a typed body.
    pub fn bytes(self, content_type: ContentType, body: impl Into<Bytes>) -> Response {
        self.finish(content_type.as_str(), full(body.into()))
    }

    /// Terminate with a body read from `reader` chunk by chunk as the client
    /// consumes it.
    pub fn stream<R>(self, content_type: ContentType, reader: R) -> Response
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        let body = ReaderBody { reader: Some(reader), buf: vec![0; CHUNK].into_boxed_slice() };
        self.finish(content_type.as_str(), body.map_err(BoxError::from).boxed_unsync())
    }

    fn finish(self, content_type: &str, body: UnsyncBoxBody<Bytes, BoxError>) -> Response {
        let mut headers = vec![("content-type".to_owned(), content_type.to_owned())];
        headers.extend(self.headers);
        Response { body, headers, status: self.status }
    }
}

/// Adapts an [`AsyncRead`] into a body of data frames. Ends at EOF or after
/// the first read error.
struct ReaderBody<R> {
    reader: Option<R>,
    buf: Box<[u8]>,
}

impl<R: AsyncRead + Unpin> hyper::body::Body for ReaderBody<R> {
    type Data = Bytes;
    type Error = io::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Bytes>, io::Error>>> {
        let this = self.get_mut();
        let Some(reader) = this.reader.as_mut() else {
            return Poll::Ready(None);
        };

        let mut buf = ReadBuf::new(&mut this.buf);
        match Pin::new(reader).poll_read(cx, &mut buf) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Err(e)) => {
                this.reader = None;
                tracing::warn!("response body aborted: {e}");
                Poll::Ready(Some(Err(e)))
            }
            Poll::Ready(Ok(())) if buf.filled().is_empty() => {
                this.reader = None;
                Poll::Ready(None)
            }
            Poll::Ready(Ok(())) => {
                Poll::Ready(Some(Ok(Frame::data(Bytes::copy_from_slice(buf.filled())))))
            }
        }
    }

    fn is_end_stream(&self) -> bool {
        self.reader.is_none()
    }
}

// ── IntoResponse ──────────────────────────────────────────────────────────────

/// Conversion into an HTTP [`Response`].
///
/// Implement on your own types to return them directly from handlers, as
/// [`PasteError`](crate::paste::PasteError) does.
pub trait IntoResponse {
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response { self }
}

impl IntoResponse for String {
    fn into_response(self) -> Response { Response::text(self) }
}

impl<T: IntoResponse, E: IntoResponse> IntoResponse for Result<T, E> {
    fn into_response(self) -> Response {
        match self {
            Ok(v) => v.into_response(),
            Err(e) => e.into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn builder_puts_content_type_first() {
        let res = Response::builder()
            .status(Status::Found)
            .header("location", "h/id/x")
            .text("see h/id/x\n");

        assert_eq!(res.status_code(), 302);
        assert_eq!(res.headers[0].0, "content-type");
        assert_eq!(res.header("Location"), Some("h/id/x"));
        assert_eq!(res.into_bytes().await.unwrap(), "see h/id/x\n");
    }

    #[tokio::test]
    async fn streams_reader_in_chunks() {
        let payload: Vec<u8> = (0..=255u8).cycle().take(CHUNK * 2 + 5).collect();
        let mut body = Response::builder()
            .stream(ContentType::Plain, std::io::Cursor::new(payload.clone()))
            .body;

        let mut frames = 0;
        let mut read = Vec::new();
        while let Some(frame) = body.frame().await {
            read.extend_from_slice(&frame.unwrap().into_data().unwrap());
            frames += 1;
        }
        assert_eq!(read, payload);
        assert_eq!(frames, 3);
    }

    #[tokio::test]
    async fn stream_error_ends_the_body() {
        let res = Response::builder().stream(ContentType::Plain, Failing);
        assert_eq!(res.status_code(), 200);

        let err = res.into_bytes().await.unwrap_err();
        assert!(err.to_string().contains("disk went away"), "{err}");
    }

    /// Fails every read.
    struct Failing;

    impl AsyncRead for Failing {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            Poll::Ready(Err(io::Error::other("disk went away")))
        }
    }

    #[test]
    fn converts_to_hyper_response() {
        let res = Response::builder()
            .bytes(ContentType::Plain, b"abc".to_vec())
            .into_inner();

        assert_eq!(res.status(), http::StatusCode::OK);
        assert_eq!(res.headers()["content-type"], "text/plain");
    }

    #[test]
    fn invalid_header_becomes_server_error() {
        let res = Response::builder()
            .header("location", "bad\nvalue")
            .text("x")
            .into_inner();

        assert_eq!(res.status(), http::StatusCode::INTERNAL_SERVER_ERROR);
    }
}
