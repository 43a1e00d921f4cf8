//! Radix-tree request router.
//!
//! One tree per HTTP method, O(path-length) lookup via [`matchit`]. You
//! register a path, you get a handler.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::combinators::UnsyncBoxBody;
use matchit::Router as MatchitRouter;
use tracing::{info, warn};

use crate::error::BoxError;
use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::request::{Body, Request};
use crate::response::Response;
use crate::status::Status;

/// The application router.
///
/// Build it once at startup and pass it to [`Server::serve`](crate::Server::serve).
/// Each registration returns `self` so calls chain naturally.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Register a handler for a method + path pair.
    ///
    /// Path parameters use `{name}` syntax, catch-alls `{*name}`:
    ///
    /// ```rust
    /// # use pasted::{Method, Request, Response, Router};
    /// # async fn fetch(_: Request) -> Response { Response::text("") }
    /// Router::new().on(Method::Get, "/id/{*rest}", fetch);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `path` is malformed or conflicts with an earlier route.
    pub fn on(self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.add(&[method], path, handler.into_boxed_handler())
    }

    /// Register one handler for `path` under every method.
    pub fn any(self, path: &str, handler: impl Handler) -> Self {
        self.add(&Method::ALL, path, handler.into_boxed_handler())
    }

    fn add(mut self, methods: &[Method], path: &str, handler: BoxedHandler) -> Self {
        for method in methods {
            self.routes
                .entry(*method)
                .or_default()
                .insert(path, Arc::clone(&handler))
                .unwrap_or_else(|e| panic!("invalid route `{method} {path}`: {e}"));
        }
        self
    }

    /// Finds the handler for `method` and `path`. `HEAD` falls back to the
    /// `GET` route when none is registered for it; hyper drops the body.
    pub(crate) fn lookup(
        &self,
        method: Method,
        path: &str,
    ) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let find = |method: Method| self.routes.get(&method)?.at(path).ok();
        let matched = match method {
            Method::Head => find(Method::Head).or_else(|| find(Method::Get)),
            _ => find(method),
        }?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }

    /// Routes one request and produces one response.
    ///
    /// This is what the server calls for every request on every connection.
    /// It is public so the whole stack can be driven without a socket.
    /// Failures never escape: unknown methods become 405, unknown paths 404.
    pub async fn respond<B>(&self, req: http::Request<B>, remote_addr: SocketAddr) -> Response
    where
        B: hyper::body::Body<Data = Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
    {
        let (parts, body) = req.into_parts();

        info!(remote = %remote_addr, method = %parts.method, path = %parts.uri.path(), "request");

        let Ok(method) = parts.method.as_str().parse::<Method>() else {
            warn!(remote = %remote_addr, method = %parts.method, "unsupported method");
            return Response::status(Status::MethodNotAllowed);
        };

        match self.lookup(method, parts.uri.path()) {
            Some((handler, params)) => {
                let req = Request::new(method, parts, Body::new(body), params, remote_addr);
                handler.call(req).await
            }
            None => Response::builder()
                .status(Status::NotFound)
                .text("404 page not found\n"),
        }
    }

    pub(crate) async fn dispatch<B>(
        &self,
        req: http::Request<B>,
        remote_addr: SocketAddr,
    ) -> http::Response<UnsyncBoxBody<Bytes, BoxError>>
    where
        B: hyper::body::Body<Data = Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
    {
        self.respond(req, remote_addr).await.into_inner()
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use http_body_util::Full;

    use super::*;

    fn req(method: &str, path: &str) -> http::Request<Full<Bytes>> {
        http::Request::builder()
            .method(method)
            .uri(path)
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    fn addr() -> SocketAddr {
        "127.0.0.1:40000".parse().unwrap()
    }

    async fn echo_path(req: Request) -> String {
        format!("{} {}", req.method(), req.path())
    }

    #[tokio::test]
    async fn routes_by_method() {
        let router = Router::new().on(Method::Get, "/a", echo_path);

        let ok = router.respond(req("GET", "/a"), addr()).await;
        assert_eq!(ok.into_bytes().await.unwrap(), "GET /a");

        let miss = router.respond(req("POST", "/a"), addr()).await;
        assert_eq!(miss.status_code(), 404);
    }

    #[tokio::test]
    async fn any_registers_every_method() {
        let router = Router::new().any("/p", echo_path);

        for m in Method::ALL {
            let res = router.respond(req(m.as_str(), "/p"), addr()).await;
            assert_eq!(res.status_code(), 200, "{m}");
        }
    }

    #[tokio::test]
    async fn extracts_params() {
        let router = Router::new().on(Method::Get, "/id/{*rest}", |req: Request| async move {
            req.param("rest").unwrap_or("-").to_owned()
        });

        let res = router.respond(req("GET", "/id/abc/def"), addr()).await;
        assert_eq!(res.into_bytes().await.unwrap(), "abc/def");
    }

    #[tokio::test]
    async fn head_is_served_by_get_routes() {
        let router = Router::new()
            .on(Method::Get, "/a", echo_path)
            .on(Method::Head, "/b", |_: Request| async { String::from("own head") })
            .on(Method::Get, "/b", echo_path);

        let res = router.respond(req("HEAD", "/a"), addr()).await;
        assert_eq!(res.status_code(), 200);
        assert_eq!(res.into_bytes().await.unwrap(), "HEAD /a");

        let res = router.respond(req("HEAD", "/b"), addr()).await;
        assert_eq!(res.into_bytes().await.unwrap(), "own head");

        let res = router.respond(req("HEAD", "/missing"), addr()).await;
        assert_eq!(res.status_code(), 404);
    }

    #[tokio::test]
    async fn head_does_not_reach_other_methods() {
        let router = Router::new().on(Method::Post, "/a", echo_path);
        let res = router.respond(req("HEAD", "/a"), addr()).await;
        assert_eq!(res.status_code(), 404);
    }

    #[tokio::test]
    async fn unknown_method_is_rejected() {
        let router = Router::new().any("/p", echo_path);
        let res = router.respond(req("PURGE", "/p"), addr()).await;
        assert_eq!(res.status_code(), 405);
    }

    #[tokio::test]
    async fn dispatch_produces_hyper_response() {
        let router = Router::new().on(Method::Get, "/a", echo_path);
        let res = router.dispatch(req("GET", "/a"), addr()).await;
        assert_eq!(res.status(), http::StatusCode::OK);
    }
}
