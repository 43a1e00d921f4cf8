//! The paste handlers and their route table.
//!
//! | Method | Path | Handler |
//! |---|---|---|
//! | GET, HEAD | `/` | [`PasteService::index`] |
//! | any | `/paste` | [`PasteService::create`] |
//! | GET, HEAD | `/id/<id>` | [`PasteService::fetch`] |
//! | GET, HEAD | `/healthz`, `/readyz` | [`health`](crate::health) |
//!
//! `HEAD` reaches the `GET` handlers through the router.

use std::future::Future;
use std::io::Cursor;
use std::sync::Arc;

use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tracing::{error, info, warn};

use crate::codec::Codec;
use crate::error::Error;
use crate::handler::Handler;
use crate::health;
use crate::id::IdSource;
use crate::method::Method;
use crate::request::Request;
use crate::response::{ContentType, IntoResponse, Response};
use crate::router::Router;
use crate::status::Status;
use crate::storage::{Storage, StorageError};

/// How much of a paste is read before its fetch commits to `200 OK`.
const FIRST_CHUNK: usize = 16 * 1024;

const INDEX_PAGE: &str = r#"
<html>
<head>
	<title>paste</title>
</head>
<body>
<h2>paste</h2>
client
<pre>
#!/bin/bash
paste() { curl --data-binary @- http://{server}/paste ;  }
</pre>

Usage:
<pre>
% echo whatever | paste
</pre>
<p/>

<small><a href="http://github.com/sigmonsays/paste">github</a></small>
</body>
</html>
"#;

/// Why a request failed. Each variant knows its status and body.
#[derive(Debug, thiserror::Error)]
pub enum PasteError {
    #[error("invalid request")]
    MissingBody,

    #[error("read request: {0}")]
    ReadBody(#[source] Error),

    #[error("invalid request: {0}")]
    Store(#[source] StorageError),

    #[error("no such paste id")]
    MissingId,

    #[error("invalid paste id: {0}")]
    InvalidId(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("error: {id}: {source}")]
    Read {
        id: String,
        #[source]
        source: std::io::Error,
    },
}

impl PasteError {
    pub fn status(&self) -> Status {
        match self {
            Self::MissingBody
            | Self::ReadBody(_)
            | Self::Store(_)
            | Self::MissingId
            | Self::InvalidId(_) => Status::BadRequest,
            Self::NotFound(_) => Status::NotFound,
            // I/O failures answer 400 on create but 403 on fetch.
            Self::Read { .. } => Status::Forbidden,
        }
    }
}

impl IntoResponse for PasteError {
    fn into_response(self) -> Response {
        Response::builder()
            .status(self.status())
            .text(format!("{self}\n"))
    }
}

/// Shared state behind every paste handler.
pub struct PasteService {
    storage: Storage,
    codec: Codec,
    ids: Box<dyn IdSource>,
}

impl PasteService {
    pub fn new(storage: Storage, codec: Codec, ids: impl IdSource) -> Self {
        Self { storage, codec, ids: Box::new(ids) }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Landing page with a `curl` client pointed at the host the caller used.
    pub async fn index(&self, req: Request) -> Response {
        Response::html(INDEX_PAGE.replace("{server}", &escape_html(req.host())))
    }

    /// Stores the request body under a fresh id and redirects to it.
    ///
    /// The body is streamed to disk as it arrives and only published once it
    /// is complete, so a client that drops mid-upload never leaves a paste
    /// behind.
    pub async fn create(&self, mut req: Request) -> Result<Response, PasteError> {
        let remote = req.remote_addr();

        let result = async {
            let mut body = req.take_body().ok_or(PasteError::MissingBody)?;

            let id = self.codec.encode(self.ids.next_id());
            let mut upload = self.storage.upload(&id).await.map_err(PasteError::Store)?;
            while let Some(chunk) = body.chunk().await.map_err(PasteError::ReadBody)? {
                upload.write(&chunk).await.map_err(PasteError::Store)?;
            }
            let written = upload.commit().await.map_err(PasteError::Store)?;
            Ok::<_, PasteError>((id, written))
        }
        .await;

        let (id, written) = result.inspect_err(|e| {
            warn!(remote = %remote, path = %req.path(), "create failed: {e}");
        })?;

        let location = format!("{}/id/{id}", req.host());
        info!(
            remote = %remote,
            method = %req.method(),
            path = %req.path(),
            written,
            location = %location,
            "paste stored"
        );

        Ok(Response::builder()
            .status(Status::Found)
            .header("location", &location)
            .text(format!("see {location}\n")))
    }

    /// Serves the bytes of the paste named by the third path segment.
    ///
    /// The first chunk is read before answering, so a file that cannot be
    /// read at all still gets a real 403. The rest is streamed; a failure
    /// past that point can only be logged.
    pub async fn fetch(&self, req: Request) -> Result<Response, PasteError> {
        let remote = req.remote_addr();
        let path = req.path().to_owned();
        let result = self.open_paste(&path).await;

        match &result {
            Ok((id, _, _)) => info!(remote = %remote, id = %id, "paste served"),
            Err(e @ PasteError::Read { .. }) => error!(remote = %remote, "fetch failed: {e}"),
            Err(e) => warn!(remote = %remote, path = %path, "fetch failed: {e}"),
        }

        let (_, first, rest) = result?;
        Ok(Response::builder().stream(ContentType::Plain, Cursor::new(first).chain(rest)))
    }

    /// Resolves `path` to a paste and reads its first chunk. Returns the id,
    /// that chunk, and the file positioned after it.
    async fn open_paste(&self, path: &str) -> Result<(String, Vec<u8>, File), PasteError> {
        // "/id/<id>/..." splits into ["", "id", "<id>", ...].
        let id = match path.split('/').nth(2) {
            Some(id) if !id.is_empty() => id,
            _ => return Err(PasteError::MissingId),
        };
        if !self.codec.is_valid(id) {
            return Err(PasteError::InvalidId(id.to_owned()));
        }

        let mut file = self.storage.fetch(id).await.map_err(|e| match e {
            StorageError::NotFound(id) => PasteError::NotFound(id),
            StorageError::InvalidId(id) => PasteError::InvalidId(id),
            StorageError::Io { id, source } => PasteError::Read { id, source },
            StorageError::Dir { source, .. } => PasteError::Read { id: id.to_owned(), source },
        })?;

        let mut first = vec![0; FIRST_CHUNK];
        let n = file
            .read(&mut first)
            .await
            .map_err(|source| PasteError::Read { id: id.to_owned(), source })?;
        first.truncate(n);

        Ok((id.to_owned(), first, file))
    }
}

/// The full route table for `service`.
pub fn routes(service: PasteService) -> Router {
    let svc = Arc::new(service);

    let fetch = |svc: &Arc<PasteService>| {
        bind(Arc::clone(svc), |svc, req| async move { svc.fetch(req).await })
    };

    Router::new()
        .on(
            Method::Get,
            "/",
            bind(Arc::clone(&svc), |svc, req| async move { svc.index(req).await }),
        )
        .any(
            "/paste",
            bind(Arc::clone(&svc), |svc, req| async move { svc.create(req).await }),
        )
        .on(Method::Get, "/id", fetch(&svc))
        .on(Method::Get, "/id/", fetch(&svc))
        .on(Method::Get, "/id/{*rest}", fetch(&svc))
        .on(Method::Get, "/healthz", health::liveness)
        .on(Method::Get, "/readyz", health::readiness)
}

/// Turns a function of `(service, request)` into a route handler.
fn bind<F, Fut, R>(svc: Arc<PasteService>, f: F) -> impl Handler
where
    F: Fn(Arc<PasteService>, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    move |req: Request| f(Arc::clone(&svc), req)
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
