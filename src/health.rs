//! Health-check handlers.
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? |
//! | **Readiness** | `/readyz` | Can it serve pastes? |
//!
//! Both are wired in by [`paste::routes`](crate::paste::routes).

use crate::{Request, Response};

/// Always `200 OK` with body `"ok"`.
pub async fn liveness(_req: Request) -> Response {
    Response::text("ok")
}

/// `200 OK` with body `"ready"`. The data directory is created before the
/// server binds, so once requests arrive there is nothing left to wait for.
pub async fn readiness(_req: Request) -> Response {
    Response::text("ready")
}
