//! # pasted
//!
//! A minimal paste-sharing HTTP service. Clients POST bytes, get back a
//! short identifier, and GET the same bytes back by that identifier.
//!
//! ```text
//! % echo whatever | curl --data-binary @- http://localhost:3555/paste
//! see localhost:3555/id/2fXk9
//! % curl http://localhost:3555/id/2fXk9
//! whatever
//! ```
//!
//! ## Layout
//!
//! - [`codec`] — base-62 identifier encoding
//! - [`id`] — random identifier minting, injectable for tests
//! - [`storage`] — one flat file per paste
//! - [`paste`] — the landing, create and fetch handlers plus the route table
//! - [`Router`] / [`Server`] — radix-tree routing via [`matchit`] on top of
//!   hyper, with graceful shutdown on SIGTERM / Ctrl-C
//!
//! ## Wiring it up
//!
//! ```rust,no_run
//! use pasted::{Codec, PasteService, RandomIds, Server, Storage, paste};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), pasted::Error> {
//!     let storage = Storage::open("/tmp/paste").await?;
//!     let service = PasteService::new(storage, Codec::default(), RandomIds::from_os_rng());
//!
//!     Server::bind(":3555")?.serve(paste::routes(service)).await
//! }
//! ```

mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod codec;
pub mod config;
pub mod health;
pub mod id;
pub mod paste;
pub mod storage;

pub use codec::{Codec, CodecError};
pub use config::Config;
pub use error::{BoxError, Error};
pub use handler::Handler;
pub use id::{FixedId, IdSource, RandomIds};
pub use method::Method;
pub use paste::{PasteError, PasteService};
pub use request::{Body, Request};
pub use response::{ContentType, IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
pub use status::Status;
pub use storage::{Storage, StorageError, Upload};
