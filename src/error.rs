//! Unified error type.

use std::net::AddrParseError;

/// Boxed error carried by request bodies of any concrete type.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The error type returned by the server's fallible operations.
///
/// Request-level failures (404, 400, etc.) are expressed as HTTP
/// [`Response`](crate::Response) values, not as `Error`s. This type surfaces
/// infrastructure failures: binding to a port, preparing the data directory,
/// or reading a request body off the wire.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid socket address `{addr}`: {source}")]
    Addr {
        addr: String,
        #[source]
        source: AddrParseError,
    },

    #[error("body: {0}")]
    Body(#[source] BoxError),

    #[error(transparent)]
    Storage(#[from] crate::storage::StorageError),
}
