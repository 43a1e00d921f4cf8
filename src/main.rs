//! `pasted` — serve pastes from a flat directory.
//!
//! ```text
//! RUST_LOG=debug pasted --bindaddr 127.0.0.1:3555 --data /var/lib/paste
//! ```

use clap::Parser;
use tracing::info;

use pasted::{Codec, Config, PasteService, RandomIds, Server, Storage, paste};

#[tokio::main]
async fn main() -> Result<(), pasted::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();

    let storage = Storage::open(&config.data_dir).await?;
    info!(data = %storage.dir().display(), "data directory ready");

    let service = PasteService::new(storage, Codec::default(), RandomIds::from_os_rng());
    Server::bind(&config.bind_addr)?
        .serve(paste::routes(service))
        .await
}
