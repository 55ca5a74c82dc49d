use crate::args::StreamArgs;
use crate::errors::{Error, Result};
use crate::logger::StreamLogger;
use clap::Parser;
use log::{debug, error, info};
use popcorn_fx_torrent_stream::core::config::ServerAddress;
use popcorn_fx_torrent_stream::core::stream::StreamServer;
use popcorn_fx_torrent_stream::core::torrents::{
    FileTorrent, FileTorrentService, TorrentStreamRegistry,
};
use popcorn_fx_torrent_stream::VERSION;
use std::path::Path;
use std::sync::Arc;
use tokio::signal;

mod args;
mod errors;
mod logger;

#[tokio::main]
async fn main() -> Result<()> {
    let args = StreamArgs::parse();
    let _logger = StreamLogger::builder()
        .root_level(args.log_level)
        .log_path(args.log_file.as_ref())
        .build()?;

    info!("Starting popcorn-fx-stream {}", VERSION);
    debug!("Running with arguments {}", args);
    let settings = args.settings()?;
    debug!("Using server settings {}", settings);

    let registry = TorrentStreamRegistry::new(
        ServerAddress::new(settings.host_addr()),
        Arc::new(FileTorrentService),
    );
    let server = StreamServer::new(&settings, registry.clone()).await?;

    for filepath in args.files.iter() {
        start_stream(&registry, filepath).await;
    }
    if registry.is_empty().await {
        server.shutdown();
        return Err(Error::NoStreams);
    }

    info!("Serving {} stream(s), press ctrl-c to stop", registry.len().await);
    signal::ctrl_c().await?;

    info!("Stopping popcorn-fx-stream");
    registry.stop_all_streams().await;
    server.shutdown();
    Ok(())
}

/// Start a new stream for the given file.
/// Failures are logged, as the other files can still be streamed.
async fn start_stream(registry: &TorrentStreamRegistry, filepath: &Path) {
    let filepath = match tokio::fs::canonicalize(filepath).await {
        Ok(e) => e,
        Err(e) => {
            error!("Unable to stream {:?}, {}", filepath, e);
            return;
        }
    };

    match registry
        .start_stream(Arc::new(FileTorrent::new(&filepath)))
        .await
    {
        Ok(stream) => info!("Streaming {} on {}", stream.key(), stream.url()),
        Err(e) => error!("Failed to start the stream of {:?}, {}", filepath, e),
    }
}
