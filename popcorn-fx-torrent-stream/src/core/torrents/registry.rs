use crate::core::config::ServerAddress;
use crate::core::torrents::{Error, Result, Torrent, TorrentService, TorrentStream};
use fx_callback::{Callback, MultiThreadedCallback, Subscription};
use log::{debug, info, trace, warn};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use url::Url;

const SERVER_PROTOCOL: &str = "http";
const SERVER_VIDEO_PATH: &str = "video";
/// The characters of a filename which need to be encoded within the stream url path.
const FILENAME_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// The events that can be emitted by the [TorrentStreamRegistry].
#[derive(Debug, Clone)]
pub enum TorrentStreamEvent {
    /// Invoked when a new stream has been started.
    StreamStarted(TorrentStream),
    /// Invoked when the stream with the given key has been stopped.
    StreamStopped(String),
}

/// The registry of the active torrent streams.
///
/// Streams are registered by their key, the base filename of the torrent file.
/// At most one stream can be active for a key at any given time.
#[derive(Debug, Clone)]
pub struct TorrentStreamRegistry {
    inner: Arc<InnerTorrentStreamRegistry>,
}

impl TorrentStreamRegistry {
    /// Create a new registry which hands out stream urls on the given server address.
    pub fn new(address: ServerAddress, torrent_service: Arc<dyn TorrentService>) -> Self {
        Self {
            inner: Arc::new(InnerTorrentStreamRegistry {
                address,
                torrent_service,
                streams: Default::default(),
                callbacks: MultiThreadedCallback::new(),
            }),
        }
    }

    /// Returns the server address on which the streams are reachable.
    pub fn address(&self) -> &ServerAddress {
        &self.inner.address
    }

    /// Start a new stream for the given torrent.
    ///
    /// The registry is left untouched when the stream couldn't be created.
    /// If a stream is already active for the torrent filename, [Error::AlreadyExists] is returned.
    pub async fn start_stream(&self, torrent: Arc<dyn Torrent>) -> Result<TorrentStream> {
        self.inner.start_stream(torrent).await
    }

    /// Stop the given stream and release its torrent.
    /// This is a no-op when the stream is not registered.
    pub async fn stop_stream(&self, stream: &TorrentStream) {
        self.inner.stop_stream(stream).await
    }

    /// Stop all active streams.
    pub async fn stop_all_streams(&self) {
        let streams: Vec<TorrentStream> =
            self.inner.streams.read().await.values().cloned().collect();

        debug!("Stopping a total of {} streams", streams.len());
        for stream in streams {
            self.inner.stop_stream(&stream).await;
        }
    }

    /// Resolve the active stream for the given key.
    pub async fn resolve(&self, key: &str) -> Option<TorrentStream> {
        let stream = self.inner.streams.read().await.get(key).cloned();
        if stream.is_none() {
            warn!("Torrent stream {} not found", key);
        }
        stream
    }

    /// Returns the number of active streams.
    pub async fn len(&self) -> usize {
        self.inner.streams.read().await.len()
    }

    /// Returns true when no stream is active.
    pub async fn is_empty(&self) -> bool {
        self.inner.streams.read().await.is_empty()
    }
}

impl Callback<TorrentStreamEvent> for TorrentStreamRegistry {
    fn subscribe(&self) -> Subscription<TorrentStreamEvent> {
        self.inner.callbacks.subscribe()
    }
}

#[derive(Debug)]
struct InnerTorrentStreamRegistry {
    address: ServerAddress,
    torrent_service: Arc<dyn TorrentService>,
    streams: RwLock<HashMap<String, TorrentStream>>,
    callbacks: MultiThreadedCallback<TorrentStreamEvent>,
}

impl InnerTorrentStreamRegistry {
    async fn start_stream(&self, torrent: Arc<dyn Torrent>) -> Result<TorrentStream> {
        let key = TorrentStream::stream_key(&torrent.absolute_file_path())?;
        let url = self.build_url(key.as_str())?;
        let stream = TorrentStream::new(torrent, url).await?;

        let mut streams = self.streams.write().await;
        if streams.contains_key(&key) {
            debug!("Torrent stream {} is already active", key);
            return Err(Error::AlreadyExists(key));
        }

        streams.insert(key, stream.clone());
        drop(streams);

        info!("Started torrent stream {}", stream);
        self.callbacks
            .invoke(TorrentStreamEvent::StreamStarted(stream.clone()));
        Ok(stream)
    }

    async fn stop_stream(&self, stream: &TorrentStream) {
        let key = stream.key();
        let removed = {
            let mut streams = self.streams.write().await;
            match streams.get(key).map(|active| active == stream) {
                Some(true) => streams.remove(key),
                Some(false) => {
                    warn!("Torrent stream {} has been replaced, ignoring stop", key);
                    None
                }
                None => None,
            }
        };

        let stream = match removed {
            None => {
                warn!("Unable to stop torrent stream {}, stream not found", key);
                return;
            }
            Some(e) => e,
        };

        stream.stop().await;
        let torrent_handle = stream.torrent_handle();
        trace!("Releasing torrent {} of stream {}", torrent_handle, key);
        if let Err(e) = self.torrent_service.release(&torrent_handle).await {
            warn!("Failed to release torrent of stream {}, {}", key, e);
        }

        info!("Stopped torrent stream {}", stream);
        self.callbacks
            .invoke(TorrentStreamEvent::StreamStopped(key.to_string()));
    }

    /// Build the url on which the stream of the given key can be reached.
    /// The key should consist out of a valid filename with video extension,
    /// as some media players use the url to determine the video format.
    fn build_url(&self, key: &str) -> Result<Url> {
        let addr = self.address.socket_addr().ok_or_else(|| {
            Error::Configuration("the stream server listener port is unknown".to_string())
        })?;
        let url = format!(
            "{}://{}/{}/{}",
            SERVER_PROTOCOL,
            addr,
            SERVER_VIDEO_PATH,
            utf8_percent_encode(key, FILENAME_ENCODE_SET)
        );

        Url::parse(url.as_str()).map_err(|e| Error::Configuration(e.to_string()))
    }
}
