use crate::core::torrents::{Error, Result, Torrent, TorrentContent, TorrentHandle};
use bytes::Bytes;
use derive_more::Display;
use futures::StreamExt;
use fx_handle::Handle;
use log::{debug, trace};
use std::fmt::{Display, Formatter};
use std::io;
use std::io::SeekFrom;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio::sync::Mutex;
use tokio_util::io::ReaderStream;
use tokio_util::sync::CancellationToken;
use url::Url;

/// The buffer size used while reading the torrent content.
const BUFFER_SIZE: usize = 64 * 1024;

/// The unique identifier handle of a torrent stream.
pub type StreamHandle = Handle;

/// The byte chunks of a region of the torrent content.
pub type StreamBytes = Pin<Box<dyn futures::Stream<Item = io::Result<Bytes>> + Send>>;

/// The state of a [TorrentStream].
#[derive(Debug, Display, Copy, Clone, PartialEq)]
pub enum StreamState {
    /// The torrent can be streamed over HTTP.
    Streaming = 0,
    /// The stream has been stopped and can no longer be streamed.
    Stopped = 1,
}

/// An active streaming session of a [Torrent] which is reachable over the stream url.
///
/// Clones share the same session, equality is based on the stream handle.
#[derive(Debug, Clone)]
pub struct TorrentStream {
    inner: Arc<InnerTorrentStream>,
}

impl TorrentStream {
    /// Create a new stream for the given torrent.
    ///
    /// It returns [Error::StreamPreparation] when the torrent doesn't have any pieces yet.
    pub async fn new(torrent: Arc<dyn Torrent>, url: Url) -> Result<Self> {
        let key = Self::stream_key(&torrent.absolute_file_path())?;
        let total_pieces = torrent.total_pieces().await;
        if total_pieces == 0 {
            debug!("Torrent {} has no pieces available yet", key);
            return Err(Error::StreamPreparation(key));
        }

        trace!("Creating stream {} with a total of {} pieces", key, total_pieces);
        Ok(Self {
            inner: Arc::new(InnerTorrentStream {
                handle: StreamHandle::new(),
                key,
                url,
                torrent,
                state: Mutex::new(StreamState::Streaming),
                cancellation_token: CancellationToken::new(),
            }),
        })
    }

    /// Derive the stream key from the given torrent filepath.
    /// The key is the base filename, including its extension.
    ///
    /// It returns [Error::InvalidArgument] when the path doesn't have a filename.
    pub fn stream_key(filepath: &Path) -> Result<String> {
        filepath
            .file_name()
            .map(|e| e.to_string_lossy().to_string())
            .filter(|e| !e.is_empty())
            .ok_or_else(|| {
                Error::InvalidArgument(format!("filepath {:?} has no filename", filepath))
            })
    }

    /// Returns the unique handle of the stream.
    pub fn handle(&self) -> StreamHandle {
        self.inner.handle.clone()
    }

    /// Returns the key, base filename, under which the stream is registered.
    pub fn key(&self) -> &str {
        self.inner.key.as_str()
    }

    /// Returns the url on which the stream can be reached.
    pub fn url(&self) -> &Url {
        &self.inner.url
    }

    /// Returns the handle of the torrent that is being streamed.
    pub fn torrent_handle(&self) -> TorrentHandle {
        self.inner.torrent.handle()
    }

    /// Returns the current state of the stream.
    pub async fn state(&self) -> StreamState {
        *self.inner.state.lock().await
    }

    /// Open the content source of the torrent.
    ///
    /// It returns [Error::InvalidStreamState] when the stream has been stopped.
    pub async fn content(&self) -> Result<TorrentContent> {
        self.inner.assert_state().await?;
        self.inner.torrent.content().await
    }

    /// Stream `len` bytes of the given content, starting at byte `offset`.
    ///
    /// Only the requested region is read from the content source, the returned bytes end
    /// early when the stream is stopped.
    pub async fn stream_region(
        &self,
        content: TorrentContent,
        offset: u64,
        len: u64,
    ) -> Result<StreamBytes> {
        self.inner.assert_state().await?;
        let mut reader = content.into_reader();
        reader.seek(SeekFrom::Start(offset)).await?;

        trace!("Streaming {} bytes from offset {} of {}", len, offset, self);
        let bytes = ReaderStream::with_capacity(reader.take(len), BUFFER_SIZE)
            .take_until(self.inner.cancellation_token.clone().cancelled_owned());
        Ok(Box::pin(bytes))
    }

    /// Stop the stream.
    /// This cancels the in-flight streaming regions and refuses new content readers.
    pub async fn stop(&self) {
        let mut state = self.inner.state.lock().await;
        if *state == StreamState::Stopped {
            return;
        }

        *state = StreamState::Stopped;
        self.inner.cancellation_token.cancel();
        debug!("Torrent stream {} has been stopped", self);
    }
}

impl PartialEq for TorrentStream {
    fn eq(&self, other: &Self) -> bool {
        self.inner.handle == other.inner.handle
    }
}

impl Display for TorrentStream {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.inner.key, self.inner.url)
    }
}

#[derive(Debug)]
struct InnerTorrentStream {
    handle: StreamHandle,
    key: String,
    url: Url,
    torrent: Arc<dyn Torrent>,
    state: Mutex<StreamState>,
    cancellation_token: CancellationToken,
}

impl InnerTorrentStream {
    async fn assert_state(&self) -> Result<()> {
        let state = *self.state.lock().await;
        if state != StreamState::Streaming {
            return Err(Error::InvalidStreamState(state));
        }
        Ok(())
    }
}
