use crate::core::torrents::Result;
use async_trait::async_trait;
use fx_handle::Handle;
#[cfg(any(test, feature = "testing"))]
use mockall::automock;
use std::fmt::Debug;
use std::path::PathBuf;
use tokio::io::{AsyncRead, AsyncSeek};

/// A unique handle identifier of a [Torrent].
pub type TorrentHandle = Handle;

/// The byte reader over the (partially) downloaded file of a torrent.
///
/// Reads may wait for pieces that are not yet available, this is considered a normal
/// suspension of the reader and not an error.
pub trait ContentReader: AsyncRead + AsyncSeek + Debug + Send + Unpin {}

impl<T> ContentReader for T where T: AsyncRead + AsyncSeek + Debug + Send + Unpin {}

/// The content source of a torrent file with a known total length.
#[derive(Debug)]
pub struct TorrentContent {
    reader: Box<dyn ContentReader>,
    len: u64,
}

impl TorrentContent {
    /// Create a new content source for the given reader and total length in bytes.
    pub fn new<R>(reader: R, len: u64) -> Self
    where
        R: ContentReader + 'static,
    {
        Self {
            reader: Box::new(reader),
            len,
        }
    }

    /// Returns the total length of the content in bytes.
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Returns true when the content has no bytes.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Consume the content source and return the underlying reader.
    pub fn into_reader(self) -> Box<dyn ContentReader> {
        self.reader
    }
}

/// The torrent describes a shared file that is being downloaded by the torrent engine.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait Torrent: Debug + Send + Sync {
    /// Get the unique identifier handle of the torrent.
    fn handle(&self) -> TorrentHandle;

    /// Get the absolute filesystem path of the torrent file that is being streamed.
    fn absolute_file_path(&self) -> PathBuf;

    /// Get the total number of pieces of the torrent.
    /// It returns `0` when the torrent metadata is not yet known.
    async fn total_pieces(&self) -> usize;

    /// Open a new content source over the torrent file.
    async fn content(&self) -> Result<TorrentContent>;
}
