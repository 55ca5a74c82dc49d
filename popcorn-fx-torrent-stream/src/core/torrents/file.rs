use crate::core::torrents::{Result, Torrent, TorrentContent, TorrentHandle, TorrentService};
use async_trait::async_trait;
use log::{debug, trace};
use std::path::{Path, PathBuf};
use tokio::fs::File;

/// The default piece length used to divide local files into pieces.
pub const DEFAULT_PIECE_LENGTH: u64 = 256 * 1024;

/// A [Torrent] backed by a file which is already fully present on the local filesystem.
#[derive(Debug)]
pub struct FileTorrent {
    handle: TorrentHandle,
    filepath: PathBuf,
    piece_length: u64,
}

impl FileTorrent {
    /// Create a new file torrent for the given filepath.
    pub fn new<P: AsRef<Path>>(filepath: P) -> Self {
        Self::with_piece_length(filepath, DEFAULT_PIECE_LENGTH)
    }

    /// Create a new file torrent which divides the file into pieces of the given length.
    pub fn with_piece_length<P: AsRef<Path>>(filepath: P, piece_length: u64) -> Self {
        Self {
            handle: TorrentHandle::new(),
            filepath: filepath.as_ref().to_path_buf(),
            piece_length: piece_length.max(1),
        }
    }
}

#[async_trait]
impl Torrent for FileTorrent {
    fn handle(&self) -> TorrentHandle {
        self.handle.clone()
    }

    fn absolute_file_path(&self) -> PathBuf {
        self.filepath.clone()
    }

    async fn total_pieces(&self) -> usize {
        match tokio::fs::metadata(&self.filepath).await {
            Ok(metadata) => metadata.len().div_ceil(self.piece_length) as usize,
            Err(e) => {
                debug!("Unable to read metadata of {:?}, {}", self.filepath, e);
                0
            }
        }
    }

    async fn content(&self) -> Result<TorrentContent> {
        let file = File::open(&self.filepath).await?;
        let len = file.metadata().await?.len();

        trace!("Opened content of {:?} with length {}", self.filepath, len);
        Ok(TorrentContent::new(file, len))
    }
}

/// The [TorrentService] for [FileTorrent] instances.
/// Local files are never removed from the filesystem when a torrent is released.
#[derive(Debug, Default)]
pub struct FileTorrentService;

#[async_trait]
impl TorrentService for FileTorrentService {
    async fn release(&self, handle: &TorrentHandle) -> Result<()> {
        debug!("Released file torrent {}", handle);
        Ok(())
    }
}
