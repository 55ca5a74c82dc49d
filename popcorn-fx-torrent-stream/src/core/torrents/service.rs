use crate::core::torrents::{Result, TorrentHandle};
use async_trait::async_trait;
#[cfg(any(test, feature = "testing"))]
use mockall::automock;
use std::fmt::Debug;

/// The torrent service owns the torrents of the torrent engine.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait TorrentService: Debug + Send + Sync {
    /// Release the torrent with the given handle.
    /// This frees the resources held by the torrent engine for the torrent.
    async fn release(&self, handle: &TorrentHandle) -> Result<()>;
}
