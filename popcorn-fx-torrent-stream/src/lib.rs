/// The current version of the torrent stream library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod core;

#[cfg(feature = "testing")]
pub mod testing {
    use log::{trace, LevelFilter};
    use log4rs::append::console::ConsoleAppender;
    use log4rs::config::{Appender, Logger, Root};
    use log4rs::encode::pattern::PatternEncoder;
    use log4rs::Config;
    use std::fs;
    use std::io::SeekFrom;
    use std::path::PathBuf;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
    use std::sync::{Arc, Once};
    use std::task::{Context, Poll};
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::io::{AsyncRead, AsyncSeek, ReadBuf};
    use tokio::select;
    use tokio::sync::broadcast::Receiver;

    pub use crate::core::torrents::{MockTorrent, MockTorrentService};

    static INIT: Once = Once::new();

    /// Initializes the logger with the specified log level.
    #[macro_export]
    macro_rules! init_logger {
        ($level:expr) => {
            $crate::testing::init_logger_level($level)
        };
        () => {
            $crate::testing::init_logger_level(log::LevelFilter::Trace)
        };
    }

    /// Initializes the logger with the specified log level.
    pub fn init_logger_level(level: LevelFilter) {
        INIT.call_once(|| {
            log4rs::init_config(Config::builder()
                .appender(Appender::builder().build("stdout", Box::new(ConsoleAppender::builder()
                    .encoder(Box::new(PatternEncoder::new("\x1B[37m{d(%Y-%m-%d %H:%M:%S%.3f)}\x1B[0m {h({l:>5.5})} \x1B[35m{I:>6.6}\x1B[0m \x1B[37m---\x1B[0m \x1B[37m[{T:>15.15}]\x1B[0m \x1B[36m{t:<60.60}\x1B[0m \x1B[37m:\x1B[0m {m}{n}")))
                    .build())))
                .logger(Logger::builder().build("fx_callback", LevelFilter::Info))
                .logger(Logger::builder().build("h2", LevelFilter::Info))
                .logger(Logger::builder().build("hyper", LevelFilter::Info))
                .logger(Logger::builder().build("hyper_util", LevelFilter::Info))
                .logger(Logger::builder().build("mio", LevelFilter::Info))
                .logger(Logger::builder().build("reqwest", LevelFilter::Info))
                .logger(Logger::builder().build("rustls", LevelFilter::Info))
                .logger(Logger::builder().build("tracing", LevelFilter::Info))
                .logger(Logger::builder().build("want", LevelFilter::Info))
                .build(Root::builder().appender("stdout").build(level))
                .unwrap())
                .unwrap();
        })
    }

    /// Receive a message from the given receiver, or panic if the timeout is reached.
    #[macro_export]
    macro_rules! recv_timeout {
        ($receiver:expr, $timeout:expr) => {
            $crate::testing::recv_timeout($receiver, $timeout, "expected to receive an instance")
                .await
        };
        ($receiver:expr, $timeout:expr, $message:expr) => {
            $crate::testing::recv_timeout($receiver, $timeout, $message).await
        };
    }

    /// Receive a message from the given receiver, or panic if the timeout is reached.
    ///
    /// # Arguments
    ///
    /// * `receiver` - The receiver to receive the message from.
    /// * `timeout` - The timeout to wait for the message.
    /// * `message` - The message to print if the timeout is reached.
    pub async fn recv_timeout<T: Clone>(
        receiver: &mut Receiver<T>,
        timeout: Duration,
        message: &str,
    ) -> T {
        select! {
            _ = tokio::time::sleep(timeout) => panic!("receiver timed-out after {}ms, {}", timeout.as_millis(), message),
            result = receiver.recv() => result.expect(message)
        }
    }

    /// Create deterministic test content of the given length.
    /// Every byte equals its offset modulo 251, which makes misaligned windows detectable.
    pub fn test_content(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    /// Write the given contents to a new file within the temp directory.
    ///
    /// It returns the absolute path of the created file.
    pub fn write_temp_file(temp_dir: &TempDir, filename: &str, contents: &[u8]) -> PathBuf {
        let destination = temp_dir.path().join(filename);

        trace!("Writing test file {:?} ({} bytes)", destination, contents.len());
        fs::write(&destination, contents).unwrap();
        destination
    }

    /// The read statistics of a [TrackedReader].
    #[derive(Debug)]
    pub struct ReadStats {
        bytes_read: AtomicU64,
        last_seek: AtomicU64,
        dropped: AtomicBool,
    }

    impl ReadStats {
        /// Returns the total number of bytes which have been read.
        pub fn bytes_read(&self) -> u64 {
            self.bytes_read.load(Ordering::SeqCst)
        }

        /// Returns the position of the last completed seek, if any.
        pub fn last_seek(&self) -> Option<u64> {
            match self.last_seek.load(Ordering::SeqCst) {
                u64::MAX => None,
                position => Some(position),
            }
        }

        /// Returns true when the reader has been dropped.
        pub fn is_dropped(&self) -> bool {
            self.dropped.load(Ordering::SeqCst)
        }
    }

    impl Default for ReadStats {
        fn default() -> Self {
            Self {
                bytes_read: Default::default(),
                last_seek: AtomicU64::new(u64::MAX),
                dropped: Default::default(),
            }
        }
    }

    /// A content reader which records the reads, seeks and drop of the wrapped reader.
    #[derive(Debug)]
    pub struct TrackedReader<R> {
        inner: R,
        stats: Arc<ReadStats>,
    }

    impl<R> TrackedReader<R> {
        pub fn new(inner: R, stats: Arc<ReadStats>) -> Self {
            Self { inner, stats }
        }
    }

    impl<R: AsyncRead + Unpin> AsyncRead for TrackedReader<R> {
        fn poll_read(
            self: Pin<&mut Self>,
            cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<std::io::Result<()>> {
            let this = self.get_mut();
            let filled = buf.filled().len();
            let result = Pin::new(&mut this.inner).poll_read(cx, buf);

            if let Poll::Ready(Ok(())) = &result {
                let len = (buf.filled().len() - filled) as u64;
                this.stats.bytes_read.fetch_add(len, Ordering::SeqCst);
            }
            result
        }
    }

    impl<R: AsyncSeek + Unpin> AsyncSeek for TrackedReader<R> {
        fn start_seek(self: Pin<&mut Self>, position: SeekFrom) -> std::io::Result<()> {
            Pin::new(&mut self.get_mut().inner).start_seek(position)
        }

        fn poll_complete(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<u64>> {
            let this = self.get_mut();
            let result = Pin::new(&mut this.inner).poll_complete(cx);

            if let Poll::Ready(Ok(position)) = &result {
                this.stats.last_seek.store(*position, Ordering::SeqCst);
            }
            result
        }
    }

    impl<R> Drop for TrackedReader<R> {
        fn drop(&mut self) {
            self.stats.dropped.store(true, Ordering::SeqCst);
        }
    }
}
