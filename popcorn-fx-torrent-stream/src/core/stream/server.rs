use crate::core::config::{ServerAddress, ServerSettings};
use crate::core::stream::{Result, VideoRequestHandler};
use crate::core::torrents::TorrentStreamRegistry;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, Response};
use axum::routing::get;
use axum::Router;
use log::{debug, error, info};
use std::net::Ipv4Addr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// The HTTP server which serves the active streams of a [TorrentStreamRegistry].
///
/// The server publishes its listener port to the registry's [ServerAddress], which allows
/// the registry to hand out stream urls once the server is running.
/// The server is shut down when [StreamServer::shutdown] is called, or when the last
/// instance is dropped.
#[derive(Debug, Clone)]
pub struct StreamServer {
    inner: Arc<InnerStreamServer>,
}

impl StreamServer {
    /// Create a new stream server for the given registry.
    ///
    /// The listener is bound to the port of the settings, a port of `0` lets the OS assign one.
    /// If the port is already in use, an error will be returned.
    pub async fn new(settings: &ServerSettings, registry: TorrentStreamRegistry) -> Result<Self> {
        let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, settings.port)).await?;
        let port = listener.local_addr()?.port();
        let address = registry.address().clone();
        let cancellation_token = CancellationToken::new();

        let router = Router::new()
            .route(
                "/video/{filename}",
                get(Self::do_get_video).head(Self::do_head_video),
            )
            .with_state(VideoRequestHandler::new(registry.clone()));
        let shutdown_signal = cancellation_token.clone().cancelled_owned();
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal)
                .await
            {
                error!("Stream server failed, {}", e);
            }
            debug!("Stream server listener has been closed");
        });

        address.bind(port);
        info!("Stream server is running on {}:{}", address.host(), port);
        Ok(Self {
            inner: Arc::new(InnerStreamServer {
                address,
                registry,
                cancellation_token,
            }),
        })
    }

    /// Returns the address on which the server is reachable.
    pub fn address(&self) -> &ServerAddress {
        &self.inner.address
    }

    /// Returns the registry of the streams which are served.
    pub fn registry(&self) -> &TorrentStreamRegistry {
        &self.inner.registry
    }

    /// Returns true when the server is still accepting requests.
    pub fn is_running(&self) -> bool {
        !self.inner.cancellation_token.is_cancelled()
    }

    /// Gracefully shut down the server.
    /// In-flight requests are completed, new connections are no longer accepted.
    pub fn shutdown(&self) {
        self.inner.shutdown();
    }

    async fn do_get_video(
        State(handler): State<VideoRequestHandler>,
        Path(filename): Path<String>,
        headers: HeaderMap,
    ) -> Response<Body> {
        handler
            .handle_video_request(filename.as_str(), &headers)
            .await
    }

    async fn do_head_video(
        State(handler): State<VideoRequestHandler>,
        Path(filename): Path<String>,
    ) -> Response<Body> {
        handler
            .handle_video_metadata_request(filename.as_str())
            .await
    }
}

#[derive(Debug)]
struct InnerStreamServer {
    address: ServerAddress,
    registry: TorrentStreamRegistry,
    cancellation_token: CancellationToken,
}

impl InnerStreamServer {
    fn shutdown(&self) {
        if self.cancellation_token.is_cancelled() {
            return;
        }

        debug!("Shutting down stream server");
        self.cancellation_token.cancel();
        self.address.unbind();
    }
}

impl Drop for InnerStreamServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::torrents::{FileTorrent, FileTorrentService};
    use crate::init_logger;
    use crate::testing::{test_content, write_temp_file};
    use axum::http::header::{ACCEPT_RANGES, CONTENT_TYPE, RANGE, USER_AGENT};
    use axum::http::StatusCode;
    use reqwest::Client;
    use std::net::IpAddr;

    #[tokio::test]
    async fn test_new() {
        init_logger!();
        let server = new_server().await;

        let result = server.address().port();

        assert_ne!(None, result, "expected the listener port to have been published");
        assert!(server.is_running());
    }

    #[tokio::test]
    async fn test_stream_video() {
        init_logger!();
        let temp_dir = tempfile::tempdir().unwrap();
        let data = test_content(200_000);
        let filepath = write_temp_file(&temp_dir, "large-[123].mp4", &data);
        let server = new_server().await;
        let stream = server
            .registry()
            .start_stream(Arc::new(FileTorrent::new(&filepath)))
            .await
            .unwrap();
        assert_eq!("/video/large-%5B123%5D.mp4", stream.url().path());

        let response = Client::new().get(stream.url().clone()).send().await.unwrap();

        assert_eq!(StatusCode::PARTIAL_CONTENT, response.status());
        assert_eq!(
            "video/mp4",
            response.headers().get(CONTENT_TYPE).unwrap().to_str().unwrap()
        );
        assert_eq!(data, response.bytes().await.unwrap().to_vec());
    }

    #[tokio::test]
    async fn test_stream_video_range() {
        init_logger!();
        let temp_dir = tempfile::tempdir().unwrap();
        let data = test_content(100_000);
        let filepath = write_temp_file(&temp_dir, "movie.mkv", &data);
        let server = new_server().await;
        let stream = server
            .registry()
            .start_stream(Arc::new(FileTorrent::new(&filepath)))
            .await
            .unwrap();

        let response = Client::new()
            .get(stream.url().clone())
            .header(RANGE, "bytes=70000-79999")
            .send()
            .await
            .unwrap();

        assert_eq!(StatusCode::PARTIAL_CONTENT, response.status());
        assert_eq!(data[70_000..80_000].to_vec(), response.bytes().await.unwrap().to_vec());
    }

    #[tokio::test]
    async fn test_stream_video_java_user_agent() {
        init_logger!();
        let temp_dir = tempfile::tempdir().unwrap();
        let filepath = write_temp_file(&temp_dir, "movie.mp4", &test_content(1000));
        let server = new_server().await;
        let stream = server
            .registry()
            .start_stream(Arc::new(FileTorrent::new(&filepath)))
            .await
            .unwrap();

        let response = Client::new()
            .get(stream.url().clone())
            .header(RANGE, "bytes=0-")
            .header(USER_AGENT, "Java/17.0.9")
            .send()
            .await
            .unwrap();

        assert_eq!(StatusCode::OK, response.status());
    }

    #[tokio::test]
    async fn test_stream_video_not_found() {
        init_logger!();
        let server = new_server().await;
        let url = format!(
            "http://{}/video/lorem.mp4",
            server.address().socket_addr().unwrap()
        );

        let response = Client::new().get(url).send().await.unwrap();

        assert_eq!(StatusCode::NOT_FOUND, response.status());
    }

    #[tokio::test]
    async fn test_stream_video_metadata() {
        init_logger!();
        let temp_dir = tempfile::tempdir().unwrap();
        let filepath = write_temp_file(&temp_dir, "movie.mkv", &test_content(2048));
        let server = new_server().await;
        let stream = server
            .registry()
            .start_stream(Arc::new(FileTorrent::new(&filepath)))
            .await
            .unwrap();

        let response = Client::new().head(stream.url().clone()).send().await.unwrap();

        assert_eq!(StatusCode::OK, response.status());
        assert_eq!(
            "bytes",
            response.headers().get(ACCEPT_RANGES).unwrap().to_str().unwrap()
        );
        assert_eq!(
            "video/x-matroska",
            response.headers().get(CONTENT_TYPE).unwrap().to_str().unwrap()
        );
    }

    #[tokio::test]
    async fn test_stream_video_after_stop() {
        init_logger!();
        let temp_dir = tempfile::tempdir().unwrap();
        let filepath = write_temp_file(&temp_dir, "movie.mp4", &test_content(1000));
        let server = new_server().await;
        let stream = server
            .registry()
            .start_stream(Arc::new(FileTorrent::new(&filepath)))
            .await
            .unwrap();
        server.registry().stop_stream(&stream).await;

        let response = Client::new().get(stream.url().clone()).send().await.unwrap();

        assert_eq!(StatusCode::NOT_FOUND, response.status());
    }

    #[tokio::test]
    async fn test_shutdown() {
        init_logger!();
        let server = new_server().await;

        server.shutdown();

        assert_eq!(None, server.address().port());
        assert!(!server.is_running());
    }

    #[tokio::test]
    async fn test_drop() {
        init_logger!();
        let server = new_server().await;
        let address = server.address().clone();

        drop(server);

        assert_eq!(None, address.port());
    }

    async fn new_server() -> StreamServer {
        let settings = ServerSettings::new(Some(IpAddr::V4(Ipv4Addr::LOCALHOST)), 0);
        let address = ServerAddress::new(settings.host_addr());
        let registry = TorrentStreamRegistry::new(address, Arc::new(FileTorrentService));

        StreamServer::new(&settings, registry)
            .await
            .expect("expected the stream server to have started")
    }
}
