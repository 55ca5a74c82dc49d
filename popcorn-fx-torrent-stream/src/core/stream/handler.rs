use crate::core::stream::{status_override, MediaType, Range, RangeWindow};
use crate::core::torrents::{TorrentContent, TorrentStream, TorrentStreamRegistry};
use axum::body::Body;
use axum::http::header::{
    ACCEPT_RANGES, CONNECTION, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, RANGE, USER_AGENT,
};
use axum::http::response::Builder;
use axum::http::{HeaderMap, Response, StatusCode};
use axum::response::IntoResponse;
use log::{debug, error, trace, warn};

const ACCEPT_RANGES_TYPE: &str = "bytes";
const CONNECTION_TYPE: &str = "keep-alive";
const HEADER_DLNA_TRANSFER_MODE: &str = "transferMode.dlna.org";
const HEADER_DLNA_REAL_TIME_INFO: &str = "realTimeInfo.dlna.org";
const HEADER_DLNA_CONTENT_FEATURES: &str = "contentFeatures.dlna.org";
const DLNA_TRANSFER_MODE_TYPE: &str = "Streaming";
const DLNA_REAL_TIME_TYPE: &str = "DLNA.ORG_TLAG=*";
const DLNA_CONTENT_FEATURES: &str =
    "DLNA.ORG_OP=01;DLNA.ORG_CI=0;DLNA.ORG_FLAGS=01100000000000000000000000000000";
const PLAIN_TEXT_TYPE: &str = "text/plain";

/// The handler of the video requests which are made to the stream server.
///
/// Video requests are served from the active streams of the [TorrentStreamRegistry],
/// only the requested byte window of a stream is read from its content source.
#[derive(Debug, Clone)]
pub struct VideoRequestHandler {
    registry: TorrentStreamRegistry,
}

impl VideoRequestHandler {
    pub fn new(registry: TorrentStreamRegistry) -> Self {
        Self { registry }
    }

    /// Handle a video request for the stream with the given filename.
    pub async fn handle_video_request(&self, filename: &str, headers: &HeaderMap) -> Response<Body> {
        let (stream, content) = match self.open_stream(filename).await {
            None => return Self::not_found_response(),
            Some(e) => e,
        };

        let range = Self::extract_range(headers);
        trace!(
            "Handling video request for {} with range {}",
            filename,
            range
                .as_ref()
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown".to_string())
        );
        let window = match RangeWindow::resolve(range.as_ref(), content.len()) {
            Ok(e) => e,
            Err(e) => {
                debug!("Unable to serve video request for {}, {}", filename, e);
                return Self::range_not_satisfiable_response(content.len());
            }
        };

        let status = headers
            .get(USER_AGENT)
            .and_then(|agent| match agent.to_str() {
                Ok(e) => status_override(e),
                Err(_) => {
                    warn!("User agent value is invalid for {}", filename);
                    None
                }
            })
            .unwrap_or(StatusCode::PARTIAL_CONTENT);

        let bytes = match stream
            .stream_region(content, window.start, window.length)
            .await
        {
            Ok(e) => e,
            Err(e) => {
                error!("Failed to stream {} of {}, {}", window, filename, e);
                return Self::not_found_response();
            }
        };

        trace!("Serving {} of {} with status {}", window, filename, status);
        let mut response =
            Self::streaming_response(status, filename).header(CONTENT_LENGTH, window.length);
        if let Some(content_range) = window.content_range() {
            response = response.header(CONTENT_RANGE, content_range);
        }

        response
            .body(Body::from_stream(bytes))
            .unwrap_or_else(Self::handle_internal_error)
    }

    /// Handle a video metadata (HEAD) request for the stream with the given filename.
    pub async fn handle_video_metadata_request(&self, filename: &str) -> Response<Body> {
        trace!("Handling video metadata request for {}", filename);
        let (_, content) = match self.open_stream(filename).await {
            None => return Self::not_found_response(),
            Some(e) => e,
        };

        Self::streaming_response(StatusCode::OK, filename)
            .header(CONTENT_LENGTH, content.len())
            .body(Body::empty())
            .unwrap_or_else(Self::handle_internal_error)
    }

    /// Resolve the active stream of the given filename and open its content source.
    async fn open_stream(&self, filename: &str) -> Option<(TorrentStream, TorrentContent)> {
        let stream = self.registry.resolve(filename).await?;

        match stream.content().await {
            Ok(content) => Some((stream, content)),
            Err(e) => {
                error!("Failed to open the content of stream {}, {}", stream, e);
                None
            }
        }
    }

    /// Try to extract the first range from the given headers.
    /// If the header is not present or its first range is invalid, `None` will be returned.
    fn extract_range(headers: &HeaderMap) -> Option<Range> {
        let value = headers.get(RANGE)?;
        let value = match value.to_str() {
            Ok(e) => e,
            Err(e) => {
                warn!("Range header is invalid, {}", e);
                return None;
            }
        };

        match Range::parse_first(value) {
            Ok(e) => Some(e),
            Err(e) => {
                warn!("Range header {} is invalid, {}", value, e);
                None
            }
        }
    }

    /// Create a response builder with the headers which are present on every video response.
    fn streaming_response(status: StatusCode, filename: &str) -> Builder {
        Response::builder()
            .status(status)
            .header(ACCEPT_RANGES, ACCEPT_RANGES_TYPE)
            .header(CONNECTION, CONNECTION_TYPE)
            .header(HEADER_DLNA_TRANSFER_MODE, DLNA_TRANSFER_MODE_TYPE)
            .header(HEADER_DLNA_REAL_TIME_INFO, DLNA_REAL_TIME_TYPE)
            .header(HEADER_DLNA_CONTENT_FEATURES, DLNA_CONTENT_FEATURES)
            .header(CONTENT_TYPE, MediaType::from_filename(filename))
    }

    fn not_found_response() -> Response<Body> {
        Response::builder()
            .status(StatusCode::NOT_FOUND)
            .body(Body::empty())
            .unwrap_or_else(Self::handle_internal_error)
    }

    /// The response for when the requested [Range] couldn't be satisfied.
    /// This is the case when the range starts beyond the length of the resource.
    fn range_not_satisfiable_response(resource_len: u64) -> Response<Body> {
        Response::builder()
            .status(StatusCode::RANGE_NOT_SATISFIABLE)
            .header(CONTENT_TYPE, PLAIN_TEXT_TYPE)
            .header(CONTENT_RANGE, format!("bytes */{}", resource_len))
            .body(Body::empty())
            .unwrap_or_else(Self::handle_internal_error)
    }

    /// Handle an internal error that occurred while building a response.
    /// This will return a 500 status code with an empty body.
    fn handle_internal_error(err: axum::http::Error) -> Response<Body> {
        error!("Stream server request failed, {}", err);
        (StatusCode::INTERNAL_SERVER_ERROR, Body::empty()).into_response()
    }
}
