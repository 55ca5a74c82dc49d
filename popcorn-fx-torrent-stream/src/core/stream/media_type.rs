use axum::http::HeaderValue;
use std::fmt::{Display, Formatter};
use std::path::Path;

/// The known video extensions and their media type.
const VIDEO_MEDIA_TYPES: &[(&str, &str, &str)] = &[
    ("mp4", "video", "mp4"),
    ("mkv", "video", "x-matroska"),
];

/// Represent a MIME type, as originally defined in RFC 2046
/// and subsequently used in other Internet protocols including HTTP.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaType {
    mime_type: String,
    subtype: String,
}

impl MediaType {
    /// Create a new media type.
    pub fn new<S: Into<String>>(mime_type: S, subtype: S) -> Self {
        Self {
            mime_type: mime_type.into(),
            subtype: subtype.into(),
        }
    }

    /// Retrieve the media type of the given filename, based on its extension.
    /// The extension is matched case-insensitive.
    ///
    /// Unknown or missing extensions result in [MediaType::octet_stream].
    ///
    /// ```rust
    /// use popcorn_fx_torrent_stream::core::stream::MediaType;
    ///
    /// let media_type = MediaType::from_filename("Big.Buck.Bunny.MKV");
    /// assert_eq!("video/x-matroska", media_type.to_string());
    /// ```
    pub fn from_filename(filename: &str) -> Self {
        Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .and_then(|extension| {
                VIDEO_MEDIA_TYPES
                    .iter()
                    .find(|(e, _, _)| e.eq_ignore_ascii_case(extension))
            })
            .map(|(_, mime_type, subtype)| Self::new(*mime_type, *subtype))
            .unwrap_or_else(Self::octet_stream)
    }

    /// Retrieve the octet-stream media type.
    pub fn octet_stream() -> Self {
        Self::new("application", "octet-stream")
    }

    /// Returns the top-level type of the media type.
    pub fn mime_type(&self) -> &str {
        self.mime_type.as_str()
    }

    /// Returns the subtype of the media type.
    pub fn subtype(&self) -> &str {
        self.subtype.as_str()
    }
}

impl Display for MediaType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.mime_type, self.subtype)
    }
}

impl TryFrom<MediaType> for HeaderValue {
    type Error = axum::http::header::InvalidHeaderValue;

    fn try_from(value: MediaType) -> Result<Self, Self::Error> {
        HeaderValue::from_str(value.to_string().as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_filename_mp4() {
        let result = MediaType::from_filename("movie.mp4");

        assert_eq!(MediaType::new("video", "mp4"), result);
    }

    #[test]
    fn test_from_filename_mkv() {
        let result = MediaType::from_filename("My.Movie.2024.1080p.mkv");

        assert_eq!("video/x-matroska", result.to_string());
    }

    #[test]
    fn test_from_filename_case_insensitive() {
        assert_eq!(
            MediaType::new("video", "mp4"),
            MediaType::from_filename("MOVIE.MP4")
        );
        assert_eq!(
            MediaType::new("video", "x-matroska"),
            MediaType::from_filename("movie.MkV")
        );
    }

    #[test]
    fn test_from_filename_unknown_extension() {
        let result = MediaType::from_filename("movie.avi");

        assert_eq!(MediaType::octet_stream(), result);
    }

    #[test]
    fn test_from_filename_without_extension() {
        let result = MediaType::from_filename("movie");

        assert_eq!("application/octet-stream", result.to_string());
    }

    #[test]
    fn test_header_value() {
        let result = HeaderValue::try_from(MediaType::from_filename("movie.mp4")).unwrap();

        assert_eq!("video/mp4", result.to_str().unwrap());
    }
}
