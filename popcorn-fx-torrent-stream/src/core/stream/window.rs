use crate::core::stream::{Error, Range, Result};
use std::fmt::{Display, Formatter};

/// The window of bytes which is served for a single request, `[start, start + length)`.
/// A window never exceeds the length of the resource it has been resolved for.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RangeWindow {
    /// The offset of the first byte.
    pub start: u64,
    /// The number of bytes within the window.
    pub length: u64,
    /// The total length of the resource.
    pub resource_len: u64,
}

impl RangeWindow {
    /// Resolve the window of the requested range within a resource of `resource_len` bytes.
    /// The whole resource is served when no range has been requested.
    ///
    /// It returns [Error::RangeNotSatisfiable] when the range starts beyond the resource length.
    pub fn resolve(range: Option<&Range>, resource_len: u64) -> Result<Self> {
        let (start, end) = match range {
            None => (0, resource_len),
            Some(range) => (range.start(resource_len), range.end(resource_len)),
        };

        if start > resource_len {
            return Err(Error::RangeNotSatisfiable {
                start,
                len: resource_len,
            });
        }

        let length = end.saturating_sub(start).min(resource_len - start);
        Ok(Self {
            start,
            length,
            resource_len,
        })
    }

    /// Returns the exclusive end offset of the window.
    pub fn end(&self) -> u64 {
        self.start + self.length
    }

    /// Returns the HTTP content range of the window.
    /// An empty window has no content range.
    pub fn content_range(&self) -> Option<String> {
        if self.length == 0 {
            return None;
        }

        Some(format!(
            "bytes {}-{}/{}",
            self.start,
            self.end() - 1,
            self.resource_len
        ))
    }
}

impl Display for RangeWindow {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})/{}", self.start, self.end(), self.resource_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_no_range() {
        let result = RangeWindow::resolve(None, 500).unwrap();

        assert_eq!(0, result.start);
        assert_eq!(500, result.end());
        assert_eq!(500, result.length);
    }

    #[test]
    fn test_resolve_open_ended() {
        let range = Range::FromStart {
            start: 0,
            end: None,
        };

        let result = RangeWindow::resolve(Some(&range), 1000).unwrap();

        assert_eq!(0, result.start);
        assert_eq!(1000, result.end());
    }

    #[test]
    fn test_resolve_open_ended_offset() {
        let range = Range::FromStart {
            start: 600,
            end: None,
        };

        let result = RangeWindow::resolve(Some(&range), 1000).unwrap();

        assert_eq!(600, result.start);
        assert_eq!(400, result.length);
    }

    #[test]
    fn test_resolve_bounded() {
        let range = Range::FromStart {
            start: 100,
            end: Some(199),
        };

        let result = RangeWindow::resolve(Some(&range), 1000).unwrap();

        assert_eq!(100, result.start);
        assert_eq!(100, result.length);
        assert_eq!(Some("bytes 100-199/1000".to_string()), result.content_range());
    }

    #[test]
    fn test_resolve_clamps_to_resource_len() {
        let range = Range::FromStart {
            start: 900,
            end: Some(50_000),
        };

        let result = RangeWindow::resolve(Some(&range), 1000).unwrap();

        assert_eq!(900, result.start);
        assert_eq!(1000, result.end());
    }

    #[test]
    fn test_resolve_suffix() {
        let range = Range::Suffix { len: 250 };

        let result = RangeWindow::resolve(Some(&range), 1000).unwrap();

        assert_eq!(750, result.start);
        assert_eq!(250, result.length);
    }

    #[test]
    fn test_resolve_start_at_resource_len() {
        let range = Range::FromStart {
            start: 1000,
            end: None,
        };

        let result = RangeWindow::resolve(Some(&range), 1000).unwrap();

        assert_eq!(0, result.length);
        assert_eq!(None, result.content_range());
    }

    #[test]
    fn test_resolve_start_beyond_resource_len() {
        let range = Range::FromStart {
            start: 2000,
            end: None,
        };

        let result = RangeWindow::resolve(Some(&range), 1000);

        assert_eq!(
            Err(Error::RangeNotSatisfiable {
                start: 2000,
                len: 1000
            }),
            result
        );
    }

    #[test]
    fn test_resolve_never_exceeds_resource_len() {
        let len = 1000;

        for start in (0..=len).step_by(50) {
            for end in [None, Some(start), Some(start + 10), Some(len * 2)] {
                let range = Range::FromStart { start, end };
                let window = RangeWindow::resolve(Some(&range), len).unwrap();

                assert!(window.start <= window.end(), "invalid window {}", window);
                assert!(window.end() <= len, "window {} exceeds {}", window, len);
            }
        }
    }

    #[test]
    fn test_display() {
        let window = RangeWindow::resolve(None, 300).unwrap();

        assert_eq!("[0, 300)/300", window.to_string());
    }
}
