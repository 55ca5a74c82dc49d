use crate::core::stream::{Error, Result};
use std::cmp::min;
use std::fmt::{Display, Formatter};

const BYTES_PREFIX: &str = "bytes=";
const BYTES_LEN: usize = BYTES_PREFIX.len();

/// The HTTP range information according to rfc7233.
/// The requested range only allows for `bytes` type, any other types will result in an [Err].
#[derive(Debug, Clone, PartialEq)]
pub enum Range {
    /// The range starting at the given offset, `start-end` or the open-ended `start-`.
    /// The `end` offset is inclusive.
    FromStart { start: u64, end: Option<u64> },
    /// The last `len` bytes of the resource, `-len`.
    Suffix { len: u64 },
}

impl Range {
    /// Parse the given `Range` header value into its byte ranges.
    pub fn parse(value: &str) -> Result<Vec<Self>> {
        let mut ranges = vec![];

        for value in Self::range_values(value)? {
            ranges.push(Self::parse_value(value.trim())?);
        }

        Ok(ranges)
    }

    /// Parse only the first byte range of the given `Range` header value.
    /// Any range after the first one is ignored, whether it's valid or not.
    pub fn parse_first(value: &str) -> Result<Self> {
        let first = Self::range_values(value)?
            .next()
            .ok_or(Error::InvalidRange)?;

        Self::parse_value(first.trim())
    }

    fn range_values(value: &str) -> Result<impl Iterator<Item = &str>> {
        let value = value.trim();
        if !value.starts_with(BYTES_PREFIX) {
            return Err(Error::InvalidRange);
        }

        Ok(value[BYTES_LEN..].split(','))
    }

    /// Returns the offset of the first byte of this range within a resource of `len` bytes.
    /// The offset is not limited to the resource length.
    pub fn start(&self, len: u64) -> u64 {
        match self {
            Range::FromStart { start, .. } => *start,
            Range::Suffix { len: suffix_len } => len - min(*suffix_len, len),
        }
    }

    /// Returns the exclusive end offset of this range within a resource of `len` bytes.
    /// Open-ended and suffix ranges end at the resource length.
    pub fn end(&self, len: u64) -> u64 {
        match self {
            Range::FromStart {
                end: Some(end), ..
            } => min(end.saturating_add(1), len),
            Range::FromStart { end: None, .. } => len,
            Range::Suffix { .. } => len,
        }
    }

    fn parse_value(value: &str) -> Result<Self> {
        let (start_value, end_value) = value.split_once('-').ok_or(Error::InvalidRange)?;

        if start_value.is_empty() {
            return Ok(Self::Suffix {
                len: Self::parse_offset(end_value)?,
            });
        }

        let start = Self::parse_offset(start_value)?;
        let mut end = None;

        if !end_value.is_empty() {
            let value = Self::parse_offset(end_value)?;
            if value < start {
                return Err(Error::InvalidRange);
            }
            end = Some(value);
        }

        Ok(Self::FromStart { start, end })
    }

    fn parse_offset(value: &str) -> Result<u64> {
        value
            .trim()
            .parse::<u64>()
            .map_err(|e| Error::Parse(e.to_string()))
    }
}

impl Display for Range {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Range::FromStart { start, end } => write!(
                f,
                "{}-{}",
                start,
                end.map(|e| e.to_string()).unwrap_or_default()
            ),
            Range::Suffix { len } => write!(f, "-{}", len),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse() {
        let value = "bytes=0-1023";

        let ranges = Range::parse(value).expect("expected a valid range");
        let range = ranges.first().expect("expected 1 range");

        assert_eq!(
            &Range::FromStart {
                start: 0,
                end: Some(1023)
            },
            range
        );
    }

    #[test]
    fn test_parse_invalid_prefix() {
        let value = "kb=0-1485";

        let ranges = Range::parse(value);

        assert_eq!(Err(Error::InvalidRange), ranges);
    }

    #[test]
    fn test_parse_invalid_start_value() {
        let value = "bytes=lorem-1023";

        let ranges = Range::parse(value);

        assert_eq!(Err(Error::Parse(String::new())), ranges);
    }

    #[test]
    fn test_parse_invalid_end_value() {
        let value = "bytes=10-lorem";

        let ranges = Range::parse(value);

        assert_eq!(Err(Error::Parse(String::new())), ranges);
    }

    #[test]
    fn test_parse_end_before_start() {
        let ranges = Range::parse("bytes=500-100");

        assert_eq!(Err(Error::InvalidRange), ranges);
    }

    #[test]
    fn test_parse_missing_separator() {
        let ranges = Range::parse("bytes=500");

        assert_eq!(Err(Error::InvalidRange), ranges);
    }

    #[test]
    fn test_parse_no_end_value() {
        let value = "bytes=0-";

        let ranges = Range::parse(value).expect("expected a valid range");
        let range = ranges.first().expect("expected 1 range");

        assert_eq!(&Range::FromStart { start: 0, end: None }, range);
    }

    #[test]
    fn test_parse_suffix() {
        let ranges = Range::parse("bytes=-500").expect("expected a valid range");

        assert_eq!(vec![Range::Suffix { len: 500 }], ranges);
    }

    #[test]
    fn test_parse_multiple_ranges() {
        let ranges = Range::parse("bytes=0-99, 200-299").expect("expected a valid range");

        assert_eq!(
            vec![
                Range::FromStart {
                    start: 0,
                    end: Some(99)
                },
                Range::FromStart {
                    start: 200,
                    end: Some(299)
                },
            ],
            ranges
        );
    }

    #[test]
    fn test_parse_first_ignores_trailing_ranges() {
        let expected_result = Range::FromStart {
            start: 0,
            end: Some(99),
        };

        assert_eq!(Ok(expected_result.clone()), Range::parse_first("bytes=0-99, x"));
        assert_eq!(Ok(expected_result.clone()), Range::parse_first("bytes=0-99,"));
        assert_eq!(Ok(expected_result), Range::parse_first("bytes=0-99, 200-299"));
    }

    #[test]
    fn test_parse_first_invalid() {
        assert_eq!(Err(Error::InvalidRange), Range::parse_first("bytes=x, 0-99"));
        assert_eq!(Err(Error::InvalidRange), Range::parse_first("items=0-99"));
        assert_eq!(Err(Error::InvalidRange), Range::parse_first("bytes="));
    }

    #[test]
    fn test_start_and_end() {
        let range = Range::FromStart {
            start: 100,
            end: Some(199),
        };
        assert_eq!(100, range.start(1000));
        assert_eq!(200, range.end(1000));

        let range = Range::FromStart {
            start: 500,
            end: Some(5000),
        };
        assert_eq!(1000, range.end(1000));

        let range = Range::FromStart {
            start: 0,
            end: None,
        };
        assert_eq!(0, range.start(1000));
        assert_eq!(1000, range.end(1000));
    }

    #[test]
    fn test_suffix_start_and_end() {
        let range = Range::Suffix { len: 300 };
        assert_eq!(700, range.start(1000));
        assert_eq!(1000, range.end(1000));

        let range = Range::Suffix { len: 3000 };
        assert_eq!(0, range.start(1000));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            "0-1023",
            Range::FromStart {
                start: 0,
                end: Some(1023)
            }
            .to_string()
        );
        assert_eq!("12-", Range::FromStart { start: 12, end: None }.to_string());
        assert_eq!("-500", Range::Suffix { len: 500 }.to_string());
    }
}
