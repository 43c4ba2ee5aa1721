//! Frame Decoder
//!
//! This module turns bytes back into [`RespValue`]s. The core primitive is
//! "parse one value and hand back whatever bytes follow it": aggregates fold
//! that primitive once per declared element, and the connection layer uses it
//! to peel pipelined frames off a single read buffer.
//!
//! ## Entry Points
//!
//! - [`decode`] - exactly one frame, the whole buffer must be consumed
//! - [`decode_with_remainder`] - one frame from the front, plus the rest
//! - [`parse_inline`] - a whitespace separated ASCII command line
//!
//! A frame that simply has not fully arrived yet yields
//! [`ParseError::Incomplete`], so a streaming caller can wait for more bytes
//! instead of rejecting the request.

use crate::protocol::types::{prefix, RespValue, CRLF};
use bytes::Bytes;
use std::num::ParseIntError;
use thiserror::Error;

/// Errors that can occur while decoding a frame.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    /// The input buffer is empty
    #[error("empty input")]
    EmptyInput,

    /// The frame is truncated; more bytes are needed
    #[error("incomplete frame")]
    Incomplete,

    /// Unknown type byte
    #[error("unknown type byte: {0:#04x}")]
    UnknownPrefix(u8),

    /// Invalid integer format
    #[error("invalid integer: {0}")]
    InvalidInteger(String),

    /// Invalid double format
    #[error("invalid double: {0}")]
    InvalidDouble(String),

    /// Boolean body other than `t` or `f`
    #[error("invalid boolean: {0}")]
    InvalidBoolean(String),

    /// Invalid UTF-8 in a textual payload
    #[error("invalid UTF-8: {0}")]
    InvalidUtf8(String),

    /// Blob length is negative (but not -1 where a null form exists)
    #[error("invalid bulk length: {0}")]
    InvalidBulkLength(i64),

    /// Aggregate length is negative (but not -1 for the null array)
    #[error("invalid aggregate length: {0}")]
    InvalidArrayLength(i64),

    /// A complete frame was followed by unexpected bytes
    #[error("declared length does not match payload: {0} trailing bytes")]
    TrailingBytes(usize),

    /// Protocol violation (missing CRLF, etc.)
    #[error("protocol error: {0}")]
    ProtocolError(String),

    /// The message exceeds maximum allowed size
    #[error("message too large: {size} bytes (max: {max})")]
    MessageTooLarge { size: usize, max: usize },
}

impl ParseError {
    /// True when the buffer holds the start of a valid frame but not all of it.
    pub fn is_incomplete(&self) -> bool {
        matches!(self, ParseError::Incomplete)
    }
}

impl From<std::str::Utf8Error> for ParseError {
    fn from(e: std::str::Utf8Error) -> Self {
        ParseError::InvalidUtf8(e.to_string())
    }
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Maximum size for a single blob payload (512 MB)
pub const MAX_BULK_SIZE: usize = 512 * 1024 * 1024;

/// Maximum aggregate nesting depth (prevent stack overflow)
pub const MAX_NESTING_DEPTH: usize = 32;

/// Elements pre-allocated for an aggregate, whatever its declared count.
const MAX_PREALLOCATED: usize = 1024;

/// A recursive frame parser.
///
/// # Example
///
/// ```
/// use nedis::protocol::parser::RespParser;
/// use nedis::protocol::RespValue;
///
/// let mut parser = RespParser::new();
/// let (value, rest) = parser.parse(b":1\r\n:2\r\n").unwrap();
/// assert_eq!(value, RespValue::Integer(1));
/// assert_eq!(rest, b":2\r\n");
/// ```
#[derive(Debug, Default)]
pub struct RespParser {
    /// Current nesting depth (for aggregate parsing)
    depth: usize,
}

impl RespParser {
    /// Creates a new parser instance.
    pub fn new() -> Self {
        Self { depth: 0 }
    }

    /// Parses one value from the front of `buf`.
    ///
    /// Returns the value together with the unconsumed bytes.
    pub fn parse<'a>(&mut self, buf: &'a [u8]) -> ParseResult<(RespValue, &'a [u8])> {
        if buf.is_empty() {
            return Err(ParseError::EmptyInput);
        }
        self.depth = 0;
        self.parse_value(buf)
    }

    /// Selects the variant from the type byte and parses it.
    fn parse_value<'a>(&mut self, buf: &'a [u8]) -> ParseResult<(RespValue, &'a [u8])> {
        let Some(&tag) = buf.first() else {
            return Err(ParseError::Incomplete);
        };

        match tag {
            prefix::SIMPLE_STRING => {
                let (line, rest) = read_line(buf)?;
                Ok((RespValue::SimpleString(utf8(line)?), rest))
            }
            prefix::SIMPLE_ERROR => {
                let (line, rest) = read_line(buf)?;
                Ok((RespValue::SimpleError(utf8(line)?), rest))
            }
            prefix::INTEGER => {
                let (line, rest) = read_line(buf)?;
                Ok((RespValue::Integer(parse_integer(line)?), rest))
            }
            prefix::NULL => {
                let (line, rest) = read_line(buf)?;
                if !line.is_empty() {
                    return Err(ParseError::ProtocolError(
                        "null frame carries a payload".to_string(),
                    ));
                }
                Ok((RespValue::Null, rest))
            }
            prefix::BOOLEAN => {
                let (line, rest) = read_line(buf)?;
                let b = match line {
                    b"t" => true,
                    b"f" => false,
                    other => {
                        return Err(ParseError::InvalidBoolean(
                            String::from_utf8_lossy(other).into_owned(),
                        ))
                    }
                };
                Ok((RespValue::Boolean(b), rest))
            }
            prefix::DOUBLE => {
                let (line, rest) = read_line(buf)?;
                Ok((RespValue::Double(parse_double(line)?), rest))
            }
            prefix::BIG_NUMBER => {
                let (line, rest) = read_line(buf)?;
                Ok((RespValue::BigNumber(parse_big_number(line)?), rest))
            }
            prefix::BULK_STRING => {
                let (data, rest) = read_blob(buf)?;
                let value = data.map(Bytes::copy_from_slice);
                Ok((RespValue::BulkString(value), rest))
            }
            prefix::BULK_ERROR => {
                let (data, rest) = read_blob(buf)?;
                let data = data.ok_or(ParseError::InvalidBulkLength(-1))?;
                Ok((RespValue::BulkError(utf8(data)?), rest))
            }
            prefix::VERBATIM_STRING => {
                let (data, rest) = read_blob(buf)?;
                let data = data.ok_or(ParseError::InvalidBulkLength(-1))?;
                if data.len() < 4 || data[3] != b':' {
                    return Err(ParseError::ProtocolError(
                        "verbatim string missing format prefix".to_string(),
                    ));
                }
                let value = RespValue::VerbatimString {
                    format: utf8(&data[..3])?,
                    text: utf8(&data[4..])?,
                };
                Ok((value, rest))
            }
            prefix::ARRAY => {
                let (count, rest) = read_count(buf)?;
                match count {
                    Some(count) => {
                        let (items, rest) = self.parse_elements(count, rest)?;
                        Ok((RespValue::Array(Some(items)), rest))
                    }
                    None => Ok((RespValue::Array(None), rest)),
                }
            }
            prefix::MAP => {
                let (count, rest) = read_count(buf)?;
                let count = count.ok_or(ParseError::InvalidArrayLength(-1))?;
                let (items, rest) = self.parse_elements(count.saturating_mul(2), rest)?;
                let mut items = items.into_iter();
                let mut pairs = Vec::with_capacity(count.min(MAX_PREALLOCATED));
                while let (Some(k), Some(v)) = (items.next(), items.next()) {
                    pairs.push((k, v));
                }
                Ok((RespValue::Map(pairs), rest))
            }
            prefix::SET => {
                let (count, rest) = read_count(buf)?;
                let count = count.ok_or(ParseError::InvalidArrayLength(-1))?;
                let (items, rest) = self.parse_elements(count, rest)?;
                Ok((RespValue::Set(items), rest))
            }
            prefix::PUSH => {
                let (count, rest) = read_count(buf)?;
                let count = count.ok_or(ParseError::InvalidArrayLength(-1))?;
                let (items, rest) = self.parse_elements(count, rest)?;
                Ok((RespValue::Push(items), rest))
            }
            other => Err(ParseError::UnknownPrefix(other)),
        }
    }

    /// Parses `count` consecutive values, threading the remainder through.
    fn parse_elements<'a>(
        &mut self,
        count: usize,
        mut rest: &'a [u8],
    ) -> ParseResult<(Vec<RespValue>, &'a [u8])> {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            return Err(ParseError::ProtocolError(format!(
                "maximum nesting depth exceeded: {}",
                MAX_NESTING_DEPTH
            )));
        }

        let mut items = Vec::with_capacity(count.min(MAX_PREALLOCATED));
        for _ in 0..count {
            let (value, remainder) = self.parse_value(rest)?;
            items.push(value);
            rest = remainder;
        }

        self.depth -= 1;
        Ok((items, rest))
    }
}

/// Splits `<type byte><line>\r\n<rest>` into `line` and `rest`.
fn read_line(buf: &[u8]) -> ParseResult<(&[u8], &[u8])> {
    let pos = find_crlf(&buf[1..]).ok_or(ParseError::Incomplete)?;
    Ok((&buf[1..1 + pos], &buf[1 + pos + 2..]))
}

/// Reads a length-prefixed body. `None` stands for the `-1` null form.
fn read_blob(buf: &[u8]) -> ParseResult<(Option<&[u8]>, &[u8])> {
    let (line, rest) = read_line(buf)?;
    let length = parse_integer(line)?;

    if length == -1 {
        return Ok((None, rest));
    }
    if length < 0 {
        return Err(ParseError::InvalidBulkLength(length));
    }

    let length = length as usize;
    if length > MAX_BULK_SIZE {
        return Err(ParseError::MessageTooLarge {
            size: length,
            max: MAX_BULK_SIZE,
        });
    }

    if rest.len() < length + CRLF.len() {
        return Err(ParseError::Incomplete);
    }
    if &rest[length..length + CRLF.len()] != CRLF {
        return Err(ParseError::ProtocolError(
            "bulk payload missing trailing CRLF".to_string(),
        ));
    }

    Ok((Some(&rest[..length]), &rest[length + CRLF.len()..]))
}

/// Reads an aggregate count. `None` stands for the `-1` null form.
fn read_count(buf: &[u8]) -> ParseResult<(Option<usize>, &[u8])> {
    let (line, rest) = read_line(buf)?;
    match parse_integer(line)? {
        -1 => Ok((None, rest)),
        n if n < 0 => Err(ParseError::InvalidArrayLength(n)),
        n => Ok((Some(n as usize), rest)),
    }
}

fn utf8(bytes: &[u8]) -> ParseResult<String> {
    Ok(std::str::from_utf8(bytes)?.to_string())
}

/// Parses a signed decimal; `+1000` and `-1000` are both accepted.
fn parse_integer(line: &[u8]) -> ParseResult<i64> {
    std::str::from_utf8(line)?
        .parse()
        .map_err(|e: ParseIntError| ParseError::InvalidInteger(e.to_string()))
}

fn parse_double(line: &[u8]) -> ParseResult<f64> {
    let s = std::str::from_utf8(line)?;
    match s {
        "inf" | "+inf" => Ok(f64::INFINITY),
        "-inf" => Ok(f64::NEG_INFINITY),
        "nan" => Ok(f64::NAN),
        _ => s
            .parse()
            .map_err(|_| ParseError::InvalidDouble(s.to_string())),
    }
}

fn parse_big_number(line: &[u8]) -> ParseResult<String> {
    let s = std::str::from_utf8(line)?;
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::InvalidInteger(s.to_string()));
    }
    Ok(s.to_string())
}

/// Finds the position of CRLF in the buffer.
///
/// Returns the position of `\r` if found, or None if CRLF is not present.
#[inline]
fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == CRLF)
}

/// Decodes exactly one frame; trailing bytes are rejected.
///
/// # Example
///
/// ```
/// use nedis::protocol::{decode, RespValue};
///
/// assert_eq!(decode(b":+1000\r\n").unwrap(), RespValue::Integer(1000));
/// assert!(decode(b":1\r\n:2\r\n").is_err());
/// ```
pub fn decode(buf: &[u8]) -> ParseResult<RespValue> {
    let (value, rest) = decode_with_remainder(buf)?;
    if !rest.is_empty() {
        return Err(ParseError::TrailingBytes(rest.len()));
    }
    Ok(value)
}

/// Decodes one frame from the front of `buf` and returns the bytes after it.
pub fn decode_with_remainder(buf: &[u8]) -> ParseResult<(RespValue, &[u8])> {
    RespParser::new().parse(buf)
}

/// Tokenises an ASCII command line on whitespace.
///
/// The result has the same shape as an array request: an Array of bulk
/// strings, one per token.
pub fn parse_inline(buf: &[u8]) -> ParseResult<RespValue> {
    let line = std::str::from_utf8(buf)?;

    let elements: Vec<RespValue> = line
        .split_whitespace()
        .map(|s| RespValue::bulk_string(Bytes::copy_from_slice(s.as_bytes())))
        .collect();

    if elements.is_empty() {
        return Err(ParseError::ProtocolError(
            "empty inline command".to_string(),
        ));
    }

    Ok(RespValue::array(elements))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bulk(s: &str) -> RespValue {
        RespValue::bulk_string(Bytes::from(s.to_string()))
    }

    #[test]
    fn test_parse_simple_string() {
        assert_eq!(decode(b"+OK\r\n").unwrap(), RespValue::simple_string("OK"));
    }

    #[test]
    fn test_parse_simple_string_incomplete() {
        assert_eq!(decode(b"+OK"), Err(ParseError::Incomplete));
    }

    #[test]
    fn test_parse_error() {
        assert_eq!(decode(b"-ERR\r\n").unwrap(), RespValue::error("ERR"));
    }

    #[test]
    fn test_parse_integer() {
        assert_eq!(decode(b":1000\r\n").unwrap(), RespValue::Integer(1000));
        assert_eq!(decode(b":-1000\r\n").unwrap(), RespValue::Integer(-1000));
    }

    #[test]
    fn test_parse_integer_with_plus_sign() {
        assert_eq!(decode(b":+1000\r\n").unwrap(), RespValue::Integer(1000));
    }

    #[test]
    fn test_parse_bulk_string() {
        assert_eq!(decode(b"$5\r\nhello\r\n").unwrap(), bulk("hello"));
        assert_eq!(decode(b"$0\r\n\r\n").unwrap(), bulk(""));
    }

    #[test]
    fn test_parse_null_bulk_string() {
        assert_eq!(decode(b"$-1\r\n").unwrap(), RespValue::null_bulk_string());
    }

    #[test]
    fn test_parse_bulk_string_incomplete() {
        assert_eq!(decode(b"$5\r\nhel"), Err(ParseError::Incomplete));
    }

    #[test]
    fn test_bulk_length_mismatch_is_rejected() {
        // Six bytes declared, five plus CRLF supplied.
        assert!(decode(b"$6\r\nhello\r\n").is_err());
        // Four bytes declared: the byte after the body is not CRLF.
        assert!(matches!(
            decode(b"$4\r\nhello\r\n"),
            Err(ParseError::ProtocolError(_))
        ));
    }

    #[test]
    fn test_parse_array() {
        assert_eq!(
            decode(b"*2\r\n$5\r\nhello\r\n$5\r\nworld\r\n").unwrap(),
            RespValue::array(vec![bulk("hello"), bulk("world")])
        );
        assert_eq!(
            decode(b"*5\r\n:1\r\n:2\r\n:3\r\n:4\r\n$5\r\nhello\r\n").unwrap(),
            RespValue::array(vec![
                RespValue::integer(1),
                RespValue::integer(2),
                RespValue::integer(3),
                RespValue::integer(4),
                bulk("hello"),
            ])
        );
    }

    #[test]
    fn test_parse_null_and_empty_array() {
        assert_eq!(decode(b"*-1\r\n").unwrap(), RespValue::null_array());
        assert_eq!(decode(b"*0\r\n").unwrap(), RespValue::array(vec![]));
    }

    #[test]
    fn test_parse_array_with_null_element() {
        assert_eq!(
            decode(b"*3\r\n$5\r\nhello\r\n$-1\r\n$5\r\nworld\r\n").unwrap(),
            RespValue::array(vec![
                bulk("hello"),
                RespValue::null_bulk_string(),
                bulk("world")
            ])
        );
    }

    #[test]
    fn test_parse_nested_array() {
        let input = b"*2\r\n*3\r\n:1\r\n:2\r\n:3\r\n*2\r\n+Hello\r\n-World\r\n";
        assert_eq!(
            decode(input).unwrap(),
            RespValue::array(vec![
                RespValue::array(vec![
                    RespValue::integer(1),
                    RespValue::integer(2),
                    RespValue::integer(3),
                ]),
                RespValue::array(vec![
                    RespValue::simple_string("Hello"),
                    RespValue::error("World"),
                ]),
            ])
        );
    }

    #[test]
    fn test_array_short_of_declared_elements() {
        assert_eq!(decode(b"*3\r\n:1\r\n:2\r\n"), Err(ParseError::Incomplete));
    }

    #[test]
    fn test_array_with_extra_elements_is_rejected() {
        assert_eq!(
            decode(b"*1\r\n:1\r\n:2\r\n"),
            Err(ParseError::TrailingBytes(4))
        );
    }

    #[test]
    fn test_parse_null_and_boolean() {
        assert_eq!(decode(b"_\r\n").unwrap(), RespValue::Null);
        assert_eq!(decode(b"#t\r\n").unwrap(), RespValue::Boolean(true));
        assert_eq!(decode(b"#f\r\n").unwrap(), RespValue::Boolean(false));
        assert!(matches!(
            decode(b"#x\r\n"),
            Err(ParseError::InvalidBoolean(_))
        ));
    }

    #[test]
    fn test_parse_double() {
        assert_eq!(decode(b",1.23\r\n").unwrap(), RespValue::Double(1.23));
        assert_eq!(decode(b",-1.23\r\n").unwrap(), RespValue::Double(-1.23));
        assert_eq!(decode(b",inf\r\n").unwrap(), RespValue::Double(f64::INFINITY));
        assert_eq!(
            decode(b",-inf\r\n").unwrap(),
            RespValue::Double(f64::NEG_INFINITY)
        );
    }

    #[test]
    fn test_nan_is_not_equal_to_itself() {
        let decoded = decode(b",nan\r\n").unwrap();
        assert!(matches!(decoded, RespValue::Double(d) if d.is_nan()));
        assert_ne!(decoded, RespValue::Double(f64::NAN));
        assert_ne!(
            decode(&RespValue::Double(f64::NAN).serialize()).unwrap(),
            RespValue::Double(f64::NAN)
        );
    }

    #[test]
    fn test_parse_resp3_types() {
        assert_eq!(
            decode(b"(3492890328409238509324850943850943825024385\r\n").unwrap(),
            RespValue::BigNumber("3492890328409238509324850943850943825024385".to_string())
        );
        assert_eq!(
            decode(b"!21\r\nSYNTAX invalid syntax\r\n").unwrap(),
            RespValue::BulkError("SYNTAX invalid syntax".to_string())
        );
        assert_eq!(
            decode(b"=15\r\ntxt:Some string\r\n").unwrap(),
            RespValue::VerbatimString {
                format: "txt".to_string(),
                text: "Some string".to_string(),
            }
        );
        assert_eq!(
            decode(b"%2\r\n+first\r\n:1\r\n+second\r\n:2\r\n").unwrap(),
            RespValue::Map(vec![
                (RespValue::simple_string("first"), RespValue::integer(1)),
                (RespValue::simple_string("second"), RespValue::integer(2)),
            ])
        );
        assert_eq!(
            decode(b"~2\r\n:1\r\n:2\r\n").unwrap(),
            RespValue::Set(vec![RespValue::integer(1), RespValue::integer(2)])
        );
        assert_eq!(
            decode(b">2\r\n+message\r\n+hi\r\n").unwrap(),
            RespValue::Push(vec![
                RespValue::simple_string("message"),
                RespValue::simple_string("hi"),
            ])
        );
    }

    #[test]
    fn test_invalid_big_number() {
        assert!(matches!(
            decode(b"(12a\r\n"),
            Err(ParseError::InvalidInteger(_))
        ));
    }

    #[test]
    fn test_unknown_type_byte() {
        let err = decode(b"@invalid\r\n").unwrap_err();
        assert_eq!(err, ParseError::UnknownPrefix(b'@'));
        assert!(err.to_string().contains("unknown type byte"));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(decode(b""), Err(ParseError::EmptyInput));
    }

    #[test]
    fn test_parse_invalid_integer() {
        assert!(matches!(
            decode(b":not_a_number\r\n"),
            Err(ParseError::InvalidInteger(_))
        ));
    }

    #[test]
    fn test_negative_lengths_are_rejected() {
        assert_eq!(decode(b"$-2\r\n"), Err(ParseError::InvalidBulkLength(-2)));
        assert_eq!(decode(b"*-2\r\n"), Err(ParseError::InvalidArrayLength(-2)));
        assert_eq!(decode(b"~-1\r\n"), Err(ParseError::InvalidArrayLength(-1)));
    }

    #[test]
    fn test_nesting_depth_limit() {
        let mut input = Vec::new();
        for _ in 0..=MAX_NESTING_DEPTH {
            input.extend_from_slice(b"*1\r\n");
        }
        input.extend_from_slice(b":1\r\n");
        assert!(matches!(
            decode(&input),
            Err(ParseError::ProtocolError(_))
        ));
    }

    #[test]
    fn test_decode_with_remainder() {
        let input = b"*2\r\n$3\r\nGET\r\n$1\r\nk\r\n+OK\r\n";
        let (value, rest) = decode_with_remainder(input).unwrap();
        assert_eq!(value, RespValue::array(vec![bulk("GET"), bulk("k")]));
        assert_eq!(rest, b"+OK\r\n");

        let (value, rest) = decode_with_remainder(rest).unwrap();
        assert_eq!(value, RespValue::ok());
        assert!(rest.is_empty());
    }

    #[test]
    fn test_roundtrip() {
        let values = vec![
            RespValue::simple_string("OK"),
            RespValue::error("ERR boom"),
            RespValue::integer(i64::MIN),
            bulk("binary\r\nsafe"),
            RespValue::null_bulk_string(),
            RespValue::null_array(),
            RespValue::array(vec![]),
            RespValue::Null,
            RespValue::boolean(false),
            RespValue::double(0.1),
            RespValue::double(1e300),
            RespValue::double(f64::NEG_INFINITY),
            RespValue::BigNumber("-12345678901234567890".to_string()),
            RespValue::BulkError("ERR\r\nmulti-line".to_string()),
            RespValue::VerbatimString {
                format: "mkd".to_string(),
                text: "# title".to_string(),
            },
            RespValue::Map(vec![(bulk("k"), RespValue::array(vec![RespValue::Null]))]),
            RespValue::Set(vec![RespValue::boolean(true)]),
            RespValue::Push(vec![bulk("message"), RespValue::integer(1)]),
        ];

        for original in values {
            let serialized = original.serialize();
            assert_eq!(decode(&serialized).unwrap(), original, "{:?}", original);
        }
    }

    #[test]
    fn test_binary_safe_bulk_string() {
        let input = b"$5\r\nhel\x00o\r\n";
        assert_eq!(
            decode(input).unwrap(),
            RespValue::bulk_string(Bytes::from(&b"hel\x00o"[..]))
        );
    }

    #[test]
    fn test_parse_inline_command() {
        assert_eq!(
            parse_inline(b"SET  name\tAriz\r\n").unwrap(),
            RespValue::array(vec![bulk("SET"), bulk("name"), bulk("Ariz")])
        );
        assert!(matches!(
            parse_inline(b"  \r\n"),
            Err(ParseError::ProtocolError(_))
        ));
    }
}
