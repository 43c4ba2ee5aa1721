//! Wire Protocol Data Types
//!
//! This module defines the closed set of values that travel over the wire.
//! Every frame starts with a type byte that selects the variant, followed by
//! a header line (a literal or a length) and, for blob and aggregate types,
//! a body.
//!
//! ## Protocol Format
//!
//! | Byte | Variant         | Example                          |
//! |------|-----------------|----------------------------------|
//! | `+`  | Simple String   | `+OK\r\n`                        |
//! | `-`  | Simple Error    | `-ERR unknown command 'FOO'\r\n` |
//! | `:`  | Integer         | `:1000\r\n`                      |
//! | `$`  | Bulk String     | `$5\r\nhello\r\n`, `$-1\r\n`     |
//! | `*`  | Array           | `*2\r\n:1\r\n:2\r\n`, `*-1\r\n`  |
//! | `_`  | Null            | `_\r\n`                          |
//! | `#`  | Boolean         | `#t\r\n`                         |
//! | `,`  | Double          | `,1.23\r\n`, `,inf\r\n`          |
//! | `(`  | Big Number      | `(3492890328409238509324850943850943825024385\r\n` |
//! | `!`  | Bulk Error      | `!21\r\nSYNTAX invalid syntax\r\n` |
//! | `=`  | Verbatim String | `=15\r\ntxt:Some string\r\n`     |
//! | `%`  | Map             | `%1\r\n+key\r\n:1\r\n`           |
//! | `~`  | Set             | `~2\r\n:1\r\n:2\r\n`             |
//! | `>`  | Push            | `>2\r\n+message\r\n+hi\r\n`      |

use crate::storage::Value;
use bytes::Bytes;
use std::fmt;

/// The CRLF terminator used in every frame
pub const CRLF: &[u8] = b"\r\n";

/// Type bytes, one per variant
pub mod prefix {
    pub const SIMPLE_STRING: u8 = b'+';
    pub const SIMPLE_ERROR: u8 = b'-';
    pub const INTEGER: u8 = b':';
    pub const BULK_STRING: u8 = b'$';
    pub const ARRAY: u8 = b'*';
    pub const NULL: u8 = b'_';
    pub const BOOLEAN: u8 = b'#';
    pub const DOUBLE: u8 = b',';
    pub const BIG_NUMBER: u8 = b'(';
    pub const BULK_ERROR: u8 = b'!';
    pub const VERBATIM_STRING: u8 = b'=';
    pub const MAP: u8 = b'%';
    pub const SET: u8 = b'~';
    pub const PUSH: u8 = b'>';
}

/// A single protocol value.
///
/// Equality is structural. `Double(f64::NAN)` never equals itself, matching
/// IEEE-754, so NaN is the one value that does not survive an
/// encode/decode comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum RespValue {
    /// Line-based text. CR and LF are written as spaces.
    /// Format: `+<string>\r\n`
    SimpleString(String),

    /// Line-based error message. CR and LF are written as spaces.
    /// Format: `-<message>\r\n`
    SimpleError(String),

    /// 64-bit signed integer. A leading `+` is accepted when parsing.
    /// Format: `:<integer>\r\n`
    Integer(i64),

    /// Binary-safe, length-prefixed string. `None` is the null string.
    /// Format: `$<length>\r\n<data>\r\n`, null: `$-1\r\n`
    BulkString(Option<Bytes>),

    /// Ordered sequence of values. `None` is the null array.
    /// Format: `*<count>\r\n<element>...`, null: `*-1\r\n`
    Array(Option<Vec<RespValue>>),

    /// Format: `_\r\n`
    Null,

    /// Format: `#t\r\n` or `#f\r\n`
    Boolean(bool),

    /// Format: `,<float>\r\n`, with literal `inf`, `-inf` and `nan`
    Double(f64),

    /// Arbitrary precision integer kept as its decimal text: an optional
    /// sign followed by at least one digit. [`RespValue::big_number`]
    /// checks this; other text will not decode.
    /// Format: `(<number>\r\n`
    BigNumber(String),

    /// Length-prefixed error message.
    /// Format: `!<length>\r\n<message>\r\n`
    BulkError(String),

    /// Length-prefixed text tagged with a three byte format (`txt`, `mkd`).
    /// [`RespValue::verbatim`] checks the format length; any other length
    /// will not decode.
    /// Format: `=<length>\r\n<format>:<text>\r\n`
    VerbatimString { format: String, text: String },

    /// Ordered key/value pairs.
    /// Format: `%<pairs>\r\n<key><value>...`
    Map(Vec<(RespValue, RespValue)>),

    /// Format: `~<count>\r\n<element>...`
    Set(Vec<RespValue>),

    /// Out-of-band data pushed to the client.
    /// Format: `><count>\r\n<element>...`
    Push(Vec<RespValue>),
}

impl RespValue {
    /// Creates a new simple string response.
    ///
    /// # Example
    /// ```
    /// use nedis::protocol::types::RespValue;
    /// let ok = RespValue::simple_string("OK");
    /// assert_eq!(ok.serialize(), b"+OK\r\n");
    /// ```
    pub fn simple_string(s: impl Into<String>) -> Self {
        RespValue::SimpleString(s.into())
    }

    /// Creates a new error response.
    ///
    /// # Example
    /// ```
    /// use nedis::protocol::types::RespValue;
    /// let err = RespValue::error("ERR unknown command 'FOO'");
    /// assert!(err.is_error());
    /// ```
    pub fn error(s: impl Into<String>) -> Self {
        RespValue::SimpleError(s.into())
    }

    /// Creates a new integer response.
    pub fn integer(n: i64) -> Self {
        RespValue::Integer(n)
    }

    /// Creates a new bulk string response.
    ///
    /// # Example
    /// ```
    /// use nedis::protocol::types::RespValue;
    /// use bytes::Bytes;
    /// let bulk = RespValue::bulk_string(Bytes::from("hello"));
    /// assert_eq!(bulk.serialize(), b"$5\r\nhello\r\n");
    /// ```
    pub fn bulk_string(data: impl Into<Bytes>) -> Self {
        RespValue::BulkString(Some(data.into()))
    }

    /// The null bulk string, `$-1\r\n`.
    pub fn null_bulk_string() -> Self {
        RespValue::BulkString(None)
    }

    /// Creates an array response.
    pub fn array(values: Vec<RespValue>) -> Self {
        RespValue::Array(Some(values))
    }

    /// The null array, `*-1\r\n`.
    pub fn null_array() -> Self {
        RespValue::Array(None)
    }

    /// Creates a null response.
    pub fn null() -> Self {
        RespValue::Null
    }

    pub fn boolean(b: bool) -> Self {
        RespValue::Boolean(b)
    }

    pub fn double(d: f64) -> Self {
        RespValue::Double(d)
    }

    /// Creates a big number from its decimal text.
    ///
    /// Returns `None` unless `n` is an optional `+`/`-` followed by digits.
    ///
    /// # Example
    /// ```
    /// use nedis::protocol::types::RespValue;
    /// assert!(RespValue::big_number("-3492890328409238509324850943850943825024385").is_some());
    /// assert!(RespValue::big_number("1.5").is_none());
    /// ```
    pub fn big_number(n: impl Into<String>) -> Option<Self> {
        let n = n.into();
        let digits = n.strip_prefix(['+', '-']).unwrap_or(n.as_str());
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some(RespValue::BigNumber(n))
    }

    /// Creates a verbatim string. `format` must be exactly three bytes.
    pub fn verbatim(format: impl Into<String>, text: impl Into<String>) -> Option<Self> {
        let format = format.into();
        if format.len() != 3 {
            return None;
        }
        Some(RespValue::VerbatimString {
            format,
            text: text.into(),
        })
    }

    /// Common response for successful operations
    pub fn ok() -> Self {
        RespValue::SimpleString("OK".to_string())
    }

    /// Common response for PONG
    pub fn pong() -> Self {
        RespValue::SimpleString("PONG".to_string())
    }

    /// Serializes the value to bytes for sending over the wire.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.serialize_into(&mut buf);
        buf
    }

    /// Serializes the value into an existing buffer.
    ///
    /// This is more efficient than `serialize()` when you want to reuse a buffer.
    pub fn serialize_into(&self, buf: &mut Vec<u8>) {
        match self {
            RespValue::SimpleString(s) => write_text(buf, prefix::SIMPLE_STRING, s),
            RespValue::SimpleError(s) => write_text(buf, prefix::SIMPLE_ERROR, s),
            RespValue::Integer(n) => write_line(buf, prefix::INTEGER, n.to_string().as_bytes()),
            RespValue::BulkString(Some(data)) => write_blob(buf, prefix::BULK_STRING, &[&data[..]]),
            RespValue::BulkString(None) => write_line(buf, prefix::BULK_STRING, b"-1"),
            RespValue::Array(Some(values)) => {
                write_line(buf, prefix::ARRAY, values.len().to_string().as_bytes());
                for value in values {
                    value.serialize_into(buf);
                }
            }
            RespValue::Array(None) => write_line(buf, prefix::ARRAY, b"-1"),
            RespValue::Null => write_line(buf, prefix::NULL, b""),
            RespValue::Boolean(b) => {
                write_line(buf, prefix::BOOLEAN, if *b { b"t" } else { b"f" })
            }
            RespValue::Double(d) => write_line(buf, prefix::DOUBLE, format_double(*d).as_bytes()),
            RespValue::BigNumber(n) => write_line(buf, prefix::BIG_NUMBER, n.as_bytes()),
            RespValue::BulkError(s) => write_blob(buf, prefix::BULK_ERROR, &[s.as_bytes()]),
            RespValue::VerbatimString { format, text } => write_blob(
                buf,
                prefix::VERBATIM_STRING,
                &[format.as_bytes(), b":", text.as_bytes()],
            ),
            RespValue::Map(pairs) => {
                write_line(buf, prefix::MAP, pairs.len().to_string().as_bytes());
                for (key, value) in pairs {
                    key.serialize_into(buf);
                    value.serialize_into(buf);
                }
            }
            RespValue::Set(values) => {
                write_line(buf, prefix::SET, values.len().to_string().as_bytes());
                for value in values {
                    value.serialize_into(buf);
                }
            }
            RespValue::Push(values) => {
                write_line(buf, prefix::PUSH, values.len().to_string().as_bytes());
                for value in values {
                    value.serialize_into(buf);
                }
            }
        }
    }

    /// Returns true if this value is null (`_`, `$-1` or `*-1`).
    pub fn is_null(&self) -> bool {
        matches!(
            self,
            RespValue::Null | RespValue::BulkString(None) | RespValue::Array(None)
        )
    }

    /// Returns true if this value is an error.
    pub fn is_error(&self) -> bool {
        matches!(self, RespValue::SimpleError(_) | RespValue::BulkError(_))
    }

    /// Attempts to extract the inner string from SimpleString or BulkString.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            RespValue::SimpleString(s) => Some(s),
            RespValue::BulkString(Some(b)) => std::str::from_utf8(b).ok(),
            _ => None,
        }
    }

    /// Attempts to extract the inner integer.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            RespValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Consumes self and returns the elements if this is a non-null Array.
    pub fn into_array(self) -> Option<Vec<RespValue>> {
        match self {
            RespValue::Array(Some(arr)) => Some(arr),
            _ => None,
        }
    }
}

/// Writes `<prefix><line>\r\n`.
#[inline]
fn write_line(buf: &mut Vec<u8>, prefix: u8, line: &[u8]) {
    buf.push(prefix);
    buf.extend_from_slice(line);
    buf.extend_from_slice(CRLF);
}

/// Writes a single-line value with CR and LF replaced by spaces, so the text
/// can never end the frame early.
fn write_text(buf: &mut Vec<u8>, prefix: u8, text: &str) {
    buf.push(prefix);
    buf.extend(text.bytes().map(|b| match b {
        b'\r' | b'\n' => b' ',
        b => b,
    }));
    buf.extend_from_slice(CRLF);
}

/// Writes `<prefix><total length>\r\n<parts...>\r\n`.
fn write_blob(buf: &mut Vec<u8>, prefix: u8, parts: &[&[u8]]) {
    let len: usize = parts.iter().map(|p| p.len()).sum();
    write_line(buf, prefix, len.to_string().as_bytes());
    for part in parts {
        buf.extend_from_slice(part);
    }
    buf.extend_from_slice(CRLF);
}

/// Renders a double so that it parses back to the same bits.
///
/// The special values use the literal spellings `inf`, `-inf` and `nan`.
pub fn format_double(d: f64) -> String {
    if d.is_nan() {
        "nan".to_string()
    } else if d == f64::INFINITY {
        "inf".to_string()
    } else if d == f64::NEG_INFINITY {
        "-inf".to_string()
    } else {
        d.to_string()
    }
}

/// Builds the reply for a native result.
///
/// `Status` is the final fallback and becomes a simple string; every other
/// shape has a dedicated variant.
impl From<Value> for RespValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Int(n) => RespValue::Integer(n),
            Value::Text(s) => RespValue::bulk_string(Bytes::from(s)),
            Value::List(items) => {
                RespValue::array(items.into_iter().map(RespValue::from).collect())
            }
            Value::Bool(b) => RespValue::Boolean(b),
            Value::Float(d) => RespValue::Double(d),
            Value::Map(pairs) => RespValue::Map(
                pairs
                    .into_iter()
                    .map(|(k, v)| (RespValue::from(k), RespValue::from(v)))
                    .collect(),
            ),
            Value::Set(items) => RespValue::Set(items.into_iter().map(RespValue::from).collect()),
            Value::Tuple(items) => {
                RespValue::Push(items.into_iter().map(RespValue::from).collect())
            }
            Value::Nil => RespValue::Null,
            Value::Status(s) => RespValue::SimpleString(s),
        }
    }
}

impl fmt::Display for RespValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RespValue::SimpleString(s) => write!(f, "\"{}\"", s),
            RespValue::SimpleError(s) | RespValue::BulkError(s) => write!(f, "(error) {}", s),
            RespValue::Integer(n) => write!(f, "(integer) {}", n),
            RespValue::BulkString(Some(data)) => {
                if let Ok(s) = std::str::from_utf8(data) {
                    write!(f, "\"{}\"", s)
                } else {
                    write!(f, "(binary data, {} bytes)", data.len())
                }
            }
            RespValue::BulkString(None) | RespValue::Array(None) | RespValue::Null => {
                write!(f, "(nil)")
            }
            RespValue::Boolean(b) => write!(f, "({})", if *b { "true" } else { "false" }),
            RespValue::Double(d) => write!(f, "(double) {}", format_double(*d)),
            RespValue::BigNumber(n) => write!(f, "(big number) {}", n),
            RespValue::VerbatimString { text, .. } => write!(f, "\"{}\"", text),
            RespValue::Map(pairs) => {
                if pairs.is_empty() {
                    return write!(f, "(empty hash)");
                }
                writeln!(f)?;
                for (i, (k, v)) in pairs.iter().enumerate() {
                    writeln!(f, "{}# {} => {}", i + 1, k, v)?;
                }
                Ok(())
            }
            RespValue::Array(Some(values)) | RespValue::Set(values) | RespValue::Push(values) => {
                if values.is_empty() {
                    write!(f, "(empty array)")
                } else {
                    writeln!(f)?;
                    for (i, v) in values.iter().enumerate() {
                        writeln!(f, "{}) {}", i + 1, v)?;
                    }
                    Ok(())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_string_serialize() {
        let value = RespValue::simple_string("OK");
        assert_eq!(value.serialize(), b"+OK\r\n");
    }

    #[test]
    fn test_error_serialize() {
        let value = RespValue::error("ERR");
        assert_eq!(value.serialize(), b"-ERR\r\n");
    }

    #[test]
    fn test_integer_serialize() {
        assert_eq!(RespValue::integer(1000).serialize(), b":1000\r\n");
        assert_eq!(RespValue::integer(-1000).serialize(), b":-1000\r\n");
    }

    #[test]
    fn test_bulk_string_serialize() {
        let value = RespValue::bulk_string(Bytes::from("hello"));
        assert_eq!(value.serialize(), b"$5\r\nhello\r\n");

        let empty = RespValue::bulk_string(Bytes::new());
        assert_eq!(empty.serialize(), b"$0\r\n\r\n");
    }

    #[test]
    fn test_null_bulk_string_has_no_body() {
        assert_eq!(RespValue::null_bulk_string().serialize(), b"$-1\r\n");
    }

    #[test]
    fn test_array_serialize() {
        let value = RespValue::array(vec![
            RespValue::bulk_string(Bytes::from("hello")),
            RespValue::bulk_string(Bytes::from("world")),
        ]);
        assert_eq!(value.serialize(), b"*2\r\n$5\r\nhello\r\n$5\r\nworld\r\n");
    }

    #[test]
    fn test_null_and_empty_array_serialize() {
        assert_eq!(RespValue::null_array().serialize(), b"*-1\r\n");
        assert_eq!(RespValue::array(vec![]).serialize(), b"*0\r\n");
    }

    #[test]
    fn test_array_with_null_element_serialize() {
        let value = RespValue::array(vec![
            RespValue::bulk_string(Bytes::from("hello")),
            RespValue::null_bulk_string(),
            RespValue::bulk_string(Bytes::from("world")),
        ]);
        assert_eq!(
            value.serialize(),
            b"*3\r\n$5\r\nhello\r\n$-1\r\n$5\r\nworld\r\n"
        );
    }

    #[test]
    fn test_nested_array_serialize() {
        let value = RespValue::array(vec![
            RespValue::array(vec![
                RespValue::integer(1),
                RespValue::integer(2),
                RespValue::integer(3),
            ]),
            RespValue::array(vec![
                RespValue::simple_string("Hello"),
                RespValue::error("World"),
            ]),
        ]);
        assert_eq!(
            value.serialize(),
            b"*2\r\n*3\r\n:1\r\n:2\r\n:3\r\n*2\r\n+Hello\r\n-World\r\n"
        );
    }

    #[test]
    fn test_null_boolean_serialize() {
        assert_eq!(RespValue::null().serialize(), b"_\r\n");
        assert_eq!(RespValue::boolean(true).serialize(), b"#t\r\n");
        assert_eq!(RespValue::boolean(false).serialize(), b"#f\r\n");
    }

    #[test]
    fn test_double_serialize() {
        assert_eq!(RespValue::double(1.23).serialize(), b",1.23\r\n");
        assert_eq!(RespValue::double(-1.23).serialize(), b",-1.23\r\n");
        assert_eq!(RespValue::double(f64::INFINITY).serialize(), b",inf\r\n");
        assert_eq!(RespValue::double(f64::NEG_INFINITY).serialize(), b",-inf\r\n");
        assert_eq!(RespValue::double(f64::NAN).serialize(), b",nan\r\n");
    }

    #[test]
    fn test_resp3_aggregates_serialize() {
        let map = RespValue::Map(vec![(
            RespValue::simple_string("first"),
            RespValue::integer(1),
        )]);
        assert_eq!(map.serialize(), b"%1\r\n+first\r\n:1\r\n");

        let set = RespValue::Set(vec![RespValue::integer(1), RespValue::integer(2)]);
        assert_eq!(set.serialize(), b"~2\r\n:1\r\n:2\r\n");

        let push = RespValue::Push(vec![RespValue::simple_string("message")]);
        assert_eq!(push.serialize(), b">1\r\n+message\r\n");
    }

    #[test]
    fn test_blob_variants_serialize() {
        let verbatim = RespValue::VerbatimString {
            format: "txt".to_string(),
            text: "Some string".to_string(),
        };
        assert_eq!(verbatim.serialize(), b"=15\r\ntxt:Some string\r\n");

        let bulk_error = RespValue::BulkError("SYNTAX invalid syntax".to_string());
        assert_eq!(bulk_error.serialize(), b"!21\r\nSYNTAX invalid syntax\r\n");

        let big = RespValue::BigNumber("-3492890328409238509324850943850943825024385".into());
        assert_eq!(
            big.serialize(),
            b"(-3492890328409238509324850943850943825024385\r\n"
        );
    }

    #[test]
    fn test_line_breaks_in_simple_text() {
        let value = RespValue::simple_string("a\r\nb");
        assert_eq!(value.serialize(), b"+a  b\r\n");
        assert_eq!(
            crate::protocol::decode(&value.serialize()).unwrap(),
            RespValue::simple_string("a  b")
        );

        let value = RespValue::error("ERR bad\nname");
        assert_eq!(value.serialize(), b"-ERR bad name\r\n");
    }

    #[test]
    fn test_checked_constructors() {
        use crate::protocol::decode;

        assert_eq!(RespValue::big_number("1.5"), None);
        assert_eq!(RespValue::big_number("-"), None);
        assert_eq!(RespValue::big_number(""), None);
        assert_eq!(RespValue::verbatim("ab", "text"), None);
        assert_eq!(RespValue::verbatim("text", "text"), None);

        let big = RespValue::big_number("-12345678901234567890123").unwrap();
        assert_eq!(decode(&big.serialize()).unwrap(), big);

        let verbatim = RespValue::verbatim("mkd", "# title: a\r\nb").unwrap();
        assert_eq!(decode(&verbatim.serialize()).unwrap(), verbatim);
    }

    #[test]
    fn test_ok_response() {
        assert_eq!(RespValue::ok().serialize(), b"+OK\r\n");
    }

    #[test]
    fn test_from_native() {
        assert_eq!(RespValue::from(Value::Int(7)), RespValue::integer(7));
        assert_eq!(
            RespValue::from(Value::Text("v".into())),
            RespValue::bulk_string(Bytes::from("v"))
        );
        assert_eq!(RespValue::from(Value::Bool(true)), RespValue::boolean(true));
        assert_eq!(RespValue::from(Value::Float(0.5)), RespValue::double(0.5));
        assert_eq!(RespValue::from(Value::Nil), RespValue::null());
        assert_eq!(RespValue::from(Value::Status("OK".into())), RespValue::ok());
        assert_eq!(
            RespValue::from(Value::List(vec![Value::Text("a".into())])),
            RespValue::array(vec![RespValue::bulk_string(Bytes::from("a"))])
        );
        assert_eq!(
            RespValue::from(Value::Map(vec![(Value::Text("k".into()), Value::Int(1))])),
            RespValue::Map(vec![(
                RespValue::bulk_string(Bytes::from("k")),
                RespValue::integer(1)
            )])
        );
        assert_eq!(
            RespValue::from(Value::Set(vec![Value::Int(1)])),
            RespValue::Set(vec![RespValue::integer(1)])
        );
        assert_eq!(
            RespValue::from(Value::Tuple(vec![Value::Bool(false)])),
            RespValue::Push(vec![RespValue::boolean(false)])
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(RespValue::integer(3).to_string(), "(integer) 3");
        assert_eq!(RespValue::null_bulk_string().to_string(), "(nil)");
        assert_eq!(RespValue::error("ERR x").to_string(), "(error) ERR x");
    }
}
