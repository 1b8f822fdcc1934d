//! Append-only JSON encoding of log fields
//!
//! Everything here writes directly into the caller's buffer: formatted values are escaped while
//! they are being formatted, no intermediate `String` is built.
//!
//! Keys and tags are written verbatim. Callers are trusted to use simple keys that need no
//! escaping.
use std::{error::Error as StdError, fmt};

/// A field key or value.
///
/// The variants are the closed set of categories a field can fall into. `Display` covers types
/// with a textual representation, `Debug` is the generic fallback for everything else.
#[derive(Clone, Copy)]
pub enum Value<'a> {
    Str(&'a str),
    Bytes(&'a [u8]),
    Bool(bool),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    Error(&'a (dyn StdError + 'a)),
    Display(&'a (dyn fmt::Display + 'a)),
    Debug(&'a (dyn fmt::Debug + 'a)),
}

impl<'a> Value<'a> {
    pub fn display(value: &'a (dyn fmt::Display + 'a)) -> Self {
        Value::Display(value)
    }

    pub fn debug(value: &'a (dyn fmt::Debug + 'a)) -> Self {
        Value::Debug(value)
    }

    pub fn error(value: &'a (dyn StdError + 'a)) -> Self {
        Value::Error(value)
    }
}

impl fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(v) => f.debug_tuple("Str").field(v).finish(),
            Value::Bytes(v) => f.debug_tuple("Bytes").field(v).finish(),
            Value::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Value::I64(v) => f.debug_tuple("I64").field(v).finish(),
            Value::U64(v) => f.debug_tuple("U64").field(v).finish(),
            Value::F32(v) => f.debug_tuple("F32").field(v).finish(),
            Value::F64(v) => f.debug_tuple("F64").field(v).finish(),
            Value::Error(v) => f.debug_tuple("Error").field(&format_args!("{v}")).finish(),
            Value::Display(v) => f.debug_tuple("Display").field(&format_args!("{v}")).finish(),
            Value::Debug(v) => f.debug_tuple("Debug").field(v).finish(),
        }
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(value: &'a str) -> Self {
        Value::Str(value)
    }
}

impl<'a> From<&'a String> for Value<'a> {
    fn from(value: &'a String) -> Self {
        Value::Str(value.as_str())
    }
}

impl<'a> From<&'a [u8]> for Value<'a> {
    fn from(value: &'a [u8]) -> Self {
        Value::Bytes(value)
    }
}

impl<'a> From<&'a Vec<u8>> for Value<'a> {
    fn from(value: &'a Vec<u8>) -> Self {
        Value::Bytes(value.as_slice())
    }
}

impl From<bool> for Value<'_> {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f32> for Value<'_> {
    fn from(value: f32) -> Self {
        Value::F32(value)
    }
}

impl From<f64> for Value<'_> {
    fn from(value: f64) -> Self {
        Value::F64(value)
    }
}

macro_rules! impl_from_int {
    ($variant:ident, $repr:ty, $($int:ty),+) => {
        $(
            impl From<$int> for Value<'_> {
                #[allow(clippy::cast_lossless, clippy::cast_possible_wrap)]
                fn from(value: $int) -> Self {
                    Value::$variant(value as $repr)
                }
            }
        )+
    };
}

impl_from_int!(I64, i64, i8, i16, i32, i64, isize);
impl_from_int!(U64, u64, u8, u16, u32, u64, usize);

/// A key/value pair bound to a document.
#[derive(Clone, Copy, Debug)]
pub struct Field<'a> {
    pub key: Value<'a>,
    pub value: Value<'a>,
}

impl<'a> Field<'a> {
    pub fn new(key: impl Into<Value<'a>>, value: impl Into<Value<'a>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Builds an array of [`Field`] from `key => value` pairs.
///
/// ```
/// use linelog::fields;
/// let attempt = 3;
/// let fields = fields!["attempt" => attempt, "host" => "db-1"];
/// assert_eq!(fields.len(), 2);
/// ```
#[macro_export]
macro_rules! fields {
    () => {
        [$crate::encoder::Field::new("", ""); 0]
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        [$($crate::encoder::Field::new($key, $value)),+]
    };
}

/// Writes formatted text into a buffer, escaping it on the fly.
struct JsonEscaper<'b>(&'b mut Vec<u8>);

impl fmt::Write for JsonEscaper<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        escape_into(self.0, s.as_bytes());
        Ok(())
    }
}

/// Writes formatted text into a buffer as it is.
struct RawWriter<'b>(&'b mut Vec<u8>);

impl fmt::Write for RawWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.extend_from_slice(s.as_bytes());
        Ok(())
    }
}

/// Appends formatted text unescaped. A failing `fmt` impl truncates the output.
pub(crate) fn write_raw_fmt(buf: &mut Vec<u8>, args: fmt::Arguments<'_>) {
    let _ = fmt::write(&mut RawWriter(buf), args);
}

fn escape_into(buf: &mut Vec<u8>, bytes: &[u8]) {
    let mut start = 0;
    for (index, byte) in bytes.iter().enumerate() {
        let escaped: &[u8] = match byte {
            b'"' => b"\\\"",
            b'\\' => b"\\\\",
            0x08 => b"\\b",
            0x0c => b"\\f",
            b'\n' => b"\\n",
            b'\r' => b"\\r",
            b'\t' => b"\\t",
            _ => continue,
        };
        buf.extend_from_slice(&bytes[start..index]);
        buf.extend_from_slice(escaped);
        start = index + 1;
    }
    buf.extend_from_slice(&bytes[start..]);
}

/// Appends a quoted, escaped JSON string.
///
/// Escaping is byte oriented: the encoding is neither inspected nor validated, so multi-byte
/// sequences (valid or not) are copied as they are.
pub fn write_json_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    buf.push(b'"');
    escape_into(buf, bytes);
    buf.push(b'"');
}

#[inline]
pub fn write_json_str(buf: &mut Vec<u8>, s: &str) {
    write_json_bytes(buf, s.as_bytes());
}

/// Appends formatted text as a quoted, escaped JSON string.
pub fn write_json_fmt(buf: &mut Vec<u8>, args: fmt::Arguments<'_>) {
    buf.push(b'"');
    // a failing Display impl leaves a truncated but well-formed string
    let _ = fmt::write(&mut JsonEscaper(buf), args);
    buf.push(b'"');
}

fn write_key(buf: &mut Vec<u8>, key: &Value<'_>) {
    match key {
        Value::Str(k) => buf.extend_from_slice(k.as_bytes()),
        Value::Bytes(k) => buf.extend_from_slice(k),
        Value::Bool(k) => write_raw_fmt(buf, format_args!("{k}")),
        Value::I64(k) => write_raw_fmt(buf, format_args!("{k}")),
        Value::U64(k) => write_raw_fmt(buf, format_args!("{k}")),
        Value::F32(k) => write_raw_fmt(buf, format_args!("{k}")),
        Value::F64(k) => write_raw_fmt(buf, format_args!("{k}")),
        Value::Error(k) => write_raw_fmt(buf, format_args!("{k}")),
        Value::Display(k) => write_raw_fmt(buf, format_args!("{k}")),
        Value::Debug(k) => write_raw_fmt(buf, format_args!("{k:?}")),
    }
}

pub fn write_value(buf: &mut Vec<u8>, value: &Value<'_>) {
    match value {
        Value::Str(v) => write_json_str(buf, v),
        Value::Bytes(v) => write_json_bytes(buf, v),
        Value::Bool(true) => buf.extend_from_slice(b"true"),
        Value::Bool(false) => buf.extend_from_slice(b"false"),
        Value::I64(v) => write_raw_fmt(buf, format_args!("{v}")),
        Value::U64(v) => write_raw_fmt(buf, format_args!("{v}")),
        // NaN and infinities have no JSON literal
        Value::F32(v) if v.is_finite() => write_raw_fmt(buf, format_args!("{v}")),
        Value::F64(v) if v.is_finite() => write_raw_fmt(buf, format_args!("{v}")),
        Value::F32(v) => write_json_fmt(buf, format_args!("{v}")),
        Value::F64(v) => write_json_fmt(buf, format_args!("{v}")),
        Value::Error(v) => write_json_fmt(buf, format_args!("{v}")),
        Value::Display(v) => write_json_fmt(buf, format_args!("{v}")),
        Value::Debug(v) => write_json_fmt(buf, format_args!("{v:?}")),
    }
}

/// Appends `,"key":value`.
pub fn write_field(buf: &mut Vec<u8>, key: &Value<'_>, value: &Value<'_>) {
    buf.extend_from_slice(b",\"");
    write_key(buf, key);
    buf.extend_from_slice(b"\":");
    write_value(buf, value);
}

pub fn write_fields(buf: &mut Vec<u8>, fields: &[Field<'_>]) {
    for field in fields {
        write_field(buf, &field.key, &field.value);
    }
}

/// Consumes a flat `key, value, key, value, ...` list.
///
/// A trailing key without a value is dropped.
pub fn write_flat_fields(buf: &mut Vec<u8>, values: &[Value<'_>]) {
    for pair in values.chunks_exact(2) {
        write_field(buf, &pair[0], &pair[1]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(fields: &[Field<'_>]) -> String {
        let mut buf = Vec::new();
        write_fields(&mut buf, fields);
        String::from_utf8(buf).expect("utf8")
    }

    #[derive(Debug)]
    struct Opaque {
        id: u32,
    }

    struct Quoted;

    impl fmt::Display for Quoted {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "say \"hi\"")
        }
    }

    /// Writes a prefix, then reports a formatting error.
    struct Failing;

    impl fmt::Display for Failing {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("par")?;
            Err(fmt::Error)
        }
    }

    impl fmt::Debug for Failing {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            fmt::Display::fmt(self, f)
        }
    }

    #[test]
    fn test_escaping() {
        let mut buf = Vec::new();
        write_json_str(&mut buf, "a\"b\\c\nd\te\rf\u{8}g\u{c}h");
        assert_eq!(buf, br#""a\"b\\c\nd\te\rf\bg\fh""#);
    }

    #[test]
    fn test_escaping_passes_utf8_through() {
        let mut buf = Vec::new();
        write_json_str(&mut buf, "héllo ✓");
        assert_eq!(buf, "\"héllo ✓\"".as_bytes());

        let mut buf = Vec::new();
        write_json_bytes(&mut buf, &[0xff, b'a', 0xfe]);
        assert_eq!(buf, [b'"', 0xff, b'a', 0xfe, b'"']);
    }

    #[test]
    fn test_scalars_unquoted() {
        assert_eq!(
            encode(&fields![
                "i" => -12_i32,
                "u" => 7_u8,
                "big" => u64::MAX,
                "f" => 1.5_f64,
                "g" => 0.1_f32,
                "ok" => true,
                "no" => false
            ]),
            r#","i":-12,"u":7,"big":18446744073709551615,"f":1.5,"g":0.1,"ok":true,"no":false"#
        );
    }

    #[test]
    fn test_non_finite_floats_are_strings() {
        assert_eq!(
            encode(&fields!["a" => f64::NAN, "b" => f64::INFINITY, "c" => f32::NEG_INFINITY]),
            r#","a":"NaN","b":"inf","c":"-inf""#
        );
    }

    #[test]
    fn test_strings_and_bytes_quoted() {
        let owned = String::from("x\"y");
        let bytes = b"raw\n".to_vec();
        assert_eq!(
            encode(&fields!["s" => "plain", "o" => &owned, "b" => &bytes]),
            r#","s":"plain","o":"x\"y","b":"raw\n""#
        );
    }

    #[test]
    fn test_textual_and_fallback_values() {
        let err = std::io::Error::other("disk \"full\"");
        let opaque = Opaque { id: 4 };
        assert_eq!(
            encode(&[
                Field::new("err", Value::error(&err)),
                Field::new("quoted", Value::display(&Quoted)),
                Field::new("opaque", Value::debug(&opaque)),
            ]),
            r#","err":"disk \"full\"","quoted":"say \"hi\"","opaque":"Opaque { id: 4 }""#
        );
    }

    #[test]
    fn test_keys_written_verbatim() {
        let opaque = Opaque { id: 1 };
        assert_eq!(
            encode(&[
                Field::new(3, "three"),
                Field::new(Value::debug(&opaque), 1),
                Field::new("we\"ird", 2),
            ]),
            r#","3":"three","Opaque { id: 1 }":1,"we"ird":2"#
        );
    }

    #[test]
    fn test_flat_fields_drop_trailing_key() {
        let mut buf = Vec::new();
        write_flat_fields(
            &mut buf,
            &["a".into(), 1.into(), "b".into(), "two".into(), "dangling".into()],
        );
        assert_eq!(buf, br#","a":1,"b":"two""#);

        let mut buf = Vec::new();
        write_flat_fields(&mut buf, &["only".into()]);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_empty_fields_macro() {
        let empty = fields![];
        assert!(empty.is_empty());
        assert_eq!(encode(&empty), "");
    }

    #[test]
    fn test_failing_formatting_truncates() {
        let failing = Failing;
        let encoded = encode(&[
            Field::new(Value::display(&failing), 1),
            Field::new(Value::debug(&failing), 2),
            Field::new("display", Value::display(&failing)),
            Field::new("debug", Value::debug(&failing)),
        ]);
        assert_eq!(
            encoded,
            r#","par":1,"par":2,"display":"par","debug":"par""#
        );
        let document: serde_json::Value =
            serde_json::from_str(&format!("{{{}}}", &encoded[1..])).expect("valid json");
        assert_eq!(document["display"], "par");
    }
}
