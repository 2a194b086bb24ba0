//! Built-in primitive interpreters.
//!
//! Integers of 8 to 64 bits in either byte order, fixed-length ASCII text,
//! raw bytes, and the null interpreter used for fields without a type.

use super::{Decoded, Interpreter, InterpreterInfo, InterpreterRegistry, OptionInfo};
use crate::error::{Error, Result};
use crate::options::Options;
use crate::value::Value;
use bytes::Bytes;
use std::sync::Arc;

/// Name of the interpreter used when a field has no explicit type
pub const NULL_INTERPRETER: &str = "null";

const LENGTH_REQUIRED: [OptionInfo; 1] = [OptionInfo {
    name: "length",
    required: true,
    description: "number of bytes to consume",
}];

const LENGTH_OPTIONAL: [OptionInfo; 1] = [OptionInfo {
    name: "length",
    required: false,
    description: "number of bytes to skip (default 0)",
}];

/// Byte order of a multi-byte integer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    /// Least significant byte first
    Little,
    /// Most significant byte first
    Big,
}

impl Endian {
    fn human_name(&self) -> &'static str {
        match self {
            Endian::Little => "Little Endian",
            Endian::Big => "Big Endian",
        }
    }
}

/// Fixed-width integer interpreter
#[derive(Debug, Clone)]
pub struct Integer {
    name: &'static str,
    human_name: String,
    width: usize,
    signed: bool,
    endian: Endian,
}

impl Integer {
    /// Creates an integer interpreter of `width` bytes (1 to 8)
    pub fn new(name: &'static str, width: usize, signed: bool, endian: Endian) -> Self {
        debug_assert!((1..=8).contains(&width));
        let human_name = if width == 1 {
            format!("{} 8-bit Integer", if signed { "Signed" } else { "Unsigned" })
        } else {
            format!(
                "{} {}-bit Integer ({})",
                if signed { "Signed" } else { "Unsigned" },
                width * 8,
                endian.human_name()
            )
        };
        Self {
            name,
            human_name,
            width,
            signed,
            endian,
        }
    }
}

impl Interpreter for Integer {
    fn name(&self) -> &str {
        self.name
    }

    fn decode(&self, data: &[u8], position: usize) -> Result<Decoded> {
        let bytes = take(self.name, data, position, self.width)?;

        let mut raw: u64 = 0;
        match self.endian {
            Endian::Little => {
                for &b in bytes.iter().rev() {
                    raw = (raw << 8) | u64::from(b);
                }
            }
            Endian::Big => {
                for &b in bytes {
                    raw = (raw << 8) | u64::from(b);
                }
            }
        }

        let value = if self.signed {
            // sign-extend from the top bit of the field
            let shift = 64 - self.width * 8;
            Value::Signed(((raw << shift) as i64) >> shift)
        } else {
            Value::Unsigned(raw)
        };

        Ok(Decoded::new(value, self.width))
    }
}

impl InterpreterInfo for Integer {
    fn human_name(&self) -> &str {
        &self.human_name
    }

    fn create(&self, _field: &str, _options: &Options) -> Result<Box<dyn Interpreter>> {
        Ok(Box::new(self.clone()))
    }
}

/// Fixed-length ASCII text, trailing NULs trimmed
#[derive(Debug, Clone, Copy)]
pub struct Ascii {
    length: usize,
}

impl Ascii {
    /// Creates a text interpreter consuming `length` bytes
    pub fn new(length: usize) -> Self {
        Self { length }
    }

    /// The interpreter kind, configured by the `length` option
    pub fn info() -> impl InterpreterInfo {
        AsciiKind
    }
}

impl Interpreter for Ascii {
    fn name(&self) -> &str {
        "ascii"
    }

    fn decode(&self, data: &[u8], position: usize) -> Result<Decoded> {
        let bytes = take("ascii", data, position, self.length)?;

        if let Some(i) = bytes.iter().position(|b| !b.is_ascii()) {
            return Err(Error::decode(
                "ascii",
                position + i,
                format!("non-ASCII byte 0x{:02x}", bytes[i]),
            ));
        }

        let end = bytes.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
        let text: String = bytes[..end].iter().map(|&b| char::from(b)).collect();

        Ok(Decoded::new(Value::Text(text), self.length))
    }
}

struct AsciiKind;

impl InterpreterInfo for AsciiKind {
    fn human_name(&self) -> &str {
        "ASCII Text"
    }

    fn options(&self) -> &[OptionInfo] {
        &LENGTH_REQUIRED
    }

    fn create(&self, field: &str, options: &Options) -> Result<Box<dyn Interpreter>> {
        let length = required_length(field, options)?;
        Ok(Box::new(Ascii::new(length)))
    }
}

/// Raw bytes of a fixed length
#[derive(Debug, Clone, Copy)]
pub struct RawBytes {
    length: usize,
}

impl RawBytes {
    /// Creates a raw interpreter consuming `length` bytes
    pub fn new(length: usize) -> Self {
        Self { length }
    }

    /// The interpreter kind, configured by the `length` option
    pub fn info() -> impl InterpreterInfo {
        RawBytesKind
    }
}

impl Interpreter for RawBytes {
    fn name(&self) -> &str {
        "bytes"
    }

    fn decode(&self, data: &[u8], position: usize) -> Result<Decoded> {
        let bytes = take("bytes", data, position, self.length)?;
        Ok(Decoded::new(
            Value::Bytes(Bytes::copy_from_slice(bytes)),
            self.length,
        ))
    }
}

struct RawBytesKind;

impl InterpreterInfo for RawBytesKind {
    fn human_name(&self) -> &str {
        "Raw Bytes"
    }

    fn options(&self) -> &[OptionInfo] {
        &LENGTH_REQUIRED
    }

    fn create(&self, field: &str, options: &Options) -> Result<Box<dyn Interpreter>> {
        let length = required_length(field, options)?;
        Ok(Box::new(RawBytes::new(length)))
    }
}

/// Interpreter that never fails and decodes nothing.
///
/// Consumes the declared length, clamped to the bytes remaining.
#[derive(Debug, Clone, Copy, Default)]
pub struct Null {
    length: usize,
}

impl Null {
    /// Creates a null interpreter skipping `length` bytes
    pub fn new(length: usize) -> Self {
        Self { length }
    }

    /// The interpreter kind, configured by the optional `length` option
    pub fn info() -> impl InterpreterInfo {
        NullKind
    }
}

impl Interpreter for Null {
    fn name(&self) -> &str {
        NULL_INTERPRETER
    }

    fn decode(&self, data: &[u8], position: usize) -> Result<Decoded> {
        let remaining = data.len().saturating_sub(position);
        Ok(Decoded::new(Value::Null, self.length.min(remaining)))
    }
}

struct NullKind;

impl InterpreterInfo for NullKind {
    fn human_name(&self) -> &str {
        "Unknown"
    }

    fn options(&self) -> &[OptionInfo] {
        &LENGTH_OPTIONAL
    }

    fn create(&self, field: &str, options: &Options) -> Result<Box<dyn Interpreter>> {
        Ok(Box::new(Null::new(length_option(field, options)?.unwrap_or(0))))
    }
}

/// Registers every built-in kind
pub(super) fn register_all(registry: &mut InterpreterRegistry) {
    registry.register("uint8", Integer::new("uint8", 1, false, Endian::Little));
    registry.register("int8", Integer::new("int8", 1, true, Endian::Little));

    for width in [2usize, 4, 8] {
        for signed in [false, true] {
            for (endian, suffix) in [(Endian::Little, "le"), (Endian::Big, "be")] {
                let name = integer_name(width, signed, suffix);
                let kind: Arc<dyn InterpreterInfo> =
                    Arc::new(Integer::new(name, width, signed, endian));
                if endian == Endian::Little {
                    registry.register_shared(integer_name(width, signed, ""), kind.clone());
                }
                registry.register_shared(name, kind);
            }
        }
    }

    let u8_kind: Arc<dyn InterpreterInfo> = Arc::new(Integer::new("u8", 1, false, Endian::Little));
    let i8_kind: Arc<dyn InterpreterInfo> = Arc::new(Integer::new("i8", 1, true, Endian::Little));
    registry.register_shared("u8", u8_kind);
    registry.register_shared("i8", i8_kind);

    registry.register("ascii", AsciiKind);
    registry.register("bytes", RawBytesKind);
    registry.register(NULL_INTERPRETER, NullKind);
}

/// Canonical names: `uint32le`, `int16be`, and the short little-endian aliases `u32`, `i16`
fn integer_name(width: usize, signed: bool, suffix: &str) -> &'static str {
    match (width, signed, suffix) {
        (2, false, "le") => "uint16le",
        (2, false, "be") => "uint16be",
        (2, false, _) => "u16",
        (2, true, "le") => "int16le",
        (2, true, "be") => "int16be",
        (2, true, _) => "i16",
        (4, false, "le") => "uint32le",
        (4, false, "be") => "uint32be",
        (4, false, _) => "u32",
        (4, true, "le") => "int32le",
        (4, true, "be") => "int32be",
        (4, true, _) => "i32",
        (8, false, "le") => "uint64le",
        (8, false, "be") => "uint64be",
        (8, false, _) => "u64",
        (8, true, "le") => "int64le",
        (8, true, "be") => "int64be",
        _ => "i64",
    }
}

fn length_option(field: &str, options: &Options) -> Result<Option<usize>> {
    options
        .get_u64(field, "length")?
        .map(|length| {
            usize::try_from(length).map_err(|_| {
                Error::invalid_option(field, "length", "length does not fit in memory")
            })
        })
        .transpose()
}

fn required_length(field: &str, options: &Options) -> Result<usize> {
    length_option(field, options)?.ok_or_else(|| Error::missing_option(field, "length"))
}

/// Borrow `length` bytes at `position`, or fail with a decode error naming the shortfall
fn take<'a>(name: &str, data: &'a [u8], position: usize, length: usize) -> Result<&'a [u8]> {
    position
        .checked_add(length)
        .filter(|&end| end <= data.len())
        .map(|end| &data[position..end])
        .ok_or_else(|| {
            Error::decode(
                name,
                position,
                format!(
                    "need {} bytes, have {}",
                    length,
                    data.len().saturating_sub(position)
                ),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(name: &str, options: Options, data: &[u8], position: usize) -> Result<Decoded> {
        let registry = InterpreterRegistry::with_primitives();
        let info = registry.get(name).expect("kind registered");
        info.create("test", &options)?.decode(data, position)
    }

    #[test]
    fn test_unsigned_little_endian() {
        let d = decode("u32", Options::new(), &[0x78, 0x56, 0x34, 0x12], 0).unwrap();
        assert_eq!(d, Decoded::new(Value::Unsigned(0x1234_5678), 4));
    }

    #[test]
    fn test_unsigned_big_endian() {
        let d = decode("uint16be", Options::new(), &[0x00, 0x12, 0x34], 1).unwrap();
        assert_eq!(d, Decoded::new(Value::Unsigned(0x1234), 2));
    }

    #[test]
    fn test_signed_extension() {
        let d = decode("int16le", Options::new(), &[0xfe, 0xff], 0).unwrap();
        assert_eq!(d.value, Value::Signed(-2));

        let d = decode("i8", Options::new(), &[0x80], 0).unwrap();
        assert_eq!(d.value, Value::Signed(-128));

        let d = decode("int64be", Options::new(), &[0xff; 8], 0).unwrap();
        assert_eq!(d.value, Value::Signed(-1));
    }

    #[test]
    fn test_truncated_integer() {
        let err = decode("uint32le", Options::new(), &[1, 2, 3, 4, 5], 2).unwrap_err();
        assert!(matches!(err, Error::Decode { offset: 2, .. }));
    }

    #[test]
    fn test_ascii_trims_nul() {
        let options = Options::new().with("length", 6usize);
        let d = decode("ascii", options, b"WAVE\0\0", 0).unwrap();
        assert_eq!(d, Decoded::new(Value::from("WAVE"), 6));
    }

    #[test]
    fn test_ascii_rejects_high_bytes() {
        let options = Options::new().with("length", 3usize);
        let err = decode("ascii", options, b"a\xffb", 0).unwrap_err();
        assert!(matches!(err, Error::Decode { offset: 1, .. }));
    }

    #[test]
    fn test_ascii_requires_length() {
        let err = decode("ascii", Options::new(), b"abc", 0).unwrap_err();
        assert!(matches!(err, Error::MissingOption { .. }));
    }

    #[test]
    fn test_raw_bytes() {
        let options = Options::new().with("length", 2usize);
        let d = decode("bytes", options, &[1, 2, 3], 1).unwrap();
        assert_eq!(d.value, Value::Bytes(Bytes::from_static(&[2, 3])));
    }

    #[test]
    fn test_null_clamps_to_remaining() {
        let options = Options::new().with("length", 10usize);
        let d = decode(NULL_INTERPRETER, options, &[0; 4], 1).unwrap();
        assert_eq!(d, Decoded::new(Value::Null, 3));

        let d = decode(NULL_INTERPRETER, Options::new(), &[], 5).unwrap();
        assert_eq!(d.length, 0);
    }

    #[test]
    fn test_human_names() {
        let registry = InterpreterRegistry::with_primitives();
        assert_eq!(
            registry.get("uint32le").unwrap().human_name(),
            "Unsigned 32-bit Integer (Little Endian)"
        );
        assert_eq!(registry.get("i8").unwrap().human_name(), "Signed 8-bit Integer");
    }
}
