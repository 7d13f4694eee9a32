//! Primitive codecs: the value-type handlers a field descriptor delegates to.
//!
//! Each codec knows its own encoded byte width (when fixed) and how to
//! read/write itself given a [`Cursor`] and the ambient [`FormatVersion`].
//! Endianness is fixed per codec instance. Integers and floats are widened to
//! 64 bits in the [`Value`] model and narrowed back on encode, with a range
//! check so a value that cannot survive the round trip is rejected instead of
//! silently truncated.

use crate::cursor::Cursor;
use crate::error::Error;
use crate::schema::Schema;
use crate::value::Value;
use crate::version::FormatVersion;
use bytes::{BufMut, Bytes, BytesMut};
use std::sync::Arc;

pub mod arrays;
pub mod numeric;
pub mod strings;

/// Byte order of a single codec instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

/// A value-type handler: one leaf (or composite) layout element.
#[derive(Clone)]
pub enum Codec {
    /// A `width`-byte boolean; decodes 0/1 and rejects anything else.
    Bool { width: usize, endian: Endian },
    /// A fixed-width unsigned integer.
    UInt { width: usize, endian: Endian },
    /// A fixed-width two's-complement signed integer.
    Int { width: usize, endian: Endian },
    /// An IEEE 754 float, 4 or 8 bytes wide.
    Float { width: usize, endian: Endian },
    /// A raw byte blob of exactly `len` bytes.
    Blob { len: usize },
    /// A string occupying exactly `len` bytes, with no length prefix.
    ///
    /// When `nul_padded`, the decoder keeps only the prefix before the first
    /// NUL and the encoder pads shorter strings with NULs.
    StrFixed { len: usize, nul_padded: bool },
    /// A string preceded by a `prefix`-byte unsigned length tag.
    ///
    /// When `nul_terminated`, the encoder guarantees a trailing NUL (counted
    /// by the tag) and the decoder strips it.
    StrPrefixed {
        prefix: usize,
        endian: Endian,
        nul_terminated: bool,
    },
    /// A string read byte-wise until a NUL, with no length tag.
    CStr,
    /// A list preceded by a `prefix`-byte unsigned length tag.
    Array {
        prefix: usize,
        endian: Endian,
        elem: Box<Codec>,
    },
    /// A list of structurally-known length; the length is not encoded.
    FixedArray { len: usize, elem: Box<Codec> },
    /// A jagged 2D list: an outer row count (omitted when `rows` is fixed),
    /// then one length tag per row, then all rows' elements concatenated.
    Stacked {
        prefix: usize,
        endian: Endian,
        rows: Option<usize>,
        elem: Box<Codec>,
    },
    /// A `flag`-byte unsigned presence flag immediately preceding the value;
    /// the value is omitted entirely when the flag is zero.
    Optional {
        flag: usize,
        endian: Endian,
        elem: Box<Codec>,
    },
    /// A nested record decoded with the ambient version.
    Record(Arc<Schema>),
}

// Little-endian shorthands for the common widths.
macro_rules! impl_le_numeric {
    ($($name:ident => $variant:ident($width:expr)),* $(,)?) => {
        $(
            pub fn $name() -> Self {
                Codec::$variant {
                    width: $width,
                    endian: Endian::Little,
                }
            }
        )*
    };
}

impl Codec {
    impl_le_numeric!(
        uint8 => UInt(1),
        uint16 => UInt(2),
        uint32 => UInt(4),
        uint64 => UInt(8),
        int8 => Int(1),
        int16 => Int(2),
        int32 => Int(4),
        int64 => Int(8),
        float32 => Float(4),
        float64 => Float(8),
        bool8 => Bool(1),
        bool32 => Bool(4),
    );

    pub fn blob(len: usize) -> Self {
        Codec::Blob { len }
    }

    pub fn fixed_str(len: usize) -> Self {
        Codec::StrFixed {
            len,
            nul_padded: false,
        }
    }

    pub fn padded_str(len: usize) -> Self {
        Codec::StrFixed {
            len,
            nul_padded: true,
        }
    }

    pub fn str8() -> Self {
        Self::prefixed_str(1, false)
    }

    pub fn str16() -> Self {
        Self::prefixed_str(2, false)
    }

    pub fn str32() -> Self {
        Self::prefixed_str(4, false)
    }

    pub fn nt_str8() -> Self {
        Self::prefixed_str(1, true)
    }

    pub fn nt_str16() -> Self {
        Self::prefixed_str(2, true)
    }

    pub fn nt_str32() -> Self {
        Self::prefixed_str(4, true)
    }

    pub fn prefixed_str(prefix: usize, nul_terminated: bool) -> Self {
        Codec::StrPrefixed {
            prefix,
            endian: Endian::Little,
            nul_terminated,
        }
    }

    pub fn c_str() -> Self {
        Codec::CStr
    }

    pub fn array8(elem: Codec) -> Self {
        Self::array(1, elem)
    }

    pub fn array16(elem: Codec) -> Self {
        Self::array(2, elem)
    }

    pub fn array32(elem: Codec) -> Self {
        Self::array(4, elem)
    }

    pub fn array(prefix: usize, elem: Codec) -> Self {
        Codec::Array {
            prefix,
            endian: Endian::Little,
            elem: Box::new(elem),
        }
    }

    pub fn fixed_array(elem: Codec, len: usize) -> Self {
        Codec::FixedArray {
            len,
            elem: Box::new(elem),
        }
    }

    pub fn stacked8(elem: Codec) -> Self {
        Self::stacked(1, None, elem)
    }

    pub fn stacked16(elem: Codec) -> Self {
        Self::stacked(2, None, elem)
    }

    pub fn stacked32(elem: Codec) -> Self {
        Self::stacked(4, None, elem)
    }

    pub fn stacked(prefix: usize, rows: Option<usize>, elem: Codec) -> Self {
        Codec::Stacked {
            prefix,
            endian: Endian::Little,
            rows,
            elem: Box::new(elem),
        }
    }

    pub fn option8(elem: Codec) -> Self {
        Codec::Optional {
            flag: 1,
            endian: Endian::Little,
            elem: Box::new(elem),
        }
    }

    pub fn option32(elem: Codec) -> Self {
        Codec::Optional {
            flag: 4,
            endian: Endian::Little,
            elem: Box::new(elem),
        }
    }

    pub fn record(schema: Arc<Schema>) -> Self {
        Codec::Record(schema)
    }

    /// True if this codec decodes to a nested record, so the field descriptor
    /// can special-case recursive defaulting.
    pub fn is_record(&self) -> bool {
        matches!(self, Codec::Record(_))
    }

    /// The encoded byte width, when statically known.
    pub fn fixed_size(&self) -> Option<usize> {
        match self {
            Codec::Bool { width, .. }
            | Codec::UInt { width, .. }
            | Codec::Int { width, .. }
            | Codec::Float { width, .. } => Some(*width),
            Codec::Blob { len } | Codec::StrFixed { len, .. } => Some(*len),
            Codec::FixedArray { len, elem } => elem.fixed_size().map(|size| size * len),
            _ => None,
        }
    }

    /// A fresh natural default for this codec: zero for numerics, empty for
    /// strings and length-tagged lists, and a recursively-defaulted instance
    /// for nested records. Every call produces an independent value.
    pub fn default_value(&self, ver: &FormatVersion) -> Result<Value, Error> {
        match self {
            Codec::Bool { .. } => Ok(Value::Bool(false)),
            Codec::UInt { .. } => Ok(Value::UInt(0)),
            Codec::Int { .. } => Ok(Value::Int(0)),
            Codec::Float { .. } => Ok(Value::Float(0.0)),
            Codec::Blob { len } => Ok(Value::Bytes(vec![0; *len])),
            Codec::StrFixed { .. } | Codec::StrPrefixed { .. } | Codec::CStr => {
                Ok(Value::Str(String::new()))
            }
            Codec::Array { .. } | Codec::Stacked { .. } => Ok(Value::List(Vec::new())),
            Codec::FixedArray { len, elem } => {
                let mut items = Vec::with_capacity(*len);
                for _ in 0..*len {
                    items.push(elem.default_value(ver)?);
                }
                Ok(Value::List(items))
            }
            Codec::Optional { .. } => Ok(Value::Null),
            Codec::Record(schema) => schema.instantiate(ver.clone()).map(Value::Record),
        }
    }

    /// Reads one value from the cursor, consuming exactly the bytes that
    /// [`Codec::write`] would produce for it.
    pub fn decode(&self, cursor: &mut Cursor, ver: &FormatVersion) -> Result<Value, Error> {
        match self {
            Codec::Bool { width, endian } => {
                numeric::read_bool(cursor, *width, *endian).map(Value::Bool)
            }
            Codec::UInt { width, endian } => {
                numeric::read_uint(cursor, *width, *endian).map(Value::UInt)
            }
            Codec::Int { width, endian } => {
                numeric::read_int(cursor, *width, *endian).map(Value::Int)
            }
            Codec::Float { width, endian } => {
                numeric::read_float(cursor, *width, *endian).map(Value::Float)
            }
            Codec::Blob { len } => Ok(Value::Bytes(cursor.get(*len)?.to_vec())),
            Codec::StrFixed { len, nul_padded } => {
                strings::read_fixed(cursor, *len, *nul_padded).map(Value::Str)
            }
            Codec::StrPrefixed {
                prefix,
                endian,
                nul_terminated,
            } => strings::read_prefixed(cursor, *prefix, *endian, *nul_terminated).map(Value::Str),
            Codec::CStr => strings::read_c_str(cursor).map(Value::Str),
            Codec::Array {
                prefix,
                endian,
                elem,
            } => arrays::read_array(cursor, *prefix, *endian, elem, ver),
            Codec::FixedArray { len, elem } => arrays::read_fixed_array(cursor, *len, elem, ver),
            Codec::Stacked {
                prefix,
                endian,
                rows,
                elem,
            } => arrays::read_stacked(cursor, *prefix, *endian, *rows, elem, ver),
            Codec::Optional { flag, endian, elem } => {
                arrays::read_optional(cursor, *flag, *endian, elem, ver)
            }
            Codec::Record(schema) => schema.decode(cursor, ver, false).map(Value::Record),
        }
    }

    /// Decodes a value from a standalone buffer.
    pub fn decode_bytes(
        &self,
        bytes: impl Into<Bytes>,
        ver: &FormatVersion,
    ) -> Result<Value, Error> {
        self.decode(&mut Cursor::new(bytes), ver)
    }

    /// Appends the encoding of `value` to `buf`.
    ///
    /// `value` is mutable because nested records run their on-write hooks
    /// while encoding.
    pub fn write(&self, value: &mut Value, buf: &mut BytesMut) -> Result<(), Error> {
        match self {
            Codec::Bool { width, endian } => {
                numeric::write_bool(value.as_bool()?, *width, *endian, buf)
            }
            Codec::UInt { width, endian } => {
                numeric::write_uint(value.as_uint()?, *width, *endian, buf)
            }
            Codec::Int { width, endian } => {
                numeric::write_int(value.as_int()?, *width, *endian, buf)
            }
            Codec::Float { width, endian } => {
                numeric::write_float(value.as_float()?, *width, *endian, buf)
            }
            Codec::Blob { len } => {
                let bytes = value.as_bytes()?;
                if bytes.len() != *len {
                    return Err(Error::Invalid(
                        "blob".into(),
                        format!("expected {len} bytes, found {}", bytes.len()),
                    ));
                }
                buf.put_slice(bytes);
                Ok(())
            }
            Codec::StrFixed { len, nul_padded } => {
                strings::write_fixed(value.as_str()?, *len, *nul_padded, buf)
            }
            Codec::StrPrefixed {
                prefix,
                endian,
                nul_terminated,
            } => strings::write_prefixed(value.as_str()?, *prefix, *endian, *nul_terminated, buf),
            Codec::CStr => strings::write_c_str(value.as_str()?, buf),
            Codec::Array {
                prefix,
                endian,
                elem,
            } => arrays::write_array(value, *prefix, *endian, elem, buf),
            Codec::FixedArray { len, elem } => arrays::write_fixed_array(value, *len, elem, buf),
            Codec::Stacked {
                prefix,
                endian,
                rows,
                elem,
            } => arrays::write_stacked(value, *prefix, *endian, *rows, elem, buf),
            Codec::Optional { flag, endian, elem } => {
                arrays::write_optional(value, *flag, *endian, elem, buf)
            }
            Codec::Record(_) => {
                let record = value.as_record_mut()?;
                let encoded = record.encode()?;
                buf.put_slice(&encoded);
                Ok(())
            }
        }
    }

    /// Encodes a value to a standalone buffer.
    pub fn encode(&self, value: &mut Value) -> Result<Bytes, Error> {
        let mut buf = BytesMut::new();
        self.write(value, &mut buf)?;
        Ok(buf.freeze())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ver() -> FormatVersion {
        FormatVersion::none()
    }

    #[test]
    fn test_fixed_size() {
        assert_eq!(Codec::uint32().fixed_size(), Some(4));
        assert_eq!(Codec::blob(7).fixed_size(), Some(7));
        assert_eq!(Codec::fixed_array(Codec::int16(), 3).fixed_size(), Some(6));
        assert_eq!(Codec::str16().fixed_size(), None);
        assert_eq!(Codec::array32(Codec::uint8()).fixed_size(), None);
    }

    #[test]
    fn test_blob_round_trip() {
        let codec = Codec::blob(3);
        let mut value = codec.decode_bytes(vec![9u8, 8, 7], &ver()).unwrap();
        assert_eq!(value, Value::Bytes(vec![9, 8, 7]));
        assert_eq!(codec.encode(&mut value).unwrap(), vec![9u8, 8, 7]);

        let mut short = Value::Bytes(vec![1]);
        assert!(matches!(
            codec.encode(&mut short),
            Err(Error::Invalid(_, _))
        ));
    }

    #[test]
    fn test_decode_bytes_type_check() {
        let mut value = Value::Str("nope".into());
        assert!(matches!(
            Codec::uint8().encode(&mut value),
            Err(Error::Type { .. })
        ));
    }
}
