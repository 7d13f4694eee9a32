//! The dynamic value model stored in record fields.

use crate::error::Error;
use crate::record::Record;

/// A decoded field value.
///
/// Integers are widened to 64 bits on decode; the codec that produced a value
/// knows its on-wire width and narrows it back on encode. `Null` is the value
/// of fields with an absent repeat and of optional codecs whose presence flag
/// was zero.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    UInt(u64),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Record(Record),
}

impl Value {
    /// The variant name, used in type-mismatch errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::UInt(_) => "uint",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Bytes(_) => "bytes",
            Value::List(_) => "list",
            Value::Record(_) => "record",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Result<bool, Error> {
        match self {
            Value::Bool(v) => Ok(*v),
            other => Err(mismatch("bool", other)),
        }
    }

    pub fn as_uint(&self) -> Result<u64, Error> {
        match self {
            Value::UInt(v) => Ok(*v),
            other => Err(mismatch("uint", other)),
        }
    }

    pub fn as_int(&self) -> Result<i64, Error> {
        match self {
            Value::Int(v) => Ok(*v),
            other => Err(mismatch("int", other)),
        }
    }

    /// Converts an unsigned or non-negative signed value to a `usize`.
    ///
    /// Used wherever one field's numeric value governs another field's
    /// multiplicity.
    pub fn as_usize(&self) -> Result<usize, Error> {
        let wide = match self {
            Value::UInt(v) => Ok(*v),
            Value::Int(v) if *v >= 0 => Ok(*v as u64),
            other => Err(mismatch("uint", other)),
        }?;
        usize::try_from(wide).map_err(|_| mismatch("usize", self))
    }

    pub fn as_float(&self) -> Result<f64, Error> {
        match self {
            Value::Float(v) => Ok(*v),
            other => Err(mismatch("float", other)),
        }
    }

    pub fn as_str(&self) -> Result<&str, Error> {
        match self {
            Value::Str(v) => Ok(v),
            other => Err(mismatch("str", other)),
        }
    }

    pub fn as_bytes(&self) -> Result<&[u8], Error> {
        match self {
            Value::Bytes(v) => Ok(v),
            other => Err(mismatch("bytes", other)),
        }
    }

    pub fn as_list(&self) -> Result<&[Value], Error> {
        match self {
            Value::List(v) => Ok(v),
            other => Err(mismatch("list", other)),
        }
    }

    pub fn as_list_mut(&mut self) -> Result<&mut Vec<Value>, Error> {
        match self {
            Value::List(v) => Ok(v),
            other => Err(mismatch("list", other)),
        }
    }

    pub fn as_record(&self) -> Result<&Record, Error> {
        match self {
            Value::Record(v) => Ok(v),
            other => Err(mismatch("record", other)),
        }
    }

    pub fn as_record_mut(&mut self) -> Result<&mut Record, Error> {
        match self {
            Value::Record(v) => Ok(v),
            other => Err(mismatch("record", other)),
        }
    }
}

fn mismatch(expected: &'static str, found: &Value) -> Error {
    Error::Type {
        expected,
        found: found.kind(),
    }
}

macro_rules! impl_from_unsigned {
    ($($type:ty),*) => {
        $(
            impl From<$type> for Value {
                fn from(v: $type) -> Self {
                    Value::UInt(v as u64)
                }
            }
        )*
    };
}
impl_from_unsigned!(u8, u16, u32, u64);

macro_rules! impl_from_signed {
    ($($type:ty),*) => {
        $(
            impl From<$type> for Value {
                fn from(v: $type) -> Self {
                    Value::Int(v as i64)
                }
            }
        )*
    };
}
impl_from_signed!(i8, i16, i32, i64);

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v as f64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl From<Record> for Value {
    fn from(v: Record) -> Self {
        Value::Record(v)
    }
}
