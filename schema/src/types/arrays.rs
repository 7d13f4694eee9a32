//! Composite wire helpers: length-tagged lists, jagged 2D lists, and
//! flag-gated optional values.

use crate::cursor::Cursor;
use crate::error::Error;
use crate::types::{numeric, Codec, Endian};
use crate::value::Value;
use crate::version::FormatVersion;
use bytes::BytesMut;

pub(crate) fn read_array(
    cursor: &mut Cursor,
    prefix: usize,
    endian: Endian,
    elem: &Codec,
    ver: &FormatVersion,
) -> Result<Value, Error> {
    let len = numeric::read_uint(cursor, prefix, endian)? as usize;
    let mut items = Vec::with_capacity(len.min(1024));
    for _ in 0..len {
        items.push(elem.decode(cursor, ver)?);
    }
    Ok(Value::List(items))
}

pub(crate) fn write_array(
    value: &mut Value,
    prefix: usize,
    endian: Endian,
    elem: &Codec,
    buf: &mut BytesMut,
) -> Result<(), Error> {
    let items = value.as_list_mut()?;
    numeric::write_uint(items.len() as u64, prefix, endian, buf)?;
    for item in items {
        elem.write(item, buf)?;
    }
    Ok(())
}

pub(crate) fn read_fixed_array(
    cursor: &mut Cursor,
    len: usize,
    elem: &Codec,
    ver: &FormatVersion,
) -> Result<Value, Error> {
    let mut items = Vec::with_capacity(len.min(1024));
    for _ in 0..len {
        items.push(elem.decode(cursor, ver)?);
    }
    Ok(Value::List(items))
}

pub(crate) fn write_fixed_array(
    value: &mut Value,
    len: usize,
    elem: &Codec,
    buf: &mut BytesMut,
) -> Result<(), Error> {
    let items = value.as_list_mut()?;
    if items.len() != len {
        return Err(Error::Invalid(
            "array".into(),
            format!("expected {len} elements, found {}", items.len()),
        ));
    }
    for item in items {
        elem.write(item, buf)?;
    }
    Ok(())
}

// Jagged layout: optional outer row count, then every row's length tag, then
// every row's elements back to back.
pub(crate) fn read_stacked(
    cursor: &mut Cursor,
    prefix: usize,
    endian: Endian,
    rows: Option<usize>,
    elem: &Codec,
    ver: &FormatVersion,
) -> Result<Value, Error> {
    let count = match rows {
        Some(fixed) => fixed,
        None => numeric::read_uint(cursor, prefix, endian)? as usize,
    };
    let mut lens = Vec::with_capacity(count.min(1024));
    for _ in 0..count {
        lens.push(numeric::read_uint(cursor, prefix, endian)? as usize);
    }
    let mut out = Vec::with_capacity(count.min(1024));
    for len in lens {
        let mut row = Vec::with_capacity(len.min(1024));
        for _ in 0..len {
            row.push(elem.decode(cursor, ver)?);
        }
        out.push(Value::List(row));
    }
    Ok(Value::List(out))
}

pub(crate) fn write_stacked(
    value: &mut Value,
    prefix: usize,
    endian: Endian,
    rows: Option<usize>,
    elem: &Codec,
    buf: &mut BytesMut,
) -> Result<(), Error> {
    let outer = value.as_list_mut()?;
    match rows {
        Some(fixed) => {
            if outer.len() != fixed {
                return Err(Error::Invalid(
                    "stacked".into(),
                    format!("expected {fixed} rows, found {}", outer.len()),
                ));
            }
        }
        None => numeric::write_uint(outer.len() as u64, prefix, endian, buf)?,
    }
    for row in outer.iter() {
        numeric::write_uint(row.as_list()?.len() as u64, prefix, endian, buf)?;
    }
    for row in outer {
        for item in row.as_list_mut()? {
            elem.write(item, buf)?;
        }
    }
    Ok(())
}

pub(crate) fn read_optional(
    cursor: &mut Cursor,
    flag: usize,
    endian: Endian,
    elem: &Codec,
    ver: &FormatVersion,
) -> Result<Value, Error> {
    if numeric::read_uint(cursor, flag, endian)? == 0 {
        return Ok(Value::Null);
    }
    elem.decode(cursor, ver)
}

pub(crate) fn write_optional(
    value: &mut Value,
    flag: usize,
    endian: Endian,
    elem: &Codec,
    buf: &mut BytesMut,
) -> Result<(), Error> {
    if value.is_null() {
        return numeric::write_uint(0, flag, endian, buf);
    }
    numeric::write_uint(1, flag, endian, buf)?;
    elem.write(value, buf)
}
