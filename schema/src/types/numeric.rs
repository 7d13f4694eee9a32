//! Fixed-width integer, float, and boolean wire helpers.

use crate::cursor::Cursor;
use crate::error::Error;
use crate::types::Endian;
use bytes::{BufMut, BytesMut};

/// Writes the low `width` bytes of `value` with no range check.
fn put_raw(value: u64, width: usize, endian: Endian, buf: &mut BytesMut) {
    match endian {
        Endian::Little => buf.put_slice(&value.to_le_bytes()[..width]),
        Endian::Big => buf.put_slice(&value.to_be_bytes()[8 - width..]),
    }
}

pub(crate) fn read_uint(cursor: &mut Cursor, width: usize, endian: Endian) -> Result<u64, Error> {
    let raw = cursor.get(width)?;
    let mut out = 0u64;
    match endian {
        Endian::Little => {
            for (i, byte) in raw.iter().enumerate() {
                out |= (*byte as u64) << (8 * i);
            }
        }
        Endian::Big => {
            for byte in raw.iter() {
                out = (out << 8) | *byte as u64;
            }
        }
    }
    Ok(out)
}

pub(crate) fn write_uint(
    value: u64,
    width: usize,
    endian: Endian,
    buf: &mut BytesMut,
) -> Result<(), Error> {
    if width < 8 && value >> (8 * width) != 0 {
        return Err(Error::Invalid(
            "uint".into(),
            format!("{value} does not fit in {width} bytes"),
        ));
    }
    put_raw(value, width, endian, buf);
    Ok(())
}

pub(crate) fn read_int(cursor: &mut Cursor, width: usize, endian: Endian) -> Result<i64, Error> {
    let raw = read_uint(cursor, width, endian)?;
    if width == 8 {
        return Ok(raw as i64);
    }
    // Sign-extend from the declared width.
    let shift = 64 - 8 * width as u32;
    Ok(((raw << shift) as i64) >> shift)
}

pub(crate) fn write_int(
    value: i64,
    width: usize,
    endian: Endian,
    buf: &mut BytesMut,
) -> Result<(), Error> {
    if width < 8 {
        let bits = 8 * width as u32;
        let min = -(1i64 << (bits - 1));
        let max = (1i64 << (bits - 1)) - 1;
        if value < min || value > max {
            return Err(Error::Invalid(
                "int".into(),
                format!("{value} does not fit in {width} bytes"),
            ));
        }
    }
    put_raw(value as u64, width, endian, buf);
    Ok(())
}

pub(crate) fn read_float(cursor: &mut Cursor, width: usize, endian: Endian) -> Result<f64, Error> {
    let raw = cursor.get(width)?;
    match width {
        4 => {
            let mut arr = [0u8; 4];
            arr.copy_from_slice(&raw);
            Ok(match endian {
                Endian::Little => f32::from_le_bytes(arr),
                Endian::Big => f32::from_be_bytes(arr),
            } as f64)
        }
        8 => {
            let mut arr = [0u8; 8];
            arr.copy_from_slice(&raw);
            Ok(match endian {
                Endian::Little => f64::from_le_bytes(arr),
                Endian::Big => f64::from_be_bytes(arr),
            })
        }
        _ => Err(Error::Invalid(
            "float".into(),
            format!("unsupported width {width}"),
        )),
    }
}

pub(crate) fn write_float(
    value: f64,
    width: usize,
    endian: Endian,
    buf: &mut BytesMut,
) -> Result<(), Error> {
    match (width, endian) {
        (4, Endian::Little) => buf.put_slice(&(value as f32).to_le_bytes()),
        (4, Endian::Big) => buf.put_slice(&(value as f32).to_be_bytes()),
        (8, Endian::Little) => buf.put_slice(&value.to_le_bytes()),
        (8, Endian::Big) => buf.put_slice(&value.to_be_bytes()),
        _ => {
            return Err(Error::Invalid(
                "float".into(),
                format!("unsupported width {width}"),
            ))
        }
    }
    Ok(())
}

pub(crate) fn read_bool(cursor: &mut Cursor, width: usize, endian: Endian) -> Result<bool, Error> {
    match read_uint(cursor, width, endian)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(Error::Invalid(
            "bool".into(),
            format!("expected 0 or 1, found {other}"),
        )),
    }
}

pub(crate) fn write_bool(
    value: bool,
    width: usize,
    endian: Endian,
    buf: &mut BytesMut,
) -> Result<(), Error> {
    write_uint(value as u64, width, endian, buf)
}
