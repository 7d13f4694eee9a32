//! String wire helpers, varying by length-determination strategy.
//!
//! Decoded bytes are interpreted as UTF-8, falling back to Latin-1 for legacy
//! content; encoding from a Rust string is always valid UTF-8, so the
//! fallback applies to the decode direction only.

use crate::cursor::Cursor;
use crate::error::Error;
use crate::types::{numeric, Endian};
use bytes::{BufMut, BytesMut};

fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_owned(),
        Err(_) => bytes.iter().map(|&byte| byte as char).collect(),
    }
}

pub(crate) fn read_fixed(
    cursor: &mut Cursor,
    len: usize,
    nul_padded: bool,
) -> Result<String, Error> {
    let raw = cursor.get(len)?;
    let text = decode_text(&raw);
    if nul_padded {
        // Keep only the prefix before the first NUL.
        return Ok(text.split('\0').next().unwrap_or_default().to_owned());
    }
    Ok(text)
}

pub(crate) fn write_fixed(
    value: &str,
    len: usize,
    nul_padded: bool,
    buf: &mut BytesMut,
) -> Result<(), Error> {
    let bytes = value.as_bytes();
    if nul_padded {
        if bytes.len() > len {
            return Err(Error::Invalid(
                "str".into(),
                format!("expected at most {len} bytes, found {}", bytes.len()),
            ));
        }
        buf.put_slice(bytes);
        buf.put_bytes(0, len - bytes.len());
    } else {
        if bytes.len() != len {
            return Err(Error::Invalid(
                "str".into(),
                format!("expected exactly {len} bytes, found {}", bytes.len()),
            ));
        }
        buf.put_slice(bytes);
    }
    Ok(())
}

pub(crate) fn read_prefixed(
    cursor: &mut Cursor,
    prefix: usize,
    endian: Endian,
    nul_terminated: bool,
) -> Result<String, Error> {
    let len = numeric::read_uint(cursor, prefix, endian)? as usize;
    let raw = cursor.get(len)?;
    let text = decode_text(&raw);
    if nul_terminated {
        return Ok(text.strip_suffix('\0').unwrap_or(&text).to_owned());
    }
    Ok(text)
}

pub(crate) fn write_prefixed(
    value: &str,
    prefix: usize,
    endian: Endian,
    nul_terminated: bool,
    buf: &mut BytesMut,
) -> Result<(), Error> {
    let mut bytes = value.as_bytes().to_vec();
    if nul_terminated && bytes.last() != Some(&0) {
        bytes.push(0);
    }
    numeric::write_uint(bytes.len() as u64, prefix, endian, buf)?;
    buf.put_slice(&bytes);
    Ok(())
}

pub(crate) fn read_c_str(cursor: &mut Cursor) -> Result<String, Error> {
    let mut bytes = Vec::new();
    loop {
        let byte = cursor.get(1)?;
        if byte[0] == 0 {
            break;
        }
        bytes.push(byte[0]);
    }
    Ok(decode_text(&bytes))
}

pub(crate) fn write_c_str(value: &str, buf: &mut BytesMut) -> Result<(), Error> {
    buf.put_slice(value.as_bytes());
    if !value.ends_with('\0') {
        buf.put_u8(0);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Codec;
    use crate::value::Value;
    use crate::version::FormatVersion;

    fn ver() -> FormatVersion {
        FormatVersion::none()
    }

    #[test]
    fn test_str16_conformity() {
        // 2-byte little-endian length tag followed by the bytes.
        let codec = Codec::str16();
        let mut value = Value::Str("hi".into());
        assert_eq!(codec.encode(&mut value).unwrap(), vec![0x02, 0x00, 0x68, 0x69]);

        let mut cursor = Cursor::new(vec![0x02, 0x00, 0x68, 0x69]);
        assert_eq!(codec.decode(&mut cursor, &ver()).unwrap(), value);
        assert_eq!(cursor.position(), 4);
    }

    #[test]
    fn test_nt_str_round_trip() {
        let codec = Codec::nt_str32();
        let mut value = Value::Str("scenario".into());
        let encoded = codec.encode(&mut value).unwrap();
        // Length tag counts the trailing NUL.
        assert_eq!(encoded[0] as usize, "scenario".len() + 1);
        assert_eq!(encoded.last(), Some(&0));
        assert_eq!(codec.decode_bytes(encoded, &ver()).unwrap(), value);
    }

    #[test]
    fn test_empty_prefixed_str() {
        let codec = Codec::str16();
        let mut value = Value::Str(String::new());
        let encoded = codec.encode(&mut value).unwrap();
        assert_eq!(encoded, vec![0x00, 0x00]);
        assert_eq!(codec.decode_bytes(encoded, &ver()).unwrap(), value);
    }

    #[test]
    fn test_fixed_str() {
        let codec = Codec::fixed_str(4);
        let mut value = codec.decode_bytes(&b"1.47"[..], &ver()).unwrap();
        assert_eq!(value, Value::Str("1.47".into()));
        assert_eq!(codec.encode(&mut value).unwrap(), &b"1.47"[..]);

        let mut wrong = Value::Str("1.4".into());
        assert!(matches!(codec.encode(&mut wrong), Err(Error::Invalid(_, _))));
    }

    #[test]
    fn test_padded_str() {
        let codec = Codec::padded_str(6);
        let mut value = Value::Str("map".into());
        let encoded = codec.encode(&mut value).unwrap();
        assert_eq!(encoded, vec![b'm', b'a', b'p', 0, 0, 0]);
        assert_eq!(codec.decode_bytes(encoded, &ver()).unwrap(), value);
    }

    #[test]
    fn test_c_str() {
        let codec = Codec::c_str();
        let mut cursor = Cursor::new(vec![b'o', b'k', 0, b'x']);
        assert_eq!(
            codec.decode(&mut cursor, &ver()).unwrap(),
            Value::Str("ok".into())
        );
        assert_eq!(cursor.position(), 3);

        let mut value = Value::Str("ok".into());
        assert_eq!(codec.encode(&mut value).unwrap(), vec![b'o', b'k', 0]);
    }

    #[test]
    fn test_unterminated_c_str_underruns() {
        let codec = Codec::c_str();
        let mut cursor = Cursor::new(vec![b'o', b'k']);
        assert!(matches!(
            codec.decode(&mut cursor, &ver()),
            Err(Error::Underrun { .. })
        ));
    }

    #[test]
    fn test_latin1_fallback() {
        // 0xE9 is not valid UTF-8 but decodes as 'é' in Latin-1.
        let codec = Codec::fixed_str(1);
        let decoded = codec.decode_bytes(vec![0xE9], &ver()).unwrap();
        assert_eq!(decoded, Value::Str("é".into()));
    }
}
