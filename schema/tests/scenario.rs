//! End-to-end exercise of a miniature scenario-file format: a plain-text
//! version tag, a version-gated header field, and a compressed body whose
//! unit list length is governed by a count field.

use byteform_schema::{
    hooks, Codec, Compression, Error, FormatVersion, Schema, Value, VersionRange,
};
use std::sync::Arc;

struct Zstd;

impl Compression for Zstd {
    fn compress(&self, raw: &[u8]) -> Result<Vec<u8>, Error> {
        Ok(zstd::bulk::compress(raw, 0)?)
    }

    fn decompress(&self, compressed: &[u8]) -> Result<Vec<u8>, Error> {
        Ok(zstd::bulk::decompress(compressed, 1 << 24)?)
    }
}

struct Scenario {
    schema: Arc<Schema>,
    file_version: byteform_schema::FieldId,
    author: byteform_schema::FieldId,
    unit_count: byteform_schema::FieldId,
    units: byteform_schema::FieldId,
    unit: Arc<Schema>,
    unit_kind: byteform_schema::FieldId,
    unit_name: byteform_schema::FieldId,
}

fn scenario() -> Scenario {
    let mut unit_builder = Schema::builder("Unit");
    let unit_kind = unit_builder.field("kind", Codec::uint16()).default(0u16).id();
    unit_builder.field("x", Codec::float32()).default(0.0f32).id();
    unit_builder.field("y", Codec::float32()).default(0.0f32).id();
    let unit_name = unit_builder.field("name", Codec::str16()).default("").id();
    let unit = unit_builder.build();

    let mut builder = Schema::builder("Scenario");
    // The first four bytes are an ASCII version tag like "1.47"; it doubles
    // as a regular field, so the probe peeks rather than consumes.
    builder.version_probe(|cursor| {
        let tag = cursor.peek(4)?;
        let text = std::str::from_utf8(&tag)
            .map_err(|_| Error::Invalid("version tag".to_owned(), "not ascii".to_owned()))?;
        Ok(Some(text.parse::<FormatVersion>()?))
    });
    let file_version = builder
        .field("file_version", Codec::fixed_str(4))
        .default("1.47")
        .id();
    let author = builder
        .field("author", Codec::nt_str16())
        .versions(VersionRange::since([1, 47]))
        .default("")
        .id();
    let unit_count = builder
        .field("unit_count", Codec::uint32())
        .default(0u32)
        .compressed_remainder()
        .id();
    let units = builder.field("units", Codec::record(unit.clone())).repeat(0).id();
    builder.on_read(unit_count, hooks::set_repeat_from(unit_count, units));
    builder.on_set(unit_count, hooks::set_repeat_from(unit_count, units));
    builder.on_write(unit_count, hooks::sync_len(unit_count, units));
    builder.compression(Zstd);
    builder.default_version([1, 47]);

    Scenario {
        schema: builder.build(),
        file_version,
        author,
        unit_count,
        units,
        unit,
        unit_kind,
        unit_name,
    }
}

fn sample_bytes(s: &Scenario) -> Vec<u8> {
    let mut rec = s.schema.instantiate([1, 47]).unwrap();
    rec.set(s.author, "alice").unwrap();
    for (kind, name) in [(3u16, "archer"), (9, "tower")] {
        let mut unit = s.unit.instantiate([1, 47]).unwrap();
        unit.set(s.unit_kind, kind).unwrap();
        unit.set(s.unit_name, name).unwrap();
        rec.get_mut(s.units)
            .unwrap()
            .as_list_mut()
            .unwrap()
            .push(Value::Record(unit));
    }
    rec.encode().unwrap().to_vec()
}

#[test]
fn test_round_trip_identity() {
    let s = scenario();
    let bytes = sample_bytes(&s);
    let mut rec = s
        .schema
        .decode_bytes(bytes.clone(), &FormatVersion::none(), true)
        .unwrap();
    assert_eq!(rec.encode().unwrap(), bytes);
}

#[test]
fn test_decoded_contents() {
    let s = scenario();
    let bytes = sample_bytes(&s);
    let mut rec = s
        .schema
        .decode_bytes(bytes, &FormatVersion::none(), true)
        .unwrap();

    assert_eq!(rec.version(), &FormatVersion::from([1, 47]));
    assert_eq!(rec.get(s.file_version).unwrap(), &Value::Str("1.47".into()));
    assert_eq!(rec.get(s.author).unwrap(), &Value::Str("alice".into()));
    assert_eq!(rec.get(s.unit_count).unwrap(), &Value::UInt(2));

    let units = rec.get_mut(s.units).unwrap().as_list_mut().unwrap();
    assert_eq!(units.len(), 2);
    let second = units[1].as_record_mut().unwrap();
    assert_eq!(second.get(s.unit_kind).unwrap(), &Value::UInt(9));
    assert_eq!(second.get(s.unit_name).unwrap(), &Value::Str("tower".into()));
}

#[test]
fn test_mutation_resyncs_count() {
    let s = scenario();
    let bytes = sample_bytes(&s);
    let mut rec = s
        .schema
        .decode_bytes(bytes, &FormatVersion::none(), true)
        .unwrap();

    let extra = s.unit.instantiate([1, 47]).unwrap();
    rec.get_mut(s.units)
        .unwrap()
        .as_list_mut()
        .unwrap()
        .push(Value::Record(extra));
    let reencoded = rec.encode().unwrap();

    let mut reread = s
        .schema
        .decode_bytes(reencoded, &FormatVersion::none(), true)
        .unwrap();
    assert_eq!(reread.get(s.unit_count).unwrap(), &Value::UInt(3));
    assert_eq!(reread.get(s.units).unwrap().as_list().unwrap().len(), 3);
}

#[test]
fn test_older_version_skips_gated_field() {
    let s = scenario();
    let mut rec = s.schema.instantiate([1, 46]).unwrap();
    rec.set(s.file_version, "1.46").unwrap();
    assert!(matches!(
        rec.set(s.author, "bob"),
        Err(Error::Version { .. })
    ));
    let bytes = rec.encode().unwrap();

    let mut reread = s
        .schema
        .decode_bytes(bytes, &FormatVersion::none(), true)
        .unwrap();
    assert_eq!(reread.version(), &FormatVersion::from([1, 46]));
    assert!(matches!(reread.get(s.author), Err(Error::Version { .. })));
    assert_eq!(reread.get(s.unit_count).unwrap(), &Value::UInt(0));
}

#[test]
fn test_file_round_trip() {
    let s = scenario();
    let bytes = sample_bytes(&s);
    let path = std::env::temp_dir().join(format!("byteform-scenario-{}.bin", std::process::id()));

    let mut rec = s
        .schema
        .decode_bytes(bytes.clone(), &FormatVersion::none(), true)
        .unwrap();
    rec.encode_to_file(&path).unwrap();
    let reread = s.schema.decode_file(&path, &FormatVersion::none()).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(rec, reread);
}

#[test]
fn test_truncated_body_fails() {
    let s = scenario();
    let bytes = sample_bytes(&s);
    // Chop the compressed span in half; decompression must fail cleanly.
    let truncated = &bytes[..bytes.len() - bytes.len() / 3];
    assert!(s
        .schema
        .decode_bytes(truncated.to_vec(), &FormatVersion::none(), true)
        .is_err());
}
