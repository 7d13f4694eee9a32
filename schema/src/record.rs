//! Record instances and the whole-record decode/encode orchestration.

use crate::combine::{AliasId, FieldUnion, PathSeg, UnionId};
use crate::cursor::Cursor;
use crate::descriptor::run_hooks;
use crate::error::Error;
use crate::schema::{FieldId, Schema};
use crate::value::Value;
use crate::version::FormatVersion;
use bytes::{BufMut, Bytes, BytesMut};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

impl Schema {
    /// Decodes one record from `cursor`.
    ///
    /// The version probe, if any, runs first; when it yields no version the
    /// caller-supplied `ver` is used, or the schema's default version if `ver`
    /// is the "no version" sentinel. With `strict`, unconsumed bytes after the
    /// last field fail with [`Error::TrailingBytes`].
    pub fn decode(
        self: &Arc<Self>,
        cursor: &mut Cursor,
        ver: &FormatVersion,
        strict: bool,
    ) -> Result<Record, Error> {
        let probed = match &self.version_probe {
            Some(probe) => probe(cursor)?,
            None => None,
        };
        let version = probed.unwrap_or_else(|| {
            if ver.components().is_empty() {
                self.default_version.clone()
            } else {
                ver.clone()
            }
        });
        debug!(record = self.name, version = %version, "decoding");

        let mut inst = Record::empty(self.clone(), version);
        // Once a field marks the remainder compressed, decoding continues in a
        // local cursor over the decompressed bytes; the original cursor is
        // left exhausted.
        let mut replacement: Option<Cursor> = None;
        for idx in 0..self.fields.len() {
            let field = &self.fields[idx];
            if field.remaining_compressed {
                let compression = self
                    .compression
                    .as_ref()
                    .ok_or(Error::Compression(self.name))?;
                let rest = match replacement.as_mut() {
                    Some(local) => local.remaining(),
                    None => cursor.remaining(),
                };
                replacement = Some(Cursor::new(compression.decompress(&rest)?));
            }
            let cur = replacement.as_mut().unwrap_or(&mut *cursor);
            field.read_from(FieldId(idx), &mut inst, cur)?;
        }

        let trailing = replacement
            .as_ref()
            .map(Cursor::remaining_len)
            .unwrap_or_else(|| cursor.remaining_len());
        if strict && trailing > 0 {
            return Err(Error::TrailingBytes(trailing));
        }
        if let Some(hook) = &self.post_decode {
            hook(&mut inst)?;
        }
        Ok(inst)
    }

    /// Decodes one record from a standalone buffer.
    pub fn decode_bytes(
        self: &Arc<Self>,
        buf: impl Into<Bytes>,
        ver: &FormatVersion,
        strict: bool,
    ) -> Result<Record, Error> {
        self.decode(&mut Cursor::new(buf), ver, strict)
    }

    /// Decodes one record from the file at `path`, requiring every byte to be
    /// consumed.
    pub fn decode_file(
        self: &Arc<Self>,
        path: impl AsRef<Path>,
        ver: &FormatVersion,
    ) -> Result<Record, Error> {
        self.decode(&mut Cursor::from_file(path)?, ver, true)
    }

    /// Constructs a record from defaults, materializing a fresh value for
    /// every field active under `ver`.
    pub fn instantiate(self: &Arc<Self>, ver: impl Into<FormatVersion>) -> Result<Record, Error> {
        let mut inst = Record::empty(self.clone(), ver.into());
        for idx in 0..self.fields.len() {
            if self.fields[idx].is_active(&inst.version) {
                inst.ensure(FieldId(idx))?;
            }
        }
        Ok(inst)
    }
}

/// One instance of a record type: an ordered mapping from field to current
/// value, plus the instance's own format version.
///
/// Value slots start unset and are filled by decoding, by explicit
/// [`Record::set`], or lazily from the field's default on first access.
/// Dynamic repeat overrides are instance-local and persist for the instance's
/// lifetime once set.
#[derive(Clone)]
pub struct Record {
    schema: Arc<Schema>,
    version: FormatVersion,
    values: Vec<Option<Value>>,
    repeats: Vec<Option<i64>>,
}

impl Record {
    pub(crate) fn empty(schema: Arc<Schema>, version: FormatVersion) -> Self {
        let len = schema.fields.len();
        Self {
            schema,
            version,
            values: vec![None; len],
            repeats: vec![None; len],
        }
    }

    /// The record type this instance belongs to.
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// The instance's format version.
    pub fn version(&self) -> &FormatVersion {
        &self.version
    }

    /// The field's value, materialized from its default if unset.
    ///
    /// Fails with [`Error::Version`] if the field is inactive under the
    /// instance's version; inactive fields are rejected, never defaulted.
    pub fn get(&mut self, id: FieldId) -> Result<&Value, Error> {
        let schema = self.schema.clone();
        let desc = schema.field(id);
        self.check_active(id)?;
        self.ensure(id)?;
        run_hooks(&desc.on_get, self)?;
        self.values[id.0]
            .as_ref()
            .ok_or_else(|| Error::MissingDefault(desc.name.clone()))
    }

    /// Mutable access to the field's value, materialized if unset.
    pub fn get_mut(&mut self, id: FieldId) -> Result<&mut Value, Error> {
        let schema = self.schema.clone();
        let desc = schema.field(id);
        self.check_active(id)?;
        self.ensure(id)?;
        run_hooks(&desc.on_get, self)?;
        self.values[id.0]
            .as_mut()
            .ok_or_else(|| Error::MissingDefault(desc.name.clone()))
    }

    /// Stores a value: mapper chain, then validator chain, then the store,
    /// then on-set hooks.
    pub fn set(&mut self, id: FieldId, value: impl Into<Value>) -> Result<(), Error> {
        let schema = self.schema.clone();
        let desc = schema.field(id);
        self.check_active(id)?;
        let mut value = value.into();
        for mapper in &desc.mappers {
            value = mapper(value)?;
        }
        for validator in &desc.validators {
            validator(&value).map_err(|message| Error::Validation {
                name: desc.name.clone(),
                message,
            })?;
        }
        self.values[id.0] = Some(value);
        run_hooks(&desc.on_set, self)
    }

    /// The field's effective repeat: the dynamic override if set, else the
    /// declared repeat.
    pub fn repeat(&self, id: FieldId) -> i64 {
        self.schema.fields[id.0].effective_repeat(id, self)
    }

    /// Sets the field's dynamic repeat override for this instance.
    pub fn set_repeat(&mut self, id: FieldId, repeat: i64) {
        self.repeats[id.0] = Some(repeat);
    }

    pub(crate) fn repeat_override(&self, id: FieldId) -> Option<i64> {
        self.repeats[id.0]
    }

    pub(crate) fn store_raw(&mut self, id: FieldId, value: Value) {
        self.values[id.0] = Some(value);
    }

    pub(crate) fn take_raw(&mut self, id: FieldId) -> Result<Value, Error> {
        self.values[id.0]
            .take()
            .ok_or_else(|| Error::MissingDefault(self.schema.fields[id.0].name.clone()))
    }

    /// Materializes the field's default if the slot is unset.
    pub(crate) fn ensure(&mut self, id: FieldId) -> Result<(), Error> {
        if self.values[id.0].is_none() {
            let schema = self.schema.clone();
            let value = schema.field(id).from_default(id, self)?;
            self.values[id.0] = Some(value);
        }
        Ok(())
    }

    fn check_active(&self, id: FieldId) -> Result<(), Error> {
        let desc = &self.schema.fields[id.0];
        if desc.is_active(&self.version) {
            return Ok(());
        }
        Err(Error::Version {
            name: desc.name.clone(),
            version: self.version.clone(),
        })
    }

    /// Encodes the record, concatenating every field in declaration order and
    /// routing everything from the first compressed-remainder field onward
    /// through the schema's compressor.
    ///
    /// Takes `&mut self` because on-write hooks may resynchronize sibling
    /// fields (and unset fields are materialized from defaults).
    pub fn encode(&mut self) -> Result<Bytes, Error> {
        let schema = self.schema.clone();
        debug!(record = schema.name, version = %self.version, "encoding");
        let mut plain = BytesMut::new();
        let mut deferred: Option<BytesMut> = None;
        for idx in 0..schema.fields.len() {
            let field = &schema.fields[idx];
            if field.remaining_compressed && deferred.is_none() {
                deferred = Some(BytesMut::new());
            }
            let bytes = field.write_to(FieldId(idx), self)?;
            match deferred.as_mut() {
                Some(buf) => buf.put_slice(&bytes),
                None => plain.put_slice(&bytes),
            }
        }
        if let Some(buf) = deferred {
            let compression = schema
                .compression
                .as_ref()
                .ok_or(Error::Compression(schema.name))?;
            plain.put_slice(&compression.compress(&buf)?);
        }
        Ok(plain.freeze())
    }

    /// Encodes the record and writes it to the file at `path`.
    pub fn encode_to_file(&mut self, path: impl AsRef<Path>) -> Result<(), Error> {
        let bytes = self.encode()?;
        std::fs::write(path, &bytes)?;
        Ok(())
    }

    /// The value behind a registered alias.
    pub fn get_alias(&mut self, id: AliasId) -> Result<&Value, Error> {
        let schema = self.schema.clone();
        let alias = &schema.aliases[id.0];
        let (target, field) = descend(self, &alias.path, &alias.name)?;
        target.get(field)
    }

    /// Stores a value through a registered alias.
    pub fn set_alias(&mut self, id: AliasId, value: impl Into<Value>) -> Result<(), Error> {
        let schema = self.schema.clone();
        let alias = &schema.aliases[id.0];
        let (target, field) = descend(self, &alias.path, &alias.name)?;
        target.set(field, value)
    }

    /// The value behind a registered union: the first member active under the
    /// instance's version.
    pub fn get_union(&mut self, id: UnionId) -> Result<&Value, Error> {
        let schema = self.schema.clone();
        let field = self.resolve_union(&schema.unions[id.0])?;
        self.get(field)
    }

    /// Stores a value through a registered union.
    pub fn set_union(&mut self, id: UnionId, value: impl Into<Value>) -> Result<(), Error> {
        let schema = self.schema.clone();
        let field = self.resolve_union(&schema.unions[id.0])?;
        self.set(field, value)
    }

    fn resolve_union(&self, union: &FieldUnion) -> Result<FieldId, Error> {
        union
            .members
            .iter()
            .copied()
            .find(|member| self.schema.fields[member.0].is_active(&self.version))
            .ok_or_else(|| Error::Version {
                name: union.name.clone(),
                version: self.version.clone(),
            })
    }

    /// The dotted names of every active field whose value differs, recursing
    /// through nested records but not through lists of records.
    pub fn diff(&self, other: &Record) -> Vec<String> {
        let mut names = Vec::new();
        self.collect_diff("", other, &mut names);
        names
    }

    fn collect_diff(&self, prefix: &str, other: &Record, names: &mut Vec<String>) {
        if !Arc::ptr_eq(&self.schema, &other.schema) || self.version != other.version {
            names.push(format!("{prefix}version"));
            return;
        }
        for (idx, field) in self.schema.fields.iter().enumerate() {
            if !field.is_active(&self.version) {
                continue;
            }
            match (&self.values[idx], &other.values[idx]) {
                (Some(Value::Record(ours)), Some(Value::Record(theirs))) => {
                    ours.collect_diff(&format!("{prefix}{}.", field.name), theirs, names);
                }
                (ours, theirs) if ours != theirs => {
                    names.push(format!("{prefix}{}", field.name));
                }
                _ => {}
            }
        }
    }
}

/// Walks an alias path to the record owning the final field.
fn descend<'a>(
    root: &'a mut Record,
    path: &[PathSeg],
    name: &str,
) -> Result<(&'a mut Record, FieldId), Error> {
    let Some((&PathSeg::Field(last), prefix)) = path.split_last() else {
        return Err(Error::Invalid(
            name.to_owned(),
            "alias path must end on a field".to_owned(),
        ));
    };
    let mut current = root;
    let mut idx = 0;
    while idx < prefix.len() {
        let PathSeg::Field(field) = prefix[idx] else {
            return Err(Error::Invalid(
                name.to_owned(),
                "index segment without a preceding list field".to_owned(),
            ));
        };
        current = match Record::get_mut(current, field)? {
            Value::Record(nested) => {
                idx += 1;
                nested
            }
            Value::List(items) => {
                let Some(&PathSeg::Index(elem)) = prefix.get(idx + 1) else {
                    return Err(Error::Invalid(
                        name.to_owned(),
                        "list field must be followed by an index segment".to_owned(),
                    ));
                };
                idx += 2;
                items
                    .get_mut(elem)
                    .ok_or_else(|| {
                        Error::Invalid(name.to_owned(), format!("index {elem} out of bounds"))
                    })?
                    .as_record_mut()?
            }
            other => {
                return Err(Error::Type {
                    expected: "record",
                    found: other.kind(),
                })
            }
        };
    }
    Ok((current, last))
}

/// Two instances are equal iff they share a record type and version and every
/// active field's value is equal. Unset slots only equal other unset slots.
impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        if !Arc::ptr_eq(&self.schema, &other.schema) || self.version != other.version {
            return false;
        }
        self.schema
            .fields
            .iter()
            .enumerate()
            .all(|(idx, field)| {
                !field.is_active(&self.version) || self.values[idx] == other.values[idx]
            })
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct(self.schema.name);
        out.field("version", &self.version);
        for (idx, field) in self.schema.fields.iter().enumerate() {
            if !field.is_active(&self.version) {
                continue;
            }
            match &self.values[idx] {
                Some(value) => out.field(&field.name, value),
                None => out.field(&field.name, &"<unset>"),
            };
        }
        out.finish()
    }
}
