//! Per-field metadata plus read/write/default logic, shared read-only across
//! all instances of a record type.

use crate::cursor::Cursor;
use crate::error::Error;
use crate::hooks::{DefaultFactory, Hook, Mapper, Validator};
use crate::record::Record;
use crate::schema::FieldId;
use crate::types::Codec;
use crate::value::Value;
use crate::version::{FormatVersion, VersionRange};
use bytes::{Bytes, BytesMut};
use tracing::trace;

/// A field's default-value policy.
///
/// Plain values are cloned into each instance and are only allowed for
/// trivially-copyable kinds; anything owned (lists, byte buffers, nested
/// records) must come from a factory so instances never alias one default.
pub enum DefaultValue {
    Value(Value),
    Factory(DefaultFactory),
}

/// One declared field of a record type.
///
/// Created once by the schema builder and never mutated afterward.
pub struct FieldDescriptor {
    pub(crate) name: String,
    pub(crate) codec: Codec,
    pub(crate) versions: VersionRange,
    pub(crate) repeat: i64,
    pub(crate) default: Option<DefaultValue>,
    pub(crate) remaining_compressed: bool,
    pub(crate) on_read: Vec<Hook>,
    pub(crate) on_write: Vec<Hook>,
    pub(crate) on_get: Vec<Hook>,
    pub(crate) on_set: Vec<Hook>,
    pub(crate) mappers: Vec<Mapper>,
    pub(crate) validators: Vec<Validator>,
}

pub(crate) fn run_hooks(hooks: &[Hook], inst: &mut Record) -> Result<(), Error> {
    for hook in hooks {
        hook(inst)?;
    }
    Ok(())
}

impl FieldDescriptor {
    /// The field's declared name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True if this field exists under `ver`.
    pub fn is_active(&self, ver: &FormatVersion) -> bool {
        self.versions.contains(ver)
    }

    /// The instance's dynamic repeat override if one has been set, else the
    /// static repeat.
    pub fn effective_repeat(&self, id: FieldId, inst: &Record) -> i64 {
        inst.repeat_override(id).unwrap_or(self.repeat)
    }

    /// Materializes a fresh default for this field on `inst`.
    pub(crate) fn from_default(&self, id: FieldId, inst: &Record) -> Result<Value, Error> {
        let override_set = inst.repeat_override(id).is_some();
        match self.effective_repeat(id, inst) {
            -1 => Ok(Value::Null),
            1 if !override_set => self.fresh(inst),
            repeat => {
                let count = self.list_len(repeat)?;
                let mut items = Vec::with_capacity(count);
                for _ in 0..count {
                    items.push(self.fresh(inst)?);
                }
                Ok(Value::List(items))
            }
        }
    }

    fn fresh(&self, inst: &Record) -> Result<Value, Error> {
        match &self.default {
            Some(DefaultValue::Value(value)) => Ok(value.clone()),
            Some(DefaultValue::Factory(factory)) => Ok(factory(inst.version(), inst)),
            None => self.codec.default_value(inst.version()),
        }
    }

    /// Decodes this field from `cursor` into `inst`, then fires on-read hooks.
    ///
    /// A no-op when the field is inactive under the instance's version. An
    /// effective repeat of `-1` stores the null value and consumes no bytes.
    pub(crate) fn read_from(
        &self,
        id: FieldId,
        inst: &mut Record,
        cursor: &mut Cursor,
    ) -> Result<(), Error> {
        if !self.is_active(inst.version()) {
            return Ok(());
        }
        let override_set = inst.repeat_override(id).is_some();
        let repeat = self.effective_repeat(id, inst);
        let value = match repeat {
            -1 => Value::Null,
            1 if !override_set => self.codec.decode(cursor, inst.version())?,
            _ => {
                let count = self.list_len(repeat)?;
                let mut items = Vec::with_capacity(count.min(1024));
                for _ in 0..count {
                    items.push(self.codec.decode(cursor, inst.version())?);
                }
                Value::List(items)
            }
        };
        trace!(field = %self.name, repeat, offset = cursor.position(), "field decoded");
        inst.store_raw(id, value);
        run_hooks(&self.on_read, inst)
    }

    /// Encodes this field from `inst`, firing on-write hooks first.
    ///
    /// Inactive and repeat `-1` fields encode to empty bytes without firing
    /// hooks. An unset field is materialized from its default before encoding.
    pub(crate) fn write_to(&self, id: FieldId, inst: &mut Record) -> Result<Bytes, Error> {
        if !self.is_active(inst.version()) || self.effective_repeat(id, inst) == -1 {
            return Ok(Bytes::new());
        }
        run_hooks(&self.on_write, inst)?;

        inst.ensure(id)?;
        let override_set = inst.repeat_override(id).is_some();
        let repeat = self.effective_repeat(id, inst);
        // The value is moved out of its slot for the duration of the encode so
        // nested records can run their own hooks without aliasing `inst`.
        let mut value = inst.take_raw(id)?;
        let mut buf = BytesMut::new();
        let written = self.write_value(&mut value, repeat, override_set, &mut buf);
        inst.store_raw(id, value);
        written?;
        trace!(field = %self.name, bytes = buf.len(), "field encoded");
        Ok(buf.freeze())
    }

    fn write_value(
        &self,
        value: &mut Value,
        repeat: i64,
        override_set: bool,
        buf: &mut BytesMut,
    ) -> Result<(), Error> {
        if repeat == 1 && !override_set {
            return self.codec.write(value, buf);
        }
        let expected = self.list_len(repeat)?;
        let items = value.as_list_mut()?;
        if items.len() != expected {
            return Err(Error::LengthMismatch {
                name: self.name.clone(),
                expected,
                actual: items.len(),
            });
        }
        for item in items {
            self.codec.write(item, buf)?;
        }
        Ok(())
    }

    fn list_len(&self, repeat: i64) -> Result<usize, Error> {
        usize::try_from(repeat).map_err(|_| {
            Error::Invalid(self.name.clone(), format!("invalid repeat {repeat}"))
        })
    }
}
