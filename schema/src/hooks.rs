//! Field lifecycle callbacks.
//!
//! Hooks are the mechanism by which cross-field invariants are kept in sync
//! without the record orchestrator carrying field-specific logic: a "count"
//! field's hooks update a sibling list field's dynamic repeat, and the count
//! is itself refreshed from the list's length just before encoding.

use crate::error::Error;
use crate::record::Record;
use crate::schema::FieldId;
use crate::value::Value;
use crate::version::FormatVersion;
use std::sync::Arc;

/// A callback fired on read-from-stream, write-to-stream, get, or set.
pub type Hook = Arc<dyn Fn(&mut Record) -> Result<(), Error> + Send + Sync>;

/// A transform applied to a value before validation on set.
pub type Mapper = Arc<dyn Fn(Value) -> Result<Value, Error> + Send + Sync>;

/// A check applied to a value on set; the message is wrapped with the field
/// name by the descriptor.
pub type Validator = Arc<dyn Fn(&Value) -> Result<(), String> + Send + Sync>;

/// Produces a fresh default value for one field of a record instance.
pub type DefaultFactory = Arc<dyn Fn(&FormatVersion, &Record) -> Value + Send + Sync>;

/// A hook that mirrors `count`'s numeric value into `items`' dynamic repeat.
///
/// Attach it to the count field's on-set and on-read lists so the list field
/// decodes (and later defaults) with the right multiplicity.
pub fn set_repeat_from(count: FieldId, items: FieldId) -> Hook {
    Arc::new(move |record: &mut Record| {
        let repeat = record.get(count)?.as_usize()? as i64;
        record.set_repeat(items, repeat);
        Ok(())
    })
}

/// A hook that refreshes `count` from the length of `items`' stored list.
///
/// Attach it to the count field's on-write list; running it before the count
/// is encoded keeps the tag honest after callers push or pop elements.
pub fn sync_len(count: FieldId, items: FieldId) -> Hook {
    Arc::new(move |record: &mut Record| {
        let len = record.get(items)?.as_list()?.len();
        let tag = match record.get(count)? {
            Value::Int(_) => Value::Int(len as i64),
            _ => Value::UInt(len as u64),
        };
        record.set(count, tag)
    })
}
