//! Record-type definitions: an immutable, ordered field list plus the
//! per-type hooks for version detection, compression, and post-decode fix-up.
//!
//! A [`Schema`] is constructed once through [`SchemaBuilder`], finalized by
//! [`SchemaBuilder::build`], and shared read-only behind an [`Arc`] across
//! every record instance of that type. Nothing about a built schema can be
//! mutated afterward.

use crate::combine::{AliasId, FieldAlias, FieldUnion, PathSeg, UnionId};
use crate::cursor::Cursor;
use crate::descriptor::{DefaultValue, FieldDescriptor};
use crate::error::Error;
use crate::hooks::{Hook, Mapper, Validator};
use crate::record::Record;
use crate::types::Codec;
use crate::value::Value;
use crate::version::{FormatVersion, VersionRange};
use std::sync::Arc;

/// An index into a schema's field list, returned at declaration time.
///
/// Field access on record instances goes through these handles rather than
/// runtime name lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FieldId(pub(crate) usize);

/// The compress/decompress pair a schema with a compressed trailing section
/// delegates to. The codec engine is agnostic to the algorithm.
pub trait Compression: Send + Sync {
    fn compress(&self, raw: &[u8]) -> Result<Vec<u8>, Error>;
    fn decompress(&self, compressed: &[u8]) -> Result<Vec<u8>, Error>;
}

/// Reads an embedded version tag from the head of a record's bytes.
///
/// Returning `Ok(None)` means "this buffer carries no version of its own" and
/// makes the decoder fall back to the caller-supplied version. The probe must
/// leave the cursor positioned where field decoding should begin; a tag that
/// is also declared as a regular field should be `peek`ed, not consumed.
pub type VersionProbe = Arc<dyn Fn(&mut Cursor) -> Result<Option<FormatVersion>, Error> + Send + Sync>;

/// A fix-up pass run on a fully-decoded record before it is returned.
pub type PostDecode = Hook;

/// A record type: its ordered field descriptors plus type-level hooks.
pub struct Schema {
    pub(crate) name: &'static str,
    pub(crate) fields: Vec<FieldDescriptor>,
    pub(crate) aliases: Vec<FieldAlias>,
    pub(crate) unions: Vec<FieldUnion>,
    pub(crate) version_probe: Option<VersionProbe>,
    pub(crate) compression: Option<Arc<dyn Compression>>,
    pub(crate) post_decode: Option<PostDecode>,
    pub(crate) default_version: FormatVersion,
}

impl Schema {
    /// Starts declaring a new record type.
    pub fn builder(name: &'static str) -> SchemaBuilder {
        SchemaBuilder::new(name)
    }

    /// The record type's name, used in errors.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The number of declared fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The descriptor behind a field handle.
    pub fn field(&self, id: FieldId) -> &FieldDescriptor {
        &self.fields[id.0]
    }

    /// The version used when neither the caller nor a probe supplies one.
    pub fn default_version(&self) -> &FormatVersion {
        &self.default_version
    }
}

/// Collects the field declarations for one record type.
pub struct SchemaBuilder {
    name: &'static str,
    fields: Vec<FieldDescriptor>,
    aliases: Vec<FieldAlias>,
    unions: Vec<FieldUnion>,
    version_probe: Option<VersionProbe>,
    compression: Option<Arc<dyn Compression>>,
    post_decode: Option<PostDecode>,
    default_version: FormatVersion,
}

impl SchemaBuilder {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            fields: Vec::new(),
            aliases: Vec::new(),
            unions: Vec::new(),
            version_probe: None,
            compression: None,
            post_decode: None,
            default_version: FormatVersion::none(),
        }
    }

    /// Declares the next field in layout order.
    ///
    /// Returns a [`FieldSpec`] for setting the field's options; finish with
    /// [`FieldSpec::id`] to obtain the field's handle.
    pub fn field(&mut self, name: impl Into<String>, codec: Codec) -> FieldSpec<'_> {
        let name = name.into();
        debug_assert!(
            self.fields.iter().all(|field| field.name != name),
            "duplicate field name {name:?}"
        );
        self.fields.push(FieldDescriptor {
            name,
            codec,
            versions: VersionRange::all(),
            repeat: 1,
            default: None,
            remaining_compressed: false,
            on_read: Vec::new(),
            on_write: Vec::new(),
            on_get: Vec::new(),
            on_set: Vec::new(),
            mappers: Vec::new(),
            validators: Vec::new(),
        });
        let idx = self.fields.len() - 1;
        FieldSpec { builder: self, idx }
    }

    /// Attaches an on-read hook to an already-declared field.
    ///
    /// The late-attachment forms exist because a hook usually references a
    /// field declared after the one it is attached to.
    pub fn on_read(&mut self, field: FieldId, hook: Hook) -> &mut Self {
        self.fields[field.0].on_read.push(hook);
        self
    }

    /// Attaches an on-write hook to an already-declared field.
    pub fn on_write(&mut self, field: FieldId, hook: Hook) -> &mut Self {
        self.fields[field.0].on_write.push(hook);
        self
    }

    /// Attaches an on-get hook to an already-declared field.
    pub fn on_get(&mut self, field: FieldId, hook: Hook) -> &mut Self {
        self.fields[field.0].on_get.push(hook);
        self
    }

    /// Attaches an on-set hook to an already-declared field.
    pub fn on_set(&mut self, field: FieldId, hook: Hook) -> &mut Self {
        self.fields[field.0].on_set.push(hook);
        self
    }

    /// Registers an alias exposing the field at `path` under `name`.
    pub fn alias(&mut self, name: impl Into<String>, path: Vec<PathSeg>) -> AliasId {
        assert!(
            matches!(path.last(), Some(PathSeg::Field(_))),
            "alias path must end on a field"
        );
        self.aliases.push(FieldAlias {
            name: name.into(),
            path,
        });
        AliasId(self.aliases.len() - 1)
    }

    /// Registers a union resolving `name` to the first version-active member.
    pub fn union(&mut self, name: impl Into<String>, members: Vec<FieldId>) -> UnionId {
        self.unions.push(FieldUnion {
            name: name.into(),
            members,
        });
        UnionId(self.unions.len() - 1)
    }

    /// Installs the version probe run at the start of every decode.
    pub fn version_probe(
        &mut self,
        probe: impl Fn(&mut Cursor) -> Result<Option<FormatVersion>, Error> + Send + Sync + 'static,
    ) -> &mut Self {
        self.version_probe = Some(Arc::new(probe));
        self
    }

    /// Installs the compress/decompress pair for a compressed trailing
    /// section. Decoding a schema that marks a field `compressed_remainder`
    /// without one fails.
    pub fn compression(&mut self, compression: impl Compression + 'static) -> &mut Self {
        self.compression = Some(Arc::new(compression));
        self
    }

    /// Installs a fix-up pass run after every successful decode.
    pub fn post_decode(
        &mut self,
        hook: impl Fn(&mut Record) -> Result<(), Error> + Send + Sync + 'static,
    ) -> &mut Self {
        self.post_decode = Some(Arc::new(hook));
        self
    }

    /// Sets the version assumed when the caller supplies none and no probe
    /// matches.
    pub fn default_version(&mut self, ver: impl Into<FormatVersion>) -> &mut Self {
        self.default_version = ver.into();
        self
    }

    /// Finalizes the declaration into an immutable, shareable schema.
    pub fn build(self) -> Arc<Schema> {
        Arc::new(Schema {
            name: self.name,
            fields: self.fields,
            aliases: self.aliases,
            unions: self.unions,
            version_probe: self.version_probe,
            compression: self.compression,
            post_decode: self.post_decode,
            default_version: self.default_version,
        })
    }
}

/// Options for one field declaration, consumed by [`FieldSpec::id`].
pub struct FieldSpec<'a> {
    builder: &'a mut SchemaBuilder,
    idx: usize,
}

impl FieldSpec<'_> {
    fn desc(&mut self) -> &mut FieldDescriptor {
        &mut self.builder.fields[self.idx]
    }

    /// Restricts the field to an inclusive version range.
    pub fn versions(mut self, range: VersionRange) -> Self {
        self.desc().versions = range;
        self
    }

    /// Sets the static repeat: `-1` always absent, `0` always an empty list,
    /// `1` a scalar, `> 1` a fixed-length list.
    pub fn repeat(mut self, repeat: i64) -> Self {
        assert!(repeat >= -1, "repeat must be -1, 0, 1, or a fixed length");
        self.desc().repeat = repeat;
        self
    }

    /// Sets a shareable default value.
    ///
    /// Only trivially-copyable values are accepted; lists, byte buffers, and
    /// nested records must come from [`FieldSpec::default_with`] so instances
    /// never share one mutable default.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        let value = value.into();
        assert!(
            !matches!(value, Value::List(_) | Value::Bytes(_) | Value::Record(_)),
            "owned default for {:?} must be built by a factory; use default_with",
            self.desc().name,
        );
        self.desc().default = Some(DefaultValue::Value(value));
        self
    }

    /// Sets a default factory, invoked with the instance's version and the
    /// partially-built instance. Each call must return a fresh value.
    pub fn default_with(
        mut self,
        factory: impl Fn(&FormatVersion, &Record) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.desc().default = Some(DefaultValue::Factory(Arc::new(factory)));
        self
    }

    /// Marks every byte from this field onward as one compressed span.
    pub fn compressed_remainder(mut self) -> Self {
        self.desc().remaining_compressed = true;
        self
    }

    /// Appends a transform applied to incoming values on set, before
    /// validation.
    pub fn map(mut self, mapper: impl Fn(Value) -> Result<Value, Error> + Send + Sync + 'static) -> Self {
        self.desc().mappers.push(Arc::new(mapper) as Mapper);
        self
    }

    /// Appends a set-time check; rejections surface with the field's name.
    pub fn validate(
        mut self,
        validator: impl Fn(&Value) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        self.desc().validators.push(Arc::new(validator) as Validator);
        self
    }

    pub fn on_read(mut self, hook: Hook) -> Self {
        self.desc().on_read.push(hook);
        self
    }

    pub fn on_write(mut self, hook: Hook) -> Self {
        self.desc().on_write.push(hook);
        self
    }

    pub fn on_get(mut self, hook: Hook) -> Self {
        self.desc().on_get.push(hook);
        self
    }

    pub fn on_set(mut self, hook: Hook) -> Self {
        self.desc().on_set.push(hook);
        self
    }

    /// Finishes the declaration and returns the field's handle.
    pub fn id(self) -> FieldId {
        FieldId(self.idx)
    }
}
