//! Alias and union facades: one logical field name backed by one (possibly
//! nested) or several version-exclusive underlying fields.

use crate::schema::FieldId;

/// A handle to a registered alias, returned by the schema builder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AliasId(pub(crate) usize);

/// A handle to a registered union, returned by the schema builder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnionId(pub(crate) usize);

/// One step of an alias path: a field of the current record, or an element of
/// the current list.
#[derive(Clone, Copy, Debug)]
pub enum PathSeg {
    Field(FieldId),
    Index(usize),
}

/// Exposes a (possibly nested) field under a stable top-level name.
///
/// The path is walked segment by segment from the owning record; the final
/// segment must land on a field, whose get/set the alias delegates to.
pub struct FieldAlias {
    pub(crate) name: String,
    pub(crate) path: Vec<PathSeg>,
}

/// Exposes several mutually version-exclusive fields under one name.
///
/// Access resolves to the first member active under the instance's version;
/// if none matches, access fails with a version error.
pub struct FieldUnion {
    pub(crate) name: String,
    pub(crate) members: Vec<FieldId>,
}
