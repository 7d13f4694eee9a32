//! Declarative schemas for binary record formats, with bidirectional codecs
//! derived mechanically from the declaration.
//!
//! A [`Schema`] describes one record type: an ordered list of fields, each
//! with a value codec, an inclusive version range gating its existence, a
//! repeat specification, a default policy, and lifecycle hooks. From that one
//! declaration the engine derives both directions of the codec, guaranteeing
//! that unmodified data decoded and re-encoded reproduces the original bytes
//! exactly. Dynamic layout (array lengths read from sibling fields, optional
//! sub-sections, compressed trailing spans) is expressed with hooks and
//! per-field flags rather than hand-written parsing code.
//!
//! # Example
//!
//! ```
//! use byteform_schema::{hooks, Codec, FormatVersion, Schema, Value};
//!
//! // A count field governing the length of an items list.
//! let mut builder = Schema::builder("Counted");
//! let count = builder.field("count", Codec::uint32()).default(0u32).id();
//! let items = builder.field("items", Codec::int8()).repeat(0).id();
//! builder.on_read(count, hooks::set_repeat_from(count, items));
//! builder.on_set(count, hooks::set_repeat_from(count, items));
//! builder.on_write(count, hooks::sync_len(count, items));
//! let schema = builder.build();
//!
//! let buf = vec![0x03u8, 0x00, 0x00, 0x00, 0x01, 0x02, 0x03];
//! let mut record = schema
//!     .decode_bytes(buf.clone(), &FormatVersion::none(), true)
//!     .unwrap();
//! assert_eq!(record.get(count).unwrap(), &Value::UInt(3));
//! assert_eq!(record.encode().unwrap(), buf);
//! ```

pub mod combine;
pub mod cursor;
pub mod descriptor;
mod error;
pub mod hooks;
pub mod record;
pub mod schema;
pub mod types;
pub mod value;
pub mod version;

pub use combine::{AliasId, PathSeg, UnionId};
pub use cursor::Cursor;
pub use error::Error;
pub use record::Record;
pub use schema::{Compression, FieldId, Schema, SchemaBuilder};
pub use types::{Codec, Endian};
pub use value::Value;
pub use version::{FormatVersion, VersionRange};
